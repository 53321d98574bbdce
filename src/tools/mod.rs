//! 工具箱：每个意图一个 Tool，统一由 ToolRegistry 注册、ToolExecutor 分发
//!
//! - set_city / find_drivers：城市与翻页
//! - apply_filters / filter_drivers / clear_filters：偏好与过滤
//! - get_driver_contact_info：取联系方式

pub mod contact;
pub mod executor;
pub mod filters;
pub mod location;
pub mod registry;
pub mod schema;

pub use contact::GetContactTool;
pub use executor::ToolExecutor;
pub use filters::{ApplyFiltersTool, ClearFiltersTool, FilterDriversTool};
pub use location::{FindDriversTool, SetCityTool};
pub use registry::{parse_args, schema_of, Tool, ToolContext, ToolRegistry};
pub use schema::tool_call_schema_json;

/// 注册全部意图工具
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(SetCityTool);
    registry.register(FindDriversTool);
    registry.register(ApplyFiltersTool);
    registry.register(FilterDriversTool);
    registry.register(ClearFiltersTool);
    registry.register(GetContactTool);
    registry
}
