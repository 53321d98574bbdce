//! apply_filters / filter_drivers / clear_filters
//!
//! filter_drivers 可带条件：先合并条件（条件实际变化时重试深度才归零），再执行过滤。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::search::FilterCriteria;
use crate::tools::{parse_args, schema_of, Tool, ToolContext};

const CRITERIA_HELP: &str = "Criteria: languages (spoken language, e.g. \"hindi\"), isPetAllowed (bool), married (bool). Omitted criteria are not applied.";

/// apply_filters：合并过滤条件，不执行过滤
pub struct ApplyFiltersTool;

#[async_trait]
impl Tool for ApplyFiltersTool {
    fn name(&self) -> &str {
        "apply_filters"
    }

    fn description(&self) -> &str {
        "Add or change the user's driver preferences without listing drivers. Criteria: languages, isPetAllowed, married."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<FilterCriteria>()
    }

    async fn execute(&self, ctx: &mut ToolContext<'_>, args: Value) -> Result<Value, AgentError> {
        let criteria: FilterCriteria = parse_args(self.name(), args)?;
        ctx.state.apply_filters(criteria);
        Ok(json!({
            "active_filters": ctx.state.active_filters,
            "filter_search_depth": ctx.state.filter_retry_depth,
        }))
    }
}

/// filter_drivers：返回未展示且满足条件的司机，没有时自动翻页重试
pub struct FilterDriversTool;

#[async_trait]
impl Tool for FilterDriversTool {
    fn name(&self) -> &str {
        "filter_drivers"
    }

    fn description(&self) -> &str {
        "Return cached drivers that match the active filters and have NOT been shown before. Pass criteria to add preferences first. If nothing matches, more pages are fetched automatically up to the search limit."
    }

    fn parameters_schema(&self) -> Value {
        let mut schema = schema_of::<FilterCriteria>();
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".to_string(), json!(CRITERIA_HELP));
        }
        schema
    }

    async fn execute(&self, ctx: &mut ToolContext<'_>, args: Value) -> Result<Value, AgentError> {
        let criteria: FilterCriteria = parse_args(self.name(), args)?;
        if !criteria.is_empty() {
            ctx.state.merge_filters(criteria);
        }
        let outcome = ctx.engine.run_filter(ctx.state).await;
        let mut result = outcome.to_json();
        if let Some(obj) = result.as_object_mut() {
            obj.insert("active_filters".to_string(), json!(ctx.state.active_filters));
        }
        Ok(result)
    }
}

/// clear_filters：移除全部过滤条件
pub struct ClearFiltersTool;

#[async_trait]
impl Tool for ClearFiltersTool {
    fn name(&self) -> &str {
        "clear_filters"
    }

    fn description(&self) -> &str {
        "Remove all driver preferences so every unseen driver is eligible again."
    }

    async fn execute(&self, ctx: &mut ToolContext<'_>, _args: Value) -> Result<Value, AgentError> {
        ctx.state.clear_filters();
        Ok(json!({"filters_cleared": true}))
    }
}
