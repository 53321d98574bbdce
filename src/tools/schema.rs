//! 工具调用 JSON Schema 生成（schemars）
//!
//! 将合法 tool call 的 JSON 结构注入 system prompt，减少决策模型的格式错误。

use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// 工具调用请求格式：与 Planner 解析的 `{"tool": "...", "args": {...}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 set_city、find_drivers、filter_drivers
    pub tool: String,
    /// 工具参数，依工具不同而不同（city、languages、isPetAllowed、driver_id 等）
    #[serde(default)]
    pub args: Value,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}
