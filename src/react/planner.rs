//! Planner：调用决策模型并解析其输出
//!
//! 输出为纯文本时是最终回复；为 JSON 时是一个或多个工具调用：
//! `{"tool": "...", "args": {...}}`、由它们组成的数组，或 `{"tool_calls": [...]}`。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;

/// 一次工具调用；call_id 由本地生成，用于在 transcript 中关联结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default = "empty_args")]
    pub args: Value,
    #[serde(default = "new_call_id")]
    pub call_id: String,
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

fn new_call_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannerOutput {
    /// 直接回复用户，本轮结束
    Response(String),
    /// 需要执行的工具调用（按顺序）
    ToolCalls(Vec<ToolCall>),
}

#[derive(Deserialize)]
struct ToolCallBatch {
    tool_calls: Vec<ToolCall>,
}

fn names_a_tool(text: &str) -> bool {
    text.contains("\"tool\"") || text.contains("\"tool_calls\"")
}

/// 提取可能的 JSON 片段；文本看起来不像工具调用时返回 None
fn extract_json(trimmed: &str) -> Option<&str> {
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return Some(rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim()));
    }
    let looks_like_call =
        trimmed.starts_with('{') || trimmed.starts_with('[') || names_a_tool(trimmed);
    if !looks_like_call {
        return None;
    }
    let obj = trimmed.find('{').zip(trimmed.rfind('}'));
    let arr = trimmed.find('[').zip(trimmed.rfind(']'));
    let (start, end) = match (obj, arr) {
        (Some(o), Some(a)) if a.0 < o.0 => a,
        (Some(o), _) => o,
        (None, Some(a)) => a,
        (None, None) => return Some(trimmed),
    };
    if start <= end {
        Some(&trimmed[start..=end])
    } else {
        Some(trimmed)
    }
}

/// 解析决策模型输出
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();
    let Some(json_str) = extract_json(trimmed) else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    let value: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        // 以括号开头的普通回复（如 "[1] Ramesh ..."）不是工具调用
        Err(_) if !names_a_tool(trimmed) => {
            return Ok(PlannerOutput::Response(trimmed.to_string()))
        }
        Err(e) => return Err(AgentError::JsonParseError(format!("{}: {}", e, json_str))),
    };

    let parsed: Result<Vec<ToolCall>, serde_json::Error> = if value.is_array() {
        serde_json::from_value(value)
    } else if value.get("tool_calls").is_some() {
        serde_json::from_value::<ToolCallBatch>(value).map(|b| b.tool_calls)
    } else {
        serde_json::from_value::<ToolCall>(value).map(|c| vec![c])
    };
    let calls = parsed.map_err(|e| AgentError::JsonParseError(format!("{}: {}", e, json_str)))?;

    let calls: Vec<ToolCall> = calls.into_iter().filter(|c| !c.tool.is_empty()).collect();
    if calls.is_empty() {
        Ok(PlannerOutput::Response(trimmed.to_string()))
    } else {
        Ok(PlannerOutput::ToolCalls(calls))
    }
}

/// Planner：持有决策模型与基础 system prompt
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn base_system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// 使用动态拼接的 system（含状态快照与工具说明）调用决策模型
    pub async fn plan_with_system(
        &self,
        messages: &[Message],
        system: &str,
    ) -> Result<String, AgentError> {
        let mut full_messages = vec![Message::system(system.to_string())];
        full_messages.extend(messages.iter().cloned());
        self.llm
            .complete(&full_messages)
            .await
            .map_err(AgentError::LlmError)
    }

    pub async fn decide(
        &self,
        messages: &[Message],
        system: &str,
    ) -> Result<PlannerOutput, AgentError> {
        let output = self.plan_with_system(messages, system).await?;
        parse_llm_output(&output)
    }
}
