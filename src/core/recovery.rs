//! 错误恢复引擎
//!
//! 根据 AgentError 类型返回 RecoveryAction，供编排循环决定是重试还是终止本轮。

use crate::core::{AgentError, RecoveryAction};

/// 将错误映射为可执行动作（重试提示 / 终止）
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, err: &AgentError) -> RecoveryAction {
        match err {
            AgentError::JsonParseError(raw) => RecoveryAction::RetryWithPrompt(format!(
                "Your previous tool call was not valid JSON: {raw}. \
                 To call tools, output ONLY a JSON object of the form \
                 {{\"tool\": \"tool_name\", \"args\": {{...}}}} or a JSON array of such objects. \
                 To reply to the user, output plain text without any JSON."
            )),
            AgentError::InvalidArguments { tool, reason } => RecoveryAction::RetryWithPrompt(
                format!("Arguments for {tool} were rejected: {reason}. Fix them and call again."),
            ),
            AgentError::LocationNotSet => RecoveryAction::RetryWithPrompt(
                "Ask the user for their city and call set_city first.".to_string(),
            ),
            AgentError::ToolNotFound(_)
            | AgentError::IterationCeilingExceeded(_)
            | AgentError::LlmError(_)
            | AgentError::ConfigError(_) => RecoveryAction::Abort,
        }
    }
}
