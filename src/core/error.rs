//! Agent 错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 AgentError 决定 RetryWithPrompt / Abort。
//! 远端请求错误见 `remote::GatewayError`，记录校验错误见 `records::ValidationError`，二者都在记录级别被吞掉，不会出现在这里。

use thiserror::Error;

/// 一轮对话内可能出现的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// 决策模型调用了未注册的工具（本轮致命）
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// 决策-分发循环超过上限（防活锁，本轮致命）
    #[error("Iteration ceiling exceeded after {0} cycles")]
    IterationCeilingExceeded(usize),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("City is not set yet")]
    LocationNotSet,

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    /// 将提示注入下一轮，让决策模型重试（如 JSON 格式错误）
    RetryWithPrompt(String),
    /// 终止当前轮次
    Abort,
}
