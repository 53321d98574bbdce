//! 决策模型客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Gemini / DeepSeek / Mock）实现 LlmClient：输入完整消息列表，返回一段文本；
//! 文本是最终回复还是工具调用由 Planner 解析。

use async_trait::async_trait;

use crate::memory::Message;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;
}
