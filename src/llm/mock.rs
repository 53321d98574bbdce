//! Mock 决策模型（用于测试与无 API Key 时的本地运行）
//!
//! - MockLlmClient：回显用户最后一条消息作为最终回复
//! - ScriptedLlmClient：按顺序返回预置输出，并记录每次收到的 system prompt，便于断言状态快照

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// 回显客户端
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(format!("Echo from Mock: {}", last_user))
    }
}

/// 预置脚本客户端：脚本用完后返回错误
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    script: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(outputs.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用时收到的 system prompt
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let (Ok(mut prompts), Some(system)) = (
            self.prompts.lock(),
            messages.iter().find(|m| m.role == Role::System),
        ) {
            prompts.push(system.content.clone());
        }
        self.script
            .lock()
            .map_err(|e| e.to_string())?
            .pop_front()
            .ok_or_else(|| "script exhausted".to_string())
    }
}
