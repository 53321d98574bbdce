//! 对话边界：问候语、退出口令、一轮输入对应一条回复
//!
//! 会话状态由 Conversation 独占；每轮把 `&mut SessionState` 交给编排器，轮次结束后收回。
//! 致命错误（未知工具、循环上限、模型故障）只结束当前轮，返回统一的道歉文案，对话继续。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{AgentError, Orchestrator, SessionState};
use crate::llm::{create_llm_from_config, LlmClient};
use crate::react::{load_system_prompt, Planner};
use crate::remote::{HttpRecordSource, RecordSource};
use crate::search::SearchEngine;
use crate::tools::{default_registry, ToolExecutor};

pub const GREETING: &str =
    "Namaste! Main aapki cab booking me sahayata kar sakta hun. Aapko kis sheher se cab chaiye?";
pub const FAREWELL: &str = "Dhanyavaad! Aapka din shubh ho.";
pub const FAILURE_NOTICE: &str =
    "Maaf kijiye, abhi kuch gadbad ho gayi. Kripya apna sawaal dobara bhejiye.";

/// 一轮对话的输出
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 助手回复，对话继续
    Say(String),
    /// 用户输入了退出口令
    Quit(String),
}

pub struct Conversation {
    orchestrator: Orchestrator,
    state: SessionState,
    quit_phrases: Vec<String>,
}

impl Conversation {
    pub fn new(orchestrator: Orchestrator, state: SessionState, quit_phrases: Vec<String>) -> Self {
        Self {
            orchestrator,
            state,
            quit_phrases: quit_phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// 由配置组装：决策模型、HTTP 数据源、工具表与编排器
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AgentError> {
        let source = HttpRecordSource::from_config(&cfg.api)
            .map_err(|e| AgentError::ConfigError(e.to_string()))?;
        Ok(Self::with_components(
            cfg,
            create_llm_from_config(cfg),
            Arc::new(source),
        ))
    }

    /// 使用给定的决策模型与数据源组装（测试与嵌入使用）
    pub fn with_components(
        cfg: &AppConfig,
        llm: Arc<dyn LlmClient>,
        source: Arc<dyn RecordSource>,
    ) -> Self {
        let planner = Planner::new(llm, load_system_prompt());
        let engine = SearchEngine::new(source, cfg.search.clone());
        let orchestrator = Orchestrator::new(planner, ToolExecutor::new(default_registry()), engine)
            .with_max_iterations(cfg.agent.max_iterations);
        Self::new(
            orchestrator,
            SessionState::with_max_turns(cfg.app.max_context_turns),
            cfg.app.quit_phrases.clone(),
        )
    }

    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_quit(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        self.quit_phrases.iter().any(|p| *p == input)
    }

    /// 处理一条用户输入
    pub async fn handle(&mut self, input: &str) -> Reply {
        if self.is_quit(input) {
            tracing::info!("user ended the conversation");
            return Reply::Quit(FAREWELL.to_string());
        }
        match self.orchestrator.run_turn(&mut self.state, input).await {
            Ok(outcome) => {
                tracing::info!(
                    iterations = outcome.iterations,
                    tool_calls = outcome.tool_calls,
                    "turn complete"
                );
                Reply::Say(outcome.reply)
            }
            Err(e) => {
                tracing::error!(error = %e, "turn aborted");
                Reply::Say(FAILURE_NOTICE.to_string())
            }
        }
    }
}
