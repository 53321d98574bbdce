//! 编排器：一轮对话的决策-分发循环
//!
//! AwaitDecision → Dispatching → (回到 AwaitDecision | TurnComplete)。
//! 会话状态由调用方持有，本轮期间以 `&mut` 独占借给编排器，轮次结束即归还。

use serde_json::json;

use crate::core::{AgentError, RecoveryAction, RecoveryEngine, SessionState};
use crate::memory::Message;
use crate::react::{build_system_prompt, Planner, PlannerOutput};
use crate::search::SearchEngine;
use crate::tools::{tool_call_schema_json, ToolContext, ToolExecutor};

pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// 本轮所处阶段（仅用于日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitDecision,
    Dispatching,
    TurnComplete,
}

/// 一轮对话的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    /// 决策模型被调用的次数
    pub iterations: usize,
    /// 本轮分发的意图数
    pub tool_calls: usize,
}

pub struct Orchestrator {
    planner: Planner,
    executor: ToolExecutor,
    engine: SearchEngine,
    recovery: RecoveryEngine,
    max_iterations: usize,
}

impl Orchestrator {
    pub fn new(planner: Planner, executor: ToolExecutor, engine: SearchEngine) -> Self {
        Self {
            planner,
            executor,
            engine,
            recovery: RecoveryEngine::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// 处理一条用户输入，直到决策模型给出最终回复
    ///
    /// `ToolNotFound` 与 `IterationCeilingExceeded` 结束本轮并返回错误；工具级错误写回 transcript，循环继续。
    pub async fn run_turn(
        &self,
        state: &mut SessionState,
        user_input: &str,
    ) -> Result<TurnOutcome, AgentError> {
        state.push_message(Message::user(user_input.to_string()));

        let tools_schema = self.executor.registry().to_schema_json();
        let call_format = tool_call_schema_json();
        let max_depth = self.engine.settings().max_filter_depth;
        let mut iterations = 0;
        let mut dispatched = 0;

        loop {
            if iterations >= self.max_iterations {
                tracing::warn!(iterations, "decision loop hit the iteration ceiling");
                return Err(AgentError::IterationCeilingExceeded(iterations));
            }
            iterations += 1;
            tracing::debug!(phase = ?TurnPhase::AwaitDecision, iteration = iterations);

            let system = build_system_prompt(
                self.planner.base_system_prompt(),
                &tools_schema,
                &call_format,
                &state.snapshot(max_depth),
            );
            let decision = self
                .planner
                .decide(state.transcript.messages(), &system)
                .await;

            let calls = match decision {
                Ok(PlannerOutput::Response(reply)) => {
                    state.push_message(Message::assistant(reply.clone()));
                    tracing::debug!(
                        phase = ?TurnPhase::TurnComplete,
                        iterations,
                        tool_calls = dispatched
                    );
                    return Ok(TurnOutcome {
                        reply,
                        iterations,
                        tool_calls: dispatched,
                    });
                }
                Ok(PlannerOutput::ToolCalls(calls)) => calls,
                Err(e) => match self.recovery.handle(&e) {
                    RecoveryAction::RetryWithPrompt(prompt) => {
                        tracing::warn!(error = %e, "decision rejected, asking again");
                        state.push_message(Message::user(prompt));
                        continue;
                    }
                    RecoveryAction::Abort => return Err(e),
                },
            };

            if let Some(unknown) = self.executor.first_unknown(&calls) {
                tracing::warn!(tool = %unknown, "decision named an unregistered tool");
                return Err(AgentError::ToolNotFound(unknown.to_string()));
            }

            tracing::debug!(phase = ?TurnPhase::Dispatching, calls = calls.len());
            let calls_json = serde_json::to_string(&calls).unwrap_or_else(|_| "[]".to_string());
            state.push_message(Message::assistant(calls_json));

            for call in &calls {
                let result = {
                    let mut ctx = ToolContext {
                        state: &mut *state,
                        engine: &self.engine,
                    };
                    self.executor.execute(call, &mut ctx).await
                };
                let content = match result {
                    Ok(value) => value,
                    Err(e) => match self.recovery.handle(&e) {
                        RecoveryAction::RetryWithPrompt(hint) => {
                            json!({"error": e.to_string(), "hint": hint})
                        }
                        RecoveryAction::Abort => return Err(e),
                    },
                };
                state.push_message(Message::tool(&call.tool, &call.call_id, content.to_string()));
                dispatched += 1;
            }
        }
    }
}
