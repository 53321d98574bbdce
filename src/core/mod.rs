//! 核心编排层：错误与恢复、会话状态、决策-分发循环

pub mod error;
pub mod orchestrator;
pub mod recovery;
pub mod state;

pub use error::{AgentError, RecoveryAction};
pub use orchestrator::{Orchestrator, TurnOutcome, TurnPhase, DEFAULT_MAX_ITERATIONS};
pub use recovery::RecoveryEngine;
pub use state::{SessionSnapshot, SessionState};
