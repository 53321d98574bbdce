//! 决策层：Planner（调用决策模型、解析工具调用）与 system prompt 组装

pub mod planner;
pub mod prompt;

pub use planner::{parse_llm_output, Planner, PlannerOutput, ToolCall};
pub use prompt::{build_system_prompt, load_system_prompt, DEFAULT_SYSTEM_PROMPT};
