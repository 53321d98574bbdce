//! CabSwale Sahayak - 找司机的对话式助手
//!
//! 模块划分：
//! - **agent**: 对话边界（问候、退出口令、失败提示）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误与恢复、会话状态、决策-分发循环
//! - **llm**: 决策模型客户端抽象与实现（OpenAI 兼容 / Gemini / DeepSeek / Mock）
//! - **memory**: 对话记录
//! - **observability**: 日志初始化
//! - **react**: Planner 与 system prompt
//! - **records**: 司机记录解析与校验
//! - **remote**: HTTP 网关与数据源
//! - **search**: 档案缓存、过滤、详情补全与翻页
//! - **tools**: 意图工具、注册表与执行器

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod records;
pub mod remote;
pub mod search;
pub mod tools;

pub use agent::{Conversation, Reply};
