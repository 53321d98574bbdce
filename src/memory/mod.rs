//! 记忆层：对话记录（transcript）

pub mod conversation;

pub use conversation::{ConversationMemory, Message, Role};
