//! 对话记录（transcript）
//!
//! 保留最近 N 轮对话，超出时自动剪枝；工具结果以 Tool 角色写入，供下一轮决策使用。

use serde::{Deserialize, Serialize};

/// 消息角色
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
    /// 工具结果回写
    Tool,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// 仅 Tool 消息：对应的工具名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// 仅 Tool 消息：对应调用的 call_id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl Message {
    fn plain(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            tool_name: None,
            call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content.into())
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content.into())
    }

    pub fn tool(
        tool_name: impl Into<String>,
        call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_name: Some(tool_name.into()),
            call_id: Some(call_id.into()),
        }
    }
}

/// 最近 N 轮对话（每轮至少 user + assistant，故保留约 max_turns*2 条消息）
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    max_turns: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(30)
    }
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns: max_turns.max(1),
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// 超出 max_turns*2 时丢弃最旧的消息；最近一条 User 消息及其后的本轮消息始终保留，
    /// 且不以孤立的 Tool 消息开头
    fn prune(&mut self) {
        let keep = self.max_turns * 2;
        if self.messages.len() > keep {
            let current_turn = self
                .messages
                .iter()
                .rposition(|m| m.role == Role::User)
                .unwrap_or(self.messages.len());
            let cut = (self.messages.len() - keep).min(current_turn);
            self.messages.drain(..cut);
            while matches!(self.messages.first(), Some(m) if m.role == Role::Tool) {
                self.messages.remove(0);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_most_recent() {
        let mut mem = ConversationMemory::new(2);
        for i in 0..6 {
            mem.push(Message::user(format!("u{i}")));
        }
        assert_eq!(mem.len(), 4);
        assert_eq!(mem.messages()[0].content, "u2");
        assert_eq!(mem.last().map(|m| m.content.as_str()), Some("u5"));
    }

    #[test]
    fn test_prune_keeps_current_turn_user_message() {
        let mut mem = ConversationMemory::new(1);
        mem.push(Message::user("Pune me cab"));
        for i in 0..6 {
            mem.push(Message::assistant(format!("call {i}")));
            mem.push(Message::tool("find_drivers", format!("c{i}"), "{}"));
        }
        assert_eq!(mem.len(), 13);
        assert_eq!(mem.messages()[0].content, "Pune me cab");

        mem.push(Message::assistant("done"));
        mem.push(Message::user("aur dikhao"));
        assert_eq!(mem.len(), 2);
        assert_eq!(mem.messages()[0].content, "done");
    }

    #[test]
    fn test_prune_drops_leading_tool_results() {
        let mut mem = ConversationMemory::new(1);
        mem.push(Message::user("Pune"));
        mem.push(Message::assistant("calling"));
        mem.push(Message::tool("set_city", "c1", "{}"));
        mem.push(Message::tool("find_drivers", "c2", "{}"));
        mem.push(Message::user("hi"));
        // 剪到只剩 2 条时开头是 Tool 消息，继续丢弃
        assert_eq!(mem.len(), 1);
        assert_eq!(mem.messages()[0].content, "hi");
    }
}
