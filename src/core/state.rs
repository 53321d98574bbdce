//! 会话状态：一次对话内唯一的可变聚合
//!
//! 只由编排器在分发意图时修改。换城市是唯一会清空缓存、已展示集合、过滤条件和重试深度的事件，
//! 且这些字段一次性整体重置（transcript 保留）。

use serde::Serialize;

use crate::memory::{ConversationMemory, Message};
use crate::search::{FilterCriteria, RecordCache};

#[derive(Debug, Clone)]
pub struct SessionState {
    pub location: Option<String>,
    /// 下一次请求的页码，从 1 开始
    pub page_cursor: u32,
    pub active_filters: FilterCriteria,
    pub cache: RecordCache,
    /// 当前过滤条件下已自动翻页重试的次数
    pub filter_retry_depth: u32,
    /// 列表接口返回过空页
    pub exhausted: bool,
    pub transcript: ConversationMemory,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ConversationMemory::default())
    }
}

/// 两个城市名是否指同一城市（去空白、忽略大小写）
fn same_location(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl SessionState {
    pub fn new(transcript: ConversationMemory) -> Self {
        Self {
            location: None,
            page_cursor: 1,
            active_filters: FilterCriteria::default(),
            cache: RecordCache::new(),
            filter_retry_depth: 0,
            exhausted: false,
            transcript,
        }
    }

    pub fn with_max_turns(max_turns: usize) -> Self {
        Self::new(ConversationMemory::new(max_turns))
    }

    /// 设置城市；与当前城市不同时先整体重置。返回是否发生了重置
    pub fn set_location(&mut self, location: &str) -> bool {
        let location = location.trim();
        if let Some(current) = &self.location {
            if same_location(current, location) {
                return false;
            }
        }
        let transcript = std::mem::take(&mut self.transcript);
        *self = Self::new(transcript);
        self.location = Some(location.to_string());
        tracing::info!(city = %location, "city updated, search state reset");
        true
    }

    /// 合并过滤条件并把重试深度归零
    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.active_filters.merge(criteria.normalized());
        self.filter_retry_depth = 0;
        tracing::info!(filters = ?self.active_filters, "filters updated");
    }

    /// 合并过滤条件；只有 active_filters 实际变化时才把重试深度归零。返回是否变化
    pub fn merge_filters(&mut self, criteria: FilterCriteria) -> bool {
        let mut merged = self.active_filters.clone();
        merged.merge(criteria.normalized());
        if merged == self.active_filters {
            return false;
        }
        self.active_filters = merged;
        self.filter_retry_depth = 0;
        tracing::info!(filters = ?self.active_filters, "filters updated");
        true
    }

    pub fn clear_filters(&mut self) {
        self.active_filters = FilterCriteria::default();
        self.filter_retry_depth = 0;
        tracing::info!("filters cleared");
    }

    pub fn push_message(&mut self, msg: Message) {
        self.transcript.push(msg);
    }

    pub fn snapshot(&self, max_filter_depth: u32) -> SessionSnapshot {
        SessionSnapshot {
            location: self.location.clone(),
            active_filters: self.active_filters.clone(),
            cache_size: self.cache.len(),
            presented: self.cache.presented_count(),
            next_page: self.page_cursor,
            filter_retry_depth: self.filter_retry_depth,
            max_filter_depth,
            exhausted: self.exhausted,
        }
    }
}

/// 渲染进系统提示词的状态快照
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub location: Option<String>,
    pub active_filters: FilterCriteria,
    pub cache_size: usize,
    pub presented: usize,
    pub next_page: u32,
    pub filter_retry_depth: u32,
    pub max_filter_depth: u32,
    pub exhausted: bool,
}

impl SessionSnapshot {
    pub fn render(&self) -> String {
        let filters = if self.active_filters.is_empty() {
            "None".to_string()
        } else {
            serde_json::to_string(&self.active_filters).unwrap_or_else(|_| "None".to_string())
        };
        format!(
            "**Current Conversation State:**\n\
             - City: {}\n\
             - Active Filters: {}\n\
             - Total Drivers in Cache: {}\n\
             - Drivers Already Presented: {}\n\
             - API Page to Fetch Next: {}\n\
             - Filter Search Attempts: {}/{}\n\
             - No More Drivers Upstream: {}\n",
            self.location.as_deref().unwrap_or("Not specified yet"),
            filters,
            self.cache_size,
            self.presented,
            self.next_page,
            self.filter_retry_depth,
            self.max_filter_depth,
            if self.exhausted { "yes" } else { "no" },
        )
    }
}
