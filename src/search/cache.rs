//! 司机档案缓存
//!
//! 按 id 存储补全后的档案，保留插入顺序；记录已展示给用户的 id。
//! 无淘汰策略，生命周期与会话一致；只有换城市时整体清空。

use std::collections::{HashMap, HashSet};

use crate::records::EnrichedRecord;

#[derive(Debug, Clone, Default)]
pub struct RecordCache {
    records: HashMap<String, EnrichedRecord>,
    /// 首次插入顺序
    order: Vec<String>,
    /// 已展示 id，始终是 records 键集的子集
    presented: HashSet<String>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 id 插入或覆盖；覆盖不改变原有顺序。返回新增条数
    pub fn upsert_many(&mut self, records: impl IntoIterator<Item = EnrichedRecord>) -> usize {
        let mut added = 0;
        for record in records {
            let id = record.id().to_string();
            if self.records.insert(id.clone(), record).is_none() {
                self.order.push(id);
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, id: &str) -> Option<&EnrichedRecord> {
        self.records.get(id)
    }

    /// 按插入顺序遍历全部档案
    pub fn iter(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// 尚未展示过的档案（插入顺序）
    pub fn unseen(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.iter().filter(|r| !self.presented.contains(r.id()))
    }

    /// 标记为已展示；幂等。不在缓存中的 id 被忽略，返回实际新增的数量
    pub fn mark_presented<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        for id in ids {
            if !self.records.contains_key(id) {
                tracing::debug!(id = %id, "ignoring presented id that is not cached");
                continue;
            }
            if self.presented.insert(id.to_string()) {
                added += 1;
            }
        }
        added
    }

    pub fn is_presented(&self, id: &str) -> bool {
        self.presented.contains(id)
    }

    pub fn presented_count(&self) -> usize {
        self.presented.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.order.clear();
        self.presented.clear();
    }
}
