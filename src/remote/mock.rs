//! Mock 记录来源（用于测试，无需网络）
//!
//! 按 (城市, 页码) 预置列表响应，按 id 预置详情响应；未预置的页返回空 data，未预置的详情返回 HTTP 404。
//! 记录每次调用，便于断言翻页次数。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::remote::{GatewayError, RecordSource};

#[derive(Default)]
pub struct MockRecordSource {
    pages: HashMap<(String, u32), Result<Value, GatewayError>>,
    details: HashMap<String, Result<Value, GatewayError>>,
    listing_calls: Mutex<Vec<(String, u32)>>,
    detail_calls: AtomicUsize,
}

impl MockRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一页候选记录（直接给出 data 数组内容）
    pub fn with_page(mut self, city: &str, page: u32, candidates: Vec<Value>) -> Self {
        self.pages
            .insert((city.to_lowercase(), page), Ok(json!({ "data": candidates })));
        self
    }

    pub fn with_page_error(mut self, city: &str, page: u32, err: GatewayError) -> Self {
        self.pages.insert((city.to_lowercase(), page), Err(err));
        self
    }

    /// 预置详情（直接给出 data 字段内容）
    pub fn with_detail(mut self, id: &str, data: Value) -> Self {
        self.details
            .insert(id.to_string(), Ok(json!({ "data": data })));
        self
    }

    pub fn with_detail_error(mut self, id: &str, err: GatewayError) -> Self {
        self.details.insert(id.to_string(), Err(err));
        self
    }

    /// 已发出的列表请求 (城市, 页码)
    pub fn listing_calls(&self) -> Vec<(String, u32)> {
        self.listing_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn list_page(&self, city: &str, page: u32, _limit: usize) -> Result<Value, GatewayError> {
        if let Ok(mut calls) = self.listing_calls.lock() {
            calls.push((city.to_string(), page));
        }
        self.pages
            .get(&(city.to_lowercase(), page))
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "data": [] })))
    }

    async fn detail(&self, id: &str) -> Result<Value, GatewayError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details.get(id).cloned().unwrap_or_else(|| {
            Err(GatewayError::HttpStatus {
                code: 404,
                body: String::new(),
            })
        })
    }
}
