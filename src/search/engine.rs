//! 搜索引擎：翻页拉取 + 过滤重试
//!
//! advance_page：请求 page_cursor 页；非空页并发补全后写入缓存并推进游标，空页标记 exhausted（游标不动），
//! 请求失败既不推进游标也不标记 exhausted，只记录日志并上报 fetch_failed。
//!
//! run_filter：过滤未展示档案；为空且深度未达上限、来源未耗尽时，深度 +1、自动翻一页再用同一条件重试，
//! 直到命中、耗尽、拉取失败或深度达到上限。命中的档案标记为已展示。

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::SearchSection;
use crate::core::{AgentError, SessionState};
use crate::records::{parse_candidate_page, EnrichedRecord};
use crate::remote::RecordSource;
use crate::search::{filter_unseen, EnrichmentPipeline};

/// 一次翻页的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Fetched {
        page: u32,
        candidates: usize,
        enriched: usize,
        added: usize,
    },
    /// 上游已无更多数据
    Exhausted { page: u32 },
    /// 暂时性失败，可稍后重试
    FetchFailed { page: u32, error: String },
}

/// 一次 run_filter 的结果
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub matched: Vec<EnrichedRecord>,
    /// 本次调用内自动翻页重试的次数
    pub retries: u32,
    pub depth: u32,
    pub max_depth: u32,
    pub exhausted: bool,
    pub fetch_failed: bool,
}

impl FilterOutcome {
    /// 回写给决策模型的 JSON（档案为不含电话的摘要）
    pub fn to_json(&self) -> Value {
        let drivers: Vec<Value> = self.matched.iter().map(EnrichedRecord::summary).collect();
        serde_json::json!({
            "matched_drivers": drivers,
            "auto_fetches": self.retries,
            "filter_search_depth": self.depth,
            "max_filter_depth": self.max_depth,
            "no_more_drivers": self.exhausted,
            "fetch_failed": self.fetch_failed,
        })
    }
}

pub struct SearchEngine {
    source: Arc<dyn RecordSource>,
    pipeline: EnrichmentPipeline,
    settings: SearchSection,
}

impl SearchEngine {
    pub fn new(source: Arc<dyn RecordSource>, settings: SearchSection) -> Self {
        let pipeline = EnrichmentPipeline::new(source.clone(), settings.enrich_concurrency);
        Self {
            source,
            pipeline,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSection {
        &self.settings
    }

    /// 拉取下一页并补全写入缓存
    pub async fn advance_page(&self, state: &mut SessionState) -> Result<PageOutcome, AgentError> {
        let city = state.location.clone().ok_or(AgentError::LocationNotSet)?;
        let page = state.page_cursor;
        if state.exhausted {
            return Ok(PageOutcome::Exhausted { page });
        }

        tracing::info!(city = %city, page, "fetching page of premium drivers");
        let response = match self
            .source
            .list_page(&city, page, self.settings.page_limit)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    city = %city,
                    page,
                    error = %e,
                    "driver listing failed, treating as zero candidates"
                );
                return Ok(PageOutcome::FetchFailed {
                    page,
                    error: e.to_string(),
                });
            }
        };

        let raw_count = response
            .get("data")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if raw_count == 0 {
            tracing::info!(city = %city, page, "no more premium drivers upstream");
            state.exhausted = true;
            return Ok(PageOutcome::Exhausted { page });
        }

        let candidates = parse_candidate_page(&response);
        let candidate_count = candidates.len();
        let report = self.pipeline.enrich_page(candidates).await;
        let enriched = report.records.len();
        let added = state.cache.upsert_many(report.records);
        state.page_cursor += 1;

        Ok(PageOutcome::Fetched {
            page,
            candidates: candidate_count,
            enriched,
            added,
        })
    }

    /// 过滤未展示档案，必要时自动翻页重试
    pub async fn run_filter(&self, state: &mut SessionState) -> FilterOutcome {
        let max_depth = self.settings.max_filter_depth;
        let mut retries = 0;
        let mut fetch_failed = false;

        loop {
            let matched: Vec<EnrichedRecord> = filter_unseen(
                &state.cache,
                &state.active_filters,
                self.settings.present_limit,
            )
            .into_iter()
            .cloned()
            .collect();

            let can_retry = matched.is_empty()
                && state.filter_retry_depth < max_depth
                && !state.exhausted
                && !fetch_failed
                && state.location.is_some();

            if !can_retry {
                state.cache.mark_presented(matched.iter().map(EnrichedRecord::id));
                return FilterOutcome {
                    matched,
                    retries,
                    depth: state.filter_retry_depth,
                    max_depth,
                    exhausted: state.exhausted,
                    fetch_failed,
                };
            }

            state.filter_retry_depth += 1;
            retries += 1;
            tracing::info!(
                depth = state.filter_retry_depth,
                max_depth,
                filters = ?state.active_filters,
                "no unseen match, fetching another page"
            );
            match self.advance_page(state).await {
                Ok(PageOutcome::FetchFailed { .. }) => fetch_failed = true,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "retry fetch skipped");
                    fetch_failed = true;
                }
            }
        }
    }
}
