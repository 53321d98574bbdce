//! 详情补全流水线
//!
//! 对一页候选记录并发请求详情（有界并发，默认 10），合并为档案。
//! 单条失败（请求错误、无详情、校验失败）只丢弃该条，不影响同批其它记录，也不向上传播。
//! 并发池随批次创建与销毁；完成顺序不保证。

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};

use crate::records::{extract_detail, merge_detail, CandidateRecord, EnrichedRecord};
use crate::remote::RecordSource;

/// 单条补全失败原因（仅用于日志与统计）
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichFailure {
    Gateway(String),
    NoDetail,
    Invalid(String),
}

/// 一批补全的结果
#[derive(Debug, Default)]
pub struct EnrichReport {
    pub records: Vec<EnrichedRecord>,
    pub failures: Vec<(String, EnrichFailure)>,
}

pub struct EnrichmentPipeline {
    source: Arc<dyn RecordSource>,
    concurrency: usize,
}

impl EnrichmentPipeline {
    pub fn new(source: Arc<dyn RecordSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    async fn enrich_one(
        &self,
        candidate: CandidateRecord,
    ) -> Result<EnrichedRecord, (String, EnrichFailure)> {
        let id = candidate.id.clone();
        let response = self
            .source
            .detail(&id)
            .await
            .map_err(|e| (id.clone(), EnrichFailure::Gateway(e.to_string())))?;
        let detail =
            extract_detail(&response).ok_or_else(|| (id.clone(), EnrichFailure::NoDetail))?;
        merge_detail(&candidate, detail).map_err(|e| (id, EnrichFailure::Invalid(e.to_string())))
    }

    /// 并发补全一页候选记录；按完成顺序收集
    pub async fn enrich_page(&self, candidates: Vec<CandidateRecord>) -> EnrichReport {
        let total = candidates.len();
        let mut results = stream::iter(candidates)
            .map(|c| self.enrich_one(c))
            .buffer_unordered(self.concurrency);

        let mut report = EnrichReport::default();
        while let Some(result) = results.next().await {
            match result {
                Ok(record) => {
                    tracing::debug!(id = %record.id(), "fetched driver details");
                    report.records.push(record);
                }
                Err((id, failure)) => {
                    tracing::warn!(
                        id = %id,
                        reason = ?failure,
                        "discarding driver without usable details"
                    );
                    report.failures.push((id, failure));
                }
            }
        }
        tracing::info!(
            total,
            enriched = report.records.len(),
            failed = report.failures.len(),
            "enrichment batch finished"
        );
        report
    }
}
