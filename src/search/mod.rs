//! 搜索层：档案缓存、过滤引擎、详情补全流水线、翻页与过滤重试

pub mod cache;
pub mod engine;
pub mod enrich;
pub mod filter;

pub use cache::RecordCache;
pub use engine::{FilterOutcome, PageOutcome, SearchEngine};
pub use enrich::{EnrichFailure, EnrichReport, EnrichmentPipeline};
pub use filter::{filter_unseen, FilterCriteria};
