//! 记录层：候选司机、补全档案与校验
//!
//! 所有解析都是「校验或丢弃」：返回 Result，由调用方决定丢弃，从不 panic。

pub mod candidate;
pub mod enriched;

use thiserror::Error;

pub use candidate::{parse_candidate, parse_candidate_page, CandidateRecord, Vehicle};
pub use enriched::{extract_detail, merge_detail, Bio, EnrichedRecord};

/// 远端记录未通过结构校验
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("enriched identity does not match candidate")]
    IdentityMismatch,
}
