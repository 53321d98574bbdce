//! 远端层：HTTP 网关与记录来源

pub mod client;
pub mod mock;
pub mod source;

pub use client::{GatewayError, RemoteGateway};
pub use mock::MockRecordSource;
pub use source::{timestamp_ms, HttpRecordSource, RecordSource};
