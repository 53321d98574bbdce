//! 记录来源：分页列表与单条详情两个远端调用
//!
//! RecordSource 是远端数据的抽象接缝；HttpRecordSource 走真实 HTTP，MockRecordSource 用于测试。
//! 返回原始 JSON，解析与校验在 records 层完成。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::ApiSection;
use crate::remote::{GatewayError, RemoteGateway};

/// 远端司机数据来源
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// 请求某城市的第 page 页（从 1 开始）
    async fn list_page(&self, city: &str, page: u32, limit: usize) -> Result<Value, GatewayError>;

    /// 请求单个司机的详情
    async fn detail(&self, id: &str) -> Result<Value, GatewayError>;
}

/// 当前时间戳（毫秒），接口要求每个请求携带
pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 基于 HTTP 的记录来源
pub struct HttpRecordSource {
    gateway: RemoteGateway,
    listing_url: String,
    detail_url: String,
}

impl HttpRecordSource {
    pub fn new(gateway: RemoteGateway, listing_url: String, detail_url: String) -> Self {
        Self {
            gateway,
            listing_url,
            detail_url,
        }
    }

    pub fn from_config(api: &ApiSection) -> Result<Self, GatewayError> {
        Ok(Self::new(
            RemoteGateway::new(api.timeout_secs)?,
            api.listing_url(),
            api.detail_url(),
        ))
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn list_page(&self, city: &str, page: u32, limit: usize) -> Result<Value, GatewayError> {
        let payload = json!({
            "city": city,
            "limit": limit,
            "page": page,
            "timestamp": timestamp_ms(),
        });
        self.gateway.fetch(&self.listing_url, &payload).await
    }

    async fn detail(&self, id: &str) -> Result<Value, GatewayError> {
        let payload = json!({
            "partnerId": id,
            "timestamp": timestamp_ms(),
        });
        self.gateway.fetch(&self.detail_url, &payload).await
    }
}
