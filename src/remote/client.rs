//! 远端网关：POST JSON，固定超时，错误统一为 GatewayError
//!
//! 请求与响应只写日志，不影响控制流；传输失败、非 2xx、非法 JSON 都以带标签的错误返回，调用方自行分支。

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// 响应体日志预览最大字符数
const BODY_PREVIEW_CHARS: usize = 500;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {code}")]
    HttpStatus { code: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 远端网关：持有带超时的 reqwest Client
#[derive(Clone)]
pub struct RemoteGateway {
    client: Client,
}

fn preview(body: &str) -> String {
    if body.chars().count() > BODY_PREVIEW_CHARS {
        format!(
            "{}...",
            body.chars().take(BODY_PREVIEW_CHARS).collect::<String>()
        )
    } else {
        body.to_string()
    }
}

impl RemoteGateway {
    pub fn new(timeout_secs: u64) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// 发送 POST 请求并解析 JSON 响应
    pub async fn fetch(&self, url: &str, payload: &Value) -> Result<Value, GatewayError> {
        tracing::debug!(url = %url, payload = %payload, "api request");

        let resp = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                };
                tracing::warn!(url = %url, error = %err, "api request failed");
                err
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            let err = if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(format!("read body: {e}"))
            };
            tracing::warn!(url = %url, error = %err, "api response body unreadable");
            err
        })?;
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            body = %preview(&body),
            "api response"
        );

        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "api returned error status");
            return Err(GatewayError::HttpStatus {
                code: status.as_u16(),
                body: preview(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "api returned invalid JSON");
            GatewayError::Malformed(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_bodies() {
        let long = "x".repeat(BODY_PREVIEW_CHARS + 10);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), BODY_PREVIEW_CHARS + 3);
        assert_eq!(preview("ok"), "ok");
    }
}
