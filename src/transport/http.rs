//! reqwest 实现：向推荐端点发送单次 POST
//!
//! 超时默认 5 分钟：服务端需要查询天气并调用 LLM，计算可能很慢。
//! 错误分类：
//! - 非 2xx → ServerRejected（文案来自响应体 message/detail）
//! - 构造失败（URL 非法、序列化失败）→ RequestSetupFailed
//! - 其余（连接失败、超时、读取响应体失败）→ NoResponse

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::config::ApiSection;
use crate::core::{RecommendationItem, TransportError};
use crate::query::Query;
use crate::transport::wire::{decode_recommendations, extract_error_message, RecommendationRequest};
use crate::transport::RecommendationTransport;

/// HTTP 传输：持有共享 Client 与完整端点 URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// `base_url` 与 `path` 直接拼接；URL 合法性在发送时检查，失败表现为 RequestSetupFailed
    pub fn new(
        base_url: &str,
        path: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::RequestSetupFailed {
                reason: format!("build http client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: join_url(base_url, path),
        })
    }

    pub fn from_config(api: &ApiSection) -> Result<Self, TransportError> {
        Self::new(
            &api.base_url,
            &api.recommendations_path,
            Duration::from_secs(api.timeout_secs),
            Duration::from_secs(api.connect_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn classify_send_error(e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::RequestSetupFailed {
            reason: e.to_string(),
        }
    } else {
        let reason = if e.is_timeout() {
            format!("timed out: {e}")
        } else {
            e.to_string()
        };
        TransportError::NoResponse { reason }
    }
}

#[async_trait]
impl RecommendationTransport for HttpTransport {
    async fn send(&self, query: &Query) -> Result<Vec<RecommendationItem>, TransportError> {
        let started = Instant::now();
        tracing::info!(url = %self.endpoint, mood = %query.mood(), "recommendation api request");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&RecommendationRequest::from(query))
            .send()
            .await
            .map_err(|e| {
                let err = classify_send_error(e);
                tracing::warn!(
                    url = %self.endpoint,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "recommendation api error"
                );
                err
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            let err = TransportError::NoResponse {
                reason: format!("read body: {e}"),
            };
            tracing::warn!(
                url = %self.endpoint,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %err,
                "recommendation api error"
            );
            err
        })?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            let message = extract_error_message(&body);
            tracing::warn!(
                status = status.as_u16(),
                elapsed_ms,
                %message,
                "recommendation api rejected"
            );
            return Err(TransportError::ServerRejected {
                status_code: status.as_u16(),
                message,
            });
        }

        let items = decode_recommendations(&body);
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms,
            items = items.len(),
            "recommendation api response"
        );
        Ok(items)
    }
}
