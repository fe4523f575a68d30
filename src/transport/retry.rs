//! 自动重试装饰器（可选，默认关闭）
//!
//! 只对 NoResponse 做有限次数的指数退避重试；ServerRejected 与 RequestSetupFailed 原样返回。
//! 生命周期管理器本身从不自动重试，用户可见的重试永远经由 retry()。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::RetrySection;
use crate::core::{RecommendationItem, TransportError};
use crate::query::Query;
use crate::transport::RecommendationTransport;

/// 重试参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// 首次失败后最多再试几次；0 表示不重试
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

impl From<&RetrySection> for RetryConfig {
    fn from(section: &RetrySection) -> Self {
        Self {
            max_retries: section.max_retries,
            initial_backoff: Duration::from_millis(section.initial_backoff_ms),
            max_backoff: Duration::from_millis(section.max_backoff_ms),
        }
    }
}

impl RetryConfig {
    /// 第 attempt 次重试前的等待（attempt 从 0 开始），按 2 的幂增长并封顶
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// 包装任意传输，为 NoResponse 增加退避重试
pub struct RetryingTransport {
    inner: Arc<dyn RecommendationTransport>,
    config: RetryConfig,
}

impl RetryingTransport {
    pub fn new(inner: Arc<dyn RecommendationTransport>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl RecommendationTransport for RetryingTransport {
    async fn send(&self, query: &Query) -> Result<Vec<RecommendationItem>, TransportError> {
        let mut attempt = 0u32;
        loop {
            match self.inner.send(query).await {
                Err(TransportError::NoResponse { reason }) if attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        %reason,
                        "no response, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
