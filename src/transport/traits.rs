//! 推荐传输抽象
//!
//! 所有实现（HTTP / 重试装饰器 / Mock）实现 RecommendationTransport::send：单次 POST，返回有序推荐列表。

use async_trait::async_trait;

use crate::core::{RecommendationItem, TransportError};
use crate::query::Query;

/// 推荐传输 trait：发送一次查询并解码结果
#[async_trait]
pub trait RecommendationTransport: Send + Sync {
    async fn send(&self, query: &Query) -> Result<Vec<RecommendationItem>, TransportError>;
}
