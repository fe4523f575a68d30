//! 传输层：推荐接口的 HTTP 调用抽象与实现（reqwest / 自动重试装饰器 / Mock）
//!
//! 只负责超时、请求序列化与响应解码，不持有任何业务状态，也不会自行重试（除非显式套上 RetryingTransport）。

pub mod http;
pub mod mock;
pub mod retry;
pub mod traits;
pub mod wire;

pub use http::HttpTransport;
pub use mock::{MockController, MockTransport, PendingCall};
pub use retry::{RetryConfig, RetryingTransport};
pub use traits::RecommendationTransport;
pub use wire::{decode_recommendations, extract_error_message, RecommendationRequest};
