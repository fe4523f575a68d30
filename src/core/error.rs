//! 错误分类：传输错误与统一的推荐错误
//!
//! 所有错误最终都落在 `LifecycleState::Failed` 中：一条面向用户的文案 + 底层 ErrorKind（仅用于日志）。
//! 任何错误都不会越过生命周期管理器抛给视图层。

use serde::Serialize;
use thiserror::Error;

use crate::query::ValidationError;

/// 服务端未给出 message/detail 时的兜底文案
pub const DEFAULT_SERVER_MESSAGE: &str = "Failed to fetch recommendations";

/// 传输层失败的三种形态
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransportError {
    /// 服务端返回非 2xx；message 取自响应体，缺失时为兜底文案
    #[error("server rejected request ({status_code}): {message}")]
    ServerRejected { status_code: u16, message: String },

    /// 请求已发出但未收到响应（超时、断网、连接被拒）
    #[error("no response: {reason}")]
    NoResponse { reason: String },

    /// 请求无法构造或发出（URL 非法、客户端配置错误）
    #[error("request setup failed: {reason}")]
    RequestSetupFailed { reason: String },
}

/// 错误种类（日志/遥测用，不直接展示给用户）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Validation,
    ServerRejected,
    NoResponse,
    RequestSetupFailed,
}

/// Failed 状态携带的错误
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum RecommendationError {
    #[error("invalid query: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RecommendationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendationError::Validation(_) => ErrorKind::Validation,
            RecommendationError::Transport(TransportError::ServerRejected { .. }) => {
                ErrorKind::ServerRejected
            }
            RecommendationError::Transport(TransportError::NoResponse { .. }) => {
                ErrorKind::NoResponse
            }
            RecommendationError::Transport(TransportError::RequestSetupFailed { .. }) => {
                ErrorKind::RequestSetupFailed
            }
        }
    }

    /// 面向用户的单条文案；ServerRejected 原样使用服务端 message
    pub fn user_message(&self) -> String {
        match self {
            RecommendationError::Validation(e) => format!("Please check your input: {e}."),
            RecommendationError::Transport(TransportError::ServerRejected { message, .. }) => {
                message.clone()
            }
            RecommendationError::Transport(TransportError::NoResponse { .. }) => {
                "No response from the recommendation service. Check your connection and try again."
                    .to_string()
            }
            RecommendationError::Transport(TransportError::RequestSetupFailed { .. }) => {
                "Could not send the recommendation request.".to_string()
            }
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            RecommendationError::Validation(e) => Some(e),
            RecommendationError::Transport(_) => None,
        }
    }
}
