//! Mock 传输（用于测试，无需网络）
//!
//! 每次 send 都会挂起，并把 PendingCall 交给 MockController；测试方可以任意顺序完成这些调用，
//! 从而人为制造「后发先至」等乱序场景。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::core::{RecommendationItem, TransportError};
use crate::query::Query;
use crate::transport::RecommendationTransport;

type Reply = Result<Vec<RecommendationItem>, TransportError>;

/// 传输端：交给 RequestLifecycleManager
#[derive(Debug)]
pub struct MockTransport {
    calls_tx: mpsc::UnboundedSender<PendingCall>,
    sent: Arc<AtomicUsize>,
}

/// 控制端：由测试持有，逐个取出挂起的调用
#[derive(Debug)]
pub struct MockController {
    calls_rx: mpsc::UnboundedReceiver<PendingCall>,
    sent: Arc<AtomicUsize>,
}

/// 一次尚未完成的 send
#[derive(Debug)]
pub struct PendingCall {
    query: Query,
    responder: oneshot::Sender<Reply>,
}

impl MockTransport {
    pub fn new() -> (Self, MockController) {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls_tx,
                sent: Arc::clone(&sent),
            },
            MockController { calls_rx, sent },
        )
    }
}

#[async_trait]
impl RecommendationTransport for MockTransport {
    async fn send(&self, query: &Query) -> Result<Vec<RecommendationItem>, TransportError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let (responder, reply) = oneshot::channel();
        self.calls_tx
            .send(PendingCall {
                query: query.clone(),
                responder,
            })
            .map_err(|_| TransportError::NoResponse {
                reason: "mock controller dropped".to_string(),
            })?;
        reply.await.unwrap_or_else(|_| {
            Err(TransportError::NoResponse {
                reason: "mock call abandoned".to_string(),
            })
        })
    }
}

impl MockController {
    /// 等待下一次 send；传输端全部销毁时返回 None
    pub async fn next_call(&mut self) -> Option<PendingCall> {
        self.calls_rx.recv().await
    }

    pub fn try_next_call(&mut self) -> Option<PendingCall> {
        self.calls_rx.try_recv().ok()
    }

    /// 累计 send 次数
    pub fn calls_made(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

impl PendingCall {
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// 完成调用；返回 false 表示调用方已放弃（例如被取消）
    pub fn respond(self, reply: Reply) -> bool {
        self.responder.send(reply).is_ok()
    }

    pub fn succeed(self, items: Vec<RecommendationItem>) -> bool {
        self.respond(Ok(items))
    }

    pub fn fail(self, error: TransportError) -> bool {
        self.respond(Err(error))
    }

    /// 等待调用方放弃该调用
    pub async fn closed(mut self) {
        self.responder.closed().await;
    }
}
