//! 请求生命周期管理器：LifecycleState 的唯一写者
//!
//! - submit：规范化 → 分配代号 → Loading → 异步调用传输层
//! - 完成回调携带发起时的代号，仅当与当前 Loading 代号一致时才写入 Success/Failed
//! - retry：仅在 Failed 状态下重放查询；clear：回到 Idle 并使进行中的请求失效
//!
//! 状态机与代号计数器由同一把锁保护，锁从不跨越 await；网络调用在锁外的独立任务中执行。
//! 可选地在请求被取代时取消底层 future（仅节省资源，是否接受结果仍由代号决定）。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::config::LifecycleSection;
use crate::core::lifecycle::{Generation, Lifecycle};
use crate::core::{LifecycleState, RecommendationItem, StateReader, StateStore, TransportError};
use crate::query::{Query, RawQuery};
use crate::transport::RecommendationTransport;

/// 管理器选项
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// 被新请求或 clear 取代时取消进行中的网络调用
    pub cancel_superseded: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            cancel_superseded: true,
        }
    }
}

impl From<&LifecycleSection> for ManagerOptions {
    fn from(section: &LifecycleSection) -> Self {
        Self {
            cancel_superseded: section.cancel_superseded,
        }
    }
}

struct Guarded {
    lifecycle: Lifecycle,
    in_flight: Option<CancellationToken>,
}

impl Guarded {
    fn supersede_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

struct Inner {
    transport: Arc<dyn RecommendationTransport>,
    store: StateStore,
    guarded: Mutex<Guarded>,
    options: ManagerOptions,
}

/// 可克隆句柄；所有克隆共享同一个状态仓库。submit/retry 需在 Tokio 运行时内调用。
#[derive(Clone)]
pub struct RequestLifecycleManager {
    inner: Arc<Inner>,
}

impl RequestLifecycleManager {
    pub fn new(
        transport: Arc<dyn RecommendationTransport>,
        store: StateStore,
        options: ManagerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                store,
                guarded: Mutex::new(Guarded {
                    lifecycle: Lifecycle::default(),
                    in_flight: None,
                }),
                options,
            }),
        }
    }

    /// 使用全新状态仓库与默认选项
    pub fn with_transport(transport: Arc<dyn RecommendationTransport>) -> Self {
        Self::new(transport, StateStore::new(), ManagerOptions::default())
    }

    /// 当前快照（只读，不阻塞）
    pub fn current_state(&self) -> LifecycleState {
        self.inner.store.current()
    }

    pub fn subscribe(&self) -> StateReader {
        self.inner.store.reader()
    }

    /// 提交原始查询；校验失败时直接进入 Failed，不触网
    pub fn submit(&self, raw: RawQuery) {
        match raw.normalize() {
            Ok(query) => {
                let mut guarded = self.lock();
                let (generation, token) = self.begin_locked(&mut guarded, query.clone());
                drop(guarded);
                self.dispatch(generation, query, token);
            }
            Err(e) => {
                tracing::warn!(error = %e, "query rejected by normalizer; no request issued");
                let mut guarded = self.lock();
                guarded.supersede_in_flight();
                guarded.lifecycle.reject(e);
                self.inner.store.publish(guarded.lifecycle.state().clone());
            }
        }
    }

    /// 在 Failed 状态下重放查询并分配新代号；返回是否发起了新请求
    pub fn retry(&self) -> bool {
        let mut guarded = self.lock();
        let Some(query) = guarded.lifecycle.retry_target() else {
            tracing::debug!(
                status = guarded.lifecycle.state().label(),
                "retry ignored: nothing to retry"
            );
            return false;
        };
        let (generation, token) = self.begin_locked(&mut guarded, query.clone());
        drop(guarded);
        tracing::info!(%generation, query = %query, "retrying recommendation request");
        self.dispatch(generation, query, token);
        true
    }

    /// 回到 Idle；之后到达的旧结果按过期处理
    pub fn clear(&self) {
        let mut guarded = self.lock();
        guarded.supersede_in_flight();
        guarded.lifecycle.clear();
        self.inner.store.publish(guarded.lifecycle.state().clone());
    }

    fn lock(&self) -> MutexGuard<'_, Guarded> {
        self.inner
            .guarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_locked(
        &self,
        guarded: &mut Guarded,
        query: Query,
    ) -> (Generation, CancellationToken) {
        guarded.supersede_in_flight();
        let generation = guarded.lifecycle.begin(query);
        let token = CancellationToken::new();
        guarded.in_flight = Some(token.clone());
        self.inner.store.publish(guarded.lifecycle.state().clone());
        (generation, token)
    }

    fn dispatch(&self, generation: Generation, query: Query, token: CancellationToken) {
        tracing::info!(%generation, query = %query, "recommendation request issued");
        let this = self.clone();
        tokio::spawn(async move {
            let transport = Arc::clone(&this.inner.transport);
            let result = if this.inner.options.cancel_superseded {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(%generation, "superseded request cancelled");
                        return;
                    }
                    result = transport.send(&query) => result,
                }
            } else {
                transport.send(&query).await
            };
            this.complete(generation, result);
        });
    }

    fn complete(
        &self,
        generation: Generation,
        result: Result<Vec<RecommendationItem>, TransportError>,
    ) {
        let mut guarded = self.lock();
        let outcome = match &result {
            Ok(items) => format!("{} items", items.len()),
            Err(e) => e.to_string(),
        };
        if guarded.lifecycle.complete(generation, result) {
            guarded.in_flight = None;
            let state = guarded.lifecycle.state().clone();
            if let Some(error) = state.error() {
                tracing::warn!(
                    %generation,
                    kind = ?error.kind(),
                    error = %error,
                    "recommendation request failed"
                );
            } else {
                tracing::info!(%generation, %outcome, "recommendation request succeeded");
            }
            self.inner.store.publish(state);
        } else {
            tracing::debug!(
                %generation,
                current = ?guarded.lifecycle.loading_generation(),
                %outcome,
                "stale response dropped"
            );
        }
    }
}
