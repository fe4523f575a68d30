//! 状态仓库：单写者、可订阅的生命周期快照容器
//!
//! 写端（StateStore）不可克隆，由 RequestLifecycleManager 独占；读端（StateReader）可任意克隆，
//! 读取永不阻塞。每次发布都是整体替换，读者不会看到部分更新的状态。

use tokio::sync::watch;

use crate::core::LifecycleState;

/// 写端：创建时为 Idle
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<LifecycleState>,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LifecycleState::Idle);
        Self { tx }
    }

    pub fn current(&self) -> LifecycleState {
        self.tx.borrow().clone()
    }

    pub fn reader(&self) -> StateReader {
        StateReader {
            rx: self.tx.subscribe(),
        }
    }

    /// 整体替换当前快照并通知所有订阅者
    pub(crate) fn publish(&self, state: LifecycleState) {
        tracing::debug!(status = state.label(), "lifecycle state published");
        self.tx.send_replace(state);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 读端：视图层持有，用于读取快照与等待变更
#[derive(Debug, Clone)]
pub struct StateReader {
    rx: watch::Receiver<LifecycleState>,
}

impl StateReader {
    pub fn current(&self) -> LifecycleState {
        self.rx.borrow().clone()
    }

    /// 等待下一次发布；写端已销毁时返回 None
    pub async fn changed(&mut self) -> Option<LifecycleState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// 等待直到快照满足条件（若当前已满足则立即返回）
    pub async fn wait_until<F>(&mut self, mut predicate: F) -> Option<LifecycleState>
    where
        F: FnMut(&LifecycleState) -> bool,
    {
        self.rx
            .wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| state.clone())
    }
}
