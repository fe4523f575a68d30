//! 纯状态机：代号（Generation）分配与过期结果抑制
//!
//! 只有与当前 Loading 状态代号一致的完成结果才会被接受；其余结果一律丢弃且不改变状态。
//! 本模块不做 I/O，由 RequestLifecycleManager 加锁驱动并负责发布快照。

use crate::core::{LifecycleState, RecommendationItem, TransportError};
use crate::query::{Query, ValidationError};

/// 单调递增的请求代号，仅用于区分先后重叠的请求；只在 crate 内部流转，不进入快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub(crate) struct Generation(u64);

impl Generation {
    fn next(self) -> Generation {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: LifecycleState,
    /// 最近一次分配的代号；仅当 state 为 Loading 时它才是「当前」代号
    generation: Generation,
    /// 最近一次被接受（通过校验）的查询，供校验失败后的 retry 回放
    last_accepted: Option<Query>,
}

impl Lifecycle {
    pub(crate) fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// 当前 Loading 请求的代号；非 Loading 状态下为 None
    pub(crate) fn loading_generation(&self) -> Option<Generation> {
        self.state.is_loading().then_some(self.generation)
    }

    /// 接受新查询：分配 G = 上一代号 + 1，进入 Loading（不保留旧条目）
    pub(crate) fn begin(&mut self, query: Query) -> Generation {
        let generation = self.generation.next();
        self.generation = generation;
        self.last_accepted = Some(query.clone());
        self.state = LifecycleState::Loading { query };
        generation
    }

    /// 校验失败：直接进入 Failed，进行中的请求随之失效
    pub(crate) fn reject(&mut self, error: ValidationError) {
        self.state = LifecycleState::Failed {
            query: None,
            error: error.into(),
        };
    }

    /// 应用传输结果；返回 false 表示结果已过期被丢弃
    pub(crate) fn complete(
        &mut self,
        generation: Generation,
        result: Result<Vec<RecommendationItem>, TransportError>,
    ) -> bool {
        if self.loading_generation() != Some(generation) {
            return false;
        }
        let query = match &self.state {
            LifecycleState::Loading { query } => query.clone(),
            _ => return false,
        };
        self.state = match result {
            Ok(items) => LifecycleState::Success { query, items },
            Err(e) => LifecycleState::Failed {
                query: Some(query),
                error: e.into(),
            },
        };
        true
    }

    pub(crate) fn clear(&mut self) {
        self.state = LifecycleState::Idle;
        self.last_accepted = None;
    }

    /// retry 的目标查询：仅在 Failed 状态下存在
    pub(crate) fn retry_target(&self) -> Option<Query> {
        match &self.state {
            LifecycleState::Failed { query: Some(q), .. } => Some(q.clone()),
            LifecycleState::Failed { query: None, .. } => self.last_accepted.clone(),
            _ => None,
        }
    }
}
