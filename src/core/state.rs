//! 生命周期状态：视图层唯一可见的快照
//!
//! 任一时刻只有一个变体处于激活状态；状态整体替换，不存在部分更新。

use serde::{Deserialize, Serialize};

use crate::core::RecommendationError;
use crate::query::Query;

/// 单条推荐（仅由成功响应解码产生，构造后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// 推荐请求的生命周期快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LifecycleState {
    /// 尚未发起任何查询
    Idle,
    /// 请求进行中；不携带任何旧结果
    Loading { query: Query },
    Success {
        query: Query,
        items: Vec<RecommendationItem>,
    },
    /// 校验失败时 query 为 None（非法输入从未成为被接受的查询）
    Failed {
        query: Option<Query>,
        error: RecommendationError,
    },
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::Idle
    }
}

impl LifecycleState {
    pub fn is_idle(&self) -> bool {
        matches!(self, LifecycleState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LifecycleState::Loading { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LifecycleState::Failed { .. })
    }

    /// 当前状态关联的查询（Idle 与校验失败时为 None）
    pub fn query(&self) -> Option<&Query> {
        match self {
            LifecycleState::Idle => None,
            LifecycleState::Loading { query } | LifecycleState::Success { query, .. } => {
                Some(query)
            }
            LifecycleState::Failed { query, .. } => query.as_ref(),
        }
    }

    /// 推荐列表；非 Success 状态返回空切片
    pub fn items(&self) -> &[RecommendationItem] {
        match self {
            LifecycleState::Success { items, .. } => items,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&RecommendationError> {
        match self {
            LifecycleState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Failed 状态下展示给用户的文案（总是与重试入口一起展示）
    pub fn user_message(&self) -> Option<String> {
        self.error().map(RecommendationError::user_message)
    }

    /// 状态名（日志用）
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Loading { .. } => "loading",
            LifecycleState::Success { .. } => "success",
            LifecycleState::Failed { .. } => "failed",
        }
    }
}
