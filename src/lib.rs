//! FoodMood - 按心情与位置获取美食推荐的客户端核心
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误分类、生命周期状态、状态仓库、请求生命周期管理器、命令编排
//! - **location**: 定位提供方抽象
//! - **observability**: 日志初始化
//! - **query**: 查询规范化（坐标校验、心情枚举）
//! - **transport**: 推荐接口传输层（reqwest / 自动重试 / Mock）

pub mod config;
pub mod core;
pub mod location;
pub mod observability;
pub mod query;
pub mod transport;

pub use crate::core::{LifecycleState, RecommendationItem, RequestLifecycleManager, StateStore};
pub use crate::query::{Mood, Query, RawQuery};
