//! 核心层：错误分类、生命周期状态、状态仓库、代号守卫、生命周期管理器与编排

pub mod error;
pub(crate) mod lifecycle;
pub mod manager;
pub mod orchestrator;
pub mod state;
pub mod store;

pub use error::{ErrorKind, RecommendationError, TransportError, DEFAULT_SERVER_MESSAGE};
pub use manager::{ManagerOptions, RequestLifecycleManager};
pub use orchestrator::{build_transport, create_app, spawn_command_loop, Command};
pub use state::{LifecycleState, RecommendationItem};
pub use store::{StateReader, StateStore};
