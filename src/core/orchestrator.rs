//! 编排器：装配传输层/管理器并消费视图层命令
//!
//! 负责：按配置创建 HTTP 传输（可选自动重试）、状态仓库与生命周期管理器，
//! 建立 cmd/state 两通道，并在后台任务中消费命令（SelectMood/Submit/Retry/Clear/Quit）。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::core::{
    ManagerOptions, RequestLifecycleManager, StateReader, StateStore, TransportError,
};
use crate::location::{location_from_config, LocationProvider};
use crate::query::RawQuery;
use crate::transport::{HttpTransport, RecommendationTransport, RetryConfig, RetryingTransport};

/// 从视图层发往编排器的命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 选择心情：先取定位，拿到坐标后提交查询
    SelectMood(String),
    /// 直接提交完整查询
    Submit(RawQuery),
    Retry,
    Clear,
    Quit,
}

/// 根据配置创建传输层：HttpTransport，max_retries > 0 时外包一层 RetryingTransport
pub fn build_transport(
    cfg: &AppConfig,
) -> Result<Arc<dyn RecommendationTransport>, TransportError> {
    let http: Arc<dyn RecommendationTransport> = Arc::new(HttpTransport::from_config(&cfg.api)?);
    if cfg.api.retry.max_retries > 0 {
        tracing::info!(
            max_retries = cfg.api.retry.max_retries,
            "automatic retry enabled for no-response errors"
        );
        Ok(Arc::new(RetryingTransport::new(
            http,
            RetryConfig::from(&cfg.api.retry),
        )))
    } else {
        Ok(http)
    }
}

/// 创建运行时：返回命令发送端、状态读端与后台任务句柄
pub fn create_app(
    cfg: &AppConfig,
) -> Result<(mpsc::UnboundedSender<Command>, StateReader, JoinHandle<()>), TransportError> {
    let transport = build_transport(cfg)?;
    let manager = RequestLifecycleManager::new(
        transport,
        StateStore::new(),
        ManagerOptions::from(&cfg.lifecycle),
    );
    let reader = manager.subscribe();
    let (cmd_tx, handle) = spawn_command_loop(manager, location_from_config(&cfg.location));
    Ok((cmd_tx, reader, handle))
}

/// 后台消费命令；发送端全部关闭或收到 Quit 时退出
pub fn spawn_command_loop(
    manager: RequestLifecycleManager,
    location: Arc<dyn LocationProvider>,
) -> (mpsc::UnboundedSender<Command>, JoinHandle<()>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();

    let handle = tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::SelectMood(mood) => match location.current().await {
                    Ok(coords) => {
                        manager.submit(RawQuery::new(coords.latitude, coords.longitude, mood));
                    }
                    Err(e) => {
                        // 没有坐标就不能提交查询，状态保持不变
                        tracing::warn!(
                            error = %e,
                            %mood,
                            "location unavailable, no request issued"
                        );
                    }
                },
                Command::Submit(raw) => manager.submit(raw),
                Command::Retry => {
                    manager.retry();
                }
                Command::Clear => manager.clear(),
                Command::Quit => break,
            }
        }
        tracing::debug!(
            status = manager.current_state().label(),
            "command loop stopped"
        );
    });

    (cmd_tx, handle)
}
