//! 定位提供方（外部协作者）
//!
//! 返回当前坐标，或权限/不可用错误；拿不到坐标时核心层不会发起任何请求。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LocationSection;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current(&self) -> Result<Coordinates, LocationError>;
}

/// 固定坐标（配置或测试）
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// 始终失败的定位
#[derive(Debug, Clone)]
pub struct UnavailableLocation(pub LocationError);

#[async_trait]
impl LocationProvider for UnavailableLocation {
    async fn current(&self) -> Result<Coordinates, LocationError> {
        Err(self.0.clone())
    }
}

/// [location] 段两个坐标都设置时返回固定定位，否则视为不可用
pub fn location_from_config(section: &LocationSection) -> Arc<dyn LocationProvider> {
    match (section.latitude, section.longitude) {
        (Some(latitude), Some(longitude)) => Arc::new(FixedLocation(Coordinates {
            latitude,
            longitude,
        })),
        _ => Arc::new(UnavailableLocation(LocationError::Unavailable(
            "no [location] configured".to_string(),
        ))),
    }
}
