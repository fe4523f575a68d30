//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `FOODMOOD__*` 覆盖（双下划线表示嵌套，如 `FOODMOOD__API__BASE_URL=http://10.0.0.2:8000`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub lifecycle: LifecycleSection,
    #[serde(default)]
    pub location: LocationSection,
}

/// [app] 段：应用名与默认日志级别
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// RUST_LOG 未设置时使用
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// [api] 段：推荐服务地址与超时
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_recommendations_path")]
    pub recommendations_path: String,
    /// 单次请求总超时（秒）；服务端要查天气并调用 LLM，默认 5 分钟
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetrySection,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            recommendations_path: default_recommendations_path(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry: RetrySection::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_recommendations_path() -> String {
    "/api/recommendations".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// [api.retry] 段：NoResponse 的自动重试（max_retries = 0 即关闭）
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    5000
}

/// [lifecycle] 段
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleSection {
    /// 请求被取代时是否取消底层网络调用
    #[serde(default = "default_cancel_superseded")]
    pub cancel_superseded: bool,
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            cancel_superseded: default_cancel_superseded(),
        }
    }
}

fn default_cancel_superseded() -> bool {
    true
}

/// [location] 段：固定坐标（CLI 用）；未设置视为定位不可用
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LocationSection {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// 从 config 目录加载配置，环境变量 FOODMOOD__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 FOODMOOD__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("FOODMOOD")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.api.recommendations_path, "/api/recommendations");
        assert_eq!(cfg.api.timeout_secs, 300);
        assert_eq!(cfg.api.retry.max_retries, 0);
        assert!(cfg.lifecycle.cancel_superseded);
        assert!(cfg.location.latitude.is_none());
        assert_eq!(cfg.app.log_level, "info");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://192.168.1.20:8000"
timeout_secs = 60

[api.retry]
max_retries = 2

[lifecycle]
cancel_superseded = false

[location]
latitude = 37.7749
longitude = -122.4194
"#
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.api.base_url, "http://192.168.1.20:8000");
        assert_eq!(cfg.api.timeout_secs, 60);
        assert_eq!(cfg.api.recommendations_path, "/api/recommendations");
        assert_eq!(cfg.api.retry.max_retries, 2);
        assert_eq!(cfg.api.retry.initial_backoff_ms, 500);
        assert!(!cfg.lifecycle.cancel_superseded);
        assert_eq!(cfg.location.latitude, Some(37.7749));
    }
}
