//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub api_base_url: String,
    pub ws_url: String,
    pub pocketbase_url: Option<String>,
    pub legacy_host: Option<String>,
    pub legacy_port: Option<u16>,
    pub ws_reconnect_ms: u64,
    pub http_timeout_ms: Option<u64>,
    pub realtime_enabled: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    ///
    /// API 地址缺失时回退到旧版 host/port 组合（`http://{host}:{port}`）。
    pub fn from_env() -> Result<Self, ConfigError> {
        let legacy_host = read_first_optional(&["HYDRO_LEGACY_HOST", "VITE_HOST"]);
        let legacy_port = read_first_optional_u16(&["HYDRO_LEGACY_PORT", "VITE_PORT"])?;
        let api_base_url = match read_first_optional(&["HYDRO_API_URL", "VITE_API"]) {
            Some(url) => url,
            None => match (legacy_host.as_deref(), legacy_port) {
                (Some(host), Some(port)) => format!("http://{host}:{port}"),
                _ => return Err(ConfigError::Missing("HYDRO_API_URL".to_string())),
            },
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        let ws_url = read_first_optional(&["HYDRO_WS_URL", "VITE_WS"])
            .ok_or_else(|| ConfigError::Missing("HYDRO_WS_URL".to_string()))?;
        if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid("HYDRO_WS_URL".to_string(), ws_url));
        }
        let pocketbase_url = read_first_optional(&["HYDRO_POCKETBASE_URL", "VITE_POCKETBASE_URL"]);
        let http_addr =
            env::var("HYDRO_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8090".to_string());
        let ws_reconnect_ms = read_u64_with_default("HYDRO_WS_RECONNECT_MS", 5000)?;
        let http_timeout_ms =
            read_optional_u64("HYDRO_HTTP_TIMEOUT_MS")?.filter(|value| *value > 0);
        let realtime_enabled = read_bool_with_default("HYDRO_REALTIME", true);

        Ok(Self {
            http_addr,
            api_base_url,
            ws_url,
            pocketbase_url,
            legacy_host,
            legacy_port,
            ws_reconnect_ms,
            http_timeout_ms,
            realtime_enabled,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

/// 按顺序读取第一个非空的变量（新名优先，旧名兼容）。
fn read_first_optional(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| read_optional(key))
}

fn read_first_optional_u16(keys: &[&str]) -> Result<Option<u16>, ConfigError> {
    for key in keys {
        if let Some(value) = read_optional(key) {
            return value
                .parse::<u16>()
                .map(Some)
                .map_err(|_| ConfigError::Invalid(key.to_string(), value));
        }
    }
    Ok(None)
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
