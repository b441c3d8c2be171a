//! 应用配置模块
//!
//! # 设计思路
//!
//! 服务基础地址、版本号等进程级取值集中到显式的 `AppConfig`，
//! 启动时构造一次，再以引用注入 HTTP 客户端、网关与页脚信息，
//! 不在各模块里散读环境变量。
//!
//! # 实现思路
//!
//! - `Default`：基础地址可在编译期通过 `FRAME_EDITOR_BASE_URL` 注入，版本号取 crate 版本。
//! - `load_from_path`：读取 JSON 配置文件（缺省字段回退默认值）。
//! - `from_env`：`FRAME_EDITOR_CONFIG` 指向的文件打底，再逐项应用 `FRAME_EDITOR_*` 覆盖。

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::gateway::GatewayConfig;
use crate::protocol::AppInfo;

pub const APP_NAME: &str = "Online Image Editor";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/";
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

const ENV_CONFIG_PATH: &str = "FRAME_EDITOR_CONFIG";
const ENV_BASE_URL: &str = "FRAME_EDITOR_BASE_URL";
const ENV_VERSION: &str = "FRAME_EDITOR_VERSION";
const ENV_BIND: &str = "FRAME_EDITOR_BIND";
const ENV_REQUEST_TIMEOUT: &str = "FRAME_EDITOR_REQUEST_TIMEOUT_SECS";
const ENV_CONNECT_TIMEOUT: &str = "FRAME_EDITOR_CONNECT_TIMEOUT_SECS";
const ENV_UPLOAD_DIR: &str = "FRAME_EDITOR_UPLOAD_DIR";
const ENV_MAX_UPLOAD_BYTES: &str = "FRAME_EDITOR_MAX_UPLOAD_BYTES";
const ENV_RETAIN_TRANSIENT: &str = "FRAME_EDITOR_RETAIN_TRANSIENT";

/// 应用配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 网关基础地址（客户端使用）。
    pub server_base_url: String,
    /// 页脚展示的版本号。
    pub version: String,
    /// 网关监听地址。
    pub bind_addr: SocketAddr,
    /// 单次请求总超时（秒）。
    pub request_timeout_secs: u64,
    /// 建立连接超时（秒）。
    pub connect_timeout_secs: u64,
    pub gateway: GatewayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_base_url: option_env!("FRAME_EDITOR_BASE_URL")
                .unwrap_or(DEFAULT_BASE_URL)
                .to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            request_timeout_secs: 60,
            connect_timeout_secs: 8,
            gateway: GatewayConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件读取配置。
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AppError::Config(format!("解析配置文件 '{}' 失败: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 从进程环境构造配置。
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意键值来源构造配置（`from_env` 的可测试版本）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
            Some(path) => Self::load_from_path(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.server_base_url = url;
        }
        if let Some(version) = lookup(ENV_VERSION) {
            config.version = version;
        }
        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = parse_value(ENV_BIND, &bind)?;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout_secs = parse_value(ENV_REQUEST_TIMEOUT, &timeout)?;
        }
        if let Some(timeout) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout_secs = parse_value(ENV_CONNECT_TIMEOUT, &timeout)?;
        }
        if let Some(dir) = lookup(ENV_UPLOAD_DIR) {
            config.gateway.upload_dir = PathBuf::from(dir);
        }
        if let Some(max) = lookup(ENV_MAX_UPLOAD_BYTES) {
            config.gateway.max_upload_bytes = parse_value(ENV_MAX_UPLOAD_BYTES, &max)?;
        }
        if let Some(retain) = lookup(ENV_RETAIN_TRANSIENT) {
            config.gateway.retain_transient_files = parse_value(ENV_RETAIN_TRANSIENT, &retain)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.server_base_url.trim().is_empty() {
            return Err(AppError::Config("server_base_url 不能为空".to_string()));
        }
        if !(1..=600).contains(&self.request_timeout_secs) {
            return Err(AppError::Config("request_timeout_secs 必须在 1~600 秒之间".to_string()));
        }
        if !(1..=120).contains(&self.connect_timeout_secs) {
            return Err(AppError::Config("connect_timeout_secs 必须在 1~120 秒之间".to_string()));
        }
        self.gateway.validate()?;
        Ok(())
    }

    pub fn app_info(&self) -> AppInfo {
        AppInfo {
            name: APP_NAME.to_string(),
            version: self.version.clone(),
        }
    }

    /// 页脚版本行。
    pub fn footer_line(&self) -> String {
        format!("version {}", self.version)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{} 的值 {:?} 无效: {}", key, raw, e)))
}
