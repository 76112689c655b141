//! Application configuration module / 应用配置模块
//!
//! Loaded from `config.json` (or the file named by `SIMPLESEARCH_CONFIG`).
//! Creates the file with defaults on first run / 首次运行时创建默认配置文件
//!
//! Credentials come from `ES_USERNAME` / `ES_PASSWORD` and are never written
//! back to disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::engine::EngineConfig;
use crate::search::FieldBoosts;

/// Env var naming an alternative config file / 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "SIMPLESEARCH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("following env variables for elasticsearch must be set: ES_USERNAME, ES_PASSWORD")]
    MissingCredentials,

    #[error("invalid search boosts: {0}")]
    InvalidBoosts(String),

    #[error("server.request_timeout_secs ({server}) must be greater than elasticsearch.request_timeout_secs ({engine})")]
    InvalidTimeouts { server: u64, engine: u64 },
}

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment and naming / 运行环境
    pub app: AppSection,
    /// HTTP server configuration / 服务器配置
    pub server: ServerConfig,
    /// Search engine connection / 搜索引擎连接
    pub elasticsearch: ElasticsearchConfig,
    /// Ranking policy / 排序策略
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// `local` or `production`; picks the default log filter
    pub env: String,
    pub service_name: String,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
    /// Upper bound for handling one HTTP request / 请求超时
    pub request_timeout_secs: u64,
}

/// Elasticsearch configuration / 搜索引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub address: String,
    #[serde(skip_serializing)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub index: String,
    pub request_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub tls_insecure: bool,
    /// Ping the engine before accepting traffic / 启动时检查连接
    pub verify_on_startup: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub boosts: FieldBoosts,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            env: "local".to_string(),
            service_name: "simplesearch".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            address: engine.address,
            username: String::new(),
            password: String::new(),
            index: engine.index,
            request_timeout_secs: engine.request_timeout.as_secs(),
            idle_timeout_secs: engine.idle_timeout.as_secs(),
            tls_insecure: engine.tls_insecure,
            verify_on_startup: engine.verify_on_startup,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Engine settings handed to the search gateway / 搜索网关使用的引擎配置
    pub fn engine_config(&self) -> EngineConfig {
        let es = &self.elasticsearch;
        EngineConfig {
            address: es.address.clone(),
            username: es.username.clone(),
            password: es.password.clone(),
            index: es.index.clone(),
            request_timeout: Duration::from_secs(es.request_timeout_secs),
            idle_timeout: Duration::from_secs(es.idle_timeout_secs),
            tls_insecure: es.tls_insecure,
            verify_on_startup: es.verify_on_startup,
        }
    }

    /// Apply `ENV`, `ES_USERNAME` and `ES_PASSWORD` from the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(env) = non_empty("ENV") {
            self.app.env = env;
        }
        if let Some(username) = non_empty("ES_USERNAME") {
            self.elasticsearch.username = username;
        }
        if let Some(password) = non_empty("ES_PASSWORD") {
            self.elasticsearch.password = password;
        }

        if self.elasticsearch.username.is_empty() || self.elasticsearch.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }

    /// Boosts must keep `name` on top; the HTTP timeout must outlast the engine timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.boosts.validate().map_err(ConfigError::InvalidBoosts)?;

        let server = self.server.request_timeout_secs;
        let engine = self.elasticsearch.request_timeout_secs;
        if server <= engine {
            return Err(ConfigError::InvalidTimeouts { server, engine });
        }
        Ok(())
    }
}

/// Get the config file path / 获取配置文件路径
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from the default location plus process env / 加载配置
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&config_path())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(path, &config)?;
        tracing::info!("Created default configuration at {:?}", path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(io_err)
}
