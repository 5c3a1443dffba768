//! OCS-AI Configuration Management
//!
//! Configuration lives in a single TOML file next to the executable. The file
//! is created with documented defaults on first run, read once at startup and
//! never reloaded. A handful of environment variables may override file values.

use crate::prompt::{DEFAULT_PROMPT_TEMPLATE, DEFAULT_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the configuration document
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Public OpenAI chat-completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Outbound request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Document written by [`ensure_config_file`] on first run
pub const DEFAULT_CONFIG_TOML: &str = r##"# ocs-ai 配置

# 本地服务端配置
[server]
host = "127.0.0.1"  # 本地服务主机
port = 8080         # 本地服务端口

# AI回答配置
[ai]
base_url = "https://api.openai.com/v1/chat/completions"  # AI接口地址
api_key = ""             # AI接口密钥
model = "gpt-4o-mini"    # 使用的模型名称
system_prompt = "你是一名专业的答题助手，请根据题目和选项给出最可能的正确答案，并简要解释理由。"
prompt_template = """
题目：{{title}}
选项：{{options}}
类型：{{type}}

请根据题目信息给出最可能的正确答案，并在必要时提供简要推理。
"""
temperature = 0.2   # 随机性
top_p = 1.0         # nucleus sampling
max_tokens = 512    # 最大输出token
timeout = 30        # 请求超时时间（秒）

# 日志配置
[logging]
level = "info"
json_format = false
"##;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Local HTTP server
    pub server: ServerConfig,

    /// Upstream chat-completion endpoint
    pub ai: AiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a TOML file, backfilling defaults for missing or invalid values
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(config.with_defaults())
    }

    /// Replace zero or blank values with their defaults
    pub fn with_defaults(mut self) -> Self {
        if self.ai.timeout <= 0 {
            self.ai.timeout = DEFAULT_TIMEOUT_SECS;
        }
        if self.ai.base_url.trim().is_empty() {
            self.ai.base_url = DEFAULT_BASE_URL.to_string();
        }
        if self.server.host.trim().is_empty() {
            self.server.host = DEFAULT_HOST.to_string();
        }
        if self.server.port == 0 {
            self.server.port = DEFAULT_PORT;
        }
        if self.logging.level.trim().is_empty() {
            self.logging.level = LoggingConfig::default().level;
        }
        self
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("OCS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("OCS_SERVER_PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "OCS_SERVER_PORT".to_string(),
                value: port,
            })?;
        }

        if let Some(url) = lookup("OCS_AI_BASE_URL") {
            self.ai.base_url = url;
        }
        if let Some(key) = lookup("OCS_AI_API_KEY") {
            self.ai.api_key = key;
        }
        if let Some(model) = lookup("OCS_AI_MODEL") {
            self.ai.model = model;
        }

        if let Some(level) = lookup("OCS_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self.with_defaults())
    }

    /// `host:port` the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Upstream chat-completion configuration as written in the file.
///
/// Sampling parameters are only sent upstream when strictly positive, so a
/// zero (the value for an absent key) means "let the endpoint decide".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Full chat-completions URL
    pub base_url: String,

    /// Bearer token; empty disables the Authorization header
    pub api_key: String,

    pub model: String,

    pub system_prompt: String,

    /// Template with `{{title}}`, `{{options}}` and `{{type}}` placeholders
    pub prompt_template: String,

    pub temperature: f64,

    pub top_p: f64,

    pub max_tokens: i64,

    /// Request timeout in seconds
    pub timeout: i64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            temperature: 0.0,
            top_p: 0.0,
            max_tokens: 0,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AiConfig {
    /// Outbound request timeout
    pub fn timeout(&self) -> Duration {
        let secs = if self.timeout > 0 {
            self.timeout
        } else {
            DEFAULT_TIMEOUT_SECS
        };
        Duration::from_secs(secs as u64)
    }

    /// Resolve the settings used for one outbound call.
    ///
    /// Blank strings fall back to built-in defaults even if the file
    /// explicitly set them empty.
    pub fn resolve(&self) -> AiSettings {
        fn or_default(value: &str, default: &str) -> String {
            let value = value.trim();
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        }

        let api_key = self.api_key.trim();

        AiSettings {
            base_url: or_default(&self.base_url, DEFAULT_BASE_URL),
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
            model: or_default(&self.model, DEFAULT_MODEL),
            system_prompt: or_default(&self.system_prompt, DEFAULT_SYSTEM_PROMPT),
            prompt_template: or_default(&self.prompt_template, DEFAULT_PROMPT_TEMPLATE),
            temperature: (self.temperature > 0.0).then_some(self.temperature),
            top_p: (self.top_p > 0.0).then_some(self.top_p),
            max_tokens: (self.max_tokens > 0).then_some(self.max_tokens),
        }
    }
}

/// Effective settings for a single outbound chat call
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub system_prompt: String,
    pub prompt_template: String,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<i64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive for the workspace crates.
    ///
    /// A level containing `=` is taken as a complete directive.
    pub fn filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') {
            return level.to_string();
        }
        format!("ocs_api={level},ocs_llm={level},ocs_core={level},tower_http={level}")
    }
}

/// Path of the configuration file next to the running executable
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Write [`DEFAULT_CONFIG_TOML`] to `path` unless a file already exists.
///
/// Returns `true` when a new file was created.
pub fn ensure_config_file(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::FileWriteError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| ConfigError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(true)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    Missing { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
