use serde::{Deserialize, Serialize};

/// 占位 tutor 回复（按顺序）
pub const DEFAULT_REPLIES: [&str; 5] = [
    "That's an interesting approach! Can you tell me more about how you arrived at that conclusion?",
    "I see you're thinking about this step by step. What would happen if we tried a different approach?",
    "You're on the right track! Let me ask you this: what do you think is the key concept here?",
    "Great thinking! Now, can you connect this to the main question we're working on?",
    "I like how you're breaking this down. What's the next logical step in your reasoning?",
];

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            server: ServerConfig::default(),
            responder: ResponderConfig::default(),
            client: ClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 按点分隔的键读取配置值
    pub fn get_value(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["version"] => Some(self.version.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "allowed_origins"] => Some(self.server.allowed_origins.join(",")),
            ["server", "max_body_bytes"] => Some(self.server.max_body_bytes.to_string()),
            ["responder", "delay_ms"] => Some(self.responder.delay_ms.to_string()),
            ["responder", "strategy"] => Some(self.responder.strategy.to_string()),
            ["responder", "seed"] => self.responder.seed.map(|s| s.to_string()),
            ["client", "base_url"] => Some(self.client.base_url.clone()),
            ["client", "require_answer"] => Some(self.client.require_answer.to_string()),
            ["client", "model_type"] => self.client.model_type.clone(),
            ["client", "api_key_env"] => self.client.api_key_env.clone(),
            ["logging", "level"] => Some(self.logging.level.to_string()),
            ["logging", "json_format"] => Some(self.logging.json_format.to_string()),
            ["logging", "file"] => self.logging.file.clone(),
            _ => None,
        }
    }

    /// 按点分隔的键设置配置值
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid port number: {}", value))
                })?;
            }
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "allowed_origins"] => {
                self.server.allowed_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ["server", "max_body_bytes"] => {
                self.server.max_body_bytes = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?;
            }
            ["responder", "delay_ms"] => {
                self.responder.delay_ms = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?;
            }
            ["responder", "strategy"] => {
                self.responder.strategy = value.parse()?;
            }
            ["responder", "seed"] => {
                self.responder.seed = Some(value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid seed: {}", value))
                })?);
            }
            ["client", "base_url"] => {
                self.client.base_url = value.to_string();
            }
            ["client", "require_answer"] => {
                self.client.require_answer = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid boolean: {}", value))
                })?;
            }
            ["client", "model_type"] => {
                self.client.model_type = Some(value.to_string());
            }
            ["client", "api_key_env"] => {
                self.client.api_key_env = Some(value.to_string());
            }
            ["logging", "level"] => {
                self.logging.level = value.parse()?;
            }
            ["logging", "json_format"] => {
                self.logging.json_format = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid boolean: {}", value))
                })?;
            }
            ["logging", "file"] => {
                self.logging.file = Some(value.to_string());
            }
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }
}

/// Server 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// CORS 允许的来源，空列表表示不限制
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// 与 axum 默认的请求体上限一致
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// 回复选择策略
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStrategyKind {
    #[default]
    Random,
    Sequential,
}

impl std::fmt::Display for ReplyStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyStrategyKind::Random => write!(f, "random"),
            ReplyStrategyKind::Sequential => write!(f, "sequential"),
        }
    }
}

impl std::str::FromStr for ReplyStrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "random" => Ok(ReplyStrategyKind::Random),
            "sequential" | "round-robin" => Ok(ReplyStrategyKind::Sequential),
            _ => Err(ConfigError::Validation(format!("Invalid reply strategy: {}", s))),
        }
    }
}

/// 占位 responder 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponderConfig {
    /// 模拟处理耗时（毫秒）
    pub delay_ms: u64,
    pub replies: Vec<String>,
    #[serde(default)]
    pub strategy: ReplyStrategyKind,
    /// 固定随机种子，便于复现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            replies: DEFAULT_REPLIES.iter().map(|s| s.to_string()).collect(),
            strategy: ReplyStrategyKind::Random,
            seed: None,
        }
    }
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// 后端地址，请求发往 `{base_url}/api/chat`
    pub base_url: String,
    /// 开始会话时是否必须填写答案
    #[serde(default)]
    pub require_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// 存放 API key 的环境变量名；key 本身不写入配置文件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            require_answer: false,
            model_type: None,
            api_key_env: None,
        }
    }
}

impl ClientConfig {
    /// 从环境变量读取 API key
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|key| !key.is_empty())
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", level)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    #[serde(default)]
    pub json_format: bool,
    /// 日志文件路径，按天滚动；为空时只输出到 stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json_format: false,
            file: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.responder.delay_ms, 1000);
        assert_eq!(config.responder.replies.len(), 5);
        assert_eq!(config.responder.strategy, ReplyStrategyKind::Random);
        assert!(!config.client.require_answer);
    }

    #[test]
    fn test_get_and_set_value() {
        let mut config = Config::default();

        config.set_value("server.port", "9000").unwrap();
        config.set_value("responder.strategy", "sequential").unwrap();
        config.set_value("client.require_answer", "true").unwrap();
        config.set_value("server.allowed_origins", "http://a, http://b").unwrap();

        assert_eq!(config.get_value("server.port").as_deref(), Some("9000"));
        assert_eq!(config.get_value("responder.strategy").as_deref(), Some("sequential"));
        assert_eq!(config.get_value("client.require_answer").as_deref(), Some("true"));
        assert_eq!(config.server.allowed_origins, vec!["http://a", "http://b"]);

        config.set_value("server.max_body_bytes", "4096").unwrap();
        assert_eq!(config.get_value("server.max_body_bytes").as_deref(), Some("4096"));
        assert_eq!(config.get_value("nope.nothing"), None);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = Config::default();
        assert!(matches!(config.set_value("server.port", "abc"), Err(ConfigError::Validation(_))));
        assert!(matches!(config.set_value("logging.level", "loud"), Err(ConfigError::Validation(_))));
        assert!(matches!(config.set_value("server.unknown", "1"), Err(ConfigError::KeyNotFound(_))));
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let config: Config = serde_json::from_str(r#"{"version": "0.1.0"}"#).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.responder, ResponderConfig::default());

        let config: Config =
            serde_json::from_str(r#"{"server": {"port": 9000, "host": "0.0.0.0"}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_api_key_read_from_named_env() {
        std::env::set_var("ITERATED_TEST_API_KEY", "k-123");
        let client = ClientConfig {
            api_key_env: Some("ITERATED_TEST_API_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(client.api_key().as_deref(), Some("k-123"));
        assert_eq!(ClientConfig::default().api_key(), None);
        std::env::remove_var("ITERATED_TEST_API_KEY");
    }
}
