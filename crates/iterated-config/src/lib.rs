pub mod config;
pub mod manager;

pub use config::{
    ClientConfig, Config, ConfigError, ConfigResult, LogLevel, LoggingConfig, ReplyStrategyKind,
    ResponderConfig, ServerConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_REPLIES,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// IteratED 配置目录 (~/.iterated)
pub fn iterated_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".iterated"))
}

/// 默认日志目录
pub fn default_log_dir() -> Option<PathBuf> {
    iterated_dir().map(|dir| dir.join("logs"))
}

/// 初始化目录结构
pub async fn init_iterated_dirs() -> ConfigResult<()> {
    if let Some(root) = iterated_dir() {
        tokio::fs::create_dir_all(&root).await?;
    }
    if let Some(logs) = default_log_dir() {
        tokio::fs::create_dir_all(&logs).await?;
    }
    Ok(())
}

/// 展开路径中的 ~ 为用户主目录
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterated_dir() {
        let dir = iterated_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().to_string_lossy().contains(".iterated"));
    }

    #[test]
    fn test_log_dir_under_iterated_dir() {
        let logs = default_log_dir().unwrap();
        assert_eq!(logs.parent(), iterated_dir().as_deref());
        assert!(logs.ends_with("logs"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/.iterated/config.json");
        assert!(expanded.is_some());
        assert!(!expanded.unwrap().to_string_lossy().starts_with('~'));

        assert_eq!(expand_tilde("/tmp/config.json"), Some(PathBuf::from("/tmp/config.json")));
    }
}
