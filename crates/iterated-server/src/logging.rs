//! 日志初始化
//!
//! `RUST_LOG` 优先，其次是配置文件中的级别。可选的日志文件按天滚动。

use iterated_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// 初始化全局 subscriber。
///
/// 返回的 guard 必须在进程退出前一直持有，否则文件日志会丢失尾部内容。
pub fn init_logging(config: &LoggingConfig, debug: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let level = if debug {
        "debug".to_string()
    } else {
        config.level.to_string()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},tower_http={}", level, level)))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.json_format {
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    } else {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    let mut guard = None;
    if let Some(ref file) = config.file {
        let path = iterated_config::expand_tilde(file)
            .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", file))?;
        let dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let prefix = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "iterated-server.log".to_string());

        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::daily(dir, prefix);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);

        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    tracing::info!("Log level set to: {}", level);
    Ok(guard)
}
