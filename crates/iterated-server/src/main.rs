use clap::Parser;
use iterated_config::{ConfigManager, ReplyStrategyKind};
use iterated_server::{logging::init_logging, run_server, AppState};

#[derive(Parser, Debug, Clone)]
#[command(name = "iterated-server")]
#[command(about = "IteratED placeholder tutor endpoint")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Bind host (overrides config)
    #[arg(long, env = "ITERATED_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Simulated processing delay in milliseconds (overrides config)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Reply selection: random or sequential (overrides config)
    #[arg(long)]
    strategy: Option<ReplyStrategyKind>,

    /// Seed for random reply selection (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Config file path
    #[arg(long, env = "ITERATED_CONFIG", default_value = "~/.iterated/config.json")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = iterated_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| std::path::PathBuf::from(&cli.config));

    let config_manager = match ConfigManager::load(&config_path).await {
        Ok(cm) => cm,
        Err(e) => {
            eprintln!("Failed to load config from {:?}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    let mut config = config_manager.snapshot().await;

    // CLI 参数覆盖配置文件
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.responder.delay_ms = delay_ms;
    }
    if let Some(strategy) = cli.strategy {
        config.responder.strategy = strategy;
    }
    if cli.seed.is_some() {
        config.responder.seed = cli.seed;
    }
    ConfigManager::validate(&config)?;

    let _log_guard = init_logging(&config.logging, cli.debug)?;

    tracing::info!("Config loaded from {:?}", config_path);
    tracing::info!("Responder configuration:");
    tracing::info!("  Replies: {}", config.responder.replies.len());
    tracing::info!("  Delay: {}ms", config.responder.delay_ms);
    tracing::info!("  Strategy: {}", config.responder.strategy);

    if cli.debug {
        tracing::debug!("Debug mode enabled");
        tracing::debug!("  Host: {}", config.server.host);
        tracing::debug!("  Port: {}", config.server.port);
        tracing::debug!("  Allowed origins: {:?}", config.server.allowed_origins);
        tracing::debug!("  Max body bytes: {}", config.server.max_body_bytes);
        tracing::debug!("  Seed: {:?}", config.responder.seed);
    }

    let state = AppState::from_config(&config.responder)
        .with_max_body_bytes(config.server.max_body_bytes);
    run_server(state, &config.server).await
}
