use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use iterated_client::TutorClient;
use iterated_config::{ClientConfig, Config, ConfigManager};
use iterated_core::{ChatSession, Completion, Message, SessionError};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "iterated-cli")]
#[command(about = "Command line chat with the IteratED Socratic tutor")]
#[command(version)]
struct Cli {
    /// Tutor server base URL (overrides client.base_url)
    #[arg(long, env = "ITERATED_SERVER_URL")]
    server_url: Option<String>,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Config file path
    #[arg(long, env = "ITERATED_CONFIG", default_value = "~/.iterated/config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动交互式辅导会话
    Chat,
    /// 发送单条消息
    Send {
        /// 要讨论的问题
        #[arg(long, short)]
        question: String,
        /// 当前的答案
        #[arg(long, short, default_value = "")]
        answer: String,
        /// 消息内容
        message: String,
    },
    /// 检查服务器健康状态
    Health,
    /// 配置管理命令
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// 获取配置值
    Get {
        /// 配置键 (如: server.port, responder.delay_ms)
        key: String,
    },
    /// 设置配置值
    Set {
        /// 配置键 (如: server.port, responder.delay_ms)
        key: String,
        /// 配置值
        value: String,
    },
    /// 初始化默认配置
    Init {
        /// 强制覆盖已有配置
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// 显示当前配置
    Show,
}

/// A line typed at the chat prompt
#[derive(Debug, PartialEq)]
enum ChatCommand<'a> {
    Quit,
    Reset,
    Say(&'a str),
    Empty,
}

fn parse_chat_line(line: &str) -> ChatCommand<'_> {
    let line = line.trim();
    match line {
        "" => ChatCommand::Empty,
        "/quit" | "/exit" => ChatCommand::Quit,
        "/reset" => ChatCommand::Reset,
        _ => ChatCommand::Say(line),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config_path = iterated_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| PathBuf::from(&cli.config));

    if cli.debug {
        eprintln!("{}", "[DEBUG] Debug mode enabled".dimmed());
        eprintln!("{}", format!("[DEBUG] Config path: {:?}", config_path).dimmed());
    }

    match cli.command {
        Commands::Config(args) => handle_config(args, config_path).await,
        command => {
            let manager = ConfigManager::load(&config_path).await?;
            let client_config = manager.snapshot().await.client;
            let server_url = cli
                .server_url
                .clone()
                .unwrap_or_else(|| client_config.base_url.clone());

            if cli.debug {
                eprintln!("{}", format!("[DEBUG] Server URL: {}", server_url).dimmed());
            }

            let client = TutorClient::new(&server_url);
            match command {
                Commands::Chat => run_interactive_chat(&client, &client_config, cli.debug).await,
                Commands::Send {
                    question,
                    answer,
                    message,
                } => send_message(&client, &client_config, &question, &answer, &message).await,
                Commands::Health => check_health(&client).await,
                Commands::Config(_) => unreachable!(),
            }
        }
    }
}

async fn handle_config(args: ConfigArgs, config_path: PathBuf) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Get { key } => {
            let manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;

            match config.get_value(&key) {
                Some(value) => {
                    println!("{}", format!("{} = {}", key, value).green());
                }
                None => {
                    println!("{}", format!("❌ Key not found: {}", key).red());
                    std::process::exit(1);
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let manager = ConfigManager::load(&config_path).await?;

            if let Err(e) = manager.update(|config| config.set_value(&key, &value)).await {
                eprintln!("{}", format!("❌ Failed to set value: {}", e).red());
                std::process::exit(1);
            }
            println!("{}", format!("✅ Set {} = {}", key, value).green());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                println!("{}", format!("⚠️  Config already exists at {:?}", config_path).yellow());
                println!("{}", "Use --force to overwrite".dimmed());
                return Ok(());
            }

            iterated_config::init_iterated_dirs().await?;

            let manager = ConfigManager::new(Config::default(), config_path.clone());
            manager.save().await?;

            println!("{}", format!("✅ Config initialized at {:?}", config_path).green());
            println!("{}", "You can edit this file to customize your settings".dimmed());
        }
        ConfigCommands::Show => {
            let manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;

            println!("{}", "📋 Current Configuration:".cyan().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn check_health(client: &TutorClient) -> anyhow::Result<()> {
    match client.health().await {
        Ok(health) => {
            println!(
                "{}",
                format!("✅ {} is {}", client.base_url(), health.status).green()
            );
            if let Some(timestamp) = health.timestamp {
                println!("{}", format!("   at {}", timestamp).dimmed());
            }
        }
        Err(e) => {
            println!("{}", format!("❌ {} is unreachable: {}", client.base_url(), e).red());
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn send_message(
    client: &TutorClient,
    config: &ClientConfig,
    question: &str,
    answer: &str,
    message: &str,
) -> anyhow::Result<()> {
    let mut session = ChatSession::new(iterated_client::session_options(config));
    session.start_session(question, answer)?;

    let start = Instant::now();
    let completion = session.send_message(client, message).await?;
    log::debug!("reply in {:?}", start.elapsed());

    if let Some(reply) = session.transcript().last() {
        match completion {
            Completion::Reply(_) => println!("{}", reply.content().green()),
            _ => {
                println!("{}", reply.content().red());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{} ", label.cyan().bold());
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

fn print_tutor(message: &Message) {
    println!("{}", "Tutor:".green().bold());
    println!("{}", message.content());
    println!();
}

/// Ask for the question and answer until the session starts; None on EOF
fn start_interactive_session(session: &mut ChatSession) -> io::Result<Option<()>> {
    let answer_label = if session.options().require_answer {
        "Your answer:"
    } else {
        "Your answer (optional):"
    };

    loop {
        let Some(question) = prompt("Question:")? else {
            return Ok(None);
        };
        let Some(answer) = prompt(answer_label)? else {
            return Ok(None);
        };

        match session.start_session(&question, &answer) {
            Ok(()) => break,
            Err(SessionError::EmptyQuestion) => {
                println!("{}", "Please enter a question".yellow());
            }
            Err(SessionError::EmptyAnswer) => {
                println!("{}", "Please enter your answer".yellow());
            }
            Err(e) => {
                println!("{}", format!("❌ {}", e).red());
            }
        }
    }

    if let Some(id) = session.session_id() {
        println!("{}", format!("Session ID: {}", id).dimmed());
    }
    println!();
    if let Some(welcome) = session.transcript().first() {
        print_tutor(welcome);
    }
    Ok(Some(()))
}

async fn run_interactive_chat(
    client: &TutorClient,
    config: &ClientConfig,
    debug: bool,
) -> anyhow::Result<()> {
    println!("{}", "🎓 IteratED Socratic Tutor".cyan().bold());
    println!("{}", "Type /reset to start over, /quit to leave".dimmed());
    println!();

    let mut session = ChatSession::new(iterated_client::session_options(config));
    if start_interactive_session(&mut session)?.is_none() {
        return Ok(());
    }

    loop {
        let Some(line) = prompt("You:")? else {
            break;
        };

        match parse_chat_line(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Quit => break,
            ChatCommand::Reset => {
                if let Some(session_id) = session.reset_session() {
                    if let Err(e) = client.end_session(&session_id).await {
                        log::debug!("failed to end session {}: {}", session_id, e);
                    }
                }
                println!("{}", "🔄 Session reset".cyan());
                println!();
                if start_interactive_session(&mut session)?.is_none() {
                    break;
                }
            }
            ChatCommand::Say(text) => {
                let start = Instant::now();
                let completion = session.send_message(client, text).await?;
                if debug {
                    eprintln!(
                        "{}",
                        format!("[DEBUG] {:?} in {:?}", completion, start.elapsed()).dimmed()
                    );
                }
                if let Some(reply) = session.transcript().last() {
                    print_tutor(reply);
                }
            }
        }
    }

    println!("{}", "👋 Goodbye!".cyan());
    Ok(())
}
