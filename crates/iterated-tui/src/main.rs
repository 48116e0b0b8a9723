use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use iterated_config::ConfigManager;
use iterated_core::SessionPhase;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

mod app;
mod ui;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "iterated-tui")]
#[command(about = "Terminal chat with the IteratED Socratic tutor")]
#[command(version)]
struct Args {
    /// Tutor server base URL (overrides client.base_url)
    #[arg(long, env = "ITERATED_SERVER_URL")]
    server_url: Option<String>,

    /// Config file path
    #[arg(long, env = "ITERATED_CONFIG", default_value = "~/.iterated/config.json")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stderr output would draw over the UI, so only log when asked to
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    }

    let config_path = iterated_config::expand_tilde(&args.config)
        .unwrap_or_else(|| std::path::PathBuf::from(&args.config));
    let config = ConfigManager::load(&config_path).await?.snapshot().await;

    let server_url = args.server_url.unwrap_or(config.client.base_url.clone());
    let mut app = App::new(&server_url, iterated_client::session_options(&config.client));

    app.check_connection().await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut last_tick = tokio::time::Instant::now();
    let tick_rate = tokio::time::Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| tokio::time::Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = crossterm::event::read()? {
                if handle_key_event(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply replies that arrived since the last frame
        app.process_events();

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = tokio::time::Instant::now();
        }
    }
}

/// Returns true when the app should quit
fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.phase() {
        SessionPhase::NotStarted => match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.toggle_focus(),
            KeyCode::Enter => app.start_session(),
            KeyCode::Char(c) if !ctrl => app.push_char(c),
            KeyCode::Backspace => app.pop_char(),
            _ => {}
        },
        SessionPhase::Active => match key.code {
            KeyCode::Char('r') if ctrl => app.reset_session(),
            KeyCode::Char('f') if ctrl => app.toggle_full_screen(),
            KeyCode::Enter => app.send_message(),
            KeyCode::Char(c) if !ctrl => app.push_char(c),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Up => app.scroll_up(),
            KeyCode::Down => app.scroll_down(),
            KeyCode::PageUp => app.scroll_page_up(),
            KeyCode::PageDown => app.scroll_page_down(),
            _ => {}
        },
    }
    false
}
