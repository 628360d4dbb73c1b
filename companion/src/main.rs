//! Student mental health companion TUI.
//!
//! A vim-style terminal interface for talking things through with a
//! supportive AI companion, with crisis resources always on screen.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! echo "I had a rough week" | cargo run -p companion -- --headless
//! ```

mod app;
mod events;
mod headless;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use companion_core::{ChatSession, CompanionConfig};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

const LOG_FILE_VAR: &str = "COMPANION_LOG_FILE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let headless = args.iter().any(|a| a == "--headless");
    init_logging(headless)?;

    let config = match CompanionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Please set it in a .env file or with: export GEMINI_API_KEY=your_key_here");
            std::process::exit(1);
        }
    };
    let session =
        ChatSession::from_config(&config).context("failed to create companion session")?;

    if headless {
        return headless::run_headless(session)
            .await
            .context("headless session failed");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (request_tx, response_rx) = worker::spawn_worker(session);
    let result = run_app(&mut terminal, App::new(request_tx, response_rx));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result.context("terminal UI failed")
}

/// Install the tracing subscriber.
///
/// Headless mode logs to stderr. The TUI owns the terminal, so it only logs
/// when `COMPANION_LOG_FILE` names a file.
fn init_logging(headless: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());

    if headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    } else if let Ok(path) = std::env::var(LOG_FILE_VAR) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file {path}"))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        app.poll_worker();
        terminal.draw(|f| render(f, &app))?;

        // Poll with a timeout so animations keep moving
        if event::poll(Duration::from_millis(100))? {
            match handle_event(&mut app, event::read()?) {
                EventResult::Quit => return Ok(()),
                EventResult::Submit(text) => app.send_message(text),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn print_help() {
    println!("Student Mental Health Companion");
    println!();
    println!("USAGE:");
    println!("  companion [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help       Show this help message");
    println!("  --headless       Run in headless mode (text-only, no TUI)");
    println!();
    println!("ENVIRONMENT:");
    println!("  GEMINI_API_KEY          API key (required)");
    println!("  COMPANION_MODEL         Model id (default: gemini-2.0-flash)");
    println!("  COMPANION_API_BASE      Service base URL");
    println!("  COMPANION_PERSONA       System instruction for the companion");
    println!("  COMPANION_TEMPERATURE   Sampling temperature (0.0 - 2.0)");
    println!("  COMPANION_MAX_TOKENS    Cap on reply length");
    println!("  COMPANION_TIMEOUT_SECS  Request timeout in seconds");
    println!("  COMPANION_LOG_FILE      Write TUI logs to this file");
    println!("  RUST_LOG                Log filter (default: warn)");
    println!();
    println!("If you are in immediate danger, call or text 988 (US) or your local emergency number.");
}
