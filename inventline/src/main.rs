//! Inventline - terminal timeline of inventions
//!
//! Type the name of an invention, the configured lookup service resolves
//! its year, and the entry lands on a vertically scaled timeline with
//! auto-generated year ticks.

mod app;
mod config;
mod error;
mod layout;
mod lookup;
mod models;
mod theme;
mod timeline;
mod ui;

use std::io::{self, stdout};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use config::{Args, Config};
use lookup::{LookupClient, LookupCommand, LookupMessage};
use timeline::TimelineState;

/// Frame rate for animations (approximately 30 FPS)
const FRAME_DURATION: Duration = Duration::from_millis(33);

const LOG_FILE_NAME: &str = "inventline.log";

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install().ok();

    let config = Config::from_args(Args::parse())?;
    let _log_guard = init_tracing(&config.log_dir);

    tracing::info!(
        backend = config.backend.name(),
        scale_factor = config.layout.scale_factor,
        min_gap = config.layout.min_gap,
        "starting inventline"
    );

    run_tui(config).await
}

/// Send diagnostics to a file; the terminal belongs to the UI
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("inventline=debug,warn")),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}

/// Run the TUI application
async fn run_tui(config: Config) -> Result<()> {
    // Build the client before touching the terminal so errors print normally
    let client = LookupClient::new(config.backend.clone(), config.timeout)?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create communication channels
    let (msg_tx, mut msg_rx) = mpsc::channel::<LookupMessage>(8);
    let (cmd_tx, cmd_rx) = mpsc::channel::<LookupCommand>(8);

    let worker = tokio::spawn(lookup::run_lookup_worker(client, msg_tx, cmd_rx));

    // Create application state
    let mut app = App::new(
        TimelineState::new(config.layout, config.pixels_per_row),
        config.backend.name(),
    );
    if config.seed_reference {
        app.seed_reference();
    }

    // Main event loop
    let result = run_event_loop(&mut terminal, &mut app, &mut msg_rx, &cmd_tx).await;

    // Cleanup
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    // An in-flight request is not waited on at exit
    cmd_tx.send(LookupCommand::Shutdown).await.ok();
    worker.abort();

    tracing::info!(entries = app.timeline.entries().len(), "inventline stopped");
    result
}

/// Run the main event loop
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    msg_rx: &mut mpsc::Receiver<LookupMessage>,
    cmd_tx: &mpsc::Sender<LookupCommand>,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.tick(size.height.saturating_sub(ui::TIMELINE_CHROME_ROWS));

        terminal.draw(|frame| ui::render(frame, app))?;

        // Check for lookup results (non-blocking)
        while let Ok(msg) = msg_rx.try_recv() {
            app.handle_lookup_message(msg);
        }

        // Handle input events with timeout for animation
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = app.handle_key(key) {
                        if let Err(err) = cmd_tx.send(cmd).await {
                            app.handle_dispatch_failure(err.0);
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
