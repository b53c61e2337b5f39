use std::io;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use nib::app::App;
use nib::cli::CliArgs;
use nib::model::config::AppConfig;
use nib::model::document::Document;
use nib::msg::Msg;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("nib: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("nib: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("nib starting");

    let document = match args.open_document() {
        Ok(doc) => doc,
        Err(err) => {
            tracing::error!(%err, "failed to open startup document");
            eprintln!("nib: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run_terminal(config, document) {
        Ok(()) => {
            tracing::info!("nib exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("fatal: {err:#}");
            eprintln!("nib error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

/// Log to a daily file (never stdout, which belongs to the UI).
fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    let log_dir = AppConfig::log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "nib.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nib={}", config.general.log_level)));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(guard)
}

fn run_terminal(config: AppConfig, document: Document) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config, document);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: AppConfig,
    document: Document,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let mut app = App::new(config, document);

    let (width, height) = terminal::size()?;
    app.update(Msg::Resize(width, height))?;

    // Input thread: reads terminal events and forwards them as Msg
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    let msg = match event {
                        Event::Key(k) if k.kind != KeyEventKind::Release => Msg::Key(k),
                        Event::Resize(w, h) => Msg::Resize(w, h),
                        _ => continue,
                    };
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("terminal read failed: {err}");
                    break;
                }
            }
        }
    });

    terminal.draw(|f| app.view(f))?;

    // ── Main event loop ──
    loop {
        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while !app.should_quit()
            && let Ok(msg) = rx.try_recv()
        {
            app.update(msg)?;
        }

        if app.should_quit() {
            break;
        }

        terminal.draw(|f| app.view(f))?;
    }

    Ok(())
}
