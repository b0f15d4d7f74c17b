//! A terminal server-management dashboard.
//!
//! Run the binary to open the dashboard over a simulated host.  Every
//! operation (service control, file edits, firewall rules, users) acts on
//! in-memory mock data after a short artificial delay.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    nav::Page,
    ops::{self, Op},
    state::AppState,
};
use crate::config::{AppConfig, ThemeMode};
use crate::core::table::PAGE_SIZE_OPTIONS;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version, about = "Terminal server-management dashboard")]
struct Cli {
    /// Page to open first (dashboard, server, processes, network, logs,
    /// files, security, users, settings).
    #[arg(long, value_parser = parse_page)]
    page: Option<Page>,

    /// Rows per table page (10, 25 or 50).
    #[arg(long, value_parser = parse_page_size)]
    page_size: Option<usize>,

    /// Start with the light theme.
    #[arg(long)]
    light: bool,

    /// Seed for the mock data generator (reproducible sessions).
    #[arg(long)]
    seed: Option<u64>,

    /// Read and write preferences here instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file (filtered by `RUST_LOG`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_page(s: &str) -> Result<Page, String> {
    Page::from_slug(s).ok_or_else(|| {
        let known: Vec<&str> = Page::ALL.iter().map(|p| p.slug()).collect();
        format!("unknown page \"{s}\" (expected one of: {})", known.join(", "))
    })
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if PAGE_SIZE_OPTIONS.contains(&n) => Ok(n),
        _ => Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}")),
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // Only emits when RUST_LOG is set; the TUI owns the screen otherwise.
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut config = match cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.light {
        config.theme = ThemeMode::Light;
    }
    let mut state = AppState::new(config, cli.seed);
    if let Some(size) = cli.page_size {
        state.set_rows_per_page(size);
    }
    if let Some(page) = cli.page {
        state.set_page(page);
    }
    tracing::info!(page = state.page.slug(), seed = ?cli.seed, "starting dashboard");

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stderr>>, state: &mut AppState) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (op_tx, mut op_rx) = mpsc::unbounded_channel::<Op>();

    loop {
        terminal.draw(|frame| ui::draw(frame, state))?;

        for op in state.take_outbox() {
            ops::spawn(op, op_tx.clone());
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Resize => {}
                    AppEvent::Tick => state.on_tick(Instant::now()),
                }
            }

            Some(op) = op_rx.recv() => ops::apply(state, op),
        }

        if state.should_quit {
            tracing::info!("quit requested");
            break;
        }
    }
    Ok(())
}
