//! Backtest form TUI: single-screen terminal form for creating backtests.
//!
//! The main thread owns every piece of form state. HTTP calls run on a
//! worker thread and their results are applied between frames.

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backtest_form_core::{BacktestApi, BearerToken, ClientConfig, HttpBacktestApi};
use backtest_form_tui::app::AppState;
use backtest_form_tui::worker::{self, WorkerCommand};
use backtest_form_tui::{input, ui};

#[derive(Parser)]
#[command(name = "backtest-form-tui", about = "Terminal form for creating backtests", version)]
struct Cli {
    /// Config file (defaults to <config dir>/backtest-form/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bearer token sent with every request (enter it later with Ctrl-T if absent)
    #[arg(long, env = "BACKTEST_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    /// Log file (defaults to <config dir>/backtest-form/tui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_tracing(&log_path)?;

    let config = ClientConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    info!(base_url = %config.base_url, "starting backtest form");
    let cross_field_checks = config.cross_field_checks;
    let api: Arc<dyn BacktestApi> =
        Arc::new(HttpBacktestApi::new(config).context("failed to build HTTP client")?);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle =
        worker::spawn_worker(api, cmd_rx, resp_tx).context("failed to spawn worker thread")?;

    let mut app = AppState::new(
        cmd_tx.clone(),
        resp_rx,
        BearerToken::new(cli.token),
        cross_field_checks,
    );
    app.ensure_catalogs();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("backtest-form")
        .join("tui.log")
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
