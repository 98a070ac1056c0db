//! tradeterm TUI binary: terminal setup, logging, worker thread, event loop.

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tradeterm_core::{HttpBroker, SystemClock, TerminalConfig};
use tradeterm_tui::persistence::Storage;
use tradeterm_tui::{input, spawn_worker, ui, AppState, WorkerCommand};

#[derive(Parser, Debug)]
#[command(name = "tradeterm-tui", about = "Instrument page for the broker terminal")]
struct Args {
    /// Instrument FIGI to open; the instrument list is shown when omitted
    #[arg(long)]
    figi: Option<String>,

    /// Config file (default: <config dir>/tradeterm/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Broker server base URI
    #[arg(long)]
    server_uri: Option<String>,

    /// Broker account id
    #[arg(long)]
    account_id: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TerminalConfig::load(args.config.as_deref())
        .context("loading config")?
        .with_env()
        .with_overrides(args.server_uri, args.account_id);

    init_logging(&config.log_path())?;
    info!(server_uri = %config.server_uri, "starting tradeterm-tui");

    let broker = HttpBroker::new(&config.server_uri, config.request_timeout())
        .context("building broker client")?;

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
        spawn_worker(Arc::new(broker), cmd_rx, resp_tx).context("spawning worker thread")?;

    let mut app = AppState::new(
        cmd_tx.clone(),
        resp_rx,
        Arc::new(SystemClock),
        Storage::open(config.storage_path()),
        config.robot_name.clone(),
        config.account_id.clone(),
    );
    match args.figi.as_deref() {
        Some(figi) => app.open_instrument(figi),
        None => app.open_listing(),
    }

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

    info!("tradeterm-tui exited");
    result
}

/// Log to a file; stderr belongs to the alternate screen.
fn init_logging(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
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
            app.apply(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Refresh and playback timers
        app.tick(Instant::now());

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
