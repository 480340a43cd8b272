// threatscope - real-time security telemetry dashboard for the terminal
// Polls a detection service and renders its events, stats and rules.

mod api;
mod app;
mod audio;
mod geo;
mod poller;
mod telemetry;
mod theme;
mod ui;

use anyhow::{Context, Result};
use api::{HttpApi, TelemetryApi};
use app::config::{DEFAULT_SERVER_URL, EVENT_POLL_MS, STATS_POLL_MS, UI_TICK};
use app::{event::handle_key_event, AppState, ClientConfig, MapBackdrop};
use audio::{AlertSynthesizer, TerminalBell};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use poller::{spawn_command_worker, PollMessage, PollingScheduler};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "threatscope", version, about = "Real-time security telemetry dashboard")]
struct Args {
    /// Base URL of the monitoring service
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Event polling period in milliseconds
    #[arg(long, default_value_t = EVENT_POLL_MS)]
    event_interval_ms: u64,

    /// Stats polling period in milliseconds
    #[arg(long, default_value_t = STATS_POLL_MS)]
    stats_interval_ms: u64,

    /// Start with alert sounds muted
    #[arg(long)]
    muted: bool,

    /// World map backdrop resolution
    #[arg(long, value_enum, default_value_t = MapBackdrop::High)]
    map: MapBackdrop,

    /// Log file (the dashboard owns the terminal)
    #[arg(long, default_value = "threatscope.log")]
    log_file: PathBuf,

    /// Discord webhook URL to register with the service at startup
    #[arg(long)]
    webhook: Option<String>,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            server_url: args.server,
            event_interval: Duration::from_millis(args.event_interval_ms.max(1)),
            stats_interval: Duration::from_millis(args.stats_interval_ms.max(1)),
            muted: args.muted,
            backdrop: args.map,
            webhook: args.webhook,
            log_file: args.log_file,
            ..ClientConfig::default()
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = ClientConfig::from(Args::parse());
    init_logging(&config.log_file)?;
    info!(server = %config.server_url, "threatscope starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let guard = runtime.enter();

    let api: Arc<dyn TelemetryApi> = Arc::new(HttpApi::new(&config.server_url, config.request_timeout)?);
    let (poll_tx, mut poll_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    PollingScheduler::new(api.clone(), &config, poll_tx.clone()).spawn();
    spawn_command_worker(api, command_rx, poll_tx);

    let synth = AlertSynthesizer::new(Box::new(TerminalBell), config.muted);
    let mut app = AppState::new(&config, synth, command_tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app, &mut poll_rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // In-flight requests are abandoned rather than awaited
    drop(poll_rx);
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(250));

    if let Err(err) = res {
        warn!(error = %err, "threatscope exited with error");
        println!("Error: {:?}", err);
    }
    info!("threatscope stopped");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    messages: &mut UnboundedReceiver<PollMessage>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        // Apply everything that arrived since the last frame, in arrival order
        while let Ok(message) = messages.try_recv() {
            dirty |= app.apply(message);
        }
        dirty |= app.on_tick();
        if dirty {
            terminal.draw(|f| ui::draw(f, app))?;
            dirty = false;
        }

        if !app.running {
            return Ok(());
        }

        if event::poll(UI_TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(app, key.code);
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
}
