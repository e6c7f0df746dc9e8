/*!
 * BLUEDECK Bluetooth Device Manager TUI
 * Connect, disconnect and remove known devices through bluetoothctl
 * Onyx Digital Intelligence Development LLC
 */

use anyhow::{Context, Result};
use bluedeck_core::config::LogConfig;
use bluedeck_core::{BluetoothManager, Config};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::time::{interval, Duration};

mod app;
mod ui;
mod worker;

use app::{App, Control};
use ui::render_ui;
use worker::Worker;

#[derive(Parser)]
#[command(name = "bluedeck")]
#[command(about = "BLUEDECK Bluetooth Device Manager")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bluetooth control tool to invoke (overrides config)
    #[arg(short, long)]
    tool: Option<String>,

    /// Write logs to this file
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(tool) = cli.tool {
        config.tool.program = tool;
    }
    if let Some(file) = cli.log_file {
        config.log.file = Some(file);
    }
    config.log.debug |= cli.debug;

    init_logging(&config.log)?;
    tracing::info!("BLUEDECK starting with tool: {}", config.tool.program);

    let mut worker = Worker::spawn(BluetoothManager::new(config.tool.program.as_str()));
    let mut app = App::new(&config.tool.program);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &mut worker).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &mut Worker,
) -> Result<()> {
    if let Some(request) = app.request_refresh() {
        worker.send(request).await?;
    }

    let mut ticker = interval(Duration::from_millis(100));

    loop {
        // Handle events
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key.code) {
                        Control::Quit => return Ok(()),
                        Control::Dispatch(request) => worker.send(request).await?,
                        Control::Continue => {}
                    }
                }
            }
        }

        // Fold in whatever the worker finished
        while let Some(response) = worker.try_recv() {
            app.apply(response);
        }

        ticker.tick().await;
        terminal.draw(|f| render_ui(f, app))?;
    }
}

// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(log: &LogConfig) -> Result<()> {
    let Some(path) = &log.file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let log_level = if log.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bluedeck={},bluedeck_core={}",
            log_level, log_level
        ))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
