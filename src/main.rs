use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use circuitwatch::app::{self, App};
use circuitwatch::{
    events, ui, Dashboard, DataSource, FileSource, MetricSnapshot, Settings, StreamSource,
    TileBoard,
};

#[derive(Parser, Debug)]
#[command(name = "circuitwatch")]
#[command(about = "Terminal dashboard for circuit-breaker and thread-pool health metrics")]
struct Args {
    /// Path to a JSON metrics snapshot file
    #[arg(short, long, default_value = "metrics.json", conflicts_with_all = ["connect"])]
    file: PathBuf,

    /// Connect to a TCP endpoint streaming newline-delimited snapshots (host:port)
    #[arg(short, long, conflicts_with_all = ["file"])]
    connect: Option<String>,

    /// Refresh interval in milliseconds (only used with --file)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Export the dashboard report to a JSON file and exit
    #[arg(short, long, conflicts_with_all = ["connect"])]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_tracing(path, args.log_level)?;
    }

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(refresh) = args.refresh {
        settings.refresh_ms = refresh;
    }
    tracing::debug!(?settings, "settings loaded");

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&args.file, &export_path, &settings);
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, &settings);
    }

    // Default: file-based mode
    run_with_file(&args.file, &settings)
}

/// Log to a file; the terminal belongs to the TUI.
fn init_tracing(path: &Path, max_level: Level) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let my_filter = tracing_subscriber::filter::filter_fn(move |v| {
        if let Some(mp) = v.module_path() {
            if !mp.starts_with("circuitwatch") {
                return false;
            }
        }
        v.level() <= &max_level
    });
    let my_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    tracing_subscriber::registry()
        .with(my_layer.with_filter(my_filter))
        .try_init()?;
    Ok(())
}

/// Run with a file-based data source
fn run_with_file(path: &Path, settings: &Settings) -> Result<()> {
    let source = Box::new(FileSource::new(path));
    run_tui(source, settings, Duration::from_millis(settings.refresh_ms))
}

/// Run with a TCP stream data source
fn run_with_tcp(addr: &str, settings: &Settings) -> Result<()> {
    // The runtime keeps the reader task alive while the TUI runs
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                println!("Connected!");
                tracing::info!(addr, "connected");
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn DataSource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // For TCP, we poll continuously
    run_tui(source, settings, Duration::from_millis(100))
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    settings: &Settings,
    refresh_interval: Duration,
) -> Result<()> {
    // Build the app before raw mode so theme detection can query the terminal
    let mut app = App::new(source, settings);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

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

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 50;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Tiles
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);
            ui::board::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Auto-refresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Run one refresh over a snapshot file and write the report as JSON
fn export_to_file(metrics_path: &Path, export_path: &Path, settings: &Settings) -> Result<()> {
    let snapshot = MetricSnapshot::load(metrics_path)
        .with_context(|| format!("Failed to load {}", metrics_path.display()))?;

    let mut dashboard = Dashboard::new(TileBoard::new(), settings.dashboard.clone());
    dashboard.init("export");
    dashboard.refresh(&snapshot);

    app::write_report(&dashboard, export_path)?;

    println!(
        "Exported {} widgets to: {}",
        dashboard.registry().len(),
        export_path.display()
    );
    Ok(())
}
