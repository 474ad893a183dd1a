use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use starmap::app::{self, AppState};
use starmap::assets::{AssetPaths, Assets};
use starmap::bitmap::TileImages;
use starmap::export::{self, FrameRecord, Report};
use starmap::geometry::MapGeometry;
use starmap::headless::{parse_script, HeadlessFrontend};
use starmap::terminal::TerminalFrontend;
use starmap::window::WindowFrontend;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FrontendKind {
    /// Half-block rendering in the terminal
    Terminal,
    /// Scaled desktop window
    Window,
    /// No display; input from --script
    Headless,
}

#[derive(Parser, Debug)]
#[command(name = "starmap")]
#[command(about = "Scroll a tiled star map on an emulated 128x64 monochrome display")]
struct Args {
    /// Directory holding tiles.csv, annotations.csv and the tile images
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Tile layout table (default: <assets>/tiles.csv)
    #[arg(long)]
    tiles: Option<PathBuf>,

    /// Annotation table (default: <assets>/annotations.csv)
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Where to show the display
    #[arg(long, value_enum, default_value = "terminal")]
    frontend: FrontendKind,

    /// Pixels panned per key press
    #[arg(long, default_value_t = app::DEFAULT_STEP)]
    step: f32,

    /// Idle input poll interval in milliseconds
    #[arg(long, default_value_t = app::DEFAULT_POLL.as_millis() as u64)]
    poll_ms: u64,

    /// Window scale factor
    #[arg(long, default_value = "4")]
    scale: usize,

    /// Headless key script, e.g. "RRRUUO" (U/D/L/R pan, O confirm, B cancel)
    #[arg(long)]
    script: Option<String>,

    /// Headless: save the final frame as PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Headless: write camera and selection per frame as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log file (terminal frontend defaults to starmap.log; others log to stderr)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn asset_paths(&self) -> AssetPaths {
        let mut paths = AssetPaths::in_dir(&self.assets);
        if let Some(tiles) = &self.tiles {
            paths.tiles = tiles.clone();
        }
        if let Some(annotations) = &self.annotations {
            paths.annotations = annotations.clone();
        }
        paths
    }
}

/// Logs go to a file when the terminal is in use, otherwise to stderr.
/// The returned guard must live until exit so buffered lines are flushed.
fn setup_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = match (&args.log_file, args.frontend) {
        (Some(path), _) => Some(path.clone()),
        (None, FrontendKind::Terminal) => Some(PathBuf::from("starmap.log")),
        (None, _) => None,
    };

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
            let name = path.file_name().context("log file path has no file name")?;

            let file_appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = setup_logging(&args)?;

    let geometry = MapGeometry::default();
    let paths = args.asset_paths();
    let assets = Assets::load(&paths, geometry);
    let annotations_loaded = assets.annotations.len();
    let tiles_in_layout = assets.layout.len();

    let mut images = TileImages::new(paths.dir.clone(), assets.layout);
    let mut state = AppState::new(geometry, assets.annotations, args.step);
    let poll = Duration::from_millis(args.poll_ms);

    info!(
        "Map {}x{} px, camera at {:?}",
        geometry.map_width(),
        geometry.map_height(),
        state.camera().position()
    );

    match args.frontend {
        FrontendKind::Terminal => {
            let mut frontend = TerminalFrontend::new().context("failed to set up the terminal")?;
            app::run(&mut state, &mut images, &mut frontend, poll)?;
        }
        FrontendKind::Window => {
            let mut frontend = WindowFrontend::new(geometry.screen_width, geometry.screen_height, args.scale)
                .context("failed to open the window")?;
            app::run(&mut state, &mut images, &mut frontend, poll)?;
        }
        FrontendKind::Headless => {
            let events = parse_script(args.script.as_deref().unwrap_or_default())?;
            let mut frontend = HeadlessFrontend::new(events);
            let frame = app::run(&mut state, &mut images, &mut frontend, poll)?;

            if let Some(path) = &args.snapshot {
                export::export_frame(&frame, args.scale, path)
                    .with_context(|| format!("writing snapshot {}", path.display()))?;
                println!("Saved frame to {}", path.display());
            }

            let frames = frontend.into_frames();
            if let Some(path) = &args.report {
                let report = Report {
                    annotations_loaded,
                    tiles_in_layout,
                    final_frame: FrameRecord::capture(&state),
                    frames,
                };
                export::export_report(&report, path)
                    .with_context(|| format!("writing report {}", path.display()))?;
                println!("Saved report to {}", path.display());
            } else {
                let last = FrameRecord::capture(&state);
                println!(
                    "Camera ({}, {}) | {}",
                    last.camera_x,
                    last.camera_y,
                    last.selection.as_deref().unwrap_or("no selection")
                );
            }
        }
    }

    info!("Exiting");
    Ok(())
}
