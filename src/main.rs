use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use seatplan::catalog::CATALOG;
use seatplan::config::EditorConfig;
use seatplan::error::{ErrorCode, LayoutError};
use seatplan::persist::{FloorPlanRecord, FloorPlanStore, JsonFileStore, PlanSummary, sanitize, summarize};
use seatplan::scene::CanvasSettings;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no floor plan stored for event {0}")]
    NotFound(String),
    #[error("a floor plan for event {0} already exists; pass --force to overwrite")]
    AlreadyExists(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Parser, Debug)]
#[command(name = "seatplan", about = "Floor-plan inspection and setup for event layouts")]
struct Cli {
    /// Directory holding `<event_id>.json` floor plans.
    #[arg(long, env = "SEATPLAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List placeable element kinds.
    Catalog,
    /// Sanitise a stored plan and report what had to be repaired.
    Check { event_id: String },
    /// Print element, seat, and boundary counts for a stored plan.
    Summary { event_id: String },
    /// Write an empty plan.
    Init(InitCommand),
}

#[derive(Args, Debug)]
struct InitCommand {
    event_id: String,
    #[arg(long, env = "SEATPLAN_CANVAS_WIDTH")]
    width: Option<f64>,
    #[arg(long, env = "SEATPLAN_CANVAS_HEIGHT")]
    height: Option<f64>,
    #[arg(long, env = "SEATPLAN_PIXELS_PER_METER")]
    pixels_per_meter: Option<f64>,
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = EditorConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let store = JsonFileStore::new(&config.data_dir);

    let result = match cli.command {
        Command::Catalog => {
            run_catalog();
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { event_id } => run_check(&store, &event_id).await,
        Command::Summary { event_id } => run_summary(&store, &event_id).await,
        Command::Init(init) => run_init(&store, &config, init).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            if let CliError::Layout(inner) = &e {
                error!(code = inner.error_code(), error = %inner, "command failed");
            }
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_catalog() {
    for config in CATALOG {
        let size = match config.default_radius {
            Some(r) => format!("r={r}"),
            None => format!("{}x{}", config.default_width, config.default_height),
        };
        let shape = format!("{:?}", config.shape);
        println!(
            "{:<16} {shape:<14} {size:<10} seats={:<3} {}",
            config.id, config.default_capacity, config.description
        );
    }
}

async fn load(store: &JsonFileStore, event_id: &str) -> Result<FloorPlanRecord, CliError> {
    store
        .load(event_id)
        .await?
        .ok_or_else(|| CliError::NotFound(event_id.to_owned()))
}

async fn run_check(store: &JsonFileStore, event_id: &str) -> Result<ExitCode, CliError> {
    let (plan, warnings) = sanitize(load(store, event_id).await?);
    if warnings.is_empty() {
        println!("{event_id}: ok ({} elements)", plan.elements.len());
        return Ok(ExitCode::SUCCESS);
    }
    for w in &warnings {
        println!("{event_id}: {w}");
    }
    Ok(ExitCode::FAILURE)
}

async fn run_summary(store: &JsonFileStore, event_id: &str) -> Result<ExitCode, CliError> {
    let summary = summarize(load(store, event_id).await?);
    print_summary(&summary);
    Ok(ExitCode::SUCCESS)
}

fn print_summary(s: &PlanSummary) {
    let meters = s.canvas.size_in_meters();
    println!("event:      {}", s.event_id);
    println!(
        "canvas:     {}x{} px ({:.1}m x {:.1}m)",
        s.canvas.width, s.canvas.height, meters.width, meters.height
    );
    println!("elements:   {} ({} seating)", s.elements, s.seating_elements);
    println!("seats:      {}/{} assigned", s.assigned, s.capacity);
    let boundary = match &s.boundary {
        None => "none".to_owned(),
        Some(b) if b.is_constraining() => format!("closed, {} vertices", b.vertices.len()),
        Some(b) => format!("open draft, {} vertices", b.vertices.len()),
    };
    println!("boundary:   {boundary}");
    if !s.outside_boundary.is_empty() {
        println!("outside:    {}", s.outside_boundary.join(", "));
    }
    if !s.warnings.is_empty() {
        println!("warnings:   {}", s.warnings.len());
    }
}

async fn run_init(store: &JsonFileStore, config: &EditorConfig, init: InitCommand) -> Result<ExitCode, CliError> {
    if !init.force && store.load(&init.event_id).await?.is_some() {
        return Err(CliError::AlreadyExists(init.event_id));
    }
    let canvas = CanvasSettings {
        width: init.width.unwrap_or(config.canvas.width),
        height: init.height.unwrap_or(config.canvas.height),
        pixels_per_meter: init.pixels_per_meter.unwrap_or(config.canvas.pixels_per_meter),
    };
    canvas.validate()?;
    store.save(&FloorPlanRecord::empty(&init.event_id, canvas)).await?;
    info!(event_id = %init.event_id, dir = %store.dir().display(), "floor plan initialised");
    println!("created {}", store.dir().join(format!("{}.json", init.event_id)).display());
    Ok(ExitCode::SUCCESS)
}
