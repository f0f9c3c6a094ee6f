use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eventmap_core::config::{AppConfig, LogFormat, LoggingConfig, ThemeMode};
use eventmap_core::engine::MapContext;
use eventmap_core::events::EventCatalog;
use eventmap_core::headless::HeadlessMap;
use eventmap_core::style::StyleDocument;
use eventmap_search::{Geocoder, PhotonGeocoder};
use eventmap_style::ThemeController;
use eventmap_viewport::EventOverlay;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// EventMap - interactive event map tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "EVENTMAP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the event dataset with resolved locations as JSON
    Events {
        /// Event dataset (defaults to `events.dataset` from the config)
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },

    /// Recolor a map style document and print the result
    Theme {
        /// Style JSON document
        #[arg(short, long)]
        style: PathBuf,

        /// Theme mode to apply (defaults to `theme.mode` from the config)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Geocode a place query and print the normalized results
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Compute the camera focus for an event in the configured viewport
    Focus {
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Event id
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Light,
    Dark,
}

impl From<ModeArg> for ThemeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Light => ThemeMode::Light,
            ModeArg::Dark => ThemeMode::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_config_builder(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => AppConfig::default(),
    };
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging)?;
    eventmap_style::theme::describe_metrics();
    eventmap_search::pipeline::describe_metrics();

    match args.command {
        Command::Events { dataset } => {
            let catalog = load_catalog(dataset.as_deref(), &config)?;
            print_json(&catalog.list_event_locations())
        }
        Command::Theme { style, mode } => run_theme(&config, &style, mode.map(Into::into)),
        Command::Search { query, limit } => {
            let geocoder = PhotonGeocoder::from_config(&config.search)
                .context("Failed to create geocoder")?;
            let limit = limit.unwrap_or(config.search.limit);
            let features = geocoder
                .search(&query, limit)
                .await
                .with_context(|| format!("Search for '{}' failed", query))?;
            info!(query = %query, results = features.len(), "Search complete");
            print_json(&features)
        }
        Command::Focus { dataset, id } => {
            let catalog = load_catalog(dataset.as_deref(), &config)?;
            run_focus(&config, &catalog, &id)
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = logging.parse_level()?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}

fn load_catalog(dataset: Option<&Path>, config: &AppConfig) -> Result<EventCatalog> {
    let path = dataset
        .or(config.events.dataset.as_deref())
        .ok_or_else(|| anyhow!("No event dataset given (use --dataset or events.dataset)"))?;
    let catalog = EventCatalog::from_file(path)
        .with_context(|| format!("Failed to load event dataset: {:?}", path))?;
    info!(events = catalog.len(), path = ?path, "Event dataset loaded");
    Ok(catalog)
}

fn run_theme(config: &AppConfig, style: &Path, mode: Option<ThemeMode>) -> Result<()> {
    let contents = std::fs::read_to_string(style)
        .with_context(|| format!("Failed to read style document: {:?}", style))?;
    let document = StyleDocument::from_json_str(&contents).context("Failed to parse style document")?;

    let map = HeadlessMap::new(config.map.viewport.size());
    map.load_document(document);
    let ctx = MapContext::new();
    ctx.attach(Box::new(map.clone()));

    let controller = ThemeController::from_config(&config.theme);
    let report = match mode {
        Some(mode) => controller.set_mode(&ctx, mode),
        None => controller.apply(&ctx),
    }
    .context("Style was not loaded")?;

    info!(
        layers = report.layers,
        classified = report.classified,
        writes = report.writes,
        failures = report.failures.len(),
        "Theme applied"
    );
    print_json(&map.style_document())
}

#[derive(Serialize)]
struct FocusReport {
    focus: eventmap_viewport::FocusOutcome,
    panel: eventmap_viewport::PanelView,
    viewport: eventmap_core::types::ViewportState,
}

fn run_focus(config: &AppConfig, catalog: &EventCatalog, id: &str) -> Result<()> {
    let view = &config.map.initial_view;
    let map = HeadlessMap::with_view(config.map.viewport.size(), view.center(), view.zoom);
    let ctx = MapContext::new();
    ctx.attach(Box::new(map.clone()));

    let mut overlay = EventOverlay::new(catalog, config.map.viewport.width);
    overlay.mount(&ctx);
    let focus = overlay
        .open_panel_for_id(&ctx, id)
        .ok_or_else(|| anyhow!("No event with id '{}'", id))?;

    print_json(&FocusReport {
        focus,
        panel: overlay.panel(),
        viewport: map.viewport(),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
