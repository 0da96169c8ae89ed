use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use picker_engine::{LookupCapabilities, PickerSnapshot, spawn_picker};
use picker_types::{PickerConfig, SelectionMode, SelectionSet};
use picker_util::{load_settings, load_settings_from_path, read_document};
use tracing::{Level, debug};

mod fixture;

use fixture::{FixtureAdapter, FixtureRecord, FixtureSignal};

#[derive(Debug, Parser)]
#[command(name = "picker", version, about = "Drive a remote-backed picker against fixture data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a fixture dataset, page through it and print the final picker state.
    Browse(BrowseArgs),
}

#[derive(Debug, Args)]
struct BrowseArgs {
    /// JSON or YAML list of `{id, name, ...}` records.
    #[arg(long)]
    data: PathBuf,
    /// Search term typed into the picker.
    #[arg(long)]
    search: Option<String>,
    /// Selected identifiers, comma separated.
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,
    /// Use multi-select.
    #[arg(long)]
    multi: bool,
    /// Number of pages to load.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    #[arg(long)]
    page_size: Option<u32>,
    /// Filter parameters as a JSON object.
    #[arg(long)]
    params: Option<String>,
    /// Settings file; defaults to the user settings location.
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    debug: bool,
    /// Pagination signal reported by the fixture backend.
    #[arg(long, value_enum, default_value_t = SignalArg::Total)]
    signal: SignalArg,
    /// Label lookups offered by the fixture backend.
    #[arg(long, value_enum, default_value_t = LookupArg::All)]
    lookups: LookupArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SignalArg {
    Total,
    HasMore,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LookupArg {
    #[value(name = "none")]
    Off,
    Single,
    Bulk,
    All,
}

impl From<SignalArg> for FixtureSignal {
    fn from(signal: SignalArg) -> Self {
        match signal {
            SignalArg::Total => FixtureSignal::Total,
            SignalArg::HasMore => FixtureSignal::HasMore,
        }
    }
}

impl From<LookupArg> for LookupCapabilities {
    fn from(lookups: LookupArg) -> Self {
        match lookups {
            LookupArg::Off => LookupCapabilities::NONE,
            LookupArg::Single => LookupCapabilities::SINGLE,
            LookupArg::Bulk => LookupCapabilities::BULK,
            LookupArg::All => LookupCapabilities::ALL,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Browse(args) => {
            init_tracing(args.debug);
            let snapshot = run_browse(args).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(if debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_browse(args: BrowseArgs) -> Result<PickerSnapshot> {
    let config = browse_config(&args)?;
    let records: Vec<FixtureRecord> =
        read_document(&args.data).with_context(|| format!("failed to load fixture data from {}", args.data.display()))?;
    debug!(records = records.len(), "fixture loaded");

    let selection = match config.selection_mode {
        SelectionMode::Single => SelectionSet::single(args.select.first()),
        SelectionMode::Multi => SelectionSet::from_values(args.select.iter()),
    };
    let adapter = Arc::new(FixtureAdapter::new(records, args.signal.into(), args.lookups.into()));
    let picker = spawn_picker(adapter, config, selection)?;
    picker.idle().await?;

    if let Some(search) = args.search {
        picker.set_search_input(search)?;
        picker.idle().await?;
    }

    for _ in 1..args.pages {
        if !picker.snapshot().await?.has_more {
            break;
        }
        picker.request_next_page()?;
        picker.idle().await?;
    }

    let snapshot = picker.snapshot().await?;
    picker.shutdown()?;
    Ok(snapshot)
}

fn browse_config(args: &BrowseArgs) -> Result<PickerConfig> {
    let mut config = match &args.settings {
        Some(path) => load_settings_from_path(path).with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_settings()?,
    };

    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if args.multi {
        config.selection_mode = SelectionMode::Multi;
    }
    if let Some(raw) = &args.params {
        config.params = Some(serde_json::from_str(raw).context("--params must be a JSON object")?);
    }
    config.debug |= args.debug;
    Ok(config)
}
