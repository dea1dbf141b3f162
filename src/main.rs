// chargelog - main.rs
//
// CLI entry point. Stands in for the dashboard collaborator: loads a
// snapshot file, applies the filters given as flags, prints the filtered
// view, and optionally writes the CSV export. Handles:
// 1. CLI argument parsing
// 2. Configuration loading
// 3. Logging initialisation (debug mode support)
// 4. One refresh cycle over the snapshot

use chargelog::app::config::{load_config, AppConfig};
use chargelog::app::snapshot::load_snapshot;
use chargelog::app::state::ViewState;
use chargelog::core::filter::PredicateVocabulary;
use chargelog::core::model::{Direction, FilterSpecifier};
use chargelog::util::constants;
use chargelog::util::error::ChargelogError;
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// chargelog - transport log correlation and filtering for charge points.
///
/// Point chargelog at a snapshot of captured OCPP transport log lines to
/// filter by command, direction, connection events, or errors; replies
/// are correlated back to the commands that caused them.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version, about)]
struct Cli {
    /// Snapshot file: one `<timestamp> <message>` record per line.
    snapshot: PathBuf,

    /// Charge point ID for the CSV CPID column.
    #[arg(long = "cpid")]
    charge_point_id: Option<String>,

    /// Filter by command name (repeatable). Replies are correlated in.
    #[arg(short = 'a', long = "action")]
    actions: Vec<String>,

    /// Filter by frame direction.
    #[arg(long = "direction", value_enum)]
    direction: Option<FlowArg>,

    /// Include connection/handshake lifecycle lines.
    #[arg(long = "connection")]
    connection: bool,

    /// Include error lines and protocol error frames.
    #[arg(long = "errors")]
    errors: bool,

    /// Case-insensitive free-text search, applied after filtering.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Write the full snapshot as CSV to this path ("-" for stdout)
    /// instead of printing the filtered view.
    #[arg(short = 'e', long = "export")]
    export: Option<PathBuf>,

    /// Optional TOML config file (vocabulary, export, logging).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Frame direction as a CLI value.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlowArg {
    /// Charger-originated traffic (CP->CS).
    Cp,
    /// Server-originated traffic (CS->CP).
    Server,
}

impl From<FlowArg> for Direction {
    fn from(arg: FlowArg) -> Self {
        match arg {
            FlowArg::Cp => Direction::ChargerToServer,
            FlowArg::Server => Direction::ServerToCharger,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging init so [logging] level can apply.
    let config = match cli.config.as_deref() {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    chargelog::util::logging::init(cli.debug, config.logging.level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        snapshot = %cli.snapshot.display(),
        "chargelog starting"
    );

    if let Err(e) = run(cli, config) {
        tracing::error!(error = %e, "chargelog failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<(), ChargelogError> {
    let records = load_snapshot(&cli.snapshot)?;

    let mut vocabulary = PredicateVocabulary::default();
    vocabulary.extend(&config.filter.connection_terms, &config.filter.error_terms);

    let mut state = ViewState::new(vocabulary);
    state.refresh(records);

    for action in &cli.actions {
        state.toggle_filter(FilterSpecifier::Action(action.clone()));
    }
    if let Some(direction) = cli.direction {
        state.toggle_filter(FilterSpecifier::Direction(direction.into()));
    }
    if cli.connection {
        state.toggle_filter(FilterSpecifier::Connection);
    }
    if cli.errors {
        state.toggle_filter(FilterSpecifier::Error);
    }
    if let Some(search) = &cli.search {
        state.set_search(search.clone());
    }

    if let Some(export_path) = &cli.export {
        let cpid = cli
            .charge_point_id
            .or(config.export.charge_point_id)
            .unwrap_or_else(|| constants::DEFAULT_CHARGE_POINT_ID.to_string());

        let rows = if export_path.as_os_str() == "-" {
            let stdout = std::io::stdout();
            state
                .export_csv(&cpid, stdout.lock())
                .map_err(ChargelogError::Export)?
        } else {
            let file = File::create(export_path).map_err(|e| ChargelogError::Io {
                path: export_path.clone(),
                operation: "create export file",
                source: e,
            })?;
            state
                .export_csv(&cpid, BufWriter::new(file))
                .map_err(ChargelogError::Export)?
        };
        eprintln!("Exported {rows} rows");
        return Ok(());
    }

    let view = state.view();
    for record in &view.records {
        if record.timestamp.is_empty() {
            println!("{}", record.message);
        } else {
            println!("{} {}", record.timestamp, record.message);
        }
    }
    eprintln!("{} of {} records", view.filtered, view.total);

    Ok(())
}
