use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use neonatal_dash::utils::logging::{create_spinner, finish_spinner};
use neonatal_dash::{
    Dashboard, DashboardConfig, DashboardError, DashboardSession, FilterSelection, MapClick, MapEvent,
    SelectionInput, UiUpdate, UiValue, load_dataset_async, locate_dataset,
};

#[derive(Parser, Debug)]
#[command(
    name = "neonatal-dash",
    about = "Filter, summarise and export neonatal admission records."
)]
struct Cli {
    /// Dataset file (.csv, .tsv or .parquet); defaults to the configured candidates
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print KPIs and chart tables for the selection as JSON
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the filtered records as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the values offered by every dropdown
    Options,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    country: Vec<String>,
    #[arg(long)]
    city: Vec<String>,
    #[arg(long)]
    hospital: Vec<String>,
    #[arg(long)]
    diagnosis: Vec<String>,
    #[arg(long)]
    outcome: Vec<String>,
    #[arg(long)]
    year: Vec<String>,
    /// City picked on the map
    #[arg(long)]
    map_city: Option<String>,
    /// Clear the map selection; wins over --map-city
    #[arg(long)]
    clear_map: bool,
}

impl FilterArgs {
    /// Run the flags through one session update cycle
    fn into_selection(self) -> FilterSelection {
        let input = SelectionInput {
            country: Some(UiValue::Many(self.country)),
            city: Some(UiValue::Many(self.city)),
            hospital: Some(UiValue::Many(self.hospital)),
            diagnosis: Some(UiValue::Many(self.diagnosis)),
            outcome: Some(UiValue::Many(self.outcome)),
            year: Some(UiValue::Many(self.year)),
        };
        let map = MapEvent {
            click: self.map_city.map(MapClick::on),
            clear: self.clear_map,
        };

        DashboardSession::new().apply(UiUpdate {
            reset: false,
            dropdowns: Some(input),
            map,
        })
    }
}

/// Exit status when no dataset can be found
const EXIT_NO_DATASET: u8 = 2;

/// The exit code for errors that must stop the process before it serves anything
fn startup_exit_code(err: &DashboardError) -> Option<u8> {
    err.is_startup_fatal().then_some(EXIT_NO_DATASET)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_env().context("Invalid NEONATAL_* environment setting")?;

    let candidates = cli
        .data
        .map_or_else(|| config.data_candidates.clone(), |path| vec![path]);
    let path = match locate_dataset(&candidates) {
        Ok(path) => path,
        Err(err) => match startup_exit_code(&err) {
            Some(code) => {
                error!("{err}; refusing to start without a dataset");
                return Ok(ExitCode::from(code));
            }
            None => return Err(err.into()),
        },
    };

    let spinner = create_spinner(&format!("Loading {}", path.display()));
    let loaded = load_dataset_async(path.clone(), config.clone()).await;
    finish_spinner(&spinner, None);
    let store = loaded.with_context(|| format!("Failed to load {}", path.display()))?;

    let dashboard = Dashboard::new(store, &config);

    match cli.command {
        Command::Summary { filters } => {
            let snapshot = dashboard.snapshot(&filters.into_selection());
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Export { filters, output } => {
            let selection = filters.into_selection();
            let writer: Box<dyn Write> = match &output {
                Some(file) => Box::new(BufWriter::new(
                    File::create(file)
                        .with_context(|| format!("Failed to create {}", file.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };
            let rows = dashboard
                .export_csv(&selection, writer)
                .context("Failed to export the filtered view")?;
            info!("Exported {rows} rows");
        }
        Command::Options => {
            println!("{}", serde_json::to_string_pretty(dashboard.filter_options())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
