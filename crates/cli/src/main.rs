// geodash CLI - choropleth enrichment and dashboard page reports

mod config_cmd;
mod enrich;
mod exit_codes;
mod logging;
mod pages;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use geodash_config::Settings;
use geodash_enrich::EnrichError;
use geodash_io::LoadError;

use exit_codes::{
    enrich_exit_code, EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "geodash")]
#[command(about = "Choropleth map enrichment and dashboard reports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: ~/.config/geodash/settings.json)
    #[arg(long, global = true, env = "GEODASH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a per-region value from a table into a GeoJSON boundary file
    #[command(after_help = "\
Examples:
  geodash enrich Yucatan.geojson municipiosDatos.csv -o enriched.geojson
  geodash enrich Yucatan.geojson municipiosDatos.csv --fill --pretty
  geodash enrich mapa.geojson votos.xlsx --key NOM_MUN --table-key Municipio --value Votos
  geodash enrich Yucatan.geojson municipiosDatos.csv --on-duplicate error --report -o out.geojson")]
    Enrich(enrich::EnrichArgs),

    /// Check that a boundary file is a feature collection and list its regions
    #[command(after_help = "\
Examples:
  geodash validate Yucatan.geojson
  geodash validate mapa.geojson --key NOM_MUN --json")]
    Validate {
        /// GeoJSON boundary file
        boundary: PathBuf,

        /// Feature property holding the region name
        #[arg(long, short = 'k')]
        key: Option<String>,

        /// Print JSON instead of a region list
        #[arg(long)]
        json: bool,
    },

    /// Coffee-shop sales page: store map, top products, hourly traffic
    #[command(after_help = "\
Examples:
  geodash coffee 'Coffee Shop Sales_Modified.xlsx'
  geodash coffee ventas.xlsx --store Astoria --product-type Coffee --product-type Tea
  geodash coffee ventas.xlsx --boundary Yucatan.geojson --attributes municipiosDatos.csv --json")]
    Coffee(pages::CoffeeArgs),

    /// Sales page: totals by region, top products by sales and profit
    #[command(after_help = "\
Examples:
  geodash sales SalidaFinal.xlsx
  geodash sales SalidaFinal.xlsx --top 10 --json")]
    Sales {
        /// Sales sheet (xlsx, csv)
        file: PathBuf,

        /// Sheet name for multi-sheet workbooks
        #[arg(long)]
        sheet: Option<String>,

        /// Number of products in each ranking
        #[arg(long, default_value_t = geodash_reports::sales::DEFAULT_TOP)]
        top: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cafe traffic page: clients per day for a year and month
    #[command(after_help = "\
Examples:
  geodash traffic datos/resultadoLimpieza.xlsx
  geodash traffic datos/resultadoLimpieza.xlsx --year 2023 --month 3 --json")]
    Traffic {
        /// Visits sheet with fechaEntrada and horaEntrada columns
        file: PathBuf,

        /// Sheet name for multi-sheet workbooks
        #[arg(long)]
        sheet: Option<String>,

        /// Year to show (default: first available)
        #[arg(long)]
        year: Option<i32>,

        /// Month to show, 1-12 (default: first available)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or create the settings file
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let (settings, settings_error) = match Settings::load_from(&settings_path) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    logging::configure_logging(cli.verbose, &settings.log_level);
    if let Some(e) = settings_error {
        log::warn!("{}; using default settings", e);
    }
    log::debug!("settings: {}", settings_path.display());

    let result = match cli.command {
        Commands::Enrich(args) => enrich::cmd_enrich(args, &settings),
        Commands::Validate { boundary, key, json } => {
            enrich::cmd_validate(boundary, key, json, &settings)
        }
        Commands::Coffee(args) => pages::cmd_coffee(args, &settings),
        Commands::Sales { file, sheet, top, json } => pages::cmd_sales(file, sheet, top, json),
        Commands::Traffic { file, sheet, year, month, json } => {
            pages::cmd_traffic(file, sheet, year, month, json)
        }
        Commands::Config { command } => config_cmd::cmd_config(command, &settings_path, &settings),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Create error from a loader failure.
    pub fn input(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::UnsupportedFormat(_) => {
                Some("tables: .csv .tsv .txt .xlsx .xlsm .xls .xlsb .ods".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_INPUT, message: err.to_string(), hint }
    }

    /// Create error from an engine failure with its exit code.
    pub fn enrich(err: EnrichError) -> Self {
        let code = enrich_exit_code(&err);
        let hint = match &err {
            EnrichError::MissingField { .. } => {
                Some("check --key, --table-key and --value against the input files".to_string())
            }
            EnrichError::DuplicateKey { .. } => {
                Some("use --on-duplicate first to keep the first record".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
