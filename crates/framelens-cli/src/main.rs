use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use framelens_core::{Endianness, PayloadFormat};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Settings;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("FRAMELENS_BUILD_COMMIT"),
    ", ",
    env!("FRAMELENS_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "framelens")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode captured device frames against operator-defined field layouts.",
    long_about = None,
    after_help = "Examples:\n  framelens device add Meter --format binary --endian big\n  framelens schema import Meter meter_fields.json\n  framelens decode Meter capture.bin\n  framelens report export Meter -o reports.csv"
)]
struct Cli {
    /// Device store file (default: $FRAMELENS_STORE or ./devices.json)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage device definitions.
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },
    /// Validate or import a device's field layout.
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Decode one captured frame and append the report to the device history.
    #[command(
        after_help = "Examples:\n  framelens decode Meter capture.bin\n  framelens decode Meter --hex \"01 02 03 04\" --stdout --pretty"
    )]
    Decode {
        /// Device name (case-insensitive)
        device: String,

        /// File holding the captured frame (glob patterns must match one file)
        #[arg(required_unless_present = "hex", conflicts_with = "hex")]
        input: Option<PathBuf>,

        /// Captured frame given inline as hex text
        #[arg(long, value_name = "HEX")]
        hex: Option<String>,

        /// Decode even when only advisory schema warnings are present
        #[arg(long)]
        allow_advisory: bool,

        /// Write the report as JSON to stdout
        #[arg(long)]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "stdout")]
        pretty: bool,
    },
    /// Inspect, export, or clear a device's report history.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DeviceCommands {
    /// List devices.
    List,
    /// Show a device and its field layout.
    Show { name: String },
    /// Add a device (a unique "Device N" name is generated when omitted).
    Add {
        name: Option<String>,

        /// Payload format: HexDump or Binary
        #[arg(long, default_value_t = PayloadFormat::HexDump)]
        format: PayloadFormat,

        /// Default endianness: Little or Big
        #[arg(long, default_value_t = Endianness::Little)]
        endian: Endianness,
    },
    /// Rename a device.
    Rename { name: String, new_name: String },
    /// Remove a device and its history.
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
enum SchemaCommands {
    /// Report every structural problem in a device's field layout.
    Validate { device: String },
    /// Replace a device's fields from a loosely structured JSON document.
    Import { device: String, file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ReportCommands {
    /// List reports, newest first and numbered from 1.
    List { device: String },
    /// Export reports; the format follows the extension (.json, .txt, .csv).
    Export {
        device: String,

        /// Output file
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Export only report N of `report list` (1 = newest)
        #[arg(long, value_name = "N")]
        index: Option<usize>,
    },
    /// Delete a device's whole report history.
    Clear { device: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let settings = Settings::resolve(cli.store);
    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Device { command } => match command {
            DeviceCommands::List => commands::device_list(&settings),
            DeviceCommands::Show { name } => commands::device_show(&settings, &name),
            DeviceCommands::Add {
                name,
                format,
                endian,
            } => commands::device_add(&settings, name, format, endian, quiet),
            DeviceCommands::Rename { name, new_name } => {
                commands::device_rename(&settings, &name, &new_name, quiet)
            }
            DeviceCommands::Remove { name } => commands::device_remove(&settings, &name, quiet),
        },
        Commands::Schema { command } => match command {
            SchemaCommands::Validate { device } => commands::schema_validate(&settings, &device),
            SchemaCommands::Import { device, file } => {
                commands::schema_import(&settings, &device, &file, quiet)
            }
        },
        Commands::Decode {
            device,
            input,
            hex,
            allow_advisory,
            stdout,
            pretty,
        } => commands::decode(
            &settings,
            commands::DecodeArgs {
                device,
                input,
                hex,
                allow_advisory,
                stdout,
                pretty,
                quiet,
            },
        ),
        Commands::Report { command } => match command {
            ReportCommands::List { device } => commands::report_list(&settings, &device),
            ReportCommands::Export {
                device,
                output,
                index,
            } => commands::report_export(&settings, &device, &output, index, quiet),
            ReportCommands::Clear { device } => commands::report_clear(&settings, &device, quiet),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
pub(crate) struct CliError {
    pub(crate) message: String,
    pub(crate) hint: Option<String>,
}

impl CliError {
    pub(crate) fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}
