//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::export::OutputFormat;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON config file overriding the defaults
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get daily summaries for a date or date range
    Summary {
        /// First date, YYYY-MM-DD
        #[arg(long = "from", value_name = "YYYY-MM-DD")]
        from: NaiveDate,

        /// Last date, YYYY-MM-DD (defaults to --from)
        #[arg(long = "to", value_name = "YYYY-MM-DD")]
        to: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
        format: OutputFormat,

        /// Directory for the output file
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Get details of one station
    Station {
        /// WMO station index, e.g. 96749
        station_id: String,
    },
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

/// Logs to stderr; `RUST_LOG` takes precedence over the verbosity flags.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ogimet={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    ProgressBar::new(size).with_message(message).with_style(style)
}

// -- Tests -------------------------------------------------------------------
