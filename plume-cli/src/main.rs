// Plume CLI - Batch post-processing for pollutant transcripts
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Plume CLI
//!
//! Batch post-processing for pollutant sensor transcripts: baseline
//! extraction and adaptive peak detection over chunked CSV data.
//!
//! ## Usage
//!
//! ```bash
//! # Compute baselines with the settings file's parameters
//! plume-cli --config plume_settings.json baseline
//!
//! # Run the peak detector with a coefficient override
//! plume-cli peaks --input walk.csv --output "walk peaks.csv" --coeff 5
//! ```

mod error;
mod run;
mod settings;
mod sink;
mod source;

use clap::{Parser, Subcommand};
use error::Result;
use settings::Settings;
use std::path::Path;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Plume batch post-processing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (JSON)
    #[arg(short, long, default_value = "plume_settings.json")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a baseline for each pollutant in a sensor transcript
    Baseline {
        /// Input transcript (overrides the settings file)
        #[arg(short, long)]
        input: Option<String>,

        /// Output transcript (overrides the settings file)
        #[arg(short, long)]
        output: Option<String>,

        /// Base window length for minimum tracking
        #[arg(long)]
        window_size: Option<usize>,

        /// Number of cascaded smoothing scales
        #[arg(long)]
        smoothing_index: Option<u32>,

        /// Rows per processed batch
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Run the adaptive peak detector over a sensor transcript
    Peaks {
        /// Input transcript (overrides the settings file)
        #[arg(short, long)]
        input: Option<String>,

        /// Output transcript (overrides the settings file)
        #[arg(short, long)]
        output: Option<String>,

        /// Multiplier on the below-percentile standard deviation
        #[arg(long)]
        coeff: Option<f64>,

        /// Percentile defining the "below" split point
        #[arg(long)]
        percentile: Option<f64>,

        /// Minimum samples before detection is enabled
        #[arg(long)]
        startup_bypass: Option<u32>,

        /// Rows per processed batch
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Also write detection events to this CSV
        #[arg(long)]
        events_output: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    info!("Plume CLI v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = try_main(args) {
        error!("{}", e);
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn try_main(args: Args) -> Result<()> {
    let mut settings = load_settings(Path::new(&args.config))?;

    match args.command {
        Command::Baseline {
            input,
            output,
            window_size,
            smoothing_index,
            chunk_size,
        } => {
            if let Some(input) = input {
                settings.input = input;
            }
            if let Some(output) = output {
                settings.output = output;
            }
            if let Some(window_size) = window_size {
                settings.baseline.window_size = window_size;
            }
            if let Some(smoothing_index) = smoothing_index {
                settings.baseline.smoothing_index = smoothing_index;
            }
            if let Some(chunk_size) = chunk_size {
                settings.chunk_size = chunk_size;
            }
            settings.validate()?;
            run::run_baseline(&settings)
        }
        Command::Peaks {
            input,
            output,
            coeff,
            percentile,
            startup_bypass,
            chunk_size,
            events_output,
        } => {
            if let Some(input) = input {
                settings.input = input;
            }
            if let Some(output) = output {
                settings.output = output;
            }
            if let Some(coeff) = coeff {
                settings.detector.coeff = coeff;
            }
            if let Some(percentile) = percentile {
                settings.detector.percentile = percentile;
            }
            if let Some(startup_bypass) = startup_bypass {
                settings.detector.startup_bypass = startup_bypass;
            }
            if let Some(chunk_size) = chunk_size {
                settings.chunk_size = chunk_size;
            }
            if events_output.is_some() {
                settings.events_output = events_output;
            }
            settings.validate()?;
            run::run_peaks(&settings)
        }
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    if path.exists() {
        Settings::load(path)
    } else {
        warn!(
            "settings file '{}' not found, using defaults",
            path.display()
        );
        Ok(Settings::default())
    }
}
