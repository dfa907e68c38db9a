//! GasGuard - MQ-series gas estimation from the command line
//!
//! ```text
//! gasguard estimate 500            one reading, human readable or --json
//! gasguard curve > curve.csv       RS and PPM for every ADC value
//! gasguard train [--csv data.csv]  fit hazard models or evaluate a classifier
//! gasguard monitor --port DEV      serial -> estimator -> models -> console
//! gasguard relay --port DEV        serial -> estimator -> HTTP
//! gasguard serve                   HTTP ingest service
//! ```
//!
//! Log output goes to stderr; set `RUST_LOG=debug` for per-reading detail.

mod commands;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gasguard_core::constants::UNBOUNDED_DISPLAY_KOHM;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "gasguard")]
#[command(version)]
#[command(about = "Gas identification and concentration estimates for MQ-series sensors", long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, global = true, env = "GASGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the clean-air baseline R0 (kOhm)
    #[arg(long, global = true)]
    r0: Option<f64>,

    /// Override the supply voltage (V)
    #[arg(long, global = true)]
    supply: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate gas type and concentration for one raw ADC reading
    Estimate {
        /// Raw reading (0-1023)
        #[arg(value_name = "RAW")]
        raw: u32,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print RS and PPM for every raw reading as CSV
    Curve {
        /// Resistance printed in place of an unbounded value (kOhm)
        #[arg(long, default_value_t = UNBOUNDED_DISPLAY_KOHM)]
        cap: f64,
    },

    /// Train the hazard models, or evaluate a classifier on a measurement CSV
    Train {
        /// MQ measurement table with a `Gas` column
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Use a random forest instead of a single tree (with --csv)
        #[arg(long)]
        forest: bool,

        /// Trees in the forest
        #[arg(long, default_value_t = 100)]
        trees: usize,

        /// Where to save the hazard models
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Read the sensor board and print estimates with model predictions
    Monitor {
        /// Serial device or capture file
        #[arg(short, long, env = "GASGUARD_PORT")]
        port: Option<PathBuf>,

        /// Saved hazard models (trained on the fly when missing)
        #[arg(long)]
        models: Option<PathBuf>,

        /// Input is a captured log: stamp readings one sample period apart
        /// instead of by wall clock
        #[arg(long)]
        replay: bool,
    },

    /// Forward sensor readings to an HTTP ingest service
    Relay {
        /// Serial device or capture file
        #[arg(short, long, env = "GASGUARD_PORT")]
        port: Option<PathBuf>,

        /// Base URL of the ingest service
        #[arg(short, long, env = "GASGUARD_URL")]
        url: Option<String>,

        /// Do not echo readings to stdout
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run the HTTP ingest service
    Serve {
        /// Address to bind to
        #[arg(short, long, env = "GASGUARD_ADDR")]
        addr: Option<SocketAddr>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(r0) = cli.r0 {
        config.estimator.baseline_r0_kohm = r0;
    }
    if let Some(supply) = cli.supply {
        config.estimator.supply_voltage_v = supply;
    }
    config.estimator.validate()?;

    let stdout = std::io::stdout();
    match cli.command {
        Commands::Estimate { raw, json } => commands::estimate(&config, raw, json, &mut stdout.lock()),
        Commands::Curve { cap } => commands::curve(&config, cap, &mut stdout.lock()),
        Commands::Train {
            csv,
            forest,
            trees,
            output,
        } => commands::train(&config, csv.as_deref(), forest, trees, output, &mut stdout.lock()),
        Commands::Monitor { port, models, replay } => {
            commands::monitor(&config, port, models, replay)
        }
        Commands::Relay { port, url, quiet } => commands::relay(&config, port, url, quiet),
        Commands::Serve { addr } => commands::serve(&config, addr),
    }
}
