//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use redfish_common::SensorKind;

#[derive(Debug, Parser)]
#[command(name = "redfishctl")]
#[command(about = "Read BMC sensor resources over Redfish", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.config/redfish/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured BMC endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a sensor collection and print every member
    Sensors {
        /// Collection URI, e.g. /redfish/v1/Chassis/1/Sensors
        uri: String,

        /// Sensor schema shape: fans or channels
        #[arg(long, default_value = "fans")]
        kind: SensorKind,

        /// Member fetches in flight (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Emit the source documents as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a single sensor resource
    Get {
        uri: String,

        #[arg(long, default_value = "fans")]
        kind: SensorKind,

        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}
