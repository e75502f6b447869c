//! redfishctl - CLI for reading BMC sensors over Redfish

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use redfish_common::{HttpTransport, RedfishConfig};
use redfishctl::cli::{Cli, Commands};
use redfishctl::commands::{self, SensorsOptions};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = RedfishConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.client.endpoint = endpoint;
        config.validate()?;
    }
    debug!("Using endpoint {}", config.client.endpoint);

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    match cli.command {
        Commands::Sensors {
            uri,
            kind,
            concurrency,
            json,
        } => {
            let transport = HttpTransport::new(&config.client)?;
            let options = SensorsOptions {
                uri,
                kind,
                concurrency: concurrency.unwrap_or(config.walk.concurrency),
                json,
            };
            let outcome = commands::sensors(&transport, &options, &mut out, &mut err)?;
            out.flush()?;
            err.flush()?;
            std::process::exit(outcome.exit_code());
        }
        Commands::Get { uri, kind, json } => {
            let transport = HttpTransport::new(&config.client)?;
            commands::get(&transport, &uri, kind, json, &mut out)
        }
        Commands::Config => commands::show_config(&config, &mut out),
    }
}
