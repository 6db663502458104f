//! Platewise CLI - Estimate meal nutrition from a photo.

use anyhow::Context;
use clap::Parser;
use platewise_cli::commands;
use platewise_cli::{Cli, CliError, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `PLATEWISE_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("PLATEWISE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&path).with_context(|| format!("Failed to load {}", path.display()))?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let work = async {
        match cli.command {
            Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await,
            Command::Barcode(args) => commands::execute_barcode(args, &config, &formatter).await,
            Command::Search(args) => commands::execute_search(args, &config, &formatter).await,
            Command::Brand(args) => commands::execute_brand(args, &config, &formatter),
            Command::Keys => commands::execute_keys(&config, &formatter),
            Command::Config(args) => commands::execute_config(args, &config, &path, &formatter),
        }
    };

    // Dropping `work` cancels the classifier call and any lookups in flight
    tokio::select! {
        result = work => result?,
        _ = tokio::signal::ctrl_c() => return Err(CliError::Interrupted.into()),
    }

    Ok(())
}
