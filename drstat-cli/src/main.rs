use clap::Parser;

use drstat_cli::cli::{Cli, Commands};
use drstat_cli::commands;
use drstat_cli::error::CliError;
use drstat_cli::logging;
use drstat_cli::output::OutputWriter;
use drstat_core::config::GeneralConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // config errors surface from the command itself; logging falls back to defaults
    let loaded = commands::config::load_config(&cli.config).await;
    let general = match loaded {
        Ok((ref config, _)) => config.general.clone(),
        Err(_) => GeneralConfig::default(),
    };

    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }

    tracing::debug!(config = %cli.config.display(), "drstat starting");

    let writer = OutputWriter::new(cli.output);
    if let Err(e) = run(cli.command, &cli.config, loaded, &writer).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(
    command: Commands,
    config_path: &std::path::Path,
    loaded: Result<(drstat_core::config::DrstatConfig, String), drstat_core::error::DrstatError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Config(args) => commands::config::execute(args, config_path, writer).await,
        Commands::Stat(args) => {
            let (config, _) = loaded?;
            commands::stat::execute(args, &config.stat, writer).await
        }
        Commands::Rules(args) => {
            let (config, _) = loaded?;
            commands::rules::execute(args, &config.stat, writer).await
        }
    }
}
