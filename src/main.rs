use clap::Parser;
use dotsync::config::Cli;
use dotsync::Config;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    dotsync::logging::init(config.verbosity, config.quiet)
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;
    tracing::debug!(
        version = dotsync::VERSION,
        config_file = %config.config_file.display(),
        base_directory = %config.base_directory.display(),
        dry_run = config.dry_run,
        "Starting"
    );

    if dotsync::commands::run(&config)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
