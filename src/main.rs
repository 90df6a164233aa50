//! pronoun-cache CLI entry point.

use clap::Parser;

use pronoun_cache::cli::{commands, handle_error, Cli, Commands};
use pronoun_cache::infrastructure::config::ConfigLoader;
use pronoun_cache::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Dropping the logger flushes the file appender, so it lives until exit.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &config, cli.json).await,
        Commands::Override(args) => commands::override_cmd::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
