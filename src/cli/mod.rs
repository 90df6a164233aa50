//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use commands::override_cmd::OverrideArgs;
use commands::resolve::ResolveArgs;

/// Resolve and override pronouns with batched, cached lookups
#[derive(Parser, Debug)]
#[command(name = "pronoun-cache", version, about, long_about = None)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of `.pronoun-cache/`
    #[arg(long, global = true, env = "PRONOUN_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve pronouns for one or more entity ids
    Resolve(ResolveArgs),
    /// Manage local pronoun overrides
    Override(OverrideArgs),
}

/// Report a command failure and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("error:").red().bold());
    }
    std::process::exit(1);
}
