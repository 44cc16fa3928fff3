//! Stocktake CLI
//!
//! Mirrors AWS, DigitalOcean, GoDaddy and SendGrid inventory into Airtable.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use stocktake_core::RunOptions;

use cli::{Cli, Commands};
use context::AppContext;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let Some(command) = cli.command else {
        println!("{} Cloud inventory reconciler", "stocktake".green().bold());
        println!();
        println!("Run {} for available commands.", "stocktake --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    if options.dry_run {
        tracing::info!("Dry run, nothing will be written");
    }

    execute_command(command, &cwd, cli.config.as_deref(), options).await
}

async fn execute_command(
    command: Commands,
    cwd: &Path,
    config: Option<&Path>,
    options: RunOptions,
) -> Result<()> {
    let load = || AppContext::load(cwd, config, options);

    match command {
        Commands::All => {
            commands::run_all(&load()?).await?;
        }
        Commands::Aws => {
            commands::run_aws(&load()?).await?;
        }
        Commands::DigitalOcean => {
            commands::run_digitalocean(&load()?).await?;
        }
        Commands::GoDaddy => {
            commands::run_godaddy(&load()?).await?;
        }
        Commands::SendGrid => {
            commands::run_sendgrid(&load()?).await?;
        }
        Commands::Data { service, resource } => {
            let ctx = AppContext::load_optional(cwd, config, options)?;
            commands::run_data(&ctx, service, resource.as_deref()).await?;
        }
    }
    Ok(())
}
