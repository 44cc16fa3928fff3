//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Stocktake - mirror cloud inventory into Airtable
#[derive(Parser, Debug)]
#[command(name = "stocktake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Compute changes without writing them
    #[arg(long = "dry-run", visible_alias = "dryRun", global = true)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to stocktake.toml or config.json in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run all services in sequence
    All,

    /// Fetch AWS resources and update Airtable
    Aws,

    /// Fetch DigitalOcean resources and update Airtable
    #[command(name = "do", visible_alias = "digitalocean")]
    DigitalOcean,

    /// Fetch GoDaddy domains and update Airtable
    #[command(name = "godaddy")]
    GoDaddy,

    /// Fetch SendGrid API keys and update Airtable
    #[command(name = "sendgrid")]
    SendGrid,

    /// Print raw data from a service
    ///
    /// Without a resource, lists the resources the service offers.
    ///
    /// Examples:
    ///   stocktake data do               # List DigitalOcean resources
    ///   stocktake data do droplets      # Dump droplets as JSON
    Data {
        /// Service to query
        service: Service,

        /// Resource to dump
        resource: Option<String>,
    },
}

/// Services the `data` command can query
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Aws,
    #[value(name = "do", alias = "digitalocean")]
    DigitalOcean,
    #[value(name = "godaddy")]
    GoDaddy,
    #[value(name = "sendgrid")]
    SendGrid,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Aws => "aws",
            Service::DigitalOcean => "do",
            Service::GoDaddy => "godaddy",
            Service::SendGrid => "sendgrid",
        }
    }
}
