//! Command implementations for stocktake-cli

pub mod data;
pub mod update;

pub use data::run_data;
pub use update::{run_all, run_aws, run_digitalocean, run_godaddy, run_sendgrid};
