//! Provider update commands
//!
//! Each run fetches one provider's inventory, reconciles every resource type
//! into the provider's table, and prints the combined counts.

use stocktake_core::{
    AirtableCredentials, Credentials, Datastore, DigitalOceanCredentials, GoDaddyCredentials,
    MergeResult, Reconciler, RunOptions, SendGridCredentials,
};
use stocktake_providers::Inventory;
use tracing::info;

use crate::context::{AppContext, both};
use crate::error::Result;

/// Fetch `inventory` and merge it into `table`
pub async fn run_update<D: Datastore + ?Sized>(
    store: &D,
    table: &str,
    inventory: &dyn Inventory,
    options: RunOptions,
) -> Result<MergeResult> {
    println!("Updating {}", inventory.label());

    let groups = inventory.collect().await?;
    info!(
        provider = inventory.label(),
        types = groups.len(),
        dry_run = options.dry_run,
        "collected inventory"
    );

    let result = Reconciler::new(store, table, options)
        .merge_all(&groups)
        .await?;
    print_result(&result);
    Ok(result)
}

fn print_result(result: &MergeResult) {
    println!("  unlinked: {}", result.unlinked);
    println!("  update: {}", result.updated);
    println!("  created: {}", result.created);
    println!();
}

pub async fn run_aws(ctx: &AppContext) -> Result<MergeResult> {
    let store = ctx.store(AirtableCredentials::from_env()?)?;
    let client = ctx.aws().await;
    run_update(&store, &ctx.config()?.tables.aws, &client, ctx.options()).await
}

pub async fn run_digitalocean(ctx: &AppContext) -> Result<MergeResult> {
    let (airtable, credentials) = both(
        AirtableCredentials::from_env(),
        DigitalOceanCredentials::from_env(),
    )?;
    let store = ctx.store(airtable)?;
    let client = ctx.digitalocean(credentials)?;
    run_update(&store, &ctx.config()?.tables.digitalocean, &client, ctx.options()).await
}

pub async fn run_godaddy(ctx: &AppContext) -> Result<MergeResult> {
    let (airtable, credentials) =
        both(AirtableCredentials::from_env(), GoDaddyCredentials::from_env())?;
    let store = ctx.store(airtable)?;
    let client = ctx.godaddy(credentials)?;
    run_update(&store, &ctx.config()?.tables.godaddy, &client, ctx.options()).await
}

pub async fn run_sendgrid(ctx: &AppContext) -> Result<MergeResult> {
    let (airtable, credentials) =
        both(AirtableCredentials::from_env(), SendGridCredentials::from_env())?;
    let store = ctx.store(airtable)?;
    let client = ctx.sendgrid(credentials)?;
    run_update(&store, &ctx.config()?.tables.sendgrid, &client, ctx.options()).await
}

/// Every provider in sequence; stops at the first failure
pub async fn run_all(ctx: &AppContext) -> Result<MergeResult> {
    let credentials = Credentials::from_env()?;
    let config = ctx.config()?;
    let store = ctx.store(credentials.airtable)?;
    let options = ctx.options();

    let aws = ctx.aws().await;
    let digitalocean = ctx.digitalocean(credentials.digitalocean)?;
    let godaddy = ctx.godaddy(credentials.godaddy)?;
    let sendgrid = ctx.sendgrid(credentials.sendgrid)?;

    let runs: [(&dyn Inventory, &str); 4] = [
        (&aws, &config.tables.aws),
        (&digitalocean, &config.tables.digitalocean),
        (&godaddy, &config.tables.godaddy),
        (&sendgrid, &config.tables.sendgrid),
    ];

    let mut results = Vec::with_capacity(runs.len());
    for (inventory, table) in runs {
        results.push(run_update(&store, table, inventory, options).await?);
    }
    Ok(MergeResult::combine(results))
}
