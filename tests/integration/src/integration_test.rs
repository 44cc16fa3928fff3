//! End-to-end flow: config loading -> provider fetch -> Airtable reconcile
//!
//! Both DigitalOcean and Airtable are served by one wiremock server.

use std::fs;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use stocktake_airtable::{AirtableConfig, AirtableStore};
use stocktake_core::{
    AppConfig, DigitalOceanCredentials, MergeResult, Reconciler, RunOptions, Secret,
};
use stocktake_providers::Inventory;
use stocktake_providers::digitalocean::{DigitalOceanClient, DigitalOceanConfig};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn mount_digitalocean(server: &MockServer) {
    let listings = [
        ("/sizes", "sizes", json!([{"slug": "s-1vcpu-1gb", "price_monthly": 15.0}])),
        (
            "/droplets",
            "droplets",
            json!([
                {"id": 1, "name": "web-1", "size_slug": "s-1vcpu-1gb"},
                {"id": 2, "name": "web-2", "size_slug": "s-1vcpu-1gb"}
            ]),
        ),
        ("/kubernetes/clusters", "kubernetes_clusters", json!([])),
        ("/databases", "databases", json!([])),
        ("/volumes", "volumes", json!([])),
        ("/snapshots", "snapshots", json!([])),
        ("/load_balancers", "load_balancers", json!([])),
    ];

    for (endpoint, key, items) in listings {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({key: items, "links": {}})))
            .mount(server)
            .await;
    }
}

async fn mount_airtable(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v0/appBase/DigitalOcean"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "rec1", "fields": {"Name": "web-1", "Type": "droplet", "Status": "active", "Cost": 10}},
                {"id": "rec2", "fields": {"Name": "old-db", "Type": "database", "Status": "active"}}
            ]
        })))
        .mount(server)
        .await;

    for verb in ["POST", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/v0/appBase/DigitalOcean"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .mount(server)
            .await;
    }
}

fn bodies(requests: &[Request], verb: &str) -> Vec<Value> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_config_to_reconciled_table() {
    let server = MockServer::start().await;
    mount_digitalocean(&server).await;
    mount_airtable(&server).await;

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.json"),
        json!({
            "base": "appBase",
            "tables": {"aws": "AWS", "do": "DigitalOcean", "godaddy": "GoDaddy", "sendgrid": "SendGrid"},
            "endpoints": {"airtable": server.uri(), "do": server.uri()}
        })
        .to_string(),
    )
    .unwrap();

    let config = AppConfig::discover(dir.path()).unwrap();
    let endpoints = &config.endpoints;

    let store = AirtableStore::new(
        AirtableConfig::new(Secret::new("patKEY"), config.base.clone())
            .with_api_base_url(endpoints.airtable.clone().unwrap()),
    )
    .unwrap();
    let client = DigitalOceanClient::new(
        DigitalOceanConfig::new(DigitalOceanCredentials {
            api_key: Secret::new("do-token"),
        })
        .with_api_base_url(endpoints.digitalocean.clone().unwrap()),
    )
    .unwrap();

    let groups = client.collect().await.unwrap();
    let result = Reconciler::new(&store, &config.tables.digitalocean, RunOptions::default())
        .merge_all(&groups)
        .await
        .unwrap();

    // web-1 cost 10 -> 15, web-2 created, old-db unlinked
    assert_eq!(
        result,
        MergeResult {
            unlinked: 1,
            updated: 1,
            created: 1
        }
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        bodies(&requests, "POST"),
        vec![json!({"records": [{"fields": {
            "Name": "web-2", "Type": "droplet", "Status": "active", "Cost": 15.0
        }}]})]
    );

    let patches = bodies(&requests, "PATCH");
    assert_eq!(patches.len(), 2, "one unlink batch per type: {patches:?}");
    assert!(patches.contains(&json!({"records": [{"id": "rec1", "fields": {
        "Name": "web-1", "Type": "droplet", "Cost": 15.0
    }}]})));
    assert!(patches.contains(&json!({"records": [{"id": "rec2", "fields": {"Status": "unlinked"}}]})));
}
