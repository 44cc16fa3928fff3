//! End-to-end tests that invoke the compiled `stocktake` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIALS: [&str; 5] = [
    "AIRTABLE_API_KEY",
    "DO_API_KEY",
    "GODADDY_API_KEY",
    "GODADDY_API_SECRET",
    "SENDGRID_API_KEY",
];

/// A `stocktake` command in `dir` with no credentials in its environment
fn stocktake(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stocktake").expect("Failed to find stocktake binary");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    for name in CREDENTIALS {
        cmd.env_remove(name);
    }
    cmd
}

fn write_config(dir: &Path, endpoints: &str) {
    let content = format!(
        "base = \"appBase\"\n\n[tables]\naws = \"AWS\"\ndo = \"DigitalOcean\"\ngodaddy = \"GoDaddy\"\nsendgrid = \"SendGrid\"\n{endpoints}"
    );
    fs::write(dir.join("stocktake.toml"), content).unwrap();
}

// ============================================================================
// Help and parsing
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("all"))
        .stdout(predicate::str::contains("godaddy"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_no_command_prints_hint() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("stocktake --help"));
}

#[test]
fn test_unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path()).arg("vercel").assert().failure();
}

// ============================================================================
// data
// ============================================================================

#[test]
fn test_data_lists_resources_without_config() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path())
        .args(["data", "aws"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"Available aws resources: "buckets", "lightsails", "domains", "databases""#,
        ));
}

#[test]
fn test_data_unknown_resource_exits_one() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path())
        .args(["data", "do", "kubernetes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown resource 'do.kubernetes', options:"))
        .stderr(predicate::str::contains(r#""droplets""#));
}

#[test]
fn test_data_requires_provider_credentials() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path())
        .args(["data", "godaddy", "domains"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GODADDY_API_KEY"))
        .stderr(predicate::str::contains("GODADDY_API_SECRET"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_data_prints_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sizes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sizes": [{"slug": "s-1vcpu-1gb", "price_monthly": 6.0}],
            "links": {}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &format!("\n[endpoints]\ndo = \"{}\"\n", server.uri()));

    stocktake(dir.path())
        .args(["data", "digitalocean", "sizes"])
        .env("DO_API_KEY", "do-token")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""s-1vcpu-1gb": 6.0"#));
}

// ============================================================================
// Updates
// ============================================================================

#[test]
fn test_update_without_config_fails() {
    let dir = TempDir::new().unwrap();
    stocktake(dir.path())
        .arg("aws")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration not found"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"base": "appBase"}"#).unwrap();
    stocktake(dir.path())
        .arg("sendgrid")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse JSON config"));
}

#[test]
fn test_update_reports_every_missing_variable() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "");
    stocktake(dir.path())
        .arg("do")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Missing required environment variables: AIRTABLE_API_KEY, DO_API_KEY",
        ));
}

async fn mount_sendgrid_run(server: &MockServer, writes: u64) {
    Mock::given(method("GET"))
        .and(path("/api_keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"name": "mailer", "api_key_id": "k1"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v0/appBase/SendGrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "id": "recLegacy",
                "createdTime": "2021-03-01T10:00:00.000Z",
                "fields": {"Name": "legacy", "Type": "apikey", "Status": "active"}
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v0/appBase/SendGrid"))
        .and(body_partial_json(json!({
            "records": [{"fields": {"Name": "mailer", "Type": "apikey", "Status": "active"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(writes)
        .mount(server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/v0/appBase/SendGrid"))
        .and(body_partial_json(json!({
            "records": [{"id": "recLegacy", "fields": {"Status": "unlinked"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(writes)
        .mount(server)
        .await;
}

fn sendgrid_config(dir: &Path, server: &MockServer) {
    write_config(
        dir,
        &format!(
            "\n[endpoints]\nairtable = \"{uri}\"\nsendgrid = \"{uri}\"\n",
            uri = server.uri()
        ),
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sendgrid_run_prints_counts() {
    let server = MockServer::start().await;
    mount_sendgrid_run(&server, 1).await;

    let dir = TempDir::new().unwrap();
    sendgrid_config(dir.path(), &server);

    stocktake(dir.path())
        .arg("sendgrid")
        .env("AIRTABLE_API_KEY", "patKEY")
        .env("SENDGRID_API_KEY", "SG.key")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Updating SendGrid\n  unlinked: 1\n  update: 0\n  created: 1\n",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_writes_nothing() {
    let server = MockServer::start().await;
    mount_sendgrid_run(&server, 0).await;

    let dir = TempDir::new().unwrap();
    sendgrid_config(dir.path(), &server);

    stocktake(dir.path())
        .args(["--dryRun", "sendgrid"])
        .env("AIRTABLE_API_KEY", "patKEY")
        .env("SENDGRID_API_KEY", "SG.key")
        .assert()
        .success()
        .stdout(predicate::str::contains("  unlinked: 1"))
        .stdout(predicate::str::contains("  created: 1"));
}
