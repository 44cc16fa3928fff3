//! Provider normalizers feeding the reconciler over several runs
//!
//! Each test replays successive inventory snapshots against one in-memory
//! table and checks the counts and rows after every run.

use pretty_assertions::assert_eq;
use serde_json::json;
use stocktake_core::{MergeResult, RecordStatus, Reconciler, ResourceRecords, RunOptions};
use stocktake_providers::aws::normalize as aws;
use stocktake_providers::aws::types::{Bucket, DbInstance, LightsailBundle, LightsailInstance};
use stocktake_providers::godaddy::normalize as godaddy;
use stocktake_providers::godaddy::types::Domain;
use stocktake_test_utils::{MemoryDatastore, row};

const TABLE: &str = "AWS";

fn instance(name: &str, bundle: &str) -> LightsailInstance {
    LightsailInstance {
        name: Some(name.to_string()),
        bundle_id: Some(bundle.to_string()),
        blueprint_id: None,
        state: Some("running".to_string()),
    }
}

fn bundles(price: f64) -> Vec<LightsailBundle> {
    vec![LightsailBundle {
        bundle_id: "micro_3_0".to_string(),
        price,
    }]
}

fn aws_inventory(buckets: &[&str], price: f64) -> Vec<ResourceRecords> {
    let prices = aws::bundle_prices(&bundles(price));
    let buckets: Vec<Bucket> = buckets
        .iter()
        .map(|name| Bucket {
            name: Some(name.to_string()),
        })
        .collect();

    vec![
        ResourceRecords::new("bucket", buckets.iter().map(aws::bucket).collect()).unwrap(),
        ResourceRecords::new(
            "lightsail",
            vec![aws::lightsail(&instance("vpn", "micro_3_0"), &prices)],
        )
        .unwrap(),
    ]
}

#[tokio::test]
async fn test_inventory_over_three_runs() {
    let store = MemoryDatastore::new();
    let reconciler = Reconciler::new(&store, TABLE, RunOptions::default());

    // First sighting
    let first = reconciler
        .merge_all(&aws_inventory(&["assets", "logs"], 10.0))
        .await
        .unwrap();
    assert_eq!(first, MergeResult { unlinked: 0, updated: 0, created: 3 });

    // Price change and a deleted bucket
    let second = reconciler
        .merge_all(&aws_inventory(&["assets"], 15.0))
        .await
        .unwrap();
    assert_eq!(second, MergeResult { unlinked: 1, updated: 1, created: 0 });
    assert_eq!(
        store.find(TABLE, "lightsail", "vpn").unwrap().get("Cost"),
        Some(&json!(15.0))
    );
    assert!(store.find(TABLE, "bucket", "logs").unwrap().is_unlinked());

    // Nothing changed
    let third = reconciler
        .merge_all(&aws_inventory(&["assets"], 15.0))
        .await
        .unwrap();
    assert!(third.is_noop());
    assert_eq!(store.rows(TABLE).len(), 3);
}

#[tokio::test]
async fn test_databases_without_db_name_are_kept_apart() {
    let store = MemoryDatastore::new();
    let reconciler = Reconciler::new(&store, TABLE, RunOptions::default());

    let databases: Vec<DbInstance> = ["prod-db-1", "prod-db-2"]
        .iter()
        .map(|id| DbInstance {
            db_name: None,
            identifier: Some(id.to_string()),
            engine: Some("postgres".to_string()),
            class: Some("db.t3.micro".to_string()),
        })
        .collect();
    let groups = vec![
        ResourceRecords::new("bucket", vec![aws::bucket(&Bucket { name: Some("assets".to_string()) })])
            .unwrap(),
        ResourceRecords::new("database", databases.iter().map(aws::database).collect()).unwrap(),
    ];

    let result = reconciler.merge_all(&groups).await.unwrap();
    assert_eq!(result, MergeResult { unlinked: 0, updated: 0, created: 3 });
    assert!(store.find(TABLE, "database", "prod-db-1").is_some());
    assert!(store.find(TABLE, "database", "prod-db-2").is_some());
}

#[tokio::test]
async fn test_stored_integer_cost_matches_float() {
    let store = MemoryDatastore::new().with_rows(
        TABLE,
        vec![row(
            "rec1",
            json!({"Name": "vpn", "Type": "lightsail", "Status": "active", "Cost": 10}),
        )],
    );
    let reconciler = Reconciler::new(&store, TABLE, RunOptions::default());

    let result = reconciler
        .merge_all(&aws_inventory(&[], 10.0))
        .await
        .unwrap();
    assert_eq!(result, MergeResult::zero());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_domain_probe_change_is_an_update() {
    let store = MemoryDatastore::new();
    let reconciler = Reconciler::new(&store, "GoDaddy", RunOptions::default());
    let domain = Domain {
        domain: "example.com".to_string(),
        expires: Some("2030-01-15T00:00:00Z".to_string()),
        status: Some("ACTIVE".to_string()),
        renew_auto: Some(true),
    };

    let up = vec![godaddy::domain(&domain, "OK - 200".to_string())];
    let down = vec![godaddy::domain(&domain, "Error - Timeout".to_string())];

    let created = reconciler.merge_records("domain", &up).await.unwrap();
    assert_eq!(created.created, 1);

    let changed = reconciler.merge_records("domain", &down).await.unwrap();
    assert_eq!(changed, MergeResult { unlinked: 0, updated: 1, created: 0 });

    let stored = store.find("GoDaddy", "domain", "example.com").unwrap();
    assert_eq!(stored.get("HttpResponse"), Some(&json!("Error - Timeout")));
    assert_eq!(stored.get("Expires"), Some(&json!("2030-01-15")));
    assert_eq!(stored.status(), Some(RecordStatus::Active));
}
