//! AWS descriptors to records

use std::collections::BTreeMap;

use stocktake_core::{MergeableRecord, name_or_default};

use super::types::{Bucket, DbInstance, Domain, LightsailBundle, LightsailInstance};
use crate::fields::CostFields;

/// Monthly price per Lightsail bundle id
pub type BundlePrices = BTreeMap<String, f64>;

pub fn bundle_prices(bundles: &[LightsailBundle]) -> BundlePrices {
    bundles
        .iter()
        .map(|b| (b.bundle_id.clone(), b.price))
        .collect()
}

pub fn bucket(bucket: &Bucket) -> MergeableRecord {
    MergeableRecord::bare(name_or_default(bucket.name.as_deref()), "bucket")
}

/// An instance costs its bundle's price; unknown bundles leave Cost empty
pub fn lightsail(
    instance: &LightsailInstance,
    prices: &BundlePrices,
) -> MergeableRecord<CostFields> {
    let cost = instance
        .bundle_id
        .as_deref()
        .and_then(|id| prices.get(id))
        .copied();

    MergeableRecord::new(
        name_or_default(instance.name.as_deref()),
        "lightsail",
        CostFields::new(cost),
    )
}

pub fn domain(domain: &Domain) -> MergeableRecord {
    MergeableRecord::bare(name_or_default(domain.domain_name.as_deref()), "domain")
}

/// Databases are named by their initial database name, falling back to the
/// instance identifier when none was created
pub fn database(instance: &DbInstance) -> MergeableRecord {
    let name = instance
        .db_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .or(instance.identifier.as_deref());
    MergeableRecord::bare(name_or_default(name), "database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use stocktake_core::UNNAMED;

    fn instance(name: Option<&str>, bundle: Option<&str>) -> LightsailInstance {
        LightsailInstance {
            name: name.map(str::to_string),
            bundle_id: bundle.map(str::to_string),
            blueprint_id: Some("ubuntu_22_04".to_string()),
            state: Some("running".to_string()),
        }
    }

    fn prices() -> BundlePrices {
        bundle_prices(&[
            LightsailBundle {
                bundle_id: "nano_3_0".to_string(),
                price: 3.5,
            },
            LightsailBundle {
                bundle_id: "small_3_0".to_string(),
                price: 10.000_000_1,
            },
        ])
    }

    #[rstest]
    #[case::known_bundle(Some("nano_3_0"), Some(3.5))]
    #[case::rounded(Some("small_3_0"), Some(10.0))]
    #[case::unknown_bundle(Some("xlarge_9_9"), None)]
    #[case::no_bundle(None, None)]
    fn test_lightsail_cost(#[case] bundle: Option<&str>, #[case] expected: Option<f64>) {
        let record = lightsail(&instance(Some("web"), bundle), &prices());
        assert_eq!(record.name, "web");
        assert_eq!(record.record_type, "lightsail");
        assert_eq!(record.fields.cost, expected);
    }

    #[test]
    fn test_unnamed_resources() {
        assert_eq!(bucket(&Bucket { name: None }).name, UNNAMED);
        assert_eq!(lightsail(&instance(None, None), &prices()).name, UNNAMED);
        let db = DbInstance {
            db_name: None,
            identifier: None,
            engine: Some("postgres".to_string()),
            class: Some("db.t3.micro".to_string()),
        };
        assert_eq!(database(&db).name, UNNAMED);
    }

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some(""))]
    fn test_database_without_db_name_uses_identifier(#[case] db_name: Option<&str>) {
        let db = DbInstance {
            db_name: db_name.map(str::to_string),
            identifier: Some("prod-db-1".to_string()),
            engine: Some("mysql".to_string()),
            class: None,
        };
        assert_eq!(database(&db).name, "prod-db-1");
    }

    #[test]
    fn test_database_uses_db_name() {
        let db = DbInstance {
            db_name: Some("orders".to_string()),
            identifier: Some("prod-db-1".to_string()),
            engine: None,
            class: None,
        };
        let record = database(&db);
        assert_eq!(record.name, "orders");
        assert_eq!(record.record_type, "database");
    }

    #[test]
    fn test_bucket_and_domain() {
        let b = bucket(&Bucket {
            name: Some("assets".to_string()),
        });
        assert_eq!((b.name.as_str(), b.record_type.as_str()), ("assets", "bucket"));

        let d = domain(&Domain {
            domain_name: Some("example.org".to_string()),
            auto_renew: Some(true),
        });
        assert_eq!((d.name.as_str(), d.record_type.as_str()), ("example.org", "domain"));
    }
}
