//! DigitalOcean descriptors to records

use std::collections::{BTreeMap, HashSet};

use stocktake_core::{MergeableRecord, name_or_default};

use super::types::{Cluster, Database, Droplet, LoadBalancer, Size, Snapshot, Volume};
use crate::fields::CostFields;

pub const VOLUME_COST_PER_GB: f64 = 0.10;
pub const SNAPSHOT_COST_PER_GB: f64 = 0.05;

/// Image prefix of droplets that are Kubernetes worker nodes
pub const KUBERNETES_IMAGE_PREFIX: &str = "do-kube";

/// Monthly price per size slug
pub type SizeCosts = BTreeMap<String, f64>;

pub fn size_costs(sizes: &[Size]) -> SizeCosts {
    sizes
        .iter()
        .map(|size| (size.slug.clone(), size.price_monthly))
        .collect()
}

/// Monthly price of a load balancer size, if it has a fixed one
pub fn load_balancer_cost(size: &str) -> Option<f64> {
    match size {
        "lb-small" => Some(10.0),
        "lb-medium" => Some(30.0),
        "lb-large" => Some(60.0),
        _ => None,
    }
}

pub fn is_kubernetes_node(droplet: &Droplet) -> bool {
    droplet
        .image
        .name
        .as_deref()
        .is_some_and(|name| name.starts_with(KUBERNETES_IMAGE_PREFIX))
}

/// Snapshot ids that are automatic droplet backups
pub fn backup_ids(droplets: &[Droplet]) -> HashSet<String> {
    droplets
        .iter()
        .flat_map(|d| d.backup_ids.iter())
        .map(|id| id.to_string())
        .collect()
}

pub fn droplet(droplet: &Droplet, costs: &SizeCosts) -> MergeableRecord<CostFields> {
    MergeableRecord::new(
        name_or_default(Some(droplet.name.as_str())),
        "droplet",
        CostFields::new(costs.get(&droplet.size_slug).copied()),
    )
}

/// Sum of every node pool's size price times its node count.
/// Sizes without a known price count as zero.
pub fn cluster(cluster: &Cluster, costs: &SizeCosts) -> MergeableRecord<CostFields> {
    let cost: f64 = cluster
        .node_pools
        .iter()
        .map(|pool| costs.get(&pool.size).copied().unwrap_or(0.0) * f64::from(pool.count))
        .sum();

    MergeableRecord::new(
        name_or_default(Some(cluster.name.as_str())),
        "cluster",
        CostFields::new(Some(cost)),
    )
}

pub fn database(database: &Database) -> MergeableRecord {
    MergeableRecord::bare(name_or_default(Some(database.name.as_str())), "database")
}

pub fn volume(volume: &Volume) -> MergeableRecord<CostFields> {
    MergeableRecord::new(
        name_or_default(Some(volume.name.as_str())),
        "volume",
        CostFields::new(Some(volume.size_gigabytes * VOLUME_COST_PER_GB)),
    )
}

pub fn snapshot(snapshot: &Snapshot) -> MergeableRecord<CostFields> {
    MergeableRecord::new(
        name_or_default(Some(snapshot.name.as_str())),
        "snapshot",
        CostFields::new(Some(snapshot.size_gigabytes * SNAPSHOT_COST_PER_GB)),
    )
}

pub fn load_balancer(lb: &LoadBalancer) -> MergeableRecord<CostFields> {
    MergeableRecord::new(
        name_or_default(Some(lb.name.as_str())),
        "loadbalancer",
        CostFields::new(lb.size.as_deref().and_then(load_balancer_cost)),
    )
}

/// Records for droplets, leaving out Kubernetes nodes
pub fn droplets(droplets: &[Droplet], costs: &SizeCosts) -> Vec<MergeableRecord<CostFields>> {
    droplets
        .iter()
        .filter(|d| !is_kubernetes_node(d))
        .map(|d| droplet(d, costs))
        .collect()
}

/// Records for snapshots, leaving out backups of the given droplets
pub fn snapshots(snapshots: &[Snapshot], droplets: &[Droplet]) -> Vec<MergeableRecord<CostFields>> {
    let backups = backup_ids(droplets);
    snapshots
        .iter()
        .filter(|s| !backups.contains(&s.id))
        .map(snapshot)
        .collect()
}
