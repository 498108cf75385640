/**
 * RESOURCE INVENTORY - Flat resource list of the subscription
 *
 * ROLE :
 * One list call, then classification of every record. Most governance and
 * monitoring metrics are derived from this list, so it is fetched once and
 * handed to the dependent collectors instead of being re-fetched.
 *
 * CLASSIFICATION :
 * - short type label = last segment of the dotted ARM type
 * - VM = type contains "virtualmachine" but not "extensions" (VM extensions
 *   are sub-resources, not machines)
 * - storage account = exact type match
 * - region bucket = location, "unknown" when absent
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collectors::{lenient_tags, list_items, null_as_default};
use crate::fetch::Fetch;
use crate::model::{RegionCount, TypeCount};

const RESOURCES_API: &str = "2021-04-01";
const MAX_TYPE_BUCKETS: usize = 15;

pub const STORAGE_ACCOUNT_TYPE: &str = "microsoft.storage/storageaccounts";
pub const PUBLIC_IP_TYPE: &str = "microsoft.network/publicipaddresses";
pub const NSG_TYPE: &str = "microsoft.network/networksecuritygroups";

pub const UNKNOWN_REGION: &str = "unknown";
/// Used for the quota lookup when the inventory names no concrete region.
pub const DEFAULT_QUOTA_REGION: &str = "eastus";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub resource_type: String,
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl ResourceRecord {
    /// Case-insensitive match against a lowercase ARM type.
    pub fn is_type(&self, lowercase_type: &str) -> bool {
        self.resource_type.eq_ignore_ascii_case(lowercase_type)
    }

    pub fn short_type(&self) -> &str {
        self.resource_type
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&self.resource_type)
    }

    pub fn is_virtual_machine(&self) -> bool {
        let lowered = self.resource_type.to_ascii_lowercase();
        lowered.contains("virtualmachine") && !lowered.contains("extensions")
    }

    pub fn region(&self) -> &str {
        match self.location.as_deref() {
            Some(location) if !location.is_empty() => location,
            _ => UNKNOWN_REGION,
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.tags.as_ref().is_some_and(|tags| !tags.is_empty())
    }
}

/// Fetch the inventory. Empty when the call fails.
pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str) -> Vec<ResourceRecord> {
    let path = format!("/subscriptions/{subscription_id}/resources?api-version={RESOURCES_API}");
    match fetch.get_json(&path).await {
        Some(json) => {
            let records: Vec<ResourceRecord> = list_items(&json);
            debug!(resources = records.len(), "inventory collected");
            records
        }
        None => {
            warn!("resource inventory unavailable, continuing with an empty inventory");
            Vec::new()
        }
    }
}

/// Aggregates computed once from the inventory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryStats {
    pub total: u64,
    pub vm_count: u64,
    pub storage_accounts: u64,
    pub by_type: Vec<TypeCount>,
    pub by_region: Vec<RegionCount>,
}

impl InventoryStats {
    pub fn from_records(records: &[ResourceRecord]) -> Self {
        let mut types: BTreeMap<String, u64> = BTreeMap::new();
        let mut regions: BTreeMap<String, u64> = BTreeMap::new();

        for record in records {
            *types.entry(record.short_type().to_string()).or_insert(0) += 1;
            *regions.entry(record.region().to_string()).or_insert(0) += 1;
        }

        let by_type = ranked(types)
            .into_iter()
            .take(MAX_TYPE_BUCKETS)
            .map(|(type_name, count)| TypeCount { type_name, count })
            .collect();
        let by_region = ranked(regions)
            .into_iter()
            .map(|(region, count)| RegionCount { region, count })
            .collect();

        Self {
            total: records.len() as u64,
            vm_count: records.iter().filter(|r| r.is_virtual_machine()).count() as u64,
            storage_accounts: count_of_type(records, STORAGE_ACCOUNT_TYPE),
            by_type,
            by_region,
        }
    }

    /// Most populous concrete region; `global`/`unknown` buckets are skipped.
    pub fn primary_region(&self) -> &str {
        self.by_region
            .iter()
            .map(|bucket| bucket.region.as_str())
            .find(|region| !region.eq_ignore_ascii_case(UNKNOWN_REGION) && !region.eq_ignore_ascii_case("global"))
            .unwrap_or(DEFAULT_QUOTA_REGION)
    }
}

pub fn count_of_type(records: &[ResourceRecord], lowercase_type: &str) -> u64 {
    records.iter().filter(|r| r.is_type(lowercase_type)).count() as u64
}

// count desc; BTreeMap order + stable sort keeps ties alphabetical
fn ranked(counts: BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MapFetcher;
    use serde_json::json;

    fn record(name: &str, resource_type: &str, location: Option<&str>) -> ResourceRecord {
        ResourceRecord {
            id: format!("/subscriptions/s/resourceGroups/rg/providers/{resource_type}/{name}"),
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            location: location.map(str::to_string),
            tags: None,
        }
    }

    #[test]
    fn test_vm_count_excludes_extensions() {
        let records = vec![
            record("vm1", "Microsoft.Compute/virtualMachines", Some("eastus")),
            record("vm1-ext", "Microsoft.Compute/virtualMachines/extensions", Some("eastus")),
            record("ss", "Microsoft.Compute/virtualMachineScaleSets", Some("eastus")),
            record("st", "Microsoft.Storage/storageAccounts", Some("westeurope")),
        ];
        let stats = InventoryStats::from_records(&records);
        assert_eq!(stats.vm_count, 2);
        assert_eq!(stats.storage_accounts, 1);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn test_type_and_region_buckets() {
        let records = vec![
            record("d1", "Microsoft.Compute/disks", Some("westeurope")),
            record("d2", "Microsoft.Compute/disks", Some("westeurope")),
            record("ip", "Microsoft.Network/publicIPAddresses", None),
            record("kv", "Microsoft.KeyVault/vaults", Some("eastus")),
        ];
        let stats = InventoryStats::from_records(&records);
        assert_eq!(stats.by_type[0], TypeCount { type_name: "disks".into(), count: 2 });
        assert_eq!(stats.by_type[1].type_name, "publicIPAddresses");
        assert_eq!(stats.by_region[0], RegionCount { region: "westeurope".into(), count: 2 });
        assert!(stats.by_region.iter().any(|r| r.region == UNKNOWN_REGION && r.count == 1));
    }

    #[test]
    fn test_type_buckets_are_capped() {
        let records: Vec<ResourceRecord> = (0..20)
            .map(|i| record(&format!("r{i}"), &format!("Microsoft.Test/kind{i:02}"), Some("eastus")))
            .collect();
        let stats = InventoryStats::from_records(&records);
        assert_eq!(stats.by_type.len(), 15);
        assert_eq!(stats.by_region.len(), 1);
    }

    #[test]
    fn test_primary_region_skips_unknown_and_global() {
        let records = vec![
            record("a", "Microsoft.Network/dnszones", Some("global")),
            record("b", "Microsoft.Network/dnszones", Some("global")),
            record("c", "Microsoft.Insights/actiongroups", None),
            record("d", "Microsoft.Compute/disks", Some("northeurope")),
        ];
        assert_eq!(InventoryStats::from_records(&records).primary_region(), "northeurope");
        assert_eq!(InventoryStats::from_records(&[]).primary_region(), DEFAULT_QUOTA_REGION);
    }

    #[tokio::test]
    async fn test_collect_skips_malformed_records() {
        let fetch = MapFetcher::new().with(
            "/resources",
            json!({ "value": [
                { "id": "1", "name": "web-01", "type": "Microsoft.Web/sites", "location": "eastus", "tags": { "env": "prod" } },
                { "id": "2", "name": 42, "type": "Microsoft.Web/sites" },
                { "id": "3", "name": "db", "type": "Microsoft.Sql/servers" }
            ]}),
        );
        let records = collect(&fetch, "sub").await;
        assert_eq!(records.len(), 2);
        assert!(records[0].is_tagged());
        assert!(!records[1].is_tagged());
        assert_eq!(records[1].region(), UNKNOWN_REGION);
        assert_eq!(fetch.calls(), vec!["/subscriptions/sub/resources?api-version=2021-04-01".to_string()]);
    }

    #[tokio::test]
    async fn test_null_fields_keep_the_record() {
        let fetch = MapFetcher::new().with(
            "/resources",
            json!({ "value": [
                { "id": "1", "name": "web-01", "type": "Microsoft.Web/sites", "tags": { "owner": null } },
                { "id": null, "name": "disk-01", "type": "Microsoft.Compute/disks", "tags": null },
                { "id": "3", "name": null, "type": null, "location": null }
            ]}),
        );
        let records = collect(&fetch, "sub").await;
        assert_eq!(records.len(), 3);
        assert!(records[0].is_tagged());
        assert_eq!(records[0].tags.as_ref().unwrap()["owner"], "");
        assert_eq!(records[1].id, "");
        assert!(!records[1].is_tagged());
        assert_eq!(records[2].name, "");
        assert_eq!(records[2].resource_type, "");
        assert_eq!(records[2].region(), UNKNOWN_REGION);

        let stats = InventoryStats::from_records(&records);
        assert_eq!(stats.total, 3);
    }

    #[tokio::test]
    async fn test_failed_call_is_empty_inventory() {
        let fetch = MapFetcher::new();
        assert!(collect(&fetch, "sub").await.is_empty());
    }
}
