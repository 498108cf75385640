//! Recent ARM deployments across the first few resource groups.

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use super::activity::{newest_first, parse_timestamp};
use super::{list_items, subscription_path};
use crate::fetch::Fetch;
use crate::model::{DeploymentEntry, DeploymentStatus};

pub const MAX_RESOURCE_GROUPS: usize = 5;
pub const DEPLOYMENTS_PER_GROUP: usize = 5;
const MAX_DEPLOYMENTS: usize = 20;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResourceGroup {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDeployment {
    id: Option<String>,
    name: Option<String>,
    properties: Option<RawDeploymentProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDeploymentProperties {
    provisioning_state: Option<String>,
    timestamp: Option<String>,
    duration: Option<String>,
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str) -> Vec<DeploymentEntry> {
    let groups_path = subscription_path(subscription_id, "resourcegroups?api-version=2021-04-01");
    let Some(groups_json) = fetch.get_json(&groups_path).await else {
        warn!("resource groups unavailable, skipping deployments");
        return Vec::new();
    };

    let groups: Vec<String> = list_items::<RawResourceGroup>(&groups_json)
        .into_iter()
        .filter_map(|rg| rg.name.filter(|n| !n.is_empty()))
        .take(MAX_RESOURCE_GROUPS)
        .collect();

    let paths: Vec<String> = groups
        .iter()
        .map(|rg| {
            subscription_path(
                subscription_id,
                &format!(
                    "resourcegroups/{rg}/providers/Microsoft.Resources/deployments?api-version=2021-04-01&$top={DEPLOYMENTS_PER_GROUP}"
                ),
            )
        })
        .collect();
    let results = join_all(paths.iter().map(|path| fetch.get_json(path))).await;

    let mut deployments = Vec::new();
    for (rg, json) in groups.iter().zip(results) {
        match json {
            Some(json) => deployments.extend(
                list_items::<RawDeployment>(&json)
                    .into_iter()
                    .map(|raw| to_entry(raw, rg)),
            ),
            None => debug!(resource_group = %rg, "deployments unavailable for group"),
        }
    }

    sort_and_truncate(deployments)
}

fn to_entry(raw: RawDeployment, resource_group: &str) -> DeploymentEntry {
    let props = raw.properties.unwrap_or_default();
    DeploymentEntry {
        id: raw.id.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        resource_group: resource_group.to_string(),
        status: match props.provisioning_state.as_deref() {
            Some("Succeeded") => DeploymentStatus::Succeeded,
            Some("Failed") => DeploymentStatus::Failed,
            Some("Running") => DeploymentStatus::Running,
            Some("Canceled") => DeploymentStatus::Canceled,
            _ => DeploymentStatus::Unknown,
        },
        timestamp: props.timestamp.unwrap_or_default(),
        duration: props
            .duration
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
    }
}

fn sort_and_truncate(deployments: Vec<DeploymentEntry>) -> Vec<DeploymentEntry> {
    let mut timed: Vec<_> = deployments
        .into_iter()
        .map(|d| (parse_timestamp(&d.timestamp), d))
        .collect();
    timed.sort_by(|a, b| newest_first(a.0, b.0));
    timed.into_iter().take(MAX_DEPLOYMENTS).map(|(_, d)| d).collect()
}
