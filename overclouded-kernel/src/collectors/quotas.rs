//! Compute quota usage for the primary region.

use serde::Deserialize;
use tracing::warn;

use super::{as_count, list_items, subscription_path};
use crate::fetch::Fetch;
use crate::model::QuotaUsage;

const MAX_QUOTAS: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawUsage {
    name: Option<RawUsageName>,
    current_value: Option<f64>,
    limit: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawUsageName {
    value: Option<String>,
    localized_value: Option<String>,
}

impl RawUsage {
    fn mentions_vcpu(&self) -> bool {
        self.name
            .as_ref()
            .and_then(|n| n.localized_value.as_deref())
            .is_some_and(|n| n.to_lowercase().contains("vcpu"))
    }

    fn display_name(&self) -> String {
        self.name
            .as_ref()
            .and_then(|n| {
                n.localized_value
                    .clone()
                    .filter(|v| !v.is_empty())
                    .or_else(|| n.value.clone().filter(|v| !v.is_empty()))
            })
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str, region: &str) -> Vec<QuotaUsage> {
    let path = subscription_path(
        subscription_id,
        &format!("providers/Microsoft.Compute/locations/{region}/usages?api-version=2023-03-01"),
    );
    let Some(json) = fetch.get_json(&path).await else {
        warn!(region, "compute quotas unavailable, defaulting to none");
        return Vec::new();
    };

    list_items::<RawUsage>(&json)
        .into_iter()
        .filter(|u| as_count(u.current_value) > 0 || u.mentions_vcpu())
        .take(MAX_QUOTAS)
        .map(|u| QuotaUsage {
            name: u.display_name(),
            current_usage: as_count(u.current_value),
            limit: as_count(u.limit),
        })
        .collect()
}
