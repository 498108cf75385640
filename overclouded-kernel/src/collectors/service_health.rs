//! Resource health: availability records bucketed per provider namespace.

use serde::Deserialize;
use tracing::warn;

use super::{list_items, subscription_path};
use crate::fetch::Fetch;
use crate::model::{HealthStatus, ResourceHealthCounts, ServiceHealthEntry};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAvailability {
    id: Option<String>,
    properties: Option<RawAvailabilityProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAvailabilityProperties {
    availability_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthSummary {
    pub service_health: Vec<ServiceHealthEntry>,
    pub resource_health: ResourceHealthCounts,
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str) -> HealthSummary {
    let path = subscription_path(
        subscription_id,
        "providers/Microsoft.ResourceHealth/availabilityStatuses?api-version=2020-05-01&$top=20",
    );
    match fetch.get_json(&path).await {
        Some(json) => summarize(list_items(&json)),
        None => {
            warn!("resource health unavailable, defaulting to no data");
            HealthSummary::default()
        }
    }
}

fn summarize(records: Vec<RawAvailability>) -> HealthSummary {
    let mut buckets: Vec<(String, ResourceHealthCounts)> = Vec::new();
    let mut totals = ResourceHealthCounts::default();

    for record in records {
        let namespace = provider_namespace(record.id.as_deref());
        let state = record.properties.and_then(|p| p.availability_state);

        let index = match buckets.iter().position(|(name, _)| *name == namespace) {
            Some(index) => index,
            None => {
                buckets.push((namespace, ResourceHealthCounts::default()));
                buckets.len() - 1
            }
        };
        let counts = &mut buckets[index].1;
        // anything other than Available/Degraded (including Unknown) is an outage
        match state.as_deref() {
            Some("Available") => {
                counts.healthy += 1;
                totals.healthy += 1;
            }
            Some("Degraded") => {
                counts.degraded += 1;
                totals.degraded += 1;
            }
            _ => {
                counts.unavailable += 1;
                totals.unavailable += 1;
            }
        }
    }

    HealthSummary {
        service_health: buckets
            .into_iter()
            .map(|(service, counts)| ServiceHealthEntry {
                status: bucket_status(&counts),
                summary: format!(
                    "{} healthy, {} degraded, {} unavailable",
                    counts.healthy, counts.degraded, counts.unavailable
                ),
                service,
            })
            .collect(),
        resource_health: totals,
    }
}

pub fn bucket_status(counts: &ResourceHealthCounts) -> HealthStatus {
    if counts.unavailable > 0 {
        HealthStatus::Unavailable
    } else if counts.degraded > 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Segment right after the first `/providers/`, e.g. `Microsoft.Compute`.
fn provider_namespace(id: Option<&str>) -> String {
    id.and_then(|id| {
        let lowered = id.to_ascii_lowercase();
        let start = lowered.find("/providers/")? + "/providers/".len();
        id[start..].split('/').next().filter(|s| !s.is_empty())
    })
    .unwrap_or("Unknown")
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MapFetcher;
    use serde_json::json;

    fn status(namespace: &str, state: &str) -> serde_json::Value {
        json!({
            "id": format!("/subscriptions/s/resourceGroups/rg/providers/{namespace}/things/x/providers/Microsoft.ResourceHealth/availabilityStatuses/current"),
            "properties": { "availabilityState": state }
        })
    }

    #[tokio::test]
    async fn test_buckets_and_precedence() {
        let fetch = MapFetcher::new().with(
            "availabilityStatuses",
            json!({ "value": [
                status("Microsoft.Compute", "Available"),
                status("Microsoft.Sql", "Degraded"),
                status("Microsoft.Compute", "Degraded"),
                status("Microsoft.Compute", "Unavailable"),
                status("Microsoft.Web", "Available"),
                status("Microsoft.Sql", "Available"),
                { "properties": { "availabilityState": "Unknown" } }
            ]}),
        );

        let summary = collect(&fetch, "sub").await;
        let services: Vec<(&str, HealthStatus)> = summary
            .service_health
            .iter()
            .map(|s| (s.service.as_str(), s.status))
            .collect();
        assert_eq!(
            services,
            vec![
                ("Microsoft.Compute", HealthStatus::Unavailable),
                ("Microsoft.Sql", HealthStatus::Degraded),
                ("Microsoft.Web", HealthStatus::Healthy),
                ("Unknown", HealthStatus::Unavailable),
            ]
        );
        assert_eq!(summary.service_health[0].summary, "1 healthy, 1 degraded, 1 unavailable");
        assert_eq!(
            summary.resource_health,
            ResourceHealthCounts { healthy: 3, degraded: 2, unavailable: 2 }
        );
        assert_eq!(summary.resource_health.total(), 7);
    }

    #[tokio::test]
    async fn test_failure_and_empty_are_unobserved() {
        let failed = collect(&MapFetcher::new(), "sub").await;
        assert_eq!(failed.resource_health.total(), 0);
        assert!(failed.service_health.is_empty());

        let empty = MapFetcher::new().with("availabilityStatuses", json!({ "value": [] }));
        assert_eq!(collect(&empty, "sub").await.resource_health.total(), 0);
    }

    #[test]
    fn test_provider_namespace_is_case_insensitive_on_marker() {
        assert_eq!(provider_namespace(Some("/subscriptions/s/Providers/Microsoft.Web/sites/a")), "Microsoft.Web");
        assert_eq!(provider_namespace(Some("/subscriptions/s")), "Unknown");
        assert_eq!(provider_namespace(None), "Unknown");
    }
}
