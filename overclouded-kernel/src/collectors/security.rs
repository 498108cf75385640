//! Security posture: secure score, alerts, regulatory compliance, plus the
//! inventory-based network and encryption heuristics.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{as_count, list_items, subscription_path};
use crate::derive;
use crate::fetch::Fetch;
use crate::inventory::ResourceRecord;
use crate::model::{RegulatoryCompliance, SecurityAlert, SecurityPosture, Severity};

const MAX_ALERTS: usize = 10;
const MAX_FRAMEWORKS: usize = 6;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAlert {
    name: Option<String>,
    properties: Option<RawAlertProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAlertProperties {
    status: Option<String>,
    severity: Option<String>,
    alert_display_name: Option<String>,
    #[serde(alias = "timeGenerated")]
    time_generated_utc: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStandard {
    name: Option<String>,
    properties: Option<RawStandardProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawStandardProperties {
    passed_controls: Option<f64>,
    failed_controls: Option<f64>,
    skipped_controls: Option<f64>,
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str, inventory: &[ResourceRecord]) -> SecurityPosture {
    let score_path = subscription_path(
        subscription_id,
        "providers/Microsoft.Security/secureScores?api-version=2020-01-01",
    );
    let alerts_path = subscription_path(
        subscription_id,
        "providers/Microsoft.Security/alerts?api-version=2022-01-01",
    );
    let regulatory_path = subscription_path(
        subscription_id,
        "providers/Microsoft.Security/regulatoryComplianceStandards?api-version=2019-01-01-preview",
    );

    let (score_json, alerts_json, regulatory_json) = tokio::join!(
        fetch.get_json(&score_path),
        fetch.get_json(&alerts_path),
        fetch.get_json(&regulatory_path),
    );

    let mut posture = SecurityPosture {
        network_security: derive::network_exposure(inventory),
        encryption_status: derive::encryption_status(inventory),
        ..Default::default()
    };

    match score_json {
        Some(json) => posture.score = secure_score(&json),
        None => warn!("secure score unavailable, defaulting to 0"),
    }

    match alerts_json {
        Some(json) => {
            let raw: Vec<RawAlert> = list_items(&json);
            posture.active_threats = raw
                .iter()
                .filter(|a| props(a).is_some_and(|p| p.status.as_deref() == Some("Active")))
                .count() as u64;
            posture.critical_vulnerabilities = raw
                .iter()
                .filter(|a| props(a).is_some_and(|p| p.severity.as_deref() == Some("High")))
                .count() as u64;
            posture.alerts = raw.iter().take(MAX_ALERTS).map(to_alert).collect();
        }
        None => warn!("security alerts unavailable, defaulting to none"),
    }

    match regulatory_json {
        Some(json) => {
            let standards: Vec<RawStandard> = list_items(&json);
            posture.regulatory_compliance = standards.iter().take(MAX_FRAMEWORKS).map(to_framework).collect();
            posture.compliance_score = compliance_score(&posture.regulatory_compliance);
        }
        None => warn!("regulatory compliance unavailable, defaulting to none"),
    }

    posture
}

/// `percentage` is a 0..1 fraction.
fn secure_score(json: &Value) -> u32 {
    json.pointer("/value/0/properties/score/percentage")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite())
        .map(|p| (p * 100.0).round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0)
}

fn props(alert: &RawAlert) -> Option<&RawAlertProperties> {
    alert.properties.as_ref()
}

fn to_alert(alert: &RawAlert) -> SecurityAlert {
    let p = props(alert);
    let severity = match p.and_then(|p| p.severity.as_deref()) {
        Some("Informational") => Severity::Low,
        Some(raw) => Severity::parse(raw).unwrap_or_default(),
        None => Severity::Medium,
    };
    SecurityAlert {
        id: alert.name.clone().unwrap_or_default(),
        severity,
        description: p
            .and_then(|p| p.alert_display_name.clone())
            .unwrap_or_else(|| "Alert".to_string()),
        time: p.and_then(|p| p.time_generated_utc.clone()).unwrap_or_default(),
    }
}

fn to_framework(standard: &RawStandard) -> RegulatoryCompliance {
    let p = standard.properties.as_ref();
    let passed = as_count(p.and_then(|p| p.passed_controls));
    let failed = as_count(p.and_then(|p| p.failed_controls));
    let skipped = as_count(p.and_then(|p| p.skipped_controls));
    RegulatoryCompliance {
        framework: standard.name.clone().unwrap_or_else(|| "Unknown".to_string()),
        passed_controls: passed,
        failed_controls: failed,
        total_controls: passed + failed + skipped,
    }
}

/// Mean of per-framework pass rates; a framework with no controls counts as 0%.
pub fn compliance_score(frameworks: &[RegulatoryCompliance]) -> u32 {
    if frameworks.is_empty() {
        return 0;
    }
    let sum: f64 = frameworks
        .iter()
        .map(|f| {
            if f.total_controls > 0 {
                f.passed_controls as f64 / f.total_controls as f64 * 100.0
            } else {
                0.0
            }
        })
        .sum();
    (sum / frameworks.len() as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MapFetcher;
    use serde_json::json;

    fn resource(resource_type: &str) -> ResourceRecord {
        ResourceRecord {
            name: "r".into(),
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_posture() {
        let alerts: Vec<Value> = (0..12)
            .map(|i| {
                json!({ "name": format!("a{i}"), "properties": {
                    "status": if i % 2 == 0 { "Active" } else { "Resolved" },
                    "severity": if i < 3 { "High" } else { "Low" },
                    "alertDisplayName": format!("Alert {i}"),
                    "timeGeneratedUtc": "2026-02-01T10:00:00Z"
                }})
            })
            .collect();
        let fetch = MapFetcher::new()
            .with("Microsoft.Security/secureScores", json!({ "value": [{ "properties": { "score": { "percentage": 0.724 } } }] }))
            .with("Microsoft.Security/alerts", json!({ "value": alerts }))
            .with(
                "Microsoft.Security/regulatoryComplianceStandards",
                json!({ "value": [
                    { "name": "CIS", "properties": { "passedControls": 40, "failedControls": 10, "skippedControls": 0 } },
                    { "name": "PCI", "properties": { "passedControls": 30, "failedControls": 60, "skippedControls": 10 } }
                ]}),
            );
        let inventory = vec![
            resource("Microsoft.Network/networkSecurityGroups"),
            resource("Microsoft.Network/publicIPAddresses"),
            resource("Microsoft.Storage/storageAccounts"),
        ];

        let posture = collect(&fetch, "sub", &inventory).await;
        assert_eq!(posture.score, 72);
        assert_eq!(posture.active_threats, 6);
        assert_eq!(posture.critical_vulnerabilities, 3);
        assert_eq!(posture.alerts.len(), 10);
        assert_eq!(posture.alerts[0].severity, Severity::High);
        assert_eq!(posture.alerts[0].description, "Alert 0");
        assert_eq!(posture.regulatory_compliance[1].total_controls, 100);
        // (80 + 30) / 2
        assert_eq!(posture.compliance_score, 55);
        assert_eq!(posture.network_security.open_rules, 3);
        assert_eq!(posture.encryption_status.encrypted_count, 1);
    }

    #[tokio::test]
    async fn test_all_calls_failing_keeps_heuristics_only() {
        let fetch = MapFetcher::new();
        let posture = collect(&fetch, "sub", &[]).await;
        assert_eq!(posture, SecurityPosture::default());
        assert_eq!(fetch.calls().len(), 3);
    }

    #[test]
    fn test_alert_defaults() {
        let alert = to_alert(&RawAlert {
            name: Some("x".into()),
            properties: Some(RawAlertProperties {
                severity: Some("Informational".into()),
                ..Default::default()
            }),
        });
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.description, "Alert");
        assert_eq!(alert.time, "");

        let bare = to_alert(&RawAlert::default());
        assert_eq!(bare.severity, Severity::Medium);
    }

    #[test]
    fn test_compliance_score_handles_empty_frameworks() {
        assert_eq!(compliance_score(&[]), 0);
        let frameworks = vec![RegulatoryCompliance {
            framework: "ISO".into(),
            ..Default::default()
        }];
        assert_eq!(compliance_score(&frameworks), 0);
    }
}
