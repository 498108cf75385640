//! Policy compliance summary.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{as_count, lenient_number, subscription_path};
use crate::fetch::Fetch;
use crate::model::{PolicyResult, PolicyStatus, Severity};

const MAX_POLICIES: usize = 15;
/// Assignments with more non-compliant resources than this are High severity.
const HIGH_SEVERITY_THRESHOLD: u64 = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAssignmentSummary {
    policy_assignment_id: Option<String>,
    results: Option<RawResults>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawResults {
    non_compliant_resources: Option<f64>,
}

fn non_compliant(results: Option<&RawResults>) -> u64 {
    as_count(results.and_then(|r| r.non_compliant_resources))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySummary {
    pub violations: u64,
    pub policies: Vec<PolicyResult>,
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str) -> PolicySummary {
    let path = subscription_path(
        subscription_id,
        "providers/Microsoft.PolicyInsights/policyStates/latest/summarize?api-version=2019-10-01",
    );
    let Some(json) = fetch.get_json(&path).await else {
        warn!("policy state summary unavailable, defaulting to no violations");
        return PolicySummary::default();
    };
    let Some(summary) = json.pointer("/value/0") else {
        return PolicySummary::default();
    };

    // total and assignments decode independently of each other
    let violations = as_count(lenient_number(summary.pointer("/results/nonCompliantResources")));
    let assignments: Vec<RawAssignmentSummary> = summary
        .get("policyAssignments")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match RawAssignmentSummary::deserialize(item) {
                    Ok(assignment) => Some(assignment),
                    Err(e) => {
                        debug!(error = %e, "skipping undecodable policy assignment");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    PolicySummary {
        violations,
        policies: assignments
            .iter()
            .take(MAX_POLICIES)
            .enumerate()
            .map(|(idx, assignment)| to_policy(idx, assignment))
            .collect(),
    }
}

fn to_policy(idx: usize, assignment: &RawAssignmentSummary) -> PolicyResult {
    let affected = non_compliant(assignment.results.as_ref());
    PolicyResult {
        id: format!("p-{idx}"),
        name: assignment
            .policy_assignment_id
            .as_deref()
            .and_then(|id| id.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("Policy")
            .to_string(),
        status: if affected > 0 { PolicyStatus::Failed } else { PolicyStatus::Passed },
        severity: if affected > HIGH_SEVERITY_THRESHOLD { Severity::High } else { Severity::Medium },
        affected_resources: affected,
    }
}
