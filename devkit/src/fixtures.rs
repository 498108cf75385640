/*!
Builders for management API payloads

Produces the JSON envelopes the collectors read, with only the fields they
consume. Route suffixes match the paths the kernel requests, for use with
[`crate::StubFetcher::respond`].
*/

use serde_json::{json, Value};

pub mod routes {
    pub const RESOURCES: &str = "/resources";
    pub const SECURE_SCORES: &str = "Microsoft.Security/secureScores";
    pub const ALERTS: &str = "Microsoft.Security/alerts";
    pub const REGULATORY: &str = "Microsoft.Security/regulatoryComplianceStandards";
    pub const ADVISOR: &str = "Microsoft.Advisor/recommendations";
    pub const ACTIVITY: &str = "eventtypes/management/values";
    pub const ROLE_ASSIGNMENTS: &str = "Microsoft.Authorization/roleAssignments";
    pub const ROLE_DEFINITIONS: &str = "Microsoft.Authorization/roleDefinitions";
    pub const RESOURCE_GROUPS: &str = "/resourcegroups";
    pub const DEPLOYMENTS: &str = "Microsoft.Resources/deployments";
    pub const AVAILABILITY: &str = "Microsoft.ResourceHealth/availabilityStatuses";
    pub const POLICY_SUMMARY: &str = "policyStates/latest/summarize";
    pub const USAGES: &str = "/usages";

    /// Suffix of one resource group's deployment listing.
    pub fn deployments_of(resource_group: &str) -> String {
        format!("/resourcegroups/{resource_group}/providers/{DEPLOYMENTS}")
    }

    /// Every route the kernel requests from a single subscription.
    pub const ALL: &[&str] = &[
        RESOURCES,
        SECURE_SCORES,
        ALERTS,
        REGULATORY,
        ADVISOR,
        ACTIVITY,
        ROLE_ASSIGNMENTS,
        ROLE_DEFINITIONS,
        RESOURCE_GROUPS,
        DEPLOYMENTS,
        AVAILABILITY,
        POLICY_SUMMARY,
        USAGES,
    ];
}

/// `{"value": [...]}`
pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
    json!({ "value": items.into_iter().collect::<Vec<_>>() })
}

pub struct ArmFixture;

impl ArmFixture {
    pub fn resource(name: &str, resource_type: &str, location: &str) -> Value {
        json!({
            "id": format!("/subscriptions/fixture/resourceGroups/rg/providers/{resource_type}/{name}"),
            "name": name,
            "type": resource_type,
            "location": location,
        })
    }

    pub fn tagged_resource(name: &str, resource_type: &str, location: &str) -> Value {
        let mut resource = Self::resource(name, resource_type, location);
        resource["tags"] = json!({ "env": "prod", "owner": "platform" });
        resource
    }

    pub fn secure_score(fraction: f64) -> Value {
        list([json!({ "name": "ascScore", "properties": { "score": { "percentage": fraction } } })])
    }

    pub fn alert(name: &str, severity: &str, status: &str, generated: &str) -> Value {
        json!({
            "name": name,
            "properties": {
                "alertDisplayName": format!("{name} detected"),
                "severity": severity,
                "status": status,
                "timeGeneratedUtc": generated,
            }
        })
    }

    pub fn compliance_standard(name: &str, passed: u64, failed: u64, skipped: u64) -> Value {
        json!({
            "name": name,
            "properties": { "passedControls": passed, "failedControls": failed, "skippedControls": skipped }
        })
    }

    /// Advisor item; `savings` lands in `extendedProperties.savingsAmount`.
    pub fn advisor_item(name: &str, category: &str, impact: &str, savings: Option<f64>) -> Value {
        let mut item = json!({
            "name": name,
            "properties": {
                "category": category,
                "impact": impact,
                "shortDescription": { "problem": format!("{name} problem"), "solution": format!("{name} solution") },
            }
        });
        if let Some(amount) = savings {
            item["properties"]["extendedProperties"] = json!({ "savingsAmount": amount.to_string() });
        }
        item
    }

    pub fn activity_event(id: &str, timestamp: &str, operation: &str, status: &str) -> Value {
        json!({
            "id": id,
            "eventTimestamp": timestamp,
            "operationName": { "value": operation, "localizedValue": operation },
            "status": { "value": status },
            "caller": "ops@example.com",
            "resourceGroupName": "rg-app",
        })
    }

    pub fn resource_group(name: &str) -> Value {
        json!({ "name": name, "location": "eastus" })
    }

    pub fn deployment(name: &str, state: &str, timestamp: &str) -> Value {
        json!({
            "id": format!("/deployments/{name}"),
            "name": name,
            "properties": { "provisioningState": state, "timestamp": timestamp, "duration": "PT1M12S" }
        })
    }

    pub fn role_assignment(id: &str, role_guid: &str, principal_type: &str) -> Value {
        json!({
            "id": format!("/subscriptions/fixture/providers/Microsoft.Authorization/roleAssignments/{id}"),
            "properties": {
                "roleDefinitionId": format!("/subscriptions/fixture/providers/Microsoft.Authorization/roleDefinitions/{role_guid}"),
                "principalId": format!("principal-{id}"),
                "principalType": principal_type,
            }
        })
    }

    pub fn role_definition(role_guid: &str, role_name: &str) -> Value {
        json!({
            "id": format!("/providers/Microsoft.Authorization/roleDefinitions/{role_guid}"),
            "name": role_guid,
            "properties": { "roleName": role_name }
        })
    }

    pub fn availability(namespace: &str, name: &str, state: &str) -> Value {
        json!({
            "id": format!("/subscriptions/fixture/resourceGroups/rg/providers/{namespace}/{name}/providers/Microsoft.ResourceHealth/availabilityStatuses/current"),
            "properties": { "availabilityState": state }
        })
    }

    /// Single-summary policy payload; `per_assignment` is `(assignment id, non-compliant)`.
    pub fn policy_summary(non_compliant: u64, per_assignment: &[(&str, u64)]) -> Value {
        let assignments: Vec<Value> = per_assignment
            .iter()
            .map(|(id, count)| {
                json!({
                    "policyAssignmentId": format!("/providers/Microsoft.Authorization/policyAssignments/{id}"),
                    "results": { "nonCompliantResources": count }
                })
            })
            .collect();
        list([json!({
            "results": { "nonCompliantResources": non_compliant },
            "policyAssignments": assignments,
        })])
    }

    pub fn usage(localized: &str, current: u64, limit: u64) -> Value {
        json!({
            "name": { "value": localized.replace(' ', ""), "localizedValue": localized },
            "currentValue": current,
            "limit": limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisor_item_savings_is_optional() {
        let with = ArmFixture::advisor_item("r1", "Cost", "High", Some(500.0));
        assert_eq!(with["properties"]["extendedProperties"]["savingsAmount"], "500");
        let without = ArmFixture::advisor_item("r2", "Cost", "High", None);
        assert!(without["properties"].get("extendedProperties").is_none());
    }

    #[test]
    fn test_deployment_route_is_a_deployment_suffix() {
        let route = routes::deployments_of("rg-app");
        assert!(route.ends_with(routes::DEPLOYMENTS));
        assert!(route.starts_with(routes::RESOURCE_GROUPS));
    }
}
