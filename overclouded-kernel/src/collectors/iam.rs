//! Role assignments joined against role definitions.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::{list_items, subscription_path};
use crate::fetch::Fetch;
use crate::model::{IamExtended, IamRoleAssignment, PrincipalType, PrivilegedRoleCounts, ServicePrincipalSummary};

const MAX_SERVICE_PRINCIPALS: usize = 10;
const UNRESOLVED_ROLE: &str = "Custom Role";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAssignment {
    id: Option<String>,
    properties: Option<RawAssignmentProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAssignmentProperties {
    role_definition_id: Option<String>,
    principal_id: Option<String>,
    principal_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefinition {
    id: Option<String>,
    name: Option<String>,
    properties: Option<RawDefinitionProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDefinitionProperties {
    role_name: Option<String>,
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str) -> IamExtended {
    let assignments_path = subscription_path(
        subscription_id,
        "providers/Microsoft.Authorization/roleAssignments?api-version=2022-04-01",
    );
    let definitions_path = subscription_path(
        subscription_id,
        "providers/Microsoft.Authorization/roleDefinitions?api-version=2022-04-01",
    );
    let (assignments_json, definitions_json) =
        tokio::join!(fetch.get_json(&assignments_path), fetch.get_json(&definitions_path));

    let Some(assignments_json) = assignments_json else {
        warn!("role assignments unavailable, defaulting to none");
        return IamExtended::default();
    };

    let role_names = match definitions_json {
        Some(json) => definition_index(list_items(&json)),
        None => {
            warn!("role definitions unavailable, assignments fall back to '{UNRESOLVED_ROLE}'");
            HashMap::new()
        }
    };

    let role_assignments: Vec<IamRoleAssignment> = list_items::<RawAssignment>(&assignments_json)
        .into_iter()
        .map(|raw| to_assignment(raw, &role_names))
        .collect();

    IamExtended {
        privileged_role_counts: privileged_counts(&role_assignments),
        service_principals: service_principals(&role_assignments),
        guest_user_count: 0,
        stale_account_count: 0,
        role_assignments,
    }
}

/// Definitions keyed by lowercase GUID (the trailing segment of their id).
fn definition_index(definitions: Vec<RawDefinition>) -> HashMap<String, String> {
    definitions
        .into_iter()
        .filter_map(|def| {
            let key = def
                .id
                .as_deref()
                .map(definition_key)
                .or_else(|| def.name.as_deref().map(str::to_ascii_lowercase))?;
            let role_name = def.properties?.role_name?;
            Some((key, role_name))
        })
        .collect()
}

// Assignments reference definitions either subscription-scoped or tenant-scoped;
// the trailing GUID is shared by both forms.
fn definition_key(id: &str) -> String {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id).to_ascii_lowercase()
}

fn to_assignment(raw: RawAssignment, role_names: &HashMap<String, String>) -> IamRoleAssignment {
    let props = raw.properties.unwrap_or_default();
    let role_name = props
        .role_definition_id
        .as_deref()
        .and_then(|id| role_names.get(&definition_key(id)))
        .cloned()
        .unwrap_or_else(|| UNRESOLVED_ROLE.to_string());
    let principal_id = props.principal_id.unwrap_or_default();
    IamRoleAssignment {
        id: raw.id.unwrap_or_default(),
        principal_name: principal_id.clone(),
        principal_id,
        principal_type: match props.principal_type.as_deref() {
            Some("User") => PrincipalType::User,
            Some("Group") => PrincipalType::Group,
            Some("ServicePrincipal") => PrincipalType::ServicePrincipal,
            _ => PrincipalType::Unknown,
        },
        role_name,
    }
}

pub fn privileged_counts(assignments: &[IamRoleAssignment]) -> PrivilegedRoleCounts {
    PrivilegedRoleCounts {
        owners: assignments.iter().filter(|a| a.role_name == "Owner").count() as u64,
        contributors: assignments.iter().filter(|a| a.role_name == "Contributor").count() as u64,
        admins: assignments
            .iter()
            .filter(|a| a.role_name.to_lowercase().contains("admin"))
            .count() as u64,
    }
}

fn service_principals(assignments: &[IamRoleAssignment]) -> Vec<ServicePrincipalSummary> {
    assignments
        .iter()
        .filter(|a| a.principal_type == PrincipalType::ServicePrincipal)
        .take(MAX_SERVICE_PRINCIPALS)
        .map(|a| ServicePrincipalSummary {
            name: a.principal_name.clone(),
            role_name: a.role_name.clone(),
            credential_expiry: "Unknown".to_string(),
        })
        .collect()
}
