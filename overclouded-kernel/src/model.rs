/**
 * DASHBOARD MODEL - Normalized view-model shared by every presentation layer
 *
 * ROLE :
 * One immutable snapshot per acquisition. UI views and the PDF export read it,
 * nobody writes to it after assembly.
 *
 * CONTRACT :
 * - every list is present (possibly empty), every number is finite (0 by default)
 * - serialized camelCase, the shape the renderers consume
 * - `#[serde(default)]` everywhere: a partial document (e.g. produced by an
 *   external demo generator) deserializes into a complete model
 */

use serde::{Deserialize, Serialize};

/// Root object handed to the UI and PDF collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardModel {
    pub subscription_id: String,
    pub is_live_data: bool,
    pub security: SecurityPosture,
    pub cost: CostSummary,
    pub governance: GovernancePosture,
    pub monitoring: MonitoringSnapshot,
    pub recommendations: RecommendationSet,
    pub events: Vec<ActivityLogEntry>,
    pub iam: Vec<IamRoleAssignment>,
    pub devops: DevOpsSummary,
    pub executive_summary: ExecutiveSummary,
    pub iam_extended: IamExtended,
}

// ── Shared enums ────────────────────────────────────────────────────────────

/// Used for alert severity, policy severity and recommendation impact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Exact provider spelling only; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

// ── Security ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityPosture {
    pub score: u32,
    pub active_threats: u64,
    pub compliance_score: u32,
    pub critical_vulnerabilities: u64,
    pub alerts: Vec<SecurityAlert>,
    pub regulatory_compliance: Vec<RegulatoryCompliance>,
    pub network_security: NetworkSecurity,
    pub encryption_status: EncryptionStatus,
    pub key_vault_health: KeyVaultHealth,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityAlert {
    pub id: String,
    pub severity: Severity,
    pub description: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegulatoryCompliance {
    pub framework: String,
    pub passed_controls: u64,
    pub failed_controls: u64,
    pub total_controls: u64,
}

/// Heuristic estimate, not a measurement (see `heuristics`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSecurity {
    pub open_rules: u64,
    pub public_endpoints: u64,
    pub unprotected_endpoints: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncryptionStatus {
    pub encrypted_count: u64,
    pub unencrypted_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyVaultHealth {
    pub total_secrets: u64,
    pub expiring_secrets: u64,
    pub total_certificates: u64,
    pub expiring_certificates: u64,
}

// ── Cost ────────────────────────────────────────────────────────────────────

/// Without a live cost source every value stays at zero / empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostSummary {
    pub current_month_cost: f64,
    pub forecasted_cost: f64,
    pub budget: f64,
    pub ri_coverage: f64,
    pub potential_savings: f64,
    pub month_over_month_change: f64,
    pub cost_trend: Vec<CostPoint>,
    pub cost_by_service: Vec<NamedValue>,
    pub cost_by_resource_group: Vec<NamedValue>,
    pub cost_by_region: Vec<NamedValue>,
    pub anomalies: Vec<CostAnomaly>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostKind {
    #[default]
    Actual,
    Forecast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostPoint {
    pub date: String,
    pub value: f64,
    pub kind: CostKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostAnomaly {
    pub date: String,
    pub expected_cost: f64,
    pub actual_cost: f64,
    pub service: String,
}

// ── Governance ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernancePosture {
    pub health_score: u32,
    pub policy_violations: u64,
    pub tagging_compliance: u32,
    pub naming_compliance: u32,
    pub zombie_asset_count: u64,
    pub policies: Vec<PolicyResult>,
    pub resources_by_type: Vec<TypeCount>,
    pub resources_by_region: Vec<RegionCount>,
    pub orphaned_resources: Vec<OrphanedResource>,
    pub quotas: Vec<QuotaUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    #[default]
    Passed,
    Failed,
    Warning,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyResult {
    pub id: String,
    pub name: String,
    pub status: PolicyStatus,
    pub severity: Severity,
    pub affected_resources: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub type_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionCount {
    pub region: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrphanedResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub estimated_monthly_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotaUsage {
    pub name: String,
    pub current_usage: u64,
    pub limit: u64,
}

// ── Monitoring ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringSnapshot {
    pub vm_count: u64,
    #[serde(rename = "storageUsedTB")]
    pub storage_used_tb: f64,
    pub active_users: u64,
    pub uptime: f64,
    pub cpu_history: Vec<TimePoint>,
    pub memory_history: Vec<TimePoint>,
    pub disk_iops_history: Vec<TimePoint>,
    pub service_health: Vec<ServiceHealthEntry>,
    pub resource_health: ResourceHealthCounts,
    pub backup_coverage: BackupCoverage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimePoint {
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceHealthEntry {
    pub service: String,
    pub status: HealthStatus,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceHealthCounts {
    pub healthy: u64,
    pub degraded: u64,
    pub unavailable: u64,
}

impl ResourceHealthCounts {
    pub fn total(&self) -> u64 {
        self.healthy + self.degraded + self.unavailable
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupCoverage {
    pub protected: u64,
    pub unprotected: u64,
}

// ── Recommendations ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationSet {
    pub monthly_savings: f64,
    pub efficiency_score: u32,
    pub items: Vec<Recommendation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Cost,
    Security,
    #[default]
    Performance,
    Reliability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub id: String,
    pub category: RecommendationCategory,
    pub impact: Severity,
    pub description: String,
    /// Estimated monthly savings, 0 when the advisor reports none.
    pub savings: f64,
}

// ── Activity / DevOps ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Succeeded,
    Failed,
    Started,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityLogEntry {
    pub id: String,
    pub timestamp: String,
    /// Humanized, e.g. "Write Virtual Machines".
    pub operation_name: String,
    pub status: OperationStatus,
    pub caller: String,
    pub resource_group: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    Succeeded,
    Failed,
    Running,
    Canceled,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentEntry {
    pub id: String,
    pub name: String,
    pub resource_group: String,
    pub status: DeploymentStatus,
    pub timestamp: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyChanges {
    pub date: String,
    pub changes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationFailures {
    pub operation: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DevOpsSummary {
    pub deployments: Vec<DeploymentEntry>,
    pub change_velocity: Vec<DailyChanges>,
    pub failed_operations_summary: Vec<OperationFailures>,
}

// ── IAM ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrincipalType {
    User,
    Group,
    ServicePrincipal,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IamRoleAssignment {
    pub id: String,
    pub principal_id: String,
    pub principal_name: String,
    pub principal_type: PrincipalType,
    pub role_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivilegedRoleCounts {
    pub owners: u64,
    pub contributors: u64,
    pub admins: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePrincipalSummary {
    pub name: String,
    pub role_name: String,
    pub credential_expiry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IamExtended {
    pub role_assignments: Vec<IamRoleAssignment>,
    pub privileged_role_counts: PrivilegedRoleCounts,
    pub service_principals: Vec<ServicePrincipalSummary>,
    pub guest_user_count: u64,
    pub stale_account_count: u64,
}

// ── Executive ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlaEntry {
    pub service: String,
    pub contractual_sla: f64,
    pub actual_uptime: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutiveSummary {
    pub subscription_name: String,
    pub total_resources: u64,
    pub sla_tracking: Vec<SlaEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_model_has_every_field() {
        let value = serde_json::to_value(DashboardModel::default()).unwrap();
        assert_eq!(value["security"]["networkSecurity"]["openRules"], 0);
        assert_eq!(value["monitoring"]["storageUsedTB"], 0.0);
        assert_eq!(value["governance"]["resourcesByType"], json!([]));
        assert_eq!(value["iamExtended"]["privilegedRoleCounts"]["admins"], 0);
        assert_eq!(value["isLiveData"], false);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let partial = json!({
            "subscriptionId": "sub-1",
            "security": { "score": 72, "alerts": [{ "id": "a1", "severity": "High" }] },
            "governance": { "resourcesByType": [{ "type": "disks", "count": 3 }] }
        });
        let model: DashboardModel = serde_json::from_value(partial).unwrap();
        assert_eq!(model.security.score, 72);
        assert_eq!(model.security.alerts[0].severity, Severity::High);
        assert_eq!(model.security.alerts[0].description, "");
        assert_eq!(model.governance.resources_by_type[0].type_name, "disks");
        assert!(model.events.is_empty());
        assert_eq!(model.cost, CostSummary::default());
    }

    #[test]
    fn test_severity_parse_is_exact() {
        assert_eq!(Severity::parse("High"), Some(Severity::High));
        assert_eq!(Severity::parse("high"), None);
        assert_eq!(Severity::parse("Informational"), None);
    }
}
