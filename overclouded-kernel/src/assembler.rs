/**
 * MODEL ASSEMBLER - Single entry point of an acquisition
 *
 * ROLE :
 * Validates the request, fans the collectors out, folds every result plus the
 * derived metrics into one DashboardModel.
 *
 * FLOW :
 *   ┌ inventory ─┬─ security (network / encryption need the inventory)
 *   │            └─ quotas   (primary region comes from the inventory)
 *   ├ recommendations
 *   ├ activity log
 *   ├ iam
 *   ├ deployments (resource groups, then one call per group)
 *   ├ resource health
 *   └ policy
 * All branches run concurrently and each resolves to a value (failures are
 * already defaults), so the join never short-circuits.
 *
 * FAILURE :
 * Only a blank credential or a malformed subscription id rejects the call,
 * before any request is issued. A model is either complete or not returned.
 */

use std::time::Instant;

use time::OffsetDateTime;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::collectors::activity::{self, ActivitySummary};
use crate::collectors::policy::{self, PolicySummary};
use crate::collectors::service_health::{self, HealthSummary};
use crate::collectors::{deployments, iam, quotas, recommendations, security};
use crate::derive;
use crate::error::AcquireError;
use crate::fetch::{ArmClient, Fetch, DEFAULT_MANAGEMENT_URL};
use crate::inventory::{self, InventoryStats, ResourceRecord};
use crate::model::{
    CostSummary, DashboardModel, DeploymentEntry, DevOpsSummary, ExecutiveSummary, GovernancePosture,
    IamExtended, MonitoringSnapshot, QuotaUsage, RecommendationSet, SecurityPosture,
};

/// Acquire a live model from the public management endpoint.
pub async fn acquire_dashboard_model(subscription_id: &str, credential: &str) -> Result<DashboardModel, AcquireError> {
    validate_credential(credential)?;
    let subscription_id = validate_subscription(subscription_id)?;
    let client = ArmClient::new(DEFAULT_MANAGEMENT_URL, credential)?;
    acquire_with(&client, &subscription_id).await
}

/// Acquire through any [`Fetch`] implementation, using the current clock.
pub async fn acquire_with<F: Fetch>(fetch: &F, subscription_id: &str) -> Result<DashboardModel, AcquireError> {
    assemble_at(fetch, subscription_id, OffsetDateTime::now_utc()).await
}

/// Blank or whitespace-only credentials cannot authenticate anything.
pub fn validate_credential(credential: &str) -> Result<(), AcquireError> {
    if credential.trim().is_empty() {
        return Err(AcquireError::MissingCredential);
    }
    Ok(())
}

/// Accepts hyphenated, simple or braced GUIDs; returns lowercase hyphenated.
pub fn validate_subscription(subscription_id: &str) -> Result<String, AcquireError> {
    let trimmed = subscription_id.trim();
    Uuid::parse_str(trimmed)
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| AcquireError::InvalidSubscription(subscription_id.to_string()))
}

/// Everything the collectors returned, before folding.
struct Collected {
    records: Vec<ResourceRecord>,
    stats: InventoryStats,
    security: SecurityPosture,
    quotas: Vec<QuotaUsage>,
    recommendations: RecommendationSet,
    activity: ActivitySummary,
    iam: IamExtended,
    deployments: Vec<DeploymentEntry>,
    health: HealthSummary,
    policy: PolicySummary,
}

/// Acquire with a fixed clock. `now` bounds the activity-log window, so
/// identical responses and an identical `now` give an identical model.
pub async fn assemble_at<F: Fetch>(
    fetch: &F,
    subscription_id: &str,
    now: OffsetDateTime,
) -> Result<DashboardModel, AcquireError> {
    let subscription_id = validate_subscription(subscription_id)?;
    let scan_id = Uuid::new_v4();
    let span = info_span!("acquisition", %scan_id, subscription = %subscription_id);

    async move {
        let started = Instant::now();
        info!("acquisition started");

        let sub = subscription_id.as_str();
        let inventory_branch = async {
            let records = inventory::collect(fetch, sub).await;
            let stats = InventoryStats::from_records(&records);
            let (security, quotas) = tokio::join!(
                security::collect(fetch, sub, &records),
                quotas::collect(fetch, sub, stats.primary_region()),
            );
            (records, stats, security, quotas)
        };

        let ((records, stats, security, quotas), recommendations, activity, iam, deployments, health, policy) = tokio::join!(
            inventory_branch,
            recommendations::collect(fetch, sub),
            activity::collect(fetch, sub, now),
            iam::collect(fetch, sub),
            deployments::collect(fetch, sub),
            service_health::collect(fetch, sub),
            policy::collect(fetch, sub),
        );

        let model = fold(
            subscription_id.clone(),
            Collected {
                records,
                stats,
                security,
                quotas,
                recommendations,
                activity,
                iam,
                deployments,
                health,
                policy,
            },
        );

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            resources = model.executive_summary.total_resources,
            events = model.events.len(),
            recommendations = model.recommendations.items.len(),
            "acquisition finished"
        );
        Ok(model)
    }
    .instrument(span)
    .await
}

fn fold(subscription_id: String, c: Collected) -> DashboardModel {
    let tagging = derive::tagging_compliance(&c.records);
    let naming = derive::naming_compliance(&c.records);
    let (orphaned_resources, zombie_count) = derive::orphaned_resources(&c.records);
    let resource_health = c.health.resource_health;

    let governance = GovernancePosture {
        health_score: derive::governance_health_score(tagging, naming, zombie_count),
        policy_violations: c.policy.violations,
        tagging_compliance: tagging,
        naming_compliance: naming,
        zombie_asset_count: zombie_count,
        policies: c.policy.policies,
        resources_by_type: c.stats.by_type,
        resources_by_region: c.stats.by_region,
        orphaned_resources,
        quotas: c.quotas,
    };

    let monitoring = MonitoringSnapshot {
        vm_count: c.stats.vm_count,
        storage_used_tb: derive::storage_used_tb(c.stats.storage_accounts),
        active_users: 0,
        uptime: derive::uptime(&resource_health),
        service_health: c.health.service_health,
        backup_coverage: derive::backup_coverage(c.stats.total),
        resource_health: resource_health.clone(),
        ..Default::default()
    };

    let cost = CostSummary {
        potential_savings: c.recommendations.monthly_savings,
        ..Default::default()
    };

    let executive_summary = ExecutiveSummary {
        subscription_name: subscription_id.clone(),
        total_resources: c.stats.total,
        sla_tracking: derive::sla_tracking(&resource_health),
    };

    DashboardModel {
        subscription_id,
        is_live_data: true,
        security: c.security,
        cost,
        governance,
        monitoring,
        recommendations: c.recommendations,
        events: c.activity.events,
        iam: c.iam.role_assignments.clone(),
        devops: DevOpsSummary {
            deployments: c.deployments,
            change_velocity: c.activity.change_velocity,
            failed_operations_summary: c.activity.failed_operations_summary,
        },
        executive_summary,
        iam_extended: c.iam,
    }
}
