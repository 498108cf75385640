/**
 * DERIVATION - Pure metrics over already-collected data
 *
 * ROLE :
 * Governance percentages, orphan detection, and the monitoring / security
 * approximations computed from the inventory. No I/O, no clock: identical
 * inputs always give identical outputs.
 *
 * Every calibration number lives in `heuristics`.
 */

use crate::heuristics::{
    orphan_rule_for, ASSUMED_PROTECTED_PUBLIC_IPS, BACKUP_PROTECTED_RATIO, NAMING_WEIGHT, NSG_RULES_PER_GROUP,
    ORPHAN_PENALTY_PER_ASSET, ORPHAN_WEIGHT, SLA_TARGETS, STORAGE_TB_PER_ACCOUNT, TAGGING_WEIGHT,
    UPTIME_ALL_AVAILABLE, UPTIME_WITH_OUTAGE,
};
use crate::inventory::{count_of_type, ResourceRecord, NSG_TYPE, PUBLIC_IP_TYPE, STORAGE_ACCOUNT_TYPE};
use crate::model::{
    BackupCoverage, EncryptionStatus, NetworkSecurity, OrphanedResource, ResourceHealthCounts, SlaEntry,
};

const MAX_ORPHANS_LISTED: usize = 20;

/// Rounded percentage, 0 when `total` is 0.
pub fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

pub fn tagging_compliance(records: &[ResourceRecord]) -> u32 {
    let tagged = records.iter().filter(|r| r.is_tagged()).count() as u64;
    percent(tagged, records.len() as u64)
}

pub fn naming_compliance(records: &[ResourceRecord]) -> u32 {
    let compliant = records.iter().filter(|r| is_compliant_name(&r.name)).count() as u64;
    percent(compliant, records.len() as u64)
}

/// Lowercase ASCII alphanumerics separated by single hyphens:
/// `web-app-01` passes, `WebApp_02`, `-edge`, `a--b` do not.
pub fn is_compliant_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

/// Flagged resources (first 20, labelled) and the total flagged count.
pub fn orphaned_resources(records: &[ResourceRecord]) -> (Vec<OrphanedResource>, u64) {
    let mut listed = Vec::new();
    let mut total = 0u64;
    for record in records {
        let Some(rule) = orphan_rule_for(&record.resource_type) else {
            continue;
        };
        total += 1;
        if listed.len() < MAX_ORPHANS_LISTED {
            listed.push(OrphanedResource {
                id: record.id.clone(),
                name: record.name.clone(),
                resource_type: rule.label.to_string(),
                estimated_monthly_cost: rule.monthly_cost,
            });
        }
    }
    (listed, total)
}

pub fn governance_health_score(tagging: u32, naming: u32, orphan_count: u64) -> u32 {
    let penalty = orphan_count.saturating_mul(ORPHAN_PENALTY_PER_ASSET).min(100);
    let orphan_component = (100 - penalty) as f64;
    let score = TAGGING_WEIGHT * tagging as f64 + NAMING_WEIGHT * naming as f64 + ORPHAN_WEIGHT * orphan_component;
    score.round().clamp(0.0, 100.0) as u32
}

pub fn network_exposure(records: &[ResourceRecord]) -> NetworkSecurity {
    let public_endpoints = count_of_type(records, PUBLIC_IP_TYPE);
    NetworkSecurity {
        open_rules: count_of_type(records, NSG_TYPE) * NSG_RULES_PER_GROUP,
        public_endpoints,
        unprotected_endpoints: public_endpoints.saturating_sub(ASSUMED_PROTECTED_PUBLIC_IPS),
    }
}

/// Storage accounts are encrypted at rest by the provider; nothing is
/// verified per resource.
pub fn encryption_status(records: &[ResourceRecord]) -> EncryptionStatus {
    EncryptionStatus {
        encrypted_count: count_of_type(records, STORAGE_ACCOUNT_TYPE),
        unencrypted_count: 0,
    }
}

pub fn storage_used_tb(storage_accounts: u64) -> f64 {
    storage_accounts as f64 * STORAGE_TB_PER_ACCOUNT
}

pub fn backup_coverage(total_resources: u64) -> BackupCoverage {
    let protected = (total_resources as f64 * BACKUP_PROTECTED_RATIO).floor() as u64;
    BackupCoverage {
        protected,
        unprotected: total_resources - protected,
    }
}

/// 0 when no availability record was observed.
pub fn uptime(health: &ResourceHealthCounts) -> f64 {
    if health.total() == 0 {
        0.0
    } else if health.unavailable == 0 {
        UPTIME_ALL_AVAILABLE
    } else {
        UPTIME_WITH_OUTAGE
    }
}

/// One entry per contractual target, only once health has been observed.
pub fn sla_tracking(health: &ResourceHealthCounts) -> Vec<SlaEntry> {
    if health.total() == 0 {
        return Vec::new();
    }
    let actual = uptime(health);
    SLA_TARGETS
        .iter()
        .map(|(service, target)| SlaEntry {
            service: service.to_string(),
            contractual_sla: *target,
            actual_uptime: actual,
        })
        .collect()
}
