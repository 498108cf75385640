//! Heuristic constants.
//!
//! These numbers are approximations standing in for measurements the
//! management API does not provide. They are calibration knobs: change them
//! here, never inline in collector or derivation code.

/// Inbound rules assumed exposed per network security group.
pub const NSG_RULES_PER_GROUP: u64 = 3;

/// The first N public IPs are assumed to sit behind a firewall / gateway.
pub const ASSUMED_PROTECTED_PUBLIC_IPS: u64 = 3;

// Governance health score weights (sum to 1.0).
pub const TAGGING_WEIGHT: f64 = 0.4;
pub const NAMING_WEIGHT: f64 = 0.3;
pub const ORPHAN_WEIGHT: f64 = 0.3;

/// Score points lost per orphaned asset, capped at 100.
pub const ORPHAN_PENALTY_PER_ASSET: u64 = 5;

/// Efficiency points lost per open advisor recommendation.
pub const EFFICIENCY_DECAY_PER_ITEM: u32 = 3;

pub const STORAGE_TB_PER_ACCOUNT: f64 = 0.5;

/// Share of the inventory assumed covered by backup.
pub const BACKUP_PROTECTED_RATIO: f64 = 0.6;

pub const UPTIME_ALL_AVAILABLE: f64 = 99.9;
pub const UPTIME_WITH_OUTAGE: f64 = 95.0;

/// A resource type that is flagged as orphaned whenever it appears.
#[derive(Debug, Clone, Copy)]
pub struct OrphanRule {
    /// Lowercase ARM type.
    pub resource_type: &'static str,
    pub label: &'static str,
    pub monthly_cost: f64,
}

pub const ORPHAN_RULES: &[OrphanRule] = &[
    OrphanRule {
        resource_type: "microsoft.compute/disks",
        label: "Unattached Disk",
        monthly_cost: 20.0,
    },
    OrphanRule {
        resource_type: "microsoft.network/publicipaddresses",
        label: "Unused Public IP",
        monthly_cost: 5.0,
    },
    OrphanRule {
        resource_type: "microsoft.network/networkinterfaces",
        label: "Empty NIC",
        monthly_cost: 5.0,
    },
];

/// Contractual SLA targets tracked in the executive summary.
pub const SLA_TARGETS: &[(&str, f64)] = &[
    ("Virtual Machines", 99.95),
    ("Storage", 99.9),
    ("SQL Database", 99.99),
];

pub fn orphan_rule_for(resource_type: &str) -> Option<&'static OrphanRule> {
    let lowered = resource_type.to_ascii_lowercase();
    ORPHAN_RULES.iter().find(|rule| rule.resource_type == lowered)
}
