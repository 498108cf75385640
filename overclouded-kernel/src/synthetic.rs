//! Demo model served when no credential is available.
//!
//! Static and deterministic: the same subscription id always gives the same
//! model. Only `subscription_id` varies; `is_live_data` is always false.

use crate::derive;
use crate::model::*;

const DEMO_TAGGING: u32 = 65;
const DEMO_NAMING: u32 = 72;
const DEMO_ZOMBIES: u64 = 8;

fn named(name: &str, value: f64) -> NamedValue {
    NamedValue {
        name: name.to_string(),
        value,
    }
}

fn point(time: &str, value: f64) -> TimePoint {
    TimePoint {
        time: time.to_string(),
        value,
    }
}

fn series(values: [f64; 6]) -> Vec<TimePoint> {
    ["00:00", "04:00", "08:00", "12:00", "16:00", "20:00"]
        .iter()
        .zip(values)
        .map(|(time, value)| point(time, value))
        .collect()
}

fn alert(id: &str, severity: Severity, description: &str, time: &str) -> SecurityAlert {
    SecurityAlert {
        id: id.to_string(),
        severity,
        description: description.to_string(),
        time: time.to_string(),
    }
}

fn framework(name: &str, passed: u64, failed: u64) -> RegulatoryCompliance {
    RegulatoryCompliance {
        framework: name.to_string(),
        passed_controls: passed,
        failed_controls: failed,
        total_controls: passed + failed,
    }
}

fn policy(id: &str, name: &str, status: PolicyStatus, severity: Severity, affected: u64) -> PolicyResult {
    PolicyResult {
        id: id.to_string(),
        name: name.to_string(),
        status,
        severity,
        affected_resources: affected,
    }
}

fn orphan(id: &str, name: &str, label: &str, cost: f64) -> OrphanedResource {
    OrphanedResource {
        id: id.to_string(),
        name: name.to_string(),
        resource_type: label.to_string(),
        estimated_monthly_cost: cost,
    }
}

fn quota(name: &str, current: u64, limit: u64) -> QuotaUsage {
    QuotaUsage {
        name: name.to_string(),
        current_usage: current,
        limit,
    }
}

fn recommendation(
    id: &str,
    category: RecommendationCategory,
    impact: Severity,
    description: &str,
    savings: f64,
) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        category,
        impact,
        description: description.to_string(),
        savings,
    }
}

fn event(id: &str, ts: &str, op: &str, status: OperationStatus, caller: &str, rg: &str, description: &str) -> ActivityLogEntry {
    ActivityLogEntry {
        id: id.to_string(),
        timestamp: ts.to_string(),
        operation_name: op.to_string(),
        status,
        caller: caller.to_string(),
        resource_group: rg.to_string(),
        description: description.to_string(),
    }
}

fn assignment(id: &str, principal: &str, name: &str, kind: PrincipalType, role: &str) -> IamRoleAssignment {
    IamRoleAssignment {
        id: id.to_string(),
        principal_id: principal.to_string(),
        principal_name: name.to_string(),
        principal_type: kind,
        role_name: role.to_string(),
    }
}

fn deployment(id: &str, name: &str, rg: &str, status: DeploymentStatus, ts: &str, duration: &str) -> DeploymentEntry {
    DeploymentEntry {
        id: id.to_string(),
        name: name.to_string(),
        resource_group: rg.to_string(),
        status,
        timestamp: ts.to_string(),
        duration: duration.to_string(),
    }
}

fn sla(service: &str, contractual: f64, actual: f64) -> SlaEntry {
    SlaEntry {
        service: service.to_string(),
        contractual_sla: contractual,
        actual_uptime: actual,
    }
}

pub fn generate_synthetic_model(subscription_id: &str) -> DashboardModel {
    use HealthStatus::*;
    use RecommendationCategory::*;
    use Severity::*;

    let security = SecurityPosture {
        score: 72,
        active_threats: 3,
        compliance_score: 85,
        critical_vulnerabilities: 5,
        alerts: vec![
            alert("1", High, "SQL injection attempt detected on webapp-prod", "10m ago"),
            alert("2", Medium, "Brute force attack on SSH port 22", "1h ago"),
            alert("3", Low, "Anomalous login from new geography", "3h ago"),
        ],
        regulatory_compliance: vec![
            framework("CIS Microsoft Azure Foundations", 42, 8),
            framework("ISO 27001:2013", 85, 15),
            framework("PCI DSS v3.2.1", 55, 5),
            framework("NIST SP 800-53 Rev. 5", 120, 30),
        ],
        network_security: NetworkSecurity {
            open_rules: 12,
            public_endpoints: 8,
            unprotected_endpoints: 3,
        },
        encryption_status: EncryptionStatus {
            encrypted_count: 45,
            unencrypted_count: 7,
        },
        key_vault_health: KeyVaultHealth {
            total_secrets: 24,
            expiring_secrets: 3,
            total_certificates: 8,
            expiring_certificates: 1,
        },
    };

    let cost_trend = [
        ("Day 1", 400.0, CostKind::Actual),
        ("Day 5", 450.0, CostKind::Actual),
        ("Day 10", 420.0, CostKind::Actual),
        ("Day 15", 500.0, CostKind::Actual),
        ("Day 20", 520.0, CostKind::Forecast),
        ("Day 25", 550.0, CostKind::Forecast),
        ("Day 30", 530.0, CostKind::Forecast),
    ]
    .into_iter()
    .map(|(date, value, kind)| CostPoint {
        date: date.to_string(),
        value,
        kind,
    })
    .collect();

    let cost = CostSummary {
        current_month_cost: 12450.0,
        forecasted_cost: 15200.0,
        budget: 14000.0,
        ri_coverage: 45.0,
        potential_savings: 2900.0,
        month_over_month_change: 8.5,
        cost_trend,
        cost_by_service: vec![
            named("Virtual Machines", 4200.0),
            named("SQL Database", 2800.0),
            named("Storage", 1900.0),
            named("App Service", 1500.0),
            named("Networking", 1100.0),
            named("Key Vault", 450.0),
            named("Monitor", 300.0),
            named("Other", 200.0),
        ],
        cost_by_resource_group: vec![
            named("rg-production", 5500.0),
            named("rg-staging", 3200.0),
            named("rg-development", 2100.0),
            named("rg-shared-infra", 1650.0),
        ],
        cost_by_region: vec![
            named("East US", 5800.0),
            named("West Europe", 3400.0),
            named("Southeast Asia", 2100.0),
            named("Central US", 1150.0),
        ],
        anomalies: vec![
            CostAnomaly {
                date: "2026-02-05".into(),
                expected_cost: 420.0,
                actual_cost: 680.0,
                service: "Virtual Machines".into(),
            },
            CostAnomaly {
                date: "2026-02-09".into(),
                expected_cost: 350.0,
                actual_cost: 520.0,
                service: "SQL Database".into(),
            },
        ],
    };

    let resources_by_type = [
        ("disks", 52),
        ("networkInterfaces", 45),
        ("virtualMachines", 42),
        ("storageAccounts", 18),
        ("sqlDatabases", 12),
        ("webApps", 8),
        ("publicIPAddresses", 8),
        ("loadBalancers", 4),
        ("keyVaults", 3),
        ("containerRegistries", 2),
    ]
    .into_iter()
    .map(|(type_name, count)| TypeCount {
        type_name: type_name.to_string(),
        count,
    })
    .collect();

    let resources_by_region = [("eastus", 65), ("westeurope", 42), ("southeastasia", 28), ("centralus", 15)]
        .into_iter()
        .map(|(region, count)| RegionCount {
            region: region.to_string(),
            count,
        })
        .collect();

    let governance = GovernancePosture {
        health_score: derive::governance_health_score(DEMO_TAGGING, DEMO_NAMING, DEMO_ZOMBIES),
        policy_violations: 12,
        tagging_compliance: DEMO_TAGGING,
        naming_compliance: DEMO_NAMING,
        zombie_asset_count: DEMO_ZOMBIES,
        policies: vec![
            policy("p1", "Require Cost Center Tag", PolicyStatus::Failed, Medium, 14),
            policy("p2", "Storage Account Secure Transfer", PolicyStatus::Passed, High, 0),
            policy("p3", "No Public IP on DB", PolicyStatus::Warning, High, 2),
            policy("p4", "Enforce HTTPS only", PolicyStatus::Passed, High, 0),
            policy("p5", "Disk Encryption Required", PolicyStatus::Failed, High, 7),
        ],
        resources_by_type,
        resources_by_region,
        orphaned_resources: vec![
            orphan("o1", "disk-old-webserver-01", "Unattached Disk", 20.0),
            orphan("o2", "pip-legacy-app", "Unused Public IP", 5.0),
            orphan("o3", "nic-decom-vm-03", "Empty NIC", 5.0),
            orphan("o4", "disk-test-backup-02", "Unattached Disk", 20.0),
            orphan("o5", "pip-temp-migration", "Unused Public IP", 5.0),
        ],
        quotas: vec![
            quota("Total Regional vCPUs", 48, 200),
            quota("Standard DSv3 Family vCPUs", 24, 100),
            quota("Storage Accounts", 18, 250),
            quota("Public IP Addresses", 8, 60),
            quota("Network Security Groups", 12, 100),
        ],
    };

    let monitoring = MonitoringSnapshot {
        vm_count: 42,
        storage_used_tb: 12.5,
        active_users: 1540,
        uptime: 99.98,
        cpu_history: series([35.0, 28.0, 55.0, 85.0, 72.0, 45.0]),
        memory_history: series([55.0, 50.0, 68.0, 88.0, 78.0, 62.0]),
        disk_iops_history: series([1200.0, 800.0, 3500.0, 5200.0, 4100.0, 2200.0]),
        service_health: vec![
            ServiceHealthEntry {
                service: "Virtual Machines".into(),
                status: Healthy,
                summary: "All 42 VMs operational".into(),
            },
            ServiceHealthEntry {
                service: "SQL Database".into(),
                status: Healthy,
                summary: "12 databases running normally".into(),
            },
            ServiceHealthEntry {
                service: "App Service".into(),
                status: Degraded,
                summary: "1 of 8 apps experiencing latency".into(),
            },
            ServiceHealthEntry {
                service: "Storage".into(),
                status: Healthy,
                summary: "18 accounts accessible".into(),
            },
        ],
        resource_health: ResourceHealthCounts {
            healthy: 140,
            degraded: 3,
            unavailable: 1,
        },
        backup_coverage: BackupCoverage {
            protected: 95,
            unprotected: 18,
        },
    };

    let recommendations = RecommendationSet {
        monthly_savings: 2900.0,
        efficiency_score: 68,
        items: vec![
            recommendation("1", Cost, High, "Resize 8 underutilized B-series VMs", 850.0),
            recommendation("2", Cost, High, "Purchase reserved instances for production workloads", 1200.0),
            recommendation("3", Security, High, "Enable Defender for SQL databases", 0.0),
            recommendation("4", Performance, Medium, "Enable autoscaling for the App Service plan", 300.0),
            recommendation("5", Cost, Medium, "Delete 5 orphaned managed disks", 125.0),
            recommendation("6", Reliability, High, "Enable availability zones for production VMs", 0.0),
            recommendation("7", Security, Medium, "Rotate expiring Key Vault secrets", 0.0),
            recommendation("8", Cost, Low, "Move cold storage to the Cool/Archive tier", 425.0),
        ],
    };

    let events = vec![
        event("e1", "2026-02-13T09:15:00Z", "Write Virtual Machines", OperationStatus::Succeeded, "admin@contoso.com", "rg-production", "Created VM web-prod-04"),
        event("e2", "2026-02-13T08:30:00Z", "Write Network Security Groups", OperationStatus::Succeeded, "netops@contoso.com", "rg-shared-infra", "Updated NSG rules"),
        event("e3", "2026-02-12T16:45:00Z", "Delete Storage Accounts", OperationStatus::Failed, "dev@contoso.com", "rg-development", "Failed to delete storage, lock present"),
        event("e4", "2026-02-12T14:20:00Z", "Action Restart", OperationStatus::Succeeded, "System", "rg-production", "Auto-restart triggered by health probe"),
        event("e5", "2026-02-12T10:00:00Z", "Write Deployments", OperationStatus::Succeeded, "devops-pipeline", "rg-staging", "ARM template deployment v2.4.1"),
        event("e6", "2026-02-11T22:00:00Z", "Write Server Farms", OperationStatus::Succeeded, "autoscale", "rg-production", "Scaled out to 4 instances"),
    ];

    let iam = vec![
        assignment("i1", "p1", "admin@contoso.com", PrincipalType::User, "Owner"),
        assignment("i2", "p2", "devops-sp", PrincipalType::ServicePrincipal, "Contributor"),
        assignment("i3", "p3", "dev-team", PrincipalType::Group, "Contributor"),
        assignment("i4", "p4", "readonly-auditor", PrincipalType::User, "Reader"),
        assignment("i5", "p5", "backup-sp", PrincipalType::ServicePrincipal, "Backup Contributor"),
        assignment("i6", "p6", "security-team", PrincipalType::Group, "Security Reader"),
        assignment("i7", "p7", "guest@partner.com", PrincipalType::User, "Reader"),
    ];

    let devops = DevOpsSummary {
        deployments: vec![
            deployment("d1", "webapp-v2.4.1", "rg-production", DeploymentStatus::Succeeded, "2026-02-13T08:00:00Z", "PT4M12S"),
            deployment("d2", "api-hotfix-312", "rg-production", DeploymentStatus::Succeeded, "2026-02-12T15:30:00Z", "PT2M45S"),
            deployment("d3", "infra-update-feb", "rg-shared-infra", DeploymentStatus::Failed, "2026-02-12T10:00:00Z", "PT8M30S"),
            deployment("d4", "staging-release-rc1", "rg-staging", DeploymentStatus::Succeeded, "2026-02-11T16:00:00Z", "PT5M20S"),
            deployment("d5", "db-migration-v3", "rg-production", DeploymentStatus::Succeeded, "2026-02-10T22:00:00Z", "PT12M5S"),
        ],
        change_velocity: [12, 8, 15, 22, 18, 25, 14]
            .into_iter()
            .enumerate()
            .map(|(offset, changes)| DailyChanges {
                date: format!("2026-02-{:02}", 7 + offset),
                changes,
            })
            .collect(),
        failed_operations_summary: vec![
            OperationFailures {
                operation: "Delete Storage Accounts".into(),
                count: 3,
            },
            OperationFailures {
                operation: "Write Network Security Groups".into(),
                count: 2,
            },
            OperationFailures {
                operation: "Write Virtual Machines".into(),
                count: 1,
            },
        ],
    };

    let executive_summary = ExecutiveSummary {
        subscription_name: "Enterprise Production".into(),
        total_resources: 150,
        sla_tracking: vec![
            sla("Virtual Machines", 99.95, 99.99),
            sla("SQL Database", 99.99, 99.98),
            sla("App Service", 99.95, 99.85),
            sla("Storage", 99.9, 100.0),
            sla("Key Vault", 99.99, 100.0),
        ],
    };

    let iam_extended = IamExtended {
        role_assignments: iam.clone(),
        privileged_role_counts: PrivilegedRoleCounts {
            owners: 2,
            contributors: 5,
            admins: 1,
        },
        service_principals: vec![
            ServicePrincipalSummary {
                name: "devops-sp".into(),
                role_name: "Contributor".into(),
                credential_expiry: "2026-05-15".into(),
            },
            ServicePrincipalSummary {
                name: "backup-sp".into(),
                role_name: "Backup Contributor".into(),
                credential_expiry: "2026-03-01".into(),
            },
            ServicePrincipalSummary {
                name: "monitoring-sp".into(),
                role_name: "Monitoring Reader".into(),
                credential_expiry: "2026-08-22".into(),
            },
        ],
        guest_user_count: 3,
        stale_account_count: 5,
    };

    DashboardModel {
        subscription_id: subscription_id.to_string(),
        is_live_data: false,
        security,
        cost,
        governance,
        monitoring,
        recommendations,
        events,
        iam,
        devops,
        executive_summary,
        iam_extended,
    }
}
