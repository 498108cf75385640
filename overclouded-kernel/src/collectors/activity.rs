//! Activity log: recent management events plus the DevOps aggregates derived
//! from them (change velocity and failed operations).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::warn;

use super::{list_items, subscription_path, value_or_string};
use crate::fetch::Fetch;
use crate::model::{ActivityLogEntry, DailyChanges, OperationFailures, OperationStatus};

pub const WINDOW_DAYS: i64 = 7;
const MAX_EVENTS: usize = 100;
const MAX_FAILED_OPERATIONS: usize = 10;
const SELECTED_FIELDS: &str = "eventName,id,resourceGroupName,operationName,status,eventTimestamp,caller,description";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEvent {
    id: Option<String>,
    event_timestamp: Option<String>,
    operation_name: Option<Value>,
    status: Option<Value>,
    caller: Option<String>,
    resource_group_name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySummary {
    pub events: Vec<ActivityLogEntry>,
    pub change_velocity: Vec<DailyChanges>,
    pub failed_operations_summary: Vec<OperationFailures>,
}

pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str, now: OffsetDateTime) -> ActivitySummary {
    let path = events_path(subscription_id, now);
    let Some(json) = fetch.get_json(&path).await else {
        warn!("activity log unavailable, defaulting to no events");
        return ActivitySummary::default();
    };

    let mut timed: Vec<(Option<OffsetDateTime>, ActivityLogEntry)> = list_items::<RawEvent>(&json)
        .into_iter()
        .map(|raw| {
            let entry = to_entry(raw);
            (parse_timestamp(&entry.timestamp), entry)
        })
        .collect();
    timed.sort_by(|a, b| newest_first(a.0, b.0));
    timed.truncate(MAX_EVENTS);

    let events: Vec<ActivityLogEntry> = timed.into_iter().map(|(_, entry)| entry).collect();
    ActivitySummary {
        change_velocity: change_velocity(&events),
        failed_operations_summary: failed_operations(&events),
        events,
    }
}

fn events_path(subscription_id: &str, now: OffsetDateTime) -> String {
    let end = now.to_offset(UtcOffset::UTC);
    let start = end - Duration::days(WINDOW_DAYS);
    let end = end.format(&Rfc3339).unwrap_or_default();
    let start = start.format(&Rfc3339).unwrap_or_default();
    subscription_path(
        subscription_id,
        &format!(
            "providers/Microsoft.Insights/eventtypes/management/values?api-version=2015-04-01\
             &$filter=eventTimestamp%20ge%20'{start}'%20and%20eventTimestamp%20le%20'{end}'\
             &$select={SELECTED_FIELDS}"
        ),
    )
}

fn to_entry(raw: RawEvent) -> ActivityLogEntry {
    let operation_name = humanize_operation(value_or_string(raw.operation_name.as_ref()).as_deref());
    let status = match value_or_string(raw.status.as_ref()).as_deref() {
        Some("Succeeded") => OperationStatus::Succeeded,
        Some("Failed") => OperationStatus::Failed,
        Some("Started") => OperationStatus::Started,
        _ => OperationStatus::Unknown,
    };
    ActivityLogEntry {
        id: raw.id.unwrap_or_default(),
        timestamp: raw.event_timestamp.unwrap_or_default(),
        status,
        caller: non_empty(raw.caller).unwrap_or_else(|| "System".to_string()),
        resource_group: non_empty(raw.resource_group_name).unwrap_or_else(|| "N/A".to_string()),
        description: non_empty(raw.description).unwrap_or_else(|| operation_name.clone()),
        operation_name,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

/// Descending by time; entries without a parseable time go last.
pub(crate) fn newest_first(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `Microsoft.Compute/virtualMachines/write` -> `Write Virtual Machines`.
pub fn humanize_operation(raw: Option<&str>) -> String {
    let Some(op) = raw.filter(|op| !op.is_empty()) else {
        return "Unknown Operation".to_string();
    };
    let parts: Vec<&str> = op.split('/').collect();
    match parts.as_slice() {
        [.., resource, action] if parts.len() > 2 => {
            format!("{} {}", split_words(action), split_words(resource))
        }
        _ => op.to_string(),
    }
}

// uppercase the first char, then a space before every later capital
fn split_words(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out: String = first.to_uppercase().collect();
    for c in chars {
        if c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out.trim().to_string()
}

/// Events per UTC calendar day, ascending.
pub fn change_velocity(events: &[ActivityLogEntry]) -> Vec<DailyChanges> {
    let mut per_day: BTreeMap<String, u64> = BTreeMap::new();
    for event in events {
        if let Some(ts) = parse_timestamp(&event.timestamp) {
            let day = ts.to_offset(UtcOffset::UTC).date().to_string();
            *per_day.entry(day).or_insert(0) += 1;
        }
    }
    per_day
        .into_iter()
        .map(|(date, changes)| DailyChanges { date, changes })
        .collect()
}

/// Failed events grouped by humanized operation; count desc, ties in
/// first-seen order.
pub fn failed_operations(events: &[ActivityLogEntry]) -> Vec<OperationFailures> {
    let mut buckets: Vec<OperationFailures> = Vec::new();
    for event in events.iter().filter(|e| e.status == OperationStatus::Failed) {
        match buckets.iter_mut().find(|b| b.operation == event.operation_name) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(OperationFailures {
                operation: event.operation_name.clone(),
                count: 1,
            }),
        }
    }
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets.truncate(MAX_FAILED_OPERATIONS);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MapFetcher;
    use serde_json::json;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-02-03 12:00 UTC);

    fn event(ts: &str, op: &str, status: &str) -> Value {
        json!({
            "id": format!("ev-{ts}"),
            "eventTimestamp": ts,
            "operationName": { "value": op, "localizedValue": "ignored" },
            "status": { "value": status },
        })
    }

    #[test]
    fn test_humanize_operation() {
        assert_eq!(
            humanize_operation(Some("Microsoft.Compute/virtualMachines/write")),
            "Write Virtual Machines"
        );
        assert_eq!(
            humanize_operation(Some("Microsoft.Resources/deployments/validate/action")),
            "Action Validate"
        );
        assert_eq!(humanize_operation(Some("Microsoft.Web/sites")), "Microsoft.Web/sites");
        assert_eq!(humanize_operation(Some("")), "Unknown Operation");
        assert_eq!(humanize_operation(None), "Unknown Operation");
    }

    #[tokio::test]
    async fn test_change_velocity_buckets_by_utc_day() {
        let fetch = MapFetcher::new().with(
            "eventtypes/management/values",
            json!({ "value": [
                event("2026-02-01T08:00:00Z", "Microsoft.Compute/virtualMachines/write", "Succeeded"),
                event("2026-02-02T09:00:00Z", "Microsoft.Compute/virtualMachines/write", "Succeeded"),
                event("2026-02-01T10:00:00Z", "Microsoft.Compute/virtualMachines/write", "Succeeded"),
                event("2026-02-02T01:30:00+02:00", "Microsoft.Compute/disks/delete", "Failed"),
                event("2026-02-01T23:00:00Z", "Microsoft.Compute/disks/delete", "Failed"),
                event("not a time", "Microsoft.Compute/disks/delete", "Started"),
            ]}),
        );

        let summary = collect(&fetch, "sub", NOW).await;
        // +02:00 entry lands on 2026-02-01 in UTC
        assert_eq!(
            summary.change_velocity,
            vec![
                DailyChanges { date: "2026-02-01".into(), changes: 4 },
                DailyChanges { date: "2026-02-02".into(), changes: 1 },
            ]
        );
        assert_eq!(summary.events.len(), 6);
        assert_eq!(summary.events[0].timestamp, "2026-02-02T09:00:00Z");
        assert_eq!(summary.events[5].timestamp, "not a time");
        assert_eq!(
            summary.failed_operations_summary,
            vec![OperationFailures { operation: "Delete Disks".into(), count: 2 }]
        );
    }

    #[tokio::test]
    async fn test_defaults_and_truncation() {
        let mut raw: Vec<Value> = (0..120)
            .map(|i| json!({ "eventTimestamp": format!("2026-01-30T00:{:02}:{:02}Z", i / 60, i % 60) }))
            .collect();
        raw.push(json!({ "eventTimestamp": "2026-02-01T00:00:00Z", "operationName": "Microsoft.Sql/servers/databases/write",
            "caller": "ops@example.com", "resourceGroupName": "rg-data" }));
        let fetch = MapFetcher::new().with("eventtypes/management/values", json!({ "value": raw }));

        let summary = collect(&fetch, "sub", NOW).await;
        assert_eq!(summary.events.len(), 100);
        let newest = &summary.events[0];
        assert_eq!(newest.operation_name, "Write Databases");
        assert_eq!(newest.description, "Write Databases");
        assert_eq!(newest.caller, "ops@example.com");
        assert_eq!(newest.status, OperationStatus::Unknown);
        let oldest_kept = &summary.events[99];
        assert_eq!(oldest_kept.caller, "System");
        assert_eq!(oldest_kept.resource_group, "N/A");
        assert_eq!(oldest_kept.operation_name, "Unknown Operation");
    }

    #[tokio::test]
    async fn test_window_is_seven_days_ending_now() {
        let fetch = MapFetcher::new();
        let summary = collect(&fetch, "sub", NOW).await;
        assert_eq!(summary, ActivitySummary::default());

        let calls = fetch.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("eventTimestamp%20ge%20'2026-01-27T12:00:00Z'"));
        assert!(calls[0].contains("eventTimestamp%20le%20'2026-02-03T12:00:00Z'"));
        assert!(!calls[0].contains(' '));
    }

    #[test]
    fn test_failed_operations_top_ten_ordered_by_count() {
        let mut events = Vec::new();
        for i in 0..12u64 {
            for _ in 0..=(i % 3) {
                events.push(ActivityLogEntry {
                    operation_name: format!("Op {i}"),
                    status: OperationStatus::Failed,
                    ..Default::default()
                });
            }
        }
        let summary = failed_operations(&events);
        assert_eq!(summary.len(), 10);
        assert_eq!(summary[0], OperationFailures { operation: "Op 2".into(), count: 3 });
        assert_eq!(summary[1].operation, "Op 5");
        assert!(summary.windows(2).all(|w| w[0].count >= w[1].count));
    }
}
