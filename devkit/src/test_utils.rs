/*!
Test harness for acquisitions

Wraps a [`StubFetcher`] with a fixed clock and a fixed subscription so an
acquisition is reproducible, then offers assertions over the model's JSON
form (the shape presentation layers actually consume).
*/

use crate::fetch_stub::StubFetcher;
use anyhow::{Context, Result};
use overclouded_kernel::{assemble_at, DashboardModel};
use serde_json::Value;
use time::macros::datetime;
use time::OffsetDateTime;

pub const DEFAULT_SUBSCRIPTION: &str = "6f1b2c3d-0000-4000-8000-00000000abcd";
/// Activity-log window of every harness acquisition ends here.
pub const DEFAULT_NOW: OffsetDateTime = datetime!(2026-02-03 12:00 UTC);

pub struct TestHarness {
    pub fetch: StubFetcher,
    pub subscription_id: String,
    pub now: OffsetDateTime,
}

impl TestHarness {
    pub fn new() -> Self {
        env_logger::try_init().ok();

        Self {
            fetch: StubFetcher::new(),
            subscription_id: DEFAULT_SUBSCRIPTION.to_string(),
            now: DEFAULT_NOW,
        }
    }

    pub fn with_subscription(mut self, subscription_id: &str) -> Self {
        self.subscription_id = subscription_id.to_string();
        self
    }

    /// Move the end of the activity-log window.
    pub fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = now;
        self
    }

    /// Answer `json` for every path ending with `suffix`.
    pub fn respond(&self, suffix: &str, json: Value) -> &Self {
        self.fetch.respond(suffix, json);
        self
    }

    pub async fn acquire(&self) -> Result<DashboardModel> {
        let model = assemble_at(&self.fetch, &self.subscription_id, self.now).await?;
        log::info!(
            "Acquired {} with {} calls",
            model.subscription_id,
            self.fetch.calls().len()
        );
        Ok(model)
    }

    pub async fn acquire_json(&self) -> Result<Value> {
        let model = self.acquire().await?;
        serde_json::to_value(&model).context("model does not serialize")
    }

    /// `field_path` is dot-separated; numeric segments index arrays.
    pub fn assert_field_equals(&self, model: &Value, field_path: &str, expected: &Value) -> Result<()> {
        let Some(actual) = get_nested_field(model, field_path) else {
            anyhow::bail!("Field '{}' not found", field_path);
        };
        if actual != expected {
            anyhow::bail!("Field '{}' mismatch: expected {}, got {}", field_path, expected, actual);
        }
        Ok(())
    }

    /// Fails on the first `null` leaf, reporting its path.
    pub fn assert_schema_complete(&self, model: &Value) -> Result<()> {
        match find_null(model, String::new()) {
            Some(path) => anyhow::bail!("Field '{}' is null", path),
            None => Ok(()),
        }
    }

    /// Requests issued so far whose path contains `fragment`.
    pub fn call_count(&self, fragment: &str) -> usize {
        self.fetch.calls_matching(fragment).len()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn find_null(value: &Value, path: String) -> Option<String> {
    match value {
        Value::Null => Some(path),
        Value::Object(obj) => obj.iter().find_map(|(key, child)| {
            let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
            find_null(child, child_path)
        }),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(idx, child)| find_null(child, format!("{path}.{idx}"))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_field_walks_objects_and_arrays() {
        let value = json!({ "a": { "b": [ { "c": 3 } ] } });
        assert_eq!(get_nested_field(&value, "a.b.0.c"), Some(&json!(3)));
        assert_eq!(get_nested_field(&value, "a.b.1.c"), None);
        assert_eq!(get_nested_field(&value, "a.x"), None);
    }

    #[test]
    fn test_schema_completeness_reports_null_path() {
        let harness = TestHarness::new();
        assert!(harness.assert_schema_complete(&json!({ "a": [1, { "b": 2 }] })).is_ok());
        let err = harness
            .assert_schema_complete(&json!({ "a": [1, { "b": null }] }))
            .unwrap_err();
        assert!(err.to_string().contains("a.1.b"));
    }

    #[tokio::test]
    async fn test_harness_acquires_with_fixed_clock() {
        let harness = TestHarness::new();
        let model = harness.acquire_json().await.unwrap();

        harness
            .assert_field_equals(&model, "subscriptionId", &json!(DEFAULT_SUBSCRIPTION))
            .unwrap();
        harness.assert_schema_complete(&model).unwrap();
        assert_eq!(harness.call_count("2026-02-03T12:00:00Z"), 1);
    }
}
