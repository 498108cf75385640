/**
 * DOMAIN COLLECTORS - One module per telemetry domain
 *
 * ROLE :
 * Each collector retrieves and shapes one domain through the fetch primitive.
 * A failed sub-call degrades that collector to its documented default; it never
 * aborts sibling collectors.
 *
 * SHAPE :
 * `collect(fetch, subscription_id, [inventory | region | now]) -> DomainResult`
 * Raw provider payloads are decoded into private structs where every field is
 * optional, then folded into the model types.
 */

pub mod activity;
pub mod deployments;
pub mod iam;
pub mod policy;
pub mod quotas;
pub mod recommendations;
pub mod security;
pub mod service_health;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Items of an ARM list envelope (`{"value": [...]}`).
/// Entries that do not decode as `T` are skipped one by one.
pub(crate) fn list_items<T: DeserializeOwned>(json: &Value) -> Vec<T> {
    json.get("value")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| T::deserialize(item).ok()).collect())
        .unwrap_or_default()
}

/// `{"value": "..."}` wrapper or a bare string; the API uses both.
pub(crate) fn value_or_string(raw: Option<&Value>) -> Option<String> {
    let raw = raw?;
    raw.get("value")
        .and_then(Value::as_str)
        .or_else(|| raw.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Number or numeric string; non-finite values are rejected.
pub(crate) fn lenient_number(raw: Option<&Value>) -> Option<f64> {
    let parsed = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Non-negative whole count from a possibly fractional or negative number.
pub(crate) fn as_count(raw: Option<f64>) -> u64 {
    match raw {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as u64,
        _ => 0,
    }
}

/// `deserialize_with` for required-looking fields the API sometimes sends as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Tag map whose `null` values become empty strings; the key still counts.
pub(crate) fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?;
    Ok(raw.map(|tags| {
        tags.into_iter()
            .map(|(key, value)| (key, value.unwrap_or_default()))
            .collect()
    }))
}

pub(crate) fn subscription_path(subscription_id: &str, rest: &str) -> String {
    format!("/subscriptions/{subscription_id}/{}", rest.trim_start_matches('/'))
}
