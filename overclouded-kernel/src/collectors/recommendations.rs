//! Advisor recommendations.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{lenient_number, list_items, subscription_path};
use crate::fetch::Fetch;
use crate::heuristics::EFFICIENCY_DECAY_PER_ITEM;
use crate::model::{Recommendation, RecommendationCategory, RecommendationSet, Severity};

const MAX_ITEMS: usize = 20;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecommendation {
    name: Option<String>,
    properties: Option<RawProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProperties {
    category: Option<String>,
    impact: Option<String>,
    short_description: Option<RawShortDescription>,
    extended_properties: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawShortDescription {
    problem: Option<String>,
    solution: Option<String>,
}

/// A failed advisor call yields the all-zero set; an empty advisor list is a
/// perfect efficiency score.
pub async fn collect<F: Fetch>(fetch: &F, subscription_id: &str) -> RecommendationSet {
    let path = subscription_path(
        subscription_id,
        "providers/Microsoft.Advisor/recommendations?api-version=2020-01-01",
    );
    match fetch.get_json(&path).await {
        Some(json) => {
            let raw: Vec<RawRecommendation> = list_items(&json);
            summarize(raw.iter().take(MAX_ITEMS).enumerate().map(|(idx, r)| to_item(idx, r)).collect())
        }
        None => {
            warn!("advisor recommendations unavailable, defaulting to an empty set");
            RecommendationSet::default()
        }
    }
}

fn summarize(items: Vec<Recommendation>) -> RecommendationSet {
    let total: f64 = items.iter().map(|i| i.savings).sum();
    RecommendationSet {
        monthly_savings: total.round(),
        efficiency_score: efficiency_score(items.len()),
        items,
    }
}

pub fn efficiency_score(item_count: usize) -> u32 {
    if item_count == 0 {
        return 100;
    }
    let decay = (item_count as u32).saturating_mul(EFFICIENCY_DECAY_PER_ITEM);
    100u32.saturating_sub(decay)
}

pub fn map_category(raw: Option<&str>) -> RecommendationCategory {
    match raw {
        Some("Cost") => RecommendationCategory::Cost,
        Some("Security") => RecommendationCategory::Security,
        Some("Performance") => RecommendationCategory::Performance,
        Some("HighAvailability") | Some("Reliability") => RecommendationCategory::Reliability,
        _ => RecommendationCategory::default(),
    }
}

fn to_item(idx: usize, raw: &RawRecommendation) -> Recommendation {
    let p = raw.properties.as_ref();
    let short = p.and_then(|p| p.short_description.as_ref());
    let savings = p
        .and_then(|p| p.extended_properties.as_ref())
        .and_then(|ext| lenient_number(ext.get("savingsAmount")))
        .unwrap_or(0.0);

    Recommendation {
        id: raw
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("rec-{idx}")),
        category: map_category(p.and_then(|p| p.category.as_deref())),
        impact: p
            .and_then(|p| p.impact.as_deref())
            .and_then(Severity::parse)
            .unwrap_or_default(),
        description: short
            .and_then(|s| s.problem.clone().or_else(|| s.solution.clone()))
            .unwrap_or_default(),
        savings,
    }
}
