/*!
Stub fetcher for offline development

Stands in for the management API: answers `get_json` from an in-memory route
table and records every path requested, so collectors and the assembler can be
exercised without a network or a credential.

Routes are matched by path suffix with the query string ignored. Unknown
paths, and routes registered with [`StubFetcher::fail`], answer `None` like a
failed call would.
*/

use anyhow::{Context, Result};
use overclouded_kernel::Fetch;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct StubRoute {
    suffix: String,
    response: Option<Value>,
}

/// One entry of a recorded response file; `response: null` records a failure.
#[derive(Debug, Deserialize)]
struct RecordedRoute {
    suffix: String,
    #[serde(default)]
    response: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    #[serde(default)]
    routes: Vec<RecordedRoute>,
}

/// In-memory [`Fetch`] implementation. Clones share routes and call log.
#[derive(Clone, Default)]
pub struct StubFetcher {
    routes: Arc<Mutex<Vec<StubRoute>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a recorded session: `{"routes": [{"suffix": ..., "response": ...}]}`.
    pub fn from_recording<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read recording {}", path.display()))?;
        let recording: Recording = serde_json::from_str(&content)
            .with_context(|| format!("invalid recording {}", path.display()))?;

        let stub = Self::new();
        for route in recording.routes {
            stub.register(route.suffix, route.response);
        }
        log::info!("Loaded {} recorded routes from {}", stub.routes.lock().len(), path.display());
        Ok(stub)
    }

    /// Answer `json` for every path ending with `suffix`.
    pub fn respond(&self, suffix: impl Into<String>, json: Value) -> &Self {
        self.register(suffix.into(), Some(json));
        self
    }

    /// Make every path ending with `suffix` fail.
    pub fn fail(&self, suffix: impl Into<String>) -> &Self {
        self.register(suffix.into(), None);
        self
    }

    /// Re-registering a suffix replaces its previous answer.
    fn register(&self, suffix: String, response: Option<Value>) {
        let mut routes = self.routes.lock();
        match routes.iter_mut().find(|r| r.suffix == suffix) {
            Some(existing) => existing.response = response,
            None => routes.push(StubRoute { suffix, response }),
        }
    }

    /// Every requested path, in request order, query string included.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_matching(&self, fragment: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|path| path.contains(fragment))
            .cloned()
            .collect()
    }

    /// Forget recorded calls; routes are kept.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn lookup(&self, path: &str) -> Option<Value> {
        let bare = path.split('?').next().unwrap_or(path);
        let routes = self.routes.lock();
        let route = routes.iter().find(|r| bare.ends_with(r.suffix.as_str()))?;
        route.response.clone()
    }
}

impl Fetch for StubFetcher {
    async fn get_json(&self, path: &str) -> Option<Value> {
        self.calls.lock().push(path.to_string());
        let answer = self.lookup(path);
        if answer.is_none() {
            log::debug!("[STUB] no answer for {}", path);
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_suffix_routing_ignores_query() {
        let stub = StubFetcher::new();
        stub.respond("/resources", json!({ "value": [] }));

        let hit = stub.get_json("/subscriptions/s/resources?api-version=2021-04-01").await;
        assert_eq!(hit, Some(json!({ "value": [] })));
        assert!(stub.get_json("/subscriptions/s/resourcegroups").await.is_none());
        assert_eq!(stub.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_replaces_previous_answer() {
        let stub = StubFetcher::new();
        stub.respond("/alerts", json!({ "value": [1] })).fail("/alerts");
        assert!(stub.get_json("/subscriptions/s/alerts").await.is_none());

        stub.respond("/alerts", json!({ "value": [2] }));
        assert_eq!(stub.get_json("/subscriptions/s/alerts").await.unwrap()["value"][0], 2);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let stub = StubFetcher::new();
        let clone = stub.clone();
        clone.get_json("/a?x=1").await;
        stub.get_json("/b").await;

        assert_eq!(stub.calls(), vec!["/a?x=1".to_string(), "/b".to_string()]);
        assert_eq!(stub.calls_matching("x=1").len(), 1);
        stub.clear();
        assert!(clone.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_recording() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "routes": [
                {{ "suffix": "/resources", "response": {{ "value": [{{ "name": "vm-01" }}] }} }},
                {{ "suffix": "/alerts", "response": null }}
            ] }}"#
        )
        .unwrap();

        let stub = StubFetcher::from_recording(file.path()).unwrap();
        let body = stub.get_json("/subscriptions/s/resources").await.unwrap();
        assert_eq!(body["value"][0]["name"], "vm-01");
        assert!(stub.get_json("/subscriptions/s/alerts").await.is_none());
    }

    #[test]
    fn test_invalid_recording_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(StubFetcher::from_recording(file.path()).is_err());
        assert!(StubFetcher::from_recording("/no/such/recording.json").is_err());
    }
}
