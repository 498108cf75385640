//! Fault-tolerant fetch primitive.
//!
//! The only point of contact with the management API. Every collector goes
//! through [`Fetch::get_json`], which turns any failure (transport error,
//! non-2xx status, undecodable body) into `None`. No retries, no timeout
//! override: one attempt per call site.

use std::fmt;
use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::error::AcquireError;

pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";
pub const DEFAULT_USER_AGENT: &str = concat!("overclouded-kernel/", env!("CARGO_PKG_VERSION"));

/// Read-only GET against the management API.
pub trait Fetch: Send + Sync {
    /// `path` is relative to the management endpoint, query string included.
    /// Returns `None` for every kind of failure.
    fn get_json(&self, path: &str) -> impl Future<Output = Option<Value>> + Send;
}

/// reqwest-backed [`Fetch`] carrying the caller's bearer credential.
#[derive(Clone)]
pub struct ArmClient {
    client: reqwest::Client,
    base_url: String,
    credential: String,
}

impl ArmClient {
    pub fn new(base_url: impl Into<String>, credential: impl Into<String>) -> Result<Self, AcquireError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| AcquireError::Client(e.to_string()))?;
        Ok(Self::with_client(client, base_url, credential))
    }

    /// Reuse an existing connection pool (the HTTP service shares one).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: credential.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmClient")
            .field("base_url", &self.base_url)
            .field("credential", &"<redacted>")
            .finish()
    }
}

impl Fetch for ArmClient {
    async fn get_json(&self, path: &str) -> Option<Value> {
        let response = match self
            .client
            .get(self.url(path))
            .bearer_auth(&self.credential)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(path, error = %e, "request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(path, %status, "non-success status");
            return None;
        }

        match response.json::<Value>().await {
            Ok(json) => Some(json),
            Err(e) => {
                debug!(path, error = %e, "undecodable body");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Fetch;
    use parking_lot::Mutex;
    use serde_json::Value;

    /// Route table keyed by path suffix (query string ignored). Unknown paths fail.
    #[derive(Default)]
    pub(crate) struct MapFetcher {
        routes: Vec<(String, Value)>,
        calls: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with(mut self, suffix: &str, json: Value) -> Self {
            self.routes.push((suffix.to_string(), json));
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl Fetch for MapFetcher {
        async fn get_json(&self, path: &str) -> Option<Value> {
            self.calls.lock().push(path.to_string());
            let bare = path.split('?').next().unwrap_or(path);
            self.routes
                .iter()
                .find(|(suffix, _)| bare.ends_with(suffix.as_str()))
                .map(|(_, json)| json.clone())
        }
    }
}
