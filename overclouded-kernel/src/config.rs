use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::fetch::{DEFAULT_MANAGEMENT_URL, DEFAULT_USER_AGENT};

pub const CONFIG_ENV: &str = "OVERCLOUDED_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "overclouded.yaml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub listen: String,
    pub management_url: String,
    /// Serve the demo model when a dashboard request carries no credential.
    pub synthetic_fallback: bool,
    pub user_agent: String,
    /// When set, every route except `/health` requires a matching `x-api-key`.
    pub api_key: Option<String>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".into(),
            management_url: DEFAULT_MANAGEMENT_URL.into(),
            synthetic_fallback: true,
            user_agent: DEFAULT_USER_AGENT.into(),
            api_key: None,
        }
    }
}

impl KernelConfig {
    /// `OVERCLOUDED_LISTEN`, `OVERCLOUDED_MANAGEMENT_URL`, `OVERCLOUDED_API_KEY`
    /// win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(listen) = env_value("OVERCLOUDED_LISTEN") {
            self.listen = listen;
        }
        if let Some(url) = env_value("OVERCLOUDED_MANAGEMENT_URL") {
            self.management_url = url;
        }
        if let Some(key) = env_value("OVERCLOUDED_API_KEY") {
            self.api_key = Some(key);
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub async fn load_config() -> KernelConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut cfg = load_from_path(&path).await;
    cfg.apply_env_overrides();
    cfg
}

/// Missing, empty or invalid file -> defaults.
pub async fn load_from_path(path: impl AsRef<Path>) -> KernelConfig {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return KernelConfig::default();
    }
    let txt = match fs::read_to_string(path).await {
        Ok(txt) => txt,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            return KernelConfig::default();
        }
    };
    if txt.trim().is_empty() {
        return KernelConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid config, using defaults");
        KernelConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "listen: 127.0.0.1:9000\nsynthetic_fallback: false").unwrap();

        let cfg = load_from_path(file.path()).await;
        assert_eq!(cfg.listen, "127.0.0.1:9000");
        assert!(!cfg.synthetic_fallback);
        assert_eq!(cfg.management_url, DEFAULT_MANAGEMENT_URL);
        assert!(cfg.api_key.is_none());
    }

    #[tokio::test]
    async fn test_invalid_or_missing_file_gives_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "listen: [unterminated").unwrap();
        assert_eq!(load_from_path(file.path()).await, KernelConfig::default());

        let empty = NamedTempFile::new().unwrap();
        assert_eq!(load_from_path(empty.path()).await, KernelConfig::default());

        assert_eq!(
            load_from_path("/definitely/not/here/overclouded.yaml").await,
            KernelConfig::default()
        );
    }
}
