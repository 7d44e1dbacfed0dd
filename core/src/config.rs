//! Client configuration read from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CATALOG_API_URL` | `http://127.0.0.1:3000/api` | Base URL every relative URI resolves against |
//! | `CATALOG_HTTP_TIMEOUT_MS` | - | Whole-call timeout; transport default when unset |
//! | `CATALOG_SESSION_FILE` | - | Persist the session in this JSON file; in memory when unset |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::TokenCache;
use crate::client::ApiClient;
use crate::session::SessionStore;
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::transport::UreqTransport;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values fall back
    /// to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CATALOG_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout = lookup("CATALOG_HTTP_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis);
        let session_file = lookup("CATALOG_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            base_url,
            timeout,
            session_file,
        }
    }

    /// Wire up a live client over `ureq`.
    pub fn connect(&self) -> ApiClient {
        let storage: Arc<dyn Storage> = match &self.session_file {
            Some(path) => Arc::new(FileStorage::new(path.clone())),
            None => Arc::new(MemoryStorage::new()),
        };
        ApiClient::new(
            &self.base_url,
            Arc::new(UreqTransport::new(self.timeout)),
            SessionStore::new(TokenCache::new(storage)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[])), ClientConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CATALOG_API_URL", "https://catalog.example/api/"),
            ("CATALOG_HTTP_TIMEOUT_MS", "2500"),
            ("CATALOG_SESSION_FILE", "/tmp/session.json"),
        ]));
        assert_eq!(config.base_url, "https://catalog.example/api/");
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(config.connect().base_url(), "https://catalog.example/api");
    }

    #[test]
    fn bad_timeout_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[("CATALOG_HTTP_TIMEOUT_MS", "soon")]));
        assert_eq!(config.timeout, None);
    }
}
