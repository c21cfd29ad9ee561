use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_CONFIG_PATH: &str = "HOME_CONTROLLER_CONFIG";
pub const ENV_API_BASE_URL: &str = "HOME_API_BASE_URL";
pub const ENV_BACKEND_URL: &str = "HOME_BACKEND_URL";
pub const ENV_BACKEND_KEY: &str = "HOME_BACKEND_KEY";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "HOME_REQUEST_TIMEOUT_MS";

const MIN_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "YOUR_SUPABASE_URL".to_string(),
            key: "YOUR_SUPABASE_ANON_KEY".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.url = url;
        }
        if let Some(key) = lookup(ENV_BACKEND_KEY) {
            self.key = key;
        }
    }

    pub fn sanitize(&mut self) {
        self.url = self.url.trim().trim_end_matches('/').to_string();
        self.key = self.key.trim().to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub api_base_url: String,
    pub backend: BackendConfig,
    pub cycle_interval_ms: u64,
    pub error_backoff_ms: u64,
    /// Unset means requests may block the cycle indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            backend: BackendConfig::default(),
            cycle_interval_ms: 30_000,
            error_backoff_ms: 10_000,
            request_timeout_ms: None,
        }
    }
}

impl ControllerConfig {
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT_MS).and_then(|v| v.parse::<u64>().ok()) {
            self.request_timeout_ms = Some(timeout);
        }
        self.backend.apply_overrides(lookup);
    }

    pub fn sanitize(&mut self) {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.backend.sanitize();
        self.cycle_interval_ms = self.cycle_interval_ms.max(MIN_INTERVAL_MS);
        self.error_backoff_ms = self.error_backoff_ms.max(MIN_INTERVAL_MS);
        if self.request_timeout_ms == Some(0) {
            self.request_timeout_ms = None;
        }
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_timing() {
        let config = ControllerConfig::default();
        assert_eq!(config.cycle_interval(), Duration::from_secs(30));
        assert_eq!(config.error_backoff(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = ControllerConfig::default();
        config.apply_overrides(env(&[
            (ENV_API_BASE_URL, "http://hub.local:3000/api/"),
            (ENV_BACKEND_URL, "https://queue.example.com/"),
            (ENV_BACKEND_KEY, " secret "),
            (ENV_REQUEST_TIMEOUT_MS, "5000"),
        ]));
        config.sanitize();

        assert_eq!(config.api_base_url, "http://hub.local:3000/api");
        assert_eq!(config.backend.url, "https://queue.example.com");
        assert_eq!(config.backend.key, "secret");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn unparsable_timeout_is_ignored() {
        let mut config = ControllerConfig::default();
        config.apply_overrides(env(&[(ENV_REQUEST_TIMEOUT_MS, "soon")]));
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn sanitize_clamps_intervals() {
        let mut config = ControllerConfig {
            cycle_interval_ms: 0,
            error_backoff_ms: 10,
            request_timeout_ms: Some(0),
            ..ControllerConfig::default()
        };
        config.sanitize();

        assert_eq!(config.cycle_interval_ms, 1_000);
        assert_eq!(config.error_backoff_ms, 1_000);
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{ "backend": { "key": "k" }, "cycle_interval_ms": 60000 }"#)
                .unwrap();

        assert_eq!(config.backend.key, "k");
        assert_eq!(config.backend.url, "YOUR_SUPABASE_URL");
        assert_eq!(config.cycle_interval_ms, 60_000);
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
    }
}
