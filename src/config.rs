use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api_connection::endpoints::DEFAULT_UPSTREAM_URL;
use crate::api_connection::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

pub const PROXY_URL_ENV_VAR: &str = "NUTRIFIND_PROXY_URL";
pub const DATA_DIR_ENV_VAR: &str = "NUTRIFIND_DATA_DIR";
pub const UPSTREAM_URL_ENV_VAR: &str = "NUTRIFIND_UPSTREAM_URL";
pub const MAX_ATTEMPTS_ENV_VAR: &str = "NUTRIFIND_MAX_ATTEMPTS";
pub const BACKOFF_BASE_MS_ENV_VAR: &str = "NUTRIFIND_BACKOFF_BASE_MS";
/// Upstream credential; the second name is accepted for older deployments.
pub const API_KEY_ENV_VARS: [&str; 2] = ["CALORIE_NINJAS_API_KEY", "CALORIE_NINJAS_KEY"];

const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = ".nutrifind";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub proxy_url: String,
    pub data_dir: PathBuf,
    pub upstream_url: String,
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads settings from the environment.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let max_attempts = non_empty(MAX_ATTEMPTS_ENV_VAR)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let base_delay = non_empty(BACKOFF_BASE_MS_ENV_VAR)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BASE_DELAY);

        Self {
            proxy_url: non_empty(PROXY_URL_ENV_VAR).unwrap_or(defaults.proxy_url),
            data_dir: non_empty(DATA_DIR_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            upstream_url: non_empty(UPSTREAM_URL_ENV_VAR).unwrap_or(defaults.upstream_url),
            api_key: API_KEY_ENV_VARS.iter().find_map(|key| non_empty(*key)),
            retry: RetryPolicy::new(max_attempts, base_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides_and_api_key_fallback() {
        let config = config_from(&[
            (PROXY_URL_ENV_VAR, "http://localhost:8080"),
            (DATA_DIR_ENV_VAR, "/tmp/nutrifind"),
            (MAX_ATTEMPTS_ENV_VAR, "5"),
            (BACKOFF_BASE_MS_ENV_VAR, "10"),
            ("CALORIE_NINJAS_KEY", "secret"),
        ]);
        assert_eq!(config.proxy_url, "http://localhost:8080");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/nutrifind"));
        assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_millis(10)));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_primary_api_key_wins_and_blank_values_are_ignored() {
        let config = config_from(&[
            ("CALORIE_NINJAS_API_KEY", "primary"),
            ("CALORIE_NINJAS_KEY", "secondary"),
            (PROXY_URL_ENV_VAR, "   "),
            (MAX_ATTEMPTS_ENV_VAR, "many"),
        ]);
        assert_eq!(config.api_key.as_deref(), Some("primary"));
        assert_eq!(config.proxy_url, DEFAULT_PROXY_URL);
        assert_eq!(config.retry.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }
}
