use std::env;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const API_BASE_ENV: &str = "ROUTE_GPX_API_BASE";
const TIMEOUT_ENV: &str = "ROUTE_GPX_TIMEOUT_SECS";
const DEFAULT_API_BASE: &str = "https://gpx-backend.marijusgudiskis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Structured error payload returned by the route service, e.g.
/// `{"detail": "Route not found"}` or `{"message": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// `detail` wins over `message`. Non-string details (validation error
    /// lists) are rendered as compact JSON.
    pub fn into_description(self) -> Option<String> {
        let detail = match self.detail {
            Some(Value::String(text)) => Some(text),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let non_empty = |text: String| Some(text.trim().to_string()).filter(|t| !t.is_empty());
        detail
            .and_then(non_empty)
            .or_else(|| self.message.and_then(non_empty))
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `ROUTE_GPX_API_BASE` and `ROUTE_GPX_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base) = lookup(API_BASE_ENV) {
            let base = base.trim();
            if !base.is_empty() {
                config.base_url = base.to_string();
            }
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    value = %raw,
                    default_secs = DEFAULT_TIMEOUT.as_secs(),
                    "ignoring invalid {TIMEOUT_ENV}"
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_apply() {
        let config = ApiConfig::from_lookup(lookup(&[
            (API_BASE_ENV, " http://localhost:8000 "),
            (TIMEOUT_ENV, "30"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        for raw in ["soon", "0", "-5"] {
            let config = ApiConfig::from_lookup(lookup(&[(TIMEOUT_ENV, raw)]));
            assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        }
    }

    #[test]
    fn error_body_prefers_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "Route not found", "message": "other"}"#).unwrap();
        assert_eq!(body.into_description().as_deref(), Some("Route not found"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": "Upstream down"}"#).unwrap();
        assert_eq!(body.into_description().as_deref(), Some("Upstream down"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "  ", "message": "Route type unknown"}"#).unwrap();
        assert_eq!(body.into_description().as_deref(), Some("Route type unknown"));

        let body: ErrorBody = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(body.into_description(), None);
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["path", "route_nr"]}]}"#).unwrap();
        assert_eq!(
            body.into_description().as_deref(),
            Some(r#"[{"loc":["path","route_nr"]}]"#)
        );
    }
}
