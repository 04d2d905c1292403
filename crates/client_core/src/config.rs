use std::{collections::HashMap, fs, time::Duration};

use anyhow::{anyhow, Context};
use tracing::warn;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const SETTINGS_FILE: &str = "feedback.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub dashboard_refresh_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 30,
            dashboard_refresh_secs: 10,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dashboard_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_refresh_secs)
    }

    /// Replaces the backend address, e.g. from a command line flag.
    pub fn with_api_base_url(mut self, raw: &str) -> anyhow::Result<Self> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

/// Resolves settings from `feedback.toml` in the working directory and the
/// process environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    let file_contents = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from_sources(file_contents.as_deref(), |name| std::env::var(name).ok())
}

/// Layers defaults, then file values, then environment values. Later sources
/// win; blank or unparseable values are skipped.
pub fn settings_from_sources(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();
    let mut raw_base_url = None;

    if let Some(raw) = file_contents {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
                    raw_base_url = Some(v.to_string());
                }
                if let Some(v) = file_cfg.get("request_timeout_secs").and_then(positive_secs) {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = file_cfg.get("dashboard_refresh_secs").and_then(positive_secs) {
                    settings.dashboard_refresh_secs = v;
                }
            }
            Err(err) => warn!("ignoring unreadable {SETTINGS_FILE}: {err}"),
        }
    }

    let read_env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = read_env("FEEDBACK_API_URL") {
        raw_base_url = Some(v);
    }
    if let Some(v) = read_env("APP__API_BASE_URL") {
        raw_base_url = Some(v);
    }

    if let Some(v) = read_env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| parse_secs(&v)) {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = read_env("APP__DASHBOARD_REFRESH_SECS").and_then(|v| parse_secs(&v)) {
        settings.dashboard_refresh_secs = v;
    }

    if let Some(raw) = raw_base_url {
        settings.api_base_url = normalize_base_url(&raw)?;
    }

    Ok(settings)
}

/// Validates an http(s) base address and strips trailing slashes so paths can
/// be appended with `format!("{base}/api/...")`.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("api base url must not be empty"));
    }

    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid api base url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "api base url '{trimmed}' must use http or https, got '{}'",
            parsed.scheme()
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn positive_secs(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(v) if *v > 0 => u64::try_from(*v).ok(),
        toml::Value::String(v) => parse_secs(v),
        _ => None,
    }
}

fn parse_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
