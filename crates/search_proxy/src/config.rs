use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

const SETTINGS_FILE: &str = "search_proxy.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            upstream_url: "http://127.0.0.1:8000".into(),
            upstream_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    upstream_url: Option<String>,
    upstream_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.bind_addr = v;
                }
                if let Some(v) = file_cfg.upstream_url {
                    settings.upstream_url = v;
                }
                if let Some(v) = file_cfg.upstream_timeout_secs {
                    settings.upstream_timeout_secs = v;
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("SEARCH_PROXY_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = env("UPSTREAM_URL") {
        settings.upstream_url = v;
    }
    if let Some(v) = env("APP__UPSTREAM_URL") {
        settings.upstream_url = v;
    }

    if let Some(v) = env("APP__UPSTREAM_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.upstream_timeout_secs = parsed;
        }
    }

    settings.upstream_url = normalize_upstream_url(&settings.upstream_url);
    settings
}

/// Reduces an upstream setting to the service base url; the `/query`
/// endpoint is appended by the client.
pub(crate) fn normalize_upstream_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return Settings::default().upstream_url;
    }

    let trimmed = raw.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/query").unwrap_or(trimmed);

    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
