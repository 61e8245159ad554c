use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "car_price.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            request_timeout_secs: Some(30),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let raw = self.api_url.trim();
        if raw.is_empty() {
            bail!("api url is empty");
        }
        let url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api url '{raw}' must use http or https");
        }
        Ok(url)
    }
}

/// Reads settings from `car_price.toml` in the working directory and the
/// process environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<ClientSettings> {
    let file = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("failed to load settings from '{}'", path.display()))
}

/// Layers defaults, file contents and environment lookups, later layers
/// winning.
pub fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid config file")?;
        if let Some(v) = file_cfg.api_url {
            settings.api_url = v;
        }
        if let Some(secs) = file_cfg.request_timeout_secs {
            settings.request_timeout_secs = timeout_from(secs);
        }
    }

    for key in ["REACT_APP_API_URL", "API_URL", "APP__API_URL"] {
        if let Some(v) = env(key) {
            settings.api_url = v;
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
        settings.request_timeout_secs = timeout_from(secs);
    }

    Ok(settings)
}

/// A timeout of zero disables the timeout.
fn timeout_from(secs: u64) -> Option<u64> {
    (secs > 0).then_some(secs)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
