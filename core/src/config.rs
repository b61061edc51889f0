use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://169.254.169.254:80";
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_WATCH_INTERVAL_MS: u64 = 2_000;
const DEFAULT_WATCH_BUFFER: usize = 10;
const DEFAULT_MAX_SUGGESTIONS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImdsConfig {
    pub endpoint: String,
    /// Pre-issued session token, forwarded as-is.
    pub token: Option<String>,
    pub request_timeout_ms: u64,
    pub watch_interval_ms: u64,
    pub watch_buffer: usize,
    pub max_suggestions: usize,
}

impl Default for ImdsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
            watch_buffer: DEFAULT_WATCH_BUFFER,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl ImdsConfig {
    /// Defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read imds config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("parse imds config {}", path.display()))?;
        debug!(path = %path.display(), "loaded imds config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies `IMDS_ENDPOINT` (falling back to `ENDPOINT`) and `IMDS_TOKEN`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("IMDS_ENDPOINT")
            .or_else(|| lookup("ENDPOINT"))
            .filter(|value| !value.trim().is_empty());
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(token) = lookup("IMDS_TOKEN").filter(|value| !value.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms.max(1))
    }

    /// Snapshots a watch buffers, rounded up to a power of two. That is the
    /// bound the broadcast channel actually enforces.
    pub fn watch_buffer(&self) -> usize {
        self.watch_buffer.max(1).next_power_of_two()
    }
}

/// `$IMDS_HOME/config.toml`, else `~/.imds/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("IMDS_HOME") {
        return Some(PathBuf::from(home).join(CONFIG_FILE_NAME));
    }
    dirs::home_dir().map(|home| home.join(".imds").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ImdsConfig::from_toml(
            r#"
endpoint = "http://[fd00:ec2::254]"
watch_interval_ms = 500
"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://[fd00:ec2::254]");
        assert_eq!(config.watch_interval(), Duration::from_millis(500));
        assert_eq!(config.watch_buffer, DEFAULT_WATCH_BUFFER);
        assert_eq!(config.token, None);
    }

    #[test]
    fn watch_buffer_reports_the_enforced_bound() {
        let buffer = |watch_buffer| {
            ImdsConfig {
                watch_buffer,
                ..ImdsConfig::default()
            }
            .watch_buffer()
        };
        assert_eq!(buffer(DEFAULT_WATCH_BUFFER), 16);
        assert_eq!(buffer(0), 1);
        assert_eq!(buffer(8), 8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ImdsConfig::from_toml("endpont = \"typo\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ImdsConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("read imds config"));
    }

    #[test]
    fn env_overrides_file_and_prefers_imds_prefix() {
        let env = HashMap::from([
            ("ENDPOINT", "http://legacy:80"),
            ("IMDS_ENDPOINT", "http://preferred:80"),
            ("IMDS_TOKEN", "AQAEA"),
        ]);
        let mut config = ImdsConfig::default();
        config.apply_env(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.endpoint, "http://preferred:80");
        assert_eq!(config.token.as_deref(), Some("AQAEA"));

        let legacy = HashMap::from([("ENDPOINT", "http://legacy:80")]);
        let mut config = ImdsConfig::default();
        config.apply_env(|key| legacy.get(key).map(ToString::to_string));
        assert_eq!(config.endpoint, "http://legacy:80");
    }

    #[test]
    fn buffer_and_interval_are_clamped() {
        let config = ImdsConfig {
            watch_buffer: 0,
            watch_interval_ms: 0,
            ..ImdsConfig::default()
        };
        assert_eq!(config.watch_buffer(), 1);
        assert_eq!(config.watch_interval(), Duration::from_millis(1));
    }
}
