//! Settings loader.
//!
//! This module provides the tunable settings of the tool and loads them
//! from a JSON file, falling back to built-in defaults.

use crate::dns::monitor::DEFAULT_MONITOR_INTERVAL;
use crate::dns::probe::{DEFAULT_PROBE_DOMAIN, DEFAULT_PROBE_TIMEOUT, DEFAULT_VALIDATE_TIMEOUT};
use crate::dns::Provider;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the settings file inside the config directory.
const SETTINGS_FILE: &str = "config.json";

/// User-defined provider entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderEntry {
    /// Display name
    pub name: String,
    /// Server addresses, primary first
    pub servers: Vec<String>,
}

impl From<ProviderEntry> for Provider {
    fn from(entry: ProviderEntry) -> Self {
        Self::new(entry.name, entry.servers)
    }
}

/// Tunable settings. Every field has a default, so an empty JSON object
/// is a valid settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Timeout of a latency probe in milliseconds
    pub probe_timeout_ms: u64,
    /// Timeout of each post-apply validation lookup in milliseconds
    pub validate_timeout_ms: u64,
    /// Interval between monitor probes in milliseconds
    pub monitor_interval_ms: u64,
    /// Domain looked up by probes
    pub probe_domain: String,
    /// Extra providers listed before the reset and add-custom rows
    pub providers: Vec<ProviderEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            validate_timeout_ms: DEFAULT_VALIDATE_TIMEOUT.as_millis() as u64,
            monitor_interval_ms: DEFAULT_MONITOR_INTERVAL.as_millis() as u64,
            probe_domain: DEFAULT_PROBE_DOMAIN.to_string(),
            providers: Vec::new(),
        }
    }
}

impl Settings {
    /// Probe timeout as a `Duration`.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Validation timeout as a `Duration`.
    #[must_use]
    pub fn validate_timeout(&self) -> Duration {
        Duration::from_millis(self.validate_timeout_ms)
    }

    /// Monitor interval as a `Duration`.
    #[must_use]
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    /// Extra providers converted for the catalog.
    #[must_use]
    pub fn extra_providers(&self) -> Vec<Provider> {
        self.providers.iter().cloned().map(Provider::from).collect()
    }

    /// Check the settings for values the tool cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_ms == 0 {
            return Err(Error::config("probe_timeout_ms must be greater than zero"));
        }
        if self.validate_timeout_ms == 0 {
            return Err(Error::config("validate_timeout_ms must be greater than zero"));
        }
        if self.monitor_interval_ms == 0 {
            return Err(Error::config("monitor_interval_ms must be greater than zero"));
        }
        if self.probe_domain.trim().is_empty() {
            return Err(Error::config("probe_domain must not be empty"));
        }
        for entry in &self.providers {
            if entry.servers.is_empty() {
                return Err(Error::Config(format!(
                    "provider '{}' has no servers",
                    entry.name
                )));
            }
            if let Err(e) = Provider::from(entry.clone()).ip_addrs() {
                return Err(Error::Config(format!("provider '{}': {e}", entry.name)));
            }
        }
        Ok(())
    }
}

/// Settings loader.
///
/// Provides methods to load settings from an explicit file or from the
/// default location in the user's config directory.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds invalid values.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = ConfigLoader::load_from_file("config.json")?;
    /// println!("probing {}", settings.probe_domain);
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `$CONFIG_DIR/dnswitch/config.json`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_default() -> Result<Settings> {
        let path = Self::config_dir().join(SETTINGS_FILE);
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        tracing::debug!("Loading settings from {}", path.display());
        Self::load_from_file(path)
    }

    /// Load from `path` when given, otherwise from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnswitch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_probe_and_monitor_constants() {
        let s = Settings::default();
        assert_eq!(s.probe_timeout(), DEFAULT_PROBE_TIMEOUT);
        assert_eq!(s.validate_timeout(), DEFAULT_VALIDATE_TIMEOUT);
        assert_eq!(s.monitor_interval(), DEFAULT_MONITOR_INTERVAL);
        assert_eq!(s.probe_domain, "google.com");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn empty_object_is_valid() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn load_from_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "monitor_interval_ms": 500,
                "providers": [{{"name": "Home", "servers": ["192.168.1.1"]}}]
            }}"#
        )
        .unwrap();

        let s = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(s.monitor_interval(), Duration::from_millis(500));
        assert_eq!(s.probe_timeout(), DEFAULT_PROBE_TIMEOUT);

        let extra = s.extra_providers();
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].name, "Home");
        assert!(extra[0].latency_ms.is_none());
    }

    #[test]
    fn zero_interval_rejected() {
        let s = Settings {
            monitor_interval_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn provider_without_servers_rejected() {
        let s = Settings {
            providers: vec![ProviderEntry {
                name: "Empty".into(),
                servers: vec![],
            }],
            ..Settings::default()
        };
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("Empty"));
    }

    #[test]
    fn provider_with_non_ip_server_rejected() {
        let s = Settings {
            providers: vec![ProviderEntry {
                name: "Home".into(),
                servers: vec!["192.168.1.1".into(), "1.1.1.1;Stop-Computer".into()],
            }],
            ..Settings::default()
        };
        let err = s.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Home"));
        assert!(err.to_string().contains("Stop-Computer"));
    }

    #[test]
    fn malformed_json_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(file.path()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            ConfigLoader::load(Some(&missing)),
            Err(Error::Io(_))
        ));
    }
}
