//! DNS types and data structures.
//!
//! This module provides the core types used for DNS provider representation
//! and latency classification.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Name of the provider that restores the system default resolver.
pub const RESET_PROVIDER_NAME: &str = "Reset to Default";

/// Name of the placeholder row that opens custom server entry.
pub const ADD_CUSTOM_PROVIDER_NAME: &str = "Add Custom DNS";

/// Name given to providers entered by the user at runtime.
pub const CUSTOM_PROVIDER_NAME: &str = "Custom DNS";

/// Structural role of a provider in the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// A real provider that can be probed and ranked.
    #[default]
    Normal,
    /// Restores the operating system's default DNS behaviour.
    Reset,
    /// Placeholder row; selecting it opens custom entry. Never probed.
    AddCustom,
}

impl ProviderKind {
    /// Check if this provider takes part in latency probing and ranking.
    #[must_use]
    pub fn is_probeable(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// DNS provider information.
///
/// Represents a named provider with its ordered server addresses and
/// the latency measured against its first server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    /// Provider name (e.g., "Cloudflare", "Quad9")
    pub name: String,
    /// Server addresses, primary first
    pub servers: Vec<String>,
    /// Last measured latency in milliseconds. `None` means untested or failed.
    #[serde(default)]
    pub latency_ms: Option<u64>,
    /// Structural role
    #[serde(default)]
    pub kind: ProviderKind,
}

impl Provider {
    /// Create a new, untested provider.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let provider = Provider::new("Cloudflare", ["1.1.1.1", "1.0.0.1"]);
    /// ```
    pub fn new<I, S>(name: impl Into<String>, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            servers: servers.into_iter().map(Into::into).collect(),
            latency_ms: None,
            kind: ProviderKind::Normal,
        }
    }

    /// The provider that restores system default resolution.
    #[must_use]
    pub fn reset() -> Self {
        Self {
            kind: ProviderKind::Reset,
            ..Self::new(RESET_PROVIDER_NAME, ["127.0.0.53"])
        }
    }

    /// The "add custom" placeholder row.
    #[must_use]
    pub fn add_custom() -> Self {
        Self {
            kind: ProviderKind::AddCustom,
            ..Self::new(ADD_CUSTOM_PROVIDER_NAME, Vec::<String>::new())
        }
    }

    /// A user-entered provider.
    #[must_use]
    pub fn custom(servers: Vec<String>) -> Self {
        Self::new(CUSTOM_PROVIDER_NAME, servers)
    }

    /// Builder-style latency setter, mostly useful in tests.
    #[must_use]
    pub fn with_latency(mut self, latency_ms: Option<u64>) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// First server, the one probed and monitored.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.servers.first().map(String::as_str)
    }

    /// Check if this is the reset provider.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.kind == ProviderKind::Reset
    }

    /// Check if this is the add-custom placeholder.
    #[must_use]
    pub fn is_add_custom(&self) -> bool {
        self.kind == ProviderKind::AddCustom
    }

    /// Parse every server address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the first server that is not an IP address.
    pub fn ip_addrs(&self) -> Result<Vec<IpAddr>> {
        self.servers
            .iter()
            .map(|s| {
                s.parse()
                    .map_err(|_| Error::parse(format!("'{s}' is not an IP address")))
            })
            .collect()
    }

    /// Latency band for display.
    #[must_use]
    pub fn band(&self) -> LatencyBand {
        LatencyBand::classify(self.latency_ms)
    }
}

/// Severity banding of a latency measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBand {
    /// Below 20 ms
    Fast,
    /// 20 ms up to 50 ms
    Medium,
    /// 50 ms and above
    Slow,
    /// Untested or failed
    NotTested,
}

impl LatencyBand {
    /// Upper bound (exclusive) of the fast band in milliseconds.
    pub const FAST_BELOW_MS: u64 = 20;
    /// Upper bound (exclusive) of the medium band in milliseconds.
    pub const MEDIUM_BELOW_MS: u64 = 50;

    /// Classify a latency.
    #[must_use]
    pub fn classify(latency_ms: Option<u64>) -> Self {
        match latency_ms {
            None => Self::NotTested,
            Some(ms) if ms < Self::FAST_BELOW_MS => Self::Fast,
            Some(ms) if ms < Self::MEDIUM_BELOW_MS => Self::Medium,
            Some(_) => Self::Slow,
        }
    }
}

/// Render a latency as `12ms` or `N/A`.
#[must_use]
pub fn format_latency(latency_ms: Option<u64>) -> String {
    latency_ms.map_or_else(|| "N/A".to_string(), |ms| format!("{ms}ms"))
}
