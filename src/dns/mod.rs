//! DNS module.
//!
//! This module provides DNS-related functionality including:
//! - The provider catalog and its latency ranking
//! - Timed resolution probes against single servers
//! - The periodic monitor for the active provider
//! - Core data types

pub mod catalog;
pub mod monitor;
pub mod probe;
pub mod types;

pub use catalog::ProviderCatalog;
pub use monitor::{Monitor, MonitorStats};
pub use probe::Prober;
pub use types::*;
