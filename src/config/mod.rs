//! Configuration module.
//!
//! This module provides the tool's tunable settings and the loader
//! that reads them from disk.

pub mod loader;

pub use loader::{ConfigLoader, ProviderEntry, Settings};
