//! dnswitch - switch the system DNS provider from the terminal.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Probing DNS providers by timing a real A/AAAA lookup
//! - Applying a provider to the system resolver (Linux, macOS, Windows)
//! - Monitoring the active provider from a live dashboard
//!
//! # Library Usage
//!
//! ```ignore
//! use dnswitch::{platform, Prober, ProviderCatalog, Switcher};
//!
//! let prober = Prober::default();
//! let mut catalog = ProviderCatalog::builtin();
//! prober.probe_all(&mut catalog).await;
//! catalog.sort_by_latency();
//!
//! let configurator = platform::detect();
//! let report = Switcher::new(configurator.as_ref(), &prober)
//!     .switch(&catalog.providers()[0])
//!     .await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Interactive switcher (default, needs root/Administrator)
//! sudo dnswitch
//!
//! # Probe every provider
//! dnswitch list --sort --format json
//!
//! # Show the servers in use
//! dnswitch current
//! ```

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod platform;
pub mod switcher;
pub mod tui;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, Settings};
pub use dns::{LatencyBand, Monitor, MonitorStats, Prober, Provider, ProviderCatalog, ProviderKind};
pub use error::{Error, Result};
pub use platform::DnsConfigurator;
pub use switcher::{SwitchReport, Switcher};
