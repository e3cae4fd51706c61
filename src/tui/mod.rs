//! Terminal User Interface (TUI) module.
//!
//! Two screens built on `ratatui`: the provider selector (with custom
//! server entry) and the monitoring dashboard.

mod app;
pub mod dashboard;
pub mod selector;
pub mod view;

pub use app::{run_dashboard, run_selector};
pub use dashboard::{Dashboard, DashboardAction, DashboardExit};
pub use selector::{parse_custom_dns, Selector, SelectorExit, SelectorMode};
