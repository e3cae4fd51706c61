//! Error types module.
//!
//! This module defines the error types used throughout the dnswitch application.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.

use thiserror::Error;

/// A specialized `Result` type for dnswitch operations.
///
/// This type is used throughout the crate to handle errors consistently.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnswitch application.
///
/// Each variant represents a different category of error that can occur
/// while reading, applying or validating DNS configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (resolver files, backups, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS resolver construction error
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),

    /// Configuration error (invalid settings, missing files)
    #[error("Config error: {0}")]
    Config(String),

    /// TUI (terminal UI) related error
    #[error("TUI error: {0}")]
    Tui(String),

    /// Parse error (malformed resolver configuration or tool output)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A platform utility could not be run or exited unsuccessfully
    #[error("`{program}` failed: {detail}")]
    Command {
        /// Program that was invoked.
        program: String,
        /// Exit status or stderr.
        detail: String,
    },

    /// No network service or adapter is up
    #[error("no active network interface found")]
    NoActiveInterface,

    /// A DNS server did not answer a validation lookup
    #[error("DNS server {server} is not responding")]
    Unresponsive {
        /// The first server that failed.
        server: String,
    },

    /// The process lacks the privileges to change system DNS
    #[error("administrator privileges are required")]
    NotPrivileged,
}

impl Error {
    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new TUI error with a message.
    #[must_use]
    pub fn tui(msg: impl Into<String>) -> Self {
        Self::Tui(msg.into())
    }

    /// Create a new command error for `program`.
    #[must_use]
    pub fn command(program: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            detail: detail.into(),
        }
    }

    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

impl From<color_eyre::Report> for Error {
    fn from(e: color_eyre::Report) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresponsive_names_server() {
        let err = Error::Unresponsive {
            server: "10.0.0.1".into(),
        };
        assert_eq!(err.to_string(), "DNS server 10.0.0.1 is not responding");
    }

    #[test]
    fn command_error_display() {
        let err = Error::command("networksetup", "exit status: 4");
        assert_eq!(err.to_string(), "`networksetup` failed: exit status: 4");
    }

    #[test]
    fn permission_denied_detection() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(err.is_permission_denied());
        assert!(!Error::NotPrivileged.is_permission_denied());
    }
}
