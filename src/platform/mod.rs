//! Platform-specific control of the system's DNS servers.
//!
//! On Linux we rewrite `/etc/resolv.conf` (keeping a timestamped backup).
//! On macOS we drive `networksetup`, on Windows PowerShell's DnsClient
//! cmdlets. All three sit behind [`DnsConfigurator`]; [`detect`] picks one
//! once at startup.

use crate::dns::Provider;
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

pub mod etc_resolv_conf;
pub mod macos;
pub mod windows;

pub use etc_resolv_conf::ResolvConf;
pub use macos::NetworkSetup;
pub use windows::PowerShell;

/// What an apply did besides changing the servers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Copy of the previous configuration, if one was written.
    pub backup: Option<PathBuf>,
}

/// Reads and changes the resolver configuration of the host.
pub trait DnsConfigurator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Servers the system currently resolves through.
    fn read_current_servers(&self) -> Result<Vec<String>>;

    /// Point the system at `provider`.
    ///
    /// The reset provider restores the platform default instead of writing
    /// explicit servers.
    fn apply(&self, provider: &Provider) -> Result<ApplyOutcome>;

    /// Restart or flush the local resolver service. Best effort.
    fn restart_resolver_service(&self) -> Result<()>;

    /// Whether the process may change system DNS.
    fn is_privileged(&self) -> bool {
        process_is_elevated()
    }

    /// How to get the privileges [`DnsConfigurator::is_privileged`] checks for.
    fn privilege_hint(&self) -> &'static str;
}

/// The configurator for the platform we were built for.
#[must_use]
pub fn detect() -> Box<dyn DnsConfigurator> {
    #[cfg(target_os = "macos")]
    {
        Box::new(NetworkSetup)
    }
    #[cfg(target_os = "windows")]
    {
        Box::new(PowerShell::locate())
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Box::new(ResolvConf::default())
    }
}

#[cfg(unix)]
fn process_is_elevated() -> bool {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(windows)]
fn process_is_elevated() -> bool {
    // Raw disk access is only granted to elevated processes.
    std::fs::File::open(r"\\.\PHYSICALDRIVE0").is_ok()
}

#[cfg(not(any(unix, windows)))]
fn process_is_elevated() -> bool {
    false
}

/// Run `program` and return its stdout, failing on a non-zero exit.
pub(crate) fn run_output<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    tracing::debug!("Running `{program}`");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::command(program, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        return Err(Error::command(program, detail));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_command_error() {
        let err = run_output("dnswitch-definitely-not-a-program", ["--help"]).unwrap_err();
        assert!(
            matches!(err, Error::Command { ref program, .. } if program == "dnswitch-definitely-not-a-program")
        );
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_captured() {
        let out = run_output("echo", ["hello"]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_error() {
        assert!(matches!(
            run_output("false", Vec::<&str>::new()),
            Err(Error::Command { .. })
        ));
    }

    #[test]
    fn detected_configurator_has_hint() {
        let configurator = detect();
        assert!(!configurator.privilege_hint().is_empty());
        assert!(!configurator.name().is_empty());
    }
}
