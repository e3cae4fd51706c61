//! `/etc/resolv.conf` control for Linux and other plain unix systems.
//!
//! Apply copies the current file to `<path>.bak.<YYYYmmdd_HHMMSS>` and then
//! rewrites it in place. In-place rather than rename, because the file is
//! often a bind mount or a symlink into `/run`.

use super::{run_output, ApplyOutcome, DnsConfigurator};
use crate::dns::Provider;
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub(crate) const ETC_RESOLV_CONF: &str = "/etc/resolv.conf";

const RESOLVED_UNIT: &str = "systemd-resolved";

/// Rewrites a `resolv.conf` file.
#[derive(Debug, Clone)]
pub struct ResolvConf {
    path: PathBuf,
}

impl Default for ResolvConf {
    fn default() -> Self {
        Self::at(ETC_RESOLV_CONF)
    }
}

impl ResolvConf {
    /// Control the file at `path` instead of `/etc/resolv.conf`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the controlled file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, now: &DateTime<Local>) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(format!(".bak.{}", now.format("%Y%m%d_%H%M%S")));
        PathBuf::from(name)
    }

    fn backup(&self, now: &DateTime<Local>) -> Result<PathBuf> {
        let backup = self.backup_path(now);
        fs::copy(&self.path, &backup)?;
        tracing::debug!("Backed up {} to {}", self.path.display(), backup.display());
        Ok(backup)
    }
}

/// Contents written for `provider`.
pub(crate) fn render(provider: &Provider, now: &DateTime<Local>) -> String {
    let mut text = format!("# Updated on {}\n", now.format("%Y-%m-%d %H:%M:%S"));

    if !provider.is_reset() {
        text.push_str(&format!("# Provider: {}\n", provider.name));
    }

    for server in &provider.servers {
        text.push_str(&format!("nameserver {server}\n"));
    }

    if !provider.is_reset() {
        text.push_str("options edns0 trust-ad\n");
    }

    text
}

/// Nameserver addresses listed in `text`.
pub(crate) fn parse_nameservers(text: &str) -> Result<Vec<String>> {
    let parsed = ::resolv_conf::Config::parse(text)
        .map_err(|e| Error::parse(format!("resolv.conf: {e}")))?;
    Ok(parsed.nameservers.iter().map(ToString::to_string).collect())
}

impl DnsConfigurator for ResolvConf {
    fn name(&self) -> &'static str {
        "resolv.conf"
    }

    fn read_current_servers(&self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.path)?;
        parse_nameservers(&text)
    }

    fn apply(&self, provider: &Provider) -> Result<ApplyOutcome> {
        let now = Local::now();
        let backup = self.backup(&now)?;

        fs::write(&self.path, render(provider, &now))?;
        tracing::info!(
            "Wrote {} for {} (backup: {})",
            self.path.display(),
            provider.name,
            backup.display()
        );

        Ok(ApplyOutcome {
            backup: Some(backup),
        })
    }

    fn restart_resolver_service(&self) -> Result<()> {
        let active = Command::new("systemctl")
            .args(["is-active", "--quiet", RESOLVED_UNIT])
            .status()
            .is_ok_and(|status| status.success());

        if !active {
            tracing::debug!("{RESOLVED_UNIT} is not active, nothing to restart");
            return Ok(());
        }

        run_output("systemctl", ["restart", RESOLVED_UNIT])?;
        tracing::info!("{RESOLVED_UNIT} restarted");
        Ok(())
    }

    fn privilege_hint(&self) -> &'static str {
        "Run it as root: sudo dnswitch"
    }
}
