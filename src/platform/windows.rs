//! Windows control through PowerShell's DnsClient cmdlets.

use super::{run_output, ApplyOutcome, DnsConfigurator};
use crate::dns::Provider;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

const PWSH_7: &str = r"C:\Program Files\PowerShell\7\pwsh.exe";
const WINDOWS_POWERSHELL: &str = r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe";
const IPCONFIG: &str = r"C:\Windows\System32\ipconfig.exe";

/// Runs DnsClient cmdlets against the first adapter that is up.
#[derive(Debug, Clone)]
pub struct PowerShell {
    exe: PathBuf,
}

impl PowerShell {
    /// Prefer PowerShell 7 when it is installed.
    #[must_use]
    pub fn locate() -> Self {
        let exe = if Path::new(PWSH_7).exists() {
            PWSH_7
        } else {
            WINDOWS_POWERSHELL
        };
        Self { exe: exe.into() }
    }

    fn command(&self, script: &str) -> Result<String> {
        let exe = self.exe.to_string_lossy().into_owned();
        run_output(&exe, ["-NoProfile", "-Command", script])
    }

    fn active_adapter(&self) -> Result<String> {
        let output = self.command(
            "Get-NetAdapter | Where-Object {$_.Status -eq 'Up'} | Select-Object -First 1 -ExpandProperty Name",
        )?;
        let adapter = output.trim();
        if adapter.is_empty() {
            return Err(Error::NoActiveInterface);
        }
        Ok(adapter.to_string())
    }
}

/// Script that points `adapter` at `provider`.
pub(crate) fn set_servers_script(adapter: &str, provider: &Provider) -> String {
    let adapter = adapter.replace('\'', "''");
    if provider.is_reset() {
        format!("Set-DnsClientServerAddress -InterfaceAlias '{adapter}' -ResetServerAddresses")
    } else {
        format!(
            "Set-DnsClientServerAddress -InterfaceAlias '{adapter}' -ServerAddresses {}",
            provider.servers.join(",")
        )
    }
}

/// Servers from one-address-per-line cmdlet output.
pub(crate) fn parse_server_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

impl DnsConfigurator for PowerShell {
    fn name(&self) -> &'static str {
        "powershell"
    }

    fn read_current_servers(&self) -> Result<Vec<String>> {
        let adapter = self.active_adapter()?.replace('\'', "''");
        let output = self.command(&format!(
            "(Get-DnsClientServerAddress -InterfaceAlias '{adapter}' -AddressFamily IPv4).ServerAddresses"
        ))?;
        Ok(parse_server_lines(&output))
    }

    fn apply(&self, provider: &Provider) -> Result<ApplyOutcome> {
        let adapter = self.active_adapter()?;
        self.command(&set_servers_script(&adapter, provider))?;
        tracing::info!("Set DNS of '{adapter}' to {}", provider.name);
        Ok(ApplyOutcome::default())
    }

    fn restart_resolver_service(&self) -> Result<()> {
        let status = Command::new(IPCONFIG).arg("/flushdns").status()?;
        if !status.success() {
            return Err(Error::command("ipconfig", status.to_string()));
        }
        Ok(())
    }

    fn privilege_hint(&self) -> &'static str {
        "Run PowerShell as Administrator, then run dnswitch.exe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_script_lists_servers() {
        let script = set_servers_script("Ethernet", &Provider::new("Quad9", ["9.9.9.9", "149.112.112.112"]));
        assert_eq!(
            script,
            "Set-DnsClientServerAddress -InterfaceAlias 'Ethernet' -ServerAddresses 9.9.9.9,149.112.112.112"
        );
    }

    #[test]
    fn reset_script_resets() {
        let script = set_servers_script("Wi-Fi", &Provider::reset());
        assert!(script.ends_with("-ResetServerAddresses"));
    }

    #[test]
    fn adapter_quotes_are_escaped() {
        let script = set_servers_script("Bob's LAN", &Provider::reset());
        assert!(script.contains("'Bob''s LAN'"));
    }

    #[test]
    fn parses_crlf_output() {
        assert_eq!(
            parse_server_lines("8.8.8.8\r\n8.8.4.4\r\n"),
            vec!["8.8.8.8", "8.8.4.4"]
        );
        assert!(parse_server_lines("\r\n").is_empty());
    }
}
