//! macOS control through `networksetup`.

use super::{run_output, ApplyOutcome, DnsConfigurator};
use crate::dns::Provider;
use crate::error::{Error, Result};

const NETWORKSETUP: &str = "networksetup";

/// Drives `networksetup` against the active network service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkSetup;

impl NetworkSetup {
    fn active_service(self) -> Result<String> {
        let listing = run_output(NETWORKSETUP, ["-listallnetworkservices"])?;
        pick_active_service(&listing).ok_or(Error::NoActiveInterface)
    }
}

/// Choose the service to configure from `-listallnetworkservices` output.
///
/// Disabled services are prefixed with `*`. Wi-Fi and Ethernet win over
/// anything else; otherwise the first enabled service is used.
pub(crate) fn pick_active_service(listing: &str) -> Option<String> {
    let enabled: Vec<&str> = listing
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('*') && !s.starts_with("An asterisk"))
        .collect();

    enabled
        .iter()
        .find(|s| s.contains("Wi-Fi") || s.contains("Ethernet"))
        .or_else(|| enabled.first())
        .map(|s| (*s).to_string())
}

/// Servers from `-getdnsservers <service>` output.
pub(crate) fn parse_dns_servers(output: &str) -> Vec<String> {
    let output = output.trim();
    if output.starts_with("There aren't any DNS Servers set on") {
        return Vec::new();
    }
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Arguments to `networksetup` that point `service` at `provider`.
pub(crate) fn set_servers_args(service: &str, provider: &Provider) -> Vec<String> {
    let mut args = vec!["-setdnsservers".to_string(), service.to_string()];
    if provider.is_reset() {
        args.push("empty".to_string());
    } else {
        args.extend(provider.servers.iter().cloned());
    }
    args
}

impl DnsConfigurator for NetworkSetup {
    fn name(&self) -> &'static str {
        "networksetup"
    }

    fn read_current_servers(&self) -> Result<Vec<String>> {
        let service = self.active_service()?;
        let output = run_output(NETWORKSETUP, ["-getdnsservers", service.as_str()])?;
        Ok(parse_dns_servers(&output))
    }

    fn apply(&self, provider: &Provider) -> Result<ApplyOutcome> {
        let service = self.active_service()?;
        run_output(NETWORKSETUP, set_servers_args(&service, provider))?;
        tracing::info!("Set DNS of '{service}' to {}", provider.name);
        Ok(ApplyOutcome::default())
    }

    fn restart_resolver_service(&self) -> Result<()> {
        Ok(())
    }

    fn privilege_hint(&self) -> &'static str {
        "Run it as root: sudo dnswitch"
    }
}
