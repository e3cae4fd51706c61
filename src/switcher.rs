//! Applying a provider to the system.
//!
//! One attempt is: check the addresses and apply (fatal on failure) →
//! restart the resolver service
//! (warning on failure) → re-read the servers → validate every new server
//! (warning on failure, skipped for the reset provider).

#![allow(clippy::missing_errors_doc)]

use crate::dns::{Prober, Provider};
use crate::error::{Error, Result};
use crate::platform::DnsConfigurator;
use std::path::PathBuf;

/// Everything that happened during one successful apply.
#[derive(Debug)]
pub struct SwitchReport {
    /// The provider that was applied
    pub provider: Provider,
    /// Backup written by the configurator, if any
    pub backup: Option<PathBuf>,
    /// Resolver service restart failure, reported as a warning
    pub restart_warning: Option<Error>,
    /// Servers read back after the change
    pub new_servers: Result<Vec<String>>,
    /// Validation of the new servers; `None` when skipped
    pub validation: Option<Result<()>>,
}

impl SwitchReport {
    /// Problems to keep in front of the user while monitoring.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(e) = &self.restart_warning {
            warnings.push(format!("Warning: {e}"));
        }
        if let Err(e) = &self.new_servers {
            warnings.push(format!("Could not read new DNS: {e}"));
        }
        if let Some(Err(e)) = &self.validation {
            warnings.push(format!("Validation failed: {e}"));
        }
        warnings
    }
}

/// Drives a [`DnsConfigurator`] through one switch attempt.
pub struct Switcher<'a> {
    configurator: &'a dyn DnsConfigurator,
    prober: &'a Prober,
}

impl<'a> Switcher<'a> {
    /// Create a switcher over `configurator`, validating with `prober`.
    #[must_use]
    pub fn new(configurator: &'a dyn DnsConfigurator, prober: &'a Prober) -> Self {
        Self {
            configurator,
            prober,
        }
    }

    /// Fail with [`Error::NotPrivileged`] unless the process may change DNS.
    pub fn ensure_privileged(&self) -> Result<()> {
        if self.configurator.is_privileged() {
            Ok(())
        } else {
            Err(Error::NotPrivileged)
        }
    }

    /// Servers the system resolves through right now.
    pub fn current_servers(&self) -> Result<Vec<String>> {
        self.configurator.read_current_servers()
    }

    /// Apply `provider` and report on the follow-up steps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if a server is not an IP address, or the
    /// configurator's error if the apply itself fails. Nothing after the
    /// apply is attempted in either case.
    pub async fn switch(&self, provider: &Provider) -> Result<SwitchReport> {
        provider.ip_addrs()?;

        tracing::info!(
            "Applying {} via {}",
            provider.name,
            self.configurator.name()
        );

        let outcome = self.configurator.apply(provider)?;

        let restart_warning = self.configurator.restart_resolver_service().err();
        if let Some(e) = &restart_warning {
            tracing::warn!("Resolver service restart failed: {e}");
        }

        let new_servers = self.configurator.read_current_servers();

        let validation = if provider.is_reset() {
            None
        } else {
            Some(self.prober.validate_servers(&provider.servers).await)
        };

        Ok(SwitchReport {
            provider: provider.clone(),
            backup: outcome.backup,
            restart_warning,
            new_servers,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::probe::DEFAULT_PROBE_DOMAIN;
    use crate::platform::ApplyOutcome;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeConfigurator {
        privileged: bool,
        fail_apply: bool,
        fail_restart: bool,
        servers: Mutex<Vec<String>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeConfigurator {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DnsConfigurator for FakeConfigurator {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn read_current_servers(&self) -> Result<Vec<String>> {
            self.calls.lock().unwrap().push("read");
            Ok(self.servers.lock().unwrap().clone())
        }

        fn apply(&self, provider: &Provider) -> Result<ApplyOutcome> {
            self.calls.lock().unwrap().push("apply");
            if self.fail_apply {
                return Err(Error::command("fake", "denied"));
            }
            *self.servers.lock().unwrap() = provider.servers.clone();
            Ok(ApplyOutcome {
                backup: Some(PathBuf::from("/tmp/resolv.conf.bak.1")),
            })
        }

        fn restart_resolver_service(&self) -> Result<()> {
            self.calls.lock().unwrap().push("restart");
            if self.fail_restart {
                return Err(Error::command("systemctl", "unit not found"));
            }
            Ok(())
        }

        fn is_privileged(&self) -> bool {
            self.privileged
        }

        fn privilege_hint(&self) -> &'static str {
            "be root"
        }
    }

    fn quick_prober() -> Prober {
        Prober::new(
            DEFAULT_PROBE_DOMAIN,
            Duration::from_millis(50),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn privilege_gate() {
        let prober = quick_prober();
        let denied = FakeConfigurator::default();
        assert!(matches!(
            Switcher::new(&denied, &prober).ensure_privileged(),
            Err(Error::NotPrivileged)
        ));

        let allowed = FakeConfigurator {
            privileged: true,
            ..FakeConfigurator::default()
        };
        assert!(Switcher::new(&allowed, &prober).ensure_privileged().is_ok());
    }

    #[tokio::test]
    async fn apply_failure_aborts_attempt() {
        let fake = FakeConfigurator {
            fail_apply: true,
            ..FakeConfigurator::default()
        };
        let prober = quick_prober();
        let provider = Provider::new("Google", ["8.8.8.8"]);

        let result = Switcher::new(&fake, &prober).switch(&provider).await;

        assert!(matches!(result, Err(Error::Command { .. })));
        assert_eq!(fake.calls(), vec!["apply"]);
    }

    #[tokio::test]
    async fn restart_failure_is_only_a_warning() {
        let fake = FakeConfigurator {
            fail_restart: true,
            ..FakeConfigurator::default()
        };
        let prober = quick_prober();
        let provider = Provider::new("Unrouted", ["192.0.2.1"]);

        let report = Switcher::new(&fake, &prober).switch(&provider).await.unwrap();

        assert!(report.restart_warning.is_some());
        assert_eq!(fake.calls(), vec!["apply", "restart", "read"]);
        assert_eq!(report.new_servers.as_ref().unwrap(), &vec!["192.0.2.1"]);
        assert!(report.warnings()[0].starts_with("Warning: `systemctl` failed"));
        assert_eq!(report.backup, Some(PathBuf::from("/tmp/resolv.conf.bak.1")));
    }

    #[tokio::test]
    async fn validation_failure_names_server() {
        let fake = FakeConfigurator::default();
        let prober = quick_prober();
        let provider = Provider::new("Unrouted", ["192.0.2.1"]);

        let report = Switcher::new(&fake, &prober).switch(&provider).await.unwrap();

        assert_eq!(
            report.warnings(),
            vec!["Validation failed: DNS server 192.0.2.1 is not responding"]
        );
        match report.validation {
            Some(Err(Error::Unresponsive { server })) => assert_eq!(server, "192.0.2.1"),
            other => panic!("unexpected validation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_ip_servers_never_reach_the_system() {
        let fake = FakeConfigurator::default();
        let prober = quick_prober();
        let provider = Provider::custom(vec!["1.1.1.1;Stop-Computer".into()]);

        let result = Switcher::new(&fake, &prober).switch(&provider).await;

        assert!(matches!(result, Err(Error::Parse(_))));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn reset_skips_validation() {
        let fake = FakeConfigurator::default();
        let prober = quick_prober();

        let report = Switcher::new(&fake, &prober)
            .switch(&Provider::reset())
            .await
            .unwrap();

        assert!(report.validation.is_none());
        assert!(report.restart_warning.is_none());
        assert!(report.warnings().is_empty());
    }
}
