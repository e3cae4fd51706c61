//! DNS resolution probing.
//!
//! A probe sends one hostname lookup straight to a single DNS server and
//! measures how long the answer takes. Failures are not errors here: they
//! come back as `None` so callers can render them as "not tested".

#![allow(clippy::missing_errors_doc)]

use crate::config::Settings;
use crate::dns::catalog::ProviderCatalog;
use crate::error::{Error, Result};
use futures::future::join_all;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Standard DNS port.
const DNS_PORT: u16 = 53;

/// Domain looked up by default.
pub const DEFAULT_PROBE_DOMAIN: &str = "google.com";

/// Default timeout for a latency probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default timeout for each post-apply validation lookup.
pub const DEFAULT_VALIDATE_TIMEOUT: Duration = Duration::from_secs(3);

/// Issues timed lookups against individual DNS servers.
///
/// Cheap to clone; the monitor loop keeps its own copy.
///
/// # Example
///
/// ```ignore
/// let prober = Prober::default();
/// if let Some(ms) = prober.probe("1.1.1.1").await {
///     println!("Cloudflare answered in {ms}ms");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Prober {
    domain: String,
    probe_timeout: Duration,
    validate_timeout: Duration,
}

impl Prober {
    /// Create a prober for `domain` with explicit timeouts.
    #[must_use]
    pub fn new(domain: &str, probe_timeout: Duration, validate_timeout: Duration) -> Self {
        // Fully qualified so no search domain gets appended.
        let domain = if domain.ends_with('.') {
            domain.to_string()
        } else {
            format!("{domain}.")
        };

        Self {
            domain,
            probe_timeout,
            validate_timeout,
        }
    }

    /// Create a prober from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.probe_domain,
            settings.probe_timeout(),
            settings.validate_timeout(),
        )
    }

    /// Configured latency-probe timeout.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Probe `server` with the configured probe timeout.
    pub async fn probe(&self, server: &str) -> Option<u64> {
        self.probe_latency(server, self.probe_timeout).await
    }

    /// Look up the probe domain through `server` and return elapsed milliseconds.
    ///
    /// Returns `None` if the address does not parse, the lookup fails, or
    /// `timeout` expires first. Never takes meaningfully longer than `timeout`.
    pub async fn probe_latency(&self, server: &str, timeout: Duration) -> Option<u64> {
        let ip: IpAddr = match server.trim().parse() {
            Ok(ip) => ip,
            Err(_) => {
                tracing::debug!("Not probing {server}: not an IP address");
                return None;
            }
        };

        let resolver = match self.resolver_for(ip, timeout) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Resolver setup for {ip} failed: {e}");
                return None;
            }
        };

        let start = Instant::now();
        let result = tokio::time::timeout(timeout, resolver.lookup_ip(self.domain.as_str())).await;

        match result {
            Ok(Ok(_)) => {
                let elapsed = start.elapsed().as_millis() as u64;
                tracing::trace!("{ip} answered in {elapsed}ms");
                Some(elapsed)
            }
            Ok(Err(e)) => {
                tracing::debug!("Lookup via {ip} failed: {e}");
                None
            }
            Err(_) => {
                tracing::debug!("Lookup via {ip} timed out after {timeout:?}");
                None
            }
        }
    }

    /// Probe the first server of every probeable provider and store the results.
    ///
    /// Reset and add-custom rows are marked untested without being probed.
    pub async fn probe_all(&self, catalog: &mut ProviderCatalog) {
        let targets: Vec<(usize, String)> = catalog
            .providers()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind.is_probeable())
            .filter_map(|(idx, p)| p.primary().map(|s| (idx, s.to_string())))
            .collect();

        for provider in catalog.providers_mut() {
            provider.latency_ms = None;
        }

        tracing::debug!("Probing {} providers", targets.len());

        let results = join_all(
            targets
                .into_iter()
                .map(|(idx, server)| async move { (idx, self.probe(&server).await) }),
        )
        .await;

        let providers = catalog.providers_mut();
        for (idx, latency) in results {
            providers[idx].latency_ms = latency;
        }
    }

    /// Check that every server answers, using the longer validation timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unresponsive`] naming the first server that did not answer.
    pub async fn validate_servers(&self, servers: &[String]) -> Result<()> {
        for server in servers {
            if self
                .probe_latency(server, self.validate_timeout)
                .await
                .is_none()
            {
                return Err(Error::Unresponsive {
                    server: server.clone(),
                });
            }
        }
        Ok(())
    }

    fn resolver_for(&self, ip: IpAddr, timeout: Duration) -> Result<TokioAsyncResolver> {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&[ip], DNS_PORT, true),
        );

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.use_hosts_file = false;

        Ok(TokioAsyncResolver::tokio(config, opts)?)
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROBE_DOMAIN,
            DEFAULT_PROBE_TIMEOUT,
            DEFAULT_VALIDATE_TIMEOUT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::types::Provider;

    #[test]
    fn domain_is_fully_qualified() {
        let prober = Prober::new("example.com", DEFAULT_PROBE_TIMEOUT, DEFAULT_VALIDATE_TIMEOUT);
        assert_eq!(prober.domain, "example.com.");

        let prober = Prober::new("example.com.", DEFAULT_PROBE_TIMEOUT, DEFAULT_VALIDATE_TIMEOUT);
        assert_eq!(prober.domain, "example.com.");
    }

    #[tokio::test]
    async fn probe_rejects_non_ip() {
        let prober = Prober::default();
        assert_eq!(prober.probe("dns.example").await, None);
        assert_eq!(prober.probe("").await, None);
    }

    #[tokio::test]
    async fn unreachable_server_times_out_quickly() {
        let prober = Prober::default();
        let timeout = Duration::from_millis(50);

        let start = Instant::now();
        // TEST-NET-1, never routed.
        let result = prober.probe_latency("192.0.2.1", timeout).await;
        let elapsed = start.elapsed();

        assert_eq!(result, None);
        assert!(
            elapsed < timeout + Duration::from_millis(500),
            "probe took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn probe_all_skips_placeholders() {
        let mut catalog = ProviderCatalog::new(vec![
            Provider::new("Broken", ["not-an-address"]).with_latency(Some(5)),
            Provider::reset().with_latency(Some(1)),
            Provider::add_custom().with_latency(Some(1)),
        ]);

        Prober::default().probe_all(&mut catalog).await;

        assert!(catalog.providers().iter().all(|p| p.latency_ms.is_none()));
    }

    #[tokio::test]
    async fn validation_names_first_unresponsive_server() {
        let prober = Prober::new(
            DEFAULT_PROBE_DOMAIN,
            Duration::from_millis(50),
            Duration::from_millis(50),
        );
        let servers = vec!["bogus".to_string(), "192.0.2.1".to_string()];

        match prober.validate_servers(&servers).await {
            Err(Error::Unresponsive { server }) => assert_eq!(server, "bogus"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_of_empty_list_passes() {
        assert!(Prober::default().validate_servers(&[]).await.is_ok());
    }

    #[tokio::test]
    async fn probe_public_resolver() {
        // Needs outbound DNS which is often blocked in CI
        if std::env::var("CI").is_ok() {
            return;
        }

        let prober = Prober::default();
        if let Some(ms) = prober.probe("1.1.1.1").await {
            assert!(ms <= DEFAULT_PROBE_TIMEOUT.as_millis() as u64);
        }
    }
}
