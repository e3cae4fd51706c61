//! Provider catalog.
//!
//! Ordered, owned list of DNS providers. The list keeps insertion order
//! until [`ProviderCatalog::sort_by_latency`] is called.

use crate::dns::types::{Provider, ProviderKind};

/// Curated providers shipped with the tool, in display order.
const BUILTIN_PROVIDERS: &[(&str, [&str; 2])] = &[
    ("Shecan", ["178.22.122.100", "185.51.200.2"]),
    ("Radar", ["10.202.10.10", "10.202.10.11"]),
    ("Electro", ["78.157.42.100", "78.157.42.101"]),
    ("Begzar", ["185.55.226.26", "185.55.226.25"]),
    ("DNS Pro", ["87.107.110.109", "87.107.110.110"]),
    ("DynX", ["10.70.95.150", "10.70.95.162"]),
    ("403", ["10.202.10.202", "10.202.10.102"]),
    ("Google", ["8.8.8.8", "8.8.4.4"]),
    ("Cloudflare", ["1.1.1.1", "1.0.0.1"]),
    ("AdGuard", ["94.140.14.14", "94.140.15.15"]),
    ("Quad9", ["9.9.9.9", "149.112.112.112"]),
    ("OpenDNS", ["208.67.222.222", "208.67.220.220"]),
    ("Level3", ["4.2.2.1", "4.2.2.2"]),
    ("Verisign", ["64.6.64.6", "64.6.65.6"]),
    ("UltraDNS", ["156.154.70.1", "156.154.71.1"]),
    ("DNS.WATCH", ["84.200.69.80", "84.200.70.40"]),
    ("Comodo", ["8.26.56.26", "8.20.247.20"]),
    ("CleanBrowsing", ["185.228.168.9", "185.228.169.9"]),
    ("Neustar", ["156.154.70.2", "156.154.71.2"]),
    ("Yandex.DNS", ["77.88.8.8", "77.88.8.1"]),
    ("Freenom World", ["80.80.80.80", "80.80.81.81"]),
];

/// Mutable list of providers scoped to one interactive run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCatalog {
    providers: Vec<Provider>,
}

impl ProviderCatalog {
    /// Create a catalog from an explicit list.
    #[must_use]
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// The curated list followed by the reset and add-custom rows.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_extra(Vec::new())
    }

    /// The curated list plus `extra` providers, inserted before the
    /// reset and add-custom rows.
    #[must_use]
    pub fn with_extra(extra: Vec<Provider>) -> Self {
        let mut providers: Vec<Provider> = BUILTIN_PROVIDERS
            .iter()
            .map(|(name, servers)| Provider::new(*name, *servers))
            .collect();
        providers.extend(extra);
        providers.push(Provider::reset());
        providers.push(Provider::add_custom());
        Self { providers }
    }

    /// All providers in current order.
    #[must_use]
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Mutable access for latency updates.
    pub fn providers_mut(&mut self) -> &mut [Provider] {
        &mut self.providers
    }

    /// Provider at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Provider> {
        self.providers.get(index)
    }

    /// Number of providers, placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Append a user-entered "Custom DNS" provider and return its index.
    pub fn append_custom(&mut self, servers: Vec<String>) -> usize {
        self.providers.push(Provider::custom(servers));
        self.providers.len() - 1
    }

    /// Rank normal providers by latency, keeping placeholders at the tail.
    ///
    /// Normal providers are stable-sorted ascending with untested ones
    /// last; reset and add-custom rows keep their relative order after them.
    pub fn sort_by_latency(&mut self) {
        let (mut normal, special): (Vec<_>, Vec<_>) = std::mem::take(&mut self.providers)
            .into_iter()
            .partition(|p| p.kind == ProviderKind::Normal);

        normal.sort_by_key(|p| p.latency_ms.map_or((1, 0), |ms| (0, ms)));

        normal.extend(special);
        self.providers = normal;
    }
}
