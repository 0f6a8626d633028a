//! Mail exchanger lookup for relaying.
//!
//! Only the single best (lowest preference) exchanger is used; there is no
//! fallback to other MX hosts or to A/AAAA records, and no caching.

use hickory_resolver::Resolver;
use tracing::debug;

use crate::delivery::error::DnsError;

/// Finds the mail exchanger responsible for a domain
pub trait MxResolver: Send + Sync {
    /// Hostname of the best-priority mail exchanger for `domain`
    fn resolve_mx(&self, domain: &str) -> Result<String, DnsError>;
}

impl<F> MxResolver for F
where
    F: Fn(&str) -> Result<String, DnsError> + Send + Sync,
{
    fn resolve_mx(&self, domain: &str) -> Result<String, DnsError> {
        self(domain)
    }
}

/// Pick the host with the lowest preference value.
///
/// Ties keep the first record seen. A null MX (exchange `.`) means the domain
/// accepts no mail and is skipped.
pub fn best_exchanger<I, S>(records: I) -> Option<String>
where
    I: IntoIterator<Item = (u16, S)>,
    S: AsRef<str>,
{
    records
        .into_iter()
        .filter_map(|(preference, host)| {
            let host = host.as_ref().trim_end_matches('.');
            (!host.is_empty()).then(|| (preference, host.to_owned()))
        })
        .min_by_key(|(preference, _)| *preference)
        .map(|(_, host)| host)
}

/// Resolves MX records with the system's DNS configuration
pub struct HickoryMxResolver {
    resolver: Resolver,
}

impl HickoryMxResolver {
    /// Build a resolver from `/etc/resolv.conf` (or the platform equivalent)
    pub fn from_system_conf() -> std::io::Result<Self> {
        Ok(Self {
            resolver: Resolver::from_system_conf()?,
        })
    }
}

impl MxResolver for HickoryMxResolver {
    fn resolve_mx(&self, domain: &str) -> Result<String, DnsError> {
        let lookup = self.resolver.mx_lookup(domain)?;

        let records = lookup.iter().map(|mx| {
            let host = mx.exchange().to_utf8();
            debug!("Found MX record: {host} (priority: {})", mx.preference());
            (mx.preference(), host)
        });

        best_exchanger(records).ok_or_else(|| DnsError::NoMailExchanger(domain.to_owned()))
    }
}
