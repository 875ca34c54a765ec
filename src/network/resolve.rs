//! Client hostname resolution.
//!
//! A reverse lookup that fails, times out or yields something that is not
//! a usable host falls back to the textual address. IPv6 addresses are
//! bracketed so they stay valid in a `nick!user@host` mask.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::TokioResolver;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use tinyirc_proto::prefix::is_host;
use tracing::debug;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Reverse DNS for connecting clients.
#[derive(Clone)]
pub struct HostResolver {
    resolver: Option<TokioResolver>,
    timeout: Duration,
}

impl HostResolver {
    /// Resolver using the system configuration, or public defaults when that
    /// cannot be read.
    pub fn new() -> Self {
        let resolver = TokioResolver::builder_tokio()
            .map(|b| b.build())
            .unwrap_or_else(|_| {
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            });

        Self {
            resolver: Some(resolver),
            timeout: LOOKUP_TIMEOUT,
        }
    }

    /// A resolver that never looks anything up.
    pub fn disabled() -> Self {
        Self {
            resolver: None,
            timeout: LOOKUP_TIMEOUT,
        }
    }

    pub fn from_flag(enabled: bool) -> Self {
        if enabled { Self::new() } else { Self::disabled() }
    }

    /// Hostname for `ip`, never failing.
    pub async fn hostname(&self, ip: IpAddr) -> String {
        let Some(resolver) = &self.resolver else {
            return ip_host(ip);
        };

        match tokio::time::timeout(self.timeout, resolver.reverse_lookup(ip)).await {
            Ok(Ok(lookup)) => lookup
                .iter()
                .map(|ptr| ptr.to_string().trim_end_matches('.').to_owned())
                .find(|name| is_host(name))
                .unwrap_or_else(|| ip_host(ip)),
            Ok(Err(e)) => {
                debug!(%ip, error = %e, "Reverse lookup failed");
                ip_host(ip)
            }
            Err(_) => {
                debug!(%ip, "Reverse lookup timed out");
                ip_host(ip)
            }
        }
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Textual host for an address: dotted IPv4 or bracketed IPv6.
pub fn ip_host(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => format!("[{v6}]"),
        },
    }
}
