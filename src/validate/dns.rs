//! System DNS resolver for the optional domain-existence check.

use std::time::Duration;

use hickory_resolver::Resolver;
use tracing::debug;

use super::DnsCheck;
use crate::error::{MailError, Result};

/// Blocking resolver built from the host's DNS configuration.
pub struct SystemResolver {
    resolver: Resolver,
}

impl SystemResolver {
    /// Read the system resolver configuration and apply `timeout` per query.
    pub fn new(timeout: Duration) -> Result<Self> {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| MailError::Resolver(e.to_string()))?;
        opts.timeout = timeout;
        let resolver = Resolver::new(config, opts).map_err(|e| MailError::Resolver(e.to_string()))?;
        Ok(Self { resolver })
    }
}

impl DnsCheck for SystemResolver {
    fn has_mx_or_a(&self, domain: &str) -> bool {
        match self.resolver.mx_lookup(domain) {
            Ok(mx) if mx.iter().next().is_some() => return true,
            Ok(_) => {}
            Err(e) => debug!(domain, error = %e, "MX lookup failed"),
        }

        match self.resolver.ipv4_lookup(domain) {
            Ok(a) => a.iter().next().is_some(),
            Err(e) => {
                debug!(domain, error = %e, "A lookup failed");
                false
            }
        }
    }
}
