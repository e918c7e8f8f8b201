//! Network addresses of hosts and services
//!
//! A host is reached through its StatefulSet Service. Fully qualified names
//! append the namespace domain, which defaults to `%s.svc.cluster.local`
//! with `%s` standing for the namespace.

use crate::namer::Namer;
use chop_types::{Cluster, Host, Installation, Shard};
use tracing::debug;

/// Default namespace domain; `%s` is replaced by the namespace
pub const NAMESPACE_DOMAIN_PATTERN: &str = "%s.svc.cluster.local";

/// Scope whose hosts are enumerated relative to one host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FqdnScope {
    Host,
    Shard,
    Cluster,
    Installation,
}

impl Namer {
    /// Domain of `namespace` under the installation's domain pattern
    pub fn namespace_domain(&self, chi: &Installation, namespace: &str) -> String {
        let pattern = chi
            .namespace_domain_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(NAMESPACE_DOMAIN_PATTERN);
        pattern.replacen("%s", namespace, 1)
    }

    pub fn installation_service_fqdn(&self, chi: &Installation) -> String {
        format!(
            "{}.{}",
            self.installation_service_name(chi),
            self.namespace_domain(chi, &chi.namespace)
        )
    }

    /// Fully qualified hostname of a host's pod
    pub fn pod_fqdn(&self, chi: &Installation, host: &Host) -> String {
        format!(
            "{}.{}",
            self.pod_hostname(host),
            self.namespace_domain(chi, &host.address().namespace)
        )
    }

    /// Hostname other replicas use to reach `host`
    ///
    /// Fully qualified when the installation asks replicas to use FQDNs,
    /// otherwise the namespace-local Service name.
    pub fn instance_hostname(&self, chi: &Installation, host: &Host) -> String {
        if chi.replicas_use_fqdn() {
            self.pod_fqdn(chi, host)
        } else {
            self.pod_hostname(host)
        }
    }

    pub fn fqdns_of_installation(&self, chi: &Installation) -> Vec<String> {
        chi.hosts().map(|host| self.pod_fqdn(chi, host)).collect()
    }

    pub fn fqdns_of_cluster(&self, chi: &Installation, cluster: &Cluster) -> Vec<String> {
        cluster.hosts().map(|host| self.pod_fqdn(chi, host)).collect()
    }

    pub fn fqdns_of_shard(&self, chi: &Installation, shard: &Shard) -> Vec<String> {
        shard.hosts().map(|host| self.pod_fqdn(chi, host)).collect()
    }

    /// FQDNs of every host in `scope` around `host`, optionally without `host` itself
    ///
    /// The shard and cluster are located through the host's address; a host
    /// whose address does not point into `chi` yields an empty list.
    pub fn fqdns(
        &self,
        chi: &Installation,
        host: &Host,
        scope: FqdnScope,
        exclude_self: bool,
    ) -> Vec<String> {
        let address = host.address();
        let cluster = chi.cluster(address.cluster_index);

        let mut fqdns = match scope {
            FqdnScope::Host => vec![self.pod_fqdn(chi, host)],
            FqdnScope::Shard => match cluster.and_then(|c| c.shard(address.shard_index)) {
                Some(shard) => self.fqdns_of_shard(chi, shard),
                None => Vec::new(),
            },
            FqdnScope::Cluster => match cluster {
                Some(cluster) => self.fqdns_of_cluster(chi, cluster),
                None => Vec::new(),
            },
            FqdnScope::Installation => self.fqdns_of_installation(chi),
        };

        if fqdns.is_empty() && scope != FqdnScope::Installation {
            debug!(
                host = %host.name,
                ?scope,
                "Host address does not resolve inside installation"
            );
        }

        if exclude_self {
            let own = self.pod_fqdn(chi, host);
            fqdns.retain(|fqdn| *fqdn != own);
        }
        fqdns
    }
}
