//! Normalization options

use serde::{Deserialize, Serialize};

/// Options applied to every normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// `replicasUseFqdn` for installations that leave it unset
    pub replicas_use_fqdn: bool,

    /// Pool size for installation-scope cycle placement; 0 is unbounded
    pub installation_cycle_size: usize,

    /// Pool size for cluster-scope cycle placement; 0 is unbounded
    pub cluster_cycle_size: usize,
}
