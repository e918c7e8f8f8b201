//! Naming contexts and their length budgets
//!
//! A name part is truncated to the budget of its hierarchy level under the
//! active context. `names` keeps object names short enough to be combined;
//! `labels` allows the full label-value ceiling of the platform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform ceiling for a metadata label value
pub const LABEL_VALUE_MAX_LEN: usize = 63;

/// Selects which budget column applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingContext {
    Labels,
    #[default]
    Names,
}

impl fmt::Display for NamingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingContext::Labels => f.write_str("labels"),
            NamingContext::Names => f.write_str("names"),
        }
    }
}

/// Hierarchy level a name part belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameLevel {
    Installation,
    Cluster,
    Shard,
    /// Replica and host parts share this budget
    Replica,
}

/// Budget of each level under one context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBudgets {
    pub installation: usize,
    pub cluster: usize,
    pub shard: usize,
    pub replica: usize,
}

impl LevelBudgets {
    pub fn get(&self, level: NameLevel) -> usize {
        match level {
            NameLevel::Installation => self.installation,
            NameLevel::Cluster => self.cluster,
            NameLevel::Shard => self.shard,
            NameLevel::Replica => self.replica,
        }
    }
}

/// Length budget table keyed by (level, context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBudgets {
    pub names: LevelBudgets,
    pub labels: LevelBudgets,
}

impl Default for LengthBudgets {
    fn default() -> Self {
        Self {
            names: LevelBudgets {
                installation: 60,
                cluster: 15,
                shard: 15,
                replica: 15,
            },
            labels: LevelBudgets {
                installation: LABEL_VALUE_MAX_LEN,
                cluster: LABEL_VALUE_MAX_LEN,
                shard: LABEL_VALUE_MAX_LEN,
                replica: LABEL_VALUE_MAX_LEN,
            },
        }
    }
}

impl LengthBudgets {
    pub fn budget(&self, level: NameLevel, context: NamingContext) -> usize {
        match context {
            NamingContext::Names => self.names.get(level),
            NamingContext::Labels => self.labels.get(level),
        }
    }
}
