//! Configuration for the operator

use chop_naming::LengthBudgets;
use chop_normalizer::Options;
use chop_observability::{LoggingConfig, MetricsConfig};
use serde::{Deserialize, Serialize};

/// Main operator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Name generation
    #[serde(default)]
    pub naming: NamingConfig,

    /// Normalization options
    #[serde(default)]
    pub normalization: Options,

    /// Schema planning
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Metrics publishing
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Naming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Per-level length budgets for names and labels
    #[serde(default)]
    pub budgets: LengthBudgets,

    /// Template of the regexp matching pod hostnames of one installation
    #[serde(default = "default_pod_hostname_regexp")]
    pub pod_hostname_regexp: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            budgets: LengthBudgets::default(),
            pod_hostname_regexp: default_pod_hostname_regexp(),
        }
    }
}

/// Schema planning configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Maximum number of hosts planned at the same time
    #[serde(default = "default_max_concurrent_hosts")]
    pub max_concurrent_hosts: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_concurrent_hosts: default_max_concurrent_hosts(),
        }
    }
}

// Default value helpers
fn default_pod_hostname_regexp() -> String {
    r"chi-{chi}-[^.]+\d+-\d+\.{namespace}\.svc\.cluster\.local$".to_string()
}

fn default_max_concurrent_hosts() -> usize {
    4
}

impl OperatorConfig {
    /// Load configuration from file
    ///
    /// Sources, later ones winning: built-in defaults, the optional file,
    /// `CHOP_`-prefixed environment variables with `__` between sections.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&OperatorConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with CHOP_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("CHOP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = OperatorConfig::default();
        assert_eq!(config.naming.budgets, LengthBudgets::default());
        assert_eq!(config.schema.max_concurrent_hosts, 4);
        assert_eq!(config.logging.level, "info");
        assert!(!config.normalization.replicas_use_fqdn);
    }

    #[test]
    fn test_load_without_file() {
        let config = OperatorConfig::load(None).unwrap();
        assert_eq!(config.naming, NamingConfig::default());
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = OperatorConfig::load(Some("/nonexistent/chop-operator")).unwrap();
        assert_eq!(config.schema, SchemaConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "normalization:\n  replicas_use_fqdn: true\n  cluster_cycle_size: 3\nlogging:\n  json: true\nschema:\n  max_concurrent_hosts: 1\n"
        )
        .unwrap();

        let config = OperatorConfig::load(file.path().to_str()).unwrap();
        assert!(config.normalization.replicas_use_fqdn);
        assert_eq!(config.normalization.cluster_cycle_size, 3);
        assert_eq!(config.normalization.installation_cycle_size, 0);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.schema.max_concurrent_hosts, 1);
    }
}
