//! chopctl - offline view of what the operator derives from a specification
//!
//! Reads an installation specification, normalizes it and prints the
//! resulting topology: addresses, resource names and FQDNs.

use anyhow::Context;
use chop_observability::init_tracing;
use chop_operator::{OperatorConfig, OutputFormat, Reconciler};
use clap::{Parser, Subcommand};

/// CHOP command line
#[derive(Parser)]
#[command(name = "chopctl")]
#[command(about = "Inspect the topology derived from an installation specification", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CHOP_CONFIG")]
    config: Option<String>,

    /// Log level, overriding the configuration
    #[arg(long, env = "CHOP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the normalized installation
    Normalize {
        /// Specification file (YAML or JSON)
        spec: String,
    },

    /// Print every name derived for the installation
    Names {
        /// Specification file (YAML or JSON)
        spec: String,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = OperatorConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging)?;

    let output = match cli.command {
        Command::Config => cli.format.encode(&config)?,
        Command::Normalize { spec } => {
            let source = read_spec(&spec)?;
            let mut reconciler = Reconciler::new(config);
            let chi = reconciler.normalize_yaml(&source)?;
            cli.format.encode(&chi)?
        }
        Command::Names { spec } => {
            let source = read_spec(&spec)?;
            let mut reconciler = Reconciler::new(config);
            let chi = reconciler.normalize_yaml(&source)?;
            cli.format.encode(&reconciler.topology(&chi))?
        }
    };

    println!("{output}");
    Ok(())
}

fn read_spec(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading specification {path}"))
}
