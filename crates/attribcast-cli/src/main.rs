//! Attribcast CLI tool.
//!
//! Runs the attribution engine over JSON event batches: single-conversion
//! attribution, model comparison, batch runs, and ground-truth validation.

use anyhow::Context;
use attribcast_attribution::engine::AttributionEngine;
use attribcast_attribution::types::GroundTruthSample;
use attribcast_core::config::EngineConfig;
use attribcast_core::events::EventBatch;
use attribcast_core::registry::ModelRegistry;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "attribcast")]
#[command(version, about = "Podcast sponsorship attribution engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration file (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered attribution models
    Models,

    /// Show model registry statistics
    Stats,

    /// Attribute one conversion under a model
    Attribute {
        /// Event batch file (JSON with touchpoints and conversions)
        #[arg(short, long)]
        events: PathBuf,

        /// Conversion id to attribute
        #[arg(long)]
        conversion: Uuid,

        /// Model name (e.g. time_decay)
        #[arg(short, long, default_value = "last_touch")]
        model: String,
    },

    /// Attribute one conversion under several models side by side
    Compare {
        /// Event batch file (JSON with touchpoints and conversions)
        #[arg(short, long)]
        events: PathBuf,

        /// Conversion id to attribute
        #[arg(long)]
        conversion: Uuid,

        /// Model names
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,
    },

    /// Attribute every conversion in a batch under one model
    Batch {
        /// Event batch file (JSON with touchpoints and conversions)
        #[arg(short, long)]
        events: PathBuf,

        /// Model name
        #[arg(short, long, default_value = "last_touch")]
        model: String,
    },

    /// Measure model accuracy against ground-truth samples
    Validate {
        /// Ground-truth sample file (JSON)
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// Model names; all registered models when omitted
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let registry = ModelRegistry::with_defaults();
    let engine = AttributionEngine::new(config, registry)?;

    match cli.command {
        Commands::Models => {
            for entry in engine.registry().entries() {
                println!("{:<16} {}", entry.kind.as_str(), entry.description);
            }
        }
        Commands::Stats => {
            let stats = engine.registry().stats();
            println!("Registered models: {}", stats.total);
            for name in stats.names {
                println!("  {name}");
            }
        }
        Commands::Attribute {
            events,
            conversion,
            model,
        } => {
            let ctx = engine.prepare(load_batch(&events)?);
            let outcome = engine.compute_attribution(&ctx, conversion, &model)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Compare {
            events,
            conversion,
            models,
        } => {
            let ctx = engine.prepare(load_batch(&events)?);
            let outcomes = engine.compare_models(&ctx, conversion, &models)?;
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        Commands::Batch { events, model } => {
            let ctx = engine.prepare(load_batch(&events)?);
            let report = engine.run_batch(&ctx, &model)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Validate {
            ground_truth,
            models,
        } => {
            let samples = load_samples(&ground_truth)?;
            let names = if models.is_empty() {
                engine.registry().names()
            } else {
                models
            };
            let results = engine.run_validation(&samples, &names)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load_batch(path: &Path) -> anyhow::Result<EventBatch> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading event batch {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing event batch {}", path.display()))
}

fn load_samples(path: &Path) -> anyhow::Result<Vec<GroundTruthSample>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading ground truth {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing ground truth {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_defaults_when_omitted() {
        let config = load_config(None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut config = EngineConfig::default();
        config.lookback_days = 14;
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = load_config(Some(file.path())).unwrap();
        assert_eq!(loaded.lookback_days, 14);
    }

    #[test]
    fn test_load_batch_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"touchpoints\": [], \"conversions\": []}}").unwrap();
        let batch = load_batch(file.path()).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_load_batch_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_batch(file.path()).is_err());
    }
}
