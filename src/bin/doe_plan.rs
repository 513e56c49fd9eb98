//! doe_plan - generate the run list of an experiment plan file
//!
//! Usage: `doe_plan <plan.json>` (see `doe_plan --help`)
//!
//! Reads a plan (experiment config, fields, factor configs, recipes), runs
//! the regeneration pipeline against an in-memory store and prints the runs
//! and design metadata as JSON on stdout. Logging goes to stderr and is
//! controlled by `RUST_LOG` (default `molding_doe=info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use molding_doe::config::ExperimentConfig;
use molding_doe::design::DesignMetadata;
use molding_doe::experiment::{ExperimentId, ExperimentRecord, FieldDefinition, RecipeId, RunSet};
use molding_doe::factor::FactorConfig;
use molding_doe::materialize::{regenerate_runs, RegenerationSummary};
use molding_doe::store::{MemoryRunStore, RunStore};

#[derive(Parser, Debug)]
#[command(name = "doe_plan")]
#[command(version)]
#[command(about = "Generate the run list of an injection-molding experiment plan")]
struct Args {
    /// Path to the plan JSON file
    plan: PathBuf,
}

/// Experiment plan file.
#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default = "default_experiment_id")]
    experiment_id: ExperimentId,
    #[serde(default)]
    name: String,
    config: ExperimentConfig,
    fields: Vec<FieldDefinition>,
    #[serde(default)]
    factors: Vec<FactorConfig>,
    #[serde(default)]
    recipes: Vec<RecipeId>,
}

const fn default_experiment_id() -> ExperimentId {
    ExperimentId(1)
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    summary: RegenerationSummary,
    metadata: Option<DesignMetadata>,
    runs: RunSet,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("molding_doe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = args.plan;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read plan file {}", path.display()))?;
    let plan: PlanFile = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse plan file {}", path.display()))?;

    let store = MemoryRunStore::new();
    let record = ExperimentRecord::builder(plan.experiment_id, plan.name, plan.config)
        .recipes(plan.recipes)
        .build();
    store.insert_experiment(record, plan.fields, plan.factors);

    let summary = regenerate_runs(&store, plan.experiment_id).context("failed to generate runs")?;
    let output = PlanOutput {
        metadata: store.design_metadata(plan.experiment_id)?,
        runs: store.run_set(plan.experiment_id)?,
        summary,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
