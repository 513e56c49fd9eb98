//! Run materializer
//!
//! Expands a generated design into the flat, ordered run list an operator
//! works through, and drives the full regeneration pipeline:
//!
//! ```text
//! FactorConfig ──normalize──► FactorSpec ──generate──► Design
//!                                                        │
//!        recipes × design runs × replicates ◄────────────┘
//!                        │
//!                        ▼
//!                    RunPlan ──replace_runs──► RunStore
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{DesignType, RecipePolicy};
use crate::design::{generate, DesignParams, DesignRun};
use crate::experiment::{ExperimentId, FieldDefinition, FieldId, FieldKind, RecipeId};
use crate::factor::{normalize_factors, FactorConfig};
use crate::replicate::ReplicateKey;
use crate::store::RunStore;
use crate::Result;

/// A value row to create with a planned run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedValue {
    /// Input or output field
    pub field_id: FieldId,
    /// Initial numeric value; empty for outputs
    pub real: Option<f64>,
}

/// A run waiting to be stored; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRun {
    /// 1-based position in the run list
    pub order: u32,
    /// Display code, `E{experiment}-R{order:03}`
    pub code: String,
    /// Recipe the run is made with
    pub recipe_id: Option<RecipeId>,
    /// Fingerprint of the nominal condition
    pub replicate_key: ReplicateKey,
    /// 1-based replicate number within the condition
    pub replicate_index: u32,
    /// One row per input field, then one empty row per output field
    pub values: Vec<PlannedValue>,
}

/// The complete replacement run list of an experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Runs in order
    pub runs: Vec<PlannedRun>,
}

impl RunPlan {
    /// Number of planned runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the plan has no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Run code shown to operators.
#[must_use]
pub fn run_code(experiment_id: ExperimentId, order: u32) -> String {
    format!("E{experiment_id}-R{order:03}")
}

/// Expand design runs into a run plan.
///
/// For each recipe pass of `policy`, each design run and each replicate
/// `1..=replicate_count`, one run is planned with the next order. Input
/// fields take the design value, else the fallback of their stored config,
/// else stay empty. Output fields get an empty row. Analysis fields get
/// nothing. The recipe feeds the replicate key only when blocking.
#[must_use]
pub fn materialize(
    experiment_id: ExperimentId,
    design_runs: &[DesignRun],
    policy: &RecipePolicy,
    replicate_count: u32,
    fields: &[FieldDefinition],
    configs: &[FactorConfig],
) -> RunPlan {
    let inputs: Vec<(FieldId, Option<f64>)> = fields
        .iter()
        .filter(|f| f.kind == FieldKind::Input)
        .map(|f| {
            let fallback = configs
                .iter()
                .find(|c| c.field_id == f.id)
                .and_then(FactorConfig::fallback_value);
            (f.id, fallback)
        })
        .collect();
    let outputs: Vec<FieldId> = fields
        .iter()
        .filter(|f| f.kind == FieldKind::Output)
        .map(|f| f.id)
        .collect();

    let blocking = policy.is_blocking();
    let mut runs = Vec::new();
    let mut order = 0u32;

    for recipe_id in policy.passes() {
        for design_run in design_runs {
            let key_recipe = if blocking { recipe_id } else { None };
            let replicate_key = ReplicateKey::compute(
                design_run.values.iter().map(|(f, v)| (*f, *v)),
                key_recipe,
            );

            for replicate_index in 1..=replicate_count {
                order += 1;
                let values = inputs
                    .iter()
                    .map(|&(field_id, fallback)| PlannedValue {
                        field_id,
                        real: design_run.value(field_id).or(fallback),
                    })
                    .chain(outputs.iter().map(|&field_id| PlannedValue {
                        field_id,
                        real: None,
                    }))
                    .collect();

                runs.push(PlannedRun {
                    order,
                    code: run_code(experiment_id, order),
                    recipe_id,
                    replicate_key: replicate_key.clone(),
                    replicate_index,
                    values,
                });
            }
        }
    }

    RunPlan { runs }
}

/// Outcome of a regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationSummary {
    /// Experiment regenerated
    pub experiment_id: ExperimentId,
    /// Design used
    pub design_type: DesignType,
    /// Rows in the design before recipe and replicate expansion
    pub design_runs: usize,
    /// Runs stored
    pub total_runs: usize,
    /// Recipes the runs were planned with
    pub recipes: Vec<RecipeId>,
}

/// Regenerate every run of an experiment from its stored configuration.
///
/// Loads the experiment, normalizes its active factors, generates the design,
/// materializes it and hands the result to [`RunStore::replace_runs`]. Any
/// failure happens before the stored run set is touched.
///
/// # Errors
///
/// Returns `ExperimentNotFound`, `InvalidConfig`, `InvalidFactorConfig` or
/// `InvalidDesign`, or whatever the store reports.
pub fn regenerate_runs<S: RunStore + ?Sized>(
    store: &S,
    experiment_id: ExperimentId,
) -> Result<RegenerationSummary> {
    let experiment = store.experiment(experiment_id)?;
    let config = experiment.config();
    config.validate()?;

    let fields = store.fields(experiment_id)?;
    let configs = store.factor_configs(experiment_id)?;
    let factors = normalize_factors(&fields, &configs, config.design_type)?;
    let design = generate(config.design_type, &factors, &DesignParams::from(config))?;

    let policy = config.recipe_policy(experiment.recipes());
    let plan = materialize(
        experiment_id,
        &design.runs,
        &policy,
        config.replicate_count,
        &fields,
        &configs,
    );
    let stored = store.replace_runs(experiment_id, plan, &design.metadata())?;

    let summary = RegenerationSummary {
        experiment_id,
        design_type: config.design_type,
        design_runs: design.runs.len(),
        total_runs: stored.len(),
        recipes: policy.passes().into_iter().flatten().collect(),
    };

    info!(
        target: "molding_doe::materialize",
        experiment_id = %experiment_id,
        design = %summary.design_type,
        factors = factors.len(),
        design_runs = summary.design_runs,
        total_runs = summary.total_runs,
        recipes = summary.recipes.len(),
        replicates = config.replicate_count,
        "Regenerated runs"
    );

    Ok(summary)
}
