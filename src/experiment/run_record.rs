//! Run Record - one scheduled shot condition of an experiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExperimentId, RecipeId, RunId};
use crate::replicate::ReplicateKey;

/// Run Record represents a single planned run of an experiment.
///
/// Runs are created in bulk by the materializer and destroyed only when the
/// experiment's run set is regenerated. Operators later flip `done` and
/// `excluded_from_analysis`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: RunId,
    experiment_id: ExperimentId,
    order: u32,
    code: String,
    recipe_id: Option<RecipeId>,
    replicate_key: ReplicateKey,
    replicate_index: u32,
    done: bool,
    excluded_from_analysis: bool,
    created_at: DateTime<Utc>,
}

impl RunRecord {
    /// Create a builder with the required fields.
    #[must_use]
    pub fn builder(
        run_id: RunId,
        experiment_id: ExperimentId,
        order: u32,
        code: impl Into<String>,
    ) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id, experiment_id, order, code)
    }

    /// Get the run ID.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Get the parent experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> ExperimentId {
        self.experiment_id
    }

    /// Get the 1-based run order.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Get the run code (e.g. `E4-R012`).
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the recipe this run is molded with, if any.
    #[must_use]
    pub const fn recipe_id(&self) -> Option<RecipeId> {
        self.recipe_id
    }

    /// Get the replicate key.
    #[must_use]
    pub const fn replicate_key(&self) -> &ReplicateKey {
        &self.replicate_key
    }

    /// Get the 1-based replicate index.
    #[must_use]
    pub const fn replicate_index(&self) -> u32 {
        self.replicate_index
    }

    /// Whether the operator marked the run as done.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.done
    }

    /// Whether the run is excluded from analysis.
    #[must_use]
    pub const fn excluded_from_analysis(&self) -> bool {
        self.excluded_from_analysis
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Update the operator status flags.
    pub fn set_status(&mut self, done: bool, excluded_from_analysis: bool) {
        self.done = done;
        self.excluded_from_analysis = excluded_from_analysis;
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    run_id: RunId,
    experiment_id: ExperimentId,
    order: u32,
    code: String,
    recipe_id: Option<RecipeId>,
    replicate_key: ReplicateKey,
    replicate_index: u32,
    created_at: DateTime<Utc>,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_id: RunId, experiment_id: ExperimentId, order: u32, code: impl Into<String>) -> Self {
        Self {
            run_id,
            experiment_id,
            order,
            code: code.into(),
            recipe_id: None,
            replicate_key: ReplicateKey::default(),
            replicate_index: 1,
            created_at: Utc::now(),
        }
    }

    /// Set the recipe.
    #[must_use]
    pub const fn recipe_id(mut self, recipe_id: Option<RecipeId>) -> Self {
        self.recipe_id = recipe_id;
        self
    }

    /// Set the replicate key and index.
    #[must_use]
    pub fn replicate(mut self, key: ReplicateKey, index: u32) -> Self {
        self.replicate_key = key;
        self.replicate_index = index;
        self
    }

    /// Set a custom creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `RunRecord`, not done and included in analysis.
    #[must_use]
    pub fn build(self) -> RunRecord {
        RunRecord {
            run_id: self.run_id,
            experiment_id: self.experiment_id,
            order: self.order,
            code: self.code,
            recipe_id: self.recipe_id,
            replicate_key: self.replicate_key,
            replicate_index: self.replicate_index,
            done: false,
            excluded_from_analysis: false,
            created_at: self.created_at,
        }
    }
}
