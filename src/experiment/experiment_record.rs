//! Experiment Record - root entity owning the design parameters and recipes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExperimentId, RecipeId};
use crate::config::ExperimentConfig;

/// Experiment Record represents one planned molding study.
///
/// It owns the design parameters and the recipe selection. Factor
/// configurations and field definitions are stored beside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: ExperimentId,
    name: String,
    created_at: DateTime<Utc>,
    config: ExperimentConfig,
    recipes: Vec<RecipeId>,
    notes: Option<String>,
}

impl ExperimentRecord {
    /// Create a new experiment record with no recipes selected.
    #[must_use]
    pub fn new(experiment_id: ExperimentId, name: impl Into<String>, config: ExperimentConfig) -> Self {
        Self {
            experiment_id,
            name: name.into(),
            created_at: Utc::now(),
            config,
            recipes: Vec::new(),
            notes: None,
        }
    }

    /// Create a builder for constructing an experiment record with optional fields.
    #[must_use]
    pub fn builder(
        experiment_id: ExperimentId,
        name: impl Into<String>,
        config: ExperimentConfig,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_id, name, config)
    }

    /// Get the experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> ExperimentId {
        self.experiment_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the design parameters.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Get the selected recipes in selection order.
    #[must_use]
    pub fn recipes(&self) -> &[RecipeId] {
        &self.recipes
    }

    /// Get the operator notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    experiment_id: ExperimentId,
    name: String,
    created_at: DateTime<Utc>,
    config: ExperimentConfig,
    recipes: Vec<RecipeId>,
    notes: Option<String>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(experiment_id: ExperimentId, name: impl Into<String>, config: ExperimentConfig) -> Self {
        Self {
            experiment_id,
            name: name.into(),
            created_at: Utc::now(),
            config,
            recipes: Vec::new(),
            notes: None,
        }
    }

    /// Set the recipe selection. Duplicates are dropped, first occurrence wins.
    #[must_use]
    pub fn recipes(mut self, recipes: impl IntoIterator<Item = RecipeId>) -> Self {
        self.recipes.clear();
        for recipe in recipes {
            if !self.recipes.contains(&recipe) {
                self.recipes.push(recipe);
            }
        }
        self
    }

    /// Set operator notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ExperimentRecord`.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        ExperimentRecord {
            experiment_id: self.experiment_id,
            name: self.name,
            created_at: self.created_at,
            config: self.config,
            recipes: self.recipes,
            notes: self.notes,
        }
    }
}
