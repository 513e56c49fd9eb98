//! Experiment design parameters
//!
//! The parameters an operator sets on an experiment before generating runs.
//! Missing fields take the defaults used by the planning workflow
//! (3 center points, at most 200 design runs, one replicate, no blocking).

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::experiment::RecipeId;
use crate::{Error, Result};

/// Default number of center-point runs
pub const DEFAULT_CENTER_POINTS: u32 = 3;

/// Default cap on design runs
pub const DEFAULT_MAX_RUNS: u32 = 200;

/// Default replicate count
pub const DEFAULT_REPLICATE_COUNT: u32 = 1;

/// Design algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignType {
    /// Low/high screening with center points
    #[serde(rename = "SCREEN")]
    Screening,
    /// Full or fractional factorial
    #[serde(rename = "FFA")]
    Factorial,
    /// Box-Behnken response surface
    #[serde(rename = "BBD")]
    BoxBehnken,
    /// Monte Carlo sampling
    #[serde(rename = "SIM")]
    Simulation,
}

impl DesignType {
    /// Stored code (`SCREEN`, `FFA`, `BBD`, `SIM`)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Screening => "SCREEN",
            Self::Factorial => "FFA",
            Self::BoxBehnken => "BBD",
            Self::Simulation => "SIM",
        }
    }
}

impl fmt::Display for DesignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const fn default_center_points() -> u32 {
    DEFAULT_CENTER_POINTS
}

const fn default_max_runs() -> u32 {
    DEFAULT_MAX_RUNS
}

const fn default_replicate_count() -> u32 {
    DEFAULT_REPLICATE_COUNT
}

/// Per-experiment design parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Design algorithm
    pub design_type: DesignType,
    /// Seed for every sampling step
    #[serde(default)]
    pub seed: u64,
    /// Center-point runs (Screening, Box-Behnken)
    #[serde(default = "default_center_points")]
    pub center_points: u32,
    /// Cap on design runs before replicate/recipe expansion
    #[serde(default = "default_max_runs")]
    pub max_runs: u32,
    /// Replicates per design run
    #[serde(default = "default_replicate_count")]
    pub replicate_count: u32,
    /// Treat recipe identity as a blocking variable
    #[serde(default)]
    pub recipe_as_block: bool,
}

impl ExperimentConfig {
    /// Config for `design_type` with every other parameter at its default.
    #[must_use]
    pub const fn new(design_type: DesignType, seed: u64) -> Self {
        Self {
            design_type,
            seed,
            center_points: DEFAULT_CENTER_POINTS,
            max_runs: DEFAULT_MAX_RUNS,
            replicate_count: DEFAULT_REPLICATE_COUNT,
            recipe_as_block: false,
        }
    }

    /// Set the number of center points.
    #[must_use]
    pub const fn with_center_points(mut self, center_points: u32) -> Self {
        self.center_points = center_points;
        self
    }

    /// Set the run cap.
    #[must_use]
    pub const fn with_max_runs(mut self, max_runs: u32) -> Self {
        self.max_runs = max_runs;
        self
    }

    /// Set the replicate count.
    #[must_use]
    pub const fn with_replicates(mut self, replicate_count: u32) -> Self {
        self.replicate_count = replicate_count;
        self
    }

    /// Enable or disable recipe blocking.
    #[must_use]
    pub const fn with_recipe_block(mut self, recipe_as_block: bool) -> Self {
        self.recipe_as_block = recipe_as_block;
        self
    }

    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON and `InvalidConfig` for
    /// out-of-range parameters.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when `max_runs` or `replicate_count` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_runs == 0 {
            return Err(Error::InvalidConfig("max_runs must be at least 1".into()));
        }
        if self.replicate_count == 0 {
            return Err(Error::InvalidConfig(
                "replicate_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve how recipes expand the design for the given selection.
    #[must_use]
    pub fn recipe_policy(&self, recipes: &[RecipeId]) -> RecipePolicy {
        match recipes {
            [] => RecipePolicy::None,
            _ if self.recipe_as_block => RecipePolicy::Block(recipes.to_vec()),
            [single] => RecipePolicy::Single(*single),
            _ => RecipePolicy::None,
        }
    }
}

/// How the recipe selection expands a design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipePolicy {
    /// One pass, runs carry no recipe
    None,
    /// One pass, every run carries this recipe
    Single(RecipeId),
    /// One pass per recipe; recipe is part of the replicate key
    Block(Vec<RecipeId>),
}

impl RecipePolicy {
    /// Recipe attached to each pass over the design.
    #[must_use]
    pub fn passes(&self) -> Vec<Option<RecipeId>> {
        match self {
            Self::None => vec![None],
            Self::Single(id) => vec![Some(*id)],
            Self::Block(ids) => ids.iter().copied().map(Some).collect(),
        }
    }

    /// Whether recipe identity feeds the replicate key.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}
