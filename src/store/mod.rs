//! Run store - the persistence collaborator of the engine
//!
//! The engine reads experiment configuration through [`RunStore`] and writes
//! exactly one thing: a whole run set, through [`RunStore::replace_runs`].
//! That call is the single transactional boundary of run regeneration:
//! readers observe either the previous run set or the new one, never a mix.
//!
//! # Example
//!
//! ```rust
//! use molding_doe::config::{DesignType, ExperimentConfig};
//! use molding_doe::experiment::{ExperimentId, ExperimentRecord};
//! use molding_doe::store::{MemoryRunStore, RunStore};
//!
//! # fn example() -> molding_doe::Result<()> {
//! let store = MemoryRunStore::new();
//! let experiment = ExperimentRecord::new(
//!     ExperimentId(1),
//!     "Clamp study",
//!     ExperimentConfig::new(DesignType::Screening, 3),
//! );
//! store.insert_experiment(experiment, Vec::new(), Vec::new());
//!
//! assert!(store.run_set(ExperimentId(1))?.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod memory;

pub use memory::MemoryRunStore;

use crate::design::DesignMetadata;
use crate::experiment::{ExperimentId, ExperimentRecord, FieldDefinition, RunId, RunSet, RunValue};
use crate::factor::FactorConfig;
use crate::materialize::RunPlan;
use crate::Result;

/// Storage interface for experiments and their run sets.
pub trait RunStore: Send + Sync {
    /// Get an experiment.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    fn experiment(&self, experiment_id: ExperimentId) -> Result<ExperimentRecord>;

    /// Field definitions of an experiment, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    fn fields(&self, experiment_id: ExperimentId) -> Result<Vec<FieldDefinition>>;

    /// Stored factor configurations of an experiment.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    fn factor_configs(&self, experiment_id: ExperimentId) -> Result<Vec<FactorConfig>>;

    /// Insert or replace the configuration row for one factor.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    fn set_factor_config(&self, experiment_id: ExperimentId, config: FactorConfig) -> Result<()>;

    /// Atomically replace every run and value of an experiment with `plan`,
    /// and store `metadata` alongside. Returns the stored run set.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` before touching anything if the id does
    /// not resolve; on any error the previous run set is left intact.
    fn replace_runs(
        &self,
        experiment_id: ExperimentId,
        plan: RunPlan,
        metadata: &DesignMetadata,
    ) -> Result<RunSet>;

    /// Current run set of an experiment.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    fn run_set(&self, experiment_id: ExperimentId) -> Result<RunSet>;

    /// Metadata of the design that produced the current run set, if any.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    fn design_metadata(&self, experiment_id: ExperimentId) -> Result<Option<DesignMetadata>>;

    /// Update a run's operator flags.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` or `RunNotFound`.
    fn set_run_status(
        &self,
        experiment_id: ExperimentId,
        run_id: RunId,
        done: bool,
        excluded_from_analysis: bool,
    ) -> Result<()>;

    /// Insert or replace an input/output value.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` or `RunNotFound`.
    fn upsert_run_value(&self, experiment_id: ExperimentId, value: RunValue) -> Result<()>;

    /// Insert or replace an analysis field value.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` or `RunNotFound`.
    fn upsert_analysis_value(&self, experiment_id: ExperimentId, value: RunValue) -> Result<()>;
}
