//! In-memory run store using `DashMap`.
//!
//! This is the default backend - data is lost on process restart.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use super::RunStore;
use crate::design::DesignMetadata;
use crate::experiment::{
    ExperimentId, ExperimentRecord, FieldDefinition, RunId, RunRecord, RunSet, RunValue,
    StoredRun,
};
use crate::factor::FactorConfig;
use crate::materialize::RunPlan;
use crate::{Error, Result};

/// Everything stored for one experiment.
#[derive(Debug, Clone)]
struct ExperimentEntry {
    record: ExperimentRecord,
    fields: Vec<FieldDefinition>,
    configs: Vec<FactorConfig>,
    runs: RunSet,
    metadata_json: Option<String>,
}

/// In-memory run store keyed by experiment.
///
/// Each experiment lives in one `DashMap` slot, so replacing its run set is a
/// single write under that slot's lock: concurrent readers see the old set or
/// the new one.
///
/// # Example
///
/// ```rust
/// use molding_doe::config::{DesignType, ExperimentConfig};
/// use molding_doe::experiment::{ExperimentId, ExperimentRecord};
/// use molding_doe::store::{MemoryRunStore, RunStore};
///
/// let store = MemoryRunStore::new();
/// store.insert_experiment(
///     ExperimentRecord::new(ExperimentId(7), "Gate study", ExperimentConfig::new(DesignType::Factorial, 1)),
///     Vec::new(),
///     Vec::new(),
/// );
/// assert_eq!(store.len(), 1);
/// assert!(store.experiment(ExperimentId(8)).is_err());
/// ```
pub struct MemoryRunStore {
    experiments: DashMap<ExperimentId, ExperimentEntry>,
    next_run_id: AtomicU64,
}

impl MemoryRunStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            experiments: DashMap::new(),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Number of experiments in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Insert or replace an experiment with its fields and factor configs.
    ///
    /// Any existing run set of the experiment is dropped.
    pub fn insert_experiment(
        &self,
        record: ExperimentRecord,
        fields: Vec<FieldDefinition>,
        configs: Vec<FactorConfig>,
    ) {
        let experiment_id = record.experiment_id();
        self.experiments.insert(
            experiment_id,
            ExperimentEntry {
                record,
                fields,
                configs,
                runs: RunSet::default(),
                metadata_json: None,
            },
        );
    }

    /// Store raw metadata text for an experiment, bypassing serialization.
    ///
    /// # Errors
    ///
    /// Returns `ExperimentNotFound` if the id does not resolve.
    pub fn set_metadata_json(&self, experiment_id: ExperimentId, json: impl Into<String>) -> Result<()> {
        let mut entry = self.entry_mut(experiment_id)?;
        entry.metadata_json = Some(json.into());
        Ok(())
    }

    fn entry(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<dashmap::mapref::one::Ref<'_, ExperimentId, ExperimentEntry>> {
        self.experiments
            .get(&experiment_id)
            .ok_or(Error::ExperimentNotFound(experiment_id))
    }

    fn entry_mut(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<dashmap::mapref::one::RefMut<'_, ExperimentId, ExperimentEntry>> {
        self.experiments
            .get_mut(&experiment_id)
            .ok_or(Error::ExperimentNotFound(experiment_id))
    }

    fn allocate_run_id(&self) -> RunId {
        RunId(self.next_run_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for MemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

fn upsert(values: &mut Vec<RunValue>, value: RunValue) {
    match values.iter_mut().find(|v| v.field_id == value.field_id) {
        Some(slot) => *slot = value,
        None => values.push(value),
    }
}

impl RunStore for MemoryRunStore {
    fn experiment(&self, experiment_id: ExperimentId) -> Result<ExperimentRecord> {
        Ok(self.entry(experiment_id)?.record.clone())
    }

    fn fields(&self, experiment_id: ExperimentId) -> Result<Vec<FieldDefinition>> {
        Ok(self.entry(experiment_id)?.fields.clone())
    }

    fn factor_configs(&self, experiment_id: ExperimentId) -> Result<Vec<FactorConfig>> {
        Ok(self.entry(experiment_id)?.configs.clone())
    }

    fn set_factor_config(&self, experiment_id: ExperimentId, config: FactorConfig) -> Result<()> {
        let mut entry = self.entry_mut(experiment_id)?;
        match entry.configs.iter_mut().find(|c| c.field_id == config.field_id) {
            Some(slot) => *slot = config,
            None => entry.configs.push(config),
        }
        Ok(())
    }

    fn replace_runs(
        &self,
        experiment_id: ExperimentId,
        plan: RunPlan,
        metadata: &DesignMetadata,
    ) -> Result<RunSet> {
        if !self.experiments.contains_key(&experiment_id) {
            return Err(Error::ExperimentNotFound(experiment_id));
        }

        // Build the whole replacement off to the side; the slot is only
        // touched once everything that can fail has succeeded.
        let metadata_json = serde_json::to_string(metadata)?;
        let created_at = Utc::now();
        let runs: Vec<StoredRun> = plan
            .runs
            .into_iter()
            .map(|planned| {
                let run_id = self.allocate_run_id();
                let record = RunRecord::builder(run_id, experiment_id, planned.order, planned.code)
                    .recipe_id(planned.recipe_id)
                    .replicate(planned.replicate_key, planned.replicate_index)
                    .created_at(created_at)
                    .build();
                let values = planned
                    .values
                    .into_iter()
                    .map(|v| RunValue::real(run_id, v.field_id, v.real))
                    .collect();
                StoredRun {
                    record,
                    values,
                    analysis_values: Vec::new(),
                }
            })
            .collect();
        let run_set = RunSet::new(runs);

        let mut entry = self.entry_mut(experiment_id)?;
        let previous = std::mem::replace(&mut entry.runs, run_set.clone());
        entry.metadata_json = Some(metadata_json);
        drop(entry);

        debug!(
            target: "molding_doe::store",
            experiment_id = %experiment_id,
            removed_runs = previous.len(),
            inserted_runs = run_set.len(),
            inserted_values = run_set.value_count(),
            "Replaced run set"
        );

        Ok(run_set)
    }

    fn run_set(&self, experiment_id: ExperimentId) -> Result<RunSet> {
        Ok(self.entry(experiment_id)?.runs.clone())
    }

    fn design_metadata(&self, experiment_id: ExperimentId) -> Result<Option<DesignMetadata>> {
        let entry = self.entry(experiment_id)?;
        Ok(entry
            .metadata_json
            .as_deref()
            .and_then(DesignMetadata::from_json_lenient))
    }

    fn set_run_status(
        &self,
        experiment_id: ExperimentId,
        run_id: RunId,
        done: bool,
        excluded_from_analysis: bool,
    ) -> Result<()> {
        let mut entry = self.entry_mut(experiment_id)?;
        let run = entry.runs.get_mut(run_id).ok_or(Error::RunNotFound(run_id))?;
        run.record.set_status(done, excluded_from_analysis);
        Ok(())
    }

    fn upsert_run_value(&self, experiment_id: ExperimentId, value: RunValue) -> Result<()> {
        let mut entry = self.entry_mut(experiment_id)?;
        let run = entry
            .runs
            .get_mut(value.run_id)
            .ok_or(Error::RunNotFound(value.run_id))?;
        upsert(&mut run.values, value);
        Ok(())
    }

    fn upsert_analysis_value(&self, experiment_id: ExperimentId, value: RunValue) -> Result<()> {
        let mut entry = self.entry_mut(experiment_id)?;
        let run = entry
            .runs
            .get_mut(value.run_id)
            .ok_or(Error::RunNotFound(value.run_id))?;
        upsert(&mut run.analysis_values, value);
        Ok(())
    }
}
