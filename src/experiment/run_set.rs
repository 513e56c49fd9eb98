//! Run Set - the complete, ordered run list of one experiment

use serde::{Deserialize, Serialize};

use super::{FieldId, RunId, RunRecord, RunValue};

/// A run together with its recorded values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    /// Run record
    pub record: RunRecord,
    /// Input and output values, one per field
    pub values: Vec<RunValue>,
    /// Analysis field values, keyed by analysis field
    #[serde(default)]
    pub analysis_values: Vec<RunValue>,
}

impl StoredRun {
    /// Value of a field, if a row exists for it.
    #[must_use]
    pub fn value(&self, field: FieldId) -> Option<&RunValue> {
        self.values.iter().find(|v| v.field_id == field)
    }

    /// Analysis value of a field, if recorded.
    #[must_use]
    pub fn analysis_value(&self, field: FieldId) -> Option<&RunValue> {
        self.analysis_values.iter().find(|v| v.field_id == field)
    }
}

/// Previous and next run around a given run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjacentRuns {
    /// Closest run with a lower order
    pub prev: Option<RunId>,
    /// Closest run with a higher order
    pub next: Option<RunId>,
}

/// The run set of one experiment, ordered by run order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSet {
    runs: Vec<StoredRun>,
}

impl RunSet {
    /// Build a run set, sorting by run order.
    #[must_use]
    pub fn new(mut runs: Vec<StoredRun>) -> Self {
        runs.sort_by_key(|run| run.record.order());
        Self { runs }
    }

    /// Runs in order.
    #[must_use]
    pub fn runs(&self) -> &[StoredRun] {
        &self.runs
    }

    /// Number of runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the set has no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of value rows (inputs and outputs).
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.runs.iter().map(|run| run.values.len()).sum()
    }

    /// Look up a run by ID.
    #[must_use]
    pub fn get(&self, run_id: RunId) -> Option<&StoredRun> {
        self.runs.iter().find(|run| run.record.run_id() == run_id)
    }

    /// Look up a run by ID for mutation.
    pub fn get_mut(&mut self, run_id: RunId) -> Option<&mut StoredRun> {
        self.runs.iter_mut().find(|run| run.record.run_id() == run_id)
    }

    /// Runs immediately before and after `order`.
    #[must_use]
    pub fn adjacent(&self, order: u32) -> AdjacentRuns {
        let prev = self
            .runs
            .iter()
            .rev()
            .find(|run| run.record.order() < order)
            .map(|run| run.record.run_id());
        let next = self
            .runs
            .iter()
            .find(|run| run.record.order() > order)
            .map(|run| run.record.run_id());
        AdjacentRuns { prev, next }
    }
}
