//! Analysis engine
//!
//! Reads recorded run values and aggregates them against the factors:
//!
//! - [`load_runs`] / [`filter_runs`] - one flat row per run, then AND-composed filters
//! - [`summarize_by_factor`] - response grouped by one factor's value
//! - [`summarize_heatmap`] - response grouped by a pair of factor values
//! - [`build_regression`] - OLS with an intercept column
//! - [`summarize_replicates`] - response grouped by replicate key
//! - [`list_tag_values`] - distinct tags recorded for a field
//!
//! Responses come from output fields ([`Response::Output`]) or analysis
//! fields ([`Response::Analysis`]). Non-finite numbers count as missing.
//!
//! ## Example
//!
//! ```rust
//! use molding_doe::analysis::{build_regression, filter_runs, AnalysisFilter, RegressionStatus};
//! use molding_doe::experiment::FieldId;
//!
//! let runs = filter_runs(Vec::new(), &AnalysisFilter::new());
//! let result = build_regression(&runs, FieldId(10), &[FieldId(1)]);
//! assert_eq!(result.status, RegressionStatus::InsufficientData);
//! assert!(result.coefficients.is_empty());
//! assert!(result.r2.is_nan());
//! ```

pub mod stats;

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::experiment::{ExperimentId, FieldId, RecipeId, RunId, StoredRun};
use crate::replicate::ReplicateKey;
use crate::store::RunStore;
use crate::Result;

/// One run flattened for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    /// Run id
    pub run_id: RunId,
    /// Run order
    pub order: u32,
    /// Run code
    pub code: String,
    /// Recipe the run was made with
    pub recipe_id: Option<RecipeId>,
    /// Replicate key
    pub replicate_key: ReplicateKey,
    /// Operator marked the run done
    pub done: bool,
    /// Operator excluded the run from analysis
    pub excluded_from_analysis: bool,
    /// Numeric input/output values
    pub values: FxHashMap<FieldId, f64>,
    /// Numeric analysis field values
    pub analysis: FxHashMap<FieldId, f64>,
    /// Tag lists, from either value table
    pub tags: FxHashMap<FieldId, Vec<String>>,
}

impl AnalysisRun {
    /// Flatten a stored run.
    #[must_use]
    pub fn from_stored(run: &StoredRun) -> Self {
        let mut values = FxHashMap::default();
        let mut analysis = FxHashMap::default();
        let mut tags = FxHashMap::default();

        for value in &run.values {
            if let Some(real) = value.real.filter(|v| v.is_finite()) {
                values.insert(value.field_id, real);
            }
            if value.tags_json.is_some() {
                tags.insert(value.field_id, value.tags());
            }
        }
        for value in &run.analysis_values {
            if let Some(real) = value.real.filter(|v| v.is_finite()) {
                analysis.insert(value.field_id, real);
            }
            if value.tags_json.is_some() {
                tags.insert(value.field_id, value.tags());
            }
        }

        let record = &run.record;
        Self {
            run_id: record.run_id(),
            order: record.order(),
            code: record.code().to_string(),
            recipe_id: record.recipe_id(),
            replicate_key: record.replicate_key().clone(),
            done: record.done(),
            excluded_from_analysis: record.excluded_from_analysis(),
            values,
            analysis,
            tags,
        }
    }

    /// Numeric input/output value.
    #[must_use]
    pub fn value(&self, field: FieldId) -> Option<f64> {
        self.values.get(&field).copied()
    }

    /// Tags recorded for a field.
    #[must_use]
    pub fn tags(&self, field: FieldId) -> &[String] {
        self.tags.get(&field).map_or(&[], Vec::as_slice)
    }
}

/// Load every run of an experiment in run order.
///
/// # Errors
///
/// Returns `ExperimentNotFound` if the id does not resolve.
pub fn load_runs<S: RunStore + ?Sized>(
    store: &S,
    experiment_id: ExperimentId,
) -> Result<Vec<AnalysisRun>> {
    let run_set = store.run_set(experiment_id)?;
    let runs: Vec<AnalysisRun> = run_set.runs().iter().map(AnalysisRun::from_stored).collect();
    debug!(
        target: "molding_doe::analysis",
        experiment_id = %experiment_id,
        runs = runs.len(),
        "Loaded runs"
    );
    Ok(runs)
}

/// Require a tag in a tag field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    /// Tag field
    pub field: FieldId,
    /// Tag that must be present
    pub tag: String,
}

/// Run filter; every set condition must hold.
///
/// Runs excluded from analysis are always dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFilter {
    /// Keep only runs marked done
    #[serde(default)]
    pub require_done: bool,
    /// Keep only runs of this recipe
    #[serde(default)]
    pub recipe: Option<RecipeId>,
    /// Keep only runs carrying this tag
    #[serde(default)]
    pub tag: Option<TagFilter>,
}

impl AnalysisFilter {
    /// Filter that only drops excluded runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only runs marked done.
    #[must_use]
    pub const fn done_only(mut self) -> Self {
        self.require_done = true;
        self
    }

    /// Keep only runs of `recipe`.
    #[must_use]
    pub const fn recipe(mut self, recipe: RecipeId) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Keep only runs tagged `tag` in `field`.
    #[must_use]
    pub fn tagged(mut self, field: FieldId, tag: impl Into<String>) -> Self {
        self.tag = Some(TagFilter {
            field,
            tag: tag.into(),
        });
        self
    }

    /// Whether `run` passes the filter.
    #[must_use]
    pub fn matches(&self, run: &AnalysisRun) -> bool {
        if run.excluded_from_analysis {
            return false;
        }
        if self.require_done && !run.done {
            return false;
        }
        if self.recipe.is_some_and(|recipe| run.recipe_id != Some(recipe)) {
            return false;
        }
        if let Some(filter) = &self.tag {
            let wanted = filter.tag.trim();
            if !run.tags(filter.field).iter().any(|t| t.trim() == wanted) {
                return false;
            }
        }
        true
    }
}

/// Apply `filter`, keeping run order.
#[must_use]
pub fn filter_runs(runs: Vec<AnalysisRun>, filter: &AnalysisFilter) -> Vec<AnalysisRun> {
    runs.into_iter().filter(|run| filter.matches(run)).collect()
}

/// Where a response value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "table", content = "field", rename_all = "lowercase")]
pub enum Response {
    /// Output field in the run value table
    Output(FieldId),
    /// Analysis field in the analysis value table
    Analysis(FieldId),
}

impl Response {
    /// Response value of `run`.
    #[must_use]
    pub fn read(self, run: &AnalysisRun) -> Option<f64> {
        match self {
            Self::Output(field) => run.values.get(&field).copied(),
            Self::Analysis(field) => run.analysis.get(&field).copied(),
        }
    }
}

impl From<FieldId> for Response {
    fn from(field: FieldId) -> Self {
        Self::Output(field)
    }
}

/// Response statistics for one factor value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSummary {
    /// Factor value
    pub factor_value: f64,
    /// Mean response
    pub mean: f64,
    /// Sample standard deviation; `NaN` when `n < 2`
    pub sd: f64,
    /// Group size
    pub n: usize,
}

/// Response statistics for one `(x, y)` factor combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// X factor value
    pub x: f64,
    /// Y factor value
    pub y: f64,
    /// Mean response
    pub mean: f64,
    /// Sample standard deviation; `NaN` when `n < 2`
    pub sd: f64,
    /// Cell size
    pub n: usize,
}

/// Response statistics for one replicate group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSummary {
    /// Replicate key shared by the group
    pub replicate_key: ReplicateKey,
    /// Mean response
    pub mean: f64,
    /// Sample standard deviation; `NaN` when `n < 2`
    pub sd: f64,
    /// Group size
    pub n: usize,
}

/// Grouping key for a factor value; `-0.0` and `0.0` group together.
fn value_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Groups values by key, remembering first-seen order.
struct Groups<K, L> {
    index: FxHashMap<K, usize>,
    groups: Vec<(L, Vec<f64>)>,
}

impl<K: std::hash::Hash + Eq, L> Groups<K, L> {
    fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            groups: Vec::new(),
        }
    }

    fn push(&mut self, key: K, label: impl FnOnce() -> L, value: f64) {
        let slot = *self.index.entry(key).or_insert_with(|| {
            self.groups.push((label(), Vec::new()));
            self.groups.len() - 1
        });
        self.groups[slot].1.push(value);
    }

    fn into_groups(self) -> Vec<(L, Vec<f64>)> {
        self.groups
    }
}

/// Group the response by the value of `factor`.
///
/// Runs missing either value are skipped. Groups come back in ascending
/// factor value.
#[must_use]
pub fn summarize_by_factor(
    runs: &[AnalysisRun],
    response: impl Into<Response>,
    factor: FieldId,
) -> Vec<FactorSummary> {
    let response = response.into();
    let mut groups = Groups::new();
    for run in runs {
        let (Some(x), Some(out)) = (run.value(factor), response.read(run)) else {
            continue;
        };
        groups.push(value_key(x), || x, out);
    }

    let mut summary: Vec<FactorSummary> = groups
        .into_groups()
        .into_iter()
        .map(|(factor_value, values)| FactorSummary {
            factor_value,
            mean: stats::mean(&values),
            sd: stats::sample_sd(&values),
            n: values.len(),
        })
        .collect();
    summary.sort_by(|a, b| a.factor_value.total_cmp(&b.factor_value));
    summary
}

/// Group the response by the pair of values of `x_factor` and `y_factor`.
///
/// One cell per observed combination, in the order combinations are first
/// seen in `runs`.
#[must_use]
pub fn summarize_heatmap(
    runs: &[AnalysisRun],
    response: impl Into<Response>,
    x_factor: FieldId,
    y_factor: FieldId,
) -> Vec<HeatmapCell> {
    let response = response.into();
    let mut groups = Groups::new();
    for run in runs {
        let (Some(x), Some(y), Some(out)) =
            (run.value(x_factor), run.value(y_factor), response.read(run))
        else {
            continue;
        };
        groups.push((value_key(x), value_key(y)), || (x, y), out);
    }

    groups
        .into_groups()
        .into_iter()
        .map(|((x, y), values)| HeatmapCell {
            x,
            y,
            mean: stats::mean(&values),
            sd: stats::sample_sd(&values),
            n: values.len(),
        })
        .collect()
}

/// Group the response by replicate key, in first-seen order.
#[must_use]
pub fn summarize_replicates(
    runs: &[AnalysisRun],
    response: impl Into<Response>,
) -> Vec<ReplicateSummary> {
    let response = response.into();
    let mut groups = Groups::new();
    for run in runs {
        let Some(out) = response.read(run) else {
            continue;
        };
        groups.push(run.replicate_key.clone(), || run.replicate_key.clone(), out);
    }

    groups
        .into_groups()
        .into_iter()
        .map(|(replicate_key, values)| ReplicateSummary {
            replicate_key,
            mean: stats::mean(&values),
            sd: stats::sample_sd(&values),
            n: values.len(),
        })
        .collect()
}

/// Outcome of a regression attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionStatus {
    /// Coefficients were fitted
    Fitted,
    /// Fewer complete rows than factors + 2; no fit attempted
    InsufficientData,
    /// The design matrix is rank deficient
    Singular,
}

/// Ordinary least-squares result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Intercept first, then one coefficient per factor; empty unless fitted
    pub coefficients: Vec<f64>,
    /// Coefficient of determination; `NaN` unless fitted
    pub r2: f64,
    /// Complete rows used
    pub n: usize,
    /// Fit status
    pub status: RegressionStatus,
}

impl RegressionResult {
    fn empty(n: usize, status: RegressionStatus) -> Self {
        Self {
            coefficients: Vec::new(),
            r2: f64::NAN,
            n,
            status,
        }
    }

    /// Whether coefficients are available.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.status == RegressionStatus::Fitted
    }
}

/// Regress the response on `factors` with an intercept.
///
/// Rows missing the response or any factor are dropped. Below
/// `factors.len() + 2` complete rows no fit is attempted.
#[must_use]
pub fn build_regression(
    runs: &[AnalysisRun],
    response: impl Into<Response>,
    factors: &[FieldId],
) -> RegressionResult {
    let response = response.into();
    let mut y = Vec::new();
    let mut x = Vec::new();
    for run in runs {
        let Some(out) = response.read(run) else {
            continue;
        };
        let row: Option<Vec<f64>> = std::iter::once(Some(1.0))
            .chain(factors.iter().map(|f| run.value(*f)))
            .collect();
        if let Some(row) = row {
            y.push(out);
            x.push(row);
        }
    }

    let n = y.len();
    if n < factors.len() + 2 {
        debug!(
            target: "molding_doe::analysis",
            rows = n,
            factors = factors.len(),
            "Insufficient data for regression"
        );
        return RegressionResult::empty(n, RegressionStatus::InsufficientData);
    }

    match stats::ols(&y, &x) {
        Some(fit) => RegressionResult {
            coefficients: fit.coefficients,
            r2: fit.r2,
            n,
            status: RegressionStatus::Fitted,
        },
        None => RegressionResult::empty(n, RegressionStatus::Singular),
    }
}

/// Distinct tags recorded for `field`, trimmed, without blanks, sorted.
#[must_use]
pub fn list_tag_values(runs: &[AnalysisRun], field: FieldId) -> Vec<String> {
    runs.iter()
        .flat_map(|run| run.tags(field))
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
