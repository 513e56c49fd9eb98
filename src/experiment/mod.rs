//! Experiment schema
//!
//! The persisted shape of a molding study: the experiment, its field
//! definitions, and the run set produced by the materializer.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< FieldDefinition (N) [inputs, outputs, analysis]
//!        │
//!        └──< RunRecord (N)
//!                 ├──< RunValue (N) [one per input/output field]
//!                 └──< RunValue (N) [analysis fields]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use molding_doe::config::{DesignType, ExperimentConfig};
//! use molding_doe::experiment::{ExperimentId, ExperimentRecord, RecipeId};
//!
//! let experiment = ExperimentRecord::builder(
//!     ExperimentId(1),
//!     "PA66 process window",
//!     ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(2),
//! )
//! .recipes([RecipeId(3)])
//! .build();
//!
//! assert_eq!(experiment.config().center_points, 2);
//! ```

mod experiment_record;
mod field;
mod ids;
mod run_record;
mod run_set;
mod run_value;

pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder};
pub use field::{FieldDefinition, FieldKind, FieldType};
pub use ids::{ExperimentId, FieldId, RecipeId, RunId};
pub use run_record::{RunRecord, RunRecordBuilder};
pub use run_set::{AdjacentRuns, RunSet, StoredRun};
pub use run_value::RunValue;
