//! # molding-doe: Design-of-Experiments Engine for Injection Molding
//!
//! **Version**: 0.1.0
//!
//! molding-doe turns process factor configurations (barrel temperatures,
//! pressures, speeds) into deterministic, reproducible run matrices, and
//! later aggregates the recorded outcomes into summaries, heatmaps and
//! regressions.
//!
//! ## Pipeline
//!
//! ```text
//! FactorConfig ─► factor::normalize_factors ─► design::generate
//!                                                   │
//!                      materialize::materialize ◄───┘
//!                               │
//!                               ▼
//!                  store::RunStore::replace_runs   (one atomic swap)
//!                               │
//!                               ▼
//!      analysis::{load_runs, filter_runs, summarize_*, build_regression}
//! ```
//!
//! ## Design Principles
//!
//! - **Reproducible**: every sampled design is a pure function of factors,
//!   seed and size; sampling uses the documented [`rng::SplitMix64`]
//! - **Valid by construction**: a [`factor::FactorMode`] carries exactly the
//!   payload its mode needs
//! - **Atomic regeneration**: a run set is replaced whole or not at all
//! - **Graceful reads**: malformed stored JSON reads as absent data
//!
//! ## Example Usage
//!
//! ```rust
//! use molding_doe::prelude::*;
//!
//! let store = MemoryRunStore::new();
//! let config = ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(2);
//! store.insert_experiment(
//!     ExperimentRecord::new(ExperimentId(1), "Process window", config),
//!     vec![
//!         FieldDefinition::new(FieldId(1), "temp", "Barrel temp", FieldKind::Input),
//!         FieldDefinition::new(FieldId(2), "press", "Hold pressure", FieldKind::Input),
//!         FieldDefinition::new(FieldId(10), "weight", "Part weight", FieldKind::Output),
//!     ],
//!     vec![
//!         FactorConfig::range(FieldId(1), 200.0, 240.0),
//!         FactorConfig::range(FieldId(2), 400.0, 600.0),
//!     ],
//! );
//!
//! let summary = regenerate_runs(&store, ExperimentId(1))?;
//! assert_eq!(summary.total_runs, 6);
//!
//! let runs = filter_runs(load_runs(&store, ExperimentId(1))?, &AnalysisFilter::new());
//! assert_eq!(runs.len(), 6);
//! # Ok::<(), molding_doe::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod config;
pub mod design;
pub mod error;
pub mod experiment;
pub mod factor;
pub mod materialize;
pub mod replicate;
pub mod rng;
pub mod store;

pub use error::{Error, Result};

/// Common imports for driving the engine.
pub mod prelude {
    pub use crate::analysis::{
        build_regression, filter_runs, list_tag_values, load_runs, summarize_by_factor,
        summarize_heatmap, summarize_replicates, AnalysisFilter, AnalysisRun, RegressionStatus,
        Response,
    };
    pub use crate::config::{DesignType, ExperimentConfig, RecipePolicy};
    pub use crate::design::{generate, Design, DesignMetadata, DesignParams, DesignRun};
    pub use crate::experiment::{
        ExperimentId, ExperimentRecord, FieldDefinition, FieldId, FieldKind, RecipeId, RunId,
        RunSet, RunValue,
    };
    pub use crate::factor::{normalize_factors, FactorConfig, FactorMode, FactorSpec};
    pub use crate::materialize::{materialize, regenerate_runs, RegenerationSummary, RunPlan};
    pub use crate::replicate::ReplicateKey;
    pub use crate::store::{MemoryRunStore, RunStore};
    pub use crate::{Error, Result};
}
