//! Design metadata - the audit record stored beside a generated run set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CodedLevel, Design};
use crate::config::DesignType;
use crate::experiment::FieldId;
use crate::factor::FactorSpec;

/// Current metadata schema version
pub const METADATA_VERSION: u32 = 1;

/// Design-specific part of the metadata, tagged by design type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DesignDetails {
    /// Screening design
    #[serde(rename = "SCREEN")]
    Screening {
        /// Center points requested
        center_points: u32,
        /// Run cap
        max_runs: u32,
        /// Corners plus center points before subsampling
        candidates: u64,
        /// Whether a seeded subset was drawn
        subsampled: bool,
    },
    /// Full or fractional factorial
    #[serde(rename = "FFA")]
    Factorial {
        /// Run cap
        max_runs: u32,
        /// Size of the full level product
        full_size: u64,
        /// Whether a seeded subset was drawn
        fractional: bool,
    },
    /// Box-Behnken design
    #[serde(rename = "BBD")]
    BoxBehnken {
        /// Center points requested
        center_points: u32,
        /// Coded levels of the Range factors, one row per design run
        coded_levels: Vec<Vec<(FieldId, CodedLevel)>>,
    },
    /// Monte Carlo sampling
    #[serde(rename = "SIM")]
    Simulation {
        /// Samples drawn
        samples: u32,
    },
}

impl DesignDetails {
    /// Design type this record describes.
    #[must_use]
    pub const fn design_type(&self) -> DesignType {
        match self {
            Self::Screening { .. } => DesignType::Screening,
            Self::Factorial { .. } => DesignType::Factorial,
            Self::BoxBehnken { .. } => DesignType::BoxBehnken,
            Self::Simulation { .. } => DesignType::Simulation,
        }
    }
}

/// Versioned audit record of a generated design.
///
/// Stored with the run set so reports can show which design, seed and factor
/// specs produced the runs, and so the design can be reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMetadata {
    /// Schema version
    pub version: u32,
    /// When the design was generated
    pub generated_at: DateTime<Utc>,
    /// Sampling seed
    pub seed: u64,
    /// Factor specs used
    pub factors: Vec<FactorSpec>,
    /// Design-specific details
    pub design: DesignDetails,
}

impl DesignMetadata {
    /// Describe a generated design.
    #[must_use]
    pub fn for_design(design: &Design) -> Self {
        let params = design.params;
        let details = match design.design_type {
            DesignType::Screening => DesignDetails::Screening {
                center_points: params.center_points,
                max_runs: params.max_runs,
                candidates: design.candidates,
                subsampled: design.is_subsampled(),
            },
            DesignType::Factorial => DesignDetails::Factorial {
                max_runs: params.max_runs,
                full_size: design.candidates,
                fractional: design.is_subsampled(),
            },
            DesignType::BoxBehnken => DesignDetails::BoxBehnken {
                center_points: params.center_points,
                coded_levels: design
                    .runs
                    .iter()
                    .map(|run| {
                        run.coded
                            .as_ref()
                            .map(|coded| coded.iter().map(|(f, l)| (*f, *l)).collect())
                            .unwrap_or_default()
                    })
                    .collect(),
            },
            DesignType::Simulation => DesignDetails::Simulation {
                samples: params.max_runs,
            },
        };

        Self {
            version: METADATA_VERSION,
            generated_at: Utc::now(),
            seed: params.seed,
            factors: design.factors.clone(),
            design: details,
        }
    }

    /// Parse stored metadata, treating malformed JSON or an unknown schema
    /// version as absent.
    #[must_use]
    pub fn from_json_lenient(json: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(json) {
            Ok(meta) if meta.version <= METADATA_VERSION => Some(meta),
            Ok(meta) => {
                warn!(
                    target: "molding_doe::design",
                    version = meta.version,
                    "Ignoring design metadata with unknown schema version"
                );
                None
            }
            Err(e) => {
                warn!(target: "molding_doe::design", error = %e, "Ignoring malformed design metadata");
                None
            }
        }
    }
}
