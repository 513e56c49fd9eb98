//! Design generators
//!
//! Each generator is a pure function of `(factors, seed, size parameter)`:
//! calling it twice with the same inputs yields the same ordered runs.
//! Sampling always goes through [`crate::rng::SplitMix64`].
//!
//! | Design | Runs |
//! |--------|------|
//! | Screening | 2^k low/high corners + center points, subsampled to `max_runs` |
//! | Factorial | product of factor levels, subsampled to `max_runs` |
//! | Box-Behnken | `2k(k-1)` edge midpoints + center points |
//! | Simulation | `max_runs` uniform samples |
//!
//! ## Example
//!
//! ```rust
//! use molding_doe::config::DesignType;
//! use molding_doe::design::{generate, DesignParams};
//! use molding_doe::experiment::{FieldDefinition, FieldId, FieldKind};
//! use molding_doe::factor::{FactorConfig, FactorSpec};
//!
//! let temp = FieldDefinition::new(FieldId(1), "temp", "Barrel temp", FieldKind::Input);
//! let press = FieldDefinition::new(FieldId(2), "press", "Hold pressure", FieldKind::Input);
//! let factors = vec![
//!     FactorSpec::from_config(&FactorConfig::range(FieldId(1), 200.0, 240.0), &temp, DesignType::BoxBehnken)?,
//!     FactorSpec::from_config(&FactorConfig::range(FieldId(2), 400.0, 600.0), &press, DesignType::BoxBehnken)?,
//! ];
//!
//! let params = DesignParams { seed: 42, center_points: 2, max_runs: 200 };
//! let design = generate(DesignType::BoxBehnken, &factors, &params)?;
//! assert_eq!(design.runs.len(), 6);
//! # Ok::<(), molding_doe::Error>(())
//! ```

mod box_behnken;
mod factorial;
mod metadata;
mod screening;
mod simulation;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DesignType, ExperimentConfig};
use crate::experiment::FieldId;
use crate::factor::FactorSpec;
use crate::{Error, Result};

pub use box_behnken::box_behnken;
pub use factorial::factorial;
pub use metadata::{DesignDetails, DesignMetadata, METADATA_VERSION};
pub use screening::screening;
pub use simulation::simulation;

/// Normalized factor setting: low, center or high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum CodedLevel {
    /// -1
    Low,
    /// 0
    Center,
    /// +1
    High,
}

impl From<CodedLevel> for i8 {
    fn from(level: CodedLevel) -> Self {
        match level {
            CodedLevel::Low => -1,
            CodedLevel::Center => 0,
            CodedLevel::High => 1,
        }
    }
}

impl TryFrom<i8> for CodedLevel {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Low),
            0 => Ok(Self::Center),
            1 => Ok(Self::High),
            other => Err(format!("coded level must be -1, 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for CodedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i8::from(*self))
    }
}

/// One row of a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRun {
    /// Raw factor values
    pub values: BTreeMap<FieldId, f64>,
    /// Coded levels of the Range factors (Box-Behnken only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coded: Option<BTreeMap<FieldId, CodedLevel>>,
}

impl DesignRun {
    /// Row with raw values only.
    #[must_use]
    pub const fn new(values: BTreeMap<FieldId, f64>) -> Self {
        Self {
            values,
            coded: None,
        }
    }

    /// Value of a factor in this row.
    #[must_use]
    pub fn value(&self, field: FieldId) -> Option<f64> {
        self.values.get(&field).copied()
    }
}

/// Size parameters shared by the generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignParams {
    /// Sampling seed
    pub seed: u64,
    /// Center-point runs (Screening, Box-Behnken)
    pub center_points: u32,
    /// Cap on design runs (Screening, Factorial) or sample count (Simulation)
    pub max_runs: u32,
}

impl From<&ExperimentConfig> for DesignParams {
    fn from(config: &ExperimentConfig) -> Self {
        Self {
            seed: config.seed,
            center_points: config.center_points,
            max_runs: config.max_runs,
        }
    }
}

/// A generated design with the inputs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    /// Algorithm family
    pub design_type: DesignType,
    /// Factors the design was built from
    pub factors: Vec<FactorSpec>,
    /// Size parameters
    pub params: DesignParams,
    /// Candidate rows before any subsampling
    pub candidates: u64,
    /// Rows in run order
    pub runs: Vec<DesignRun>,
}

impl Design {
    /// Whether the design is a subsample of its candidate set.
    #[must_use]
    pub fn is_subsampled(&self) -> bool {
        (self.runs.len() as u64) < self.candidates
    }

    /// Audit record describing how this design was produced.
    #[must_use]
    pub fn metadata(&self) -> DesignMetadata {
        DesignMetadata::for_design(self)
    }
}

/// Generate a design.
///
/// # Errors
///
/// Returns `InvalidDesign` when the factor set cannot support the design
/// (e.g. Box-Behnken with fewer than two Range factors, or a factorial
/// space too large to index).
pub fn generate(
    design_type: DesignType,
    factors: &[FactorSpec],
    params: &DesignParams,
) -> Result<Design> {
    let (runs, candidates) = match design_type {
        DesignType::Screening => screening(factors, params.seed, params.center_points, params.max_runs)?,
        DesignType::Factorial => factorial(factors, params.seed, params.max_runs)?,
        DesignType::BoxBehnken => {
            let runs = box_behnken(factors, params.center_points)?;
            let count = runs.len() as u64;
            (runs, count)
        }
        DesignType::Simulation => {
            let runs = simulation(factors, params.seed, params.max_runs);
            (runs, u64::from(params.max_runs))
        }
    };

    debug!(
        target: "molding_doe::design",
        design = %design_type,
        factors = factors.len(),
        seed = params.seed,
        candidates,
        runs = runs.len(),
        "Generated design"
    );

    Ok(Design {
        design_type,
        factors: factors.to_vec(),
        params: *params,
        candidates,
        runs,
    })
}

/// Number of rows in the product of `radices`, or `InvalidDesign` on overflow.
pub(crate) fn product_size(radices: &[usize]) -> Result<u64> {
    radices.iter().try_fold(1u64, |acc, &r| {
        acc.checked_mul(r as u64).ok_or_else(|| {
            Error::InvalidDesign("design space is too large to enumerate".into())
        })
    })
}

/// Digits of `index` in the mixed radix `radices`, last position fastest.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decode_index(mut index: u64, radices: &[usize]) -> Vec<usize> {
    let mut digits = vec![0; radices.len()];
    for (slot, &radix) in digits.iter_mut().zip(radices).rev() {
        let radix = radix as u64;
        *slot = (index % radix) as usize;
        index /= radix;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_index_last_fastest() {
        let radices = [2, 3];
        let rows: Vec<Vec<usize>> = (0..6).map(|i| decode_index(i, &radices)).collect();
        assert_eq!(
            rows,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn test_product_size_overflow() {
        assert_eq!(product_size(&[2, 3, 4]).unwrap(), 24);
        assert_eq!(product_size(&[]).unwrap(), 1);
        assert!(product_size(&[usize::MAX, usize::MAX, 3]).is_err());
    }

    #[test]
    fn test_coded_level_serde() {
        let json = serde_json::to_string(&[CodedLevel::Low, CodedLevel::Center, CodedLevel::High])
            .unwrap();
        assert_eq!(json, "[-1,0,1]");
        let back: Vec<CodedLevel> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![CodedLevel::Low, CodedLevel::Center, CodedLevel::High]);
        assert!(serde_json::from_str::<CodedLevel>("2").is_err());
    }
}
