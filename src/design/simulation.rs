//! Monte Carlo sampling design

use std::collections::BTreeMap;

use super::DesignRun;
use crate::factor::{FactorMode, FactorSpec};
use crate::rng::SplitMix64;

/// Draw `samples` independent runs.
///
/// Factors are visited in declaration order for each run: Range factors draw
/// `min + u * (max - min)` with `u` in `[0, 1)`, List factors draw a listed
/// value uniformly, Fixed factors draw nothing and hold their value.
#[must_use]
pub fn simulation(factors: &[FactorSpec], seed: u64, samples: u32) -> Vec<DesignRun> {
    let mut rng = SplitMix64::new(seed);
    (0..samples)
        .map(|_| {
            let values: BTreeMap<_, _> = factors
                .iter()
                .map(|factor| {
                    let value = match &factor.mode {
                        FactorMode::Fixed { value } => *value,
                        FactorMode::Range { min, max } => {
                            (min + rng.next_f64() * (max - min)).min(*max)
                        }
                        FactorMode::List { values } => values[rng.below(values.len())],
                    };
                    (factor.field_id, value)
                })
                .collect();
            DesignRun::new(values)
        })
        .collect()
}
