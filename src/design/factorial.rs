//! Full and fractional factorial designs

use std::collections::BTreeMap;

use super::{decode_index, product_size, DesignRun};
use crate::factor::FactorSpec;
use crate::rng::SplitMix64;
use crate::Result;

/// Build a factorial design over every factor's levels.
///
/// Range factors contribute `level_count` evenly spaced values including
/// both endpoints, List factors their values, Fixed factors their single
/// value. The first declared factor varies slowest. When the product has
/// more than `max_runs` rows, a seeded subset of `max_runs` rows is kept in
/// product order (fractional design).
///
/// Returns the rows and the full product size.
///
/// # Errors
///
/// Returns `InvalidDesign` if the product is too large to index.
pub fn factorial(factors: &[FactorSpec], seed: u64, max_runs: u32) -> Result<(Vec<DesignRun>, u64)> {
    let radices: Vec<usize> = factors.iter().map(FactorSpec::level_len).collect();
    let full = product_size(&radices)?;

    let selected: Vec<u64> = if full > u64::from(max_runs) {
        SplitMix64::new(seed).sample_indices(full, u64::from(max_runs))
    } else {
        (0..full).collect()
    };

    let runs = selected
        .into_iter()
        .map(|index| {
            let digits = decode_index(index, &radices);
            let values: BTreeMap<_, _> = factors
                .iter()
                .zip(digits)
                .map(|(factor, digit)| (factor.field_id, factor.level(digit)))
                .collect();
            DesignRun::new(values)
        })
        .collect();

    Ok((runs, full))
}
