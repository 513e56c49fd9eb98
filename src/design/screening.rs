//! Screening design: low/high corners plus center points

use std::collections::BTreeMap;

use super::{decode_index, product_size, DesignRun};
use crate::factor::FactorSpec;
use crate::rng::SplitMix64;
use crate::{Error, Result};

/// Build a screening design.
///
/// Candidates are every low/high combination of the Range and List factors
/// (first declared factor varies slowest), followed by `center_points`
/// center rows. Fixed factors hold their value throughout. When the
/// candidates exceed `max_runs`, a seeded subset of `max_runs` rows is kept
/// in candidate order.
///
/// Returns the rows and the candidate count.
///
/// # Errors
///
/// Returns `InvalidDesign` if the corner set is too large to index.
pub fn screening(
    factors: &[FactorSpec],
    seed: u64,
    center_points: u32,
    max_runs: u32,
) -> Result<(Vec<DesignRun>, u64)> {
    let varied: Vec<&FactorSpec> = factors.iter().filter(|f| f.is_varied()).collect();
    let extremes: Vec<Vec<f64>> = varied.iter().map(|f| f.extremes()).collect();
    let radices: Vec<usize> = extremes.iter().map(Vec::len).collect();

    let corners = product_size(&radices)?;
    let candidates = corners
        .checked_add(u64::from(center_points))
        .ok_or_else(|| Error::InvalidDesign("screening design is too large".into()))?;

    let selected: Vec<u64> = if candidates > u64::from(max_runs) {
        SplitMix64::new(seed).sample_indices(candidates, u64::from(max_runs))
    } else {
        (0..candidates).collect()
    };

    let center: BTreeMap<_, _> = factors.iter().map(|f| (f.field_id, f.center())).collect();

    let runs = selected
        .into_iter()
        .map(|index| {
            let mut values = center.clone();
            if index < corners {
                let digits = decode_index(index, &radices);
                for ((factor, levels), digit) in varied.iter().zip(&extremes).zip(digits) {
                    values.insert(factor.field_id, levels[digit]);
                }
            }
            DesignRun::new(values)
        })
        .collect();

    Ok((runs, candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::FieldId;
    use crate::factor::FactorMode;

    fn spec(id: u64, mode: FactorMode) -> FactorSpec {
        FactorSpec {
            field_id: FieldId(id),
            code: format!("f{id}"),
            label: format!("Factor {id}"),
            mode,
            level_count: 2,
        }
    }

    #[test]
    fn test_corners_then_centers() {
        let factors = vec![
            spec(1, FactorMode::Range { min: 200.0, max: 240.0 }),
            spec(2, FactorMode::List { values: vec![10.0, 20.0, 30.0] }),
            spec(3, FactorMode::Fixed { value: 5.0 }),
        ];
        let (runs, candidates) = screening(&factors, 1, 2, 200).unwrap();
        assert_eq!(candidates, 6);
        assert_eq!(runs.len(), 6);

        let pairs: Vec<(f64, f64)> = runs
            .iter()
            .map(|r| (r.values[&FieldId(1)], r.values[&FieldId(2)]))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (200.0, 10.0),
                (200.0, 30.0),
                (240.0, 10.0),
                (240.0, 30.0),
                (220.0, 20.0),
                (220.0, 20.0)
            ]
        );
        assert!(runs.iter().all(|r| r.values[&FieldId(3)] == 5.0));
    }

    #[test]
    fn test_subsample_is_reproducible_and_bounded() {
        let factors: Vec<FactorSpec> = (1..=6)
            .map(|i| spec(i, FactorMode::Range { min: 0.0, max: 1.0 }))
            .collect();
        let (a, candidates) = screening(&factors, 99, 3, 10).unwrap();
        let (b, _) = screening(&factors, 99, 3, 10).unwrap();
        assert_eq!(candidates, 67);
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);

        let (c, _) = screening(&factors, 100, 3, 10).unwrap();
        assert_ne!(a, c);
    }
}
