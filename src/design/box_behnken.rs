//! Box-Behnken response-surface design

use std::collections::BTreeMap;

use super::{CodedLevel, DesignRun};
use crate::factor::FactorSpec;
use crate::{Error, Result};

const EDGE_PATTERN: [(CodedLevel, CodedLevel); 4] = [
    (CodedLevel::Low, CodedLevel::Low),
    (CodedLevel::Low, CodedLevel::High),
    (CodedLevel::High, CodedLevel::Low),
    (CodedLevel::High, CodedLevel::High),
];

/// Build a Box-Behnken design over the Range factors.
///
/// For each pair `(i, j)`, `i < j`, of Range factors in declaration order,
/// four rows put the pair at `(-1,-1), (-1,1), (1,-1), (1,1)` with every other
/// Range factor at center; then `center_points` rows with all Range factors
/// at center. List and Fixed factors hold their center value in every row.
/// With `k` Range factors the design has `2k(k-1) + center_points` rows.
///
/// # Errors
///
/// Returns `InvalidDesign` with fewer than two Range factors.
pub fn box_behnken(factors: &[FactorSpec], center_points: u32) -> Result<Vec<DesignRun>> {
    let ranged: Vec<&FactorSpec> = factors.iter().filter(|f| f.is_range()).collect();
    let k = ranged.len();
    if k < 2 {
        return Err(Error::InvalidDesign(format!(
            "Box-Behnken needs at least 2 Range factors, got {k}"
        )));
    }

    let base_values: BTreeMap<_, _> = factors.iter().map(|f| (f.field_id, f.center())).collect();
    let base_coded: BTreeMap<_, _> = ranged
        .iter()
        .map(|f| (f.field_id, CodedLevel::Center))
        .collect();

    let row = |assignments: &[(&FactorSpec, CodedLevel)]| {
        let mut values = base_values.clone();
        let mut coded = base_coded.clone();
        for (factor, level) in assignments {
            let value = match level {
                CodedLevel::Low => factor.low(),
                CodedLevel::Center => factor.center(),
                CodedLevel::High => factor.high(),
            };
            values.insert(factor.field_id, value);
            coded.insert(factor.field_id, *level);
        }
        DesignRun {
            values,
            coded: Some(coded),
        }
    };

    let mut runs = Vec::with_capacity(2 * k * (k - 1) + center_points as usize);
    for i in 0..k {
        for j in (i + 1)..k {
            for (a, b) in EDGE_PATTERN {
                runs.push(row(&[(ranged[i], a), (ranged[j], b)]));
            }
        }
    }
    for _ in 0..center_points {
        runs.push(row(&[]));
    }

    Ok(runs)
}
