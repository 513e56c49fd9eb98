//! Statistical utilities for run analysis.
//!
//! Provides:
//! - Arithmetic mean
//! - Sample standard deviation (n-1 divisor)
//! - Ordinary least squares via the normal equations

/// Pivot size below which the column-scaled normal equations are treated
/// as singular. Every scaled column has unit norm, so this is unit-free.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Arithmetic mean; `NaN` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the n-1 divisor.
///
/// # Returns
/// * `NaN` when fewer than two values are given
#[must_use]
pub fn sample_sd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// A least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// One coefficient per design-matrix column
    pub coefficients: Vec<f64>,
    /// Coefficient of determination; `NaN` when the response is constant
    pub r2: f64,
}

/// Fit `y ≈ X·β` by ordinary least squares.
///
/// Each column of `X` is first scaled to unit Euclidean norm, so the
/// singularity test does not depend on the units of the factors. The scaled
/// system `ZᵀZ γ = Zᵀy` is solved by Gaussian elimination with partial
/// pivoting and `β` is recovered column by column.
///
/// # Arguments
/// * `y` - Response values
/// * `x` - Design matrix rows, one per response value, all the same width
///
/// # Returns
/// * `None` if the rows are empty, ragged, or `XᵀX` is singular
#[must_use]
pub fn ols(y: &[f64], x: &[Vec<f64>]) -> Option<OlsFit> {
    let p = x.first()?.len();
    if p == 0 || y.len() != x.len() || x.iter().any(|row| row.len() != p) {
        return None;
    }

    let norms: Vec<f64> = (0..p)
        .map(|j| x.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt())
        .collect();
    if norms.iter().any(|n| *n == 0.0 || !n.is_finite()) {
        return None;
    }

    // Augmented normal equations [ZᵀZ | Zᵀy] with Z = X·diag(1/norm)
    let mut a = vec![vec![0.0; p + 1]; p];
    for (row, &yi) in x.iter().zip(y) {
        let z: Vec<f64> = row.iter().zip(&norms).map(|(v, n)| v / n).collect();
        for i in 0..p {
            for j in 0..p {
                a[i][j] += z[i] * z[j];
            }
            a[i][p] += z[i] * yi;
        }
    }

    let coefficients: Vec<f64> = solve(a, p)?
        .into_iter()
        .zip(&norms)
        .map(|(gamma, n)| gamma / n)
        .collect();

    let y_mean = mean(y);
    let mut sse = 0.0;
    let mut sst = 0.0;
    for (row, &yi) in x.iter().zip(y) {
        let fitted: f64 = row.iter().zip(&coefficients).map(|(xi, b)| xi * b).sum();
        sse += (yi - fitted).powi(2);
        sst += (yi - y_mean).powi(2);
    }
    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { f64::NAN };

    Some(OlsFit { coefficients, r2 })
}

/// Solve a `p × (p+1)` augmented system with a unit diagonal in place.
#[allow(clippy::needless_range_loop)]
fn solve(mut a: Vec<Vec<f64>>, p: usize) -> Option<Vec<f64>> {
    for col in 0..p {
        let pivot = (col..p).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        let size = a[pivot][col].abs();
        if size.is_nan() || size <= SINGULAR_TOLERANCE {
            return None;
        }
        a.swap(col, pivot);

        for row in (col + 1)..p {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=p {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut beta = vec![0.0; p];
    for i in (0..p).rev() {
        let tail: f64 = ((i + 1)..p).map(|j| a[i][j] * beta[j]).sum();
        beta[i] = (a[i][p] - tail) / a[i][i];
    }
    Some(beta)
}
