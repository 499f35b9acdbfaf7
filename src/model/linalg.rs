//! Dense linear algebra for the regression solvers.
//!
//! Design matrices here are tall and narrow, so every solve goes through the
//! small `p x p` Gram matrix `XᵀX`. Its symmetric eigendecomposition (cyclic
//! Jacobi) gives both the ridge solution and the least-squares
//! pseudo-inverse.

use crate::core::constants::EIGEN_RELATIVE_CUTOFF;
use crate::core::error::{DashboardError, Result};
use log::warn;
use ndarray::{Array1, Array2};

const MAX_JACOBI_SWEEPS: usize = 100;

/// Eigenvalues and column eigenvectors of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub values: Array1<f64>,
    pub vectors: Array2<f64>,
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<SymmetricEigen> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(DashboardError::dimension_mismatch(
            format!("square matrix, {} rows", n),
            format!("{} columns", matrix.ncols()),
        ));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(DashboardError::numerical(
            "Cannot decompose a matrix with non-finite entries",
        ));
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let threshold = (f64::EPSILON * scale).powi(2);

    let mut converged = false;
    for sweep in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= threshold {
            converged = true;
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                // Negligible against both diagonal entries.
                let g = 100.0 * apq.abs();
                if sweep > 3
                    && a[[p, p]].abs() + g == a[[p, p]].abs()
                    && a[[q, q]].abs() + g == a[[q, q]].abs()
                {
                    a[[p, q]] = 0.0;
                    a[[q, p]] = 0.0;
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    if !converged {
        return Err(DashboardError::numerical(format!(
            "Jacobi eigendecomposition did not converge in {} sweeps",
            MAX_JACOBI_SWEEPS
        )));
    }

    Ok(SymmetricEigen {
        values: a.diag().to_owned(),
        vectors: v,
    })
}

/// Solution of a (possibly regularized) least-squares problem.
#[derive(Debug, Clone)]
pub struct LinearSolution {
    pub params: Array1<f64>,
    /// Numerical rank of the design
    pub rank: usize,
}

/// Solve `(XᵀX + ridge·I) b = Xᵀy`.
///
/// With `ridge == 0` this is the minimum-norm least-squares solution:
/// eigen-directions with eigenvalue below `λ_max · 1e-12` are dropped and
/// the rank deficiency is logged.
pub fn solve_ridge(x: &Array2<f64>, y: &Array1<f64>, ridge: f64) -> Result<LinearSolution> {
    if x.nrows() != y.len() {
        return Err(DashboardError::dimension_mismatch(
            format!("{} targets", x.nrows()),
            format!("{} targets", y.len()),
        ));
    }
    if !(ridge >= 0.0) || !ridge.is_finite() {
        return Err(DashboardError::invalid_parameter(
            "ridge",
            ridge.to_string(),
            "must be finite and non-negative",
        ));
    }

    let p = x.ncols();
    if p == 0 {
        return Ok(LinearSolution {
            params: Array1::zeros(0),
            rank: 0,
        });
    }

    let gram = x.t().dot(x);
    let xty = x.t().dot(y);
    let eigen = symmetric_eigen(&gram)?;

    let max_eigen = eigen.values.iter().cloned().fold(0.0f64, f64::max);
    let cutoff = max_eigen * EIGEN_RELATIVE_CUTOFF;
    let rank = eigen.values.iter().filter(|&&l| l > cutoff).count();

    // Coordinates of Xᵀy in the eigenbasis, scaled by the inverse spectrum.
    let projected = eigen.vectors.t().dot(&xty);
    let mut scaled = Array1::<f64>::zeros(p);
    for i in 0..p {
        let lambda = eigen.values[i].max(0.0);
        let denom = lambda + ridge;
        if ridge == 0.0 {
            if lambda > cutoff {
                scaled[i] = projected[i] / denom;
            }
        } else if denom > 0.0 {
            scaled[i] = projected[i] / denom;
        }
    }
    let params = eigen.vectors.dot(&scaled);

    if ridge == 0.0 && rank < p {
        warn!(
            "Design matrix is rank deficient ({} of {} columns); using the pseudo-inverse",
            rank, p
        );
    }
    if params.iter().any(|v| !v.is_finite()) {
        return Err(DashboardError::numerical(
            "Least-squares solution contains non-finite values",
        ));
    }

    Ok(LinearSolution { params, rank })
}

/// Ordinary least squares via the pseudo-inverse.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearSolution> {
    solve_ridge(x, y, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_eigen_reconstructs_matrix() {
        let a = array![[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 5.0]];
        let eigen = symmetric_eigen(&a).unwrap();
        let lambda = Array2::from_diag(&eigen.values);
        let rebuilt = eigen.vectors.dot(&lambda).dot(&eigen.vectors.t());
        for (x, y) in rebuilt.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
        }
        let identity = eigen.vectors.t().dot(&eigen.vectors);
        for i in 0..3 {
            assert_abs_diff_eq!(identity[[i, i]], 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_least_squares_exact_fit() {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let solution = least_squares(&x, &y).unwrap();
        assert_eq!(solution.rank, 2);
        assert_abs_diff_eq!(solution.params[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.params[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rank_deficient_minimum_norm() {
        // Duplicated column: the minimum-norm solution splits the weight.
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let y = array![2.0, 4.0, 6.0];
        let solution = least_squares(&x, &y).unwrap();
        assert_eq!(solution.rank, 1);
        assert_abs_diff_eq!(solution.params[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.params[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ridge_shrinks() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 3.0];
        // (14 + 14) b = 14
        let solution = solve_ridge(&x, &y, 14.0).unwrap();
        assert_abs_diff_eq!(solution.params[0], 0.5, epsilon = 1e-12);
    }
}
