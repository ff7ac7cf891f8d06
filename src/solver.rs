//! L1-regularized least-squares recovery (LASSO) by cyclic coordinate
//! descent.
//!
//! Minimizes `(1/2n)·‖y − A·x‖² + alpha·‖x‖₁` with soft-thresholding
//! updates, the scaling used by the solver the original experiments were
//! calibrated against. `alpha = 0` degrades to ordinary least squares and
//! underdetermined systems (rows < cols) are the expected case.

use log::warn;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Convergence knobs for [`lasso`].
#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    /// Stop once the largest coefficient update falls below this.
    pub tol: f64,
    /// Hard cap on full coordinate sweeps.
    pub max_iters: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tol: 1e-4,
            max_iters: 1000,
        }
    }
}

/// Solver failures that abort a single trial.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// Design matrix and measurement vector shapes disagree.
    ShapeMismatch { rows: usize, y_len: usize },
    /// Non-finite value in the inputs.
    NonFinite,
    /// Negative regularization strength.
    NegativeAlpha { alpha: f64 },
    /// Coordinate descent exhausted its sweep budget before the largest
    /// update fell below the tolerance.
    NotConverged { sweeps: usize },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::ShapeMismatch { rows, y_len } => {
                write!(f, "design matrix has {rows} rows but y has {y_len} entries")
            }
            SolverError::NonFinite => write!(f, "non-finite value in solver input"),
            SolverError::NegativeAlpha { alpha } => {
                write!(f, "regularization strength must be >= 0, got {alpha}")
            }
            SolverError::NotConverged { sweeps } => {
                write!(f, "coordinate descent did not converge within {sweeps} sweeps")
            }
        }
    }
}

impl std::error::Error for SolverError {}

#[inline]
fn soft_threshold(v: f64, t: f64) -> f64 {
    if v > t {
        v - t
    } else if v < -t {
        v + t
    } else {
        0.0
    }
}

/// Fit sparse coefficients against measurements.
///
/// Returns the coefficient vector; a solve that exhausts `max_iters`
/// fails with [`SolverError::NotConverged`] so the owning trial is
/// dropped rather than scored against a partial fit.
pub fn lasso(
    a: &DMatrix<f64>,
    y: &DVector<f64>,
    alpha: f64,
    opts: &SolverOptions,
) -> Result<DVector<f64>, SolverError> {
    let (n, p) = (a.nrows(), a.ncols());
    if n != y.len() {
        return Err(SolverError::ShapeMismatch {
            rows: n,
            y_len: y.len(),
        });
    }
    if alpha < 0.0 {
        return Err(SolverError::NegativeAlpha { alpha });
    }
    if !a.iter().all(|v| v.is_finite()) || !y.iter().all(|v| v.is_finite()) {
        return Err(SolverError::NonFinite);
    }

    let n_f = n as f64;
    // Per-column curvature (1/n)·‖a_j‖²; zero-norm columns stay at zero.
    let col_sq: Vec<f64> = (0..p).map(|j| a.column(j).norm_squared() / n_f).collect();

    let mut x = DVector::<f64>::zeros(p);
    let mut residual = y.clone();

    for _ in 0..opts.max_iters {
        let mut max_delta = 0.0f64;
        for j in 0..p {
            if col_sq[j] <= f64::EPSILON {
                continue;
            }
            let old = x[j];
            let col = a.column(j);
            // rho = (1/n)·a_j^T(r + a_j·x_j): the partial residual fit.
            let rho = col.dot(&residual) / n_f + col_sq[j] * old;
            let new = soft_threshold(rho, alpha) / col_sq[j];
            if new != old {
                residual.axpy(old - new, &col, 1.0);
                x[j] = new;
                max_delta = max_delta.max((new - old).abs());
            }
        }
        if max_delta < opts.tol {
            return Ok(x);
        }
    }

    warn!(
        "lasso did not converge within {} sweeps (n={n}, p={p}, alpha={alpha})",
        opts.max_iters
    );
    Err(SolverError::NotConverged {
        sweeps: opts.max_iters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_zero_recovers_exact_solution_on_orthogonal_system() {
        // Identity design: least squares must reproduce y exactly.
        let a = DMatrix::<f64>::identity(6, 6);
        let y = DVector::from_vec(vec![3.0, -1.5, 0.0, 8.0, 2.5, -4.0]);
        let x = lasso(&a, &y, 0.0, &SolverOptions::default()).unwrap();
        assert!((&a * &x - &y).norm() < 1e-8);
    }

    #[test]
    fn heavy_regularization_drives_coefficients_to_zero() {
        let a = DMatrix::<f64>::identity(4, 4);
        let y = DVector::from_vec(vec![0.5, -0.2, 0.1, 0.3]);
        // alpha above every |y_j| shrinks everything to exactly zero.
        let x = lasso(&a, &y, 10.0, &SolverOptions::default()).unwrap();
        assert!(x.iter().all(|&v| v == 0.0), "expected all-zero solution");
    }

    #[test]
    fn underdetermined_system_is_solved_without_error() {
        let a = DMatrix::from_row_slice(2, 5, &[1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 1.0, 0.0, 3.0, 1.0]);
        let y = DVector::from_vec(vec![1.0, 2.0]);
        let x = lasso(&a, &y, 0.01, &SolverOptions::default()).unwrap();
        assert!((&a * &x - &y).norm() < 0.5, "fit should be close on 2x5 system");
    }

    #[test]
    fn zero_norm_column_keeps_zero_coefficient() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 0.0]);
        let y = DVector::from_vec(vec![2.0, 2.0]);
        let x = lasso(&a, &y, 0.0, &SolverOptions::default()).unwrap();
        assert_eq!(x[1], 0.0, "degenerate column must stay inactive");
        assert!((x[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn exhausting_sweeps_fails_instead_of_returning_a_partial_fit() {
        // Correlated columns keep coordinate descent moving after the
        // first sweep, so one sweep at a tiny tolerance cannot finish.
        let a = DMatrix::from_fn(4, 40, |r, c| ((r * 40 + c) as f64 * 0.37).sin() + 0.5);
        let y = DVector::from_vec(vec![1.0, -2.0, 3.0, -4.0]);
        let opts = SolverOptions {
            tol: 1e-12,
            max_iters: 1,
        };
        assert!(matches!(
            lasso(&a, &y, 0.01, &opts),
            Err(SolverError::NotConverged { sweeps: 1 })
        ));
    }

    #[test]
    fn negative_alpha_is_rejected() {
        let a = DMatrix::<f64>::identity(2, 2);
        let y = DVector::from_vec(vec![1.0, 1.0]);
        assert!(matches!(
            lasso(&a, &y, -0.1, &SolverOptions::default()),
            Err(SolverError::NegativeAlpha { .. })
        ));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let a = DMatrix::from_row_slice(1, 1, &[f64::NAN]);
        let y = DVector::from_vec(vec![1.0]);
        assert_eq!(
            lasso(&a, &y, 0.1, &SolverOptions::default()).unwrap_err(),
            SolverError::NonFinite
        );
    }
}
