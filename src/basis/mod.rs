//! Sparsifying bases for the recovery problem.
//!
//! A basis supplies a synthesis operator `S` mapping sparse coefficients
//! to pixels. The pipeline folds it into the measurement matrix so the
//! solver sees the effective system `y ≈ (W · S) · theta`, and maps the
//! recovered coefficients back through `S`.

pub mod dct;
pub mod dwt;

pub use self::dwt::{Dwt2d, Wavelet, MAX_LEVEL};

use crate::image::Plane;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Failures binding per-trial parameters to a basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasisError {
    /// DWT basis with no decomposition level supplied.
    MissingLevel,
    /// Decomposition level outside `[1, MAX_LEVEL]`.
    LevelOutOfRange { level: usize },
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisError::MissingLevel => {
                write!(f, "dwt trial without a decomposition level")
            }
            BasisError::LevelOutOfRange { level } => {
                write!(
                    f,
                    "decomposition level must be in [1, {MAX_LEVEL}], got {level}"
                )
            }
        }
    }
}

impl std::error::Error for BasisError {}

/// Basis family selected at configuration time. The wavelet level varies
/// per sweep trial and is supplied when the basis is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasisSpec {
    Dct,
    Dwt { wavelet: Wavelet },
}

impl BasisSpec {
    /// Short name used in output paths and table manifests.
    pub fn name(&self) -> &'static str {
        match self {
            BasisSpec::Dct => "dct",
            BasisSpec::Dwt { .. } => "dwt",
        }
    }

    /// Bind the per-trial level, yielding a transform ready to apply.
    /// `level` is ignored for DCT; DWT requires it in `[1, MAX_LEVEL]`.
    pub fn resolve(&self, level: Option<usize>) -> Result<ResolvedBasis, BasisError> {
        match self {
            BasisSpec::Dct => Ok(ResolvedBasis::Dct),
            BasisSpec::Dwt { wavelet } => {
                let level = level.ok_or(BasisError::MissingLevel)?;
                if !(1..=MAX_LEVEL).contains(&level) {
                    return Err(BasisError::LevelOutOfRange { level });
                }
                Ok(ResolvedBasis::Dwt(Dwt2d::new(*wavelet, level)))
            }
        }
    }
}

/// A basis with all parameters bound, applicable to one image shape.
#[derive(Clone, Copy, Debug)]
pub enum ResolvedBasis {
    Dct,
    Dwt(Dwt2d),
}

impl ResolvedBasis {
    /// Number of coefficients the basis produces for an `h × w` plane.
    pub fn coeff_len(&self, w: usize, h: usize) -> usize {
        match self {
            ResolvedBasis::Dct => w * h,
            ResolvedBasis::Dwt(dwt) => dwt.coeff_len(w, h),
        }
    }

    /// Dense synthesis operator of shape `(h·w) × coeff_len`.
    pub fn synthesis_matrix(&self, w: usize, h: usize) -> DMatrix<f64> {
        match self {
            ResolvedBasis::Dct => dct::synthesis_matrix(w, h),
            ResolvedBasis::Dwt(dwt) => dwt.synthesis_matrix(w, h),
        }
    }

    /// Forward transform of a plane into coefficient space.
    pub fn forward(&self, plane: &Plane) -> DVector<f64> {
        match self {
            ResolvedBasis::Dct => dct::forward(plane),
            ResolvedBasis::Dwt(dwt) => dwt.forward(plane),
        }
    }

    /// Inverse transform back to an `h × w` plane.
    pub fn inverse(&self, coeffs: &DVector<f64>, w: usize, h: usize) -> Plane {
        match self {
            ResolvedBasis::Dct => dct::inverse(coeffs, w, h),
            ResolvedBasis::Dwt(dwt) => dwt.inverse(coeffs, w, h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_plane(w: usize, h: usize) -> Plane {
        let data: Vec<f64> = (0..w * h).map(|i| i as f64).collect();
        Plane::from_vec(w, h, data)
    }

    #[test]
    fn dct_resolves_without_a_level() {
        assert!(matches!(
            BasisSpec::Dct.resolve(None),
            Ok(ResolvedBasis::Dct)
        ));
    }

    #[test]
    fn dwt_requires_a_level_to_resolve() {
        let basis = BasisSpec::Dwt {
            wavelet: Wavelet::Haar,
        };
        assert_eq!(basis.resolve(None).unwrap_err(), BasisError::MissingLevel);
        assert!(basis.resolve(Some(2)).is_ok());
    }

    #[test]
    fn out_of_range_levels_are_rejected_without_panicking() {
        let basis = BasisSpec::Dwt {
            wavelet: Wavelet::Haar,
        };
        for level in [0, MAX_LEVEL + 1, 99] {
            assert_eq!(
                basis.resolve(Some(level)).unwrap_err(),
                BasisError::LevelOutOfRange { level }
            );
        }
    }

    #[test]
    fn resolved_bases_round_trip_a_plane() {
        let plane = ramp_plane(7, 5);
        let specs = [
            BasisSpec::Dct.resolve(None).unwrap(),
            BasisSpec::Dwt {
                wavelet: Wavelet::Db2,
            }
            .resolve(Some(2))
            .unwrap(),
        ];
        for basis in specs {
            let coeffs = basis.forward(&plane);
            assert_eq!(coeffs.len(), basis.coeff_len(plane.w, plane.h));
            let back = basis.inverse(&coeffs, plane.w, plane.h);
            for (a, b) in plane.data.iter().zip(&back.data) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }
}
