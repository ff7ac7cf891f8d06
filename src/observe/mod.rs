//! Observation generators: measurement matrices for image sampling.
//!
//! Each generator produces a `num_cells × (w·h)` matrix `W`; measurements
//! are `y = W · vec(img)` over the row-major flattened plane. Construction
//! depends only on the observation kind, its parameters and the RNG,
//! never on pixel values.

mod classical;
mod gaussian;
mod v1;

pub use self::v1::V1Params;

use crate::image::Plane;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Closed set of sampling strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    /// Direct sampling of distinct pixel locations.
    Classical,
    /// Dense i.i.d. N(0,1) random projections.
    Gaussian,
    /// Randomly placed and oriented receptive-field kernels.
    V1,
}

impl ObservationKind {
    /// Short name used in output paths and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ObservationKind::Classical => "classical",
            ObservationKind::Gaussian => "gaussian",
            ObservationKind::V1 => "v1",
        }
    }

    /// True when trials of this kind carry receptive-field parameters.
    pub fn uses_v1_params(&self) -> bool {
        matches!(self, ObservationKind::V1)
    }
}

impl FromStr for ObservationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classical" | "pixel" => Ok(ObservationKind::Classical),
            "gaussian" => Ok(ObservationKind::Gaussian),
            "v1" => Ok(ObservationKind::V1),
            other => Err(format!(
                "unknown observation '{other}' (supported: classical, gaussian, v1)"
            )),
        }
    }
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Measurement count, either absolute or as a fraction of the pixel count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumCells {
    Count(usize),
    Fraction(f64),
}

impl NumCells {
    /// Interpret a raw numeric value the way the sweep grids do: values
    /// below 1.0 are fractions of the pixel count, the rest are counts.
    pub fn from_value(v: f64) -> Self {
        if v < 1.0 {
            NumCells::Fraction(v)
        } else {
            NumCells::Count(v.round() as usize)
        }
    }

    /// Resolve to an absolute measurement count for `pixels` total pixels.
    /// Fractions resolve deterministically to `round(f · pixels)`.
    pub fn resolve(&self, pixels: usize) -> usize {
        match self {
            NumCells::Count(n) => *n,
            NumCells::Fraction(f) => (f * pixels as f64).round() as usize,
        }
    }
}

impl Default for NumCells {
    fn default() -> Self {
        NumCells::Fraction(0.5)
    }
}

impl fmt::Display for NumCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumCells::Count(n) => write!(f, "{n}"),
            NumCells::Fraction(v) => write!(f, "{v}"),
        }
    }
}

/// Failures while constructing a measurement matrix.
#[derive(Clone, Debug, PartialEq)]
pub enum ObservationError {
    /// Resolved measurement count is zero.
    NoMeasurements,
    /// Classical sampling cannot draw more distinct pixels than exist.
    TooManyCells { requested: usize, pixels: usize },
    /// V1 observation selected without its receptive-field parameters.
    MissingV1Params,
    /// Receptive-field extent must be positive.
    InvalidCellSize { cell_size: usize },
}

impl fmt::Display for ObservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationError::NoMeasurements => write!(f, "resolved num_cells is zero"),
            ObservationError::TooManyCells { requested, pixels } => write!(
                f,
                "classical sampling requested {requested} distinct pixels but the image has {pixels}"
            ),
            ObservationError::MissingV1Params => {
                write!(f, "V1 observation requires cell_size and sparse_freq")
            }
            ObservationError::InvalidCellSize { cell_size } => {
                write!(f, "receptive-field cell_size must be positive, got {cell_size}")
            }
        }
    }
}

impl std::error::Error for ObservationError {}

/// Build the measurement matrix for one trial.
///
/// `num_cells` is the already-resolved absolute row count; `v1` must be
/// present iff `kind` is [`ObservationKind::V1`] (checked here, before any
/// sampling work).
pub fn generate(
    kind: ObservationKind,
    w: usize,
    h: usize,
    num_cells: usize,
    v1: Option<&V1Params>,
    rng: &mut StdRng,
) -> Result<DMatrix<f64>, ObservationError> {
    if num_cells == 0 {
        return Err(ObservationError::NoMeasurements);
    }
    match kind {
        ObservationKind::Classical => classical::generate(w, h, num_cells, rng),
        ObservationKind::Gaussian => Ok(gaussian::generate(w, h, num_cells, rng)),
        ObservationKind::V1 => {
            let params = v1.ok_or(ObservationError::MissingV1Params)?;
            v1::generate(w, h, num_cells, params, rng)
        }
    }
}

/// Apply a measurement matrix to a plane: `y = W · vec(img)`.
pub fn measure(w_mtx: &DMatrix<f64>, plane: &Plane) -> DVector<f64> {
    debug_assert_eq!(w_mtx.ncols(), plane.len(), "matrix/pixel size mismatch");
    w_mtx * plane.to_vector()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn fraction_resolves_by_rounding() {
        assert_eq!(NumCells::Fraction(0.5).resolve(9), 5); // round(4.5)
        assert_eq!(NumCells::Fraction(0.3).resolve(100), 30);
        assert_eq!(NumCells::Count(42).resolve(100), 42);
    }

    #[test]
    fn from_value_splits_on_one() {
        assert_eq!(NumCells::from_value(0.25), NumCells::Fraction(0.25));
        assert_eq!(NumCells::from_value(50.0), NumCells::Count(50));
    }

    #[test]
    fn generated_matrix_has_requested_rows() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in [ObservationKind::Classical, ObservationKind::Gaussian] {
            let w = generate(kind, 8, 6, 12, None, &mut rng).unwrap();
            assert_eq!((w.nrows(), w.ncols()), (12, 48), "{kind}");
        }
        let params = V1Params {
            cell_size: 3,
            sparse_freq: 1.0,
        };
        let w = generate(ObservationKind::V1, 8, 6, 12, Some(&params), &mut rng).unwrap();
        assert_eq!((w.nrows(), w.ncols()), (12, 48));
    }

    #[test]
    fn v1_without_params_is_rejected_before_sampling() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate(ObservationKind::V1, 4, 4, 4, None, &mut rng).unwrap_err();
        assert_eq!(err, ObservationError::MissingV1Params);
    }

    #[test]
    fn observation_names_parse_strictly() {
        assert_eq!("pixel".parse::<ObservationKind>().unwrap(), ObservationKind::Classical);
        assert_eq!("V1".parse::<ObservationKind>().unwrap(), ObservationKind::V1);
        assert!("fourier".parse::<ObservationKind>().is_err());
    }
}
