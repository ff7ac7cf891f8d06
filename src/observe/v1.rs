//! V1-inspired receptive-field sampling.
//!
//! Each measurement row is one simple-cell-like kernel: a Gaussian
//! envelope of spatial extent `cell_size`, modulated by a sinusoid at
//! `sparse_freq` cycles per field, centered anywhere in the image with a
//! uniformly random orientation and phase. Kernels that overlap the image
//! boundary are clipped to the valid pixel range; a field wider than the
//! whole image simply covers it entirely.

use super::ObservationError;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;
use std::f64::consts::PI;

/// Receptive-field parameters, required for the V1 observation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct V1Params {
    /// Spatial extent of a field in pixels.
    pub cell_size: usize,
    /// Oscillation frequency within a field (cycles per field).
    pub sparse_freq: f64,
}

pub(super) fn generate(
    w: usize,
    h: usize,
    num_cells: usize,
    params: &V1Params,
    rng: &mut StdRng,
) -> Result<DMatrix<f64>, ObservationError> {
    if params.cell_size == 0 {
        return Err(ObservationError::InvalidCellSize {
            cell_size: params.cell_size,
        });
    }
    let pixels = w * h;
    let mut mtx = DMatrix::zeros(num_cells, pixels);

    let extent = params.cell_size as f64;
    let sigma = extent / 2.0;
    // Angular frequency of the carrier across the field extent.
    let omega = 2.0 * PI * params.sparse_freq / extent;
    // Support radius: the envelope is negligible past two sigmas.
    let radius = (2.0 * sigma).ceil() as i64;

    for row in 0..num_cells {
        let cx = rng.gen_range(0.0..w as f64);
        let cy = rng.gen_range(0.0..h as f64);
        let theta = rng.gen_range(0.0..PI);
        let phase = rng.gen_range(0.0..2.0 * PI);
        let (sin_t, cos_t) = theta.sin_cos();

        // Clip the field window to the image; off-edge parts are dropped.
        let x0 = ((cx as i64) - radius).max(0) as usize;
        let x1 = (((cx as i64) + radius) as usize).min(w.saturating_sub(1));
        let y0 = ((cy as i64) - radius).max(0) as usize;
        let y1 = (((cy as i64) + radius) as usize).min(h.saturating_sub(1));

        let mut norm_sq = 0.0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let envelope = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
                let along = dx * cos_t + dy * sin_t;
                let v = envelope * (omega * along + phase).cos();
                mtx[(row, y * w + x)] = v;
                norm_sq += v * v;
            }
        }
        // Unit-energy rows keep measurement scales comparable across
        // cell sizes. A vanishing kernel (carrier zero-crossing aligned
        // with every covered pixel) is left as-is.
        if norm_sq > 1e-12 {
            let inv = 1.0 / norm_sq.sqrt();
            for c in 0..pixels {
                mtx[(row, c)] *= inv;
            }
        }
    }
    Ok(mtx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params(cell_size: usize, sparse_freq: f64) -> V1Params {
        V1Params {
            cell_size,
            sparse_freq,
        }
    }

    #[test]
    fn oversized_fields_clip_instead_of_panicking() {
        let mut rng = StdRng::seed_from_u64(5);
        // cell_size far larger than a tiny non-square image
        let mtx = generate(5, 3, 8, &params(64, 2.0), &mut rng).unwrap();
        assert_eq!((mtx.nrows(), mtx.ncols()), (8, 15));
        assert!(mtx.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn kernels_are_localized() {
        let mut rng = StdRng::seed_from_u64(17);
        let (w, h) = (32, 32);
        let mtx = generate(w, h, 4, &params(4, 1.0), &mut rng).unwrap();
        for row in 0..4 {
            let support = (0..w * h).filter(|&c| mtx[(row, c)].abs() > 0.0).count();
            assert!(support > 0, "row {row} is empty");
            // A 4-pixel field should touch far fewer pixels than the image.
            assert!(
                support <= 81,
                "row {row} touches {support} pixels, expected a local field"
            );
        }
    }

    #[test]
    fn rows_have_unit_energy() {
        let mut rng = StdRng::seed_from_u64(29);
        let mtx = generate(16, 16, 6, &params(5, 2.0), &mut rng).unwrap();
        for row in 0..6 {
            let norm: f64 = mtx.row(row).iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!(
                (norm - 1.0).abs() < 1e-9 || norm == 0.0,
                "row {row} norm {norm}"
            );
        }
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate(8, 8, 2, &params(0, 1.0), &mut rng).unwrap_err();
        assert!(matches!(err, ObservationError::InvalidCellSize { .. }));
    }
}
