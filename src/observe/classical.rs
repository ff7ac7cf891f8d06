//! Classical pixel sampling: each row of `W` is a single unit impulse at
//! a distinct pixel location, so the measurements are raw pixel values.

use super::ObservationError;
use nalgebra::DMatrix;
use rand::rngs::StdRng;

pub(super) fn generate(
    w: usize,
    h: usize,
    num_cells: usize,
    rng: &mut StdRng,
) -> Result<DMatrix<f64>, ObservationError> {
    let pixels = w * h;
    if num_cells > pixels {
        return Err(ObservationError::TooManyCells {
            requested: num_cells,
            pixels,
        });
    }
    let chosen = rand::seq::index::sample(rng, pixels, num_cells);
    let mut mtx = DMatrix::zeros(num_cells, pixels);
    for (row, idx) in chosen.into_iter().enumerate() {
        mtx[(row, idx)] = 1.0;
    }
    Ok(mtx)
}
