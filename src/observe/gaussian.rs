//! Gaussian random projections: dense i.i.d. N(0,1) measurement matrix.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

pub(super) fn generate(w: usize, h: usize, num_cells: usize, rng: &mut StdRng) -> DMatrix<f64> {
    DMatrix::from_fn(num_cells, w * h, |_, _| rng.sample(StandardNormal))
}
