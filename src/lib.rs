#![doc = include_str!("../README.md")]

pub mod basis;
pub mod config;
pub mod image;
pub mod metrics;
pub mod observe;
pub mod reconstruct;
pub mod solver;
pub mod sweep;

// --- High-level re-exports -------------------------------------------------

pub use crate::basis::{BasisSpec, Wavelet};
pub use crate::metrics::reconstruction_error;
pub use crate::observe::{NumCells, ObservationKind};
pub use crate::reconstruct::{Reconstructor, TrialParams};
pub use crate::sweep::{run_sweep, ResultTable, SweepGrid, SweepOutcome};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use sparse_recon::prelude::*;
///
/// # fn main() {
/// let plane = Plane::from_vec(4, 4, vec![128.0; 16]);
/// let img = PixelImage::grayscale(plane);
/// let rec = Reconstructor::new(ObservationKind::Classical, BasisSpec::Dct);
/// let params = TrialParams {
///     num_cells: NumCells::Count(16),
///     ..Default::default()
/// };
/// let out = rec.reconstruct(&img, &params).unwrap();
/// println!("error = {:.4}", reconstruction_error(&img, &out));
/// # }
/// ```
pub mod prelude {
    pub use crate::basis::{BasisSpec, Wavelet};
    pub use crate::image::{ColorMode, PixelImage, Plane};
    pub use crate::metrics::reconstruction_error;
    pub use crate::observe::{NumCells, ObservationKind};
    pub use crate::reconstruct::{Reconstructor, TrialParams};
    pub use crate::sweep::{run_sweep, SweepGrid};
}
