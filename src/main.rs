use sparse_recon::image::{PixelImage, Plane};
use sparse_recon::{
    reconstruction_error, BasisSpec, NumCells, ObservationKind, Reconstructor, TrialParams,
};

fn main() {
    env_logger::init();
    // Demo stub: reconstructs a synthetic gradient from Gaussian projections
    let (w, h) = (16usize, 12usize);
    let data = (0..w * h)
        .map(|i| ((i % w) as f64 / (w - 1) as f64) * 255.0)
        .collect();
    let img = PixelImage::grayscale(Plane::from_vec(w, h, data));

    let rec = Reconstructor::new(ObservationKind::Gaussian, BasisSpec::Dct);
    let params = TrialParams {
        alpha: 0.01,
        num_cells: NumCells::Fraction(0.5),
        ..Default::default()
    };
    match rec.reconstruct(&img, &params) {
        Ok(out) => println!("error={:.6}", reconstruction_error(&img, &out)),
        Err(err) => eprintln!("reconstruction failed: {err}"),
    }
}
