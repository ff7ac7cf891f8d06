//! Reconstruction quality scoring.

use crate::image::PixelImage;

/// Normalized per-pixel reconstruction error: squared pixel differences
/// averaged over channels first, then over all pixels. Identical inputs
/// score exactly `0.0`; the squared term is symmetric in its arguments.
///
/// Panics if the two images disagree in shape or channel count; the
/// pipeline always scores a reconstruction against its own input.
pub fn reconstruction_error(original: &PixelImage, reconstructed: &PixelImage) -> f64 {
    assert_eq!(
        (original.w, original.h, original.channels()),
        (reconstructed.w, reconstructed.h, reconstructed.channels()),
        "cannot score images of different shapes"
    );
    let pixels = original.pixels_per_plane();
    if pixels == 0 {
        return 0.0;
    }
    let channels = original.channels() as f64;
    let mut total = 0.0;
    for (a, b) in original.planes.iter().zip(&reconstructed.planes) {
        for (&x, &y) in a.data.iter().zip(&b.data) {
            let d = x - y;
            total += d * d;
        }
    }
    total / channels / pixels as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{PixelImage, Plane};

    fn gray(w: usize, h: usize, data: Vec<f64>) -> PixelImage {
        PixelImage::grayscale(Plane::from_vec(w, h, data))
    }

    #[test]
    fn identical_images_score_zero() {
        let img = gray(3, 2, vec![0.0, 10.0, 20.0, 30.0, 40.0, 250.0]);
        assert_eq!(reconstruction_error(&img, &img), 0.0);
    }

    #[test]
    fn error_is_mean_squared_difference() {
        let a = gray(2, 2, vec![0.0, 0.0, 0.0, 0.0]);
        let b = gray(2, 2, vec![2.0, 0.0, 0.0, 0.0]);
        // One pixel off by 2 over 4 pixels: 4/4 = 1.
        assert!((reconstruction_error(&a, &b) - 1.0).abs() < 1e-12);
        assert_eq!(
            reconstruction_error(&a, &b),
            reconstruction_error(&b, &a),
            "squared term must be symmetric"
        );
    }

    #[test]
    fn color_error_averages_channels_first() {
        let zero = Plane::from_vec(2, 1, vec![0.0, 0.0]);
        let off = Plane::from_vec(2, 1, vec![3.0, 0.0]);
        let a = PixelImage::from_planes(vec![zero.clone(), zero.clone(), zero.clone()]);
        let b = PixelImage::from_planes(vec![off, zero.clone(), zero]);
        // Squared diff 9 in one of three channels at one of two pixels.
        assert!((reconstruction_error(&a, &b) - 9.0 / 3.0 / 2.0).abs() < 1e-12);
    }
}
