//! Orthonormal 2-D discrete cosine transform.
//!
//! The 2-D transform of an `h × w` plane `X` is `C_h · X · C_w^T` with
//! `C_n` the orthonormal DCT-II matrix. With row-major flattening this is
//! the Kronecker product `C_h ⊗ C_w`, so the synthesis operator folded
//! into the measurement system is its transpose.

use crate::image::Plane;
use nalgebra::{DMatrix, DVector};

/// Orthonormal DCT-II analysis matrix of size `n × n`.
pub fn dct_matrix(n: usize) -> DMatrix<f64> {
    assert!(n > 0, "DCT size must be positive");
    let mut c = DMatrix::zeros(n, n);
    let norm0 = (1.0 / n as f64).sqrt();
    let norm = (2.0 / n as f64).sqrt();
    for k in 0..n {
        let s = if k == 0 { norm0 } else { norm };
        for i in 0..n {
            let angle = std::f64::consts::PI * (2 * i + 1) as f64 * k as f64 / (2 * n) as f64;
            c[(k, i)] = s * angle.cos();
        }
    }
    c
}

/// Forward 2-D DCT of a plane, flattened row-major.
pub fn forward(plane: &Plane) -> DVector<f64> {
    let x = DMatrix::from_row_slice(plane.h, plane.w, &plane.data);
    let ch = dct_matrix(plane.h);
    let cw = dct_matrix(plane.w);
    let theta = &ch * x * cw.transpose();
    row_major_vec(&theta)
}

/// Inverse 2-D DCT of a row-major coefficient vector.
pub fn inverse(coeffs: &DVector<f64>, w: usize, h: usize) -> Plane {
    assert_eq!(coeffs.len(), w * h, "coefficient length must equal w * h");
    let theta = DMatrix::from_row_slice(h, w, coeffs.as_slice());
    let ch = dct_matrix(h);
    let cw = dct_matrix(w);
    let x = ch.transpose() * theta * cw;
    Plane::from_vec(w, h, row_major_vec(&x).as_slice().to_vec())
}

/// Dense synthesis operator mapping DCT coefficients to pixels:
/// `C_h^T ⊗ C_w^T`, of shape `(h·w) × (h·w)`.
pub fn synthesis_matrix(w: usize, h: usize) -> DMatrix<f64> {
    let ch_t = dct_matrix(h).transpose();
    let cw_t = dct_matrix(w).transpose();
    ch_t.kronecker(&cw_t)
}

fn row_major_vec(m: &DMatrix<f64>) -> DVector<f64> {
    let mut out = Vec::with_capacity(m.nrows() * m.ncols());
    for r in 0..m.nrows() {
        for c in 0..m.ncols() {
            out.push(m[(r, c)]);
        }
    }
    DVector::from_vec(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dct_matrix_is_orthonormal() {
        let c = dct_matrix(7);
        let gram = &c * c.transpose();
        let id = DMatrix::<f64>::identity(7, 7);
        assert!(
            (gram - id).abs().max() < 1e-10,
            "DCT-II rows should be orthonormal"
        );
    }

    #[test]
    fn forward_inverse_round_trip() {
        let plane = Plane::from_vec(3, 4, (0..12).map(|v| v as f64 * 3.5).collect());
        let coeffs = forward(&plane);
        let back = inverse(&coeffs, 3, 4);
        for (a, b) in plane.data.iter().zip(&back.data) {
            assert!((a - b).abs() < 1e-9, "round trip mismatch: {a} vs {b}");
        }
    }

    #[test]
    fn synthesis_matrix_matches_inverse_transform() {
        let (w, h) = (4, 3);
        let s = synthesis_matrix(w, h);
        let coeffs = DVector::from_fn(w * h, |i, _| (i as f64 * 0.7).sin());
        let via_matrix = &s * &coeffs;
        let via_transform = inverse(&coeffs, w, h);
        for (a, b) in via_matrix.iter().zip(&via_transform.data) {
            assert!((a - b).abs() < 1e-9, "synthesis operator disagrees with inverse");
        }
    }
}
