//! Multi-level separable 2-D discrete wavelet transform.
//!
//! Periodized orthonormal filter banks over the closed family set
//! {haar, db2, db4}. Odd extents are padded by edge replication before
//! each level and the padding is undone on synthesis, so
//! `inverse(forward(x))` reproduces the exact input shape for any image
//! size and any level in `[1, 4]`.
//!
//! Coefficient layout (flat, row-major blocks): the deepest approximation
//! band first, then per level from deepest to shallowest the horizontal,
//! vertical and diagonal detail bands.

use crate::image::Plane;
use nalgebra::{DMatrix, DVector};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Maximum supported decomposition level.
pub const MAX_LEVEL: usize = 4;

/// Orthonormal wavelet family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wavelet {
    Haar,
    Db2,
    Db4,
}

impl Wavelet {
    /// Lowpass (scaling) analysis filter taps.
    pub fn lowpass(&self) -> &'static [f64] {
        match self {
            Wavelet::Haar => &[std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
            Wavelet::Db2 => &[
                0.482_962_913_144_690_25,
                0.836_516_303_737_469,
                0.224_143_868_041_857_35,
                -0.129_409_522_550_921_45,
            ],
            Wavelet::Db4 => &[
                0.230_377_813_308_855_23,
                0.714_846_570_552_541_5,
                0.630_880_767_929_590_4,
                -0.027_983_769_416_983_85,
                -0.187_034_811_718_881_14,
                0.030_841_381_835_986_965,
                0.032_883_011_666_982_945,
                -0.010_597_401_784_997_278,
            ],
        }
    }

    /// Quadrature-mirror highpass taps: `g[k] = (-1)^k · h[L-1-k]`.
    pub fn highpass(&self) -> Vec<f64> {
        let lo = self.lowpass();
        let taps = lo.len();
        (0..taps)
            .map(|k| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * lo[taps - 1 - k]
            })
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Wavelet::Haar => "haar",
            Wavelet::Db2 => "db2",
            Wavelet::Db4 => "db4",
        }
    }
}

impl FromStr for Wavelet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "haar" => Ok(Wavelet::Haar),
            "db2" => Ok(Wavelet::Db2),
            "db4" => Ok(Wavelet::Db4),
            other => Err(format!(
                "unknown wavelet '{other}' (supported: haar, db2, db4)"
            )),
        }
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape bookkeeping for one decomposition level.
#[derive(Clone, Copy, Debug)]
struct LevelShape {
    in_w: usize,
    in_h: usize,
    pad_w: usize,
    pad_h: usize,
}

impl LevelShape {
    fn band_w(&self) -> usize {
        self.pad_w / 2
    }
    fn band_h(&self) -> usize {
        self.pad_h / 2
    }
}

/// Multi-level separable 2-D DWT with exact-shape inversion.
#[derive(Clone, Copy, Debug)]
pub struct Dwt2d {
    pub wavelet: Wavelet,
    pub level: usize,
}

impl Dwt2d {
    /// Construct a transform; `level` must lie in `[1, MAX_LEVEL]`.
    pub fn new(wavelet: Wavelet, level: usize) -> Self {
        assert!(
            (1..=MAX_LEVEL).contains(&level),
            "decomposition level must be in [1, {MAX_LEVEL}], got {level}"
        );
        Self { wavelet, level }
    }

    fn layout(&self, w: usize, h: usize) -> Vec<LevelShape> {
        let (mut cw, mut ch) = (w, h);
        (0..self.level)
            .map(|_| {
                let shape = LevelShape {
                    in_w: cw,
                    in_h: ch,
                    pad_w: cw + (cw & 1),
                    pad_h: ch + (ch & 1),
                };
                cw = shape.band_w();
                ch = shape.band_h();
                shape
            })
            .collect()
    }

    /// Length of the flat coefficient vector for an `h × w` plane.
    pub fn coeff_len(&self, w: usize, h: usize) -> usize {
        let layout = self.layout(w, h);
        let deepest = layout.last().expect("level >= 1");
        deepest.band_w() * deepest.band_h()
            + layout
                .iter()
                .map(|s| 3 * s.band_w() * s.band_h())
                .sum::<usize>()
    }

    /// Analyze a plane into the flat coefficient vector.
    pub fn forward(&self, plane: &Plane) -> DVector<f64> {
        let lo = self.wavelet.lowpass();
        let hi = self.wavelet.highpass();
        let mut approx = DMatrix::from_row_slice(plane.h, plane.w, &plane.data);
        // details[i] holds (lh, hl, hh) of level i+1
        let mut details = Vec::with_capacity(self.level);
        for _ in 0..self.level {
            let (ll, lh, hl, hh) = analyze_level(&approx, lo, &hi);
            details.push((lh, hl, hh));
            approx = ll;
        }
        let mut out = Vec::with_capacity(self.coeff_len(plane.w, plane.h));
        push_row_major(&mut out, &approx);
        for (lh, hl, hh) in details.iter().rev() {
            push_row_major(&mut out, lh);
            push_row_major(&mut out, hl);
            push_row_major(&mut out, hh);
        }
        DVector::from_vec(out)
    }

    /// Synthesize a plane of the original `h × w` shape from coefficients.
    pub fn inverse(&self, coeffs: &DVector<f64>, w: usize, h: usize) -> Plane {
        assert_eq!(
            coeffs.len(),
            self.coeff_len(w, h),
            "coefficient vector length mismatch"
        );
        let lo = self.wavelet.lowpass();
        let hi = self.wavelet.highpass();
        let layout = self.layout(w, h);
        let deepest = layout.last().expect("level >= 1");

        let mut offset = 0usize;
        let mut approx = take_block(coeffs, &mut offset, deepest.band_h(), deepest.band_w());
        for shape in layout.iter().rev() {
            let lh = take_block(coeffs, &mut offset, shape.band_h(), shape.band_w());
            let hl = take_block(coeffs, &mut offset, shape.band_h(), shape.band_w());
            let hh = take_block(coeffs, &mut offset, shape.band_h(), shape.band_w());
            approx = synthesize_level(&approx, &lh, &hl, &hh, lo, &hi, shape);
        }
        let mut data = Vec::with_capacity(w * h);
        for r in 0..h {
            for c in 0..w {
                data.push(approx[(r, c)]);
            }
        }
        Plane::from_vec(w, h, data)
    }

    /// Dense synthesis operator mapping the flat coefficient vector to
    /// pixels, shape `(h·w) × coeff_len`. Built column-by-column from
    /// coefficient impulses, mirroring how the basis is folded into the
    /// measurement system.
    pub fn synthesis_matrix(&self, w: usize, h: usize) -> DMatrix<f64> {
        let m = self.coeff_len(w, h);
        let mut s = DMatrix::zeros(w * h, m);
        let mut impulse = DVector::zeros(m);
        for j in 0..m {
            impulse[j] = 1.0;
            let plane = self.inverse(&impulse, w, h);
            for (i, &v) in plane.data.iter().enumerate() {
                s[(i, j)] = v;
            }
            impulse[j] = 0.0;
        }
        s
    }
}

/// One analysis step on a 1-D signal: edge-pad to even length, then
/// periodized filtering and dyadic downsampling.
fn analyze1d(x: &[f64], lo: &[f64], hi: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut v = x.to_vec();
    if v.len() % 2 == 1 {
        v.push(*v.last().expect("non-empty signal"));
    }
    let n = v.len();
    let half = n / 2;
    let mut a = vec![0.0; half];
    let mut d = vec![0.0; half];
    for i in 0..half {
        let mut sa = 0.0;
        let mut sd = 0.0;
        for (k, (&l, &g)) in lo.iter().zip(hi.iter()).enumerate() {
            let s = v[(2 * i + k) % n];
            sa += l * s;
            sd += g * s;
        }
        a[i] = sa;
        d[i] = sd;
    }
    (a, d)
}

/// Inverse of [`analyze1d`]: transpose scatter over the periodized
/// filters, then truncation of the replicated pad sample.
fn synthesize1d(a: &[f64], d: &[f64], lo: &[f64], hi: &[f64], out_len: usize) -> Vec<f64> {
    let half = a.len();
    let n = 2 * half;
    let mut v = vec![0.0; n];
    for i in 0..half {
        for (k, (&l, &g)) in lo.iter().zip(hi.iter()).enumerate() {
            let j = (2 * i + k) % n;
            v[j] += l * a[i] + g * d[i];
        }
    }
    v.truncate(out_len);
    v
}

fn analyze_level(
    m: &DMatrix<f64>,
    lo: &[f64],
    hi: &[f64],
) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
    let (rows, cols) = (m.nrows(), m.ncols());
    let half_w = (cols + (cols & 1)) / 2;
    let half_h = (rows + (rows & 1)) / 2;

    // Rows first: lowpass and highpass half-width panels.
    let mut low = DMatrix::zeros(rows, half_w);
    let mut high = DMatrix::zeros(rows, half_w);
    let mut row_buf = vec![0.0; cols];
    for r in 0..rows {
        for c in 0..cols {
            row_buf[c] = m[(r, c)];
        }
        let (a, d) = analyze1d(&row_buf, lo, hi);
        for c in 0..half_w {
            low[(r, c)] = a[c];
            high[(r, c)] = d[c];
        }
    }

    // Then columns of each panel.
    let split_cols = |panel: &DMatrix<f64>| {
        let mut top = DMatrix::zeros(half_h, half_w);
        let mut bottom = DMatrix::zeros(half_h, half_w);
        let mut col_buf = vec![0.0; rows];
        for c in 0..half_w {
            for r in 0..rows {
                col_buf[r] = panel[(r, c)];
            }
            let (a, d) = analyze1d(&col_buf, lo, hi);
            for r in 0..half_h {
                top[(r, c)] = a[r];
                bottom[(r, c)] = d[r];
            }
        }
        (top, bottom)
    };
    let (ll, lh) = split_cols(&low);
    let (hl, hh) = split_cols(&high);
    (ll, lh, hl, hh)
}

fn synthesize_level(
    ll: &DMatrix<f64>,
    lh: &DMatrix<f64>,
    hl: &DMatrix<f64>,
    hh: &DMatrix<f64>,
    lo: &[f64],
    hi: &[f64],
    shape: &LevelShape,
) -> DMatrix<f64> {
    let band_w = shape.band_w();

    // Columns first, undoing the column split of each panel.
    let merge_cols = |top: &DMatrix<f64>, bottom: &DMatrix<f64>| {
        let mut panel = DMatrix::zeros(shape.in_h, band_w);
        for c in 0..band_w {
            let a: Vec<f64> = (0..top.nrows()).map(|r| top[(r, c)]).collect();
            let d: Vec<f64> = (0..bottom.nrows()).map(|r| bottom[(r, c)]).collect();
            let col = synthesize1d(&a, &d, lo, hi, shape.in_h);
            for (r, &v) in col.iter().enumerate() {
                panel[(r, c)] = v;
            }
        }
        panel
    };
    let low = merge_cols(ll, lh);
    let high = merge_cols(hl, hh);

    // Then rows.
    let mut out = DMatrix::zeros(shape.in_h, shape.in_w);
    for r in 0..shape.in_h {
        let a: Vec<f64> = (0..band_w).map(|c| low[(r, c)]).collect();
        let d: Vec<f64> = (0..band_w).map(|c| high[(r, c)]).collect();
        let row = synthesize1d(&a, &d, lo, hi, shape.in_w);
        for (c, &v) in row.iter().enumerate() {
            out[(r, c)] = v;
        }
    }
    out
}

fn push_row_major(out: &mut Vec<f64>, m: &DMatrix<f64>) {
    for r in 0..m.nrows() {
        for c in 0..m.ncols() {
            out.push(m[(r, c)]);
        }
    }
}

fn take_block(coeffs: &DVector<f64>, offset: &mut usize, rows: usize, cols: usize) -> DMatrix<f64> {
    let len = rows * cols;
    let block = DMatrix::from_row_slice(rows, cols, &coeffs.as_slice()[*offset..*offset + len]);
    *offset += len;
    block
}
