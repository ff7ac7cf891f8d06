//! Owned pixel containers used throughout the reconstruction pipeline.
//!
//! A [`Plane`] is a single channel of f64 intensities in row-major layout;
//! a [`PixelImage`] stacks one (grayscale) or three (RGB) planes. Values
//! are expected to live in `[0, 255]`.

use nalgebra::DVector;
use serde::Deserialize;

/// Owned single-channel f64 image in row-major layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order, `h * w` elements
    pub data: Vec<f64>,
}

impl Plane {
    /// Construct a zero-initialized plane of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    /// Wrap an existing row-major buffer. Panics if the length is not `w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), w * h, "plane buffer length must equal w * h");
        Self { w, h, data }
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f64) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Number of pixels in the plane.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the plane holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flatten into a column vector (row-major pixel order).
    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.data)
    }

    /// Rebuild a plane from a flattened pixel vector.
    pub fn from_vector(w: usize, h: usize, v: &DVector<f64>) -> Self {
        Self::from_vec(w, h, v.as_slice().to_vec())
    }

    /// Clamp every pixel into the valid intensity range `[0, 255]`.
    pub fn clip(&mut self) {
        for v in &mut self.data {
            *v = v.clamp(0.0, 255.0);
        }
    }
}

/// Color handling requested for loading and reconstruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Grayscale: a single plane.
    Black,
    /// RGB: three planes, reconstructed independently.
    Color,
}

/// One- or three-plane image shared read-only across sweep trials.
#[derive(Clone, Debug)]
pub struct PixelImage {
    pub w: usize,
    pub h: usize,
    pub planes: Vec<Plane>,
}

impl PixelImage {
    /// Wrap a single grayscale plane.
    pub fn grayscale(plane: Plane) -> Self {
        Self {
            w: plane.w,
            h: plane.h,
            planes: vec![plane],
        }
    }

    /// Stack planes into a color image. Panics on inconsistent shapes
    /// or an unsupported channel count.
    pub fn from_planes(planes: Vec<Plane>) -> Self {
        assert!(
            planes.len() == 1 || planes.len() == 3,
            "expected 1 or 3 planes, got {}",
            planes.len()
        );
        let (w, h) = (planes[0].w, planes[0].h);
        assert!(
            planes.iter().all(|p| p.w == w && p.h == h),
            "all planes must share the same shape"
        );
        Self { w, h, planes }
    }

    /// Number of channels (1 or 3).
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// True for three-channel images.
    pub fn is_color(&self) -> bool {
        self.planes.len() == 3
    }

    /// Total pixel count of one plane (`w * h`).
    pub fn pixels_per_plane(&self) -> usize {
        self.w * self.h
    }
}
