//! I/O helpers for pixel images and JSON reports.
//!
//! - `load_pixel_image`: read a PNG/JPEG/etc. into f64 planes in `[0, 255]`.
//! - `save_image_png`: write a reconstructed [`PixelImage`] back to disk.
//! - `write_json_file`: pretty-print a serializable value to disk.

use super::{ColorMode, PixelImage, Plane};
use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk, converting to grayscale or RGB planes
/// depending on `mode`. Pixel values are kept in `[0, 255]`.
pub fn load_pixel_image(path: &Path, mode: ColorMode) -> Result<PixelImage, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    Ok(match mode {
        ColorMode::Black => {
            let gray = img.into_luma8();
            let (w, h) = (gray.width() as usize, gray.height() as usize);
            let data = gray.into_raw().iter().map(|&v| v as f64).collect();
            PixelImage::grayscale(Plane::from_vec(w, h, data))
        }
        ColorMode::Color => {
            let rgb = img.into_rgb8();
            let (w, h) = (rgb.width() as usize, rgb.height() as usize);
            let mut planes = vec![Plane::new(w, h); 3];
            for (x, y, px) in rgb.enumerate_pixels() {
                for c in 0..3 {
                    planes[c].set(x as usize, y as usize, px.0[c] as f64);
                }
            }
            PixelImage::from_planes(planes)
        }
    })
}

/// Save a reconstruction as PNG, clamping values into `[0, 255]`.
pub fn save_image_png(img: &PixelImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let (w, h) = (img.w as u32, img.h as u32);
    let result = if img.is_color() {
        let mut out = RgbImage::new(w, h);
        for y in 0..img.h {
            for x in 0..img.w {
                let px = [
                    img.planes[0].get(x, y).clamp(0.0, 255.0) as u8,
                    img.planes[1].get(x, y).clamp(0.0, 255.0) as u8,
                    img.planes[2].get(x, y).clamp(0.0, 255.0) as u8,
                ];
                out.put_pixel(x as u32, y as u32, Rgb(px));
            }
        }
        out.save(path)
    } else {
        let mut out = GrayImage::new(w, h);
        for y in 0..img.h {
            for x in 0..img.w {
                let v = img.planes[0].get(x, y).clamp(0.0, 255.0) as u8;
                out.put_pixel(x as u32, y as u32, Luma([v]));
            }
        }
        out.save(path)
    };
    result.map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
