use sparse_recon::image::{PixelImage, Plane};

/// Smooth horizontal gradient, easy to recover from few measurements.
pub fn gradient_plane(w: usize, h: usize) -> Plane {
    let mut plane = Plane::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = 255.0 * x as f64 / (w.max(2) - 1) as f64;
            plane.set(x, y, v);
        }
    }
    plane
}

/// Grayscale gradient image.
pub fn gradient_image(w: usize, h: usize) -> PixelImage {
    PixelImage::grayscale(gradient_plane(w, h))
}

/// Three-channel synthetic image with distinct per-channel content.
pub fn color_image(w: usize, h: usize) -> PixelImage {
    let mut planes = Vec::with_capacity(3);
    for c in 0..3usize {
        let mut plane = Plane::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = ((x + y * (c + 1) + c * 37) % 256) as f64;
                plane.set(x, y, v);
            }
        }
        planes.push(plane);
    }
    PixelImage::from_planes(planes)
}
