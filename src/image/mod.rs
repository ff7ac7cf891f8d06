pub mod io;
pub mod planes;

pub use self::planes::{ColorMode, PixelImage, Plane};
