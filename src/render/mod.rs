//! Drawing seam: the image collaborator, its macroquad backend and viewport culling.

pub mod cull;
mod image;
mod texture;

pub use cull::{visible_cells, CellRange};
pub use image::{DrawOptions, Image, ImageCache, ImageLoader};
pub use texture::{TextureImage, TextureLoader};

impl Default for ImageCache {
    fn default() -> Self {
        ImageCache::new(TextureLoader)
    }
}
