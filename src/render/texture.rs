use super::image::{DrawOptions, Image, ImageLoader};
use crate::error::MapError;
use macroquad::prelude::{draw_texture_ex, vec2, DrawTextureParams, FilterMode, Texture2D};
use macroquad::texture::Image as Bitmap;
use std::path::Path;
use std::rc::Rc;

/// A macroquad texture behind the [`Image`] interface.
pub struct TextureImage {
    tex: Texture2D,
}

impl TextureImage {
    /// Wraps a texture, switching it to nearest-neighbour filtering.
    pub fn new(tex: Texture2D) -> Self {
        tex.set_filter(FilterMode::Nearest);
        TextureImage { tex }
    }

    /// The underlying texture.
    pub fn texture(&self) -> &Texture2D {
        &self.tex
    }
}

impl Image for TextureImage {
    fn width(&self) -> f32 {
        self.tex.width()
    }

    fn height(&self) -> f32 {
        self.tex.height()
    }

    fn draw_from_top_left(&self, x: f32, y: f32, options: &DrawOptions) {
        let (w, h) = match options.section {
            Some(rect) => (rect.w, rect.h),
            None => (self.tex.width(), self.tex.height()),
        };
        draw_texture_ex(
            &self.tex,
            x,
            y,
            options.blend,
            DrawTextureParams {
                dest_size: Some(vec2(w * options.scale.x.abs(), h * options.scale.y.abs())),
                source: options.section,
                rotation: options.rotation,
                flip_x: options.scale.x < 0.0,
                flip_y: options.scale.y < 0.0,
                ..Default::default()
            },
        );
    }
}

/// Loads image files into GPU textures. Needs a live macroquad context.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextureLoader;

impl ImageLoader for TextureLoader {
    fn load(&self, path: &Path) -> Result<Rc<dyn Image>, MapError> {
        let bitmap = decode_image(path)?;
        Ok(Rc::new(TextureImage::new(Texture2D::from_image(&bitmap))))
    }
}

// CPU-side decode; no graphics context involved.
fn decode_image(path: &Path) -> Result<Bitmap, MapError> {
    let bytes = std::fs::read(path).map_err(|source| MapError::io(path, source))?;
    Bitmap::from_file_with_format(&bytes, None)
        .map_err(|err| MapError::malformed(path, format!("not a decodable image: {err}")))
}
