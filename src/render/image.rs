use crate::error::MapError;
use macroquad::prelude::{vec2, Color, Rect, Vec2, WHITE};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Per-call drawing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOptions {
    /// Negative components mirror the image along that axis
    pub scale: Vec2,
    /// Radians, clockwise
    pub rotation: f32,
    /// Region of the source image to draw; the whole image when `None`
    pub section: Option<Rect>,
    /// Tint multiplied into the image
    pub blend: Color,
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions {
            scale: Vec2::ONE,
            rotation: 0.0,
            section: None,
            blend: WHITE,
        }
    }
}

impl DrawOptions {
    /// Sets the per-axis scale.
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = vec2(x, y);
        self
    }

    /// Sets the rotation in radians.
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Restricts drawing to a region of the source image.
    pub fn with_section(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.section = Some(Rect::new(x, y, w, h));
        self
    }

    /// Sets the tint colour.
    pub fn with_blend(mut self, blend: Color) -> Self {
        self.blend = blend;
        self
    }
}

/// A drawable image, such as a tile atlas.
pub trait Image {
    /// Width in pixels
    fn width(&self) -> f32;
    /// Height in pixels
    fn height(&self) -> f32;
    /// Draws the image (or `options.section` of it) with its top left at `(x, y)`.
    fn draw_from_top_left(&self, x: f32, y: f32, options: &DrawOptions);
}

/// Turns a file path into an [`Image`].
pub trait ImageLoader {
    /// Reads and decodes the image at `path`.
    fn load(&self, path: &Path) -> Result<Rc<dyn Image>, MapError>;
}

/// Loaded images keyed by path.
///
/// Owned by whoever builds maps; pass the same cache to several
/// [`TiledMap::load_with`](crate::TiledMap::load_with) calls to share atlases.
pub struct ImageCache {
    loader: Box<dyn ImageLoader>,
    images: HashMap<PathBuf, Rc<dyn Image>>,
}

impl ImageCache {
    /// An empty cache that loads through `loader`.
    pub fn new(loader: impl ImageLoader + 'static) -> Self {
        ImageCache {
            loader: Box::new(loader),
            images: HashMap::new(),
        }
    }

    /// The cached image for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Rc<dyn Image>, MapError> {
        if let Some(image) = self.images.get(path) {
            return Ok(Rc::clone(image));
        }
        let image = self.loader.load(path)?;
        log::debug!("Loaded image {}", path.display());
        self.images.insert(path.to_path_buf(), Rc::clone(&image));
        Ok(image)
    }

    /// Whether `path` is already loaded.
    pub fn contains(&self, path: &Path) -> bool {
        self.images.contains_key(path)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drops every cached image. Maps already built keep their own handles.
    pub fn clear(&mut self) {
        self.images.clear();
    }
}

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCache")
            .field("images", &self.images.keys().collect::<Vec<_>>())
            .finish()
    }
}
