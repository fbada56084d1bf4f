use crate::animation::{Animation, Frame};
use crate::render::Image;
use macroquad::prelude::Rect;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

/// Validated contents of a tile-set document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSetDef {
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Gid of local tile 0
    pub first_gid: u32,
    /// Atlas path, already resolved against the tile-set's directory
    pub image: PathBuf,
    /// Tiles that carry properties or animations
    pub tiles: Vec<TileDef>,
}

/// A `<tile>` element: custom properties and an optional animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDef {
    /// Local tile id
    pub id: u32,
    /// Name and value pairs in document order
    pub properties: Vec<(String, String)>,
    /// `Some` when the tile has an `<animation>` element, even an empty one
    pub animation: Option<Vec<Frame>>,
}

/// Per-tile behaviour, keyed by local tile id.
#[derive(Debug, Clone, Default)]
pub struct TileInformation {
    /// Shared by every cell showing this tile
    pub animation: Option<Rc<Animation>>,
}

/// A single-image tile atlas with per-tile properties and animations.
pub struct TileSet {
    tile_width: u32,
    tile_height: u32,
    first_gid: u32,
    image: Rc<dyn Image>,
    // property name -> gid -> value
    properties: HashMap<String, HashMap<u32, String>>,
    tile_info: HashMap<u32, TileInformation>,
}

impl TileSet {
    /// A tile-set with no properties or animations.
    pub fn new(tile_width: u32, tile_height: u32, first_gid: u32, image: Rc<dyn Image>) -> Self {
        TileSet {
            tile_width,
            tile_height,
            first_gid,
            image,
            properties: HashMap::new(),
            tile_info: HashMap::new(),
        }
    }

    /// Builds the atlas geometry, then layers properties and animations on top.
    /// Animations start their clocks at `start`.
    pub fn from_def(def: TileSetDef, image: Rc<dyn Image>, start: Instant) -> Self {
        let mut ts = TileSet::new(def.tile_width, def.tile_height, def.first_gid, image);
        for tile in def.tiles {
            for (name, value) in tile.properties {
                ts.set_property(name, value, tile.id);
            }
            if let Some(frames) = tile.animation {
                ts.set_animation(tile.id, frames, start);
            }
        }
        log::debug!(
            "Tileset {}x{} (first gid {}): {} properties, {} animated tiles",
            ts.tile_width,
            ts.tile_height,
            ts.first_gid,
            ts.properties.len(),
            ts.tile_info.values().filter(|i| i.animation.is_some()).count()
        );
        ts
    }

    /// Records `value` for `name` on the tile with the given local id.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>, local_id: u32) {
        self.properties
            .entry(name.into())
            .or_default()
            .insert(local_id.saturating_add(self.first_gid), value.into());
    }

    /// Attaches an animation to a local tile id. An empty frame list still
    /// registers the tile, with no animation.
    pub fn set_animation(&mut self, local_id: u32, frames: Vec<Frame>, start: Instant) {
        let animation = Animation::new(frames, start).map(Rc::new);
        self.tile_info.insert(local_id, TileInformation { animation });
    }

    /// Tile width in pixels.
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Tile height in pixels.
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Gid of local tile 0.
    pub fn first_gid(&self) -> u32 {
        self.first_gid
    }

    /// The atlas image.
    pub fn image(&self) -> &Rc<dyn Image> {
        &self.image
    }

    /// Value of `name` for the tile with bare gid `gid`.
    pub fn property(&self, name: &str, gid: u32) -> Option<&str> {
        self.properties.get(name)?.get(&gid).map(String::as_str)
    }

    /// Per-tile information, present for tiles with an `<animation>` element.
    pub fn tile_information(&self, local_id: u32) -> Option<&TileInformation> {
        self.tile_info.get(&local_id)
    }

    /// The animation of a local tile id, if it has frames.
    pub fn animation(&self, local_id: u32) -> Option<&Rc<Animation>> {
        self.tile_info.get(&local_id)?.animation.as_ref()
    }

    /// Converts a bare gid into this tile-set's local id space.
    pub fn local_id(&self, gid: u32) -> Option<u32> {
        gid.checked_sub(self.first_gid)
    }

    /// Atlas columns, from the image width.
    pub fn tiles_per_row(&self) -> u32 {
        if self.tile_width == 0 {
            return 0;
        }
        (self.image.width() as u32) / self.tile_width
    }

    /// Source rectangle of a local tile id inside the atlas image.
    pub fn source_rect(&self, local_id: u32) -> Option<Rect> {
        let cols = self.tiles_per_row();
        if cols == 0 {
            return None;
        }
        let col = local_id % cols;
        let row = local_id / cols;
        Some(Rect::new(
            (col * self.tile_width) as f32,
            (row * self.tile_height) as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        ))
    }
}

impl fmt::Debug for TileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileSet")
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("first_gid", &self.first_gid)
            .field("image_size", &(self.image.width(), self.image.height()))
            .field("properties", &self.properties)
            .field("tile_info", &self.tile_info)
            .finish()
    }
}
