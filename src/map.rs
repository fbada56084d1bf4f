use crate::error::MapError;
use crate::layer::{Layer, Tile};
use crate::loader::xml_loader::{decode_map, decode_tileset, read_document};
use crate::object::ObjectGroup;
use crate::property;
use crate::render::{visible_cells, DrawOptions, ImageCache};
use crate::tileset::TileSet;
use macroquad::prelude::Vec2;
use std::path::Path;
use std::time::Instant;

/// Knobs for [`TiledMap::load_with`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Accept layer payloads whose cell count differs from `width * height`.
    /// Missing cells are left empty and surplus data is ignored. Off by default,
    /// in which case such a layer fails to load.
    pub allow_layer_size_mismatch: bool,
}

/// A map loaded from a `.tmx` document and its single `.tsx` tile-set.
#[derive(Debug)]
pub struct TiledMap {
    layers: Vec<Layer>,       // draw order: bottom first
    object_groups: Vec<ObjectGroup>,
    tile_set: TileSet,
}

impl TiledMap {
    /// Loads a map with default options and a private image cache.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let mut cache = ImageCache::default();
        Self::load_with(path, &mut cache, &LoadOptions::default())
    }

    /// Loads a map, taking its atlas image from (or adding it to) `cache`.
    pub fn load_with(
        path: impl AsRef<Path>,
        cache: &mut ImageCache,
        options: &LoadOptions,
    ) -> Result<Self, MapError> {
        let path = path.as_ref();
        let doc = decode_map(path, &read_document(path)?, options)?;
        let def = decode_tileset(&doc.tileset, &read_document(&doc.tileset)?)?;
        for layer in &doc.layers {
            check_pixel_extent(path, layer, def.tile_width, def.tile_height)?;
        }
        let image = cache.get_or_load(&def.image)?;
        let tile_set = TileSet::from_def(def, image, Instant::now());

        log::info!(
            "Loaded map {}: {} layers, {} object groups, {}x{} tiles",
            path.display(),
            doc.layers.len(),
            doc.object_groups.len(),
            tile_set.tile_width(),
            tile_set.tile_height()
        );

        Ok(TiledMap {
            layers: doc.layers,
            object_groups: doc.object_groups,
            tile_set,
        })
    }

    /// Width of a single tile, in pixels.
    pub fn tile_width(&self) -> u32 {
        self.tile_set.tile_width()
    }

    /// Height of a single tile, in pixels.
    pub fn tile_height(&self) -> u32 {
        self.tile_set.tile_height()
    }

    /// Width of the whole map in pixels, taken from the first layer.
    pub fn width(&self) -> u32 {
        self.layers
            .first()
            .map_or(0, |l| l.width())
            .saturating_mul(self.tile_width())
    }

    /// Height of the whole map in pixels, taken from the first layer.
    pub fn height(&self) -> u32 {
        self.layers
            .first()
            .map_or(0, |l| l.height())
            .saturating_mul(self.tile_height())
    }

    /// Tile layers, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Object groups in document order.
    pub fn object_groups(&self) -> &[ObjectGroup] {
        &self.object_groups
    }

    /// The map's tile-set.
    pub fn tile_set(&self) -> &TileSet {
        &self.tile_set
    }

    fn cell(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.div_euclid(self.tile_width().max(1) as i32),
            y.div_euclid(self.tile_height().max(1) as i32),
        )
    }

    /// Tile covering pixel `(x, y)` on the given layer.
    pub fn tile_at(&self, layer: usize, x: i32, y: i32) -> Option<&Tile> {
        let (cx, cy) = self.cell(x, y);
        self.layers.get(layer)?.at(cx, cy)
    }

    /// Value of `name` at pixel `(x, y)`. Layers are searched bottom to top
    /// and the first tile carrying the property wins.
    ///
    /// Fails with [`MapError::PositionOutOfBounds`] when the pixel is outside
    /// every layer.
    pub fn property(&self, x: i32, y: i32, name: &str) -> Result<Option<&str>, MapError> {
        let (cx, cy) = self.cell(x, y);
        let mut on_map = false;
        for layer in &self.layers {
            if !layer.contains(cx, cy) {
                continue;
            }
            on_map = true;
            let found = layer
                .at(cx, cy)
                .and_then(|tile| self.tile_set.property(name, tile.id));
            if found.is_some() {
                return Ok(found);
            }
        }
        if on_map {
            Ok(None)
        } else {
            Err(MapError::PositionOutOfBounds { x, y })
        }
    }

    /// Like [`TiledMap::property`], with `default` standing in for a missing value.
    pub fn property_or<'a>(
        &'a self,
        x: i32,
        y: i32,
        name: &str,
        default: &'a str,
    ) -> Result<&'a str, MapError> {
        Ok(self.property(x, y, name)?.unwrap_or(default))
    }

    /// Integer property; `default` when missing, an error when malformed.
    pub fn property_int(&self, x: i32, y: i32, name: &str, default: i32) -> Result<i32, MapError> {
        match self.property(x, y, name)? {
            Some(value) => property::parse_int(name, value),
            None => Ok(default),
        }
    }

    /// Floating point property; `default` when missing, an error when malformed.
    pub fn property_double(
        &self,
        x: i32,
        y: i32,
        name: &str,
        default: f64,
    ) -> Result<f64, MapError> {
        match self.property(x, y, name)? {
            Some(value) => property::parse_double(name, value),
            None => Ok(default),
        }
    }

    /// Boolean property, `true` or `false` in any case.
    pub fn property_bool(&self, x: i32, y: i32, name: &str, default: bool) -> Result<bool, MapError> {
        match self.property(x, y, name)? {
            Some(value) => property::parse_bool(name, value),
            None => Ok(default),
        }
    }

    /// Whether any layer's tile at `(x, y)` carries `name`.
    pub fn has_property(&self, x: i32, y: i32, name: &str) -> Result<bool, MapError> {
        Ok(self.property(x, y, name)?.is_some())
    }

    /// Every polyline of every object group, in map pixels.
    pub fn all_polylines(&self) -> Vec<Vec<Vec2>> {
        self.object_groups
            .iter()
            .flat_map(|g| g.polylines().iter().cloned())
            .collect()
    }

    /// Draws the map region with top left `(map_x, map_y)` and size
    /// `width` x `height`, placing that corner at `(window_x, window_y)`.
    pub fn draw(
        &self,
        window_x: f32,
        window_y: f32,
        map_x: f32,
        map_y: f32,
        width: f32,
        height: f32,
    ) {
        self.draw_at(Instant::now(), window_x, window_y, map_x, map_y, width, height);
    }

    /// [`TiledMap::draw`] with animations sampled at `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_at(
        &self,
        now: Instant,
        window_x: f32,
        window_y: f32,
        map_x: f32,
        map_y: f32,
        width: f32,
        height: f32,
    ) {
        let tw = self.tile_width();
        let th = self.tile_height();
        let cells = visible_cells(
            map_x,
            map_y,
            width,
            height,
            (tw, th),
            (self.width(), self.height()),
        );
        let image = self.tile_set.image();

        for (cx, cy) in cells.cells() {
            for layer in &self.layers {
                let Some(tile) = layer.at(cx, cy) else {
                    continue;
                };
                let Some(local) = self.tile_set.local_id(tile.id) else {
                    continue;
                };

                // animated tiles swap the atlas cell, not the orientation
                let mut atlas_id = local;
                if let Some(info) = self.tile_set.tile_information(local) {
                    match &info.animation {
                        Some(anim) => atlas_id = anim.current_frame(now).tile_id,
                        None => continue,
                    }
                }
                let Some(section) = self.tile_set.source_rect(atlas_id) else {
                    continue;
                };

                let (sx, sy) = tile.orientation.scale();
                let options = DrawOptions {
                    section: Some(section),
                    ..DrawOptions::default().with_scale(sx, sy)
                };
                image.draw_from_top_left(
                    window_x + cx as f32 * tw as f32 - map_x,
                    window_y + cy as f32 * th as f32 - map_y,
                    &options,
                );
            }
        }
    }
}

// Pixel coordinates are `i32`, so every layer must fit in that range.
fn check_pixel_extent(path: &Path, layer: &Layer, tile_width: u32, tile_height: u32) -> Result<(), MapError> {
    let fits = |cells: u32, tile: u32| {
        cells
            .max(1)
            .checked_mul(tile)
            .map_or(false, |px| i32::try_from(px).is_ok())
    };
    if fits(layer.width(), tile_width) && fits(layer.height(), tile_height) {
        return Ok(());
    }
    Err(MapError::malformed(
        path,
        format!(
            "layer {} is too large: {}x{} cells of {}x{} pixels",
            layer.id(),
            layer.width(),
            layer.height(),
            tile_width,
            tile_height
        ),
    ))
}
