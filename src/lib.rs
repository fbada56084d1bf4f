#![warn(missing_docs)]

//! Tiled (`.tmx` / `.tsx`) map loader and renderer for Macroquad.
//!
//! Loads orthogonal maps with a single external tile-set, answers per-pixel
//! tile property queries and draws a scrolled, culled region of the map.
//!
//! ```no_run
//! use macroquad_tmx::TiledMap;
//!
//! # fn frame() -> Result<(), macroquad_tmx::MapError> {
//! let map = TiledMap::load("assets/map.tmx")?;
//! let solid = map.property_bool(40, 72, "solid", false)?;
//! map.draw(0.0, 0.0, 0.0, 0.0, 320.0, 240.0);
//! # let _ = solid;
//! # Ok(())
//! # }
//! ```

mod animation;
pub mod decode;
mod error;
pub mod gid;
mod layer;
mod loader {
    /// TMX/TSX document parsing.
    pub mod xml_loader;
}
mod map;
mod object;
mod property;
pub mod render;
mod tileset;

pub use animation::{Animation, Frame};
pub use error::MapError;
pub use gid::Orientation;
pub use layer::{Layer, Tile};
pub use loader::xml_loader::{decode_map, decode_tileset, MapDocument};
pub use map::{LoadOptions, TiledMap};
pub use object::ObjectGroup;
pub use render::{DrawOptions, Image, ImageCache, ImageLoader, TextureImage, TextureLoader};
pub use tileset::{TileDef, TileInformation, TileSet, TileSetDef};
