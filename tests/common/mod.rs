// tests/common/mod.rs

#![allow(dead_code)]

use macroquad_tmx::{DrawOptions, Image, ImageLoader, MapError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stand-in atlas that records every draw call.
pub struct FakeImage {
    pub width: f32,
    pub height: f32,
    pub draws: RefCell<Vec<(f32, f32, DrawOptions)>>,
}

impl Image for FakeImage {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn draw_from_top_left(&self, x: f32, y: f32, options: &DrawOptions) {
        self.draws.borrow_mut().push((x, y, *options));
    }
}

/// Hands out a 64x32 `FakeImage` for any path, remembering what it was asked for.
#[derive(Clone, Default)]
pub struct FakeLoader {
    pub requests: Rc<RefCell<Vec<PathBuf>>>,
    pub images: Rc<RefCell<Vec<Rc<FakeImage>>>>,
}

impl FakeLoader {
    pub fn last_image(&self) -> Rc<FakeImage> {
        Rc::clone(self.images.borrow().last().expect("no image loaded"))
    }
}

impl ImageLoader for FakeLoader {
    fn load(&self, path: &Path) -> Result<Rc<dyn Image>, MapError> {
        self.requests.borrow_mut().push(path.to_path_buf());
        let image = Rc::new(FakeImage {
            width: 64.0,
            height: 32.0,
            draws: RefCell::new(Vec::new()),
        });
        self.images.borrow_mut().push(Rc::clone(&image));
        Ok(image)
    }
}

/// Fresh directory under the system temp dir.
pub fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("macroquad_tmx_{tag}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub const TILESET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="t" tilewidth="16" tileheight="16">
 <image source="atlas.png" width="64" height="32"/>
 <tile id="0">
  <properties>
   <property name="kind" value="floor"/>
  </properties>
 </tile>
 <tile id="1">
  <properties>
   <property name="kind" value="wall"/>
   <property name="solid" value="true"/>
   <property name="cost" value="3"/>
  </properties>
 </tile>
 <tile id="4">
  <animation>
   <frame tileid="4" duration="100"/>
   <frame tileid="5" duration="100"/>
  </animation>
 </tile>
</tileset>
"#;

/// A map document referencing `tiles.tsx`, with the given layers between the
/// tile-set reference and the closing tag.
pub fn map_xml(width: u32, height: u32, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="{width}" height="{height}" tilewidth="16" tileheight="16">
 <tileset firstgid="1" source="tiles.tsx"/>
{body}
</map>
"#
    )
}

pub fn layer_xml(id: u32, width: u32, height: u32, data_attrs: &str, data: &str) -> String {
    format!(
        r#" <layer id="{id}" name="l{id}" width="{width}" height="{height}">
  <data {data_attrs}>{data}</data>
 </layer>"#
    )
}

/// Writes `tiles.tsx` and `map.tmx` into a fresh directory, returning the map path.
pub fn write_map(tag: &str, map: &str) -> PathBuf {
    let dir = temp_dir(tag);
    fs::write(dir.join("tiles.tsx"), TILESET).unwrap();
    let path = dir.join("map.tmx");
    fs::write(&path, map).unwrap();
    path
}

pub fn le_bytes(gids: &[u32]) -> Vec<u8> {
    gids.iter().flat_map(|g| g.to_le_bytes()).collect()
}
