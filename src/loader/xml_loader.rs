// src/loader/xml_loader.rs
use crate::animation::Frame;
use crate::decode::{self, DecodeError, Encoding, LayerData};
use crate::error::MapError;
use crate::layer::Layer;
use crate::map::LoadOptions;
use crate::object::{self, ObjectGroup};
use crate::tileset::{TileDef, TileSetDef};
use macroquad::prelude::vec2;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// Attributes are kept as text so every numeric check reports which
// attribute failed and what it held.

#[derive(Deserialize)]
struct TmxMap {
    #[serde(rename = "tileset", default)]
    tilesets: Vec<TmxTilesetRef>,
    #[serde(rename = "layer", default)]
    layers: Vec<TmxLayer>,
    #[serde(rename = "objectgroup", default)]
    object_groups: Vec<TmxObjectGroup>,
}

#[derive(Deserialize)]
struct TmxTilesetRef {
    #[serde(rename = "@source")]
    source: Option<String>,
}

#[derive(Deserialize)]
struct TmxLayer {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@width")]
    width: Option<String>,
    #[serde(rename = "@height")]
    height: Option<String>,
    #[serde(rename = "data", default)]
    data: Vec<TmxData>,
}

#[derive(Deserialize)]
struct TmxData {
    #[serde(rename = "@encoding")]
    encoding: Option<String>,
    #[serde(rename = "@compression")]
    compression: Option<String>,
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Deserialize)]
struct TmxObjectGroup {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "object", default)]
    objects: Vec<TmxObject>,
}

#[derive(Deserialize)]
struct TmxObject {
    #[serde(rename = "@x")]
    x: Option<String>,
    #[serde(rename = "@y")]
    y: Option<String>,
    #[serde(default)]
    polyline: Vec<TmxPolyline>,
}

#[derive(Deserialize)]
struct TmxPolyline {
    #[serde(rename = "@points")]
    points: Option<String>,
}

#[derive(Deserialize)]
struct TsxTileset {
    #[serde(rename = "@tilewidth")]
    tile_width: Option<String>,
    #[serde(rename = "@tileheight")]
    tile_height: Option<String>,
    #[serde(rename = "@firstgid")]
    first_gid: Option<String>,
    #[serde(rename = "image", default)]
    images: Vec<TsxImage>,
    #[serde(rename = "tile", default)]
    tiles: Vec<TsxTile>,
}

#[derive(Deserialize)]
struct TsxImage {
    #[serde(rename = "@source")]
    source: Option<String>,
}

#[derive(Deserialize)]
struct TsxTile {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(default)]
    properties: Option<TsxProperties>,
    #[serde(default)]
    animation: Option<TsxAnimation>,
}

#[derive(Deserialize, Default)]
struct TsxProperties {
    #[serde(rename = "property", default)]
    properties: Vec<TsxProperty>,
}

#[derive(Deserialize)]
struct TsxProperty {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@value")]
    value: Option<String>,
    // multi-line string properties carry their value as element text
    #[serde(rename = "$text")]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
struct TsxAnimation {
    #[serde(rename = "frame", default)]
    frames: Vec<TsxFrame>,
}

#[derive(Deserialize)]
struct TsxFrame {
    #[serde(rename = "@tileid")]
    tile_id: Option<String>,
    #[serde(rename = "@duration")]
    duration: Option<String>,
}

/// Validated contents of a map document.
pub struct MapDocument {
    /// Tile-set document path, resolved against the map's directory
    pub tileset: PathBuf,
    /// Tile layers, bottom first
    pub layers: Vec<Layer>,
    /// Object groups in document order
    pub object_groups: Vec<ObjectGroup>,
}

/// Reads a document, wrapping I/O failures as `MalformedDocument`.
pub fn read_document(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::io(path, source))
}

fn parse_xml<T: DeserializeOwned>(path: &Path, xml: &str) -> Result<T, MapError> {
    quick_xml::de::from_str(xml)
        .map_err(|source| MapError::malformed_with(path, "not a valid document", source))
}

fn base_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"))
}

fn required<'a>(path: &Path, value: Option<&'a str>, what: &str) -> Result<&'a str, MapError> {
    value.ok_or_else(|| MapError::malformed(path, format!("{what} attribute is missing")))
}

fn parse_uint(path: &Path, value: &str, what: &str) -> Result<u32, MapError> {
    if !decode::is_uint_literal(value) {
        return Err(MapError::invalid_number(path, what, value));
    }
    value
        .parse()
        .map_err(|_| MapError::invalid_number(path, what, value))
}

fn uint_attr(path: &Path, value: Option<&str>, what: &str) -> Result<u32, MapError> {
    parse_uint(path, required(path, value, what)?, what)
}

fn decimal_attr(path: &Path, value: Option<&str>, what: &str) -> Result<f32, MapError> {
    let value = required(path, value, what)?;
    if !object::is_decimal_literal(value) {
        return Err(MapError::invalid_number(path, what, value));
    }
    value
        .parse()
        .map_err(|_| MapError::invalid_number(path, what, value))
}

/// Parses and validates a `.tmx` document. `path` is used for errors and to resolve the tile-set.
pub fn decode_map(path: &Path, xml: &str, options: &LoadOptions) -> Result<MapDocument, MapError> {
    let raw: TmxMap = parse_xml(path, xml)?;

    let tileset = match raw.tilesets.as_slice() {
        [tileset] => tileset,
        other => return Err(MapError::element_count(path, "tileset", other.len())),
    };
    let source = required(path, tileset.source.as_deref(), "tileset source")?;
    let tileset = base_dir(path).join(source);

    if raw.layers.is_empty() {
        return Err(MapError::element_count(path, "layer", 0));
    }
    let layers = raw
        .layers
        .into_iter()
        .enumerate()
        .map(|(index, layer)| decode_layer(path, index, layer, options))
        .collect::<Result<Vec<_>, _>>()?;

    let object_groups = raw
        .object_groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| decode_object_group(path, index, group))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MapDocument {
        tileset,
        layers,
        object_groups,
    })
}

fn decode_layer(
    path: &Path,
    index: usize,
    raw: TmxLayer,
    options: &LoadOptions,
) -> Result<Layer, MapError> {
    let what = |attr: &str| format!("layer {index} {attr}");
    let id = uint_attr(path, raw.id.as_deref(), &what("id"))?;
    let width = uint_attr(path, raw.width.as_deref(), &what("width"))?;
    let height = uint_attr(path, raw.height.as_deref(), &what("height"))?;

    let data = match raw.data.as_slice() {
        [data] => data,
        other => return Err(MapError::element_count(path, "data", other.len())),
    };
    let encoding_name = required(path, data.encoding.as_deref(), &what("data encoding"))?;
    let encoding = Encoding::parse(encoding_name, data.compression.as_deref()).map_err(|name| {
        MapError::UnsupportedEncoding {
            path: path.to_path_buf(),
            layer: index,
            name,
        }
    })?;

    let payload = decode::decode(encoding, &data.text).map_err(|err| match err {
        DecodeError::BadToken(tok) => MapError::invalid_number(path, what("data"), tok),
        other => MapError::malformed_with(path, format!("layer {index} data is corrupt"), other),
    })?;

    let expected = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| MapError::malformed(path, format!("layer {index} is too large ({width}x{height})")))?;
    let found = payload.cell_count();
    if found != expected {
        if !options.allow_layer_size_mismatch {
            return Err(MapError::malformed(
                path,
                format!("layer {index} has {found} cells of data, expected {expected} ({width}x{height})"),
            ));
        }
        log::warn!(
            "{}: layer {} has {} cells of data, expected {}; using the declared size",
            path.display(),
            index,
            found,
            expected
        );
    }

    let layer = match payload {
        LayerData::Gids(gids) => Layer::from_gids(id, width, height, &gids),
        LayerData::Bytes(bytes) => Layer::from_le_bytes(id, width, height, &bytes),
    };
    log::debug!("Layer {} ({}x{}) decoded from {}", id, width, height, encoding);
    Ok(layer)
}

fn decode_object_group(
    path: &Path,
    index: usize,
    raw: TmxObjectGroup,
) -> Result<ObjectGroup, MapError> {
    let id = uint_attr(path, raw.id.as_deref(), &format!("object group {index} id"))?;
    let name = required(path, raw.name.as_deref(), &format!("object group {index} name"))?;
    let mut group = ObjectGroup::new(id, name);

    for (n, obj) in raw.objects.into_iter().enumerate() {
        let what = |attr: &str| format!("object group {index} object {n} {attr}");
        let x = decimal_attr(path, obj.x.as_deref(), &what("x"))?;
        let y = decimal_attr(path, obj.y.as_deref(), &what("y"))?;
        for line in obj.polyline {
            let points = required(path, line.points.as_deref(), &what("polyline points"))?;
            let offsets = object::parse_points(points)
                .map_err(|tok| MapError::invalid_number(path, what("polyline points"), tok))?;
            group.add_polyline(vec2(x, y), offsets);
        }
    }
    Ok(group)
}

/// Parses and validates a `.tsx` document. `path` is used for errors and to resolve the image.
pub fn decode_tileset(path: &Path, xml: &str) -> Result<TileSetDef, MapError> {
    let raw: TsxTileset = parse_xml(path, xml)?;

    let tile_width = uint_attr(path, raw.tile_width.as_deref(), "tileset tilewidth")?;
    let tile_height = uint_attr(path, raw.tile_height.as_deref(), "tileset tileheight")?;
    if tile_width == 0 || tile_height == 0 {
        return Err(MapError::malformed(
            path,
            format!("tile size {tile_width}x{tile_height} must be positive"),
        ));
    }
    let first_gid = match raw.first_gid.as_deref() {
        Some(value) => parse_uint(path, value, "tileset firstgid")?,
        None => 1,
    };

    let image = match raw.images.as_slice() {
        [image] => image,
        other => return Err(MapError::element_count(path, "image", other.len())),
    };
    let source = required(path, image.source.as_deref(), "image source")?;
    let image = base_dir(path).join(source);

    let tiles = raw
        .tiles
        .into_iter()
        .enumerate()
        .map(|(n, tile)| decode_tile(path, n, tile))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TileSetDef {
        tile_width,
        tile_height,
        first_gid,
        image,
        tiles,
    })
}

fn decode_tile(path: &Path, n: usize, raw: TsxTile) -> Result<TileDef, MapError> {
    let id = uint_attr(path, raw.id.as_deref(), &format!("tile {n} id"))?;

    let properties = raw
        .properties
        .unwrap_or_default()
        .properties
        .into_iter()
        .enumerate()
        .map(|(k, prop)| {
            let what = |attr: &str| format!("tile {n} property {k} {attr}");
            let name = required(path, prop.name.as_deref(), &what("name"))?.to_owned();
            let value = match (prop.value, prop.text) {
                (Some(value), _) | (None, Some(value)) => value,
                (None, None) => return Err(MapError::malformed(path, format!("{} attribute is missing", what("value")))),
            };
            Ok((name, value))
        })
        .collect::<Result<Vec<_>, MapError>>()?;

    let animation = raw
        .animation
        .map(|anim| {
            anim.frames
                .into_iter()
                .enumerate()
                .map(|(k, frame)| {
                    let what = |attr: &str| format!("tile {n} frame {k} {attr}");
                    Ok(Frame {
                        tile_id: uint_attr(path, frame.tile_id.as_deref(), &what("tileid"))?,
                        duration_ms: uint_attr(path, frame.duration.as_deref(), &what("duration"))?,
                    })
                })
                .collect::<Result<Vec<_>, MapError>>()
        })
        .transpose()?;

    Ok(TileDef {
        id,
        properties,
        animation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::Orientation;

    const TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.2" name="Overworld" tilewidth="16" tileheight="16" tilecount="8" columns="4">
 <image source="overworld.png" width="64" height="32"/>
 <tile id="2">
  <properties>
   <property name="blocked" type="bool" value="true"/>
   <property name="note">line one
line two</property>
  </properties>
 </tile>
 <tile id="4">
  <animation>
   <frame tileid="4" duration="250"/>
   <frame tileid="5" duration="250"/>
  </animation>
 </tile>
</tileset>
"#;

    fn map_xml(layers: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE map SYSTEM "http://mapeditor.org/dtd/1.0/map.dtd">
<map version="1.2" orientation="orthogonal" width="2" height="2" tilewidth="16" tileheight="16">
 <tileset firstgid="1" source="tiles/overworld.tsx"/>
{layers}
</map>
"#
        )
    }

    fn decode(xml: &str) -> Result<MapDocument, MapError> {
        decode_map(Path::new("maps/level.tmx"), xml, &LoadOptions::default())
    }

    #[test]
    fn reads_layers_object_groups_and_tileset_path() {
        let xml = map_xml(
            r#" <layer id="1" name="ground" width="2" height="2">
  <data encoding="csv">
1,2,
0,2147483651
</data>
 </layer>
 <objectgroup id="3" name="paths">
  <object id="1" x="16" y="8">
   <polyline points="0,0 16,0 16,16"/>
  </object>
  <object id="2" x="0" y="0" width="4" height="4"/>
 </objectgroup>
 <layer id="2" name="top" width="2" height="2">
  <data encoding="csv">0,0,0,0</data>
 </layer>"#,
        );
        let doc = decode(&xml).unwrap();

        assert_eq!(doc.tileset, Path::new("maps").join("tiles/overworld.tsx"));
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.layers[1].id(), 2);

        let flipped = doc.layers[0].at(1, 1).unwrap();
        assert_eq!(flipped.id, 3);
        assert_eq!(flipped.orientation, Orientation::FlippedHorizontal);
        assert!(doc.layers[0].at(0, 1).is_none());

        assert_eq!(doc.object_groups.len(), 1);
        let lines = doc.object_groups[0].polylines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], vec![vec2(16.0, 8.0), vec2(32.0, 8.0), vec2(32.0, 24.0)]);
    }

    #[test]
    fn missing_layer_width_names_the_layer() {
        let xml = map_xml(
            r#" <layer id="1" height="2"><data encoding="csv">1,1,1,1</data></layer>"#,
        );
        match decode(&xml) {
            Err(MapError::MalformedDocument { reason, .. }) => {
                assert!(reason.contains("layer 0 width"), "{reason}")
            }
            other => panic!("expected MalformedDocument, got {:?}", other.err()),
        }
    }

    #[test]
    fn non_numeric_height_is_an_invalid_literal() {
        let xml = map_xml(
            r#" <layer id="1" width="2" height="two"><data encoding="csv">1,1,1,1</data></layer>"#,
        );
        assert!(matches!(
            decode(&xml),
            Err(MapError::InvalidNumericLiteral { attribute, value, .. })
                if attribute == "layer 0 height" && value == "two"
        ));
    }

    #[test]
    fn unknown_compression_is_unsupported() {
        let xml = map_xml(
            r#" <layer id="1" width="1" height="1"><data encoding="base64" compression="zstd">AQAAAA==</data></layer>"#,
        );
        assert!(matches!(
            decode(&xml),
            Err(MapError::UnsupportedEncoding { layer: 0, name, .. }) if name == "zstd"
        ));
    }

    #[test]
    fn short_data_is_rejected_unless_allowed() {
        let xml = map_xml(
            r#" <layer id="1" width="2" height="2"><data encoding="csv">1,1,1</data></layer>"#,
        );
        assert!(matches!(decode(&xml), Err(MapError::MalformedDocument { .. })));

        let lenient = LoadOptions {
            allow_layer_size_mismatch: true,
        };
        let doc = decode_map(Path::new("level.tmx"), &xml, &lenient).unwrap();
        assert!(doc.layers[0].at(1, 1).is_none());
        assert!(doc.layers[0].at(0, 1).is_some());
    }

    #[test]
    fn lenient_huge_layer_keeps_only_the_payload() {
        let xml = map_xml(
            r#" <layer id="1" width="100000" height="100000"><data encoding="csv">3</data></layer>"#,
        );
        let lenient = LoadOptions {
            allow_layer_size_mismatch: true,
        };
        let doc = decode_map(Path::new("level.tmx"), &xml, &lenient).unwrap();
        let layer = &doc.layers[0];
        assert_eq!((layer.width(), layer.height()), (100_000, 100_000));
        assert_eq!(layer.at(0, 0).map(|t| t.id), Some(3));
        assert!(layer.at(50_000, 99_999).is_none());
    }

    #[test]
    fn layer_needs_exactly_one_data_element() {
        let xml = map_xml(r#" <layer id="1" width="1" height="1"/>"#);
        assert!(matches!(
            decode(&xml),
            Err(MapError::MultipleOrMissingRequiredElement { element: "data", found: 0, .. })
        ));
    }

    #[test]
    fn map_without_layers_is_rejected() {
        assert!(matches!(
            decode(&map_xml("")),
            Err(MapError::MultipleOrMissingRequiredElement { element: "layer", found: 0, .. })
        ));
    }

    #[test]
    fn map_needs_exactly_one_tileset() {
        let xml = r#"<map><tileset source="a.tsx"/><tileset source="b.tsx"/>
<layer id="1" width="1" height="1"><data encoding="csv">1</data></layer></map>"#;
        assert!(matches!(
            decode(xml),
            Err(MapError::MultipleOrMissingRequiredElement { element: "tileset", found: 2, .. })
        ));
    }

    #[test]
    fn bad_polyline_point_is_reported() {
        let xml = map_xml(
            r#" <layer id="1" width="1" height="1"><data encoding="csv">1</data></layer>
 <objectgroup id="1" name="g"><object x="0" y="0"><polyline points="0,0 a,b"/></object></objectgroup>"#,
        );
        assert!(matches!(
            decode(&xml),
            Err(MapError::InvalidNumericLiteral { value, .. }) if value == "a,b"
        ));
    }

    #[test]
    fn broken_xml_keeps_parser_error() {
        let err = decode("<map><layer").err().unwrap();
        assert!(matches!(err, MapError::MalformedDocument { source: Some(_), .. }));
    }

    #[test]
    fn reads_tileset_geometry_properties_and_animations() {
        let def = decode_tileset(Path::new("maps/tiles/overworld.tsx"), TSX).unwrap();
        assert_eq!((def.tile_width, def.tile_height, def.first_gid), (16, 16, 1));
        assert_eq!(def.image, Path::new("maps/tiles").join("overworld.png"));
        assert_eq!(def.tiles.len(), 2);
        assert_eq!(
            def.tiles[0].properties,
            vec![
                ("blocked".to_owned(), "true".to_owned()),
                ("note".to_owned(), "line one\nline two".to_owned()),
            ]
        );
        assert_eq!(
            def.tiles[1].animation,
            Some(vec![
                Frame { tile_id: 4, duration_ms: 250 },
                Frame { tile_id: 5, duration_ms: 250 },
            ])
        );
    }

    #[test]
    fn tileset_needs_exactly_one_image() {
        let xml = r#"<tileset tilewidth="8" tileheight="8"><image source="a.png"/><image source="b.png"/></tileset>"#;
        assert!(matches!(
            decode_tileset(Path::new("t.tsx"), xml),
            Err(MapError::MultipleOrMissingRequiredElement { element: "image", found: 2, .. })
        ));
        let xml = r#"<tileset tilewidth="8" tileheight="8"></tileset>"#;
        assert!(matches!(
            decode_tileset(Path::new("t.tsx"), xml),
            Err(MapError::MultipleOrMissingRequiredElement { element: "image", found: 0, .. })
        ));
    }

    #[test]
    fn tileset_firstgid_is_read_when_present() {
        let xml = r#"<tileset firstgid="33" tilewidth="8" tileheight="8"><image source="a.png"/></tileset>"#;
        assert_eq!(decode_tileset(Path::new("t.tsx"), xml).unwrap().first_gid, 33);
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let xml = r#"<tileset tilewidth="0" tileheight="8"><image source="a.png"/></tileset>"#;
        assert!(matches!(
            decode_tileset(Path::new("t.tsx"), xml),
            Err(MapError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn animation_frame_needs_duration() {
        let xml = r#"<tileset tilewidth="8" tileheight="8"><image source="a.png"/>
<tile id="0"><animation><frame tileid="1"/></animation></tile></tileset>"#;
        match decode_tileset(Path::new("t.tsx"), xml) {
            Err(MapError::MalformedDocument { reason, .. }) => {
                assert!(reason.contains("tile 0 frame 0 duration"), "{reason}")
            }
            other => panic!("expected MalformedDocument, got {:?}", other.err()),
        }
    }

    #[test]
    fn tile_id_must_be_plain_integer() {
        let xml = r#"<tileset tilewidth="8" tileheight="8"><image source="a.png"/><tile id="-1"/></tileset>"#;
        assert!(matches!(
            decode_tileset(Path::new("t.tsx"), xml),
            Err(MapError::InvalidNumericLiteral { attribute, .. }) if attribute == "tile 0 id"
        ));
    }
}
