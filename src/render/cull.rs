//! Viewport culling in tile coordinates.

use std::ops::Range;

/// Cells covering a viewport, in tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    /// Column indices
    pub cols: Range<i32>,
    /// Row indices
    pub rows: Range<i32>,
}

impl CellRange {
    /// Number of cells in the range.
    pub fn len(&self) -> usize {
        self.cols.len() * self.rows.len()
    }

    /// Whether the range has no cells.
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty() || self.rows.is_empty()
    }

    /// Row-major iteration, matching draw order within a layer.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows
            .clone()
            .flat_map(move |y| self.cols.clone().map(move |x| (x, y)))
    }
}

/// Cells to visit for the map region starting at `(map_x, map_y)` and spanning
/// `width` x `height` pixels. The far edge is clamped to the map extent and then
/// padded by one tile, so partially visible boundary tiles are included.
pub fn visible_cells(
    map_x: f32,
    map_y: f32,
    width: f32,
    height: f32,
    tile_size: (u32, u32),
    map_size: (u32, u32),
) -> CellRange {
    CellRange {
        cols: axis(map_x, width, tile_size.0, map_size.0),
        rows: axis(map_y, height, tile_size.1, map_size.1),
    }
}

fn axis(start: f32, extent: f32, tile: u32, map_extent: u32) -> Range<i32> {
    if tile == 0 {
        return 0..0;
    }
    let tile_f = tile as f32;
    let origin = start.floor();
    let end = (start + extent).min(map_extent as f32) + tile_f;
    let count = ((end - origin) / tile_f).ceil().max(0.0) as i32;
    let first = (origin as i32).div_euclid(tile as i32);
    first..first + count
}
