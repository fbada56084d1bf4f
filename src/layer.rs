use crate::gid::{self, Orientation};

/// A placed tile. `id` is the bare gid with the flip bits stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Column in the layer grid
    pub x: u32,
    /// Row in the layer grid
    pub y: u32,
    /// Bare gid
    pub id: u32,
    /// Flip state taken from the gid's high bits
    pub orientation: Orientation,
}

/// One grid of tiles. Cells with a bare gid of 0 are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    id: u32,
    width: u32,
    height: u32,
    tiles: Vec<Option<Tile>>, // row-major
}

impl Layer {
    /// Builds a layer from raw gids in source order. The grid size governs:
    /// missing trailing cells are left empty and surplus gids are ignored.
    pub fn from_gids(id: u32, width: u32, height: u32, gids: &[u32]) -> Self {
        Layer::place(id, width, height, gids.iter().copied())
    }

    /// Builds a layer from little-endian 32-bit gids, four bytes per cell.
    /// Placement matches [`Layer::from_gids`].
    pub fn from_le_bytes(id: u32, width: u32, height: u32, bytes: &[u8]) -> Self {
        let words = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        Layer::place(id, width, height, words)
    }

    // Storage only covers the cells the payload reaches; later cells read as empty.
    fn place(id: u32, width: u32, height: u32, gids: impl Iterator<Item = u32>) -> Self {
        let cells = (width as usize).saturating_mul(height as usize);
        let tiles = gids
            .take(cells)
            .enumerate()
            .map(|(idx, raw)| {
                let x = (idx % width as usize) as u32;
                let y = (idx / width as usize) as u32;
                make_tile(x, y, raw)
            })
            .collect();
        Layer {
            id,
            width,
            height,
            tiles,
        }
    }

    /// Layer id from the map document.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the cell lies inside the grid, occupied or not.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Tile at a cell; `None` for empty or out-of-bounds cells.
    pub fn at(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.contains(x, y) {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.tiles.get(idx)?.as_ref()
    }

    /// Occupied cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }
}

fn make_tile(x: u32, y: u32, raw: u32) -> Option<Tile> {
    let (id, orientation) = gid::decode(raw);
    (id != 0).then_some(Tile {
        x,
        y,
        id,
        orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::{FLIP_D, FLIP_H};

    #[test]
    fn zero_gid_is_an_empty_cell() {
        let layer = Layer::from_gids(1, 2, 1, &[0, 3]);
        assert!(layer.at(0, 0).is_none());
        assert_eq!(layer.at(1, 0).map(|t| t.id), Some(3));
        assert_eq!(layer.tiles().count(), 1);
    }

    #[test]
    fn flipped_empty_gid_is_still_empty() {
        let layer = Layer::from_gids(1, 1, 1, &[FLIP_H]);
        assert!(layer.at(0, 0).is_none());
        assert!(layer.contains(0, 0));
    }

    #[test]
    fn placement_is_row_major() {
        let layer = Layer::from_gids(4, 3, 2, &[1, 2, 3, 4, 5, 6]);
        let tile = layer.at(0, 1).unwrap();
        assert_eq!((tile.x, tile.y, tile.id), (0, 1, 4));
        assert_eq!(layer.at(2, 1).map(|t| t.id), Some(6));
    }

    #[test]
    fn out_of_bounds_lookup_is_empty() {
        let layer = Layer::from_gids(1, 2, 2, &[1, 1, 1, 1]);
        assert!(layer.at(-1, 0).is_none());
        assert!(layer.at(2, 0).is_none());
        assert!(layer.at(0, 2).is_none());
        assert!(!layer.contains(0, -1));
    }

    #[test]
    fn byte_and_gid_paths_agree() {
        let gids = [1, 0, FLIP_D | 7, 2, FLIP_H | 9, 0];
        let bytes: Vec<u8> = gids.iter().flat_map(|g| g.to_le_bytes()).collect();
        assert_eq!(
            Layer::from_gids(2, 3, 2, &gids),
            Layer::from_le_bytes(2, 3, 2, &bytes)
        );
        let tile = Layer::from_le_bytes(2, 3, 2, &bytes).at(2, 0).copied().unwrap();
        assert_eq!(tile.orientation, Orientation::FlippedDiagonal);
        assert_eq!(tile.id, 7);
    }

    #[test]
    fn short_payload_leaves_trailing_cells_empty() {
        let layer = Layer::from_gids(1, 2, 2, &[1, 2, 3]);
        assert!(layer.at(1, 1).is_none());
        assert_eq!(layer.at(0, 1).map(|t| t.id), Some(3));
    }

    #[test]
    fn huge_declared_grid_only_stores_the_payload() {
        let layer = Layer::from_gids(1, 100_000, 100_000, &[7]);
        assert_eq!(layer.at(0, 0).map(|t| t.id), Some(7));
        assert!(layer.contains(99_999, 99_999));
        assert!(layer.at(99_999, 99_999).is_none());
        assert!(layer.at(1, 0).is_none());
    }

    #[test]
    fn zero_sized_layer_has_no_cells() {
        let layer = Layer::from_gids(1, 0, 0, &[]);
        assert!(!layer.contains(0, 0));
        assert_eq!(layer.tiles().count(), 0);
    }
}
