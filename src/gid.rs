//! Global tile id bit layout.

/// Horizontal flip, bit 31
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip, bit 30
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip, bit 29
pub const FLIP_D: u32 = 0x2000_0000;
/// The lower 29 bits holding the bare tile id
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// How a tile's image is mirrored when drawn.
///
/// Only one state is stored per tile. A gid carrying both the horizontal and
/// vertical flip bits collapses into [`Orientation::FlippedDiagonal`], the same
/// as a gid carrying the diagonal bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Drawn as stored in the atlas
    #[default]
    Normal,
    /// Mirrored around the vertical axis
    FlippedHorizontal,
    /// Mirrored around the horizontal axis
    FlippedVertical,
    /// Mirrored around both axes
    FlippedDiagonal,
}

impl Orientation {
    /// Axis scale to apply when drawing a tile with this orientation.
    pub fn scale(self) -> (f32, f32) {
        match self {
            Orientation::Normal => (1.0, 1.0),
            Orientation::FlippedHorizontal => (-1.0, 1.0),
            Orientation::FlippedVertical => (1.0, -1.0),
            Orientation::FlippedDiagonal => (-1.0, -1.0),
        }
    }
}

/// Splits a raw gid into its bare tile id and orientation.
#[inline]
pub fn decode(raw: u32) -> (u32, Orientation) {
    let flip_h = raw & FLIP_H != 0;
    let flip_v = raw & FLIP_V != 0;
    let flip_d = raw & FLIP_D != 0;

    let orientation = if flip_d || (flip_h && flip_v) {
        Orientation::FlippedDiagonal
    } else if flip_v {
        Orientation::FlippedVertical
    } else if flip_h {
        Orientation::FlippedHorizontal
    } else {
        Orientation::Normal
    };

    (raw & GID_MASK, orientation)
}

/// Packs a bare id and orientation back into a raw gid.
///
/// `FlippedDiagonal` is written with the diagonal bit only.
#[inline]
pub fn encode(bare: u32, orientation: Orientation) -> u32 {
    let flags = match orientation {
        Orientation::Normal => 0,
        Orientation::FlippedHorizontal => FLIP_H,
        Orientation::FlippedVertical => FLIP_V,
        Orientation::FlippedDiagonal => FLIP_D,
    };
    (bare & GID_MASK) | flags
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Orientation; 4] = [
        Orientation::Normal,
        Orientation::FlippedHorizontal,
        Orientation::FlippedVertical,
        Orientation::FlippedDiagonal,
    ];

    #[test]
    fn encode_then_decode_preserves_id_and_orientation() {
        for bare in [0, 1, 17, 4095, GID_MASK] {
            for orientation in ALL {
                assert_eq!(decode(encode(bare, orientation)), (bare, orientation));
            }
        }
    }

    #[test]
    fn horizontal_and_vertical_collapse_to_diagonal() {
        assert_eq!(decode(FLIP_H | FLIP_V | 7), (7, Orientation::FlippedDiagonal));
        assert_eq!(
            decode(FLIP_H | FLIP_V | FLIP_D | 7),
            (7, Orientation::FlippedDiagonal)
        );
    }

    #[test]
    fn vertical_wins_over_horizontal_only_with_diagonal_clear() {
        assert_eq!(decode(FLIP_V | 3), (3, Orientation::FlippedVertical));
        assert_eq!(decode(FLIP_H | 3), (3, Orientation::FlippedHorizontal));
        assert_eq!(decode(FLIP_D | FLIP_V | 3), (3, Orientation::FlippedDiagonal));
    }

    #[test]
    fn decode_is_total() {
        assert_eq!(decode(u32::MAX), (GID_MASK, Orientation::FlippedDiagonal));
        assert_eq!(decode(0), (0, Orientation::Normal));
    }

    #[test]
    fn scale_matches_orientation() {
        assert_eq!(Orientation::FlippedHorizontal.scale(), (-1.0, 1.0));
        assert_eq!(Orientation::FlippedDiagonal.scale(), (-1.0, -1.0));
    }
}
