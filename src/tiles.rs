//! Auto-tile classification from the 4-neighborhood
//!
//! Each cell gets a 4-bit mask of which orthogonal neighbors match a target
//! value (top=1, right=2, bottom=4, left=8), and the mask picks one of 16 tile
//! classes a renderer maps to sprites.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Whether a neighbor outside the grid matches the target.
///
/// Map edges tile as "nothing there", the opposite of the automata's
/// convention that the edge is solid rock.
pub const EDGE_MATCHES: bool = false;

pub const TOP: u8 = 1;
pub const RIGHT: u8 = 2;
pub const BOTTOM: u8 = 4;
pub const LEFT: u8 = 8;

/// One of the 16 auto-tile variants, indexed by neighbor mask
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileClass {
    Isolated,
    TopOnly,
    RightOnly,
    TopRight,
    BottomOnly,
    Vertical,
    RightBottom,
    TopRightBottom,
    LeftOnly,
    TopLeft,
    Horizontal,
    TopRightLeft,
    BottomLeft,
    TopBottomLeft,
    RightBottomLeft,
    Full,
}

impl TileClass {
    /// Lookup table in mask order
    pub const ALL: [TileClass; 16] = [
        TileClass::Isolated,
        TileClass::TopOnly,
        TileClass::RightOnly,
        TileClass::TopRight,
        TileClass::BottomOnly,
        TileClass::Vertical,
        TileClass::RightBottom,
        TileClass::TopRightBottom,
        TileClass::LeftOnly,
        TileClass::TopLeft,
        TileClass::Horizontal,
        TileClass::TopRightLeft,
        TileClass::BottomLeft,
        TileClass::TopBottomLeft,
        TileClass::RightBottomLeft,
        TileClass::Full,
    ];

    /// Total over all 16 masks; only the low 4 bits are read.
    pub fn from_mask(mask: u8) -> Self {
        Self::ALL[(mask & 0x0f) as usize]
    }

    pub fn mask(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            TileClass::Isolated => "isolated",
            TileClass::TopOnly => "top-only",
            TileClass::RightOnly => "right-only",
            TileClass::TopRight => "top-right",
            TileClass::BottomOnly => "bottom-only",
            TileClass::Vertical => "vertical",
            TileClass::RightBottom => "right-bottom",
            TileClass::TopRightBottom => "top-right-bottom",
            TileClass::LeftOnly => "left-only",
            TileClass::TopLeft => "top-left",
            TileClass::Horizontal => "horizontal",
            TileClass::TopRightLeft => "top-right-left",
            TileClass::BottomLeft => "bottom-left",
            TileClass::TopBottomLeft => "top-bottom-left",
            TileClass::RightBottomLeft => "right-bottom-left",
            TileClass::Full => "full",
        }
    }
}

impl std::fmt::Display for TileClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Neighbor mask of `(x, y)` against `target`.
pub fn tile_mask<T: PartialEq>(grid: &Grid<T>, x: usize, y: usize, target: &T) -> u8 {
    let matches = |dx: i64, dy: i64| {
        grid.get_signed(x as i64 + dx, y as i64 + dy)
            .map_or(EDGE_MATCHES, |v| v == target)
    };

    let mut mask = 0;
    if matches(0, -1) {
        mask |= TOP;
    }
    if matches(1, 0) {
        mask |= RIGHT;
    }
    if matches(0, 1) {
        mask |= BOTTOM;
    }
    if matches(-1, 0) {
        mask |= LEFT;
    }
    mask
}

/// Tile class of every cell against `target`.
pub fn classify_tiles<T: PartialEq + Sync>(grid: &Grid<T>, target: &T) -> Grid<TileClass> {
    Grid::from_fn_par(grid.width(), grid.height(), |x, y| {
        TileClass::from_mask(tile_mask(grid, x, y, target))
    })
}
