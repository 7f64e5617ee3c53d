//! Ship classes, orientation, and footprint expansion.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A ship class: segment length plus how many of that length the fleet
/// carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipClass {
    size: u8,
    required: u8,
}

impl ShipClass {
    /// Create a new ship class.
    pub const fn new(size: u8, required: u8) -> Self {
        Self { size, required }
    }

    /// Length of one ship of this class, in cells.
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// How many ships of this class a complete fleet holds.
    pub const fn required(&self) -> u8 {
        self.required
    }
}

/// Expand an anchor into the `size` coordinates a ship would occupy.
///
/// Pure and deterministic: coordinates extend from the anchor along the
/// orientation axis with no wraparound. The result may leave the board;
/// legality is a separate check.
pub fn footprint(anchor: (u8, u8), size: u8, orientation: Orientation) -> Vec<(u8, u8)> {
    let (x, y) = anchor;
    (0..size)
        .map(|i| match orientation {
            Orientation::Horizontal => (x + i, y),
            Orientation::Vertical => (x, y + i),
        })
        .collect()
}
