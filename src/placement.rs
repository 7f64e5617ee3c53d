//! Fleet tracking, placement legality, and the random placement planner.

use crate::board::{Board, Cell};
use crate::common::PlacementError;
use crate::config::{BOARD_SIZE, FLEET_CLASSES, NUM_SHIP_CLASSES};
use crate::ship::{footprint, Orientation, ShipClass};
use rand::Rng;

/// Per-class placement progress for one player's fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fleet {
    classes: [ClassState; NUM_SHIP_CLASSES],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClassState {
    def: ShipClass,
    placed: u8,
}

impl Fleet {
    /// Fresh fleet with nothing placed, using the standard composition.
    pub fn new() -> Self {
        let classes = core::array::from_fn(|i| ClassState {
            def: FLEET_CLASSES[i],
            placed: 0,
        });
        Fleet { classes }
    }

    fn class(&self, size: u8) -> Option<&ClassState> {
        self.classes.iter().find(|c| c.def.size() == size)
    }

    fn class_mut(&mut self, size: u8) -> Option<&mut ClassState> {
        self.classes.iter_mut().find(|c| c.def.size() == size)
    }

    /// Ships of `size` already on the board, or `None` for an unknown size.
    pub fn placed(&self, size: u8) -> Option<u8> {
        self.class(size).map(|c| c.placed)
    }

    /// Ships of `size` a complete fleet holds, or `None` for an unknown size.
    pub fn required(&self, size: u8) -> Option<u8> {
        self.class(size).map(|c| c.def.required())
    }

    /// True once every class has reached its required count. Gates the exit
    /// from the placement phase.
    pub fn is_complete(&self) -> bool {
        self.classes.iter().all(|c| c.placed == c.def.required())
    }

    /// Forget all placement progress.
    pub fn reset(&mut self) {
        for c in self.classes.iter_mut() {
            c.placed = 0;
        }
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a candidate footprint against the board before anything commits.
///
/// Legal iff every coordinate is in range, currently `Empty`, and has no
/// ship among its 8-connected neighbors (diagonals included), which keeps a
/// mandatory one-cell buffer between distinct ships. Evaluated against the
/// pre-placement board only, so legality is all-or-nothing.
pub fn is_legal(board: &Board, footprint: &[(u8, u8)]) -> bool {
    footprint.iter().all(|&(x, y)| {
        if board.get(x, y) != Ok(Cell::Empty) {
            return false;
        }
        for dx in -1i16..=1 {
            for dy in -1i16..=1 {
                let (nx, ny) = (x as i16 + dx, y as i16 + dy);
                if nx < 0 || ny < 0 {
                    continue;
                }
                if board.get(nx as u8, ny as u8) == Ok(Cell::Ship) {
                    return false;
                }
            }
        }
        true
    })
}

/// Place one ship of `size` at `anchor`, consuming a unit of its class.
///
/// Validated fully before any mutation: on error the board and the fleet
/// counters are untouched.
pub fn place_ship(
    board: &mut Board,
    fleet: &mut Fleet,
    anchor: (u8, u8),
    size: u8,
    orientation: Orientation,
) -> Result<(), PlacementError> {
    let class = fleet.class_mut(size).ok_or(PlacementError::UnknownClass)?;
    if class.placed == class.def.required() {
        return Err(PlacementError::ClassExhausted);
    }
    let run = footprint(anchor, size, orientation);
    if !is_legal(board, &run) {
        return Err(PlacementError::IllegalPlacement);
    }
    for &(x, y) in &run {
        // in range: is_legal accepted every cell
        let _ = board.set(x, y, Cell::Ship);
    }
    class.placed += 1;
    Ok(())
}

/// Reset to a fresh empty board and place the whole fleet by rejection
/// sampling: a uniform anchor in [0, N)² and a uniform orientation per
/// attempt, discarding illegal attempts until every class is full.
///
/// The standard fleet leaves the grid sparse (30 cells in 100 with the
/// one-cell buffer), so the loop terminates in practice; that density is a
/// precondition, not a checked bound.
pub fn random_placement<R: Rng>(rng: &mut R, fleet: &mut Fleet) -> Board {
    fleet.reset();
    let mut board = Board::new();
    for class in FLEET_CLASSES {
        for _ in 0..class.required() {
            loop {
                let x = rng.random_range(0..BOARD_SIZE);
                let y = rng.random_range(0..BOARD_SIZE);
                let orientation = if rng.random() {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                };
                if place_ship(&mut board, fleet, (x, y), class.size(), orientation).is_ok() {
                    break;
                }
            }
        }
    }
    board
}
