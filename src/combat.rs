//! Mirroring authoritative move results onto local boards.
//!
//! The backend decides hit or miss; this side only records the verdict. It
//! never recomputes an outcome for its own shots.

use crate::board::{Board, Cell};
use crate::common::BoardError;

/// Record a resolved move at (x, y).
///
/// Sets the cell to `Hit` or `Miss`. A cell that is already terminal is
/// left untouched, so re-applying an already-resolved coordinate is a
/// no-op. Fails only on out-of-range coordinates.
pub fn apply_move_result(board: &mut Board, x: u8, y: u8, hit: bool) -> Result<(), BoardError> {
    if board.get(x, y)?.is_terminal() {
        return Ok(());
    }
    board.set(x, y, if hit { Cell::Hit } else { Cell::Miss })
}
