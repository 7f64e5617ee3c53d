//! Board grid and cell states.

use crate::common::BoardError;
use crate::config::BOARD_SIZE;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

const N: usize = BOARD_SIZE as usize;

/// State of a single board cell.
///
/// `Hit` and `Miss` are terminal: once a move has been resolved at a
/// coordinate, that coordinate never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Ship,
    Hit,
    Miss,
}

impl Cell {
    /// Numeric code used in board snapshots, matching the backend encoding.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Ship => 2,
            Cell::Hit => 3,
            Cell::Miss => 4,
        }
    }

    /// Decode a snapshot code back into a cell state.
    pub fn from_code(code: u8) -> Option<Cell> {
        match code {
            0 => Some(Cell::Empty),
            2 => Some(Cell::Ship),
            3 => Some(Cell::Hit),
            4 => Some(Cell::Miss),
            _ => None,
        }
    }

    /// Terminal cells hold a resolved move and never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Cell::Hit | Cell::Miss)
    }
}

/// Square N×N grid owned by exactly one side: either the local player's own
/// board, or the player's view of the opponent. The opponent view never
/// stores `Ship`; it only accumulates `Hit`/`Miss` as moves are revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; N]; N],
}

impl Board {
    /// Create a board with every cell `Empty`.
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; N]; N],
        }
    }

    /// Whether (x, y) lies on the grid.
    pub fn in_range(x: u8, y: u8) -> bool {
        x < BOARD_SIZE && y < BOARD_SIZE
    }

    pub fn get(&self, x: u8, y: u8) -> Result<Cell, BoardError> {
        if !Self::in_range(x, y) {
            return Err(BoardError::OutOfRange { x, y });
        }
        Ok(self.cells[y as usize][x as usize])
    }

    /// Overwrite a single cell. No other state is touched.
    pub fn set(&mut self, x: u8, y: u8, cell: Cell) -> Result<(), BoardError> {
        if !Self::in_range(x, y) {
            return Err(BoardError::OutOfRange { x, y });
        }
        self.cells[y as usize][x as usize] = cell;
        Ok(())
    }

    /// Number of cells currently in `state`.
    pub fn count(&self, state: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == state)
            .count()
    }

    /// Row-major snapshot in the backend's numeric encoding, the shape
    /// consumed by ship submission.
    pub fn snapshot(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
