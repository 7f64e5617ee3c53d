//! Plain-text board rendering for the CLI.

use crate::board::{Board, Cell};
use crate::config::BOARD_SIZE;

/// Render a board as a coordinate-labelled grid. Ships are hidden unless
/// `show_ships` is set, which is how the opponent view is drawn.
pub fn render_board(board: &Board, show_ships: bool) -> String {
    let mut out = String::from("   ");
    for x in 0..BOARD_SIZE {
        out.push_str(&format!("{} ", x));
    }
    out.push('\n');
    for y in 0..BOARD_SIZE {
        out.push_str(&format!("{:>2} ", y));
        for x in 0..BOARD_SIZE {
            let glyph = match board.get(x, y).unwrap_or(Cell::Empty) {
                Cell::Empty => '.',
                Cell::Ship => {
                    if show_ships {
                        '#'
                    } else {
                        '.'
                    }
                }
                Cell::Hit => 'X',
                Cell::Miss => 'o',
            };
            out.push(glyph);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}
