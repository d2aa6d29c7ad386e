//! Text rendering of boards.

use std::fmt::Write;

use crate::board::{Board, Rules};
use crate::config::BOARD_SIZE;
use crate::coordinate::Coordinate;

fn row(board: &Board, x: usize, out: &mut String) {
    for y in 0..BOARD_SIZE {
        if let Ok(at) = Coordinate::new(x as i32, y as i32) {
            out.push(board.field(at).glyph());
            out.push(' ');
        }
    }
}

/// Own board and enemy view side by side, one board row per line.
pub fn render_boards(own: &Board, enemy: &Board) -> String {
    let mut out = String::from("Your board:\t\t\tEnemies board:\n");
    for x in 0..BOARD_SIZE {
        row(own, x, &mut out);
        out.push_str("\t\t");
        row(enemy, x, &mut out);
        out.push('\n');
    }
    out
}

/// A single board with 1-based row and column numbers.
pub fn render_board(board: &Board) -> String {
    let mut out = String::from("    ");
    for y in 1..=BOARD_SIZE {
        let _ = write!(out, "{:<2}", y);
    }
    out.push('\n');
    for x in 0..BOARD_SIZE {
        let _ = write!(out, "{:>2}  ", x + 1);
        row(board, x, &mut out);
        out.push('\n');
    }
    out
}

pub const LEGEND: &str = "o = water, - = missed shot, s = ship, x = hit ship, ? = unknown";
