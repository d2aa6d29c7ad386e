//! Board coordinates.

use core::fmt;

use crate::common::BoardError;
use crate::config::BOARD_SIZE;

/// A cell on the board. `x` selects the row, `y` the column.
///
/// Both components are always within `0..BOARD_SIZE`; construction of any
/// other value fails instead of clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct Coordinate {
    x: u8,
    y: u8,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Result<Self, BoardError> {
        let size = BOARD_SIZE as i32;
        if !(0..size).contains(&x) || !(0..size).contains(&y) {
            return Err(BoardError::CoordinateOutOfBounds { x, y });
        }
        Ok(Self {
            x: x as u8,
            y: y as u8,
        })
    }

    pub fn x(&self) -> usize {
        self.x as usize
    }

    pub fn y(&self) -> usize {
        self.y as usize
    }

    /// Offset by `(dx, dy)`, or `None` when the result leaves the board.
    pub fn offset(&self, dx: i32, dy: i32) -> Option<Self> {
        Self::new(self.x as i32 + dx, self.y as i32 + dy).ok()
    }

    /// All on-board cells touching this one, diagonals included.
    pub fn neighbours(self) -> impl Iterator<Item = Coordinate> {
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// On-board cells sharing an edge with this one.
    pub fn orthogonal(self) -> impl Iterator<Item = Coordinate> {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE as u8).flat_map(|x| (0..BOARD_SIZE as u8).map(move |y| Coordinate { x, y }))
    }
}

impl TryFrom<(i32, i32)> for Coordinate {
    type Error = BoardError;

    fn try_from((x, y): (i32, i32)) -> Result<Self, Self::Error> {
        Coordinate::new(x, y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based, the way players type coordinates
        write!(f, "({}, {})", self.x + 1, self.y + 1)
    }
}
