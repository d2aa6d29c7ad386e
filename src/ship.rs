//! Ship geometry: a straight line of cells between two end coordinates.

use alloc::vec::Vec;
use core::fmt;

use crate::common::BoardError;
use crate::coordinate::Coordinate;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// All cells share the same `x`.
    Horizontal,
    /// All cells share the same `y`.
    Vertical,
}

/// A ship spanning `start..=end`. Endpoints may be given in either order.
#[derive(Clone, PartialEq, Eq)]
pub struct Ship {
    start: Coordinate,
    end: Coordinate,
    orientation: Orientation,
    cells: Vec<Coordinate>,
}

impl Ship {
    pub fn new(start: Coordinate, end: Coordinate) -> Result<Self, BoardError> {
        let (orientation, cells) = if start.x() == end.x() {
            let (lo, hi) = ordered(start.y(), end.y());
            let cells = (lo..=hi)
                .map(|y| Coordinate::new(start.x() as i32, y as i32))
                .collect::<Result<Vec<_>, _>>()?;
            (Orientation::Horizontal, cells)
        } else if start.y() == end.y() {
            let (lo, hi) = ordered(start.x(), end.x());
            let cells = (lo..=hi)
                .map(|x| Coordinate::new(x as i32, start.y() as i32))
                .collect::<Result<Vec<_>, _>>()?;
            (Orientation::Vertical, cells)
        } else {
            return Err(BoardError::ShipNotStraight);
        };
        Ok(Self {
            start,
            end,
            orientation,
            cells,
        })
    }

    /// Build a ship from raw `(x, y)` endpoints.
    pub fn from_points(start: (i32, i32), end: (i32, i32)) -> Result<Self, BoardError> {
        Self::new(Coordinate::try_from(start)?, Coordinate::try_from(end)?)
    }

    pub fn start(&self) -> Coordinate {
        self.start
    }

    pub fn end(&self) -> Coordinate {
        self.end
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of cells the ship occupies.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        self.cells.contains(&at)
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ start: {}, end: {}, orientation: {:?}, length: {} }}",
            self.start,
            self.end,
            self.orientation,
            self.len(),
        )
    }
}
