//! Game board state and the placement / shot rules applied to it.

use alloc::vec::Vec;
use core::fmt;

use crate::common::{BoardError, ShotOutcome};
use crate::config::{required_ships, BOARD_SIZE, MAX_SHIP_LENGTH, NUM_SHIPS};
use crate::coordinate::Coordinate;
use crate::ship::Ship;
use crate::status::FieldStatus;

/// Placement and shot rules the peer state machine relies on.
///
/// These are pure, local and synchronous; nothing here touches the wire.
pub trait Rules {
    /// Check whether `ship` may be added to the board as it stands.
    fn check_placement(&self, ship: &Ship) -> Result<(), BoardError>;

    /// Add `ship` after checking it.
    fn place(&mut self, ship: Ship) -> Result<(), BoardError>;

    /// Number of ships placed so far.
    fn ships_placed(&self) -> usize;

    /// `true` once the whole fleet quota is on the board.
    fn fleet_complete(&self) -> bool;

    /// Resolve an incoming shot, updating the board.
    fn resolve_shot(&mut self, at: Coordinate) -> ShotOutcome;

    /// Current status of a cell.
    fn field(&self, at: Coordinate) -> FieldStatus;
}

/// A 10x10 board: either the player's own board or its view of the enemy.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    fields: [[FieldStatus; BOARD_SIZE]; BOARD_SIZE],
    ships: Vec<Ship>,
    ships_per_length: [usize; MAX_SHIP_LENGTH + 1],
}

impl Board {
    /// Empty own board: every cell is untouched water.
    pub fn new() -> Self {
        Self::filled(FieldStatus::EmptyNoShoot)
    }

    /// View of the opponent's board: every cell is unexplored.
    pub fn enemy_view() -> Self {
        Self::filled(FieldStatus::Unknown)
    }

    fn filled(status: FieldStatus) -> Self {
        Self {
            fields: [[status; BOARD_SIZE]; BOARD_SIZE],
            ships: Vec::new(),
            ships_per_length: [0; MAX_SHIP_LENGTH + 1],
        }
    }

    pub fn set_field(&mut self, at: Coordinate, status: FieldStatus) {
        self.fields[at.x()][at.y()] = status;
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship_at(&self, at: Coordinate) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.contains(at))
    }

    pub fn ships_of_length(&self, length: usize) -> usize {
        self.ships_per_length.get(length).copied().unwrap_or(0)
    }

    pub fn is_sunk(&self, ship: &Ship) -> bool {
        ship.cells()
            .iter()
            .all(|&c| self.field(c) == FieldStatus::ShipShoot)
    }

    /// `true` when ships are placed and every one of them is fully hit.
    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(|ship| self.is_sunk(ship))
    }

    /// Number of cells with the given status.
    pub fn count(&self, status: FieldStatus) -> usize {
        self.fields
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&f| f == status)
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules for Board {
    fn check_placement(&self, ship: &Ship) -> Result<(), BoardError> {
        let length = ship.len();
        let required = required_ships(length).ok_or(BoardError::InvalidShipLength(length))?;
        if self.ships_of_length(length) >= required {
            return Err(BoardError::QuotaReached(length));
        }
        if ship.cells().iter().any(|&c| self.field(c).is_ship()) {
            return Err(BoardError::ShipOverlaps);
        }
        let touches = ship
            .cells()
            .iter()
            .flat_map(|c| c.neighbours())
            .any(|n| self.field(n).is_ship());
        if touches {
            return Err(BoardError::ShipHasNeighbours);
        }
        Ok(())
    }

    fn place(&mut self, ship: Ship) -> Result<(), BoardError> {
        self.check_placement(&ship)?;
        for &cell in ship.cells() {
            self.set_field(cell, FieldStatus::ShipNoShoot);
        }
        self.ships_per_length[ship.len()] += 1;
        self.ships.push(ship);
        Ok(())
    }

    fn ships_placed(&self) -> usize {
        self.ships.len()
    }

    fn fleet_complete(&self) -> bool {
        self.ships.len() == NUM_SHIPS
    }

    fn resolve_shot(&mut self, at: Coordinate) -> ShotOutcome {
        match self.field(at) {
            FieldStatus::EmptyNoShoot => {
                self.set_field(at, FieldStatus::EmptyShoot);
                ShotOutcome::Miss
            }
            FieldStatus::ShipNoShoot => {
                self.set_field(at, FieldStatus::ShipShoot);
                if self.all_sunk() {
                    ShotOutcome::Eliminated
                } else {
                    let sunk = self.ship_at(at).is_some_and(|ship| self.is_sunk(ship));
                    ShotOutcome::Hit { sunk }
                }
            }
            previous @ (FieldStatus::EmptyShoot | FieldStatus::ShipShoot) => {
                ShotOutcome::Repeat(previous)
            }
            // only an enemy view holds unexplored cells
            FieldStatus::Unknown => ShotOutcome::Repeat(FieldStatus::EmptyShoot),
        }
    }

    fn field(&self, at: Coordinate) -> FieldStatus {
        self.fields[at.x()][at.y()]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.fields.iter() {
            for (i, field) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", field.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ ships: {:?}", self.ships)?;
        write!(f, "{}", self)?;
        write!(f, "}}")
    }
}
