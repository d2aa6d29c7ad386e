//! Common types for the game core: board errors and shot outcomes.

use crate::status::FieldStatus;

/// Outcome of resolving an incoming shot against the local board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Shot landed on untouched water.
    Miss,
    /// Cell was already shot; carries its unchanged status.
    Repeat(FieldStatus),
    /// Shot hit a ship segment. `sunk` is set when that ship is now fully hit.
    Hit { sunk: bool },
    /// Shot hit the last intact ship segment on the board.
    Eliminated,
}

/// Errors returned by coordinate, ship and board operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("coordinate ({x}, {y}) is not on the board")]
    CoordinateOutOfBounds { x: i32, y: i32 },
    #[error("the ship is not vertical or horizontal")]
    ShipNotStraight,
    #[error("ships of length {0} are not part of the fleet")]
    InvalidShipLength(usize),
    #[error("all ships of length {0} are already set")]
    QuotaReached(usize),
    #[error("the ship overlaps another ship")]
    ShipOverlaps,
    #[error("the ship has direct neighbours, one field must always remain free")]
    ShipHasNeighbours,
    #[error("ships can only be placed before the fleet is confirmed")]
    PlacementClosed,
    #[error("the fleet is not complete yet")]
    FleetIncomplete,
    #[error("unable to place ship")]
    UnableToPlaceShip,
}
