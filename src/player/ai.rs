use alloc::vec::Vec;

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::Player;
use crate::board::{Board, Rules};
use crate::common::BoardError;
use crate::config::{BOARD_SIZE, FLEET};
use crate::coordinate::Coordinate;
use crate::ship::Ship;
use crate::status::FieldStatus;

const ATTEMPTS_PER_SHIP: usize = 200;
const ATTEMPTS_PER_FLEET: usize = 50;

/// Computer player: random legal fleet, then hunt and target.
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

/// A random straight ship of `length` that fits on the board.
pub fn random_ship<R: Rng>(rng: &mut R, length: usize) -> Result<Ship, BoardError> {
    let last = (BOARD_SIZE - length) as i32;
    let span = length as i32 - 1;
    let (start, end) = if rng.random() {
        let x = rng.random_range(0..BOARD_SIZE as i32);
        let y = rng.random_range(0..=last);
        ((x, y), (x, y + span))
    } else {
        let x = rng.random_range(0..=last);
        let y = rng.random_range(0..BOARD_SIZE as i32);
        ((x, y), (x + span, y))
    };
    Ship::from_points(start, end)
}

/// Place the whole fleet at random, longest ships first.
pub fn random_fleet<R: Rng>(rng: &mut R) -> Result<Vec<Ship>, BoardError> {
    'fleet: for _ in 0..ATTEMPTS_PER_FLEET {
        let mut board = Board::new();
        for &(length, count) in FLEET.iter().rev() {
            for _ in 0..count {
                let placed = (0..ATTEMPTS_PER_SHIP).any(|_| {
                    random_ship(rng, length)
                        .and_then(|ship| board.place(ship))
                        .is_ok()
                });
                if !placed {
                    debug!("fleet layout stuck on length {}, starting over", length);
                    continue 'fleet;
                }
            }
        }
        return Ok(board.ships().to_vec());
    }
    Err(BoardError::UnableToPlaceShip)
}

/// Unexplored cells worth shooting at: never diagonal to a known hit, since
/// ships do not touch.
fn open_cells(enemy: &Board) -> Vec<Coordinate> {
    Coordinate::all()
        .filter(|&c| enemy.field(c) == FieldStatus::Unknown)
        .filter(|&c| {
            !c.neighbours()
                .filter(|n| n.x() != c.x() && n.y() != c.y())
                .any(|n| enemy.field(n) == FieldStatus::ShipShoot)
        })
        .collect()
}

impl Player for AiPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng) -> Result<Vec<Ship>, BoardError> {
        random_fleet(rng)
    }

    fn select_target(&mut self, rng: &mut SmallRng, enemy: &Board) -> Option<Coordinate> {
        let open = open_cells(enemy);
        // target mode: finish a ship that has been hit
        let targets: Vec<Coordinate> = open
            .iter()
            .copied()
            .filter(|c| c.orthogonal().any(|n| enemy.field(n) == FieldStatus::ShipShoot))
            .collect();
        let pool = if targets.is_empty() { &open } else { &targets };
        pool.choose(rng).copied()
    }
}
