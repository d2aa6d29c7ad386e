//! Players that decide where ships go and where to shoot.
//!
//! - [`AiPlayer`]: random fleet, hunt/target shooting
//! - [`CliPlayer`]: interactive player reading commands from a line source
//! - [`PlayerNode`]: drives a player through a [`crate::session::SessionHandle`]

use alloc::vec::Vec;

use rand::rngs::SmallRng;

use crate::board::Board;
use crate::common::BoardError;
use crate::coordinate::Coordinate;
use crate::ship::Ship;
use crate::status::StatusPair;

pub trait Player: Send {
    /// Produce a complete, legal fleet.
    fn place_fleet(&mut self, rng: &mut SmallRng) -> Result<Vec<Ship>, BoardError>;

    /// Choose the next cell to shoot at, given what is known of the
    /// opponent's board. `None` gives up the game.
    fn select_target(&mut self, rng: &mut SmallRng, enemy: &Board) -> Option<Coordinate>;

    /// Text meant for the player, mostly sent by the peer.
    fn handle_notice(&mut self, _text: &str) {}

    /// The status pair changed.
    fn handle_status(&mut self, _status: StatusPair) {}
}

pub mod ai;
pub use ai::AiPlayer;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
pub use cli::CliPlayer;

#[cfg(feature = "std")]
pub mod node;
#[cfg(feature = "std")]
pub use node::PlayerNode;
