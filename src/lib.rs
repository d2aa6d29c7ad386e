#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod board;
mod common;
mod config;
mod coordinate;
pub mod machine;
pub mod player;
pub mod protocol;
mod ship;
mod status;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod ui;

pub mod prelude;

pub use board::*;
pub use common::*;
pub use config::*;
pub use coordinate::*;
pub use machine::{Confirmation, PeerMachine, Reaction, Role};
pub use player::*;
pub use protocol::{Message, ProtocolError};
pub use ship::*;
pub use status::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use session::{Progress, Session, SessionEvent, SessionHandle, Snapshot};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
