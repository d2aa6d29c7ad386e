//! Commonly used types for ease of import.

pub use crate::{
    AiPlayer, Board, BoardError, Coordinate, FieldStatus, GameStatus, Message, PeerMachine,
    Player, ProtocolError, Role, Rules, Ship, StatusPair,
};

#[cfg(feature = "std")]
pub use crate::{
    CliPlayer, InMemoryTransport, PlayerNode, Session, SessionConfig, SessionEvent, SessionHandle,
    TcpTransport, Transport,
};
