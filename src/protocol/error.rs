use alloc::string::String;

use crate::common::BoardError;
use crate::status::GameStatus;

/// Errors raised by the protocol layer and the peer state machine.
///
/// `MalformedFrame` and `HandshakeFailed` end the session. `TransportClosed`
/// is the graceful end of a session. `IllegalTurn` and `Board` are local and
/// recoverable: nothing was changed and nothing was sent.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("connection closed")]
    TransportClosed,
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
    #[error("not your turn (your status: {your:?}, enemy status: {enemy:?})")]
    IllegalTurn { your: GameStatus, enemy: GameStatus },
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl ProtocolError {
    /// `true` for errors that end the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProtocolError::MalformedFrame(_)
                | ProtocolError::TransportClosed
                | ProtocolError::HandshakeFailed(_)
        )
    }
}
