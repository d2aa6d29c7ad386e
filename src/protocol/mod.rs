//! Wire protocol between two peers.
//!
//! Every frame is a 4-byte big-endian opcode followed by an opcode-specific
//! payload. There is no length envelope and no sequence number: frame
//! boundaries follow from each payload's shape and ordering comes from the
//! underlying stream alone. Before any frame, each side sends its display
//! name once as a bare length-prefixed string.

use alloc::string::String;

use crate::coordinate::Coordinate;
use crate::status::{FieldStatus, GameStatus};

pub mod codec;
mod error;
#[cfg(feature = "std")]
pub mod stream;

pub use error::ProtocolError;

pub const OP_FIRE: i32 = 2;
pub const OP_CHANGE_STATUS: i32 = 3;
pub const OP_SEND_RESULT: i32 = 4;
pub const OP_BOTH_SET_ALL_SHIPS: i32 = 5;
pub const OP_SEND_MESSAGE: i32 = 6;

/// Messages exchanged between the two peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The sender shoots at the receiver's board.
    Fire(Coordinate),
    /// The sender asserts a status. `is_your_status` is `true` when the
    /// status describes the sender itself and `false` when it describes the
    /// receiver.
    ChangeStatus {
        status: GameStatus,
        is_your_status: bool,
    },
    /// Outcome of the receiver's last shot, as the cell looked before it.
    SendResult {
        field: FieldStatus,
        coordinate: Coordinate,
    },
    /// Turn decision made by the sender: `i_start` is `true` when the sender
    /// moves first.
    BothSetAllShips { i_start: bool },
    /// Free text for the receiving player.
    SendMessage(String),
}

impl Message {
    pub fn opcode(&self) -> i32 {
        match self {
            Message::Fire(_) => OP_FIRE,
            Message::ChangeStatus { .. } => OP_CHANGE_STATUS,
            Message::SendResult { .. } => OP_SEND_RESULT,
            Message::BothSetAllShips { .. } => OP_BOTH_SET_ALL_SHIPS,
            Message::SendMessage(_) => OP_SEND_MESSAGE,
        }
    }
}
