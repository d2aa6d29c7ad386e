//! Binary encoding of [`Message`] frames.
//!
//! All integers are big-endian. Booleans are one byte (`0` is false, anything
//! else true). Strings are a 2-byte byte length followed by UTF-8.
//!
//! Status enumerations go over the wire through the explicit code tables
//! below, never through their declaration order, so reordering the enums
//! cannot change the wire format.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::{
    Message, ProtocolError, OP_BOTH_SET_ALL_SHIPS, OP_CHANGE_STATUS, OP_FIRE, OP_SEND_MESSAGE,
    OP_SEND_RESULT,
};
use crate::config::MAX_STRING_LEN;
use crate::coordinate::Coordinate;
use crate::status::{FieldStatus, GameStatus};

pub fn game_status_code(status: GameStatus) -> i32 {
    match status {
        GameStatus::OnCreate => 0,
        GameStatus::AllShipsSet => 1,
        GameStatus::PlayingYourTurn => 2,
        GameStatus::PlayingEnemyTurn => 3,
        GameStatus::Finish => 4,
        GameStatus::YouWon => 5,
        GameStatus::YouLose => 6,
    }
}

pub fn game_status_from_code(code: i32) -> Option<GameStatus> {
    match code {
        0 => Some(GameStatus::OnCreate),
        1 => Some(GameStatus::AllShipsSet),
        2 => Some(GameStatus::PlayingYourTurn),
        3 => Some(GameStatus::PlayingEnemyTurn),
        4 => Some(GameStatus::Finish),
        5 => Some(GameStatus::YouWon),
        6 => Some(GameStatus::YouLose),
        _ => None,
    }
}

pub fn field_status_code(status: FieldStatus) -> i32 {
    match status {
        FieldStatus::EmptyNoShoot => 0,
        FieldStatus::EmptyShoot => 1,
        FieldStatus::ShipNoShoot => 2,
        FieldStatus::ShipShoot => 3,
        FieldStatus::Unknown => 4,
    }
}

pub fn field_status_from_code(code: i32) -> Option<FieldStatus> {
    match code {
        0 => Some(FieldStatus::EmptyNoShoot),
        1 => Some(FieldStatus::EmptyShoot),
        2 => Some(FieldStatus::ShipNoShoot),
        3 => Some(FieldStatus::ShipShoot),
        4 => Some(FieldStatus::Unknown),
        _ => None,
    }
}

/// Encode a single frame.
pub fn encode(msg: &Message) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(msg, &mut buf);
    buf
}

/// Append the encoding of `msg` to `buf`.
pub fn encode_into(msg: &Message, buf: &mut Vec<u8>) {
    put_i32(buf, msg.opcode());
    match msg {
        Message::Fire(at) => put_coordinate(buf, *at),
        Message::ChangeStatus {
            status,
            is_your_status,
        } => {
            put_i32(buf, game_status_code(*status));
            put_bool(buf, *is_your_status);
        }
        Message::SendResult { field, coordinate } => {
            put_i32(buf, field_status_code(*field));
            put_coordinate(buf, *coordinate);
        }
        Message::BothSetAllShips { i_start } => put_bool(buf, *i_start),
        Message::SendMessage(text) => encode_string(text, buf),
    }
}

/// Append a length-prefixed string, cut to the longest prefix that fits.
pub fn encode_string(text: &str, buf: &mut Vec<u8>) {
    let text = wire_prefix(text);
    buf.extend_from_slice(&(text.len() as u16).to_be_bytes());
    buf.extend_from_slice(text.as_bytes());
}

/// Longest prefix of `text` that fits a wire string, cut on a char boundary.
pub fn wire_prefix(text: &str) -> &str {
    if text.len() <= MAX_STRING_LEN {
        return text;
    }
    let mut end = MAX_STRING_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Decode one frame from the front of `buf`.
///
/// Returns `Ok(None)` while `buf` holds only part of a frame, and the message
/// with the number of bytes it used once a whole frame is present.
pub fn decode(buf: &[u8]) -> Result<Option<(Message, usize)>, ProtocolError> {
    let mut cursor = Cursor::new(buf);
    finish(parse_message(&mut cursor), &cursor)
}

/// Decode one bare length-prefixed string, as sent during the handshake.
pub fn decode_string(buf: &[u8]) -> Result<Option<(String, usize)>, ProtocolError> {
    let mut cursor = Cursor::new(buf);
    finish(cursor.string(), &cursor)
}

fn finish<T>(
    parsed: Result<T, Partial>,
    cursor: &Cursor<'_>,
) -> Result<Option<(T, usize)>, ProtocolError> {
    match parsed {
        Ok(value) => Ok(Some((value, cursor.pos))),
        Err(Partial::Incomplete) => Ok(None),
        Err(Partial::Invalid(e)) => Err(e),
    }
}

fn parse_message(cursor: &mut Cursor<'_>) -> Result<Message, Partial> {
    let opcode = cursor.i32()?;
    let msg = match opcode {
        OP_FIRE => Message::Fire(cursor.coordinate()?),
        OP_CHANGE_STATUS => {
            let code = cursor.i32()?;
            let status = game_status_from_code(code)
                .ok_or_else(|| malformed(format!("unknown game status code {}", code)))?;
            let is_your_status = cursor.bool()?;
            Message::ChangeStatus {
                status,
                is_your_status,
            }
        }
        OP_SEND_RESULT => {
            let code = cursor.i32()?;
            let field = field_status_from_code(code)
                .ok_or_else(|| malformed(format!("unknown field status code {}", code)))?;
            let coordinate = cursor.coordinate()?;
            Message::SendResult { field, coordinate }
        }
        OP_BOTH_SET_ALL_SHIPS => Message::BothSetAllShips {
            i_start: cursor.bool()?,
        },
        OP_SEND_MESSAGE => Message::SendMessage(cursor.string()?),
        other => return Err(malformed(format!("unknown opcode {}", other))),
    };
    Ok(msg)
}

enum Partial {
    Incomplete,
    Invalid(ProtocolError),
}

fn malformed(reason: String) -> Partial {
    Partial::Invalid(ProtocolError::MalformedFrame(reason))
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Partial> {
        let bytes = self
            .buf
            .get(self.pos..self.pos + n)
            .ok_or(Partial::Incomplete)?;
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], Partial> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn i32(&mut self) -> Result<i32, Partial> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    fn bool(&mut self) -> Result<bool, Partial> {
        Ok(self.array::<1>()?[0] != 0)
    }

    fn coordinate(&mut self) -> Result<Coordinate, Partial> {
        let x = self.i32()?;
        let y = self.i32()?;
        Coordinate::new(x, y)
            .map_err(|_| malformed(format!("coordinate ({}, {}) is off the board", x, y)))
    }

    fn string(&mut self) -> Result<String, Partial> {
        let len = u16::from_be_bytes(self.array()?) as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| malformed(String::from("string is not valid utf-8")))
    }
}

fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn put_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(value as u8);
}

fn put_coordinate(buf: &mut Vec<u8>, at: Coordinate) {
    put_i32(buf, at.x() as i32);
    put_i32(buf, at.y() as i32);
}
