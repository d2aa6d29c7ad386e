use battleship_link::protocol::codec::{decode, decode_string, encode, encode_string};
use battleship_link::{Coordinate, FieldStatus, GameStatus, Message, ProtocolError};
use proptest::prelude::*;

fn at(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y).unwrap()
}

#[test]
fn frames_have_the_documented_layout() {
    assert_eq!(
        encode(&Message::Fire(at(3, 4))),
        vec![0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4]
    );
    assert_eq!(
        encode(&Message::ChangeStatus {
            status: GameStatus::YouWon,
            is_your_status: true
        }),
        vec![0, 0, 0, 3, 0, 0, 0, 5, 1]
    );
    assert_eq!(
        encode(&Message::SendResult {
            field: FieldStatus::ShipNoShoot,
            coordinate: at(9, 0)
        }),
        vec![0, 0, 0, 4, 0, 0, 0, 2, 0, 0, 0, 9, 0, 0, 0, 0]
    );
    assert_eq!(
        encode(&Message::BothSetAllShips { i_start: false }),
        vec![0, 0, 0, 5, 0]
    );
    assert_eq!(
        encode(&Message::SendMessage("hi".into())),
        vec![0, 0, 0, 6, 0, 2, b'h', b'i']
    );
}

#[test]
fn status_codes_follow_the_wire_table() {
    let table = [
        (GameStatus::OnCreate, 0u8),
        (GameStatus::AllShipsSet, 1),
        (GameStatus::PlayingYourTurn, 2),
        (GameStatus::PlayingEnemyTurn, 3),
        (GameStatus::Finish, 4),
        (GameStatus::YouWon, 5),
        (GameStatus::YouLose, 6),
    ];
    for (status, code) in table {
        let bytes = encode(&Message::ChangeStatus {
            status,
            is_your_status: false,
        });
        assert_eq!(bytes[4..8], [0, 0, 0, code], "{:?}", status);
    }

    let fields = [
        (FieldStatus::EmptyNoShoot, 0u8),
        (FieldStatus::EmptyShoot, 1),
        (FieldStatus::ShipNoShoot, 2),
        (FieldStatus::ShipShoot, 3),
        (FieldStatus::Unknown, 4),
    ];
    for (field, code) in fields {
        let bytes = encode(&Message::SendResult {
            field,
            coordinate: at(0, 0),
        });
        assert_eq!(bytes[4..8], [0, 0, 0, code], "{:?}", field);
    }
}

#[test]
fn unknown_opcode_is_malformed() {
    let err = decode(&[0, 0, 0, 99, 1, 2, 3]).unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedFrame(_)));
    assert!(err.is_fatal());

    // the handshake string is never a frame
    let err = decode(&[0, 0, 0, 0]).unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedFrame(_)));
}

#[test]
fn bad_payload_values_are_malformed() {
    // status code 7 does not exist
    let err = decode(&[0, 0, 0, 3, 0, 0, 0, 7, 1]).unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedFrame(_)));

    // x = 10 is off the board
    let err = decode(&[0, 0, 0, 2, 0, 0, 0, 10, 0, 0, 0, 0]).unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedFrame(_)));

    // negative y
    let err = decode(&[0, 0, 0, 2, 0, 0, 0, 1, 255, 255, 255, 255]).unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedFrame(_)));

    // invalid utf-8
    let err = decode(&[0, 0, 0, 6, 0, 2, 0xff, 0xfe]).unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedFrame(_)));
}

#[test]
fn truncated_frame_waits_for_more() {
    let bytes = encode(&Message::SendResult {
        field: FieldStatus::EmptyNoShoot,
        coordinate: at(1, 2),
    });
    for cut in 0..bytes.len() {
        assert!(decode(&bytes[..cut]).unwrap().is_none());
    }
}

#[test]
fn any_non_zero_byte_is_true() {
    let (msg, used) = decode(&[0, 0, 0, 5, 7]).unwrap().unwrap();
    assert_eq!(used, 5);
    assert_eq!(msg, Message::BothSetAllShips { i_start: true });
}

#[test]
fn back_to_back_frames_decode_in_order() {
    let first = Message::ChangeStatus {
        status: GameStatus::PlayingEnemyTurn,
        is_your_status: true,
    };
    let second = Message::SendMessage("next".into());
    let mut bytes = encode(&first);
    bytes.extend(encode(&second));

    let (msg, used) = decode(&bytes).unwrap().unwrap();
    assert_eq!(msg, first);
    let (msg, rest) = decode(&bytes[used..]).unwrap().unwrap();
    assert_eq!(msg, second);
    assert_eq!(used + rest, bytes.len());
}

#[test]
fn oversized_text_is_cut_to_the_length_limit() {
    let text = "a".repeat(70_000);
    let bytes = encode(&Message::SendMessage(text));
    assert_eq!(bytes[4..6], [0xff, 0xff]);
    assert_eq!(bytes.len(), 4 + 2 + 65_535);
}

#[test]
fn handshake_string_roundtrip() {
    let mut bytes = Vec::new();
    encode_string("Kapitän", &mut bytes);
    assert_eq!(bytes[..2], [0, 8]);
    let (name, used) = decode_string(&bytes).unwrap().unwrap();
    assert_eq!(name, "Kapitän");
    assert_eq!(used, bytes.len());
    assert!(decode_string(&bytes[..3]).unwrap().is_none());
}

fn game_status() -> impl Strategy<Value = GameStatus> {
    prop_oneof![
        Just(GameStatus::OnCreate),
        Just(GameStatus::AllShipsSet),
        Just(GameStatus::PlayingYourTurn),
        Just(GameStatus::PlayingEnemyTurn),
        Just(GameStatus::Finish),
        Just(GameStatus::YouWon),
        Just(GameStatus::YouLose),
    ]
}

proptest! {
    #[test]
    fn change_status_roundtrip(status in game_status(), is_your_status in any::<bool>()) {
        let msg = Message::ChangeStatus { status, is_your_status };
        let (decoded, _) = decode(&encode(&msg)).unwrap().unwrap();
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn fire_roundtrip(x in 0..10i32, y in 0..10i32) {
        let msg = Message::Fire(at(x, y));
        let (decoded, used) = decode(&encode(&msg)).unwrap().unwrap();
        prop_assert_eq!(used, 12);
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn off_board_coordinates_are_never_built(x in any::<i32>(), y in any::<i32>()) {
        let inside = (0..10).contains(&x) && (0..10).contains(&y);
        prop_assert_eq!(Coordinate::new(x, y).is_ok(), inside);
    }

    #[test]
    fn text_roundtrip(text in ".{0,200}") {
        let msg = Message::SendMessage(text);
        let (decoded, _) = decode(&encode(&msg)).unwrap().unwrap();
        prop_assert_eq!(decoded, msg);
    }
}
