#![allow(dead_code)]

use battleship_link::protocol::codec;
use battleship_link::{Coordinate, Message, PeerMachine, Role, Ship};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// A complete legal fleet as `(x, y)` endpoints.
pub const FLEET_LAYOUT: [((i32, i32), (i32, i32)); 10] = [
    ((0, 0), (0, 1)),
    ((0, 3), (3, 3)),
    ((0, 6), (0, 9)),
    ((3, 0), (5, 0)),
    ((2, 5), (2, 7)),
    ((2, 9), (3, 9)),
    ((5, 5), (6, 5)),
    ((5, 9), (7, 9)),
    ((7, 0), (7, 1)),
    ((9, 5), (9, 9)),
];

pub fn fleet() -> Vec<Ship> {
    FLEET_LAYOUT
        .iter()
        .map(|&(start, end)| Ship::from_points(start, end).unwrap())
        .collect()
}

/// Every ship cell of [`fleet`].
pub fn fleet_cells() -> Vec<Coordinate> {
    fleet().iter().flat_map(|s| s.cells().to_vec()).collect()
}

pub fn machine(role: Role, seed: u64) -> PeerMachine {
    PeerMachine::new(role, SmallRng::seed_from_u64(seed))
}

/// Pass a message through the wire encoding.
pub fn over_wire(msg: Message) -> Message {
    let bytes = codec::encode(&msg);
    let (decoded, used) = codec::decode(&bytes).unwrap().unwrap();
    assert_eq!(used, bytes.len());
    decoded
}

/// Deliver `to_b` to `b`, then keep relaying replies both ways until both
/// sides fall silent.
pub fn relay(a: &mut PeerMachine, b: &mut PeerMachine, to_b: Vec<Message>) {
    let mut to_b = to_b;
    let mut to_a = Vec::new();
    while !to_a.is_empty() || !to_b.is_empty() {
        for msg in std::mem::take(&mut to_b) {
            to_a.extend(b.handle(over_wire(msg)).outbound);
        }
        for msg in std::mem::take(&mut to_a) {
            to_b.extend(a.handle(over_wire(msg)).outbound);
        }
    }
}

/// Place the whole fleet on both machines, `a` first.
pub fn place_both(a: &mut PeerMachine, b: &mut PeerMachine) {
    for ship in fleet() {
        let out = a.place_ship(ship).unwrap();
        relay(a, b, out);
    }
    for ship in fleet() {
        let out = b.place_ship(ship).unwrap();
        relay(b, a, out);
    }
}
