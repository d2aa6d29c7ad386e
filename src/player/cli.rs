use std::io::{self, BufRead, BufReader, Write};

use rand::rngs::SmallRng;

use super::ai::{random_fleet, AiPlayer};
use super::Player;
use crate::board::{Board, Rules};
use crate::common::BoardError;
use crate::config::{FLEET, NUM_SHIPS};
use crate::coordinate::Coordinate;
use crate::ship::Ship;
use crate::status::{GameStatus, StatusPair};
use crate::ui;

/// Parse exactly `count` whitespace separated 1-based numbers into 0-based
/// values.
pub fn parse_numbers(input: &str, count: usize) -> Result<Vec<i32>, String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() != count {
        return Err(String::from("Incorrect number of parameters"));
    }
    parts
        .iter()
        .map(|p| {
            p.parse::<i32>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| format!("Can't parse input ({}) to Integer.", p))
        })
        .collect()
}

/// Parse `x y` into a coordinate.
pub fn parse_coordinate(input: &str) -> Result<Coordinate, String> {
    let n = parse_numbers(input, 2)?;
    Coordinate::new(n[0], n[1]).map_err(|e| e.to_string())
}

/// Parse `x1 y1 x2 y2` into a ship.
pub fn parse_ship(input: &str) -> Result<Ship, String> {
    let n = parse_numbers(input, 4)?;
    Ship::from_points((n[0], n[1]), (n[2], n[3])).map_err(|e| e.to_string())
}

/// Human player at a terminal.
pub struct CliPlayer {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
    hint: AiPlayer,
}

impl CliPlayer {
    pub fn new() -> Self {
        Self::with_io(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input,
            output,
            hint: AiPlayer::new(),
        }
    }

    fn say(&mut self, text: &str) {
        let _ = writeln!(self.output, "{}", text);
        let _ = self.output.flush();
    }

    fn prompt(&mut self, text: &str) -> Option<String> {
        let _ = write!(self.output, "{}", text);
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for CliPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng) -> Result<Vec<Ship>, BoardError> {
        self.say("Set your ships: x1 y1 x2 y2 (1-based), 'random' for a random fleet.");
        let quota = FLEET
            .iter()
            .map(|(len, count)| format!("{}x length {}", count, len))
            .collect::<Vec<_>>()
            .join(", ");
        self.say(&format!("Fleet: {}.", quota));

        let mut board = Board::new();
        while !board.fleet_complete() {
            self.say(&ui::render_board(&board));
            let prompt = format!("Ship {}/{}: ", board.ships_placed() + 1, NUM_SHIPS);
            let Some(line) = self.prompt(&prompt) else {
                return Err(BoardError::FleetIncomplete);
            };
            if line.eq_ignore_ascii_case("random") {
                return random_fleet(rng);
            }
            match parse_ship(&line).and_then(|ship| board.place(ship).map_err(|e| e.to_string())) {
                Ok(()) => {}
                Err(e) => self.say(&e),
            }
        }
        self.say("All of your ships are set.");
        Ok(board.ships().to_vec())
    }

    fn select_target(&mut self, rng: &mut SmallRng, enemy: &Board) -> Option<Coordinate> {
        loop {
            let line = self.prompt("fire x y (ENTER for a suggestion, 'show', 'exit'): ")?;
            if line.eq_ignore_ascii_case("exit") {
                return None;
            }
            if line.eq_ignore_ascii_case("show") {
                let board = ui::render_board(enemy);
                self.say(&board);
                self.say(ui::LEGEND);
                continue;
            }
            if line.is_empty() {
                let suggestion = self.hint.select_target(rng, enemy);
                if let Some(at) = suggestion {
                    self.say(&format!("Firing at {}", at));
                }
                return suggestion;
            }
            match parse_coordinate(&line) {
                Ok(at) => return Some(at),
                Err(e) => self.say(&e),
            }
        }
    }

    fn handle_notice(&mut self, text: &str) {
        self.say(text);
    }

    fn handle_status(&mut self, status: StatusPair) {
        match status.your {
            GameStatus::PlayingYourTurn if status.is_my_turn() => self.say("It's your turn."),
            GameStatus::PlayingEnemyTurn => self.say("Waiting for your enemy..."),
            _ => {}
        }
    }
}
