//! Per-session peer state machine.
//!
//! A [`PeerMachine`] holds this side's status pair, its own board and its view
//! of the opponent's board. Local actions and incoming messages are applied
//! here and answered with the frames that must go back to the peer, in order.
//! The machine never touches the stream itself; the session writes each
//! returned burst in one piece.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::board::{Board, Rules};
use crate::common::{BoardError, ShotOutcome};
use crate::config::NUM_SHIPS;
use crate::coordinate::Coordinate;
use crate::protocol::{Message, ProtocolError};
use crate::ship::Ship;
use crate::status::{FieldStatus, GameStatus, StatusPair};

pub const MISS_TEXT: &str = "Unfortunately, you didn't hit a ship and it's your enemy's turn.";
pub const REPEAT_TEXT: &str = "You have already shot at this field. Please try again.";
pub const HIT_TEXT: &str = "You hit a ship! It's your turn again!";
pub const SUNK_SUFFIX: &str = " The ship is completely hit.";
pub const AFLOAT_SUFFIX: &str = " But the ship has not yet been completely hit.";

pub const WIN_BANNER: &str = "\
########################################
#                                      #
#       Congratulation! You Won!       #
#                                      #
########################################
";

pub const LOSE_BANNER: &str = "\
########################################
#                                      #
#         You lost the game :(         #
#                                      #
########################################
";

/// Which end of the connection this side is.
///
/// Only matters when both fleets were confirmed at the same moment: the host
/// then makes the turn decision itself once the grace period runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub enum Role {
    Host,
    Guest,
}

/// Progress of the two fleet confirmations that precede the turn decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Neither fleet is confirmed.
    Neither,
    /// The peer confirmed; the local confirmation will toss.
    AwaitingOwnConfirmation,
    /// The local fleet is confirmed; the peer will toss.
    AwaitingPeerConfirmation,
    /// Both confirmations crossed on the wire and nobody has tossed yet.
    AwaitingDecision,
    Decided,
}

/// Result of applying one incoming message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Frames to send back, in order, as one burst.
    pub outbound: Vec<Message>,
    /// Text for the local player.
    pub notice: Option<String>,
}

impl Reaction {
    fn silent() -> Self {
        Self::default()
    }
}

pub struct PeerMachine<R: Rules = Board> {
    role: Role,
    rng: SmallRng,
    coin: bool,
    status: StatusPair,
    confirmation: Confirmation,
    tossed: bool,
    pending_shot: Option<Coordinate>,
    board: R,
    enemy_view: Board,
}

impl PeerMachine<Board> {
    pub fn new(role: Role, rng: SmallRng) -> Self {
        Self::with_rules(role, Board::new(), rng)
    }
}

impl<R: Rules> PeerMachine<R> {
    pub fn with_rules(role: Role, board: R, mut rng: SmallRng) -> Self {
        // drawn once per session and never consulted again
        let coin = rng.random_bool(0.5);
        Self {
            role,
            rng,
            coin,
            status: StatusPair::default(),
            confirmation: Confirmation::Neither,
            tossed: false,
            pending_shot: None,
            board,
            enemy_view: Board::enemy_view(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn coin(&self) -> bool {
        self.coin
    }

    pub fn status(&self) -> StatusPair {
        self.status
    }

    pub fn confirmation(&self) -> Confirmation {
        self.confirmation
    }

    /// Shot fired and not yet answered by a result.
    pub fn pending_shot(&self) -> Option<Coordinate> {
        self.pending_shot
    }

    pub fn board(&self) -> &R {
        &self.board
    }

    pub fn enemy_view(&self) -> &Board {
        &self.enemy_view
    }

    /// Shoot at the opponent's board.
    ///
    /// The status pair is left alone: it changes when the peer's answer
    /// arrives.
    pub fn fire(&mut self, at: Coordinate) -> Result<Vec<Message>, ProtocolError> {
        if !self.status.is_my_turn() || self.pending_shot.is_some() {
            return Err(self.illegal_turn());
        }
        debug!("firing at {}", at);
        self.pending_shot = Some(at);
        Ok(vec![Message::Fire(at)])
    }

    /// Add a ship to the own board and tell the peer about it.
    ///
    /// Placing the last ship of the fleet confirms the fleet.
    pub fn place_ship(&mut self, ship: Ship) -> Result<Vec<Message>, ProtocolError> {
        if self.status.your != GameStatus::OnCreate {
            return Err(BoardError::PlacementClosed.into());
        }
        debug!("placing {:?}", ship);
        self.board.place(ship)?;
        let placed = self.board.ships_placed();
        let mut out = vec![Message::SendMessage(format!(
            "Your enemy has placed a ship. ({}/{})",
            placed, NUM_SHIPS
        ))];
        if self.board.fleet_complete() {
            out.extend(self.on_all_ships_placed()?);
        }
        Ok(out)
    }

    /// Confirm the complete fleet.
    ///
    /// When the peer has already confirmed its own fleet, this side makes the
    /// turn decision and the returned burst carries it.
    pub fn on_all_ships_placed(&mut self) -> Result<Vec<Message>, ProtocolError> {
        if !self.board.fleet_complete() {
            return Err(BoardError::FleetIncomplete.into());
        }
        if self.status.your != GameStatus::OnCreate {
            return Err(BoardError::PlacementClosed.into());
        }
        self.status.your = GameStatus::AllShipsSet;
        let mut out = vec![Message::ChangeStatus {
            status: GameStatus::AllShipsSet,
            is_your_status: true,
        }];
        match self.confirmation {
            Confirmation::Neither => {
                self.confirmation = Confirmation::AwaitingPeerConfirmation;
                info!("fleet confirmed, waiting for the peer");
            }
            Confirmation::AwaitingOwnConfirmation => out.push(self.toss()),
            other => warn!("fleet confirmed in unexpected phase {:?}", other),
        }
        Ok(out)
    }

    /// Make the turn decision if both confirmations crossed and nobody has
    /// decided. Only the host does this.
    pub fn toss_if_undecided(&mut self) -> Vec<Message> {
        if self.role == Role::Host && self.confirmation == Confirmation::AwaitingDecision {
            info!("no turn decision from the peer, deciding locally");
            vec![self.toss()]
        } else {
            Vec::new()
        }
    }

    fn toss(&mut self) -> Message {
        let i_start = self.rng.random_bool(0.5);
        self.status = if i_start {
            StatusPair::new(GameStatus::PlayingYourTurn, GameStatus::PlayingEnemyTurn)
        } else {
            StatusPair::new(GameStatus::PlayingEnemyTurn, GameStatus::PlayingYourTurn)
        };
        self.confirmation = Confirmation::Decided;
        self.tossed = true;
        info!("turn decision: {}", if i_start { "we start" } else { "peer starts" });
        Message::BothSetAllShips { i_start }
    }

    /// Apply one message from the peer.
    pub fn handle(&mut self, msg: Message) -> Reaction {
        debug!("received {:?}", msg);
        match msg {
            Message::Fire(at) => self.apply_remote_fire(at),
            Message::ChangeStatus {
                status,
                is_your_status,
            } => {
                self.apply_remote_status(status, is_your_status);
                Reaction::silent()
            }
            Message::SendResult { field, coordinate } => {
                self.apply_remote_result(field, coordinate);
                Reaction::silent()
            }
            Message::BothSetAllShips { i_start } => {
                self.apply_remote_start(i_start);
                Reaction::silent()
            }
            Message::SendMessage(text) => Reaction {
                outbound: Vec::new(),
                notice: Some(text),
            },
        }
    }

    /// Resolve the peer's shot against the own board.
    ///
    /// Answers with the new own status, the new opponent status, the result
    /// and a text for the shooter, always in that order. A shot that arrives
    /// while it is not the peer's turn is dropped.
    pub fn apply_remote_fire(&mut self, at: Coordinate) -> Reaction {
        let expected = StatusPair::new(GameStatus::PlayingEnemyTurn, GameStatus::PlayingYourTurn);
        if self.status != expected {
            warn!(
                "ignoring shot at {} while statuses are {:?}/{:?}",
                at, self.status.your, self.status.enemy
            );
            return Reaction::silent();
        }

        let before = self.board.field(at);
        let outcome = self.board.resolve_shot(at);
        debug!("peer shot at {}: {:?}", at, outcome);

        let (your, enemy, text, notice) = match outcome {
            ShotOutcome::Miss => (
                GameStatus::PlayingYourTurn,
                GameStatus::PlayingEnemyTurn,
                String::from(MISS_TEXT),
                None,
            ),
            ShotOutcome::Repeat(_) => (
                GameStatus::PlayingEnemyTurn,
                GameStatus::PlayingYourTurn,
                String::from(REPEAT_TEXT),
                None,
            ),
            ShotOutcome::Hit { sunk } => (
                GameStatus::PlayingEnemyTurn,
                GameStatus::PlayingYourTurn,
                format!("{}{}", HIT_TEXT, if sunk { SUNK_SUFFIX } else { AFLOAT_SUFFIX }),
                None,
            ),
            ShotOutcome::Eliminated => (
                GameStatus::YouLose,
                GameStatus::YouWon,
                String::from(WIN_BANNER),
                Some(String::from(LOSE_BANNER)),
            ),
        };
        let field = match outcome {
            ShotOutcome::Repeat(previous) => previous,
            _ => before,
        };

        self.status = StatusPair::new(your, enemy);
        if outcome == ShotOutcome::Eliminated {
            info!("all ships sunk, game lost");
        }
        Reaction {
            outbound: vec![
                Message::ChangeStatus {
                    status: your,
                    is_your_status: true,
                },
                Message::ChangeStatus {
                    status: enemy,
                    is_your_status: false,
                },
                Message::SendResult {
                    field,
                    coordinate: at,
                },
                Message::SendMessage(text),
            ],
            notice,
        }
    }

    /// Take over a status asserted by the peer.
    ///
    /// `is_your_status` is relative to the sender, so a status the peer holds
    /// for itself is this side's opponent status and vice versa.
    pub fn apply_remote_status(&mut self, status: GameStatus, is_your_status: bool) {
        if is_your_status {
            self.status.enemy = status;
            if status == GameStatus::AllShipsSet {
                self.on_peer_confirmed();
            }
        } else {
            self.status.your = status;
        }
        debug!(
            "statuses now {:?}/{:?}",
            self.status.your, self.status.enemy
        );
        match self.status.your {
            GameStatus::YouWon => info!("all enemy ships sunk, game won"),
            GameStatus::YouLose => info!("game lost"),
            _ => {}
        }
    }

    fn on_peer_confirmed(&mut self) {
        self.confirmation = match self.confirmation {
            Confirmation::Neither => Confirmation::AwaitingOwnConfirmation,
            Confirmation::AwaitingPeerConfirmation => Confirmation::AwaitingDecision,
            other => {
                warn!("peer confirmed its fleet again in phase {:?}", other);
                other
            }
        };
    }

    /// Record the outcome of the last shot in the view of the opponent's board.
    pub fn apply_remote_result(&mut self, field: FieldStatus, at: Coordinate) {
        self.pending_shot = None;
        match field {
            FieldStatus::EmptyNoShoot => self.enemy_view.set_field(at, FieldStatus::EmptyShoot),
            FieldStatus::ShipNoShoot => self.enemy_view.set_field(at, FieldStatus::ShipShoot),
            FieldStatus::EmptyShoot | FieldStatus::ShipShoot => {
                debug!("repeat shot at {}", at)
            }
            FieldStatus::Unknown => warn!("peer sent an unknown result for {}", at),
        }
    }

    /// Adopt the turn decision made by the peer. `peer_starts` is the peer's
    /// `i_start`.
    pub fn apply_remote_start(&mut self, peer_starts: bool) {
        if self.tossed && self.role == Role::Host {
            warn!("peer made a turn decision after ours, keeping ours");
            return;
        }
        if self.status.your == GameStatus::OnCreate {
            warn!("turn decision received before the fleet was confirmed, ignoring");
            return;
        }
        self.status = if peer_starts {
            StatusPair::new(GameStatus::PlayingEnemyTurn, GameStatus::PlayingYourTurn)
        } else {
            StatusPair::new(GameStatus::PlayingYourTurn, GameStatus::PlayingEnemyTurn)
        };
        self.confirmation = Confirmation::Decided;
        self.pending_shot = None;
        info!(
            "turn decision from peer: {}",
            if peer_starts { "peer starts" } else { "we start" }
        );
    }

    fn illegal_turn(&self) -> ProtocolError {
        ProtocolError::IllegalTurn {
            your: self.status.your,
            enemy: self.status.enemy,
        }
    }
}
