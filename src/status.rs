//! Player and board cell status values shared by the game core and the wire.

/// Progress of one player through a game.
///
/// Every peer keeps two of these: its own status and its belief about the
/// opponent's own status. Both are always expressed from the point of view of
/// the player they describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    OnCreate,
    AllShipsSet,
    PlayingYourTurn,
    PlayingEnemyTurn,
    YouWon,
    YouLose,
    Finish,
}

impl GameStatus {
    /// `true` once the game is decided.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::YouWon | GameStatus::YouLose | GameStatus::Finish)
    }

    /// `true` for the two in-game turn states.
    pub fn is_playing(self) -> bool {
        matches!(self, GameStatus::PlayingYourTurn | GameStatus::PlayingEnemyTurn)
    }

    /// The status the opponent holds when this player holds `self`.
    pub fn mirrored(self) -> Self {
        match self {
            GameStatus::PlayingYourTurn => GameStatus::PlayingEnemyTurn,
            GameStatus::PlayingEnemyTurn => GameStatus::PlayingYourTurn,
            GameStatus::YouWon => GameStatus::YouLose,
            GameStatus::YouLose => GameStatus::YouWon,
            other => other,
        }
    }
}

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldStatus {
    EmptyNoShoot,
    EmptyShoot,
    ShipNoShoot,
    ShipShoot,
    /// Unexplored cell of the opponent's board. Never sent as a shot result.
    Unknown,
}

impl FieldStatus {
    pub fn is_shot(self) -> bool {
        matches!(self, FieldStatus::EmptyShoot | FieldStatus::ShipShoot)
    }

    pub fn is_ship(self) -> bool {
        matches!(self, FieldStatus::ShipNoShoot | FieldStatus::ShipShoot)
    }

    /// Character used when rendering a board.
    pub fn glyph(self) -> char {
        match self {
            FieldStatus::EmptyNoShoot => 'o',
            FieldStatus::EmptyShoot => '-',
            FieldStatus::ShipNoShoot => 's',
            FieldStatus::ShipShoot => 'x',
            FieldStatus::Unknown => '?',
        }
    }
}

/// A participant's `(your, enemy)` status belief at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusPair {
    pub your: GameStatus,
    pub enemy: GameStatus,
}

impl StatusPair {
    pub const fn new(your: GameStatus, enemy: GameStatus) -> Self {
        Self { your, enemy }
    }

    /// `true` when this side may fire.
    pub fn is_my_turn(&self) -> bool {
        self.your == GameStatus::PlayingYourTurn && self.enemy == GameStatus::PlayingEnemyTurn
    }

    pub fn is_terminal(&self) -> bool {
        self.your.is_terminal()
    }

    /// `true` when `other` is the opponent's pair matching this one exactly.
    pub fn agrees_with(&self, other: &StatusPair) -> bool {
        self.your == other.enemy && self.enemy == other.your
    }
}

impl Default for StatusPair {
    fn default() -> Self {
        Self::new(GameStatus::OnCreate, GameStatus::OnCreate)
    }
}
