use alloc::string::String;
use core::time::Duration;

pub const BOARD_SIZE: usize = 10;
pub const MIN_SHIP_LENGTH: usize = 2;
pub const MAX_SHIP_LENGTH: usize = 5;

/// Required fleet as `(ship length, number of ships)`.
pub const FLEET: [(usize, usize); 4] = [(2, 4), (3, 3), (4, 2), (5, 1)];

/// Number of ships in a complete fleet.
pub const NUM_SHIPS: usize = 4 + 3 + 2 + 1;

/// Total number of ship cells in a complete fleet.
pub const TOTAL_SHIP_CELLS: usize = 2 * 4 + 3 * 3 + 4 * 2 + 5;

pub const DEFAULT_PORT: u16 = 3000;

/// Longest string the wire format can carry (2-byte length prefix).
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// How long the listening side waits for the peer's turn decision before
/// tossing itself when both fleets were confirmed at the same time.
pub const DEFAULT_DECISION_GRACE: Duration = Duration::from_secs(2);

/// Number of ships of `length` a complete fleet contains, or `None` when no
/// ship of that length is allowed.
pub fn required_ships(length: usize) -> Option<usize> {
    FLEET
        .iter()
        .find(|(len, _)| *len == length)
        .map(|(_, count)| *count)
}

/// Per-session settings supplied by the application.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name sent to the peer during the handshake.
    pub self_name: String,
    /// Fixed RNG seed for reproducible tosses and AI play.
    pub seed: Option<u64>,
    /// Optional read timeout. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    pub decision_grace: Duration,
}

impl SessionConfig {
    pub fn new(self_name: impl Into<String>) -> Self {
        Self {
            self_name: self_name.into(),
            seed: None,
            read_timeout: None,
            decision_grace: DEFAULT_DECISION_GRACE,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_decision_grace(mut self, grace: Duration) -> Self {
        self.decision_grace = grace;
        self
    }
}
