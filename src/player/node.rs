use log::{debug, info};
use rand::rngs::SmallRng;
use tokio::time::{timeout, Duration};

use super::Player;
use crate::protocol::ProtocolError;
use crate::session::{Progress, SessionEvent, SessionHandle};
use crate::status::{GameStatus, StatusPair};

/// How long the winner waits for the loser to hang up.
const LINGER: Duration = Duration::from_secs(5);

enum Wake {
    Progress,
    Event(Option<SessionEvent>),
}

/// Plays one game: places the player's fleet through the session, then
/// shoots whenever it is this side's turn.
pub struct PlayerNode {
    player: Box<dyn Player>,
    session: SessionHandle,
    shots: usize,
    last_status: Option<StatusPair>,
}

impl PlayerNode {
    pub fn new(player: Box<dyn Player>, session: SessionHandle) -> Self {
        Self {
            player,
            session,
            shots: 0,
            last_status: None,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Shots accepted by the session so far.
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Play until the game is decided, the player gives up or the connection
    /// ends. Returns this side's final status.
    pub async fn run(&mut self, rng: &mut SmallRng) -> anyhow::Result<GameStatus> {
        let fleet = self.player.place_fleet(rng)?;
        for ship in fleet {
            self.session.place_ship(ship).await?;
        }
        info!("{}: fleet placed", self.session.self_name());

        let mut progress = self.session.subscribe();
        loop {
            let current = *progress.borrow_and_update();
            self.observe(current.status);

            if current.status.is_terminal() || !current.connected {
                return self.finish(current).await;
            }

            if current.can_fire() {
                let enemy = self.session.snapshot().await.enemy;
                let Some(at) = self.player.select_target(rng, &enemy) else {
                    info!("{}: player gave up", self.session.self_name());
                    self.session.close();
                    self.session.wait_closed().await?;
                    return Ok(self.session.status().your);
                };
                match self.session.fire(at).await {
                    Ok(()) => self.shots += 1,
                    // statuses moved on between the check and the shot
                    Err(ProtocolError::IllegalTurn { .. }) => debug!("shot at {} refused", at),
                    Err(e) => return Err(e.into()),
                }
                continue;
            }

            let wake = tokio::select! {
                _ = progress.changed() => Wake::Progress,
                event = self.session.next_event() => Wake::Event(event),
            };
            if let Wake::Event(Some(SessionEvent::Notice(text))) = wake {
                self.player.handle_notice(&text);
            }
        }
    }

    fn observe(&mut self, status: StatusPair) {
        if self.last_status != Some(status) {
            self.last_status = Some(status);
            self.player.handle_status(status);
        }
    }

    fn drain_notices(&mut self) {
        while let Some(event) = self.session.try_next_event() {
            if let SessionEvent::Notice(text) = event {
                self.player.handle_notice(&text);
            }
        }
    }

    /// The loser's last burst is already written, so it hangs up at once.
    /// Everybody else waits for the peer to hang up, passing on the remaining
    /// notices.
    async fn finish(&mut self, current: Progress) -> anyhow::Result<GameStatus> {
        if current.connected && current.status.your != GameStatus::YouLose {
            loop {
                match timeout(LINGER, self.session.next_event()).await {
                    Ok(Some(SessionEvent::Notice(text))) => self.player.handle_notice(&text),
                    Ok(Some(SessionEvent::Closed)) | Ok(None) => break,
                    Err(_) => {
                        debug!("peer did not hang up, closing");
                        break;
                    }
                }
            }
        }
        self.session.close();
        self.session.wait_closed().await?;
        self.drain_notices();
        let status = self.session.status().your;
        info!("{}: game over, {:?}", self.session.self_name(), status);
        Ok(status)
    }
}
