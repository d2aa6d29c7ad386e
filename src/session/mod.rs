//! One game against one peer over one byte stream.
//!
//! [`Session::start`] exchanges names, then spawns the protocol loop that
//! applies incoming frames. The returned [`SessionHandle`] is how the rest of
//! the program acts and observes: every action and every incoming frame is
//! applied under the same lock, and the frames it produces are written before
//! the lock is released, so no burst is ever split or observed half applied.

use std::sync::Arc;

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::board::Board;
use crate::config::SessionConfig;
use crate::coordinate::Coordinate;
use crate::machine::{Confirmation, PeerMachine, Role};
use crate::protocol::stream::{FrameReader, FrameWriter};
use crate::protocol::{Message, ProtocolError};
use crate::ship::Ship;
use crate::status::StatusPair;
use crate::transport::{BoxedReader, BoxedWriter, Transport};

mod handshake;
mod protocol_loop;

/// What observers of a session see change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Progress {
    pub status: StatusPair,
    /// A shot is out and its result has not arrived.
    pub awaiting_result: bool,
    pub connected: bool,
}

impl Progress {
    /// `true` when a shot fired now would be accepted.
    pub fn can_fire(&self) -> bool {
        self.connected && !self.awaiting_result && self.status.is_my_turn()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Text for the local player, usually from the peer.
    Notice(String),
    /// The protocol loop has stopped. Always the last event.
    Closed,
}

/// Consistent copy of the session state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub status: StatusPair,
    pub confirmation: Confirmation,
    pub pending_shot: Option<Coordinate>,
    pub own: Board,
    pub enemy: Board,
}

pub(crate) struct Shared {
    machine: Mutex<PeerMachine>,
    writer: Mutex<FrameWriter<BoxedWriter>>,
    progress: watch::Sender<Progress>,
    events: mpsc::UnboundedSender<SessionEvent>,
    shutdown: Notify,
    decision_grace: Duration,
}

impl Shared {
    /// Write one burst. Callers hold the machine lock.
    async fn send(&self, msgs: &[Message]) -> Result<(), ProtocolError> {
        if msgs.is_empty() {
            return Ok(());
        }
        debug!("sending {:?}", msgs);
        self.writer.lock().await.send_all(msgs).await
    }

    fn publish(&self, machine: &PeerMachine) {
        let status = machine.status();
        let awaiting_result = machine.pending_shot().is_some();
        self.progress.send_modify(|p| {
            p.status = status;
            p.awaiting_result = awaiting_result;
        });
    }
}

pub struct Session;

impl Session {
    /// Open `transport` and start a session over it.
    pub async fn open(
        transport: Box<dyn Transport>,
        config: SessionConfig,
    ) -> anyhow::Result<SessionHandle> {
        let role = transport.role();
        let (reader, writer) = transport.open().await?;
        Ok(Self::start(reader, writer, role, config).await?)
    }

    /// Exchange names over an open stream and spawn the protocol loop.
    pub async fn start(
        reader: BoxedReader,
        writer: BoxedWriter,
        role: Role,
        config: SessionConfig,
    ) -> Result<SessionHandle, ProtocolError> {
        let mut reader = FrameReader::with_timeout(reader, config.read_timeout);
        let mut writer = FrameWriter::new(writer);

        let peer_name =
            match handshake::exchange_names(&mut reader, &mut writer, &config.self_name).await {
                Ok(name) => name,
                Err(e) => {
                    let _ = writer.shutdown().await;
                    return Err(e);
                }
            };

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let machine = PeerMachine::new(role, rng);
        let coin = machine.coin();
        let (progress_tx, progress_rx) = watch::channel(Progress {
            status: machine.status(),
            awaiting_result: false,
            connected: true,
        });
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            machine: Mutex::new(machine),
            writer: Mutex::new(writer),
            progress: progress_tx,
            events: events_tx,
            shutdown: Notify::new(),
            decision_grace: config.decision_grace,
        });
        let task = tokio::spawn(protocol_loop::run(Arc::clone(&shared), reader));

        Ok(SessionHandle {
            shared,
            self_name: config.self_name,
            peer_name,
            coin,
            events: events_rx,
            progress: progress_rx,
            task: Some(task),
        })
    }
}

pub struct SessionHandle {
    shared: Arc<Shared>,
    self_name: String,
    peer_name: String,
    coin: bool,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    progress: watch::Receiver<Progress>,
    task: Option<JoinHandle<Result<(), ProtocolError>>>,
}

impl SessionHandle {
    /// Shoot at the peer's board. Fails with `IllegalTurn`, sending nothing,
    /// unless it is this side's turn and no earlier shot is unanswered.
    pub async fn fire(&self, at: Coordinate) -> Result<(), ProtocolError> {
        self.act(|machine| machine.fire(at)).await
    }

    /// Place a ship on the own board. The last ship of the fleet confirms it.
    pub async fn place_ship(&self, ship: Ship) -> Result<(), ProtocolError> {
        self.act(|machine| machine.place_ship(ship)).await
    }

    async fn act<F>(&self, action: F) -> Result<(), ProtocolError>
    where
        F: FnOnce(&mut PeerMachine) -> Result<Vec<Message>, ProtocolError>,
    {
        if !self.progress.borrow().connected {
            return Err(ProtocolError::TransportClosed);
        }
        let mut machine = self.shared.machine.lock().await;
        let out = action(&mut *machine)?;
        if let Err(e) = self.shared.send(&out).await {
            // the stream is gone; let the loop tear the session down
            self.shared.shutdown.notify_one();
            return Err(e);
        }
        self.shared.publish(&machine);
        Ok(())
    }

    pub fn status(&self) -> StatusPair {
        self.progress.borrow().status
    }

    pub fn progress(&self) -> Progress {
        *self.progress.borrow()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let machine = self.shared.machine.lock().await;
        Snapshot {
            status: machine.status(),
            confirmation: machine.confirmation(),
            pending_shot: machine.pending_shot(),
            own: machine.board().clone(),
            enemy: machine.enemy_view().clone(),
        }
    }

    /// Receiver that sees every published change of [`Progress`].
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Wait for the next event. Nothing arrives after [`SessionEvent::Closed`].
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Event already queued, if any.
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.events.try_recv().ok()
    }

    pub fn self_name(&self) -> &str {
        &self.self_name
    }

    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    /// Random value drawn at session start. Nothing depends on it.
    pub fn coin(&self) -> bool {
        self.coin
    }

    /// Stop the protocol loop and close the stream.
    pub fn close(&self) {
        self.shared.shutdown.notify_one();
    }

    /// Wait for the protocol loop to stop. A stream closed by either side is a
    /// normal end; a malformed frame is returned as an error.
    pub async fn wait_closed(&mut self) -> Result<(), ProtocolError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        match task.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("protocol loop panicked: {}", e);
                Err(ProtocolError::TransportClosed)
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shared.shutdown.notify_one();
    }
}
