use std::sync::Arc;

use log::{error, info, warn};
use tokio::time::sleep;

use super::{SessionEvent, Shared};
use crate::machine::{Confirmation, Role};
use crate::protocol::stream::FrameReader;
use crate::protocol::ProtocolError;
use crate::transport::BoxedReader;

/// Read frames one at a time and apply them in arrival order until the
/// stream ends, a frame is malformed or the session is closed locally.
///
/// A closed stream is the normal end of a session and is reported as `Ok`.
pub(crate) async fn run(
    shared: Arc<Shared>,
    mut reader: FrameReader<BoxedReader>,
) -> Result<(), ProtocolError> {
    let result = pump(&shared, &mut reader).await;
    match &result {
        Ok(()) => info!("session closed locally"),
        Err(ProtocolError::TransportClosed) => info!("connection ended"),
        Err(ProtocolError::MalformedFrame(reason)) => warn!("malformed frame, closing: {}", reason),
        Err(e) => error!("session failed: {}", e),
    }

    shared.progress.send_modify(|p| p.connected = false);
    if let Err(e) = shared.writer.lock().await.shutdown().await {
        log::debug!("shutdown after close: {}", e);
    }
    let _ = shared.events.send(SessionEvent::Closed);

    match result {
        Err(ProtocolError::TransportClosed) => Ok(()),
        other => other,
    }
}

async fn pump(shared: &Arc<Shared>, reader: &mut FrameReader<BoxedReader>) -> Result<(), ProtocolError> {
    let mut grace_armed = false;
    loop {
        let msg = tokio::select! {
            msg = reader.read_message() => msg?,
            _ = shared.shutdown.notified() => return Ok(()),
        };

        let mut machine = shared.machine.lock().await;
        let reaction = machine.handle(msg);
        shared.send(&reaction.outbound).await?;
        shared.publish(&machine);
        let undecided = machine.role() == Role::Host
            && machine.confirmation() == Confirmation::AwaitingDecision;
        drop(machine);

        if let Some(text) = reaction.notice {
            let _ = shared.events.send(SessionEvent::Notice(text));
        }
        if undecided && !grace_armed {
            grace_armed = true;
            tokio::spawn(decide_after_grace(Arc::clone(shared)));
        }
    }
}

/// Both fleets were confirmed at once, so neither side saw the other's
/// confirmation first. Give the peer the grace period, then decide.
async fn decide_after_grace(shared: Arc<Shared>) {
    sleep(shared.decision_grace).await;
    let mut machine = shared.machine.lock().await;
    let out = machine.toss_if_undecided();
    if out.is_empty() {
        return;
    }
    if let Err(e) = shared.send(&out).await {
        warn!("could not send turn decision: {}", e);
        shared.shutdown.notify_one();
        return;
    }
    shared.publish(&machine);
}
