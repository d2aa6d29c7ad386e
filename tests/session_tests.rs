mod common;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use battleship_link::machine::MISS_TEXT;
use battleship_link::protocol::codec::encode_string;
use battleship_link::protocol::stream::{FrameReader, FrameWriter};
use battleship_link::{
    Coordinate, FieldStatus, GameStatus, InMemoryTransport, Message, Progress, ProtocolError,
    Role, Session, SessionConfig, SessionEvent, SessionHandle, StatusPair,
};
use common::{fleet, fleet_cells};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

fn at(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y).unwrap()
}

fn config(name: &str, seed: u64) -> SessionConfig {
    SessionConfig::new(name)
        .with_seed(Some(seed))
        .with_decision_grace(Duration::from_millis(50))
}

async fn wait_until(
    handle: &SessionHandle,
    pred: impl Fn(&Progress) -> bool,
) -> anyhow::Result<Progress> {
    let mut rx = handle.subscribe();
    let progress = timeout(WAIT, rx.wait_for(|p| pred(p))).await??;
    Ok(*progress)
}

/// Wait until both sides hold matching status pairs and no shot is out.
async fn settled(a: &SessionHandle, b: &SessionHandle) -> anyhow::Result<()> {
    timeout(WAIT, async {
        loop {
            let (pa, pb) = (a.progress(), b.progress());
            let decided = pa.status.is_terminal()
                || pa.status.is_my_turn() != pb.status.is_my_turn();
            if pa.status.agrees_with(&pb.status)
                && decided
                && !pa.awaiting_result
                && !pb.awaiting_result
            {
                return;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}

async fn connected_pair() -> anyhow::Result<(SessionHandle, SessionHandle)> {
    let (t1, t2) = InMemoryTransport::pair();
    let (a, b) = tokio::try_join!(
        Session::open(Box::new(t1), config("A", 1)),
        Session::open(Box::new(t2), config("B", 2)),
    )?;
    Ok((a, b))
}

/// Start a session whose peer is driven by hand through the returned stream.
async fn with_raw_peer(role: Role) -> anyhow::Result<(SessionHandle, DuplexStream)> {
    let (local, mut remote) = tokio::io::duplex(64 * 1024);
    let (reader, writer) = tokio::io::split(local);
    let mut name = Vec::new();
    encode_string("peer", &mut name);
    remote.write_all(&name).await?;
    let handle = Session::start(Box::new(reader), Box::new(writer), role, config("me", 7)).await?;
    let mut their_name = [0u8; 4];
    remote.read_exact(&mut their_name).await?;
    assert_eq!(their_name, [0, 2, b'm', b'e']);
    Ok((handle, remote))
}

/// Accepts `budget` bytes, then fails every write.
struct BrokenAfter {
    budget: usize,
}

impl AsyncWrite for BrokenAfter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if buf.len() > self.budget {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken")));
        }
        self.budget -= buf.len();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn names_are_exchanged() -> anyhow::Result<()> {
    let (a, b) = connected_pair().await?;
    assert_eq!(a.self_name(), "A");
    assert_eq!(a.peer_name(), "B");
    assert_eq!(b.peer_name(), "A");
    assert_eq!(a.status(), StatusPair::default());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn full_game_over_memory() -> anyhow::Result<()> {
    let (a, b) = connected_pair().await?;
    for ship in fleet() {
        a.place_ship(ship).await?;
    }
    for ship in fleet() {
        b.place_ship(ship).await?;
    }
    settled(&a, &b).await?;

    let (shooter, defender) = if a.status().is_my_turn() { (&a, &b) } else { (&b, &a) };
    assert_eq!(
        defender.status(),
        StatusPair::new(GameStatus::PlayingEnemyTurn, GameStatus::PlayingYourTurn)
    );

    for cell in fleet_cells() {
        shooter.fire(cell).await?;
        settled(&a, &b).await?;
        assert!(a.status().agrees_with(&b.status()));
    }

    assert_eq!(
        shooter.status(),
        StatusPair::new(GameStatus::YouWon, GameStatus::YouLose)
    );
    assert_eq!(
        defender.status(),
        StatusPair::new(GameStatus::YouLose, GameStatus::YouWon)
    );
    let view = shooter.snapshot().await.enemy;
    assert_eq!(view.count(FieldStatus::ShipShoot), fleet_cells().len());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn peer_notices_arrive_as_events() -> anyhow::Result<()> {
    let (a, mut b) = connected_pair().await?;
    a.place_ship(fleet().remove(0)).await?;
    let event = timeout(WAIT, b.next_event()).await?;
    assert_eq!(
        event,
        Some(SessionEvent::Notice("Your enemy has placed a ship. (1/10)".into()))
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn illegal_turn_sends_nothing() -> anyhow::Result<()> {
    let (handle, mut remote) = with_raw_peer(Role::Host).await?;
    let err = handle.fire(at(0, 0)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::IllegalTurn { .. }));

    let mut buf = [0u8; 16];
    let read = timeout(Duration::from_millis(200), remote.read(&mut buf)).await;
    assert!(read.is_err(), "unexpected bytes after a refused shot");
    assert!(handle.progress().connected);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_frame_closes_the_session() -> anyhow::Result<()> {
    let (mut handle, mut remote) = with_raw_peer(Role::Guest).await?;
    remote.write_all(&[0, 0, 0, 99]).await?;

    let result = timeout(WAIT, handle.wait_closed()).await?;
    assert!(matches!(result, Err(ProtocolError::MalformedFrame(_))));
    assert!(!handle.progress().connected);
    assert_eq!(timeout(WAIT, handle.next_event()).await?, Some(SessionEvent::Closed));

    let mut buf = [0u8; 4];
    assert_eq!(timeout(WAIT, remote.read(&mut buf)).await??, 0);
    assert!(matches!(
        handle.fire(at(0, 0)).await,
        Err(ProtocolError::TransportClosed)
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn peer_hanging_up_is_a_normal_end() -> anyhow::Result<()> {
    let (mut handle, remote) = with_raw_peer(Role::Guest).await?;
    drop(remote);
    timeout(WAIT, handle.wait_closed()).await??;
    assert_eq!(timeout(WAIT, handle.next_event()).await?, Some(SessionEvent::Closed));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn handshake_fails_without_a_peer() -> anyhow::Result<()> {
    let (local, remote) = tokio::io::duplex(1024);
    drop(remote);
    let (reader, writer) = tokio::io::split(local);
    let err = Session::start(Box::new(reader), Box::new(writer), Role::Host, config("me", 1))
        .await
        .err()
        .expect("handshake should fail");
    assert!(matches!(err, ProtocolError::HandshakeFailed(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_shot_is_answered_with_four_frames_in_order() -> anyhow::Result<()> {
    let (handle, remote) = with_raw_peer(Role::Guest).await?;
    let (rx, tx) = tokio::io::split(remote);
    let mut frames = FrameReader::new(rx);
    let mut peer = FrameWriter::new(tx);

    peer.send(&Message::ChangeStatus {
        status: GameStatus::AllShipsSet,
        is_your_status: true,
    })
    .await?;
    wait_until(&handle, |p| p.status.enemy == GameStatus::AllShipsSet).await?;

    for ship in fleet() {
        handle.place_ship(ship).await?;
    }
    for n in 1..=10 {
        let expected = format!("Your enemy has placed a ship. ({}/10)", n);
        assert_eq!(frames.read_message().await?, Message::SendMessage(expected));
    }
    assert_eq!(
        frames.read_message().await?,
        Message::ChangeStatus {
            status: GameStatus::AllShipsSet,
            is_your_status: true
        }
    );
    let Message::BothSetAllShips { i_start } = frames.read_message().await? else {
        panic!("expected the turn decision");
    };

    if i_start {
        // local side shoots first; answer with a miss to hand the turn over
        handle.fire(at(0, 0)).await?;
        assert_eq!(frames.read_message().await?, Message::Fire(at(0, 0)));
        peer.send_all(&[
            Message::ChangeStatus {
                status: GameStatus::PlayingYourTurn,
                is_your_status: true,
            },
            Message::ChangeStatus {
                status: GameStatus::PlayingEnemyTurn,
                is_your_status: false,
            },
            Message::SendResult {
                field: FieldStatus::EmptyNoShoot,
                coordinate: at(0, 0),
            },
            Message::SendMessage(MISS_TEXT.into()),
        ])
        .await?;
        wait_until(&handle, |p| {
            p.status == StatusPair::new(GameStatus::PlayingEnemyTurn, GameStatus::PlayingYourTurn)
                && !p.awaiting_result
        })
        .await?;
    }

    peer.send(&Message::Fire(at(1, 0))).await?;
    let burst = [
        frames.read_message().await?,
        frames.read_message().await?,
        frames.read_message().await?,
        frames.read_message().await?,
    ];
    assert_eq!(
        burst,
        [
            Message::ChangeStatus {
                status: GameStatus::PlayingYourTurn,
                is_your_status: true
            },
            Message::ChangeStatus {
                status: GameStatus::PlayingEnemyTurn,
                is_your_status: false
            },
            Message::SendResult {
                field: FieldStatus::EmptyNoShoot,
                coordinate: at(1, 0)
            },
            Message::SendMessage(MISS_TEXT.into()),
        ]
    );
    assert!(handle.status().is_my_turn());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn close_ends_the_session_on_both_sides() -> anyhow::Result<()> {
    let (mut a, mut b) = connected_pair().await?;
    a.close();
    timeout(WAIT, a.wait_closed()).await??;
    timeout(WAIT, b.wait_closed()).await??;
    assert!(!b.progress().connected);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_write_tears_the_session_down() -> anyhow::Result<()> {
    let (local, mut remote) = tokio::io::duplex(1024);
    let (reader, _unused) = tokio::io::split(local);
    let mut name = Vec::new();
    encode_string("peer", &mut name);
    remote.write_all(&name).await?;

    // room for the handshake ("me") and nothing after it
    let writer = BrokenAfter { budget: 4 };
    let mut handle =
        Session::start(Box::new(reader), Box::new(writer), Role::Host, config("me", 3)).await?;

    let err = handle.place_ship(fleet().remove(0)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TransportClosed));

    timeout(WAIT, handle.wait_closed()).await??;
    assert!(!handle.progress().connected);
    assert_eq!(timeout(WAIT, handle.next_event()).await?, Some(SessionEvent::Closed));
    assert!(matches!(
        handle.fire(at(0, 0)).await,
        Err(ProtocolError::TransportClosed)
    ));
    drop(remote);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn host_decides_when_confirmations_cross() -> anyhow::Result<()> {
    let (handle, remote) = with_raw_peer(Role::Host).await?;
    let (rx, tx) = tokio::io::split(remote);
    let mut frames = FrameReader::new(rx);
    let mut peer = FrameWriter::new(tx);

    // the host confirms first, the guest confirms without having seen it
    for ship in fleet() {
        handle.place_ship(ship).await?;
    }
    for _ in 0..10 {
        assert!(matches!(frames.read_message().await?, Message::SendMessage(_)));
    }
    assert_eq!(
        frames.read_message().await?,
        Message::ChangeStatus {
            status: GameStatus::AllShipsSet,
            is_your_status: true
        }
    );
    peer.send(&Message::ChangeStatus {
        status: GameStatus::AllShipsSet,
        is_your_status: true,
    })
    .await?;

    let decision = timeout(WAIT, frames.read_message()).await??;
    let Message::BothSetAllShips { i_start } = decision else {
        panic!("expected the turn decision, got {:?}", decision);
    };
    let progress = wait_until(&handle, |p| p.status.your != GameStatus::AllShipsSet).await?;
    let expected = if i_start {
        StatusPair::new(GameStatus::PlayingYourTurn, GameStatus::PlayingEnemyTurn)
    } else {
        StatusPair::new(GameStatus::PlayingEnemyTurn, GameStatus::PlayingYourTurn)
    };
    assert_eq!(progress.status, expected);

    // exactly one decision is made
    let extra = timeout(Duration::from_millis(200), frames.read_message()).await;
    assert!(extra.is_err(), "unexpected frame after the decision");
    Ok(())
}
