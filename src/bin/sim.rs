use battleship_link::{AiPlayer, GameStatus, InMemoryTransport, PlayerNode, Session, SessionConfig};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

async fn run_side(
    transport: InMemoryTransport,
    name: &str,
    seed: u64,
) -> anyhow::Result<(GameStatus, usize)> {
    let config = SessionConfig::new(name).with_seed(Some(seed));
    let session = Session::open(Box::new(transport), config).await?;
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(1));
    let mut node = PlayerNode::new(Box::new(AiPlayer::new()), session);
    let status = node.run(&mut rng).await?;
    Ok((status, node.shots()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let (t1, t2) = InMemoryTransport::pair();
    let (res1, res2) = tokio::try_join!(
        run_side(t1, "player1", seed1),
        run_side(t2, "player2", seed2)
    )?;

    let winner = match (res1.0, res2.0) {
        (GameStatus::YouWon, GameStatus::YouLose) => Some("player1"),
        (GameStatus::YouLose, GameStatus::YouWon) => Some("player2"),
        _ => None,
    };

    let result = json!({
        "player1": {"status": res1.0, "shots": res1.1},
        "player2": {"status": res2.0, "shots": res2.1},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
