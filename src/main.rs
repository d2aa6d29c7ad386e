use battleship_link::{
    init_logging, ui, AiPlayer, CliPlayer, GameStatus, InMemoryTransport, Player, PlayerNode,
    Session, SessionConfig, TcpTransport, Transport, DEFAULT_PORT,
};

use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
enum Commands {
    /// Two AI players against each other on this machine.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Wait for a peer to connect and play against it.
    Host {
        #[arg(long, default_value_t = format!("0.0.0.0:{}", DEFAULT_PORT))]
        bind: String,
        #[arg(long, default_value = "Host")]
        name: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Connect to a hosted game.
    Join {
        #[arg(long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
        connect: String,
        #[arg(long, default_value = "Guest")]
        name: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 10, help = "Connection attempts, one second apart")]
        retries: u32,
    },
}

fn rng_from(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

fn make_player(kind: &PlayerType) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::new()),
        PlayerType::Ai => Box::new(AiPlayer::new()),
    }
}

async fn play(
    transport: Box<dyn Transport>,
    name: String,
    player: PlayerType,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let config = SessionConfig::new(name).with_seed(seed);
    let session = Session::open(transport, config).await?;
    println!("Welcome {}, you are playing against {}.", session.self_name(), session.peer_name());

    let mut rng = rng_from(seed.map(|s| s.wrapping_add(1)));
    let mut node = PlayerNode::new(make_player(&player), session);
    let status = node.run(&mut rng).await?;

    let snapshot = node.session().snapshot().await;
    println!("{}", ui::render_boards(&snapshot.own, &snapshot.enemy));
    match status {
        GameStatus::YouWon => println!("You won after {} shots.", node.shots()),
        GameStatus::YouLose => println!("You lost."),
        other => println!("Game ended early ({:?}).", other),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed } => {
            println!("Starting local AI vs AI game...");
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let (t1, t2) = InMemoryTransport::pair();
            let one = play(Box::new(t1), "AI 1".into(), PlayerType::Ai, seed);
            let two = play(
                Box::new(t2),
                "AI 2".into(),
                PlayerType::Ai,
                seed.map(|s| s.wrapping_add(100)),
            );
            tokio::try_join!(one, two)?;
        }
        Commands::Host {
            bind,
            name,
            player,
            seed,
        } => {
            let transport = TcpTransport::listen(&bind).await?;
            println!("Waiting for a player to connect on {}...", transport.local_addr()?);
            if let Err(e) = play(Box::new(transport), name, player, seed).await {
                eprintln!("Game ended with an error: {}", e);
            }
        }
        Commands::Join {
            connect,
            name,
            player,
            seed,
            retries,
        } => {
            println!("Connecting to {}...", connect);
            let transport =
                TcpTransport::connect(connect).with_retries(retries, Duration::from_secs(1));
            if let Err(e) = play(Box::new(transport), name, player, seed).await {
                eprintln!("Game ended with an error: {}", e);
            }
        }
    }
    Ok(())
}
