#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use sea_battle::{
    init_logging, random_placement, render_board, Fleet, GameNode, GameOutcome, PollConfig,
    SessionPhase, StubBackend, STUB_PLAYER_ID,
};

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::{Rng, SeedableRng};
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Generate and print a random fleet placement.
    Place {
        #[arg(long, help = "Fix RNG seed for a reproducible board")]
        seed: Option<u64>,
    },
    /// Play a full simulated game against the built-in stub backend.
    Sim {
        #[arg(long, help = "Fix RNG seed for a reproducible game")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 100)]
        bet: u64,
        #[arg(long, help = "Let the opponent take the first turn")]
        bot_opens: bool,
    },
}

#[cfg(feature = "std")]
fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Place { seed } => {
            let mut rng = seeded_rng(seed);
            let mut fleet = Fleet::new();
            let board = random_placement(&mut rng, &mut fleet);
            println!("{}", render_board(&board, true));
        }
        Commands::Sim {
            seed,
            bet,
            bot_opens,
        } => {
            let mut rng = seeded_rng(seed);
            let mut stub = StubBackend::new(rng.random());
            if bot_opens {
                stub = stub.bot_opens();
            }
            // the stub answers instantly; no need for the production cadence
            let poll = PollConfig {
                matchmaking: Duration::from_millis(30),
                readiness: Duration::from_millis(20),
                battle: Duration::from_millis(30),
            };
            let mut node = GameNode::new(Box::new(stub), STUB_PLAYER_ID).with_poll_config(poll);

            let opponents = node.list_opponents().await?;
            let opponent = opponents
                .first()
                .ok_or_else(|| anyhow::anyhow!("no opponents available"))?;
            println!(
                "Challenging {} (level {}) for {} coins...",
                opponent.name, opponent.level, bet
            );
            let opponent_id = opponent.id.clone();

            let phase = node.play(&mut rng, bet, &opponent_id).await?;

            if let Some(session) = node.session() {
                println!("Your board:");
                println!("{}", render_board(session.my_board(), true));
                println!("Opponent:");
                println!("{}", render_board(session.enemy_view(), false));
            }
            match phase {
                Some(SessionPhase::Finished(GameOutcome::Victory { prize })) => {
                    println!("Victory! Prize: {} coins", prize.unwrap_or(0));
                }
                Some(SessionPhase::Finished(GameOutcome::Defeat)) => {
                    println!("Defeat. The enemy fleet prevails.");
                }
                Some(SessionPhase::Cancelled) => println!("The opponent declined the game."),
                other => println!("Game ended in an unexpected state: {:?}", other),
            }
            let balance = node.balance().await?;
            println!("Balance: {} coins", balance.balance);
        }
    }
    Ok(())
}
