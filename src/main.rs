//! UCT-Rust: a minimal UCT game engine.
//!
//! ## Usage
//!
//! - `uct-rust` - Play a demo game
//! - `uct-rust selfplay` - Play a batch of engine-vs-engine games
//! - `uct-rust play` - Play against the engine on the console

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use uct_rust::board::TicTacToe;
use uct_rust::console::ConsoleEngine;
use uct_rust::constants::{
    CONSOLE_ITERATIONS, DEFAULT_BOARD_SIZE, DEMO_ITERATIONS, N_GAMES, P1_ITERATIONS,
    P2_ITERATIONS,
};
use uct_rust::selfplay::{Agent, MatchConfig, play_game, run_batch};

/// UCT-Rust: a minimal UCT game engine
#[derive(Parser)]
#[command(name = "uct-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level filter, overridden by RUST_LOG
    #[arg(long, global = true, env = "UCT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a batch of games between two agents and print the tally
    Selfplay {
        /// Number of games to play
        #[arg(long, env = "UCT_GAMES", default_value_t = N_GAMES)]
        games: usize,

        /// Player one: UCT iterations per move, or "random"
        #[arg(long, env = "UCT_P1", default_value_t = Agent::uct(P1_ITERATIONS))]
        p1: Agent,

        /// Player two: UCT iterations per move, or "random"
        #[arg(long, env = "UCT_P2", default_value_t = Agent::uct(P2_ITERATIONS))]
        p2: Agent,

        /// Board size (NxN, N in a row wins)
        #[arg(long, env = "UCT_BOARD_SIZE", default_value_t = DEFAULT_BOARD_SIZE)]
        board_size: usize,

        /// Base random seed; game i uses seed + i
        #[arg(long, env = "UCT_SEED")]
        seed: Option<u64>,

        /// Worker threads (0 = one per core)
        #[arg(long, env = "UCT_THREADS", default_value_t = 0)]
        threads: usize,

        /// Print every board and search tree
        #[arg(short, long)]
        verbose: bool,
    },
    /// Play against the engine on the console
    Play {
        /// UCT iterations per engine move
        #[arg(long, env = "UCT_ITERATIONS", default_value_t = CONSOLE_ITERATIONS)]
        iterations: u32,

        /// Board size (NxN, N in a row wins)
        #[arg(long, env = "UCT_BOARD_SIZE", default_value_t = DEFAULT_BOARD_SIZE)]
        board_size: usize,

        /// Random seed for the engine
        #[arg(long, env = "UCT_SEED")]
        seed: Option<u64>,
    },
    /// Play one verbose demo game
    Demo,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level).context("invalid log level")?;

    match cli.command {
        Some(Commands::Selfplay {
            games,
            p1,
            p2,
            board_size,
            seed,
            threads,
            verbose,
        }) => {
            let config = MatchConfig {
                board_size,
                player_one: p1,
                player_two: p2,
                verbose,
            };
            config.validate()?;

            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("failed to start worker pool")?;

            let seed = seed.unwrap_or_else(|| fastrand::u64(..));
            let summary = run_batch(&config, games, seed)?;
            println!("{summary}");
        }
        Some(Commands::Play {
            iterations,
            board_size,
            seed,
        }) => {
            anyhow::ensure!(iterations > 0, "iterations must be positive");
            let state = TicTacToe::with_size(board_size)?;
            let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            info!(iterations, board_size, "console engine ready");
            ConsoleEngine::with_settings(state, iterations, rng).run()?;
        }
        Some(Commands::Demo) | None => run_demo()?,
    }

    Ok(())
}

fn run_demo() -> Result<()> {
    println!("UCT-Rust: Minimal UCT Game Engine\n");

    let config = MatchConfig {
        player_one: Agent::uct(DEMO_ITERATIONS),
        player_two: Agent::uct(DEMO_ITERATIONS),
        verbose: true,
        ..MatchConfig::default()
    };
    let mut rng = fastrand::Rng::new();
    let record = play_game(&config, &mut rng)?;
    let moves: Vec<String> = record.moves.iter().map(ToString::to_string).collect();
    println!("Moves: {}", moves.join(" "));
    Ok(())
}
