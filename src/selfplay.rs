//! Self-play games and parallel batches.
//!
//! Each game owns its own board, trees and random source, so a batch is just
//! a parallel map over game indices followed by a tally. Game `i` of a batch
//! is seeded with `seed + i`, which makes batch results independent of how
//! rayon schedules the games.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{Cell, TicTacToe};
use crate::constants::{DEFAULT_BOARD_SIZE, P1_ITERATIONS, P2_ITERATIONS, REPORT_PERIOD};
use crate::game::{GameError, GameState, Player};
use crate::mcts::{SearchError, tree_search};
use crate::playout::choose_random_move;
use crate::tree::Tree;

/// Errors that stop a game or a batch.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid match configuration: {0}")]
    InvalidConfig(#[source] GameError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// How a side chooses its moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    /// UCT search with a fixed iteration budget per move.
    Uct { iterations: u32 },
    /// Uniformly random legal moves.
    Random,
}

impl Agent {
    pub const fn uct(iterations: u32) -> Self {
        Agent::Uct { iterations }
    }

    /// Choose a move for the side to move in `state`.
    ///
    /// With `verbose`, UCT agents print their search tree.
    pub fn choose<G: GameState>(
        &self,
        state: &G,
        rng: &mut fastrand::Rng,
        verbose: bool,
    ) -> Result<G::Move, SearchError> {
        match *self {
            Agent::Uct { iterations } => {
                let mut tree = Tree::new(state);
                let mv = tree_search(&mut tree, state, iterations, rng)?;
                if verbose {
                    println!("{}", tree.to_tree_string());
                    println!("{}", tree.children_to_string());
                }
                Ok(mv)
            }
            Agent::Random => choose_random_move(state, rng).ok_or(SearchError::NoLegalMoves),
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Agent::Uct { iterations } => write!(f, "uct({iterations})"),
            Agent::Random => write!(f, "random"),
        }
    }
}

/// Accepts `random`, a positive UCT iteration count, or the `uct(N)` form
/// that `Display` prints.
impl FromStr for Agent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(Agent::Random);
        }
        let count = s
            .strip_prefix("uct(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        match count.trim().parse::<u32>() {
            Ok(0) => Err("iteration count must be positive".to_string()),
            Ok(iterations) => Ok(Agent::Uct { iterations }),
            Err(_) => Err(format!("expected 'random' or an iteration count, got '{s}'")),
        }
    }
}

/// Settings shared by every game of a batch.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub board_size: usize,
    pub player_one: Agent,
    pub player_two: Agent,
    /// Print boards and search trees while playing
    pub verbose: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            player_one: Agent::uct(P1_ITERATIONS),
            player_two: Agent::uct(P2_ITERATIONS),
            verbose: false,
        }
    }
}

impl MatchConfig {
    /// Check the configuration before any game starts.
    pub fn validate(&self) -> Result<(), MatchError> {
        TicTacToe::with_size(self.board_size).map_err(MatchError::InvalidConfig)?;
        Ok(())
    }

    fn agent(&self, player: Player) -> Agent {
        match player {
            Player::One => self.player_one,
            Player::Two => self.player_two,
        }
    }
}

/// A finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub moves: Vec<Cell>,
    pub winner: Option<Player>,
    pub board: TicTacToe,
}

/// Play one game to completion.
pub fn play_game(config: &MatchConfig, rng: &mut fastrand::Rng) -> Result<GameRecord, MatchError> {
    let mut state = TicTacToe::with_size(config.board_size).map_err(MatchError::InvalidConfig)?;
    let mut moves = Vec::new();

    while !state.legal_moves().is_empty() {
        if config.verbose {
            println!("{state}");
        }
        let player = state.to_move();
        let mv = config.agent(player).choose(&state, rng, config.verbose)?;
        if config.verbose {
            println!("Best Move: {mv}\n");
        }
        state.apply_move(mv).map_err(SearchError::from)?;
        moves.push(mv);

        if state.is_terminal() {
            break;
        }
    }

    let winner = state.winner();
    if config.verbose {
        match winner {
            Some(p) => println!("Player {p} wins!"),
            None => println!("Nobody wins!"),
        }
        println!("{state}");
    }
    debug!(moves = moves.len(), winner = ?winner, "game finished");

    Ok(GameRecord {
        moves,
        winner,
        board: state,
    })
}

/// Win counts over a batch of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub games: usize,
    pub decided: usize,
    pub draws: usize,
    pub player_one_wins: usize,
    pub player_two_wins: usize,
}

impl MatchSummary {
    pub fn record(&mut self, winner: Option<Player>) {
        self.games += 1;
        match winner {
            Some(Player::One) => {
                self.decided += 1;
                self.player_one_wins += 1;
            }
            Some(Player::Two) => {
                self.decided += 1;
                self.player_two_wins += 1;
            }
            None => self.draws += 1,
        }
    }

    /// Share of decided games won by `player`, in percent.
    pub fn win_percentage(&self, player: Player) -> f64 {
        if self.decided == 0 {
            return 0.0;
        }
        let wins = match player {
            Player::One => self.player_one_wins,
            Player::Two => self.player_two_wins,
        };
        wins as f64 / self.decided as f64 * 100.0
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Decided games: {} / {}", self.decided, self.games)?;
        writeln!(f, "Draws: {} / {}", self.draws, self.games)?;
        writeln!(f, "Player1 wins: {:.2}%", self.win_percentage(Player::One))?;
        write!(f, "Player2 wins: {:.2}%", self.win_percentage(Player::Two))
    }
}

/// Play `games` independent games in parallel and tally the winners.
pub fn run_batch(config: &MatchConfig, games: usize, seed: u64) -> Result<MatchSummary, MatchError> {
    config.validate()?;
    info!(
        games,
        seed,
        player_one = %config.player_one,
        player_two = %config.player_two,
        board_size = config.board_size,
        "starting self-play batch"
    );

    let finished = AtomicUsize::new(0);
    let play = |game: usize| -> Result<Option<Player>, MatchError> {
        let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(game as u64));
        let record = play_game(config, &mut rng)?;
        let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
        if done % REPORT_PERIOD == 0 || done == games {
            info!(done, games, "self-play progress");
        }
        Ok(record.winner)
    };

    // Verbose games print as they go, so they run one at a time.
    let winners = if config.verbose {
        (0..games).map(&play).collect::<Result<Vec<_>, _>>()?
    } else {
        (0..games).into_par_iter().map(&play).collect::<Result<Vec<_>, _>>()?
    };

    let mut summary = MatchSummary::default();
    for winner in winners {
        summary.record(winner);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(p1: Agent, p2: Agent) -> MatchConfig {
        MatchConfig {
            board_size: 3,
            player_one: p1,
            player_two: p2,
            verbose: false,
        }
    }

    #[test]
    fn test_agent_parse() {
        assert_eq!("random".parse::<Agent>(), Ok(Agent::Random));
        assert_eq!("RANDOM".parse::<Agent>(), Ok(Agent::Random));
        assert_eq!("250".parse::<Agent>(), Ok(Agent::Uct { iterations: 250 }));
        assert!("0".parse::<Agent>().is_err());
        assert!("lots".parse::<Agent>().is_err());
    }

    #[test]
    fn test_agent_display() {
        assert_eq!(Agent::Uct { iterations: 10 }.to_string(), "uct(10)");
        assert_eq!(Agent::Random.to_string(), "random");
    }

    #[test]
    fn test_agent_display_parses_back() {
        for agent in [Agent::uct(P1_ITERATIONS), Agent::uct(P2_ITERATIONS), Agent::Random] {
            assert_eq!(agent.to_string().parse::<Agent>(), Ok(agent));
        }
        assert_eq!("uct( 42 )".parse::<Agent>(), Ok(Agent::uct(42)));
        assert!("uct(0)".parse::<Agent>().is_err());
        assert!("uct(".parse::<Agent>().is_err());
    }

    #[test]
    fn test_validate_board_size() {
        let mut config = MatchConfig::default();
        assert!(config.validate().is_ok());
        config.board_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_play_game_record_is_consistent() {
        let config = quick_config(Agent::Uct { iterations: 50 }, Agent::Random);
        let mut rng = fastrand::Rng::with_seed(11);
        let record = play_game(&config, &mut rng).unwrap();

        assert!(record.board.is_terminal());
        assert_eq!(record.winner, record.board.winner());
        assert_eq!(record.moves.len(), record.board.move_count());

        // Replaying the moves reproduces the final board.
        let mut replay = TicTacToe::new();
        for &mv in &record.moves {
            replay.apply_move(mv).unwrap();
        }
        assert_eq!(replay, record.board);
    }

    #[test]
    fn test_uct_beats_random_player() {
        let config = quick_config(Agent::Uct { iterations: 300 }, Agent::Random);
        let summary = run_batch(&config, 20, 12).unwrap();
        assert!(
            summary.player_one_wins > summary.player_two_wins,
            "{summary}"
        );
    }

    #[test]
    fn test_summary_record_and_display() {
        let mut summary = MatchSummary::default();
        for w in [Some(Player::One), Some(Player::One), Some(Player::Two), None] {
            summary.record(w);
        }
        assert_eq!(summary.games, 4);
        assert_eq!(summary.decided, 3);
        assert_eq!(summary.draws, 1);
        assert!((summary.win_percentage(Player::One) - 66.666).abs() < 0.01);

        let text = summary.to_string();
        assert!(text.contains("Decided games: 3 / 4"));
        assert!(text.contains("Player1 wins: 66.67%"));
        assert!(text.contains("Player2 wins: 33.33%"));
    }

    #[test]
    fn test_summary_without_decided_games() {
        let mut summary = MatchSummary::default();
        summary.record(None);
        assert_eq!(summary.win_percentage(Player::One), 0.0);
        assert!(summary.to_string().contains("Player1 wins: 0.00%"));
    }

    #[test]
    fn test_verbose_batch_matches_parallel_batch() {
        let quiet = quick_config(Agent::Uct { iterations: 10 }, Agent::Random);
        let verbose = MatchConfig {
            verbose: true,
            ..quiet.clone()
        };
        let a = run_batch(&quiet, 3, 5).unwrap();
        let b = run_batch(&verbose, 3, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_is_deterministic_for_seed() {
        let config = quick_config(Agent::Uct { iterations: 20 }, Agent::Random);
        let a = run_batch(&config, 16, 99).unwrap();
        let b = run_batch(&config, 16, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.games, 16);
        assert_eq!(a.decided + a.draws, 16);
    }
}
