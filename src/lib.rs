//! UCT-Rust: a game-agnostic Monte Carlo Tree Search engine.
//!
//! The engine searches any two-player, zero-sum, alternating-move game with
//! perfect information that implements [`game::GameState`], using UCB1 for
//! tree descent and uniformly random rollouts for evaluation.
//!
//! ## Modules
//!
//! - [`constants`] - Default budgets and limits
//! - [`game`] - The game contract the search consumes
//! - [`board`] - Tic-tac-toe on an NxN board
//! - [`tree`] - Arena-backed search tree and UCB1
//! - [`playout`] - Random rollouts
//! - [`mcts`] - The UCT search loop
//! - [`selfplay`] - Self-play games and parallel batches
//! - [`console`] - Text command loop for playing against the engine
//!
//! ## Example
//!
//! ```
//! use uct_rust::board::TicTacToe;
//! use uct_rust::game::GameState;
//! use uct_rust::mcts::uct_search;
//!
//! let mut state = TicTacToe::new();
//! state.apply_move(4).unwrap();
//!
//! let mut rng = fastrand::Rng::with_seed(42);
//! let best = uct_search(&state, 500, &mut rng).unwrap();
//! assert!(state.legal_moves().contains(&best));
//! ```

pub mod board;
pub mod console;
pub mod constants;
pub mod game;
pub mod mcts;
pub mod playout;
pub mod selfplay;
pub mod tree;
