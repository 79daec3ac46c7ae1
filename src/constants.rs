//! Default budgets and limits for the search engine and its drivers.
//!
//! These are compile-time defaults only. The command-line front end can
//! override every one of them at runtime.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN). A line of N equal marks wins.
pub const DEFAULT_BOARD_SIZE: usize = 3;

/// Smallest supported board size.
pub const MIN_BOARD_SIZE: usize = 3;

/// Largest supported board size. Keeps rollouts short enough to be useful.
pub const MAX_BOARD_SIZE: usize = 7;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of UCT iterations for player one in self-play.
pub const P1_ITERATIONS: u32 = 100;

/// Default number of UCT iterations for player two in self-play.
pub const P2_ITERATIONS: u32 = 10_000;

/// Default number of iterations for the console engine's `genmove`.
pub const CONSOLE_ITERATIONS: u32 = 1_000;

/// Iterations per side used by the demo game.
pub const DEMO_ITERATIONS: u32 = 200;

// =============================================================================
// Batch Driver
// =============================================================================

/// Default number of games in a self-play batch.
pub const N_GAMES: usize = 1_000;

/// Progress report period (number of finished games between reports).
pub const REPORT_PERIOD: usize = 100;
