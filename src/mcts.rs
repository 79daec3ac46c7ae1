//! UCT (Upper Confidence bounds applied to Trees) search.
//!
//! Each iteration works on a fresh clone of the root position and runs four
//! phases:
//! - Select: descend through fully expanded nodes by UCB1
//! - Expand: add one child for a random untried move
//! - Simulate: random rollout to the end of the game
//! - Backpropagate: update visits and wins from the leaf to the root
//!
//! The returned move is the root child with the most visits. A tree is built
//! per decision and discarded afterwards.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace};

use crate::game::{GameError, GameState};
use crate::playout::rollout;
use crate::tree::{NodeId, SelectError, Tree};

/// Errors that can occur during a search.
///
/// None of these are transient: each one is a broken precondition or a
/// broken tree invariant.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no legal moves available at the root position")]
    NoLegalMoves,

    #[error("iteration budget must be positive")]
    ZeroIterations,

    #[error("game rejected a move chosen by the search: {0}")]
    IllegalMove(#[from] GameError),

    #[error("UCB1 met an unvisited node {node} during selection")]
    DegenerateStatistics { node: NodeId },

    #[error("selection reached node {node}, which has no children")]
    SelectedLeaf { node: NodeId },
}

impl From<SelectError> for SearchError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::ZeroVisits(node) => SearchError::DegenerateStatistics { node },
            SelectError::NoChildren(node) => SearchError::SelectedLeaf { node },
        }
    }
}

/// Run a UCT search from `root_state` and return the best move.
///
/// Builds a fresh tree, runs exactly `iterations` playouts, and discards the
/// tree afterwards. The caller's state is only ever cloned.
pub fn uct_search<G: GameState>(
    root_state: &G,
    iterations: u32,
    rng: &mut fastrand::Rng,
) -> Result<G::Move, SearchError> {
    let mut tree = Tree::new(root_state);
    tree_search(&mut tree, root_state, iterations, rng)
}

/// Run `iterations` more playouts on an existing tree rooted at `root_state`.
///
/// Returns the move leading to the most-visited root child. Calling this
/// repeatedly on the same tree continues the search.
pub fn tree_search<G: GameState>(
    tree: &mut Tree<G::Move>,
    root_state: &G,
    iterations: u32,
    rng: &mut fastrand::Rng,
) -> Result<G::Move, SearchError> {
    if iterations == 0 {
        return Err(SearchError::ZeroIterations);
    }
    check_root(tree)?;

    for i in 0..iterations {
        run_iteration(tree, root_state, rng)?;
        trace!(iteration = i, nodes = tree.len(), "UCT iteration complete");
    }

    finish(tree)
}

/// Like [`uct_search`], but also stops once `budget` has elapsed.
///
/// The deadline is only checked between iterations and at least one iteration
/// always runs. Returns the best move and the number of iterations completed.
pub fn uct_search_until<G: GameState>(
    root_state: &G,
    max_iterations: u32,
    budget: Duration,
    rng: &mut fastrand::Rng,
) -> Result<(G::Move, u32), SearchError> {
    if max_iterations == 0 {
        return Err(SearchError::ZeroIterations);
    }
    let mut tree = Tree::new(root_state);
    check_root(&tree)?;

    let deadline = Instant::now() + budget;
    let mut done = 0;
    while done < max_iterations {
        run_iteration(&mut tree, root_state, rng)?;
        done += 1;
        if Instant::now() >= deadline {
            break;
        }
    }

    let mv = finish(&tree)?;
    Ok((mv, done))
}

fn check_root<M: Copy + PartialEq + std::fmt::Display>(tree: &Tree<M>) -> Result<(), SearchError> {
    let root = tree.get(tree.root());
    if root.untried.is_empty() && root.children.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    Ok(())
}

fn finish<M: Copy + PartialEq + std::fmt::Display>(tree: &Tree<M>) -> Result<M, SearchError> {
    let report = tree.report().ok_or(SearchError::NoLegalMoves)?;
    debug!(
        best = %report.best,
        visits = report.best_visits,
        win_rate = report.best_win_rate,
        root_visits = report.root_visits,
        nodes = report.tree_size,
        depth = tree.max_depth(),
        "UCT search finished"
    );
    Ok(report.best)
}

/// One select / expand / simulate / backpropagate pass.
fn run_iteration<G: GameState>(
    tree: &mut Tree<G::Move>,
    root_state: &G,
    rng: &mut fastrand::Rng,
) -> Result<(), SearchError> {
    let mut state = root_state.clone();
    let mut node = tree.root();

    // Select: descend while fully expanded and non-terminal
    loop {
        let n = tree.get(node);
        if !n.untried.is_empty() || n.children.is_empty() {
            break;
        }
        node = tree.select_child(node)?;
        if let Some(mv) = tree.get(node).mv {
            state.apply_move(mv)?;
        }
    }

    // Expand: one random untried move becomes a child
    let untried = &tree.get(node).untried;
    if !untried.is_empty() {
        let mv = untried[rng.usize(..untried.len())];
        state.apply_move(mv)?;
        node = tree.add_child(node, mv, state.legal_moves(), state.last_mover());
    }

    // Simulate
    rollout(&mut state, rng)?;

    // Backpropagate
    tree.backpropagate(node, |player| state.result(player));

    Ok(())
}
