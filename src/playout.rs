//! Random playouts (rollouts).
//!
//! A playout plays uniformly random legal moves until the game is decided or
//! no legal moves remain. It does no tree bookkeeping; the caller scores the
//! final position.

use crate::game::{GameError, GameState};

/// Play random legal moves on `state` until play stops.
///
/// Returns the number of moves played. Terminates because every move is drawn
/// from the current legal set and a finite game runs out of moves.
pub fn rollout<G: GameState>(state: &mut G, rng: &mut fastrand::Rng) -> Result<usize, GameError> {
    let mut played = 0;
    while !state.is_terminal() {
        let Some(mv) = choose_random_move(state, rng) else {
            break;
        };
        state.apply_move(mv)?;
        played += 1;
    }
    Ok(played)
}

/// Pick a uniformly random legal move, or `None` if there are none.
pub fn choose_random_move<G: GameState>(state: &G, rng: &mut fastrand::Rng) -> Option<G::Move> {
    let moves = state.legal_moves();
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}
