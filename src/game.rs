//! The game contract consumed by the search engine.
//!
//! Any two-player, zero-sum, alternating-move game with perfect information
//! can be searched by implementing [`GameState`]. The engine never looks at a
//! board directly: it only enumerates moves, applies them to clones, and asks
//! for results once play has stopped.

use std::fmt;

use thiserror::Error;

/// Identity of one of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    /// Moves first.
    One,
    Two,
}

impl Player {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Board mark used when rendering this player's moves.
    pub fn mark(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "1"),
            Player::Two => write!(f, "2"),
        }
    }
}

/// Errors raised by game implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The move is not in the current legal move set.
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: String, reason: &'static str },

    /// A board description could not be turned into a valid position.
    #[error("invalid board: {0}")]
    InvalidBoard(String),
}

/// Result value for a win, from the requested player's viewpoint.
pub const WIN: f64 = 1.0;
/// Result value for a loss.
pub const LOSS: f64 = 0.0;
/// Result value for a draw or an undecided position.
pub const DRAW: f64 = 0.5;

/// Capabilities the search needs from a game position.
///
/// `Clone` must produce a deep, independent copy: mutating a clone never
/// affects the original.
pub trait GameState: Clone {
    /// A move in this game.
    type Move: Copy + Eq + fmt::Debug + fmt::Display;

    /// Moves available from the current position.
    ///
    /// An empty list means play cannot continue, which is not necessarily a
    /// win (it may be a draw).
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply `mv` in place on behalf of the player to move.
    ///
    /// Fails with [`GameError::IllegalMove`] when `mv` is not currently legal,
    /// leaving the position untouched.
    fn apply_move(&mut self, mv: Self::Move) -> Result<(), GameError>;

    /// True once the game has a decided outcome (win or draw).
    fn is_terminal(&self) -> bool;

    /// Score of a finished game for `player`: 1.0 win, 0.0 loss, 0.5 draw.
    fn result(&self, player: Player) -> f64;

    /// The player who made the most recent move.
    fn last_mover(&self) -> Player;

    /// The player whose turn it is.
    fn to_move(&self) -> Player {
        self.last_mover().opponent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
        assert_eq!(Player::One.opponent().opponent(), Player::One);
    }

    #[test]
    fn test_player_display_and_mark() {
        assert_eq!(Player::One.to_string(), "1");
        assert_eq!(Player::Two.to_string(), "2");
        assert_eq!(Player::One.mark(), 'X');
        assert_eq!(Player::Two.mark(), 'O');
    }

    #[test]
    fn test_illegal_move_message() {
        let err = GameError::IllegalMove {
            mv: "4".to_string(),
            reason: "cell occupied",
        };
        assert_eq!(err.to_string(), "illegal move 4: cell occupied");
    }
}
