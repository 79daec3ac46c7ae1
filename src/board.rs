//! Tic-tac-toe on an NxN board.
//!
//! A line (row, column or either diagonal) of N equal marks wins. This is the
//! sample [`GameState`] collaborator used by the drivers and tests; the
//! search itself knows nothing about it.

use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::game::{DRAW, GameError, GameState, LOSS, Player, WIN};

/// A cell index, `row * size + col`.
pub type Cell = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicTacToe {
    size: usize,
    cells: Vec<Option<Player>>,
    player_just_moved: Player,
    winner: Option<Player>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    /// An empty 3x3 board with player one to move.
    pub fn new() -> Self {
        Self::empty(DEFAULT_BOARD_SIZE)
    }

    /// An empty board of the given size. Fails for unsupported sizes.
    pub fn with_size(size: usize) -> Result<Self, GameError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(GameError::InvalidBoard(format!(
                "size {size} outside {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}"
            )));
        }
        Ok(Self::empty(size))
    }

    fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            // Player one moves first.
            player_just_moved: Player::Two,
            winner: None,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Mark at `(row, col)`, or `None` for an empty or off-board cell.
    pub fn get(&self, row: usize, col: usize) -> Option<Player> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells[self.idx(row, col)]
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// The player owning a complete line, if any.
    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of marks on the board.
    pub fn move_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Parse a human cell name: a plain index (`4`) or `row,col` (`1,1`).
    pub fn parse_cell(&self, s: &str) -> Option<Cell> {
        let cell = match s.split_once(',') {
            Some((r, c)) => {
                let row: usize = r.trim().parse().ok()?;
                let col: usize = c.trim().parse().ok()?;
                if row >= self.size || col >= self.size {
                    return None;
                }
                self.idx(row, col)
            }
            None => s.trim().parse().ok()?,
        };
        (cell < self.cells.len()).then_some(cell)
    }

    /// Check every line through `cell` for a completed run of `player`.
    fn completes_line(&self, cell: Cell, player: Player) -> bool {
        let n = self.size;
        let (row, col) = (cell / n, cell % n);
        let owned = |r: usize, c: usize| self.cells[self.idx(r, c)] == Some(player);

        (0..n).all(|c| owned(row, c))
            || (0..n).all(|r| owned(r, col))
            || (row == col && (0..n).all(|i| owned(i, i)))
            || (row + col == n - 1 && (0..n).all(|i| owned(i, n - 1 - i)))
    }

    /// Scan the whole board for a winner. Used after parsing a position.
    fn find_winner(&self) -> Result<Option<Player>, GameError> {
        let mut found = None;
        for (cell, mark) in self.cells.iter().enumerate() {
            let Some(player) = *mark else { continue };
            if self.completes_line(cell, player) {
                match found {
                    Some(other) if other != player => {
                        return Err(GameError::InvalidBoard(
                            "both players have a complete line".to_string(),
                        ));
                    }
                    _ => found = Some(player),
                }
            }
        }
        Ok(found)
    }
}

impl GameState for TicTacToe {
    type Move = Cell;

    fn legal_moves(&self) -> Vec<Cell> {
        if self.winner.is_some() {
            return Vec::new();
        }
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn apply_move(&mut self, mv: Cell) -> Result<(), GameError> {
        let illegal = |reason| GameError::IllegalMove {
            mv: mv.to_string(),
            reason,
        };
        if self.winner.is_some() {
            return Err(illegal("game already decided"));
        }
        if mv >= self.cells.len() {
            return Err(illegal("cell off the board"));
        }
        if self.cells[mv].is_some() {
            return Err(illegal("cell occupied"));
        }

        let player = self.player_just_moved.opponent();
        self.cells[mv] = Some(player);
        self.player_just_moved = player;
        if self.completes_line(mv, player) {
            self.winner = Some(player);
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.is_full()
    }

    fn result(&self, player: Player) -> f64 {
        match self.winner {
            Some(w) if w == player => WIN,
            Some(_) => LOSS,
            None => DRAW,
        }
    }

    #[inline]
    fn last_mover(&self) -> Player {
        self.player_just_moved
    }
}

/// Parses rows of `X`, `O` and `.` separated by `/` or newlines.
///
/// The side to move is inferred from the mark counts: equal counts mean
/// player one (`X`) moves next, one extra `X` means player two does.
impl FromStr for TicTacToe {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .split(['/', '\n'])
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect();

        let mut board = TicTacToe::with_size(rows.len())?;
        for (r, row) in rows.iter().enumerate() {
            let marks: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
            if marks.len() != board.size {
                return Err(GameError::InvalidBoard(format!(
                    "row {r} has {} cells, expected {}",
                    marks.len(),
                    board.size
                )));
            }
            for (c, mark) in marks.into_iter().enumerate() {
                let idx = board.idx(r, c);
                board.cells[idx] = match mark.to_ascii_uppercase() {
                    'X' => Some(Player::One),
                    'O' => Some(Player::Two),
                    '.' | '-' => None,
                    other => {
                        return Err(GameError::InvalidBoard(format!(
                            "unexpected mark '{other}'"
                        )));
                    }
                };
            }
        }

        let xs = board.cells.iter().filter(|c| **c == Some(Player::One)).count();
        let os = board.cells.iter().filter(|c| **c == Some(Player::Two)).count();
        board.player_just_moved = match xs.checked_sub(os) {
            Some(0) => Player::Two,
            Some(1) => Player::One,
            _ => {
                return Err(GameError::InvalidBoard(format!(
                    "{xs} X marks and {os} O marks cannot arise from alternating play"
                )));
            }
        };
        board.winner = board.find_winner()?;
        if let Some(winner) = board.winner.filter(|&w| w != board.player_just_moved) {
            return Err(GameError::InvalidBoard(format!(
                "player {winner} has a line but player {} moved last",
                board.player_just_moved
            )));
        }
        Ok(board)
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = self.get(row, col).map_or('.', Player::mark);
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
