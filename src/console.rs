//! Line-oriented console for playing against the engine.
//!
//! The protocol borrows the shape of GTP: one command per line, an optional
//! numeric id in front, and responses of the form `=<id> <text>` on success
//! or `?<id> <text>` on failure, each followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the loop
//! - `boardsize <size>` - Start a new game on a `size`x`size` board
//! - `clear_board` - Reset the board to empty
//! - `iterations <n>` - Set the UCT budget used by `genmove`
//! - `play <cell>` - Play a move for the side to move (`4` or `1,1`)
//! - `genmove` - Search and play a move for the side to move
//! - `showboard` - Print the board

use std::io::{self, BufRead, Write};

use tracing::info;

use crate::board::TicTacToe;
use crate::constants::CONSOLE_ITERATIONS;
use crate::game::GameState;
use crate::mcts::uct_search;

/// The list of known console commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "iterations",
    "known_command",
    "list_commands",
    "name",
    "play",
    "quit",
    "showboard",
    "version",
];

/// Console engine state.
pub struct ConsoleEngine {
    /// Current game position
    state: TicTacToe,
    /// UCT iterations per `genmove`
    iterations: u32,
    rng: fastrand::Rng,
}

impl Default for ConsoleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleEngine {
    /// Create a console engine with default settings and an entropy seed.
    pub fn new() -> Self {
        Self::with_settings(TicTacToe::new(), CONSOLE_ITERATIONS, fastrand::Rng::new())
    }

    pub fn with_settings(state: TicTacToe, iterations: u32, rng: fastrand::Rng) -> Self {
        Self {
            state,
            iterations,
            rng,
        }
    }

    /// Current position.
    pub fn state(&self) -> &TicTacToe {
        &self.state
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout)
    }

    /// Run the command loop on arbitrary streams.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(size) = arg.parse::<usize>() else {
                    return (false, "invalid size".to_string());
                };
                match TicTacToe::with_size(size) {
                    Ok(state) => {
                        self.state = state;
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "clear_board" => {
                self.state = TicTacToe::with_size(self.state.size()).unwrap_or_default();
                (true, String::new())
            }

            "iterations" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<u32>() {
                    Ok(n) if n > 0 => {
                        self.iterations = n;
                        (true, String::new())
                    }
                    _ => (false, "iterations must be a positive integer".to_string()),
                }
            }

            "play" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Some(cell) = self.state.parse_cell(arg) else {
                    return (false, format!("invalid cell '{arg}'"));
                };
                match self.state.apply_move(cell) {
                    Ok(()) => (true, self.outcome_suffix()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let player = self.state.to_move();
                match uct_search(&self.state, self.iterations, &mut self.rng) {
                    Ok(cell) => {
                        if let Err(e) = self.state.apply_move(cell) {
                            return (false, e.to_string());
                        }
                        info!(%player, cell, "engine move");
                        (true, format!("{cell}{}", self.outcome_suffix()))
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.state)),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Note appended to move responses once the game is over.
    fn outcome_suffix(&self) -> String {
        if !self.state.is_terminal() {
            return String::new();
        }
        match self.state.winner() {
            Some(p) => format!(" (player {p} wins)"),
            None => " (draw)".to_string(),
        }
    }
}
