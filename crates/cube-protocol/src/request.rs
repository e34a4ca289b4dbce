//! Building engine invocations.

use cube_core::{Board, Side, Weights};

/// Flag used to probe that the engine binary starts at all.
pub const HELP_FLAG: &str = "--help";

/// A known-good weight vector used when sanity checking an engine.
pub const VALIDATION_WEIGHTS: [i32; 25] = [
    0, -2, -4, -8, -16, 2, 0, 0, 0, 0, 4, 0, 1, 0, 0, 8, 0, 0, 0, 0, 16, 0, 0, 0, 0,
];

/// A single move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub side: Side,
    pub board: Board,
    pub weights: Weights,
}

impl MoveRequest {
    pub fn new(side: Side, board: Board, weights: Weights) -> Self {
        Self {
            side,
            board,
            weights,
        }
    }

    /// Arguments passed to the engine, in order.
    ///
    /// The weights travel as a single space-separated argument.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-t".to_string(),
            self.side.engine_token().to_string(),
            self.board.to_string(),
            "-w".to_string(),
            self.weights.to_command_string(),
            "-q".to_string(),
        ]
    }
}
