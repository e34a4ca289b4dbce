//! Move protocol spoken by the 4x4x4 tic-tac-toe engine.
//!
//! The engine is a one-shot process: every move is a fresh invocation and the
//! answer is read from stdout.
//!
//! # Invocation
//!
//! - `<engine> -t <h|m> <board> -w "<25 weights>" -q` - Request one move
//! - `<engine> --help` - Sanity probe, exit code 0 or 1
//!
//! # Replies
//!
//! - `<move> <board>` - Normal move
//! - `<move> game_over\n<board>` - Move that ended the game

mod reply;
mod request;

pub use reply::MoveReply;
pub use request::{MoveRequest, HELP_FLAG, VALIDATION_WEIGHTS};

use cube_core::BoardError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("engine returned empty output")]
    EmptyOutput,
    #[error("no move number found in output: {0:?}")]
    MissingMoveNumber(String),
    #[error("invalid move number in output: {0:?}")]
    InvalidMoveNumber(String),
    #[error("could not parse board state from output: {0:?}")]
    MissingBoard(String),
    #[error("move number {0} out of range (1-64)")]
    MoveOutOfRange(i64),
    #[error("invalid board state: {0}")]
    Board(#[from] BoardError),
    #[error("move {move_number} targets a cell that was already occupied")]
    CellAlreadyOccupied { move_number: usize },
    #[error("move {move_number} was not applied to the board (cell holds {found:?})")]
    MoveNotApplied { move_number: usize, found: char },
}
