//! Core types for 4x4x4 tic-tac-toe.
//!
//! This crate provides the fundamental types shared by the protocol and arena crates:
//! - [`Mark`] and [`Side`] for player representation
//! - [`Board`] for the 64-cell string representation used on the wire
//! - [`turn_of`] for deriving whose turn it is from the board contents
//! - [`Weights`] for the 25-value heuristic vector handed to the engine

mod board;
mod side;
mod weights;

pub use board::{turn_of, Board, BoardError, Cell, BOARD_CELLS};
pub use side::{Mark, Side};
pub use weights::{Weights, WeightsError, WEIGHT_COUNT, WEIGHT_LIMIT};
