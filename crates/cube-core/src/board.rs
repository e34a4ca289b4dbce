//! The 64-cell board and its string representation.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::side::{Mark, Side};

/// Number of cells on a 4x4x4 board.
pub const BOARD_CELLS: usize = 64;

/// Errors that can occur when parsing or inspecting a board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid board length: expected 64, got {0}")]
    InvalidLength(usize),

    #[error("invalid board cell {found:?} at index {index}")]
    InvalidCell { index: usize, found: char },

    #[error("inconsistent board: X={x}, O={o}")]
    InconsistentCounts { x: usize, o: usize },
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Marked(Mark),
}

impl Cell {
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Marked(mark) => mark.to_char(),
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A board position as exchanged with the engine.
///
/// The wire form is exactly 64 characters over `X`, `O` and `.`, with cell
/// `i` addressed by the engine as move number `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Returns a board with every cell empty.
    pub const fn empty() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_CELLS],
        }
    }

    /// Returns the cell at `index`, or `None` if out of range.
    #[inline]
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Places a mark, returning the updated board, or `None` if `index` is
    /// off the board.
    pub fn with_mark(mut self, index: usize, mark: Mark) -> Option<Self> {
        *self.cells.get_mut(index)? = Cell::Marked(mark);
        Some(self)
    }

    /// Counts cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Cell::Marked(mark))
            .count()
    }

    /// Total marks of both kinds.
    pub fn mark_total(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

/// Derives whose turn it is purely from the mark counts.
///
/// `X == O` means the first mover is up, `X == O + 1` means the second mover
/// is up. Any other combination is an inconsistent board.
pub fn turn_of(board: &Board) -> Result<Side, BoardError> {
    let x = board.count(Mark::X);
    let o = board.count(Mark::O);
    if x == o {
        Ok(Side::First)
    } else if x == o + 1 {
        Ok(Side::Second)
    } else {
        Err(BoardError::InconsistentCounts { x, o })
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != BOARD_CELLS {
            return Err(BoardError::InvalidLength(len));
        }

        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (index, c) in s.chars().enumerate() {
            cells[index] = match c {
                '.' => Cell::Empty,
                other => match Mark::from_char(other) {
                    Some(mark) => Cell::Marked(mark),
                    None => return Err(BoardError::InvalidCell { index, found: other }),
                },
            };
        }
        Ok(Self { cells })
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell.to_char())?;
        }
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
