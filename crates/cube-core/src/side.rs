//! Mark and side representation.

use serde::{Deserialize, Serialize};

/// A mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Returns the character used for this mark in board strings.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    /// Parses a mark character, returning `None` for anything else.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Mark::X),
            'O' => Some(Mark::O),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// The two seats in a game.
///
/// The first mover plays [`Mark::X`] and is addressed as `h` on the engine
/// command line; the second mover plays [`Mark::O`] and is addressed as `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Returns the mark this side places.
    #[inline]
    pub const fn mark(self) -> Mark {
        match self {
            Side::First => Mark::X,
            Side::Second => Mark::O,
        }
    }

    /// Returns the side token passed to the engine after `-t`.
    #[inline]
    pub const fn engine_token(self) -> &'static str {
        match self {
            Side::First => "h",
            Side::Second => "m",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => write!(f, "First"),
            Side::Second => write!(f, "Second"),
        }
    }
}
