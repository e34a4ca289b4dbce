//! Parsing and checking engine replies.

use cube_core::{Board, Cell, Side, BOARD_CELLS};

use crate::ProtocolError;

const GAME_OVER_TOKEN: &str = "game_over";

/// A parsed engine reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReply {
    /// 1-based cell index of the move the engine made.
    pub move_number: usize,
    /// Board after the move.
    pub board: Board,
    /// Whether the engine reported that the game is over.
    pub game_over: bool,
}

impl MoveReply {
    /// Parses the engine's stdout.
    ///
    /// Accepts `"<n> <board>"` and `"<n> game_over\n<board>"`. The move number
    /// must address a cell on the board.
    pub fn parse(output: &str) -> Result<Self, ProtocolError> {
        let output = output.trim();
        if output.is_empty() {
            return Err(ProtocolError::EmptyOutput);
        }

        let lines: Vec<&str> = output.lines().collect();
        let first_line = lines[0];
        let tokens: Vec<&str> = first_line.split_whitespace().collect();
        let Some(first_token) = tokens.first() else {
            return Err(ProtocolError::MissingMoveNumber(output.to_string()));
        };

        let move_number: i64 = first_token
            .parse()
            .map_err(|_| ProtocolError::InvalidMoveNumber(first_token.to_string()))?;

        let game_over = tokens.contains(&GAME_OVER_TOKEN);
        let board_text = if game_over && lines.len() >= 2 {
            lines[1].trim()
        } else if !game_over && tokens.len() >= 2 {
            first_line
                .trim_start()
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default()
        } else {
            return Err(ProtocolError::MissingBoard(output.to_string()));
        };

        let board: Board = board_text.parse()?;

        if move_number < 1 || move_number > BOARD_CELLS as i64 {
            return Err(ProtocolError::MoveOutOfRange(move_number));
        }

        Ok(Self {
            move_number: move_number as usize,
            board,
            game_over,
        })
    }

    /// 0-based index of the cell the move targeted.
    #[inline]
    pub fn cell_index(&self) -> usize {
        self.move_number - 1
    }

    /// Checks that the targeted cell now holds a mark.
    pub fn verify_placed(&self) -> Result<(), ProtocolError> {
        match self.board.cell(self.cell_index()) {
            Some(Cell::Marked(_)) => Ok(()),
            _ => Err(ProtocolError::MoveNotApplied {
                move_number: self.move_number,
                found: Cell::Empty.to_char(),
            }),
        }
    }

    /// Checks that the targeted cell went from empty on `prior` to the
    /// mover's mark on the returned board.
    pub fn verify_applied(&self, prior: &Board, side: Side) -> Result<(), ProtocolError> {
        let index = self.cell_index();
        if prior.cell(index) != Some(Cell::Empty) {
            return Err(ProtocolError::CellAlreadyOccupied {
                move_number: self.move_number,
            });
        }
        match self.board.cell(index) {
            Some(Cell::Marked(mark)) if mark == side.mark() => Ok(()),
            other => Err(ProtocolError::MoveNotApplied {
                move_number: self.move_number,
                found: other.unwrap_or_default().to_char(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_core::{BoardError, Mark};

    fn board_str(prefix: &str) -> String {
        format!("{:.<64}", prefix)
    }

    #[test]
    fn parse_normal_reply() {
        let out = format!("1 {}\n", board_str("X"));
        let reply = MoveReply::parse(&out).unwrap();
        assert_eq!(reply.move_number, 1);
        assert_eq!(reply.cell_index(), 0);
        assert!(!reply.game_over);
        assert_eq!(reply.board.count(Mark::X), 1);
    }

    #[test]
    fn parse_game_over_reply() {
        let out = format!("3 game_over\n{}\n", board_str("XOX"));
        let reply = MoveReply::parse(&out).unwrap();
        assert_eq!(reply.move_number, 3);
        assert!(reply.game_over);
        assert_eq!(reply.board.mark_total(), 3);
    }

    #[test]
    fn empty_output_rejected() {
        assert_eq!(MoveReply::parse("  \n"), Err(ProtocolError::EmptyOutput));
    }

    #[test]
    fn non_numeric_move_rejected() {
        assert_eq!(
            MoveReply::parse("not_a_number somegarbage"),
            Err(ProtocolError::InvalidMoveNumber("not_a_number".to_string()))
        );
    }

    #[test]
    fn missing_board_rejected() {
        assert!(matches!(
            MoveReply::parse("12"),
            Err(ProtocolError::MissingBoard(_))
        ));
        assert!(matches!(
            MoveReply::parse("12 game_over"),
            Err(ProtocolError::MissingBoard(_))
        ));
    }

    #[test]
    fn short_board_rejected() {
        assert_eq!(
            MoveReply::parse("1 XO.."),
            Err(ProtocolError::Board(BoardError::InvalidLength(4)))
        );
    }

    #[test]
    fn foreign_characters_rejected() {
        let out = format!("1 {}", board_str("Xz"));
        assert!(matches!(
            MoveReply::parse(&out),
            Err(ProtocolError::Board(BoardError::InvalidCell { index: 1, .. }))
        ));
    }

    #[test]
    fn out_of_range_move_rejected() {
        let out = format!("65 {}", board_str("X"));
        assert_eq!(
            MoveReply::parse(&out),
            Err(ProtocolError::MoveOutOfRange(65))
        );
        let out = format!("0 {}", board_str("X"));
        assert_eq!(MoveReply::parse(&out), Err(ProtocolError::MoveOutOfRange(0)));
    }

    #[test]
    fn verify_applied_accepts_fresh_mark() {
        let prior: Board = board_str("X").parse().unwrap();
        let reply = MoveReply::parse(&format!("5 {}", board_str("X...O"))).unwrap();
        assert_eq!(reply.verify_applied(&prior, Side::Second), Ok(()));
    }

    #[test]
    fn verify_applied_rejects_occupied_cell() {
        // Cell 4 already held X before the move.
        let prior: Board = board_str("O...X").parse().unwrap();
        let reply = MoveReply::parse(&format!("5 {}", board_str("OX..X"))).unwrap();
        assert_eq!(
            reply.verify_applied(&prior, Side::Second),
            Err(ProtocolError::CellAlreadyOccupied { move_number: 5 })
        );
    }

    #[test]
    fn verify_applied_rejects_empty_cell() {
        let prior = Board::empty();
        let reply = MoveReply::parse(&format!("5 {}", board_str("X"))).unwrap();
        assert_eq!(
            reply.verify_applied(&prior, Side::First),
            Err(ProtocolError::MoveNotApplied {
                move_number: 5,
                found: '.'
            })
        );
        assert!(reply.verify_placed().is_err());
    }

    #[test]
    fn verify_applied_rejects_wrong_mark() {
        let prior = Board::empty();
        let reply = MoveReply::parse(&format!("1 {}", board_str("O"))).unwrap();
        assert_eq!(
            reply.verify_applied(&prior, Side::First),
            Err(ProtocolError::MoveNotApplied {
                move_number: 1,
                found: 'O'
            })
        );
        assert_eq!(reply.verify_placed(), Ok(()));
    }
}
