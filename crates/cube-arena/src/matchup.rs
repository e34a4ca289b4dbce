//! Per-pair aggregation of game results.

use serde::Serialize;
use thiserror::Error;

use crate::game_runner::GameResult;

/// Errors that can occur when recording a game into a matchup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchupError {
    #[error("game between {found:?} does not belong to matchup {expected:?}")]
    ForeignGame {
        expected: (String, String),
        found: (String, String),
    },
}

/// Running statistics for every game played between two matrices.
///
/// The pair is unordered for matching purposes; `matrix1` and `matrix2`
/// only fix the order in which the two labels are reported.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupResult {
    matrix1_label: String,
    matrix2_label: String,
    total_games: u32,
    matrix1_wins: u32,
    matrix2_wins: u32,
    ties: u32,
    matrix1_first_games: u32,
    matrix2_first_games: u32,
    matrix1_as_first_wins: u32,
    matrix2_as_first_wins: u32,
    total_duration_secs: f64,
    total_moves: u64,
    #[serde(skip)]
    games: Vec<GameResult>,
}

impl MatchupResult {
    pub fn new(matrix1_label: &str, matrix2_label: &str) -> Self {
        Self {
            matrix1_label: matrix1_label.to_string(),
            matrix2_label: matrix2_label.to_string(),
            total_games: 0,
            matrix1_wins: 0,
            matrix2_wins: 0,
            ties: 0,
            matrix1_first_games: 0,
            matrix2_first_games: 0,
            matrix1_as_first_wins: 0,
            matrix2_as_first_wins: 0,
            total_duration_secs: 0.0,
            total_moves: 0,
            games: Vec::new(),
        }
    }

    /// Records a finished game.
    ///
    /// Which matrix moved first is read from the game itself.
    ///
    /// # Errors
    ///
    /// Returns [`MatchupError::ForeignGame`] if the game was not played
    /// between this matchup's two matrices.
    pub fn record(&mut self, game: GameResult) -> Result<(), MatchupError> {
        let first = game.player1_label();
        let second = game.player2_label();
        let matrix1_first = first == self.matrix1_label && second == self.matrix2_label;
        let matrix2_first = first == self.matrix2_label && second == self.matrix1_label;
        if !matrix1_first && !matrix2_first {
            return Err(MatchupError::ForeignGame {
                expected: (self.matrix1_label.clone(), self.matrix2_label.clone()),
                found: (first.to_string(), second.to_string()),
            });
        }

        self.total_games += 1;
        self.total_duration_secs += game.duration_secs();
        self.total_moves += u64::from(game.move_count());
        if matrix1_first {
            self.matrix1_first_games += 1;
        } else {
            self.matrix2_first_games += 1;
        }

        match game.winner_label() {
            None => self.ties += 1,
            Some(label) if label == self.matrix1_label => {
                self.matrix1_wins += 1;
                if matrix1_first {
                    self.matrix1_as_first_wins += 1;
                }
            }
            Some(_) => {
                self.matrix2_wins += 1;
                if matrix2_first {
                    self.matrix2_as_first_wins += 1;
                }
            }
        }

        self.games.push(game);
        Ok(())
    }

    pub fn matrix1_label(&self) -> &str {
        &self.matrix1_label
    }

    pub fn matrix2_label(&self) -> &str {
        &self.matrix2_label
    }

    /// `"<matrix1> vs <matrix2>"`.
    pub fn label(&self) -> String {
        format!("{} vs {}", self.matrix1_label, self.matrix2_label)
    }

    /// Whether `label` is one of the two matrices.
    pub fn involves(&self, label: &str) -> bool {
        self.matrix1_label == label || self.matrix2_label == label
    }

    pub fn total_games(&self) -> u32 {
        self.total_games
    }

    pub fn matrix1_wins(&self) -> u32 {
        self.matrix1_wins
    }

    pub fn matrix2_wins(&self) -> u32 {
        self.matrix2_wins
    }

    pub fn ties(&self) -> u32 {
        self.ties
    }

    pub fn matrix1_as_first_wins(&self) -> u32 {
        self.matrix1_as_first_wins
    }

    pub fn matrix2_as_first_wins(&self) -> u32 {
        self.matrix2_as_first_wins
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_duration_secs
    }

    pub fn total_moves(&self) -> u64 {
        self.total_moves
    }

    /// Wins, losses and ties for `label`, or `None` if it is not in this matchup.
    pub fn record_for(&self, label: &str) -> Option<(u32, u32, u32)> {
        if label == self.matrix1_label {
            Some((self.matrix1_wins, self.matrix2_wins, self.ties))
        } else if label == self.matrix2_label {
            Some((self.matrix2_wins, self.matrix1_wins, self.ties))
        } else {
            None
        }
    }

    pub fn matrix1_win_rate(&self) -> f64 {
        ratio(self.matrix1_wins, self.total_games)
    }

    pub fn matrix2_win_rate(&self) -> f64 {
        ratio(self.matrix2_wins, self.total_games)
    }

    pub fn tie_rate(&self) -> f64 {
        ratio(self.ties, self.total_games)
    }

    pub fn average_duration_secs(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.total_duration_secs / f64::from(self.total_games)
    }

    pub fn average_move_count(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.total_moves as f64 / f64::from(self.total_games)
    }

    /// Mean of both matrices' win rates when moving first, minus one half.
    ///
    /// Positive values mean moving first helps. Zero if either matrix never
    /// moved first.
    pub fn first_player_advantage(&self) -> f64 {
        if self.matrix1_first_games == 0 || self.matrix2_first_games == 0 {
            return 0.0;
        }
        let matrix1_rate = ratio(self.matrix1_as_first_wins, self.matrix1_first_games);
        let matrix2_rate = ratio(self.matrix2_as_first_wins, self.matrix2_first_games);
        (matrix1_rate + matrix2_rate) / 2.0 - 0.5
    }

    /// Games in the order they were recorded.
    pub fn games(&self) -> &[GameResult] {
        &self.games
    }
}

fn ratio(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(total)
    }
}
