//! Game execution logic for running one game between two weight matrices.
//!
//! This module provides the [`GameRunner`] struct, which drives a single game
//! from the empty board to a terminal state by requesting one move at a time
//! from a [`MoveEngine`] and validating every reply.
//!
//! Whose turn it is comes from the mark counts on the board (see
//! [`cube_core::turn_of`]); the runner keeps no turn counter of its own.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use cube_core::{turn_of, Board, Side, Weights, BOARD_CELLS};
use cube_protocol::{MoveReply, MoveRequest};
use serde::Serialize;
use tracing::trace;

use crate::engine_client::{EngineError, EngineValidationError, MoveEngine};
use crate::weight_matrix::WeightMatrix;

/// Which seat won a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The first mover won.
    Player1,
    /// The second mover won.
    Player2,
    /// Nobody won.
    Tie,
}

impl Winner {
    pub fn as_str(self) -> &'static str {
        match self {
            Winner::Player1 => "player1",
            Winner::Player2 => "player2",
            Winner::Tie => "tie",
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record of one finished game.
///
/// Only the [`GameRunner`] produces these.
#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    player1_label: String,
    player2_label: String,
    winner: Winner,
    move_count: u32,
    duration_secs: f64,
    final_board: Board,
    created_at: DateTime<Utc>,
}

impl GameResult {
    pub(crate) fn new(
        player1_label: &str,
        player2_label: &str,
        winner: Winner,
        move_count: u32,
        duration_secs: f64,
        final_board: Board,
    ) -> Self {
        Self {
            player1_label: player1_label.to_string(),
            player2_label: player2_label.to_string(),
            winner,
            move_count,
            duration_secs: duration_secs.max(0.0),
            final_board,
            created_at: Utc::now(),
        }
    }

    /// Label of the matrix that moved first.
    pub fn player1_label(&self) -> &str {
        &self.player1_label
    }

    /// Label of the matrix that moved second.
    pub fn player2_label(&self) -> &str {
        &self.player2_label
    }

    pub fn winner(&self) -> Winner {
        self.winner
    }

    /// Label of the winning matrix, or `None` for a tie.
    pub fn winner_label(&self) -> Option<&str> {
        match self.winner {
            Winner::Player1 => Some(&self.player1_label),
            Winner::Player2 => Some(&self.player2_label),
            Winner::Tie => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.winner == Winner::Tie
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn final_board(&self) -> &Board {
        &self.final_board
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Safety limits applied to every game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLimits {
    /// Half-moves after which the game is declared a tie.
    pub max_half_moves: u32,
    /// Wall-clock budget for the whole game.
    pub max_duration: Duration,
}

impl Default for GameLimits {
    fn default() -> Self {
        Self {
            max_half_moves: 100,
            max_duration: Duration::from_secs(300),
        }
    }
}

/// Why the move loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    FullBoard,
    EngineReported,
    MoveLimit,
}

/// Decides the winner from how the game ended and its length.
///
/// There is no rule-based win detection here: when the engine ends the game,
/// the side that made the last move is credited with the win, so an odd move
/// count goes to the first mover and an even one to the second mover.
fn decide_winner(ending: Ending, move_count: u32) -> Winner {
    match ending {
        Ending::FullBoard | Ending::MoveLimit => Winner::Tie,
        Ending::EngineReported if move_count as usize >= BOARD_CELLS => Winner::Tie,
        Ending::EngineReported if move_count % 2 == 1 => Winner::Player1,
        Ending::EngineReported => Winner::Player2,
    }
}

/// Executes games between two weight matrices through a [`MoveEngine`].
///
/// # Example
///
/// ```ignore
/// let engine = EngineClient::new("./tttt", EngineTimeouts::default())?;
/// let runner = GameRunner::new(engine);
/// let result = runner.play_game(&aggressive, &defensive).await?;
/// println!("Winner: {:?}", result.winner_label());
/// ```
pub struct GameRunner<E> {
    engine: E,
    limits: GameLimits,
}

impl<E: MoveEngine> GameRunner<E> {
    /// Creates a runner with the default limits.
    pub fn new(engine: E) -> Self {
        Self::with_limits(engine, GameLimits::default())
    }

    pub fn with_limits(engine: E, limits: GameLimits) -> Self {
        Self { engine, limits }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn limits(&self) -> GameLimits {
        self.limits
    }

    /// Runs the engine's sanity check.
    pub async fn validate_engine(&self) -> Result<(), EngineValidationError> {
        self.engine.validate().await
    }

    /// Requests a single move for `side` and checks it was applied.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the engine fails, times out or replies
    /// with a malformed board, or if the targeted cell did not go from empty
    /// to the mover's mark.
    pub async fn execute_move(
        &self,
        board: &Board,
        side: Side,
        weights: &Weights,
    ) -> Result<MoveReply, EngineError> {
        let request = MoveRequest::new(side, *board, *weights);
        let reply = self.engine.request_move(&request).await?;
        reply.verify_applied(board, side)?;
        Ok(reply)
    }

    /// Plays one complete game. `first` always moves first and plays `X`.
    ///
    /// # Errors
    ///
    /// Any failure is returned as [`EngineError::GameFailed`] wrapping the
    /// cause; no result is produced for the game.
    pub async fn play_game(
        &self,
        first: &WeightMatrix,
        second: &WeightMatrix,
    ) -> Result<GameResult, EngineError> {
        let start = Instant::now();
        let mut board = Board::empty();
        let mut move_count = 0u32;

        let outcome = self
            .drive(first, second, start, &mut board, &mut move_count)
            .await;
        let ending = outcome.map_err(|source| EngineError::GameFailed {
            moves: move_count,
            elapsed_secs: start.elapsed().as_secs_f64(),
            source: Box::new(source),
        })?;

        let winner = decide_winner(ending, move_count);
        Ok(GameResult::new(
            first.label(),
            second.label(),
            winner,
            move_count,
            start.elapsed().as_secs_f64(),
            board,
        ))
    }

    async fn drive(
        &self,
        first: &WeightMatrix,
        second: &WeightMatrix,
        start: Instant,
        board: &mut Board,
        move_count: &mut u32,
    ) -> Result<Ending, EngineError> {
        loop {
            if board.is_full() {
                return Ok(Ending::FullBoard);
            }
            if start.elapsed() > self.limits.max_duration {
                return Err(EngineError::GameTimeout(self.limits.max_duration));
            }

            let side = turn_of(board)?;
            let weights = match side {
                Side::First => first.weights(),
                Side::Second => second.weights(),
            };

            let before = board.mark_total();
            let reply = self.execute_move(board, side, weights).await?;
            let after = reply.board.mark_total();
            *board = reply.board;
            *move_count += 1;
            trace!(%side, move_number = reply.move_number, move_count = *move_count, "Move applied");

            if after != before + 1 {
                return Err(EngineError::MarkCountMismatch { before, after });
            }
            if reply.game_over {
                return Ok(Ending::EngineReported);
            }
            if *move_count >= self.limits.max_half_moves {
                return Ok(Ending::MoveLimit);
            }
        }
    }
}
