//! In-process engines and fixtures shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use cube_core::{Board, Side, Weights};
use cube_protocol::{MoveReply, MoveRequest, ProtocolError};

use crate::engine_client::{EngineError, EngineValidationError, MoveEngine};
use crate::game_runner::{GameResult, Winner};
use crate::matchup::MatchupResult;
use crate::report::TournamentReport;
use crate::tournament_config::{OutputFormat, TournamentConfig};
use crate::weight_matrix::WeightMatrix;

pub fn matrix(label: &str) -> WeightMatrix {
    matrix_with(label, 0)
}

/// A matrix whose first weight is `strength`; see [`FillEngine::strength_duel`].
pub fn matrix_with(label: &str, strength: i32) -> WeightMatrix {
    let mut values = [0; 25];
    values[0] = strength;
    WeightMatrix::from_values(label, &values).unwrap()
}

/// Places the mover's mark in the first empty cell.
#[derive(Default)]
pub struct FillEngine {
    ending_after: Option<usize>,
    strength_duel: bool,
    fail_on_call: Option<u32>,
    fail_on_weight: Option<i32>,
    delay: Option<Duration>,
    invalid: bool,
    calls: Cell<u32>,
    sides: RefCell<Vec<Side>>,
    weights: RefCell<Vec<Weights>>,
}

impl FillEngine {
    /// Plays until the board is full.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports game over once the board holds `marks` marks.
    pub fn ending_after(marks: usize) -> Self {
        Self {
            ending_after: Some(marks),
            ..Self::default()
        }
    }

    /// Reports game over right after a mover whose first weight is positive.
    pub fn strength_duel() -> Self {
        Self {
            strength_duel: true,
            ..Self::default()
        }
    }

    /// Fails the `call`-th move request (1-based, counted across games).
    pub fn failing_on_call(mut self, call: u32) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Fails every move request whose first weight is `weight`.
    pub fn failing_for_weight(mut self, weight: i32) -> Self {
        self.fail_on_weight = Some(weight);
        self
    }

    /// Sleeps for `delay` before answering each move request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails its sanity check.
    pub fn invalid() -> Self {
        Self {
            invalid: true,
            ..Self::default()
        }
    }

    pub fn sides_seen(&self) -> Vec<Side> {
        self.sides.borrow().clone()
    }

    pub fn weights_seen(&self) -> Vec<Weights> {
        self.weights.borrow().clone()
    }
}

impl MoveEngine for FillEngine {
    async fn validate(&self) -> Result<(), EngineValidationError> {
        if self.invalid {
            return Err(EngineValidationError::HelpFailed(Some(127)));
        }
        Ok(())
    }

    async fn request_move(&self, request: &MoveRequest) -> Result<MoveReply, EngineError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        self.sides.borrow_mut().push(request.side);
        self.weights.borrow_mut().push(request.weights);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let weight_fails = self.fail_on_weight == Some(request.weights.values()[0]);
        if self.fail_on_call == Some(call) || weight_fails {
            return Err(EngineError::ExitStatus {
                code: Some(1),
                stderr: "engine crashed".to_string(),
            });
        }

        let index = (0..64)
            .find(|&i| request.board.cell(i).is_some_and(|cell| cell.is_empty()))
            .ok_or(EngineError::Protocol(ProtocolError::EmptyOutput))?;
        let board: Board = request
            .board
            .with_mark(index, request.side.mark())
            .ok_or(EngineError::Protocol(ProtocolError::EmptyOutput))?;
        let game_over = match (self.ending_after, self.strength_duel) {
            (Some(marks), _) => board.mark_total() >= marks,
            (None, true) => request.weights.values()[0] > 0,
            (None, false) => false,
        };

        Ok(MoveReply {
            move_number: index + 1,
            board,
            game_over,
        })
    }
}

/// Replays a fixed list of replies regardless of the request.
pub struct ScriptedEngine {
    replies: RefCell<VecDeque<Result<MoveReply, EngineError>>>,
}

impl ScriptedEngine {
    pub fn new(replies: Vec<Result<MoveReply, EngineError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
        }
    }
}

impl MoveEngine for ScriptedEngine {
    async fn validate(&self) -> Result<(), EngineValidationError> {
        Ok(())
    }

    async fn request_move(&self, _request: &MoveRequest) -> Result<MoveReply, EngineError> {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(EngineError::Protocol(ProtocolError::EmptyOutput)))
    }
}

/// Builds a finished game without running an engine.
pub fn game(first: &str, second: &str, winner: Winner) -> GameResult {
    GameResult::new(first, second, winner, 9, 0.5, Board::empty())
}

/// A finished three-matrix tournament, one iteration per pairing.
///
/// alpha: 3W 0L 1T, beta: 1W 3L 0T, gamma: 1W 2L 1T.
pub fn sample_report() -> TournamentReport {
    let matrices = vec![
        matrix("alpha").with_description("corner heavy"),
        matrix("beta"),
        matrix("gamma"),
    ];
    let config =
        TournamentConfig::new(matrices, 1, false, OutputFormat::ALL.to_vec(), None).unwrap();
    let mut report = TournamentReport::new(Arc::new(config));
    report.start();
    let plan = [
        ("alpha", "beta", Winner::Player1, Winner::Player2),
        ("alpha", "gamma", Winner::Tie, Winner::Player2),
        ("beta", "gamma", Winner::Player1, Winner::Player1),
    ];
    for (a, b, a_first, b_first) in plan {
        let mut matchup = MatchupResult::new(a, b);
        matchup.record(game(a, b, a_first)).unwrap();
        matchup.record(game(b, a, b_first)).unwrap();
        report.add_matchup(matchup);
    }
    report.finish();
    report
}
