//! Round-robin tournament orchestration.
//!
//! Every unordered pair of matrices plays `iterations` rounds; each round is
//! two games so both matrices move first equally often. Any engine failure
//! aborts the run. The report handed back with the error keeps the matchups
//! that finished before the failure and nothing of the failing one.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::engine_client::{EngineError, EngineValidationError, MoveEngine};
use crate::game_runner::GameRunner;
use crate::matchup::{MatchupError, MatchupResult};
use crate::progress::ProgressTracker;
use crate::report::TournamentReport;
use crate::tournament_config::TournamentConfig;
use crate::weight_matrix::WeightMatrix;

/// Why a running tournament stopped.
#[derive(Error, Debug)]
pub enum AbortReason {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Matchup(#[from] MatchupError),
}

/// Errors returned by [`TournamentManager::run`].
#[derive(Error, Debug)]
pub enum TournamentError {
    #[error("tournament has already been run")]
    AlreadyStarted,
    #[error("engine validation failed: {0}")]
    EngineValidation(#[from] EngineValidationError),
    /// The run stopped partway. `report` is finished and holds every matchup
    /// completed before the failure.
    #[error("tournament aborted after {} completed matchups: {source}", .report.matchups().len())]
    Aborted {
        source: AbortReason,
        report: Box<TournamentReport>,
    },
}

/// Lifecycle of a [`TournamentManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    Failed(String),
}

/// How matchups are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingPolicy {
    /// One game at a time, in plan order.
    #[default]
    Sequential,
    /// Up to `max_matchups` matchups in flight at once. Finished matchups
    /// still enter the report in plan order.
    Concurrent { max_matchups: usize },
}

impl SchedulingPolicy {
    fn width(self) -> usize {
        match self {
            SchedulingPolicy::Sequential => 1,
            SchedulingPolicy::Concurrent { max_matchups } => max_matchups.max(1),
        }
    }
}

/// Runs one round-robin tournament.
///
/// # Example
///
/// ```ignore
/// let runner = GameRunner::new(EngineClient::new("./tttt", EngineTimeouts::default())?);
/// let mut manager = TournamentManager::new(config, runner);
/// let report = manager.run().await?;
/// println!("{} games played", report.total_games_played());
/// ```
pub struct TournamentManager<E> {
    config: Arc<TournamentConfig>,
    runner: GameRunner<E>,
    policy: SchedulingPolicy,
    state: RunState,
    progress: ProgressTracker,
}

impl<E: MoveEngine> TournamentManager<E> {
    pub fn new(config: impl Into<Arc<TournamentConfig>>, runner: GameRunner<E>) -> Self {
        Self {
            config: config.into(),
            runner,
            policy: SchedulingPolicy::default(),
            state: RunState::NotStarted,
            progress: ProgressTracker::new(),
        }
    }

    pub fn with_policy(mut self, policy: SchedulingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// A handle that can be polled from elsewhere while [`run`](Self::run) is in progress.
    pub fn progress(&self) -> ProgressTracker {
        self.progress.clone()
    }

    /// Validates the engine and plays the whole tournament.
    ///
    /// # Errors
    ///
    /// - [`TournamentError::AlreadyStarted`] on a second call.
    /// - [`TournamentError::EngineValidation`] if the engine fails its sanity
    ///   check; no game is played.
    /// - [`TournamentError::Aborted`] on the first failed game.
    pub async fn run(&mut self) -> Result<TournamentReport, TournamentError> {
        if self.state != RunState::NotStarted {
            return Err(TournamentError::AlreadyStarted);
        }
        self.state = RunState::Running;

        if let Err(e) = self.runner.validate_engine().await {
            error!("Engine validation failed: {}", e);
            self.state = RunState::Failed(e.to_string());
            return Err(e.into());
        }

        let config = Arc::clone(&self.config);
        let mut report = TournamentReport::new(Arc::clone(&config));
        report.start();
        self.progress.begin(config.total_games());
        info!(
            matrices = config.matrices().len(),
            matchups = config.matchup_count(),
            games = config.total_games(),
            "Starting tournament"
        );

        let runner = &self.runner;
        let progress = &self.progress;
        let iterations = config.iterations_per_matchup();
        let mut matchups = stream::iter(
            config
                .pairings()
                .into_iter()
                .map(|(a, b)| play_matchup(runner, progress, a, b, iterations)),
        )
        .buffered(self.policy.width());

        let mut failure = None;
        while let Some(outcome) = matchups.next().await {
            match outcome {
                Ok(matchup) => {
                    let snapshot = progress.snapshot();
                    info!(
                        matchup = %matchup.label(),
                        wins = matchup.matrix1_wins(),
                        losses = matchup.matrix2_wins(),
                        ties = matchup.ties(),
                        completed = snapshot.games_completed,
                        total = snapshot.games_total,
                        "Matchup finished ({:.1}%)",
                        snapshot.completion_percentage()
                    );
                    report.add_matchup(matchup);
                }
                Err(reason) => {
                    failure = Some(reason);
                    break;
                }
            }
        }
        // Drops any matchups still in flight, killing their engine processes.
        drop(matchups);

        report.finish();
        self.progress.clear_running();
        if let Some(reason) = failure {
            error!(
                completed_matchups = report.matchups().len(),
                "Tournament aborted: {}", reason
            );
            self.state = RunState::Failed(reason.to_string());
            return Err(TournamentError::Aborted {
                source: reason,
                report: Box::new(report),
            });
        }

        self.state = RunState::Completed;
        info!(
            games = report.total_games_played(),
            duration_secs = report.duration_secs(),
            "Tournament completed"
        );
        Ok(report)
    }
}

/// Plays every game of one pairing, alternating who moves first.
async fn play_matchup<E: MoveEngine>(
    runner: &GameRunner<E>,
    progress: &ProgressTracker,
    a: &WeightMatrix,
    b: &WeightMatrix,
    iterations: u32,
) -> Result<MatchupResult, AbortReason> {
    let mut matchup = MatchupResult::new(a.label(), b.label());
    let label = matchup.label();
    progress.matchup_started(&label);
    info!(matchup = %label, games = iterations * 2, "Starting matchup");

    for iteration in 1..=iterations {
        for (first, second) in [(a, b), (b, a)] {
            let game = runner.play_game(first, second).await?;
            debug!(
                iteration,
                first = first.label(),
                second = second.label(),
                winner = %game.winner(),
                moves = game.move_count(),
                "Game finished"
            );
            matchup.record(game)?;
            progress.game_completed();
        }
    }
    progress.matchup_finished(&label);
    Ok(matchup)
}
