//! Shared progress counters for a running tournament.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
struct ProgressState {
    games_total: u64,
    games_completed: u64,
    /// In-flight matchups, oldest first.
    running: Vec<String>,
    started: Option<Instant>,
}

/// A point-in-time view of tournament progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub games_completed: u64,
    pub games_total: u64,
    /// The oldest matchup still being played.
    pub current_matchup: Option<String>,
    /// Every matchup being played, in the order they started.
    pub running_matchups: Vec<String>,
    pub elapsed: Duration,
    /// `None` until at least one game has completed.
    pub estimated_remaining: Option<Duration>,
}

impl Progress {
    pub fn completion_percentage(&self) -> f64 {
        if self.games_total == 0 {
            return 0.0;
        }
        self.games_completed as f64 / self.games_total as f64 * 100.0
    }

    /// Wall-clock time the run is expected to end.
    pub fn estimated_completion(&self) -> Option<DateTime<Utc>> {
        let remaining = chrono::Duration::from_std(self.estimated_remaining?).ok()?;
        Some(Utc::now() + remaining)
    }
}

/// Cloneable handle onto the progress of one run.
///
/// The orchestrator updates it; any clone can take a [`Progress`] snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<ProgressState>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn begin(&self, games_total: u64) {
        let mut state = self.lock();
        state.games_total = games_total;
        state.games_completed = 0;
        state.running.clear();
        state.started = Some(Instant::now());
    }

    pub(crate) fn matchup_started(&self, label: &str) {
        self.lock().running.push(label.to_string());
    }

    pub(crate) fn matchup_finished(&self, label: &str) {
        self.lock().running.retain(|running| running != label);
    }

    pub(crate) fn game_completed(&self) {
        self.lock().games_completed += 1;
    }

    /// Forgets matchups abandoned when a run stops early.
    pub(crate) fn clear_running(&self) {
        self.lock().running.clear();
    }

    pub fn snapshot(&self) -> Progress {
        let state = self.lock();
        let elapsed = state.started.map(|s| s.elapsed()).unwrap_or_default();
        Progress {
            games_completed: state.games_completed,
            games_total: state.games_total,
            current_matchup: state.running.first().cloned(),
            running_matchups: state.running.clone(),
            elapsed,
            estimated_remaining: estimate_remaining(
                elapsed,
                state.games_completed,
                state.games_total,
            ),
        }
    }
}

/// Linear extrapolation: `elapsed / completed * remaining`.
fn estimate_remaining(elapsed: Duration, completed: u64, total: u64) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(completed);
    let per_game = elapsed.as_secs_f64() / completed as f64;
    Some(Duration::from_secs_f64(per_game * remaining as f64))
}
