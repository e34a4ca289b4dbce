//! Tournament-wide aggregation: rankings and summary metrics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::game_runner::GameResult;
use crate::matchup::MatchupResult;
use crate::tournament_config::TournamentConfig;

/// One row of the overall ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStanding {
    pub rank: usize,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_rate: f64,
}

/// Summary of the randomization setting for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomizationAnalysis {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_games_with_randomization: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Results of a tournament run, complete or partial.
///
/// Matchups are appended in pairing-plan order and their games are copied
/// into a flat list in the same order.
#[derive(Debug, Clone)]
pub struct TournamentReport {
    config: Arc<TournamentConfig>,
    matchups: Vec<MatchupResult>,
    games: Vec<GameResult>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl TournamentReport {
    pub fn new(config: Arc<TournamentConfig>) -> Self {
        Self {
            config,
            matchups: Vec::new(),
            games: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    /// Appends a finished matchup and its games.
    pub fn add_matchup(&mut self, matchup: MatchupResult) {
        self.games.extend_from_slice(matchup.games());
        self.matchups.push(matchup);
    }

    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn matchups(&self) -> &[MatchupResult] {
        &self.matchups
    }

    pub fn games(&self) -> &[GameResult] {
        &self.games
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn total_games_played(&self) -> usize {
        self.games.len()
    }

    pub fn expected_games(&self) -> u64 {
        self.config.total_games()
    }

    /// Whether every planned game was played.
    pub fn is_complete(&self) -> bool {
        self.total_games_played() as u64 == self.expected_games()
    }

    /// Wall-clock seconds between start and finish, or 0 if either is unset.
    pub fn duration_secs(&self) -> f64 {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => {
                (end - start).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0
            }
            _ => 0.0,
        }
    }

    pub fn games_per_hour(&self) -> f64 {
        let hours = self.duration_secs() / 3600.0;
        if hours <= 0.0 {
            return 0.0;
        }
        self.total_games_played() as f64 / hours
    }

    /// Every configured matrix ranked by win rate, highest first.
    ///
    /// Ties in win rate keep configuration order. Matrices that played no
    /// game are listed with zero counts.
    pub fn rankings(&self) -> Vec<StrategyStanding> {
        let mut tallies: HashMap<&str, (u32, u32, u32)> = HashMap::new();
        for matchup in &self.matchups {
            for label in [matchup.matrix1_label(), matchup.matrix2_label()] {
                if let Some((wins, losses, ties)) = matchup.record_for(label) {
                    let tally = tallies.entry(label).or_default();
                    tally.0 += wins;
                    tally.1 += losses;
                    tally.2 += ties;
                }
            }
        }

        let mut standings: Vec<StrategyStanding> = self
            .config
            .matrices()
            .iter()
            .map(|matrix| {
                let (wins, losses, ties) =
                    tallies.get(matrix.label()).copied().unwrap_or_default();
                let total_games = wins + losses + ties;
                let win_rate = if total_games == 0 {
                    0.0
                } else {
                    f64::from(wins) / f64::from(total_games)
                };
                StrategyStanding {
                    rank: 0,
                    label: matrix.label().to_string(),
                    description: matrix.description().map(str::to_string),
                    total_games,
                    wins,
                    losses,
                    ties,
                    win_rate,
                }
            })
            .collect();

        standings.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
        for (i, standing) in standings.iter_mut().enumerate() {
            standing.rank = i + 1;
        }
        standings
    }

    /// Mean of the per-matchup first-player advantages, 0 with no matchups.
    pub fn overall_first_player_advantage(&self) -> f64 {
        if self.matchups.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .matchups
            .iter()
            .map(MatchupResult::first_player_advantage)
            .sum();
        sum / self.matchups.len() as f64
    }

    pub fn randomization_analysis(&self) -> RandomizationAnalysis {
        if !self.config.randomization_enabled() {
            return RandomizationAnalysis {
                enabled: false,
                total_games_with_randomization: None,
                note: None,
            };
        }
        RandomizationAnalysis {
            enabled: true,
            total_games_with_randomization: Some(self.total_games_played()),
            note: Some("the engine protocol has no randomization flag; games ran deterministically"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_runner::Winner;
    use crate::testing::{game, matrix};
    use crate::tournament_config::OutputFormat;

    fn config(labels: &[&str], randomization: bool) -> Arc<TournamentConfig> {
        Arc::new(
            TournamentConfig::new(
                labels.iter().map(|l| matrix(l)).collect(),
                1,
                randomization,
                vec![OutputFormat::Json],
                None,
            )
            .unwrap(),
        )
    }

    fn matchup(a: &str, b: &str, outcomes: &[(bool, Winner)]) -> MatchupResult {
        let mut matchup = MatchupResult::new(a, b);
        for &(a_first, winner) in outcomes {
            let result = if a_first {
                game(a, b, winner)
            } else {
                game(b, a, winner)
            };
            matchup.record(result).unwrap();
        }
        matchup
    }

    #[test]
    fn test_empty_report() {
        let report = TournamentReport::new(config(&["a", "b"], false));
        assert_eq!(report.total_games_played(), 0);
        assert_eq!(report.expected_games(), 2);
        assert_eq!(report.duration_secs(), 0.0);
        assert_eq!(report.games_per_hour(), 0.0);
        assert_eq!(report.overall_first_player_advantage(), 0.0);
        assert!(!report.is_finished());

        let rankings = report.rankings();
        assert_eq!(rankings.len(), 2);
        assert!(rankings.iter().all(|s| s.total_games == 0 && s.win_rate == 0.0));
        assert_eq!(rankings[0].label, "a");
    }

    #[test]
    fn test_games_follow_matchups() {
        let mut report = TournamentReport::new(config(&["a", "b", "c"], false));
        report.start();
        report.add_matchup(matchup("a", "b", &[(true, Winner::Player1), (false, Winner::Tie)]));
        report.add_matchup(matchup("a", "c", &[(true, Winner::Player2), (false, Winner::Player1)]));
        report.finish();

        assert_eq!(report.total_games_played(), 4);
        let players: Vec<_> = report.games().iter().map(|g| g.player1_label()).collect();
        assert_eq!(players, ["a", "b", "a", "c"]);
        assert!(report.is_finished());
        assert!(!report.is_complete());
        assert!(report.duration_secs() >= 0.0);
    }

    #[test]
    fn test_rankings_sorted_by_win_rate() {
        let mut report = TournamentReport::new(config(&["a", "b", "c"], false));
        report.add_matchup(matchup("a", "b", &[(true, Winner::Player2), (false, Winner::Player1)]));
        report.add_matchup(matchup("a", "c", &[(true, Winner::Tie), (false, Winner::Tie)]));
        report.add_matchup(matchup("b", "c", &[(true, Winner::Player1), (false, Winner::Player2)]));

        let rankings = report.rankings();
        let order: Vec<_> = rankings.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
        assert_eq!(rankings[0].rank, 1);
        assert_eq!((rankings[0].wins, rankings[0].losses, rankings[0].ties), (4, 0, 0));
        assert_eq!((rankings[2].wins, rankings[2].losses, rankings[2].ties), (0, 2, 2));
        assert_eq!((rankings[1].wins, rankings[1].losses, rankings[1].ties), (0, 2, 2));
        assert_eq!(rankings[1].win_rate, 0.0);
        for standing in &rankings {
            assert_eq!(standing.total_games, standing.wins + standing.losses + standing.ties);
        }
    }

    #[test]
    fn test_equal_win_rates_keep_config_order() {
        let mut report = TournamentReport::new(config(&["x", "y", "z"], false));
        report.add_matchup(matchup("x", "y", &[(true, Winner::Tie)]));
        let order: Vec<_> = report.rankings().into_iter().map(|s| s.label).collect();
        assert_eq!(order, ["x", "y", "z"]);
    }

    #[test]
    fn test_overall_first_player_advantage() {
        let mut report = TournamentReport::new(config(&["a", "b", "c"], false));
        report.add_matchup(matchup("a", "b", &[(true, Winner::Player1), (false, Winner::Player1)]));
        report.add_matchup(matchup("a", "c", &[(true, Winner::Tie), (false, Winner::Tie)]));
        // (0.5 + -0.5) / 2
        assert!((report.overall_first_player_advantage() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_randomization_analysis() {
        let report = TournamentReport::new(config(&["a", "b"], false));
        assert!(!report.randomization_analysis().enabled);

        let mut report = TournamentReport::new(config(&["a", "b"], true));
        report.add_matchup(matchup("a", "b", &[(true, Winner::Tie)]));
        let analysis = report.randomization_analysis();
        assert!(analysis.enabled);
        assert_eq!(analysis.total_games_with_randomization, Some(1));
    }
}
