//! JSON export of a tournament report.
//!
//! The document has six top-level sections:
//!
//! ```json
//! {
//!   "tournament_info": { "start_time": "...", "total_games": 6, ... },
//!   "matrix_rankings": [ { "rank": 1, "label": "alpha", "win_rate": 0.75, ... } ],
//!   "matchup_details": [ { "matrix1_label": "alpha", "matrix2_label": "beta", ... } ],
//!   "randomization_analysis": { "enabled": false },
//!   "overall_first_player_advantage": 0.0,
//!   "configuration": { "matrices": [ ... ], "iterations_per_matchup": 1, ... }
//! }
//! ```

use std::path::Path;

use serde::Serialize;

use crate::export::OutputError;
use crate::matchup::MatchupResult;
use crate::report::{RandomizationAnalysis, StrategyStanding, TournamentReport};
use crate::tournament_config::TournamentConfig;

#[derive(Serialize)]
struct ReportJson<'a> {
    tournament_info: TournamentInfo,
    matrix_rankings: Vec<StrategyStanding>,
    matchup_details: Vec<MatchupJson<'a>>,
    randomization_analysis: RandomizationAnalysis,
    overall_first_player_advantage: f64,
    configuration: ConfigurationJson<'a>,
}

#[derive(Serialize)]
struct TournamentInfo {
    start_time: Option<String>,
    end_time: Option<String>,
    total_duration_seconds: f64,
    total_games: usize,
    expected_games: u64,
    completed: bool,
    games_per_hour: f64,
    matrices_count: usize,
    iterations_per_matchup: u32,
    randomization_enabled: bool,
}

#[derive(Serialize)]
struct MatchupJson<'a> {
    #[serde(flatten)]
    counts: &'a MatchupResult,
    matrix1_win_rate: f64,
    matrix2_win_rate: f64,
    tie_rate: f64,
    average_game_duration: f64,
    average_move_count: f64,
    first_player_advantage: f64,
}

#[derive(Serialize)]
struct ConfigurationJson<'a> {
    #[serde(flatten)]
    config: &'a TournamentConfig,
    total_games_count: u64,
    matrix_count: usize,
}

fn build(report: &TournamentReport) -> ReportJson<'_> {
    let config = report.config();
    ReportJson {
        tournament_info: TournamentInfo {
            start_time: report.started_at().map(|t| t.to_rfc3339()),
            end_time: report.ended_at().map(|t| t.to_rfc3339()),
            total_duration_seconds: report.duration_secs(),
            total_games: report.total_games_played(),
            expected_games: report.expected_games(),
            completed: report.is_complete(),
            games_per_hour: report.games_per_hour(),
            matrices_count: config.matrices().len(),
            iterations_per_matchup: config.iterations_per_matchup(),
            randomization_enabled: config.randomization_enabled(),
        },
        matrix_rankings: report.rankings(),
        matchup_details: report
            .matchups()
            .iter()
            .map(|m| MatchupJson {
                counts: m,
                matrix1_win_rate: m.matrix1_win_rate(),
                matrix2_win_rate: m.matrix2_win_rate(),
                tie_rate: m.tie_rate(),
                average_game_duration: m.average_duration_secs(),
                average_move_count: m.average_move_count(),
                first_player_advantage: m.first_player_advantage(),
            })
            .collect(),
        randomization_analysis: report.randomization_analysis(),
        overall_first_player_advantage: report.overall_first_player_advantage(),
        configuration: ConfigurationJson {
            config,
            total_games_count: config.total_games(),
            matrix_count: config.matrices().len(),
        },
    }
}

/// Renders the report as pretty-printed JSON.
pub fn to_json(report: &TournamentReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build(report))
}

/// Writes the report as pretty-printed JSON to `path`.
pub fn write_json<P: AsRef<Path>>(path: P, report: &TournamentReport) -> Result<(), OutputError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &build(report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_report;
    use serde_json::Value;

    #[test]
    fn test_sections_present() {
        let json: Value = serde_json::from_str(&to_json(&sample_report()).unwrap()).unwrap();
        for key in [
            "tournament_info",
            "matrix_rankings",
            "matchup_details",
            "randomization_analysis",
            "overall_first_player_advantage",
            "configuration",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_values() {
        let json: Value = serde_json::from_str(&to_json(&sample_report()).unwrap()).unwrap();

        let info = &json["tournament_info"];
        assert_eq!(info["total_games"], 6);
        assert_eq!(info["expected_games"], 6);
        assert_eq!(info["completed"], true);
        assert!(info["start_time"].is_string());

        let top = &json["matrix_rankings"][0];
        assert_eq!(top["label"], "alpha");
        assert_eq!(top["rank"], 1);
        assert_eq!(top["description"], "corner heavy");
        assert_eq!(top["win_rate"], 0.75);

        let first = &json["matchup_details"][0];
        assert_eq!(first["matrix1_label"], "alpha");
        assert_eq!(first["matrix1_wins"], 2);
        assert_eq!(first["matrix1_win_rate"], 1.0);
        assert!(first.get("games").is_none());

        assert_eq!(json["randomization_analysis"]["enabled"], false);
        assert_eq!(json["configuration"]["matrix_count"], 3);
        assert_eq!(json["configuration"]["matrices"][1]["label"], "beta");
        assert_eq!(
            json["configuration"]["output_formats"],
            serde_json::json!(["json", "csv", "text"])
        );
    }

    #[test]
    fn test_write_json_creates_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json(&path, &sample_report()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let json: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(json["matchup_details"].as_array().unwrap().len(), 3);
    }
}
