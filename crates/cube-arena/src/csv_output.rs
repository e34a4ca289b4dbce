//! CSV export of a tournament report, one file per table.

use std::io::Write;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::export::OutputError;
use crate::report::TournamentReport;

const MATCHUP_HEADERS: [&str; 14] = [
    "matrix1_label",
    "matrix2_label",
    "total_games",
    "matrix1_wins",
    "matrix2_wins",
    "ties",
    "matrix1_win_rate",
    "matrix2_win_rate",
    "tie_rate",
    "matrix1_as_first_wins",
    "matrix2_as_first_wins",
    "average_game_duration",
    "average_move_count",
    "first_player_advantage",
];

const RANKING_HEADERS: [&str; 8] = [
    "rank",
    "matrix_label",
    "win_rate",
    "total_wins",
    "total_losses",
    "total_ties",
    "total_games",
    "description",
];

const GAME_HEADERS: [&str; 8] = [
    "game_id",
    "player1_matrix",
    "player2_matrix",
    "winner",
    "move_count",
    "game_duration",
    "timestamp",
    "final_board",
];

pub fn write_matchups<W: Write>(writer: &mut Writer<W>, report: &TournamentReport) -> csv::Result<()> {
    writer.write_record(MATCHUP_HEADERS)?;
    for m in report.matchups() {
        writer.write_record([
            m.matrix1_label().to_string(),
            m.matrix2_label().to_string(),
            m.total_games().to_string(),
            m.matrix1_wins().to_string(),
            m.matrix2_wins().to_string(),
            m.ties().to_string(),
            format!("{:.4}", m.matrix1_win_rate()),
            format!("{:.4}", m.matrix2_win_rate()),
            format!("{:.4}", m.tie_rate()),
            m.matrix1_as_first_wins().to_string(),
            m.matrix2_as_first_wins().to_string(),
            format!("{:.3}", m.average_duration_secs()),
            format!("{:.2}", m.average_move_count()),
            format!("{:.6}", m.first_player_advantage()),
        ])?;
    }
    Ok(())
}

pub fn write_rankings<W: Write>(writer: &mut Writer<W>, report: &TournamentReport) -> csv::Result<()> {
    writer.write_record(RANKING_HEADERS)?;
    for s in report.rankings() {
        writer.write_record([
            s.rank.to_string(),
            s.label,
            format!("{:.4}", s.win_rate),
            s.wins.to_string(),
            s.losses.to_string(),
            s.ties.to_string(),
            s.total_games.to_string(),
            s.description.unwrap_or_default(),
        ])?;
    }
    Ok(())
}

pub fn write_games<W: Write>(writer: &mut Writer<W>, report: &TournamentReport) -> csv::Result<()> {
    writer.write_record(GAME_HEADERS)?;
    for (i, game) in report.games().iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            game.player1_label().to_string(),
            game.player2_label().to_string(),
            game.winner().to_string(),
            game.move_count().to_string(),
            format!("{:.3}", game.duration_secs()),
            game.created_at().to_rfc3339(),
            game.final_board().to_string(),
        ])?;
    }
    Ok(())
}

/// Key/value rows describing the run as a whole.
pub fn write_summary<W: Write>(writer: &mut Writer<W>, report: &TournamentReport) -> csv::Result<()> {
    let config = report.config();
    let time = |t: Option<chrono::DateTime<chrono::Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();
    let rows = [
        ("metric", "value".to_string()),
        (
            "config_file",
            config
                .source_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ),
        ("matrices_count", config.matrices().len().to_string()),
        ("iterations_per_matchup", config.iterations_per_matchup().to_string()),
        ("randomization_enabled", config.randomization_enabled().to_string()),
        ("total_games_played", report.total_games_played().to_string()),
        ("expected_games", report.expected_games().to_string()),
        ("tournament_duration_seconds", format!("{:.3}", report.duration_secs())),
        ("games_per_hour", format!("{:.2}", report.games_per_hour())),
        ("start_time", time(report.started_at())),
        ("end_time", time(report.ended_at())),
        (
            "overall_first_player_advantage",
            format!("{:.6}", report.overall_first_player_advantage()),
        ),
    ];
    for (metric, value) in rows {
        writer.write_record([metric, value.as_str()])?;
    }
    Ok(())
}

/// Writes `<base>_matchups.csv`, `<base>_rankings.csv`, `<base>_games.csv`
/// and `<base>_summary.csv` into `dir`.
pub fn write_csv_reports(
    dir: &Path,
    base_name: &str,
    report: &TournamentReport,
) -> Result<Vec<PathBuf>, OutputError> {
    type Table = fn(&mut Writer<std::fs::File>, &TournamentReport) -> csv::Result<()>;
    let tables: [(&str, Table); 4] = [
        ("matchups", write_matchups),
        ("rankings", write_rankings),
        ("games", write_games),
        ("summary", write_summary),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (suffix, write_table) in tables {
        let path = dir.join(format!("{}_{}.csv", base_name, suffix));
        let mut writer = Writer::from_path(&path)?;
        write_table(&mut writer, report)?;
        writer.flush()?;
        written.push(path);
    }
    Ok(written)
}
