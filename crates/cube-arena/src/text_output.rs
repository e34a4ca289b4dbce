//! Plain-text tournament reports.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};

use crate::matchup::MatchupResult;
use crate::report::TournamentReport;

const WIDTH: usize = 80;

/// The full report: summary, rankings, every matchup and a short analysis.
pub struct FullReport<'a>(pub &'a TournamentReport);

/// Summary and rankings only.
pub struct Summary<'a>(pub &'a TournamentReport);

impl Display for FullReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        header(f)?;
        summary(f, report)?;
        rankings(f, report)?;

        writeln!(f, "\nDETAILED MATCHUP RESULTS")?;
        writeln!(f, "{}", "-".repeat(24))?;
        for matchup in report.matchups() {
            writeln!(f)?;
            matchup_details(f, matchup)?;
        }

        analysis(f, report)?;
        footer(f)
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        header(f)?;
        summary(f, self.0)?;
        rankings(f, self.0)?;
        footer(f)
    }
}

pub fn format_report(report: &TournamentReport) -> String {
    FullReport(report).to_string()
}

pub fn format_summary(report: &TournamentReport) -> String {
    Summary(report).to_string()
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn header(f: &mut Formatter<'_>) -> fmt::Result {
    let rule = "=".repeat(WIDTH);
    writeln!(f, "{}", rule)?;
    writeln!(f, "{:^width$}", "TOURNAMENT RESULTS REPORT", width = WIDTH)?;
    writeln!(f, "{}", rule)
}

fn footer(f: &mut Formatter<'_>) -> fmt::Result {
    let rule = "=".repeat(WIDTH);
    let line = format!("Report generated at {}", timestamp(Utc::now()));
    writeln!(f, "\n{}", rule)?;
    writeln!(f, "{:^width$}", line, width = WIDTH)?;
    writeln!(f, "{}", rule)
}

fn summary(f: &mut Formatter<'_>, report: &TournamentReport) -> fmt::Result {
    let config = report.config();
    let source = config
        .source_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "N/A".to_string());

    writeln!(f, "\nTOURNAMENT SUMMARY")?;
    writeln!(f, "{}", "-".repeat(18))?;
    writeln!(f, "Configuration File: {}", source)?;
    writeln!(f, "Number of Matrices: {}", config.matrices().len())?;
    writeln!(f, "Iterations per Matchup: {}", config.iterations_per_matchup())?;
    writeln!(
        f,
        "Randomization Enabled: {}",
        if config.randomization_enabled() { "Yes" } else { "No" }
    )?;
    writeln!(f)?;
    writeln!(f, "Total Games Played: {}", report.total_games_played())?;
    writeln!(f, "Expected Games: {}", report.expected_games())?;
    writeln!(f, "Tournament Duration: {:.1} seconds", report.duration_secs())?;
    writeln!(f, "Games per Hour: {:.1}", report.games_per_hour())?;
    if let Some(start) = report.started_at() {
        let end = report
            .ended_at()
            .map(timestamp)
            .unwrap_or_else(|| "In Progress".to_string());
        writeln!(f, "Start Time: {}", timestamp(start))?;
        writeln!(f, "End Time: {}", end)?;
    }
    if report.is_finished() && !report.is_complete() {
        writeln!(f, "Status: INCOMPLETE (tournament aborted)")?;
    }
    Ok(())
}

fn rankings(f: &mut Formatter<'_>, report: &TournamentReport) -> fmt::Result {
    writeln!(f, "\nMATRIX RANKINGS")?;
    writeln!(f, "{}\n", "-".repeat(15))?;
    let heading = format!(
        "{:>4} {:<20} {:>10} {:>6} {:>6} {:>6} {:>6}",
        "Rank", "Matrix Label", "Win Rate", "Wins", "Losses", "Ties", "Total"
    );
    writeln!(f, "{}", heading)?;
    writeln!(f, "{}", "-".repeat(heading.len()))?;
    for s in report.rankings() {
        writeln!(
            f,
            "{:>4} {:<20} {:>10} {:>6} {:>6} {:>6} {:>6}",
            s.rank,
            s.label,
            percent(s.win_rate),
            s.wins,
            s.losses,
            s.ties,
            s.total_games
        )?;
    }
    Ok(())
}

fn matchup_details(f: &mut Formatter<'_>, m: &MatchupResult) -> fmt::Result {
    writeln!(f, "{}", m.label())?;
    writeln!(f, "{}", "-".repeat(40))?;
    writeln!(f, "Total Games: {}", m.total_games())?;
    for (label, wins, rate) in [
        (m.matrix1_label(), m.matrix1_wins(), m.matrix1_win_rate()),
        (m.matrix2_label(), m.matrix2_wins(), m.matrix2_win_rate()),
    ] {
        writeln!(f, "  {} Wins: {} ({})", label, wins, percent(rate))?;
    }
    writeln!(f, "  Ties: {} ({})", m.ties(), percent(m.tie_rate()))?;
    writeln!(f)?;
    writeln!(f, "Average Game Duration: {:.2} seconds", m.average_duration_secs())?;
    writeln!(f, "Average Moves per Game: {:.1}", m.average_move_count())?;
    writeln!(f, "First Player Advantage: {:+.3}", m.first_player_advantage())
}

fn analysis(f: &mut Formatter<'_>, report: &TournamentReport) -> fmt::Result {
    writeln!(f, "\nPERFORMANCE ANALYSIS")?;
    writeln!(f, "{}\n", "-".repeat(20))?;
    writeln!(
        f,
        "Overall First Player Advantage: {:+.3}",
        report.overall_first_player_advantage()
    )?;

    let rankings = report.rankings();
    if let (Some(best), Some(worst)) = (rankings.first(), rankings.last()) {
        for (title, standing) in [("Best", best), ("Lowest", worst)] {
            writeln!(f, "\n{} Performing Matrix:", title)?;
            writeln!(
                f,
                "  {} - {} win rate ({} wins)",
                standing.label,
                percent(standing.win_rate),
                standing.wins
            )?;
        }
    }

    let randomization = report.randomization_analysis();
    if randomization.enabled {
        writeln!(f, "\nRandomization Analysis:")?;
        writeln!(
            f,
            "  Games with randomization requested: {}",
            randomization.total_games_with_randomization.unwrap_or(0)
        )?;
        if let Some(note) = randomization.note {
            writeln!(f, "  Note: {}", note)?;
        }
    }
    Ok(())
}
