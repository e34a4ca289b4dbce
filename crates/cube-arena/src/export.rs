//! Writes a finished report in every requested format.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::report::TournamentReport;
use crate::tournament_config::OutputFormat;
use crate::{csv_output, json_output, text_output};

/// Errors that can occur while writing report files.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
}

/// `tournament_<YYYYmmdd_HHMMSS>` from the report's start time.
pub fn default_base_name(report: &TournamentReport) -> String {
    let stamp = report.started_at().unwrap_or_else(Utc::now);
    format!("tournament_{}", stamp.format("%Y%m%d_%H%M%S"))
}

/// Writes `report` into `dir` once per format and returns the files written.
///
/// `dir` is created if missing. File names start with `base_name`:
/// `<base>.json`, `<base>_{matchups,rankings,games,summary}.csv`,
/// `<base>.txt` and `<base>_summary.txt`.
pub fn write_reports(
    report: &TournamentReport,
    dir: &Path,
    base_name: &str,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>, OutputError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for format in formats {
        match format {
            OutputFormat::Json => {
                let path = dir.join(format!("{}.json", base_name));
                json_output::write_json(&path, report)?;
                written.push(path);
            }
            OutputFormat::Csv => {
                written.extend(csv_output::write_csv_reports(dir, base_name, report)?);
            }
            OutputFormat::Text => {
                let path = dir.join(format!("{}.txt", base_name));
                std::fs::write(&path, text_output::format_report(report))?;
                written.push(path);

                let path = dir.join(format!("{}_summary.txt", base_name));
                std::fs::write(&path, text_output::format_summary(report))?;
                written.push(path);
            }
        }
    }

    for path in &written {
        info!("Report written: {}", path.display());
    }
    Ok(written)
}
