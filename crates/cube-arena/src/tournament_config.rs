//! Tournament roster and parameters.
//!
//! A roster is loaded from a CSV file with a `label` column followed by the 25
//! weights of each matrix:
//!
//! ```text
//! label,w00,w01,...,w44
//! aggressive,0,-2,-4,...,0
//! defensive,1,0,3,...,-1
//! ```
//!
//! Validation collects every problem it finds instead of stopping at the first.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cube_core::WEIGHT_COUNT;
use serde::Serialize;
use thiserror::Error;

use crate::weight_matrix::WeightMatrix;

/// Fewest matrices a round robin needs.
pub const MIN_MATRICES: usize = 2;
/// Most matrices accepted in one tournament.
pub const MAX_MATRICES: usize = 50;
/// Most games per matrix per role in one pairing.
pub const MAX_ITERATIONS: u32 = 10_000;
/// Games per role per pairing when none is given.
pub const DEFAULT_ITERATIONS: u32 = 100;

const CSV_COLUMNS: usize = WEIGHT_COUNT + 1;

/// Errors that can occur when building a [`TournamentConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more validation problems, all reported together.
    #[error("invalid tournament configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
    #[error("failed to read roster file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ConfigError {
    /// The individual validation problems, empty for I/O and CSV failures.
    pub fn issues(&self) -> &[String] {
        match self {
            ConfigError::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

/// A report format to produce at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Csv, OutputFormat::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "text",
        }
    }

    /// Parses a comma-separated list such as `"json,text"`.
    ///
    /// Unknown, empty and duplicate entries are all reported.
    pub fn parse_list(list: &str) -> Result<Vec<OutputFormat>, ConfigError> {
        let mut formats = Vec::new();
        let mut issues = Vec::new();
        for name in list.split(',').map(str::trim) {
            match name.parse::<OutputFormat>() {
                Ok(format) if formats.contains(&format) => {
                    issues.push(format!("duplicate output format: {}", format))
                }
                Ok(format) => formats.push(format),
                Err(issue) => issues.push(issue),
            }
        }
        if formats.is_empty() && issues.is_empty() {
            issues.push("at least one output format must be specified".to_string());
        }
        if issues.is_empty() {
            Ok(formats)
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "text" => Ok(OutputFormat::Text),
            "" => Err("empty output format".to_string()),
            other => Err(format!(
                "invalid output format: {:?} (valid: csv, json, text)",
                other
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated tournament setup. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentConfig {
    matrices: Vec<WeightMatrix>,
    iterations_per_matchup: u32,
    randomization_enabled: bool,
    output_formats: Vec<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_path: Option<PathBuf>,
}

impl TournamentConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every problem: matrix count
    /// outside 2..=50, duplicate labels, iterations outside 1..=10000, no
    /// output formats or duplicate formats.
    pub fn new(
        matrices: Vec<WeightMatrix>,
        iterations_per_matchup: u32,
        randomization_enabled: bool,
        output_formats: Vec<OutputFormat>,
        source_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();
        check_matrices(&matrices, &mut issues);
        Self::validated(
            matrices,
            iterations_per_matchup,
            randomization_enabled,
            output_formats,
            source_path,
            issues,
        )
    }

    /// Adds the parameter checks to `issues` found so far and builds the
    /// configuration only if none were found.
    fn validated(
        matrices: Vec<WeightMatrix>,
        iterations_per_matchup: u32,
        randomization_enabled: bool,
        output_formats: Vec<OutputFormat>,
        source_path: Option<PathBuf>,
        mut issues: Vec<String>,
    ) -> Result<Self, ConfigError> {
        check_iterations(iterations_per_matchup, &mut issues);
        check_formats(&output_formats, &mut issues);
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }

        Ok(Self {
            matrices,
            iterations_per_matchup,
            randomization_enabled,
            output_formats,
            source_path,
        })
    }

    /// Loads the roster from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(
        path: P,
        iterations_per_matchup: u32,
        randomization_enabled: bool,
        output_formats: Vec<OutputFormat>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_roster(
            read_roster(file)?,
            iterations_per_matchup,
            randomization_enabled,
            output_formats,
            Some(path.to_path_buf()),
        )
    }

    /// Loads the roster from any CSV source.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        iterations_per_matchup: u32,
        randomization_enabled: bool,
        output_formats: Vec<OutputFormat>,
    ) -> Result<Self, ConfigError> {
        Self::from_roster(
            read_roster(reader)?,
            iterations_per_matchup,
            randomization_enabled,
            output_formats,
            None,
        )
    }

    /// Row problems, roster checks and parameter checks end up in one report.
    fn from_roster(
        roster: Roster,
        iterations_per_matchup: u32,
        randomization_enabled: bool,
        output_formats: Vec<OutputFormat>,
        source_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let Roster { matrices, mut issues } = roster;
        if matrices.is_empty() {
            if issues.is_empty() {
                issues.push("no weight matrices found in CSV file".to_string());
            }
        } else {
            check_matrices(&matrices, &mut issues);
        }
        Self::validated(
            matrices,
            iterations_per_matchup,
            randomization_enabled,
            output_formats,
            source_path,
            issues,
        )
    }

    pub fn matrices(&self) -> &[WeightMatrix] {
        &self.matrices
    }

    pub fn matrix_labels(&self) -> Vec<&str> {
        self.matrices.iter().map(WeightMatrix::label).collect()
    }

    pub fn iterations_per_matchup(&self) -> u32 {
        self.iterations_per_matchup
    }

    pub fn randomization_enabled(&self) -> bool {
        self.randomization_enabled
    }

    pub fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Every unordered pair `(matrices[i], matrices[j])` with `i < j`, in order.
    pub fn pairings(&self) -> Vec<(&WeightMatrix, &WeightMatrix)> {
        let mut pairs = Vec::with_capacity(self.matchup_count());
        for (i, first) in self.matrices.iter().enumerate() {
            for second in &self.matrices[i + 1..] {
                pairs.push((first, second));
            }
        }
        pairs
    }

    pub fn matchup_count(&self) -> usize {
        let n = self.matrices.len();
        n * n.saturating_sub(1) / 2
    }

    /// Games in a complete run: every pairing plays both role orders.
    pub fn total_games(&self) -> u64 {
        self.matchup_count() as u64 * 2 * u64::from(self.iterations_per_matchup)
    }
}

impl std::fmt::Display for TournamentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} matrices, {} iterations, {} total games",
            self.matrices.len(),
            self.iterations_per_matchup,
            self.total_games()
        )
    }
}

fn check_matrices(matrices: &[WeightMatrix], issues: &mut Vec<String>) {
    if matrices.len() < MIN_MATRICES {
        issues.push(format!(
            "tournament requires at least {} matrices, got {}",
            MIN_MATRICES,
            matrices.len()
        ));
    }
    if matrices.len() > MAX_MATRICES {
        issues.push(format!(
            "too many matrices ({}), maximum is {}",
            matrices.len(),
            MAX_MATRICES
        ));
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for matrix in matrices {
        if !seen.insert(matrix.label()) && !duplicates.contains(&matrix.label()) {
            duplicates.push(matrix.label());
        }
    }
    for label in duplicates {
        issues.push(format!("duplicate matrix label: {}", label));
    }
}

fn check_iterations(iterations: u32, issues: &mut Vec<String>) {
    if iterations == 0 {
        issues.push("iterations per matchup must be positive, got 0".to_string());
    }
    if iterations > MAX_ITERATIONS {
        issues.push(format!(
            "iterations per matchup too large ({}), maximum is {}",
            iterations, MAX_ITERATIONS
        ));
    }
}

fn check_formats(formats: &[OutputFormat], issues: &mut Vec<String>) {
    if formats.is_empty() {
        issues.push("at least one output format must be specified".to_string());
    }
    for format in OutputFormat::ALL {
        if formats.iter().filter(|&&f| f == format).count() > 1 {
            issues.push(format!("duplicate output format: {}", format));
        }
    }
}

/// Matrices parsed from a roster file and the row problems met on the way.
struct Roster {
    matrices: Vec<WeightMatrix>,
    issues: Vec<String>,
}

fn read_roster<R: Read>(reader: R) -> Result<Roster, ConfigError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut issues = Vec::new();
    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(Roster {
            matrices: Vec::new(),
            issues: vec!["CSV file is empty".to_string()],
        });
    }
    if headers.len() != CSV_COLUMNS {
        issues.push(format!(
            "header: expected {} columns (label + {} weights), got {}",
            CSV_COLUMNS,
            WEIGHT_COUNT,
            headers.len()
        ));
    }
    if !headers
        .get(0)
        .is_some_and(|first| first.trim().eq_ignore_ascii_case("label"))
    {
        issues.push(format!(
            "header: first column must be 'label', got {:?}",
            headers.get(0).unwrap_or_default()
        ));
    }

    let mut matrices = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record.position().map_or(0, |p| p.line());
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != CSV_COLUMNS {
            issues.push(format!(
                "row {}: expected {} columns, got {}",
                row,
                CSV_COLUMNS,
                record.len()
            ));
            continue;
        }

        let label = record.get(0).unwrap_or_default();
        let weights: Vec<&str> = record.iter().skip(1).collect();
        match WeightMatrix::from_csv_row(label, &weights) {
            Ok(matrix) => matrices.push(matrix),
            Err(e) => issues.push(format!("row {} (label {:?}): {}", row, label.trim(), e)),
        }
    }

    Ok(Roster { matrices, issues })
}
