//! Labeled weight configurations that compete in a tournament.

use cube_core::{Weights, WeightsError};
use serde::Serialize;
use thiserror::Error;

/// Longest label accepted, in characters.
pub const MAX_LABEL_LEN: usize = 50;

const FORBIDDEN_LABEL_CHARS: [char; 5] = [',', '"', '\n', '\r', '\t'];

/// Errors that can occur when building a [`WeightMatrix`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeightMatrixError {
    #[error("label cannot be empty")]
    EmptyLabel,
    #[error("label {label:?} is {len} characters long, maximum is 50")]
    LabelTooLong { label: String, len: usize },
    #[error("label {label:?} contains invalid character {found:?} (comma, quote, newline or tab)")]
    LabelInvalidChar { label: String, found: char },
    #[error(transparent)]
    Weights(#[from] WeightsError),
}

/// A named weight vector identifying one competitor.
///
/// Equality is decided by the label alone.
#[derive(Debug, Clone, Serialize)]
pub struct WeightMatrix {
    label: String,
    weights: Weights,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl WeightMatrix {
    /// Creates a matrix after trimming and validating the label.
    pub fn new(label: &str, weights: Weights) -> Result<Self, WeightMatrixError> {
        let label = validate_label(label)?;
        Ok(Self {
            label,
            weights,
            description: None,
        })
    }

    /// Creates a matrix from raw integers.
    pub fn from_values(label: &str, values: &[i32]) -> Result<Self, WeightMatrixError> {
        Self::new(label, Weights::new(values)?)
    }

    /// Creates a matrix from the textual cells of a CSV row.
    pub fn from_csv_row<S: AsRef<str>>(
        label: &str,
        fields: &[S],
    ) -> Result<Self, WeightMatrixError> {
        Self::new(label, Weights::from_fields(fields)?)
    }

    /// Attaches a description. Blank descriptions are dropped.
    pub fn with_description(mut self, description: &str) -> Self {
        let description = description.trim();
        self.description = (!description.is_empty()).then(|| description.to_string());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for WeightMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for WeightMatrix {}

impl std::fmt::Display for WeightMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} - {}", self.label, description),
            None => write!(f, "{}", self.label),
        }
    }
}

fn validate_label(label: &str) -> Result<String, WeightMatrixError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(WeightMatrixError::EmptyLabel);
    }
    if let Some(found) = label.chars().find(|c| FORBIDDEN_LABEL_CHARS.contains(c)) {
        return Err(WeightMatrixError::LabelInvalidChar {
            label: label.to_string(),
            found,
        });
    }
    let len = label.chars().count();
    if len > MAX_LABEL_LEN {
        return Err(WeightMatrixError::LabelTooLong {
            label: label.to_string(),
            len,
        });
    }
    Ok(label.to_string())
}
