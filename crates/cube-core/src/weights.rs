//! The heuristic weight vector handed to the engine.
//!
//! The 25 values form a flattened 5x5 table: the row is the number of
//! first-mover marks on a winning line, the column the number of second-mover
//! marks on the same line.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of values in a weight vector.
pub const WEIGHT_COUNT: usize = 25;

/// Largest absolute value a single weight may take.
pub const WEIGHT_LIMIT: i32 = 1000;

/// Errors that can occur when building a weight vector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeightsError {
    #[error("expected exactly 25 weights, got {0}")]
    WrongCount(usize),

    #[error("weight {value} at position {index} is outside [-1000, 1000]")]
    OutOfRange { index: usize, value: i32 },

    #[error("invalid weight value {value:?} at position {index}")]
    InvalidValue { index: usize, value: String },
}

/// A validated vector of 25 integer weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct Weights([i32; WEIGHT_COUNT]);

impl Weights {
    /// Builds a weight vector, checking count and range.
    pub fn new(values: &[i32]) -> Result<Self, WeightsError> {
        if values.len() != WEIGHT_COUNT {
            return Err(WeightsError::WrongCount(values.len()));
        }
        let mut weights = [0; WEIGHT_COUNT];
        for (index, &value) in values.iter().enumerate() {
            if !(-WEIGHT_LIMIT..=WEIGHT_LIMIT).contains(&value) {
                return Err(WeightsError::OutOfRange { index, value });
            }
            weights[index] = value;
        }
        Ok(Self(weights))
    }

    /// Parses one textual value per weight, e.g. the cells of a CSV row.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, WeightsError> {
        if fields.len() != WEIGHT_COUNT {
            return Err(WeightsError::WrongCount(fields.len()));
        }
        let values = fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let field = field.as_ref().trim();
                field.parse::<i32>().map_err(|_| WeightsError::InvalidValue {
                    index,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&values)
    }

    pub fn values(&self) -> &[i32; WEIGHT_COUNT] {
        &self.0
    }

    /// Formats the weights as the single space-separated argument the engine expects.
    pub fn to_command_string(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Weights {
    type Err = WeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        Self::from_fields(&fields)
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<i32>> for Weights {
    type Error = WeightsError;

    fn try_from(values: Vec<i32>) -> Result<Self, Self::Error> {
        Self::new(&values)
    }
}

impl From<Weights> for Vec<i32> {
    fn from(weights: Weights) -> Self {
        weights.0.to_vec()
    }
}
