//! Error types for pot calculations
//!
//! Fetch failures and lookup failures are scoped to a single calculation;
//! neither is fatal to the process. Aggregation has no error type: an empty
//! match set is a valid result.

use thiserror::Error;

use crate::data::Datatype;

/// A reference dataset could not be fetched or decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The resource could not be read (missing file, I/O failure)
    #[error("failed to fetch {resource}: {reason}")]
    Unavailable { resource: String, reason: String },

    /// The resource was read but is not the expected JSON structure
    #[error("failed to parse {resource}: {reason}")]
    Malformed { resource: String, reason: String },
}

impl FetchError {
    pub fn resource(&self) -> &str {
        match self {
            FetchError::Unavailable { resource, .. } | FetchError::Malformed { resource, .. } => {
                resource
            }
        }
    }
}

/// The coefficient table cannot serve a selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// A selected name has no row
    #[error("no {datatype} named '{name}' in the coefficient table")]
    NotFound { datatype: Datatype, name: String },

    /// The season row carries no `datafield_2`
    #[error("season '{name}' has no fertilizer ratio in the coefficient table")]
    MissingFertilizerRatio { name: String },
}

impl LookupError {
    pub fn not_found(datatype: Datatype, name: &str) -> Self {
        LookupError::NotFound {
            datatype,
            name: name.to_string(),
        }
    }

    pub fn missing_fertilizer_ratio(season: &str) -> Self {
        LookupError::MissingFertilizerRatio {
            name: season.to_string(),
        }
    }
}

/// Failure of the recommendation half of a calculation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
