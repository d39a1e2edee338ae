//! Reference Data Loading and Caching
//!
//! Two datasets back every calculation:
//! - `constants.json`: coefficient rows for pot types, species and seasons
//! - `data.json`: historical grow cycles used for similarity statistics
//!
//! Both are fetched through a [`DataSource`] on first use and cached for the
//! lifetime of the [`ReferenceData`] that owns them. A failed fetch is logged
//! and leaves the cache empty, so the next call fetches again.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::FetchError;

/// Resource holding the coefficient table
pub const COEFFICIENTS_RESOURCE: &str = "constants.json";

/// Resource holding the historical grow records
pub const HISTORY_RESOURCE: &str = "data.json";

// ============================================================================
// Records
// ============================================================================

/// Which selector a coefficient row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Pot,
    Species,
    Season,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Pot => "pot",
            Datatype::Species => "species",
            Datatype::Season => "season",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the coefficient table
///
/// Pot rows use `datafield_1` as the pot factor. Season rows use
/// `datafield_1` as the water factor and `datafield_2` as the fertilizer
/// ratio. Pot and species rows usually omit `datafield_2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub datatype: Datatype,
    pub name: String,
    pub datafield_1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datafield_2: Option<f64>,
}

/// One past grow cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub pot_type: String,
    pub plant_type: String,
    pub time_of_year: String,
    pub pot_volume: f64,
    pub actual_water: f64,
    pub recommended_water: f64,
    pub growth_rate: f64,
    pub crop_yield: f64,
}

/// The user's choices for one calculation request
///
/// Serialized with the form's control names (`potType`, `potDiameter`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub pot_type: String,
    pub plant_type: String,
    pub season: String,
    pub pot_diameter: f64,
    pub pot_height: f64,
}

// ============================================================================
// Fetch boundary
// ============================================================================

/// Where the raw bytes of a named resource come from
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reads resources as files under a data directory
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for DirSource {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(resource);
        tracing::debug!("Reading {}", path.display());

        tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::Unavailable {
                resource: resource.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

/// Resources held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: FxHashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource: &str, body: impl Into<Vec<u8>>) -> Self {
        self.resources.insert(resource.to_string(), body.into());
        self
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>, FetchError> {
        self.resources
            .get(resource)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable {
                resource: resource.to_string(),
                reason: "resource not found".to_string(),
            })
    }
}

// ============================================================================
// Reference data store
// ============================================================================

/// Lazily loaded, write-once reference datasets
///
/// Shared behind an `Arc` by the recommendation engine and the similarity
/// aggregator. Concurrent first calls wait on the same cell, so each dataset
/// is fetched successfully at most once.
pub struct ReferenceData {
    source: Arc<dyn DataSource>,
    coefficients: OnceCell<Vec<CoefficientRow>>,
    history: OnceCell<Vec<HistoricalRecord>>,
}

impl ReferenceData {
    pub fn new(source: impl DataSource + 'static) -> Self {
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            coefficients: OnceCell::new(),
            history: OnceCell::new(),
        }
    }

    /// Store reading `constants.json` and `data.json` from `dir`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirSource::new(dir))
    }

    /// Coefficient table, fetched on first call
    pub async fn coefficients(&self) -> Result<&[CoefficientRow], FetchError> {
        self.coefficients
            .get_or_try_init(|| async {
                let rows: Vec<CoefficientRow> = self.load(COEFFICIENTS_RESOURCE).await?;
                warn_duplicate_names(&rows);
                tracing::info!("Loaded {} coefficient rows", rows.len());
                Ok::<_, FetchError>(rows)
            })
            .await
            .map(Vec::as_slice)
    }

    /// Historical grow records, fetched on first call
    pub async fn history(&self) -> Result<&[HistoricalRecord], FetchError> {
        self.history
            .get_or_try_init(|| async {
                let records: Vec<HistoricalRecord> = self.load(HISTORY_RESOURCE).await?;
                tracing::info!("Loaded {} historical records", records.len());
                Ok::<_, FetchError>(records)
            })
            .await
            .map(Vec::as_slice)
    }

    /// Names offered by one selector, in table order
    pub async fn option_names(&self, datatype: Datatype) -> Result<Vec<&str>, FetchError> {
        let rows = self.coefficients().await?;
        Ok(rows
            .iter()
            .filter(|row| row.datatype == datatype)
            .map(|row| row.name.as_str())
            .collect())
    }

    /// Load both datasets concurrently
    pub async fn warm_up(&self) -> Result<(), FetchError> {
        let (coefficients, history) = tokio::join!(self.coefficients(), self.history());
        coefficients?;
        history?;
        Ok(())
    }

    pub fn coefficients_cached(&self) -> bool {
        self.coefficients.initialized()
    }

    pub fn history_cached(&self) -> bool {
        self.history.initialized()
    }

    /// Fetch and decode a JSON array resource, logging any failure
    async fn load<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, FetchError> {
        let result = match self.source.fetch(resource).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed {
                resource: resource.to_string(),
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            tracing::error!("Error fetching reference data: {}", e);
        }
        result
    }
}

impl fmt::Debug for ReferenceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceData")
            .field("coefficients_cached", &self.coefficients_cached())
            .field("history_cached", &self.history_cached())
            .finish()
    }
}

/// Each `(datatype, name)` that occurs more than once, listed once in
/// order of its first repeat
pub fn duplicate_names(rows: &[CoefficientRow]) -> Vec<(Datatype, &str)> {
    let mut seen = FxHashSet::default();
    let mut reported = FxHashSet::default();
    let mut duplicates = Vec::new();

    for row in rows {
        let key = (row.datatype, row.name.as_str());
        if !seen.insert(key) && reported.insert(key) {
            duplicates.push(key);
        }
    }
    duplicates
}

/// Names are expected to be unique per datatype; lookups keep the last match
fn warn_duplicate_names(rows: &[CoefficientRow]) {
    for (datatype, name) in duplicate_names(rows) {
        tracing::warn!(
            "Duplicate {} '{}' in coefficient table; the last row wins",
            datatype,
            name
        );
    }
}
