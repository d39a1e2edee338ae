//! Pot Advisor
//!
//! Watering and fertilizer advice for potted plants, backed by two reference
//! datasets: a coefficient table (pot types, species, seasons) and a log of
//! historical grow cycles.
//!
//! Module layout, leaf-first:
//! - `data`: Reference datasets, the fetch boundary and the write-once caches
//! - `volume`: Pot volume from diameter and height
//! - `recommendation`: Coefficient lookup and water/fertilizer amounts
//! - `similarity`: Similar historical records bucketed by watering outcome
//! - `calculator`: One calculation request (engine + aggregator concurrently)
//! - `presentation`: Output regions and selector options for the form
//! - `api_server`: Axum HTTP surface (feature `api`)

pub mod utils;
pub mod error;
pub mod config;
pub mod data;
pub mod volume;
pub mod recommendation;
pub mod similarity;
pub mod calculator;
pub mod presentation;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use error::{CalcError, FetchError, LookupError};
pub use config::ServerConfig;
pub use data::{
    CoefficientRow, DataSource, Datatype, DirSource, HistoricalRecord, MemorySource,
    ReferenceData, Selection,
};
pub use volume::{parse_measurement, pot_size_display, pot_volume};
pub use recommendation::{Recommendation, RecommendationEngine};
pub use similarity::{AggregateBucket, SimilarityAggregator, SimilarityReport, WateringOutcome};
pub use calculator::{Calculation, Calculator};
pub use presentation::{OutputPanel, SelectorOptions};

#[cfg(feature = "api")]
pub use api_server::{AppState, create_router};
