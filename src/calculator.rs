//! One calculation request
//!
//! Computes the pot volume, then runs the recommendation engine and the
//! similarity aggregator concurrently. Each half keeps its own outcome: an
//! unknown pot type fails the recommendation but still yields the
//! similarity report.

use std::sync::Arc;

use crate::data::{ReferenceData, Selection};
use crate::error::{CalcError, FetchError};
use crate::recommendation::{Recommendation, RecommendationEngine};
use crate::similarity::{SimilarityAggregator, SimilarityReport};
use crate::volume::pot_volume;

/// Everything computed for one selection
#[derive(Debug, Clone)]
pub struct Calculation {
    pub pot_volume: f64,
    pub recommendation: Result<Recommendation, CalcError>,
    pub similarity: Result<SimilarityReport, FetchError>,
}

impl Calculation {
    /// Both halves succeeded
    pub fn is_complete(&self) -> bool {
        self.recommendation.is_ok() && self.similarity.is_ok()
    }

    /// First data-loading failure of either half, if any
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match (&self.recommendation, &self.similarity) {
            (Err(CalcError::Fetch(e)), _) => Some(e),
            (_, Err(e)) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Calculator {
    data: Arc<ReferenceData>,
    engine: RecommendationEngine,
    aggregator: SimilarityAggregator,
}

impl Calculator {
    pub fn new(data: Arc<ReferenceData>) -> Self {
        Self {
            engine: RecommendationEngine::new(data.clone()),
            aggregator: SimilarityAggregator::new(data.clone()),
            data,
        }
    }

    pub fn data(&self) -> &Arc<ReferenceData> {
        &self.data
    }

    pub async fn calculate(&self, selection: Selection) -> Calculation {
        let volume = pot_volume(selection.pot_diameter, selection.pot_height);

        let (recommendation, similarity) = tokio::join!(
            self.engine.recommend(volume, &selection),
            self.aggregator.aggregate(volume, &selection)
        );

        if let Err(CalcError::Lookup(ref e)) = recommendation {
            tracing::warn!("Recommendation unavailable: {}", e);
        }

        Calculation {
            pot_volume: volume,
            recommendation,
            similarity,
        }
    }
}
