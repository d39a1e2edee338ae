//! Similarity Aggregator
//!
//! Finds historical grow cycles comparable to the current selection and
//! summarises how they turned out, grouped by how closely the grower
//! followed the recommended amount of water.
//!
//! A record is similar when its pot type, plant type and season match the
//! selection exactly and its pot volume lies strictly inside ±10% of the
//! current volume. Similar records are bucketed by `actual_water` against
//! the record's own `recommended_water`:
//!
//! | bucket   | predicate                                   |
//! |----------|---------------------------------------------|
//! | adequate | `actual > rec × 0.9 && actual < rec × 1.1`  |
//! | under    | `actual <= rec × 0.9`                       |
//! | over     | `actual >= rec × 1.1`                       |

use std::sync::Arc;

use serde::Serialize;

use crate::data::{HistoricalRecord, ReferenceData, Selection};
use crate::error::FetchError;
use crate::utils::{to_fixed, PLACEHOLDER};

const LOWER_BAND: f64 = 0.9;
const UPPER_BAND: f64 = 1.1;

/// Categorical match plus a strict ±10% volume band
pub fn is_similar(record: &HistoricalRecord, pot_volume: f64, selection: &Selection) -> bool {
    record.pot_type == selection.pot_type
        && record.plant_type == selection.plant_type
        && record.time_of_year == selection.season
        && record.pot_volume > pot_volume * LOWER_BAND
        && record.pot_volume < pot_volume * UPPER_BAND
}

/// How a past grow cycle's watering compared to its recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WateringOutcome {
    Under,
    Adequate,
    Over,
}

impl WateringOutcome {
    pub const ALL: [WateringOutcome; 3] = [
        WateringOutcome::Adequate,
        WateringOutcome::Under,
        WateringOutcome::Over,
    ];

    /// Adequate is tested first, then under; whatever is left is over.
    ///
    /// For a non-negative recommendation this is exactly the three bucket
    /// predicates. When the recommendation is zero or negative the inclusive
    /// under/over predicates overlap, and the record is counted as under.
    pub fn classify(actual_water: f64, recommended_water: f64) -> Self {
        let lower = recommended_water * LOWER_BAND;
        let upper = recommended_water * UPPER_BAND;

        if actual_water > lower && actual_water < upper {
            WateringOutcome::Adequate
        } else if actual_water <= lower {
            WateringOutcome::Under
        } else {
            WateringOutcome::Over
        }
    }

    /// Id prefix of the bucket's output regions on the form
    pub fn region_prefix(&self) -> &'static str {
        match self {
            WateringOutcome::Adequate => "similarwater",
            WateringOutcome::Under => "lesswater",
            WateringOutcome::Over => "morewater",
        }
    }
}

/// Count and running sums for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateBucket {
    pub count: usize,
    pub sum_growth: f64,
    pub sum_yield: f64,
}

impl AggregateBucket {
    fn add(&mut self, record: &HistoricalRecord) {
        self.count += 1;
        self.sum_growth += record.growth_rate;
        self.sum_yield += record.crop_yield;
    }

    pub fn mean_growth(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_growth / self.count as f64)
    }

    pub fn mean_yield(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_yield / self.count as f64)
    }

    /// Mean growth to one decimal, or `"-"` for an empty bucket
    pub fn growth_display(&self) -> String {
        display_mean(self.mean_growth())
    }

    /// Mean yield to one decimal, or `"-"` for an empty bucket
    pub fn yield_display(&self) -> String {
        display_mean(self.mean_yield())
    }
}

fn display_mean(mean: Option<f64>) -> String {
    mean.map(|m| to_fixed(m, 1))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Statistics over the similar records of one selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimilarityReport {
    pub similar_count: usize,
    pub adequate: AggregateBucket,
    pub under: AggregateBucket,
    pub over: AggregateBucket,
}

impl SimilarityReport {
    pub fn bucket(&self, outcome: WateringOutcome) -> &AggregateBucket {
        match outcome {
            WateringOutcome::Adequate => &self.adequate,
            WateringOutcome::Under => &self.under,
            WateringOutcome::Over => &self.over,
        }
    }

    fn bucket_mut(&mut self, outcome: WateringOutcome) -> &mut AggregateBucket {
        match outcome {
            WateringOutcome::Adequate => &mut self.adequate,
            WateringOutcome::Under => &mut self.under,
            WateringOutcome::Over => &mut self.over,
        }
    }
}

/// One pass over the records: filter, classify, accumulate
pub fn aggregate(
    records: &[HistoricalRecord],
    pot_volume: f64,
    selection: &Selection,
) -> SimilarityReport {
    let mut report = SimilarityReport::default();

    for record in records.iter().filter(|r| is_similar(r, pot_volume, selection)) {
        report.similar_count += 1;
        let outcome = WateringOutcome::classify(record.actual_water, record.recommended_water);
        report.bucket_mut(outcome).add(record);
    }

    report
}

/// Similarity aggregator bound to the shared reference data
#[derive(Debug, Clone)]
pub struct SimilarityAggregator {
    data: Arc<ReferenceData>,
}

impl SimilarityAggregator {
    pub fn new(data: Arc<ReferenceData>) -> Self {
        Self { data }
    }

    pub async fn aggregate(
        &self,
        pot_volume: f64,
        selection: &Selection,
    ) -> Result<SimilarityReport, FetchError> {
        let records = self.data.history().await?;
        let report = aggregate(records, pot_volume, selection);

        tracing::debug!(
            "{} similar records ({} adequate, {} under, {} over)",
            report.similar_count,
            report.adequate.count,
            report.under.count,
            report.over.count
        );
        Ok(report)
    }
}
