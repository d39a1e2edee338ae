//! Recommendation Engine
//!
//! Looks up the coefficient rows for the selected pot type, species and
//! season, then derives the recommended water and fertilizer amounts:
//!
//! ```text
//! water      = volume × 0.0001 × pot.datafield_1 × season.datafield_1
//! fertilizer = water × season.datafield_2
//! ```
//!
//! The species row must exist but does not enter the formula. The season
//! row must carry `datafield_2`.

use std::sync::Arc;

use serde::Serialize;

use crate::data::{CoefficientRow, Datatype, ReferenceData, Selection};
use crate::error::{CalcError, LookupError};
use crate::utils::to_fixed;

/// Converts cm³ of pot volume into litres of water per unit of coefficient
pub const WATER_PER_VOLUME: f64 = 0.0001;

/// The three coefficient rows a selection resolves to
#[derive(Debug, Clone, Copy)]
pub struct MatchedCoefficients<'a> {
    pub pot: &'a CoefficientRow,
    pub species: &'a CoefficientRow,
    pub season: &'a CoefficientRow,
    /// The season row's `datafield_2`
    pub fertilizer_ratio: f64,
}

/// Resolve the selection's names in a single pass over the table
///
/// If a name appears more than once for a datatype, the last row wins.
/// Missing rows are reported in the order pot, species, season, followed by
/// a season row without a fertilizer ratio.
pub fn match_coefficients<'a>(
    rows: &'a [CoefficientRow],
    selection: &Selection,
) -> Result<MatchedCoefficients<'a>, LookupError> {
    let mut pot = None;
    let mut species = None;
    let mut season = None;

    for row in rows {
        match row.datatype {
            Datatype::Pot if row.name == selection.pot_type => pot = Some(row),
            Datatype::Species if row.name == selection.plant_type => species = Some(row),
            Datatype::Season if row.name == selection.season => season = Some(row),
            _ => {}
        }
    }

    let pot = pot.ok_or_else(|| LookupError::not_found(Datatype::Pot, &selection.pot_type))?;
    let species = species
        .ok_or_else(|| LookupError::not_found(Datatype::Species, &selection.plant_type))?;
    let season =
        season.ok_or_else(|| LookupError::not_found(Datatype::Season, &selection.season))?;
    let fertilizer_ratio = season
        .datafield_2
        .ok_or_else(|| LookupError::missing_fertilizer_ratio(&season.name))?;

    Ok(MatchedCoefficients {
        pot,
        species,
        season,
        fertilizer_ratio,
    })
}

/// Recommended amounts for one pot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    /// Litres of water
    pub water: f64,
    /// Fertilizer units
    pub fertilizer: f64,
}

impl Recommendation {
    pub fn from_coefficients(pot_volume: f64, matched: &MatchedCoefficients<'_>) -> Self {
        let water =
            pot_volume * WATER_PER_VOLUME * matched.pot.datafield_1 * matched.season.datafield_1;
        let fertilizer = water * matched.fertilizer_ratio;
        Self { water, fertilizer }
    }

    /// e.g. `"0.6 liters"`
    pub fn water_display(&self) -> String {
        format!("{} liters", to_fixed(self.water, 1))
    }

    /// e.g. `"0.30 units"`
    pub fn fertilizer_display(&self) -> String {
        format!("{} units", to_fixed(self.fertilizer, 2))
    }
}

/// Lookup plus formula against an already loaded coefficient table
pub fn recommend(
    rows: &[CoefficientRow],
    pot_volume: f64,
    selection: &Selection,
) -> Result<Recommendation, LookupError> {
    let matched = match_coefficients(rows, selection)?;
    Ok(Recommendation::from_coefficients(pot_volume, &matched))
}

/// Recommendation engine bound to the shared reference data
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    data: Arc<ReferenceData>,
}

impl RecommendationEngine {
    pub fn new(data: Arc<ReferenceData>) -> Self {
        Self { data }
    }

    pub async fn recommend(
        &self,
        pot_volume: f64,
        selection: &Selection,
    ) -> Result<Recommendation, CalcError> {
        let rows = self.data.coefficients().await?;
        Ok(recommend(rows, pot_volume, selection)?)
    }
}
