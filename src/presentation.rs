//! Presentation adapter
//!
//! Turns a [`Calculation`] into the text of the form's named output regions,
//! and lists the names each selector offers. Region ids are the ones the
//! page has always used (`potSize`, `recommendedWater`, `lesswaterCount`,
//! ...), so a front end can assign each value by id.
//!
//! Data-loading failures are logged where they happen and leave the affected
//! regions unset. Lookup failures are reported in `errors` so the page can
//! show why the water and fertilizer regions are empty.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::calculator::Calculation;
use crate::data::{Datatype, ReferenceData};
use crate::error::{CalcError, FetchError};
use crate::similarity::WateringOutcome;
use crate::volume::pot_size_display;

pub mod region {
    pub const POT_SIZE: &str = "potSize";
    pub const RECOMMENDED_WATER: &str = "recommendedWater";
    pub const RECOMMENDED_FERTILIZER: &str = "recommendedFertilizer";
    pub const SIMILAR: &str = "similar";
}

/// Region id for one of a bucket's three values (`Count`, `GrowthAverage`,
/// `YieldAverage`)
pub fn bucket_region(outcome: WateringOutcome, field: &str) -> String {
    format!("{}{}", outcome.region_prefix(), field)
}

/// Text for each output region, plus user-facing error messages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputPanel {
    /// The output container is shown once the similarity statistics render
    pub visible: bool,
    pub regions: BTreeMap<String, String>,
    pub errors: Vec<String>,
}

impl OutputPanel {
    pub fn render(calculation: &Calculation) -> Self {
        let mut panel = OutputPanel::default();

        panel.set(region::POT_SIZE, pot_size_display(calculation.pot_volume));

        match &calculation.recommendation {
            Ok(rec) => {
                panel.set(region::RECOMMENDED_WATER, rec.water_display());
                panel.set(region::RECOMMENDED_FERTILIZER, rec.fertilizer_display());
            }
            Err(CalcError::Lookup(e)) => panel.errors.push(capitalize(&e.to_string())),
            Err(CalcError::Fetch(_)) => {}
        }

        if let Ok(report) = &calculation.similarity {
            panel.set(region::SIMILAR, report.similar_count.to_string());

            for outcome in WateringOutcome::ALL {
                let bucket = report.bucket(outcome);
                panel.set(&bucket_region(outcome, "Count"), bucket.count.to_string());
                panel.set(&bucket_region(outcome, "GrowthAverage"), bucket.growth_display());
                panel.set(&bucket_region(outcome, "YieldAverage"), bucket.yield_display());
            }
            panel.visible = true;
        }

        panel
    }

    pub fn get(&self, region: &str) -> Option<&str> {
        self.regions.get(region).map(|s| s.as_str())
    }

    fn set(&mut self, region: &str, text: String) {
        self.regions.insert(region.to_string(), text);
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Option lists for the three selectors, in table order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectorOptions {
    pub pot: Vec<String>,
    pub species: Vec<String>,
    pub season: Vec<String>,
}

impl SelectorOptions {
    pub async fn load(data: &ReferenceData) -> Result<Self, FetchError> {
        let (pot, species, season) = tokio::join!(
            owned_names(data, Datatype::Pot),
            owned_names(data, Datatype::Species),
            owned_names(data, Datatype::Season)
        );

        Ok(Self {
            pot: pot?,
            species: species?,
            season: season?,
        })
    }
}

async fn owned_names(data: &ReferenceData, datatype: Datatype) -> Result<Vec<String>, FetchError> {
    let names = data.option_names(datatype).await?;
    Ok(names.into_iter().map(str::to_string).collect())
}
