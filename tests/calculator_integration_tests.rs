// Calculator Integration Tests
//
// Purpose: End-to-end calculations against instrumented data sources
//   - fetch boundary call counts (cache hits, failed fetches retried)
//   - recommendation and similarity outputs for realistic datasets
// Run with: cargo test --test calculator_integration_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pot_advisor::data::{COEFFICIENTS_RESOURCE, HISTORY_RESOURCE};
use pot_advisor::{
    Calculator, CalcError, DataSource, FetchError, MemorySource, OutputPanel, ReferenceData,
    Selection, WateringOutcome,
};

const CONSTANTS: &str = r#"[
    {"datatype": "pot", "name": "clay", "datafield_1": 2},
    {"datatype": "pot", "name": "plastic", "datafield_1": 1.5},
    {"datatype": "species", "name": "tomato", "datafield_1": 1.0},
    {"datatype": "species", "name": "basil", "datafield_1": 0.7},
    {"datatype": "season", "name": "summer", "datafield_1": 3, "datafield_2": 0.5},
    {"datatype": "season", "name": "winter", "datafield_1": 1, "datafield_2": 0.25}
]"#;

const HISTORY: &str = r#"[
    {"pot_type": "clay", "plant_type": "tomato", "time_of_year": "summer", "pot_volume": 4700,
     "actual_water": 2.8, "recommended_water": 2.8, "growth_rate": 1.4, "crop_yield": 3.0},
    {"pot_type": "clay", "plant_type": "tomato", "time_of_year": "summer", "pot_volume": 4500,
     "actual_water": 2.7, "recommended_water": 2.6, "growth_rate": 1.6, "crop_yield": 3.4},
    {"pot_type": "clay", "plant_type": "tomato", "time_of_year": "summer", "pot_volume": 5000,
     "actual_water": 1.5, "recommended_water": 3.0, "growth_rate": 0.9, "crop_yield": 1.8},
    {"pot_type": "clay", "plant_type": "tomato", "time_of_year": "summer", "pot_volume": 4400,
     "actual_water": 4.0, "recommended_water": 2.6, "growth_rate": 1.1, "crop_yield": 2.1},
    {"pot_type": "clay", "plant_type": "tomato", "time_of_year": "summer", "pot_volume": 9000,
     "actual_water": 5.4, "recommended_water": 5.4, "growth_rate": 2.0, "crop_yield": 6.0},
    {"pot_type": "plastic", "plant_type": "tomato", "time_of_year": "summer", "pot_volume": 4700,
     "actual_water": 2.1, "recommended_water": 2.1, "growth_rate": 1.3, "crop_yield": 2.9},
    {"pot_type": "clay", "plant_type": "basil", "time_of_year": "winter", "pot_volume": 4700,
     "actual_water": 0.5, "recommended_water": 0.5, "growth_rate": 0.4, "crop_yield": 0.2}
]"#;

/// Counts fetches per resource; fails the first `failures` fetches
struct CountingSource {
    inner: MemorySource,
    failures: usize,
    calls: AtomicUsize,
    coefficient_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl CountingSource {
    fn new(inner: MemorySource) -> Self {
        Self::failing_first(inner, 0)
    }

    fn failing_first(inner: MemorySource, failures: usize) -> Self {
        Self {
            inner,
            failures,
            calls: AtomicUsize::new(0),
            coefficient_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DataSource for CountingSource {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>, FetchError> {
        match resource {
            COEFFICIENTS_RESOURCE => self.coefficient_calls.fetch_add(1, Ordering::SeqCst),
            HISTORY_RESOURCE => self.history_calls.fetch_add(1, Ordering::SeqCst),
            _ => 0,
        };

        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(FetchError::Unavailable {
                resource: resource.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.inner.fetch(resource).await
    }
}

fn full_source() -> MemorySource {
    MemorySource::new()
        .with_resource(COEFFICIENTS_RESOURCE, CONSTANTS)
        .with_resource(HISTORY_RESOURCE, HISTORY)
}

fn selection(
    pot_type: &str,
    plant_type: &str,
    season: &str,
    diameter: f64,
    height: f64,
) -> Selection {
    Selection {
        pot_type: pot_type.to_string(),
        plant_type: plant_type.to_string(),
        season: season.to_string(),
        pot_diameter: diameter,
        pot_height: height,
    }
}

// =========================================================================
// Section 1: Fetch boundary and caching
// =========================================================================

#[tokio::test]
async fn test_repeat_calculations_fetch_once() {
    let source = Arc::new(CountingSource::new(full_source()));
    let data = Arc::new(ReferenceData::with_source(source.clone()));
    let calculator = Calculator::new(data);

    for _ in 0..5 {
        let calc = calculator
            .calculate(selection("clay", "tomato", "summer", 20.0, 15.0))
            .await;
        assert!(calc.is_complete());
    }

    assert_eq!(source.coefficient_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_first_calls_fetch_once() {
    let source = Arc::new(CountingSource::new(full_source()));
    let data = Arc::new(ReferenceData::with_source(source.clone()));
    let calculator = Arc::new(Calculator::new(data));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let calculator = calculator.clone();
        handles.push(tokio::spawn(async move {
            calculator
                .calculate(selection("clay", "tomato", "summer", 20.0, 15.0))
                .await
                .is_complete()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    assert_eq!(source.coefficient_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_fetch_is_retried_on_next_call() {
    let source = Arc::new(CountingSource::failing_first(full_source(), 1));
    let data = ReferenceData::with_source(source.clone());

    let first = data.coefficients().await;
    assert!(matches!(first, Err(FetchError::Unavailable { .. })));
    assert!(!data.coefficients_cached());

    let second = data.coefficients().await.unwrap();
    assert_eq!(second.len(), 6);
    assert!(data.coefficients_cached());

    // Cached from here on
    data.coefficients().await.unwrap();
    assert_eq!(source.coefficient_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_warm_up_loads_both_datasets() {
    let source = Arc::new(CountingSource::new(full_source()));
    let data = ReferenceData::with_source(source.clone());

    data.warm_up().await.unwrap();
    assert!(data.coefficients_cached());
    assert!(data.history_cached());

    data.history().await.unwrap();
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Section 2: Calculation results
// =========================================================================

#[tokio::test]
async fn test_end_to_end_recommendation() {
    let data = Arc::new(ReferenceData::new(MemorySource::new().with_resource(
        COEFFICIENTS_RESOURCE,
        r#"[
            {"datatype": "pot", "name": "clay", "datafield_1": 2},
            {"datatype": "species", "name": "tomato", "datafield_1": 1},
            {"datatype": "season", "name": "summer", "datafield_1": 3, "datafield_2": 0.5}
        ]"#,
    )));

    let engine = pot_advisor::RecommendationEngine::new(data);
    let rec = engine
        .recommend(1000.0, &selection("clay", "tomato", "summer", 0.0, 0.0))
        .await
        .unwrap();

    assert_eq!(rec.water_display(), "0.6 liters");
    assert_eq!(rec.fertilizer_display(), "0.30 units");
}

#[tokio::test]
async fn test_similarity_statistics() {
    let calculator = Calculator::new(Arc::new(ReferenceData::new(full_source())));

    // 20 × 15 pot ≈ 4712 cm³, band (4241, 5184)
    let calc = calculator
        .calculate(selection("clay", "tomato", "summer", 20.0, 15.0))
        .await;
    let report = calc.similarity.unwrap();

    assert_eq!(report.similar_count, 4);
    assert_eq!(report.bucket(WateringOutcome::Adequate).count, 2);
    assert_eq!(report.bucket(WateringOutcome::Under).count, 1);
    assert_eq!(report.bucket(WateringOutcome::Over).count, 1);
    assert_eq!(report.adequate.growth_display(), "1.5");
    assert_eq!(report.adequate.yield_display(), "3.2");
    assert_eq!(report.under.growth_display(), "0.9");
    assert_eq!(report.over.yield_display(), "2.1");
}

#[tokio::test]
async fn test_no_similar_records() {
    let calculator = Calculator::new(Arc::new(ReferenceData::new(full_source())));

    let calc = calculator
        .calculate(selection("plastic", "basil", "winter", 20.0, 15.0))
        .await;
    let panel = OutputPanel::render(&calc);

    assert_eq!(panel.get("similar"), Some("0"));
    for prefix in ["similarwater", "lesswater", "morewater"] {
        assert_eq!(panel.get(&format!("{prefix}Count")), Some("0"));
        assert_eq!(panel.get(&format!("{prefix}GrowthAverage")), Some("-"));
        assert_eq!(panel.get(&format!("{prefix}YieldAverage")), Some("-"));
    }
}

#[tokio::test]
async fn test_unknown_season_still_reports_similarity() {
    let calculator = Calculator::new(Arc::new(ReferenceData::new(full_source())));

    let calc = calculator
        .calculate(selection("clay", "tomato", "monsoon", 20.0, 15.0))
        .await;

    assert!(matches!(calc.recommendation, Err(CalcError::Lookup(_))));

    let panel = OutputPanel::render(&calc);
    assert!(panel.visible);
    assert_eq!(panel.get("recommendedWater"), None);
    assert_eq!(panel.get("similar"), Some("0"));
    assert_eq!(panel.errors.len(), 1);
}

#[tokio::test]
async fn test_full_panel_for_sample_selection() {
    let calculator = Calculator::new(Arc::new(ReferenceData::new(full_source())));

    let calc = calculator
        .calculate(selection("clay", "tomato", "summer", 20.0, 15.0))
        .await;
    let panel = OutputPanel::render(&calc);

    assert_eq!(panel.get("potSize"), Some("4.7"));
    // 4712.39 × 0.0001 × 2 × 3 = 2.827
    assert_eq!(panel.get("recommendedWater"), Some("2.8 liters"));
    assert_eq!(panel.get("recommendedFertilizer"), Some("1.41 units"));
    assert_eq!(panel.get("similar"), Some("4"));
    assert_eq!(panel.get("similarwaterCount"), Some("2"));
    assert_eq!(panel.get("lesswaterCount"), Some("1"));
    assert_eq!(panel.get("morewaterCount"), Some("1"));
}

#[tokio::test]
async fn test_season_without_fertilizer_ratio_is_reported() {
    let constants = r#"[
        {"datatype": "pot", "name": "clay", "datafield_1": 2},
        {"datatype": "species", "name": "tomato", "datafield_1": 1},
        {"datatype": "season", "name": "summer", "datafield_1": 3}
    ]"#;
    let calculator = Calculator::new(Arc::new(ReferenceData::new(
        MemorySource::new()
            .with_resource(COEFFICIENTS_RESOURCE, constants)
            .with_resource(HISTORY_RESOURCE, HISTORY),
    )));

    let calc = calculator
        .calculate(selection("clay", "tomato", "summer", 20.0, 15.0))
        .await;
    assert!(matches!(calc.recommendation, Err(CalcError::Lookup(_))));

    let panel = OutputPanel::render(&calc);
    assert_eq!(panel.get("recommendedFertilizer"), None);
    assert_eq!(panel.get("recommendedWater"), None);
    assert_eq!(
        panel.errors,
        vec!["Season 'summer' has no fertilizer ratio in the coefficient table".to_string()]
    );
    // Similarity does not depend on the coefficient table
    assert_eq!(panel.get("similar"), Some("4"));
}

// =========================================================================
// Section 3: Bundled sample data
// =========================================================================

#[tokio::test]
async fn test_sample_data_directory_loads() {
    let data = ReferenceData::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/public"));

    data.warm_up().await.unwrap();

    let pots = data.option_names(pot_advisor::Datatype::Pot).await.unwrap();
    assert!(pots.contains(&"Clay"));
    assert!(!data.history().await.unwrap().is_empty());
}
