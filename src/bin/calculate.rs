//! Run one pot calculation from the command line
//!
//! Prints the text of every output region of the form.
//!
//! Run with: cargo run --bin calculate -- <potType> <plantType> <season> <diameter> <height>
//! Reference data is read from `DATA_DIR` (default `public`).

use std::sync::Arc;

use anyhow::{bail, Result};
use pot_advisor::{
    parse_measurement, Calculator, OutputPanel, ReferenceData, Selection, ServerConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pot_advisor=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 5 {
        bail!("usage: calculate <potType> <plantType> <season> <diameter> <height>");
    }

    let selection = Selection {
        pot_type: args[0].clone(),
        plant_type: args[1].clone(),
        season: args[2].clone(),
        pot_diameter: parse_measurement(&args[3]),
        pot_height: parse_measurement(&args[4]),
    };
    if selection.pot_diameter.is_nan() || selection.pot_height.is_nan() {
        tracing::warn!("Non-numeric pot dimensions; sizes will show as NaN");
    }

    let config = ServerConfig::from_env();
    let calculator = Calculator::new(Arc::new(ReferenceData::from_dir(&config.data_dir)));

    let calculation = calculator.calculate(selection).await;
    if let Some(e) = calculation.fetch_error() {
        bail!("Reference data unavailable: {}", e);
    }

    let panel = OutputPanel::render(&calculation);
    for (region, text) in &panel.regions {
        println!("{:<24} {}", region, text);
    }
    for error in &panel.errors {
        eprintln!("error: {}", error);
    }

    Ok(())
}
