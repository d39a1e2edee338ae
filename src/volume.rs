//! Pot volume from diameter and height
//!
//! Pots are treated as cylinders. Inputs are not validated: negative or NaN
//! dimensions flow straight through into the volume.

use std::f64::consts::PI;

use crate::utils::to_fixed;

/// Cylinder volume `π × (diameter / 2)² × height`, in cubic units of the inputs
pub fn pot_volume(diameter: f64, height: f64) -> f64 {
    let radius = diameter / 2.0;
    PI * radius.powi(2) * height
}

/// Read a typed dimension the way a browser number field is read
///
/// Leading whitespace is skipped and the longest numeric prefix is used, so
/// `"15cm"` reads as `15.0`. Input with no numeric prefix reads as NaN.
pub fn parse_measurement(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    let candidate = &trimmed[..end];

    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Pot size region: volume in cm³ shown as litres with one decimal
pub fn pot_size_display(volume: f64) -> String {
    to_fixed(volume / 1000.0, 1)
}
