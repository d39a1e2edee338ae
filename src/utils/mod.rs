//! Utility modules shared across calculations
//!
//! - Display: fixed-point rendering of computed values

pub mod display;

// Re-export commonly used helpers
pub use display::{to_fixed, PLACEHOLDER};
