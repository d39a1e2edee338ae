//! Display Utilities
//!
//! Fixed-point rendering for the values shown in the output regions.
//!
//! `format!("{:.N}")` rounds exact decimal ties to even (`0.25` → `"0.2"`),
//! while the form has always shown ties rounded away from zero (`"0.3"`).
//! `to_fixed` keeps the latter.

/// Shown in place of an average when a bucket is empty
pub const PLACEHOLDER: &str = "-";

/// Extra digits rendered to decide whether the value sits exactly on a tie.
/// Any f64 large enough to tie at display precision shows a non-zero digit
/// well within this window unless it is an exact tie.
const TIE_PROBE_DIGITS: usize = 30;

/// Render `value` with exactly `digits` decimals, ties rounded away from zero
///
/// Non-finite values render as `NaN`, `Infinity` and `-Infinity`. Negative
/// values keep their sign even when they round to zero (`-0.04` → `"-0.0"`).
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    let exact = format!("{:.*}", digits + TIE_PROBE_DIGITS, magnitude);
    let (head, probe) = exact.split_at(exact.len() - TIE_PROBE_DIGITS);
    let is_tie = probe.starts_with('5') && probe[1..].bytes().all(|b| b == b'0');

    let rounded = if is_tie {
        increment_last_digit(head.trim_end_matches('.'))
    } else {
        format!("{:.*}", digits, magnitude)
    };

    if value < 0.0 {
        format!("-{}", rounded)
    } else {
        rounded
    }
}

/// Add one unit in the last place of a plain decimal string ("0.29" → "0.30")
fn increment_last_digit(number: &str) -> String {
    let mut bytes = number.as_bytes().to_vec();

    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            _ => {
                bytes[i] += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }

    // Carried past the leading digit ("9.9" → "10.0")
    format!("1{}", String::from_utf8_lossy(&bytes))
}
