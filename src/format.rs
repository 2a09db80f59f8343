//! Human-readable number labels with magnitude suffixes.
//!
//! Used for legend labels, annotation text and y-axis ticks:
//! - `1_500.0` → `"1.5K"` (or `"2k"` with decimals off)
//! - `2_500_000_000.0` → `"2.5B"`
//! - `0.1234` → `"0.12"` (small magnitudes always keep two digits)

use serde::{Deserialize, Serialize};

/// Decimal settings shared by every formatted label of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Scaled values get `decimal_places` digits and uppercase suffixes when set;
    /// otherwise everything is rounded to integers with lowercase suffixes.
    pub decimals: bool,
    pub decimal_places: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: true,
            decimal_places: 1,
        }
    }
}

impl NumberFormat {
    pub fn new(decimals: bool, decimal_places: usize) -> Self {
        Self {
            decimals,
            decimal_places,
        }
    }

    pub fn format(&self, x: f64) -> String {
        clean_value(x, self.decimals, self.decimal_places)
    }

    /// Format with a literal prefix/suffix around the number (e.g. `"$"`, `"%"`).
    pub fn format_affixed(&self, x: f64, prefix: &str, suffix: &str) -> String {
        format!("{prefix}{}{suffix}", self.format(x))
    }
}

/// Magnitude thresholds, largest first, with upper/lower case suffixes.
const SCALES: [(f64, char, char); 4] = [
    (1.0e12, 'T', 't'),
    (1.0e9, 'B', 'b'),
    (1.0e6, 'M', 'm'),
    (1.0e3, 'K', 'k'),
];

/// Format one value.
///
/// Values with `|x| < 1` always render with exactly two decimals, regardless of
/// `decimals` and `decimal_places`.
pub fn clean_value(x: f64, decimals: bool, decimal_places: usize) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let a = x.abs();
    if a < 1.0 {
        return format!("{x:.2}");
    }
    let places = if decimals { decimal_places } else { 0 };
    for (scale, upper, lower) in SCALES {
        if a >= scale {
            let suffix = if decimals { upper } else { lower };
            return format!("{:.*}{}", places, x / scale, suffix);
        }
    }
    // 1 <= |x| < 1000, or NaN
    format!("{x:.places$}")
}

/// Element-wise [`clean_value`]; returns a new vector of the same length.
pub fn clean_values(xs: &[f64], decimals: bool, decimal_places: usize) -> Vec<String> {
    xs.iter()
        .map(|x| clean_value(*x, decimals, decimal_places))
        .collect()
}
