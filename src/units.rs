//! Presentation rounding shared by the report, the exports, and the CLI.
//!
//! Values are kept exact internally. Currency and energy are presented with two decimals and
//! rate fractions with four.

use serde::Serializer;

/// Number of decimals used for currency and energy values.
pub const MONEY_DECIMALS: i32 = 2;

/// Number of decimals used for rate fractions.
pub const RATE_DECIMALS: i32 = 4;

/// Rounds `value` half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Serializes a currency or energy value rounded to two decimals.
pub fn serialize_money<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, MONEY_DECIMALS))
}

/// Serializes a rate fraction rounded to four decimals.
pub fn serialize_rate<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, RATE_DECIMALS))
}
