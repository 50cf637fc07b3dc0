//! Integer-cent arithmetic and the loose money shapes external payloads use.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Money value as it arrives in external payloads: a decimal number or a
/// decimal string, always in major units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MoneyInput {
    Decimal(f64),
    Text(String),
}

impl MoneyInput {
    /// Converts the value to integer cents, rounding half away from zero at
    /// two decimal places. Invalid or non-finite input is treated as zero.
    pub fn to_cents(&self) -> i64 {
        match self {
            MoneyInput::Decimal(value) => decimal_to_cents(*value),
            MoneyInput::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map(decimal_to_cents)
                .unwrap_or(0),
        }
    }
}

/// Converts a decimal major-unit amount to integer cents, rounding half away
/// from zero at two decimal places.
pub fn decimal_to_cents(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let scaled = value * 100.0;
    if scaled >= 0.0 {
        (scaled + 0.5).floor() as i64
    } else {
        (scaled - 0.5).ceil() as i64
    }
}

/// Converts integer cents back to a major-unit decimal for reporting.
pub fn cents_to_major(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Whole calendar days from `today` until `date`; negative when in the past.
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}
