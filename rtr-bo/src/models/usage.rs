//! Normalized usage (consumption) records

use chrono::NaiveDate;
use rtr_common::{Error, Money, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Streams and revenue for one track, source and territory on one day
///
/// Missing numeric fields read as zero. Negative stream counts are clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub artist_id: String,
    pub release_id: String,
    pub track_id: String,
    #[serde(default)]
    pub track_title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub territory: String,
    #[serde(default, deserialize_with = "deserialize_streams")]
    pub streams: u64,
    #[serde(default, deserialize_with = "deserialize_revenue")]
    pub revenue: Money,
    pub usage_date: NaiveDate,
}

fn deserialize_streams<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(clamp_streams(raw))
}

fn deserialize_revenue<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Money, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(Money::from_decimal).unwrap_or(Money::ZERO))
}

/// Coerce a raw stream count: missing, negative or non-finite become zero
pub fn clamp_streams(raw: Option<f64>) -> u64 {
    match raw {
        Some(value) if value.is_finite() && value > 0.0 => value.round() as u64,
        _ => 0,
    }
}

/// Inclusive date range used to query usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl UsageWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(Error::Validation(format!(
                "Period start {} must be before period end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
