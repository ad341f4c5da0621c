//! Repositories over the shared SQLite store

pub mod deliveries;
pub mod payouts;
pub mod releases;
pub mod statements;
pub mod usage;

pub use deliveries::DeliveryRepository;
pub use payouts::PayoutRepository;
pub use releases::ReleaseRepository;
pub use statements::StatementRepository;
pub use usage::{SqliteUsageSource, UsageSource};

use rtr_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a JSON document column. Corrupt rows are internal faults.
fn from_json<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", column, e)))
}

fn stored_uuid(column: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| Error::Internal(format!("Invalid {} {:?} in database: {}", column, raw, e)))
}

/// Parse a stored enum value. Corrupt rows are internal faults.
fn stored_enum<T: FromStr<Err = Error>>(column: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|e: Error| Error::Internal(format!("Invalid {} in database: {}", column, e)))
}
