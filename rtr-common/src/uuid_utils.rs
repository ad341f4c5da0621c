//! UUID utilities

use crate::{Error, Result};
use uuid::Uuid;

/// Parse an entity id, mapping malformed input to `Error::Validation`
pub fn parse_id(kind: &str, s: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim())
        .map_err(|_| Error::Validation(format!("Malformed {} id: {:?}", kind, s)))
}
