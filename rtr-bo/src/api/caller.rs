//! Caller identity extraction
//!
//! The gateway authorizes each request and forwards the caller in
//! `X-Caller-Id` (plus an optional `X-Artist-Scope`). Mutating handlers take a
//! `Caller` argument; requests without the header are rejected with 401.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::models::Caller;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const ARTIST_SCOPE_HEADER: &str = "x-artist-scope";

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, CALLER_ID_HEADER).ok_or_else(|| {
            ApiError::Unauthenticated(format!("Missing {} header", CALLER_ID_HEADER))
        })?;

        Ok(Caller::new(id, header_value(parts, ARTIST_SCOPE_HEADER)))
    }
}
