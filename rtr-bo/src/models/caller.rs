//! Caller identity handed over by the authorization layer

use serde::Serialize;
use std::fmt;

/// Already-authenticated caller of a mutating operation
///
/// The gateway resolves permissions before the request reaches the core. The
/// core only records who acted; it never re-derives what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub id: String,
    /// Artist/organization scope the caller was authorized for, if any
    pub artist_scope: Option<String>,
}

impl Caller {
    pub fn new(id: impl Into<String>, artist_scope: Option<String>) -> Self {
        Self {
            id: id.into(),
            artist_scope,
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artist_scope {
            Some(scope) => write!(f, "{} [scope {}]", self.id, scope),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_scope() {
        assert_eq!(Caller::new("ops-1", None).to_string(), "ops-1");
        assert_eq!(
            Caller::new("ops-1", Some("label-9".into())).to_string(),
            "ops-1 [scope label-9]"
        );
    }
}
