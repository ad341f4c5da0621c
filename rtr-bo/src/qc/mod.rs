//! Release quality control
//!
//! Two rule sets, both pure over a `Release` value:
//! - `QcEngine::validate`: scored content checks that drive the release
//!   lifecycle
//! - `readiness::check_readiness`: boolean distribution-readiness checks
//!   (UPC, cover art, release date)

pub mod engine;
pub mod readiness;

pub use engine::QcEngine;
pub use readiness::check_readiness;

/// Finding codes
pub mod codes {
    pub const MISSING_TITLE: &str = "MISSING_TITLE";
    pub const NO_TRACKS: &str = "NO_TRACKS";
    pub const MISSING_ISRC: &str = "MISSING_ISRC";
    pub const INVALID_DURATION: &str = "INVALID_DURATION";
    pub const EXPLICIT_FLAG_MISMATCH: &str = "EXPLICIT_FLAG_MISMATCH";

    pub const MISSING_UPC: &str = "MISSING_UPC";
    pub const INVALID_UPC: &str = "INVALID_UPC";
    pub const MISSING_COVER_ART: &str = "MISSING_COVER_ART";
    pub const MISSING_RELEASE_DATE: &str = "MISSING_RELEASE_DATE";
}
