//! QC result model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// One rule violation. Immutable once attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcFinding {
    pub code: String,
    pub message: String,
    pub severity: QcSeverity,
    pub track_id: Option<Uuid>,
}

impl QcFinding {
    pub fn new(code: &str, message: impl Into<String>, severity: QcSeverity) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity,
            track_id: None,
        }
    }

    pub fn for_track(mut self, track_id: Uuid) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

/// Overall QC outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcStatus {
    Passed,
    Failed,
}

/// Result of one QC run, replacing any previous result on the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcResult {
    pub status: QcStatus,
    /// 0-100
    pub score: u32,
    pub findings: Vec<QcFinding>,
    /// Human summary; an empty findings list reads as an implicit pass
    pub summary: String,
    pub checked_at: DateTime<Utc>,
}

impl QcResult {
    pub fn passed(&self) -> bool {
        self.status == QcStatus::Passed
    }

    pub fn has_finding(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }
}

/// Boolean distribution-readiness verdict (no score)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub release_id: Uuid,
    pub ready: bool,
    pub findings: Vec<QcFinding>,
}
