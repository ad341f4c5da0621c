//! Release and track model
//!
//! Release lifecycle:
//! `draft` → `qc_in_progress` → `qc_failed` | `ready_for_delivery` → `delivered`
//!
//! `qc_failed` may loop back to `qc_in_progress` or `draft`. `delivered` is
//! terminal.

use chrono::{DateTime, NaiveDate, Utc};
use rtr_common::{Error, Percentage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::qc::QcResult;

/// Release status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    /// Initial state, tracks can be added
    Draft,
    /// QC running or requested
    QcInProgress,
    /// Last QC run scored below the pass threshold
    QcFailed,
    /// Last QC run passed, release may be sent to DSPs
    ReadyForDelivery,
    /// Terminal
    Delivered,
}

impl ReleaseStatus {
    pub const ALL: [ReleaseStatus; 5] = [
        ReleaseStatus::Draft,
        ReleaseStatus::QcInProgress,
        ReleaseStatus::QcFailed,
        ReleaseStatus::ReadyForDelivery,
        ReleaseStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Draft => "draft",
            ReleaseStatus::QcInProgress => "qc_in_progress",
            ReleaseStatus::QcFailed => "qc_failed",
            ReleaseStatus::ReadyForDelivery => "ready_for_delivery",
            ReleaseStatus::Delivered => "delivered",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseStatus::Delivered)
    }

    /// Whether `next` is an edge of the lifecycle graph
    ///
    /// Only used for reporting: the administrative override accepts any target.
    pub fn can_transition_to(&self, next: ReleaseStatus) -> bool {
        use ReleaseStatus::*;
        matches!(
            (self, next),
            (Draft, QcInProgress)
                | (QcInProgress, QcFailed)
                | (QcInProgress, ReadyForDelivery)
                | (QcFailed, QcInProgress)
                | (QcFailed, Draft)
                | (ReadyForDelivery, Delivered)
        )
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ReleaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| Error::Validation(format!("Unknown release status: {:?}", s)))
    }
}

/// Release format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Single,
    Ep,
    Album,
    Mixtape,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Single => "single",
            ReleaseType::Ep => "ep",
            ReleaseType::Album => "album",
            ReleaseType::Mixtape => "mixtape",
        }
    }
}

impl Default for ReleaseType {
    fn default() -> Self {
        ReleaseType::Single
    }
}

impl FromStr for ReleaseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(ReleaseType::Single),
            "ep" => Ok(ReleaseType::Ep),
            "album" => Ok(ReleaseType::Album),
            "mixtape" => Ok(ReleaseType::Mixtape),
            _ => Err(Error::Validation(format!("Unknown release type: {:?}", s))),
        }
    }
}

/// Share of a track's net royalty owed to one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipSplit {
    pub participant_id: String,
    #[serde(default)]
    pub name: String,
    pub share_percent: Percentage,
}

/// Track within a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Uuid,
    /// Back-reference to the owning release
    pub release_id: Uuid,
    pub title: String,
    pub audio_ref: Option<String>,
    /// Optional until QC demands it
    pub isrc: Option<String>,
    /// Must be positive to pass QC; not enforced at creation
    pub duration_seconds: i64,
    pub explicit: bool,
    /// Tempo, required by some DSPs (Beatport)
    pub bpm: Option<f64>,
    /// Ordered ownership splits
    pub splits: Vec<OwnershipSplit>,
}

impl Track {
    pub fn from_new(release_id: Uuid, new: NewTrack) -> Self {
        Self {
            id: Uuid::new_v4(),
            release_id,
            title: new.title,
            audio_ref: new.audio_ref,
            isrc: new.isrc,
            duration_seconds: new.duration_seconds,
            explicit: new.explicit,
            bpm: new.bpm,
            splits: new.splits,
        }
    }

    /// Sum of all ownership shares
    pub fn split_total(&self) -> Percentage {
        self.splits.iter().map(|s| s.share_percent).sum()
    }

    /// Splits are either absent or sum to exactly 100%
    pub fn splits_balanced(&self) -> bool {
        self.splits.is_empty() || self.split_total() == Percentage::HUNDRED
    }

    pub fn has_isrc(&self) -> bool {
        self.isrc.as_deref().is_some_and(|isrc| !isrc.trim().is_empty())
    }
}

/// Track as submitted by a caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTrack {
    pub title: String,
    #[serde(default)]
    pub audio_ref: Option<String>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub duration_seconds: i64,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub splits: Vec<OwnershipSplit>,
}

/// Release as submitted by a caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRelease {
    pub artist_id: String,
    pub title: String,
    #[serde(default)]
    pub primary_artist: String,
    #[serde(default)]
    pub release_type: ReleaseType,
    #[serde(default)]
    pub upc: Option<String>,
    #[serde(default)]
    pub cover_art_ref: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

/// Release aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: Uuid,
    pub artist_id: String,
    pub title: String,
    pub primary_artist: String,
    pub release_type: ReleaseType,
    pub upc: Option<String>,
    pub cover_art_ref: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub status: ReleaseStatus,
    /// Bumped on every stored change; guards read-modify-write updates
    #[serde(default)]
    pub revision: i64,
    pub tracks: Vec<Track>,
    /// Last QC outcome; `None` until QC has run once
    pub qc_result: Option<QcResult>,
    /// Set when deliveries were last queued
    pub delivery_scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Release {
    /// Build a `draft` release from caller input
    pub fn new(new: NewRelease, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            artist_id: new.artist_id.trim().to_string(),
            title: new.title,
            primary_artist: new.primary_artist,
            release_type: new.release_type,
            upc: new.upc,
            cover_art_ref: new.cover_art_ref,
            release_date: new.release_date,
            status: ReleaseStatus::Draft,
            revision: 0,
            tracks: Vec::new(),
            qc_result: None,
            delivery_scheduled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn find_track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id.to_string() == track_id)
    }
}
