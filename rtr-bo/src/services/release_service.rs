//! Release state machine
//!
//! Drives a release from `draft` through QC to `ready_for_delivery` and
//! `delivered`. QC outcomes set the status automatically; `set_status` is the
//! administrative override and accepts any of the five states.

use rtr_common::{time, Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::ReleaseRepository;
use crate::models::{
    Caller, NewRelease, NewTrack, QcStatus, ReadinessReport, Release, ReleaseStatus, Track,
};
use crate::qc::{check_readiness, QcEngine};

/// Result of appending tracks
#[derive(Debug, Clone, Serialize)]
pub struct AddTracksOutcome {
    pub release: Release,
    /// Ownership splits that do not add up to 100%, one entry per track
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReleaseService {
    releases: ReleaseRepository,
    qc: QcEngine,
}

impl ReleaseService {
    pub fn new(pool: SqlitePool, qc: QcEngine) -> Self {
        Self {
            releases: ReleaseRepository::new(pool),
            qc,
        }
    }

    pub async fn create_release(&self, caller: &Caller, new: NewRelease) -> Result<Release> {
        if new.artist_id.trim().is_empty() {
            return Err(Error::Validation("artist_id must not be blank".to_string()));
        }
        if new.title.trim().is_empty() {
            return Err(Error::Validation("title must not be blank".to_string()));
        }

        let release = Release::new(new, time::now());
        self.releases.insert(&release).await?;

        info!(
            release_id = %release.id,
            artist_id = %release.artist_id,
            caller = %caller,
            "Release created"
        );

        Ok(release)
    }

    pub async fn get_release(&self, id: Uuid) -> Result<Release> {
        self.releases.require(id).await
    }

    pub async fn list_releases(&self, artist_id: &str) -> Result<Vec<Release>> {
        self.releases.list_by_artist(artist_id).await
    }

    /// Append tracks in any non-terminal state
    pub async fn add_tracks(
        &self,
        caller: &Caller,
        id: Uuid,
        tracks: Vec<NewTrack>,
    ) -> Result<AddTracksOutcome> {
        if tracks.is_empty() {
            return Err(Error::Validation("tracks must not be empty".to_string()));
        }

        let mut release = self.releases.require(id).await?;
        if release.status.is_terminal() {
            return Err(Error::InvalidOperation(format!(
                "Release {} is {}, tracks can no longer be added",
                id, release.status
            )));
        }

        let mut warnings = Vec::new();
        for new_track in tracks {
            let track = Track::from_new(release.id, new_track);
            if !track.splits_balanced() {
                let message = format!(
                    "Ownership splits for track '{}' sum to {}, expected 100.00%",
                    track.title,
                    track.split_total()
                );
                warn!(
                    release_id = %release.id,
                    track_id = %track.id,
                    split_total = %track.split_total(),
                    "Ownership splits do not sum to 100%"
                );
                warnings.push(message);
            }
            release.tracks.push(track);
        }
        release.updated_at = time::now();

        let release = self.releases.replace(&release).await?;

        info!(
            release_id = %release.id,
            track_count = release.tracks.len(),
            caller = %caller,
            "Tracks added"
        );

        Ok(AddTracksOutcome { release, warnings })
    }

    /// Run QC and store the result with the derived status in one write
    pub async fn run_qc(&self, caller: &Caller, id: Uuid) -> Result<Release> {
        let mut release = self.releases.require(id).await?;
        if release.status.is_terminal() {
            return Err(Error::InvalidOperation(format!(
                "Release {} is {}, QC cannot be re-run",
                id, release.status
            )));
        }

        let now = time::now();
        let result = self.qc.validate(&release, now);
        let previous = release.status;

        release.status = match result.status {
            QcStatus::Passed => ReleaseStatus::ReadyForDelivery,
            QcStatus::Failed => ReleaseStatus::QcFailed,
        };
        let score = result.score;
        let finding_count = result.findings.len();
        release.qc_result = Some(result);
        release.updated_at = now;

        let release = self.releases.replace(&release).await?;

        info!(
            release_id = %release.id,
            from = %previous,
            to = %release.status,
            score,
            findings = finding_count,
            caller = %caller,
            "QC completed"
        );

        Ok(release)
    }

    /// Distribution-readiness verdict; does not change the release
    pub async fn check_readiness(&self, id: Uuid) -> Result<ReadinessReport> {
        let release = self.releases.require(id).await?;
        Ok(check_readiness(&release))
    }

    /// Administrative override. Any target is accepted; off-graph moves are
    /// logged as warnings.
    pub async fn set_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: ReleaseStatus,
    ) -> Result<Release> {
        let mut release = self.releases.require(id).await?;
        let previous = release.status;

        if previous != status && !previous.can_transition_to(status) {
            warn!(
                release_id = %id,
                from = %previous,
                to = %status,
                caller = %caller,
                "Administrative status override outside the lifecycle graph"
            );
        }

        release.status = status;
        release.updated_at = time::now();
        let release = self.releases.replace(&release).await?;

        info!(
            release_id = %id,
            from = %previous,
            to = %status,
            caller = %caller,
            "Release status set"
        );

        Ok(release)
    }
}
