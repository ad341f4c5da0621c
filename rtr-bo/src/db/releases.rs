//! Release persistence
//!
//! A release is one row; tracks and the QC result are JSON documents on that
//! row. Updates are conditional on the stored `revision`.

use rtr_common::time::{parse_date, parse_optional_timestamp, parse_timestamp};
use rtr_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{from_json, stored_enum, stored_uuid, to_json};
use crate::models::{QcResult, Release, Track};

const RELEASE_COLUMNS: &str = "id, artist_id, title, primary_artist, release_type, upc, \
     cover_art_ref, release_date, status, revision, tracks, qc_result, \
     delivery_scheduled_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ReleaseRepository {
    pool: SqlitePool,
}

impl ReleaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, release: &Release) -> Result<()> {
        let tracks = to_json(&release.tracks)?;
        let qc_result = release.qc_result.as_ref().map(to_json).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO releases (
                id, artist_id, title, primary_artist, release_type, upc,
                cover_art_ref, release_date, status, revision, tracks, qc_result,
                delivery_scheduled_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(release.id.to_string())
        .bind(&release.artist_id)
        .bind(&release.title)
        .bind(&release.primary_artist)
        .bind(release.release_type.as_str())
        .bind(&release.upc)
        .bind(&release.cover_art_ref)
        .bind(release.release_date.map(|d| d.to_string()))
        .bind(release.status.as_str())
        .bind(release.revision)
        .bind(&tracks)
        .bind(&qc_result)
        .bind(release.delivery_scheduled_at.map(|t| t.to_rfc3339()))
        .bind(release.created_at.to_rfc3339())
        .bind(release.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Release>> {
        let row = sqlx::query(&format!("SELECT {} FROM releases WHERE id = ?", RELEASE_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_release).transpose()
    }

    /// Like `get`, but a missing release is `NotFound`
    pub async fn require(&self, id: Uuid) -> Result<Release> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Release {} not found", id)))
    }

    pub async fn list_by_artist(&self, artist_id: &str) -> Result<Vec<Release>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM releases WHERE artist_id = ? ORDER BY created_at, id",
            RELEASE_COLUMNS
        ))
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_release).collect()
    }

    /// Replace the stored release with `release` in one statement.
    ///
    /// Succeeds only while the stored revision still equals `release.revision`.
    /// Returns the release with its new revision.
    pub async fn replace(&self, release: &Release) -> Result<Release> {
        let tracks = to_json(&release.tracks)?;
        let qc_result = release.qc_result.as_ref().map(to_json).transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE releases SET
                title = ?, primary_artist = ?, release_type = ?, upc = ?,
                cover_art_ref = ?, release_date = ?, status = ?,
                revision = revision + 1, tracks = ?, qc_result = ?,
                delivery_scheduled_at = ?, updated_at = ?
            WHERE id = ? AND revision = ?
            "#,
        )
        .bind(&release.title)
        .bind(&release.primary_artist)
        .bind(release.release_type.as_str())
        .bind(&release.upc)
        .bind(&release.cover_art_ref)
        .bind(release.release_date.map(|d| d.to_string()))
        .bind(release.status.as_str())
        .bind(&tracks)
        .bind(&qc_result)
        .bind(release.delivery_scheduled_at.map(|t| t.to_rfc3339()))
        .bind(release.updated_at.to_rfc3339())
        .bind(release.id.to_string())
        .bind(release.revision)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.stale_write_error(release.id).await);
        }

        debug!(release_id = %release.id, revision = release.revision + 1, "Release stored");

        let mut stored = release.clone();
        stored.revision += 1;
        Ok(stored)
    }

    /// Classify a conditional update that matched no row
    pub(crate) async fn stale_write_error(&self, id: Uuid) -> Error {
        match self.get(id).await {
            Ok(None) => Error::NotFound(format!("Release {} not found", id)),
            Ok(Some(_)) => Error::InvalidOperation(format!(
                "Release {} was modified concurrently, reload and retry",
                id
            )),
            Err(e) => e,
        }
    }
}

fn row_to_release(row: &SqliteRow) -> Result<Release> {
    let id: String = row.get("id");
    let release_type: String = row.get("release_type");
    let status: String = row.get("status");
    let release_date: Option<String> = row.get("release_date");
    let tracks: String = row.get("tracks");
    let qc_result: Option<String> = row.get("qc_result");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Release {
        id: stored_uuid("release id", &id)?,
        artist_id: row.get("artist_id"),
        title: row.get("title"),
        primary_artist: row.get("primary_artist"),
        release_type: stored_enum("release_type", &release_type)?,
        upc: row.get("upc"),
        cover_art_ref: row.get("cover_art_ref"),
        release_date: release_date.as_deref().map(parse_date).transpose()?,
        status: stored_enum("release status", &status)?,
        revision: row.get("revision"),
        tracks: from_json::<Vec<Track>>("tracks", &tracks)?,
        qc_result: qc_result
            .as_deref()
            .map(|raw| from_json::<QcResult>("qc_result", raw))
            .transpose()?,
        delivery_scheduled_at: parse_optional_timestamp(row.get("delivery_scheduled_at"))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
