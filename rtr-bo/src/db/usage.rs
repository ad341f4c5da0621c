//! Usage-record source
//!
//! The royalty engine reads usage through the `UsageSource` trait. The SQLite
//! implementation below is fed by `ingest`; other feeds (DSP report parsers,
//! a warehouse) can implement the trait directly.

use async_trait::async_trait;
use rtr_common::time::parse_date;
use rtr_common::{Error, Money, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::models::{UsageRecord, UsageWindow};

#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Usage within `window` (inclusive), for one artist or for everyone
    async fn find_usage(
        &self,
        artist_id: Option<&str>,
        window: UsageWindow,
    ) -> Result<Vec<UsageRecord>>;

    /// Distinct artists with at least one usage record in `window`, sorted
    async fn artists_with_usage(&self, window: UsageWindow) -> Result<Vec<String>> {
        let mut artists: Vec<String> = self
            .find_usage(None, window)
            .await?
            .into_iter()
            .map(|record| record.artist_id)
            .collect();
        artists.sort();
        artists.dedup();
        Ok(artists)
    }
}

#[derive(Debug, Clone)]
pub struct SqliteUsageSource {
    pool: SqlitePool,
}

impl SqliteUsageSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store normalized usage records in one transaction. Returns the count.
    ///
    /// A stream count beyond the column range rejects the whole batch.
    pub async fn ingest(&self, records: &[UsageRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            let streams = i64::try_from(record.streams).map_err(|_| {
                Error::Validation(format!(
                    "Stream count {} for track {} is out of range",
                    record.streams, record.track_id
                ))
            })?;

            sqlx::query(
                r#"
                INSERT INTO usage_records (
                    artist_id, release_id, track_id, track_title, source,
                    territory, streams, revenue_cents, usage_date
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.artist_id)
            .bind(&record.release_id)
            .bind(&record.track_id)
            .bind(&record.track_title)
            .bind(&record.source)
            .bind(&record.territory)
            .bind(streams)
            .bind(record.revenue.cents())
            .bind(record.usage_date.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = records.len(), "Usage records stored");
        Ok(records.len() as u64)
    }
}

#[async_trait]
impl UsageSource for SqliteUsageSource {
    async fn find_usage(
        &self,
        artist_id: Option<&str>,
        window: UsageWindow,
    ) -> Result<Vec<UsageRecord>> {
        let artist_clause = if artist_id.is_some() {
            "AND artist_id = ?"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT artist_id, release_id, track_id, track_title, source,
                   territory, streams, revenue_cents, usage_date
            FROM usage_records
            WHERE usage_date >= ? AND usage_date <= ? {}
            ORDER BY usage_date, id
            "#,
            artist_clause
        );

        let mut query = sqlx::query(&sql)
            .bind(window.start.to_string())
            .bind(window.end.to_string());
        if let Some(artist_id) = artist_id {
            query = query.bind(artist_id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        debug!(
            artist_id = artist_id.unwrap_or("*"),
            start = %window.start,
            end = %window.end,
            rows = rows.len(),
            "Usage query"
        );

        rows.iter().map(row_to_usage).collect()
    }

    async fn artists_with_usage(&self, window: UsageWindow) -> Result<Vec<String>> {
        let artists = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT artist_id FROM usage_records
            WHERE usage_date >= ? AND usage_date <= ?
            ORDER BY artist_id
            "#,
        )
        .bind(window.start.to_string())
        .bind(window.end.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }
}

/// Missing numeric columns read as zero; negative streams are clamped
fn row_to_usage(row: &SqliteRow) -> Result<UsageRecord> {
    let streams: Option<i64> = row.get("streams");
    let revenue_cents: Option<i64> = row.get("revenue_cents");
    let usage_date: String = row.get("usage_date");

    Ok(UsageRecord {
        artist_id: row.get("artist_id"),
        release_id: row.get("release_id"),
        track_id: row.get("track_id"),
        track_title: row.get("track_title"),
        source: row.get("source"),
        territory: row.get("territory"),
        streams: streams.and_then(|s| u64::try_from(s).ok()).unwrap_or(0),
        revenue: revenue_cents.map(Money::from_cents).unwrap_or(Money::ZERO),
        usage_date: parse_date(&usage_date)?,
    })
}
