//! Delivery persistence

use chrono::{DateTime, Utc};
use rtr_common::time::{parse_optional_timestamp, parse_timestamp};
use rtr_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{stored_enum, stored_uuid, ReleaseRepository};
use crate::models::{Delivery, Release};

const DELIVERY_COLUMNS: &str = "id, release_id, dsp, status, dedupe_key, sent_at, \
     acknowledged_at, last_error, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert `deliveries` and stamp the release's `delivery_scheduled_at`,
    /// all or nothing.
    ///
    /// The release stamp is conditional on `release.revision`, so a release
    /// changed since it was read is not scheduled. `updated_at` is left
    /// untouched: dedupe keys derive from it.
    pub async fn queue(
        &self,
        release: &Release,
        deliveries: &[Delivery],
        scheduled_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction takes the write lock up front
        let stamped = sqlx::query(
            r#"
            UPDATE releases
            SET delivery_scheduled_at = ?, revision = revision + 1
            WHERE id = ? AND revision = ?
            "#,
        )
        .bind(scheduled_at.to_rfc3339())
        .bind(release.id.to_string())
        .bind(release.revision)
        .execute(&mut *tx)
        .await?;

        if stamped.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ReleaseRepository::new(self.pool.clone())
                .stale_write_error(release.id)
                .await);
        }

        for delivery in deliveries {
            sqlx::query(
                r#"
                INSERT INTO deliveries (
                    id, release_id, dsp, status, dedupe_key, sent_at,
                    acknowledged_at, last_error, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(delivery.id.to_string())
            .bind(delivery.release_id.to_string())
            .bind(&delivery.dsp)
            .bind(delivery.status.as_str())
            .bind(&delivery.dedupe_key)
            .bind(delivery.sent_at.map(|t| t.to_rfc3339()))
            .bind(delivery.acknowledged_at.map(|t| t.to_rfc3339()))
            .bind(&delivery.last_error)
            .bind(delivery.created_at.to_rfc3339())
            .bind(delivery.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            release_id = %release.id,
            count = deliveries.len(),
            "Deliveries queued"
        );

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Delivery>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM deliveries WHERE id = ?",
            DELIVERY_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_delivery).transpose()
    }

    pub async fn list_by_release(&self, release_id: Uuid) -> Result<Vec<Delivery>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM deliveries WHERE release_id = ? ORDER BY created_at, rowid",
            DELIVERY_COLUMNS
        ))
        .bind(release_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_delivery).collect()
    }

    /// Store the tracking fields of `delivery`
    pub async fn replace(&self, delivery: &Delivery) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE deliveries SET
                status = ?, sent_at = ?, acknowledged_at = ?, last_error = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(delivery.status.as_str())
        .bind(delivery.sent_at.map(|t| t.to_rfc3339()))
        .bind(delivery.acknowledged_at.map(|t| t.to_rfc3339()))
        .bind(&delivery.last_error)
        .bind(delivery.updated_at.to_rfc3339())
        .bind(delivery.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Delivery {} not found", delivery.id)));
        }
        Ok(())
    }
}

fn row_to_delivery(row: &SqliteRow) -> Result<Delivery> {
    let id: String = row.get("id");
    let release_id: String = row.get("release_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Delivery {
        id: stored_uuid("delivery id", &id)?,
        release_id: stored_uuid("release id", &release_id)?,
        dsp: row.get("dsp"),
        status: stored_enum("delivery status", &status)?,
        dedupe_key: row.get("dedupe_key"),
        sent_at: parse_optional_timestamp(row.get("sent_at"))?,
        acknowledged_at: parse_optional_timestamp(row.get("acknowledged_at"))?,
        last_error: row.get("last_error"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
