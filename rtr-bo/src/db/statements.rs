//! Royalty statement persistence
//!
//! Amounts live in integer cent columns; the schema re-checks
//! `gross = cut + net` and the `paid <=> payout_id` link on every write.

use chrono::{DateTime, NaiveDate, Utc};
use rtr_common::time::{parse_date, parse_optional_timestamp, parse_timestamp};
use rtr_common::{Error, Money, Percentage, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_json, stored_enum, stored_uuid, to_json};
use crate::models::{RoyaltyLineItem, RoyaltyStatement, StatementStatus};

const STATEMENT_COLUMNS: &str = "id, artist_id, period_start, period_end, distributor_cut_bps, \
     gross_revenue_cents, distributor_cut_cents, net_to_artist_cents, rounding_adjustment_cents, \
     line_items, status, created_at, finalized_at, payout_id";

#[derive(Debug, Clone)]
pub struct StatementRepository {
    pool: SqlitePool,
}

impl StatementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, statement: &RoyaltyStatement) -> Result<()> {
        let line_items = to_json(&statement.line_items)?;

        sqlx::query(
            r#"
            INSERT INTO statements (
                id, artist_id, period_start, period_end, distributor_cut_bps,
                gross_revenue_cents, distributor_cut_cents, net_to_artist_cents,
                rounding_adjustment_cents, line_items, status, created_at,
                finalized_at, payout_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(statement.id.to_string())
        .bind(&statement.artist_id)
        .bind(statement.period_start.to_string())
        .bind(statement.period_end.to_string())
        .bind(statement.distributor_cut_percent.basis_points())
        .bind(statement.gross_revenue.cents())
        .bind(statement.distributor_cut_amount.cents())
        .bind(statement.net_to_artist.cents())
        .bind(statement.rounding_adjustment.cents())
        .bind(&line_items)
        .bind(statement.status.as_str())
        .bind(statement.created_at.to_rfc3339())
        .bind(statement.finalized_at.map(|t| t.to_rfc3339()))
        .bind(statement.payout_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<RoyaltyStatement>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM statements WHERE id = ?",
            STATEMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_statement).transpose()
    }

    pub async fn require(&self, id: Uuid) -> Result<RoyaltyStatement> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Statement {} not found", id)))
    }

    /// Newest first
    pub async fn list_by_artist(&self, artist_id: &str) -> Result<Vec<RoyaltyStatement>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM statements WHERE artist_id = ? ORDER BY created_at DESC, rowid DESC",
            STATEMENT_COLUMNS
        ))
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_statement).collect()
    }

    /// Number of statements already generated for exactly this period
    pub async fn count_for_period(
        &self,
        artist_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM statements WHERE artist_id = ? AND period_start = ? AND period_end = ?",
        )
        .bind(artist_id)
        .bind(period_start.to_string())
        .bind(period_end.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// `Draft` -> `Finalized` as one conditional update
    pub async fn finalize(&self, id: Uuid, finalized_at: DateTime<Utc>) -> Result<RoyaltyStatement> {
        let result = sqlx::query(
            "UPDATE statements SET status = 'finalized', finalized_at = ? WHERE id = ? AND status = 'draft'",
        )
        .bind(finalized_at.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.require(id).await?;
            return Err(Error::InvalidOperation(format!(
                "Statement {} is {}, only draft statements can be finalized",
                id, current.status
            )));
        }

        self.require(id).await
    }

    /// Sum of net-to-artist over every statement of the artist
    pub async fn lifetime_net(&self, artist_id: &str) -> Result<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(net_to_artist_cents), 0) FROM statements WHERE artist_id = ?",
        )
        .bind(artist_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    /// Most recently created statement of the artist
    pub async fn latest_for_artist(&self, artist_id: &str) -> Result<Option<RoyaltyStatement>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM statements WHERE artist_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
            STATEMENT_COLUMNS
        ))
        .bind(artist_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_statement).transpose()
    }
}

fn row_to_statement(row: &SqliteRow) -> Result<RoyaltyStatement> {
    let id: String = row.get("id");
    let period_start: String = row.get("period_start");
    let period_end: String = row.get("period_end");
    let line_items: String = row.get("line_items");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let payout_id: Option<String> = row.get("payout_id");

    Ok(RoyaltyStatement {
        id: stored_uuid("statement id", &id)?,
        artist_id: row.get("artist_id"),
        period_start: parse_date(&period_start)?,
        period_end: parse_date(&period_end)?,
        distributor_cut_percent: Percentage::from_basis_points(row.get("distributor_cut_bps")),
        gross_revenue: Money::from_cents(row.get("gross_revenue_cents")),
        distributor_cut_amount: Money::from_cents(row.get("distributor_cut_cents")),
        net_to_artist: Money::from_cents(row.get("net_to_artist_cents")),
        rounding_adjustment: Money::from_cents(row.get("rounding_adjustment_cents")),
        line_items: from_json::<Vec<RoyaltyLineItem>>("line_items", &line_items)?,
        status: stored_enum::<StatementStatus>("statement status", &status)?,
        created_at: parse_timestamp(&created_at)?,
        finalized_at: parse_optional_timestamp(row.get("finalized_at"))?,
        payout_id: payout_id
            .as_deref()
            .map(|raw| stored_uuid("payout id", raw))
            .transpose()?,
    })
}
