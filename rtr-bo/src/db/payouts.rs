//! Payout persistence
//!
//! Creating a payout and advancing its statement to `paid` happen in one
//! transaction that opens with a compare-and-set on the statement row:
//! `status = 'finalized' AND payout_id IS NULL`. Of any number of concurrent
//! attempts exactly one matches; the rest see zero affected rows and roll back.

use chrono::{DateTime, NaiveDate, Utc};
use rtr_common::time::{parse_date, parse_optional_timestamp, parse_timestamp};
use rtr_common::{Error, Money, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{stored_enum, stored_uuid, StatementRepository};
use crate::models::{Payout, PayoutMethod, PayoutStatus, StatementStatus};

const PAYOUT_COLUMNS: &str =
    "id, artist_id, statement_id, amount_cents, scheduled_for, method, status, created_at, paid_at";

#[derive(Debug, Clone)]
pub struct PayoutRepository {
    pool: SqlitePool,
}

impl PayoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue the payout for a finalized statement and mark the statement paid
    pub async fn create_for_statement(
        &self,
        statement_id: Uuid,
        scheduled_for: NaiveDate,
        method: PayoutMethod,
        now: DateTime<Utc>,
    ) -> Result<Payout> {
        let payout_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE statements SET status = 'paid', payout_id = ?
            WHERE id = ? AND status = 'finalized' AND payout_id IS NULL
            "#,
        )
        .bind(payout_id.to_string())
        .bind(statement_id.to_string())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(self.payout_rejection(statement_id).await);
        }

        let row = sqlx::query("SELECT artist_id, net_to_artist_cents FROM statements WHERE id = ?")
            .bind(statement_id.to_string())
            .fetch_one(&mut *tx)
            .await?;

        let payout = Payout {
            id: payout_id,
            artist_id: row.get("artist_id"),
            statement_id,
            amount: Money::from_cents(row.get("net_to_artist_cents")),
            scheduled_for,
            method,
            status: PayoutStatus::Pending,
            created_at: now,
            paid_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO payouts (
                id, artist_id, statement_id, amount_cents, scheduled_for,
                method, status, created_at, paid_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payout.id.to_string())
        .bind(&payout.artist_id)
        .bind(payout.statement_id.to_string())
        .bind(payout.amount.cents())
        .bind(payout.scheduled_for.to_string())
        .bind(payout.method.as_str())
        .bind(payout.status.as_str())
        .bind(payout.created_at.to_rfc3339())
        .bind(payout.paid_at.map(|t| t.to_rfc3339()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            payout_id = %payout.id,
            statement_id = %statement_id,
            artist_id = %payout.artist_id,
            amount = %payout.amount,
            "Payout created, statement marked paid"
        );

        Ok(payout)
    }

    /// Explain why the compare-and-set matched nothing
    async fn payout_rejection(&self, statement_id: Uuid) -> Error {
        let statement = match StatementRepository::new(self.pool.clone())
            .get(statement_id)
            .await
        {
            Ok(Some(statement)) => statement,
            Ok(None) => return Error::NotFound(format!("Statement {} not found", statement_id)),
            Err(e) => return e,
        };

        debug!(statement_id = %statement_id, status = %statement.status, "Payout rejected");

        if statement.payout_id.is_some() || statement.status == StatementStatus::Paid {
            Error::InvalidOperation(format!(
                "Statement {}: payout already exists",
                statement_id
            ))
        } else {
            Error::InvalidOperation(format!(
                "Statement {} is {}, only finalized statements can be paid out",
                statement_id, statement.status
            ))
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Payout>> {
        let row = sqlx::query(&format!("SELECT {} FROM payouts WHERE id = ?", PAYOUT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_payout).transpose()
    }

    pub async fn require(&self, id: Uuid) -> Result<Payout> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Payout {} not found", id)))
    }

    /// Newest first
    pub async fn list_by_artist(&self, artist_id: &str) -> Result<Vec<Payout>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payouts WHERE artist_id = ? ORDER BY created_at DESC, rowid DESC",
            PAYOUT_COLUMNS
        ))
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payout).collect()
    }

    /// Set `Paid` and stamp `paid_at`. Repeating the call restamps `paid_at`.
    pub async fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> Result<Payout> {
        let result = sqlx::query("UPDATE payouts SET status = 'paid', paid_at = ? WHERE id = ?")
            .bind(paid_at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Payout {} not found", id)));
        }

        self.require(id).await
    }

    /// Sum of the artist's `Pending` payouts
    pub async fn pending_total(&self, artist_id: &str) -> Result<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payouts WHERE artist_id = ? AND status = 'pending'",
        )
        .bind(artist_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }
}

fn row_to_payout(row: &SqliteRow) -> Result<Payout> {
    let id: String = row.get("id");
    let statement_id: String = row.get("statement_id");
    let scheduled_for: String = row.get("scheduled_for");
    let method: String = row.get("method");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(Payout {
        id: stored_uuid("payout id", &id)?,
        artist_id: row.get("artist_id"),
        statement_id: stored_uuid("statement id", &statement_id)?,
        amount: Money::from_cents(row.get("amount_cents")),
        scheduled_for: parse_date(&scheduled_for)?,
        method: stored_enum::<PayoutMethod>("payout method", &method)?,
        status: stored_enum::<PayoutStatus>("payout status", &status)?,
        created_at: parse_timestamp(&created_at)?,
        paid_at: parse_optional_timestamp(row.get("paid_at"))?,
    })
}
