//! Statement and payout lifecycle
//!
//! `Draft` -> `Finalized` -> `Paid`, forward only. A finalized statement gets
//! at most one payout; issuing it advances the statement to `Paid` in the same
//! transaction.

use chrono::NaiveDate;
use rtr_common::config::RoyaltyConfig;
use rtr_common::{time, Error, Money, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::{PayoutRepository, StatementRepository};
use crate::models::{Caller, Payout, PayoutMethod, RoyaltyStatement};

/// Artist earnings overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSummary {
    pub artist_id: String,
    /// Sum of net-to-artist over all statements
    pub lifetime_earnings: Money,
    /// Net-to-artist of the most recent statement
    pub current_period_earnings: Money,
    pub current_period_start: Option<NaiveDate>,
    pub current_period_end: Option<NaiveDate>,
    /// Sum of `Pending` payouts
    pub pending_payouts: Money,
}

#[derive(Debug, Clone)]
pub struct StatementLifecycle {
    statements: StatementRepository,
    payouts: PayoutRepository,
    default_payout_method: PayoutMethod,
}

impl StatementLifecycle {
    pub fn new(pool: SqlitePool, config: &RoyaltyConfig) -> Result<Self> {
        let default_payout_method = config.default_payout_method.parse::<PayoutMethod>().map_err(|e| {
            Error::Config(format!("royalty.default_payout_method: {}", e))
        })?;

        Ok(Self {
            statements: StatementRepository::new(pool.clone()),
            payouts: PayoutRepository::new(pool),
            default_payout_method,
        })
    }

    pub async fn get_statement(&self, id: Uuid) -> Result<RoyaltyStatement> {
        self.statements.require(id).await
    }

    pub async fn list_statements(&self, artist_id: &str) -> Result<Vec<RoyaltyStatement>> {
        self.statements.list_by_artist(artist_id).await
    }

    /// `Draft` -> `Finalized`
    pub async fn finalize(&self, caller: &Caller, id: Uuid) -> Result<RoyaltyStatement> {
        let statement = self.statements.finalize(id, time::now()).await?;

        info!(
            statement_id = %id,
            artist_id = %statement.artist_id,
            net = %statement.net_to_artist,
            caller = %caller,
            "Statement finalized"
        );

        Ok(statement)
    }

    /// Issue the single payout of a finalized statement.
    ///
    /// `scheduled_for` defaults to today, `method` to the configured default.
    pub async fn create_payout(
        &self,
        caller: &Caller,
        statement_id: Uuid,
        scheduled_for: Option<NaiveDate>,
        method: Option<PayoutMethod>,
    ) -> Result<Payout> {
        let now = time::now();
        let scheduled_for = scheduled_for.unwrap_or_else(|| now.date_naive());
        let method = method.unwrap_or(self.default_payout_method);

        let payout = self
            .payouts
            .create_for_statement(statement_id, scheduled_for, method, now)
            .await?;

        info!(
            payout_id = %payout.id,
            statement_id = %statement_id,
            method = %method,
            scheduled_for = %scheduled_for,
            caller = %caller,
            "Payout scheduled"
        );

        Ok(payout)
    }

    pub async fn get_payout(&self, id: Uuid) -> Result<Payout> {
        self.payouts.require(id).await
    }

    pub async fn list_payouts(&self, artist_id: &str) -> Result<Vec<Payout>> {
        self.payouts.list_by_artist(artist_id).await
    }

    /// Mark a payout `Paid`; the only precondition is that it exists
    pub async fn mark_payout_paid(&self, caller: &Caller, id: Uuid) -> Result<Payout> {
        let payout = self.payouts.mark_paid(id, time::now()).await?;

        info!(
            payout_id = %id,
            artist_id = %payout.artist_id,
            amount = %payout.amount,
            caller = %caller,
            "Payout marked paid"
        );

        Ok(payout)
    }

    pub async fn earnings_summary(&self, artist_id: &str) -> Result<EarningsSummary> {
        let lifetime_earnings = self.statements.lifetime_net(artist_id).await?;
        let latest = self.statements.latest_for_artist(artist_id).await?;
        let pending_payouts = self.payouts.pending_total(artist_id).await?;

        Ok(EarningsSummary {
            artist_id: artist_id.to_string(),
            lifetime_earnings,
            current_period_earnings: latest
                .as_ref()
                .map(|s| s.net_to_artist)
                .unwrap_or(Money::ZERO),
            current_period_start: latest.as_ref().map(|s| s.period_start),
            current_period_end: latest.as_ref().map(|s| s.period_end),
            pending_payouts,
        })
    }
}
