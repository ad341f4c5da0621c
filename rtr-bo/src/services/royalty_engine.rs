//! Royalty calculation engine
//!
//! For a period, every artist with usage gets one `Draft` statement holding
//! one line item per usage record. Artists are processed independently with
//! bounded parallelism (`royalty.max_parallel_artists`). Cancellation is
//! checked before each artist starts; statements already written stay.
//!
//! Re-running a period creates additional statements. This is logged as a
//! warning but not prevented.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use rtr_common::config::RoyaltyConfig;
use rtr_common::{time, Money, Percentage, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::db::{ReleaseRepository, StatementRepository, UsageSource};
use crate::models::{
    Caller, OwnershipSplit, Release, RoyaltyLineItem, RoyaltyStatement, UsageWindow,
};

/// Outcome of one generation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub statements_created: usize,
    pub total_gross_revenue: Money,
    pub total_distributor_cut: Money,
    pub total_net_to_artists: Money,
    /// Artists that received a statement, sorted
    pub artist_ids: Vec<String>,
    pub statement_ids: Vec<Uuid>,
    /// Artists whose statement could not be written
    pub failed_artist_ids: Vec<String>,
    /// Artists skipped because the run was cancelled
    pub skipped_artist_ids: Vec<String>,
    /// True when cancellation stopped at least one artist from starting
    pub cancelled: bool,
}

enum ArtistOutcome {
    Created(RoyaltyStatement),
    Failed(String),
    Skipped(String),
}

#[derive(Clone)]
pub struct RoyaltyEngine {
    usage: Arc<dyn UsageSource>,
    releases: ReleaseRepository,
    statements: StatementRepository,
    distributor_cut: Percentage,
    max_parallel_artists: usize,
}

impl RoyaltyEngine {
    pub fn new(pool: SqlitePool, usage: Arc<dyn UsageSource>, config: &RoyaltyConfig) -> Self {
        Self {
            usage,
            releases: ReleaseRepository::new(pool.clone()),
            statements: StatementRepository::new(pool),
            distributor_cut: config.distributor_cut(),
            max_parallel_artists: config.max_parallel_artists.max(1),
        }
    }

    /// Generate draft statements for every artist with usage in the period
    pub async fn generate_statements(
        &self,
        caller: &Caller,
        period_start: NaiveDate,
        period_end: NaiveDate,
        cancel_token: &CancellationToken,
    ) -> Result<GenerationSummary> {
        let window = UsageWindow::new(period_start, period_end)?;
        let artists = self.usage.artists_with_usage(window).await?;

        info!(
            start = %period_start,
            end = %period_end,
            artists = artists.len(),
            cut = %self.distributor_cut,
            caller = %caller,
            "Generating royalty statements"
        );

        let outcomes: Vec<ArtistOutcome> = stream::iter(artists)
            .map(|artist_id| {
                let cancel_token = cancel_token.clone();
                async move {
                    if cancel_token.is_cancelled() {
                        return ArtistOutcome::Skipped(artist_id);
                    }
                    match self.generate_for_artist(&artist_id, window).await {
                        Ok(statement) => ArtistOutcome::Created(statement),
                        Err(e) => {
                            error!(
                                artist_id = %artist_id,
                                error = %e,
                                "Statement generation failed for artist"
                            );
                            ArtistOutcome::Failed(artist_id)
                        }
                    }
                }
            })
            .buffer_unordered(self.max_parallel_artists)
            .collect()
            .await;

        let summary = summarize(period_start, period_end, outcomes);

        info!(
            statements = summary.statements_created,
            gross = %summary.total_gross_revenue,
            cut = %summary.total_distributor_cut,
            net = %summary.total_net_to_artists,
            failed = summary.failed_artist_ids.len(),
            skipped = summary.skipped_artist_ids.len(),
            "Royalty statement generation finished"
        );

        Ok(summary)
    }

    /// Build and store one artist's draft statement
    async fn generate_for_artist(
        &self,
        artist_id: &str,
        window: UsageWindow,
    ) -> Result<RoyaltyStatement> {
        let existing = self
            .statements
            .count_for_period(artist_id, window.start, window.end)
            .await?;
        if existing > 0 {
            warn!(
                artist_id = %artist_id,
                start = %window.start,
                end = %window.end,
                existing,
                "Statement already exists for this period, generating another"
            );
        }

        let records = self.usage.find_usage(Some(artist_id), window).await?;
        let mut releases: HashMap<String, Option<Release>> = HashMap::new();
        let mut line_items = Vec::with_capacity(records.len());

        for record in &records {
            if !releases.contains_key(&record.release_id) {
                let release = self.lookup_release(&record.release_id).await?;
                releases.insert(record.release_id.clone(), release);
            }
            let splits: &[OwnershipSplit] = releases
                .get(&record.release_id)
                .and_then(Option::as_ref)
                .and_then(|release| release.find_track(&record.track_id))
                .map(|track| {
                    if !track.splits_balanced() {
                        warn!(
                            artist_id = %artist_id,
                            track_id = %track.id,
                            split_total = %track.split_total(),
                            "Ownership splits do not sum to 100%, applying as recorded"
                        );
                    }
                    track.splits.as_slice()
                })
                .unwrap_or(&[]);

            line_items.push(RoyaltyLineItem::from_usage(record, self.distributor_cut, splits));
        }

        let statement = RoyaltyStatement::draft(
            artist_id,
            window.start,
            window.end,
            self.distributor_cut,
            line_items,
            time::now(),
        );
        self.statements.insert(&statement).await?;

        info!(
            statement_id = %statement.id,
            artist_id = %artist_id,
            line_items = statement.line_items.len(),
            gross = %statement.gross_revenue,
            net = %statement.net_to_artist,
            "Draft statement created"
        );

        Ok(statement)
    }

    /// Release referenced by a usage record, if it is one of ours
    async fn lookup_release(&self, release_id: &str) -> Result<Option<Release>> {
        match Uuid::parse_str(release_id) {
            Ok(id) => self.releases.get(id).await,
            Err(_) => {
                debug!(release_id = %release_id, "Usage references an external release id");
                Ok(None)
            }
        }
    }
}

fn summarize(
    period_start: NaiveDate,
    period_end: NaiveDate,
    outcomes: Vec<ArtistOutcome>,
) -> GenerationSummary {
    let mut statements = Vec::new();
    let mut failed_artist_ids = Vec::new();
    let mut skipped_artist_ids = Vec::new();

    for outcome in outcomes {
        match outcome {
            ArtistOutcome::Created(statement) => statements.push(statement),
            ArtistOutcome::Failed(artist_id) => failed_artist_ids.push(artist_id),
            ArtistOutcome::Skipped(artist_id) => skipped_artist_ids.push(artist_id),
        }
    }

    statements.sort_by(|a, b| a.artist_id.cmp(&b.artist_id));
    failed_artist_ids.sort();
    skipped_artist_ids.sort();

    GenerationSummary {
        period_start,
        period_end,
        statements_created: statements.len(),
        total_gross_revenue: statements.iter().map(|s| s.gross_revenue).sum(),
        total_distributor_cut: statements.iter().map(|s| s.distributor_cut_amount).sum(),
        total_net_to_artists: statements.iter().map(|s| s.net_to_artist).sum(),
        artist_ids: statements.iter().map(|s| s.artist_id.clone()).collect(),
        statement_ids: statements.iter().map(|s| s.id).collect(),
        failed_artist_ids,
        cancelled: !skipped_artist_ids.is_empty(),
        skipped_artist_ids,
    }
}
