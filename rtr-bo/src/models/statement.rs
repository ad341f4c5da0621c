//! Royalty statement model
//!
//! Statement lifecycle: `Draft` → `Finalized` → `Paid`, forward only.

use chrono::{DateTime, NaiveDate, Utc};
use rtr_common::{Error, Money, Percentage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::release::OwnershipSplit;
use super::usage::UsageRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementStatus {
    Draft,
    Finalized,
    Paid,
}

impl StatementStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementStatus::Draft => "draft",
            StatementStatus::Finalized => "finalized",
            StatementStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(StatementStatus::Draft),
            "finalized" => Ok(StatementStatus::Finalized),
            "paid" => Ok(StatementStatus::Paid),
            _ => Err(Error::Validation(format!("Unknown statement status: {:?}", s))),
        }
    }
}

/// Participant's share of one line item's net amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSplit {
    pub participant_id: String,
    pub name: String,
    pub share_percent: Percentage,
    pub amount: Money,
}

/// One usage record's contribution to a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyLineItem {
    pub release_id: String,
    pub track_id: String,
    pub track_title: String,
    pub source: String,
    pub territory: String,
    pub streams: u64,
    pub revenue: Money,
    pub distributor_cut_amount: Money,
    pub net_to_artist: Money,
    pub splits: Vec<ParticipantSplit>,
}

impl RoyaltyLineItem {
    /// Price one usage record.
    ///
    /// `cut = round(revenue x cut% / 100, 2)`, `net = revenue - cut`, and each
    /// participant receives `round(net x share% / 100, 2)`.
    pub fn from_usage(usage: &UsageRecord, cut: Percentage, splits: &[OwnershipSplit]) -> Self {
        let revenue = usage.revenue;
        let distributor_cut_amount = revenue.percentage_of(cut);
        let net_to_artist = revenue - distributor_cut_amount;

        let splits = splits
            .iter()
            .map(|split| ParticipantSplit {
                participant_id: split.participant_id.clone(),
                name: split.name.clone(),
                share_percent: split.share_percent,
                amount: net_to_artist.percentage_of(split.share_percent),
            })
            .collect();

        Self {
            release_id: usage.release_id.clone(),
            track_id: usage.track_id.clone(),
            track_title: usage.track_title.clone(),
            source: usage.source.clone(),
            territory: usage.territory.clone(),
            streams: usage.streams,
            revenue,
            distributor_cut_amount,
            net_to_artist,
            splits,
        }
    }
}

/// Artist earnings for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyStatement {
    pub id: Uuid,
    pub artist_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub distributor_cut_percent: Percentage,
    pub gross_revenue: Money,
    pub distributor_cut_amount: Money,
    pub net_to_artist: Money,
    /// `net_to_artist` minus the sum of line-item nets. Non-zero when
    /// per-line rounding drifts from the statement-level cut.
    #[serde(default)]
    pub rounding_adjustment: Money,
    pub line_items: Vec<RoyaltyLineItem>,
    pub status: StatementStatus,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    /// Set exactly when the statement is `Paid`
    pub payout_id: Option<Uuid>,
}

impl RoyaltyStatement {
    /// Build a draft statement from priced line items.
    ///
    /// The statement-level cut is computed from the statement gross, so
    /// `gross = cut + net` holds exactly. It may differ by a few cents from the
    /// sum of per-line cuts; that drift is kept in `rounding_adjustment`.
    pub fn draft(
        artist_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        cut: Percentage,
        line_items: Vec<RoyaltyLineItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let gross_revenue: Money = line_items.iter().map(|item| item.revenue).sum();
        let distributor_cut_amount = gross_revenue.percentage_of(cut);
        let net_to_artist = gross_revenue - distributor_cut_amount;
        let line_net: Money = line_items.iter().map(|item| item.net_to_artist).sum();
        let rounding_adjustment = net_to_artist - line_net;

        Self {
            id: Uuid::new_v4(),
            artist_id: artist_id.to_string(),
            period_start,
            period_end,
            distributor_cut_percent: cut,
            gross_revenue,
            distributor_cut_amount,
            net_to_artist,
            rounding_adjustment,
            line_items,
            status: StatementStatus::Draft,
            created_at,
            finalized_at: None,
            payout_id: None,
        }
    }

    pub fn arithmetic_balanced(&self) -> bool {
        self.gross_revenue == self.distributor_cut_amount + self.net_to_artist
    }
}
