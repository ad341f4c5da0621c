//! DSP delivery record

use chrono::{DateTime, Utc};
use rtr_common::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Ack,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Queued => "QUEUED",
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Ack => "ACK",
            DeliveryStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "QUEUED" => Ok(DeliveryStatus::Queued),
            "SENT" => Ok(DeliveryStatus::Sent),
            "ACK" | "ACKNOWLEDGED" => Ok(DeliveryStatus::Ack),
            "FAILED" => Ok(DeliveryStatus::Failed),
            _ => Err(Error::Validation(format!("Unknown delivery status: {:?}", s))),
        }
    }
}

/// One release queued for one DSP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub release_id: Uuid,
    /// Canonical DSP name
    pub dsp: String,
    pub status: DeliveryStatus,
    /// `{release_id}_{dsp}_{release updated_at epoch millis}`
    pub dedupe_key: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Delivery {
    pub fn dedupe_key(release_id: &Uuid, dsp: &str, release_updated_at: &DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}",
            release_id,
            dsp,
            rtr_common::time::epoch_millis(release_updated_at)
        )
    }

    /// Apply a status change reported by the external sender.
    ///
    /// `SENT` stamps `sent_at`, `ACK` stamps `acknowledged_at`. Any supplied
    /// error text becomes `last_error`, whatever the status.
    pub fn apply_status(&mut self, status: DeliveryStatus, error: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        match status {
            DeliveryStatus::Sent => self.sent_at = Some(now),
            DeliveryStatus::Ack => self.acknowledged_at = Some(now),
            DeliveryStatus::Queued | DeliveryStatus::Failed => {}
        }
        if let Some(error) = error {
            self.last_error = Some(error);
        }
        self.updated_at = now;
    }
}
