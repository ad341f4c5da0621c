//! Delivery orchestrator
//!
//! Fans a ready release out to one `QUEUED` delivery per selected DSP. Every
//! track is mapped through each DSP's payload contract before anything is
//! written, so a release with incomplete metadata queues nothing.

use rtr_common::{time, Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{DeliveryRepository, ReleaseRepository};
use crate::dsp::{parse_dsps, Dsp, TrackMetadata};
use crate::models::{Caller, Delivery, DeliveryStatus, Release, ReleaseStatus};

#[derive(Debug, Clone)]
pub struct DeliveryOrchestrator {
    releases: ReleaseRepository,
    deliveries: DeliveryRepository,
}

impl DeliveryOrchestrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            releases: ReleaseRepository::new(pool.clone()),
            deliveries: DeliveryRepository::new(pool),
        }
    }

    /// Queue one delivery per DSP and mark the release scheduled
    pub async fn queue_deliveries(
        &self,
        caller: &Caller,
        release_id: Uuid,
        dsp_names: &[String],
    ) -> Result<Vec<Delivery>> {
        if dsp_names.is_empty() {
            return Err(Error::Validation("dsps must not be empty".to_string()));
        }
        let dsps = parse_dsps(dsp_names)?;

        let release = self.releases.require(release_id).await?;
        if !matches!(
            release.status,
            ReleaseStatus::ReadyForDelivery | ReleaseStatus::Delivered
        ) {
            return Err(Error::InvalidOperation(format!(
                "Release {} is {}, only releases ready for delivery can be queued",
                release_id, release.status
            )));
        }

        validate_payloads(&release, &dsps)?;

        let now = time::now();
        let deliveries: Vec<Delivery> = dsps
            .iter()
            .map(|dsp| Delivery {
                id: Uuid::new_v4(),
                release_id: release.id,
                dsp: dsp.as_str().to_string(),
                status: DeliveryStatus::Queued,
                dedupe_key: Delivery::dedupe_key(&release.id, dsp.as_str(), &release.updated_at),
                sent_at: None,
                acknowledged_at: None,
                last_error: None,
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.deliveries.queue(&release, &deliveries, now).await?;

        info!(
            release_id = %release_id,
            dsps = ?dsps.iter().map(Dsp::as_str).collect::<Vec<_>>(),
            caller = %caller,
            "Release scheduled for delivery"
        );

        Ok(deliveries)
    }

    /// Deliveries of an existing release, oldest first
    pub async fn get_deliveries(&self, release_id: Uuid) -> Result<Vec<Delivery>> {
        self.releases.require(release_id).await?;
        self.deliveries.list_by_release(release_id).await
    }

    /// Record a status reported by the external sender
    pub async fn update_delivery_status(
        &self,
        caller: &Caller,
        delivery_id: Uuid,
        status: DeliveryStatus,
        error: Option<String>,
    ) -> Result<Delivery> {
        let mut delivery = self
            .deliveries
            .get(delivery_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Delivery {} not found", delivery_id)))?;

        let previous = delivery.status;
        delivery.apply_status(status, error, time::now());
        self.deliveries.replace(&delivery).await?;

        info!(
            delivery_id = %delivery_id,
            release_id = %delivery.release_id,
            dsp = %delivery.dsp,
            from = %previous,
            to = %status,
            caller = %caller,
            "Delivery status updated"
        );

        Ok(delivery)
    }
}

/// Map every track for every DSP, collecting all failures into one error
fn validate_payloads(release: &Release, dsps: &[Dsp]) -> Result<()> {
    if release.tracks.is_empty() {
        return Err(Error::Validation(format!(
            "Release {} has no tracks to deliver",
            release.id
        )));
    }

    let metadata = TrackMetadata::for_release(release);
    let mut problems = Vec::new();

    for dsp in dsps {
        for track in &metadata {
            if let Err(e) = dsp.map_track(track) {
                problems.push(match e {
                    Error::Validation(message) => message,
                    other => other.to_string(),
                });
            }
        }
    }

    if !problems.is_empty() {
        return Err(Error::Validation(problems.join("; ")));
    }

    debug!(
        release_id = %release.id,
        payloads = metadata.len() * dsps.len(),
        "DSP payloads mapped"
    );

    Ok(())
}
