//! Catalog and royalty data model

pub mod caller;
pub mod delivery;
pub mod payout;
pub mod qc;
pub mod release;
pub mod statement;
pub mod usage;

pub use caller::Caller;
pub use delivery::{Delivery, DeliveryStatus};
pub use payout::{Payout, PayoutMethod, PayoutStatus};
pub use qc::{QcFinding, QcResult, QcSeverity, QcStatus, ReadinessReport};
pub use release::{
    NewRelease, NewTrack, OwnershipSplit, Release, ReleaseStatus, ReleaseType, Track,
};
pub use statement::{ParticipantSplit, RoyaltyLineItem, RoyaltyStatement, StatementStatus};
pub use usage::{UsageRecord, UsageWindow};
