//! Lifecycle services
//!
//! Each service owns the repositories it needs and is cheap to clone.

pub mod delivery_orchestrator;
pub mod release_service;
pub mod royalty_engine;
pub mod statement_lifecycle;

pub use delivery_orchestrator::DeliveryOrchestrator;
pub use release_service::{AddTracksOutcome, ReleaseService};
pub use royalty_engine::{GenerationSummary, RoyaltyEngine};
pub use statement_lifecycle::{EarningsSummary, StatementLifecycle};
