//! rtr-bo library - release-to-royalty back office
//!
//! Takes a release from track intake through QC and DSP delivery, then turns
//! usage into royalty statements and payouts. Exposed as a library for the
//! binary and for integration testing.

pub mod api;
pub mod cli;
pub mod db;
pub mod dsp;
pub mod error;
pub mod models;
pub mod qc;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use rtr_common::config::TomlConfig;
use rtr_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::db::SqliteUsageSource;
use crate::qc::QcEngine;
use crate::services::{DeliveryOrchestrator, ReleaseService, RoyaltyEngine, StatementLifecycle};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub releases: ReleaseService,
    pub deliveries: DeliveryOrchestrator,
    pub royalty: RoyaltyEngine,
    pub statements: StatementLifecycle,
    pub usage: SqliteUsageSource,
    /// Cancelled on server shutdown; long-running requests take child tokens
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire services onto one pool. Fails on an invalid royalty configuration.
    pub fn new(db: SqlitePool, config: TomlConfig) -> Result<Self> {
        let usage = SqliteUsageSource::new(db.clone());
        let royalty = RoyaltyEngine::new(db.clone(), Arc::new(usage.clone()), &config.royalty);
        let statements = StatementLifecycle::new(db.clone(), &config.royalty)?;

        Ok(Self {
            releases: ReleaseService::new(db.clone(), QcEngine::new(config.qc.clone())),
            deliveries: DeliveryOrchestrator::new(db.clone()),
            royalty,
            statements,
            usage,
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
            db,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::release_routes())
        .merge(api::delivery_routes())
        .merge(api::royalty_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
