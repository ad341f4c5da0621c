//! Database initialization
//!
//! Releases and statements are one row each, with nested documents (tracks,
//! QC result, line items) in JSON columns, so every state change is a
//! single-row update. Release rows carry a `revision` counter checked by
//! read-modify-write updates.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (or create) the database file and create tables if needed
///
/// Every pooled connection gets the same pragmas (WAL journal, foreign keys,
/// busy timeout).
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_releases_table(pool).await?;
    create_statements_table(pool).await?;
    create_payouts_table(pool).await?;
    create_deliveries_table(pool).await?;
    create_usage_records_table(pool).await?;

    info!("Database tables initialized (releases, statements, payouts, deliveries, usage_records)");

    Ok(())
}

async fn create_releases_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS releases (
            id TEXT PRIMARY KEY,
            artist_id TEXT NOT NULL,
            title TEXT NOT NULL,
            primary_artist TEXT NOT NULL,
            release_type TEXT NOT NULL,
            upc TEXT,
            cover_art_ref TEXT,
            release_date TEXT,
            status TEXT NOT NULL DEFAULT 'draft'
                CHECK (status IN ('draft', 'qc_in_progress', 'qc_failed', 'ready_for_delivery', 'delivered')),
            revision INTEGER NOT NULL DEFAULT 0,
            tracks TEXT NOT NULL DEFAULT '[]',
            qc_result TEXT,
            delivery_scheduled_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_releases_artist ON releases(artist_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_statements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statements (
            id TEXT PRIMARY KEY,
            artist_id TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            distributor_cut_bps INTEGER NOT NULL,
            gross_revenue_cents INTEGER NOT NULL,
            distributor_cut_cents INTEGER NOT NULL,
            net_to_artist_cents INTEGER NOT NULL,
            rounding_adjustment_cents INTEGER NOT NULL DEFAULT 0,
            line_items TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'draft'
                CHECK (status IN ('draft', 'finalized', 'paid')),
            created_at TEXT NOT NULL,
            finalized_at TEXT,
            payout_id TEXT UNIQUE,
            CHECK (period_start < period_end),
            CHECK (gross_revenue_cents = distributor_cut_cents + net_to_artist_cents),
            CHECK ((status = 'paid') = (payout_id IS NOT NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_statements_artist_period ON statements(artist_id, period_start, period_end)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_payouts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payouts (
            id TEXT PRIMARY KEY,
            artist_id TEXT NOT NULL,
            statement_id TEXT NOT NULL UNIQUE REFERENCES statements(id),
            amount_cents INTEGER NOT NULL,
            scheduled_for TEXT NOT NULL,
            method TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'paid')),
            created_at TEXT NOT NULL,
            paid_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_payouts_artist ON payouts(artist_id, status)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_deliveries_table(pool: &SqlitePool) -> Result<()> {
    // dedupe_key is not UNIQUE: requeueing an unchanged release repeats it
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deliveries (
            id TEXT PRIMARY KEY,
            release_id TEXT NOT NULL REFERENCES releases(id),
            dsp TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'QUEUED'
                CHECK (status IN ('QUEUED', 'SENT', 'ACK', 'FAILED')),
            dedupe_key TEXT NOT NULL,
            sent_at TEXT,
            acknowledged_at TEXT,
            last_error TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_deliveries_release ON deliveries(release_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_deliveries_dedupe ON deliveries(dedupe_key)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_usage_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usage_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artist_id TEXT NOT NULL,
            release_id TEXT NOT NULL,
            track_id TEXT NOT NULL,
            track_title TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL DEFAULT '',
            territory TEXT NOT NULL DEFAULT '',
            streams INTEGER,
            revenue_cents INTEGER,
            usage_date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_usage_artist_date ON usage_records(artist_id, usage_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
