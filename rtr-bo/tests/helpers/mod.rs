//! Shared fixtures for rtr-bo integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use rtr_bo::models::{Caller, NewRelease, NewTrack, OwnershipSplit, Release, UsageRecord};
use rtr_bo::AppState;
use rtr_common::config::TomlConfig;
use rtr_common::db::init_database;
use rtr_common::{Money, Percentage};
use tempfile::TempDir;

/// Temporary database plus wired application state.
/// The directory is removed when the context is dropped.
pub struct TestContext {
    pub state: AppState,
    _dir: TempDir,
}

pub async fn setup() -> TestContext {
    setup_with_config(TomlConfig::default()).await
}

pub async fn setup_with_config(config: TomlConfig) -> TestContext {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("rtr-test.db"))
        .await
        .expect("database");
    let state = AppState::new(pool, config).expect("app state");
    TestContext { state, _dir: dir }
}

pub fn caller() -> Caller {
    Caller::new("ops-user-1", None)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn new_release(artist_id: &str, title: &str) -> NewRelease {
    NewRelease {
        artist_id: artist_id.to_string(),
        title: title.to_string(),
        primary_artist: "The Testers".to_string(),
        upc: Some("012345678905".to_string()),
        cover_art_ref: Some("s3://art/cover.jpg".to_string()),
        release_date: Some(date(2024, 6, 1)),
        ..Default::default()
    }
}

pub fn track(title: &str, isrc: Option<&str>, duration_seconds: i64) -> NewTrack {
    NewTrack {
        title: title.to_string(),
        isrc: isrc.map(str::to_string),
        duration_seconds,
        ..Default::default()
    }
}

pub fn split(participant_id: &str, percent: f64) -> OwnershipSplit {
    OwnershipSplit {
        participant_id: participant_id.to_string(),
        name: participant_id.to_uppercase(),
        share_percent: Percentage::from_f64(percent),
    }
}

/// Release with one valid track that has passed QC
pub async fn ready_release(state: &AppState, artist_id: &str) -> Release {
    let caller = caller();
    let release = state
        .releases
        .create_release(&caller, new_release(artist_id, "Album"))
        .await
        .expect("create release");
    let mut t1 = track("T1", Some("USRC00000001"), 180);
    t1.bpm = Some(124.0);
    state
        .releases
        .add_tracks(&caller, release.id, vec![t1])
        .await
        .expect("add tracks");
    state.releases.run_qc(&caller, release.id).await.expect("run qc")
}

pub fn usage(artist_id: &str, release_id: &str, track_id: &str, revenue: f64, day: NaiveDate) -> UsageRecord {
    UsageRecord {
        artist_id: artist_id.to_string(),
        release_id: release_id.to_string(),
        track_id: track_id.to_string(),
        track_title: "T1".to_string(),
        source: "spotify".to_string(),
        territory: "US".to_string(),
        streams: 1000,
        revenue: Money::from_decimal(revenue),
        usage_date: day,
    }
}
