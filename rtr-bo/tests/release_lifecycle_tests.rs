//! Release state machine and QC integration tests

mod helpers;

use helpers::{caller, new_release, setup, split, track};
use rtr_bo::db::ReleaseRepository;
use rtr_bo::models::{QcSeverity, QcStatus, Release, ReleaseStatus};
use rtr_bo::qc::codes;
use rtr_common::{time, Error};
use uuid::Uuid;

#[tokio::test]
async fn test_create_release_starts_in_draft() {
    let ctx = setup().await;
    let release = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Album"))
        .await
        .unwrap();

    assert_eq!(release.status, ReleaseStatus::Draft);
    assert!(release.tracks.is_empty());
    assert!(release.qc_result.is_none());

    let stored = ctx.state.releases.get_release(release.id).await.unwrap();
    assert_eq!(stored, release);
}

#[tokio::test]
async fn test_create_release_rejects_blank_fields() {
    let ctx = setup().await;

    let err = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = ctx
        .state
        .releases
        .create_release(&caller(), new_release("", "Album"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_unknown_release_is_not_found() {
    let ctx = setup().await;
    let err = ctx.state.releases.get_release(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = ctx
        .state
        .releases
        .add_tracks(&caller(), Uuid::new_v4(), vec![track("T1", Some("X"), 10)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_list_releases_by_artist() {
    let ctx = setup().await;
    for title in ["First", "Second"] {
        ctx.state
            .releases
            .create_release(&caller(), new_release("artist-1", title))
            .await
            .unwrap();
    }
    ctx.state
        .releases
        .create_release(&caller(), new_release("artist-2", "Other"))
        .await
        .unwrap();

    let releases = ctx.state.releases.list_releases("artist-1").await.unwrap();
    assert_eq!(releases.len(), 2);
    assert!(releases.iter().all(|r| r.artist_id == "artist-1"));
}

#[tokio::test]
async fn test_scenario_a_clean_release_passes_qc() {
    let ctx = setup().await;
    let release = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Album"))
        .await
        .unwrap();
    ctx.state
        .releases
        .add_tracks(&caller(), release.id, vec![track("T1", Some("USRC001"), 180)])
        .await
        .unwrap();

    let release = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap();
    let qc = release.qc_result.as_ref().unwrap();

    assert_eq!(qc.score, 100);
    assert_eq!(qc.status, QcStatus::Passed);
    assert!(qc.findings.is_empty());
    assert_eq!(release.status, ReleaseStatus::ReadyForDelivery);

    let stored = ctx.state.releases.get_release(release.id).await.unwrap();
    assert_eq!(stored.status, ReleaseStatus::ReadyForDelivery);
    assert_eq!(stored.qc_result, release.qc_result);
}

#[tokio::test]
async fn test_scenario_b_empty_release_fails_qc() {
    let ctx = setup().await;
    let mut blank = new_release("artist-1", "Album");
    blank.title = String::new();
    let release = Release::new(blank, time::now());
    ReleaseRepository::new(ctx.state.db.clone())
        .insert(&release)
        .await
        .unwrap();

    let release = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap();
    let qc = release.qc_result.as_ref().unwrap();

    assert_eq!(qc.score, 45);
    assert_eq!(qc.status, QcStatus::Failed);
    assert!(qc.has_finding(codes::MISSING_TITLE));
    assert!(qc.has_finding(codes::NO_TRACKS));
    assert!(qc
        .findings
        .iter()
        .all(|f| f.severity == QcSeverity::Critical));
    assert_eq!(release.status, ReleaseStatus::QcFailed);
}

#[tokio::test]
async fn test_failed_release_can_be_fixed_and_requalified() {
    let ctx = setup().await;
    let release = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Album"))
        .await
        .unwrap();
    ctx.state
        .releases
        .add_tracks(
            &caller(),
            release.id,
            vec![track("No Code", None, 0), track("Another", None, 0)],
        )
        .await
        .unwrap();

    let failed = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap();
    assert_eq!(failed.status, ReleaseStatus::QcFailed);
    assert_eq!(failed.qc_result.as_ref().unwrap().score, 40);

    let back = ctx
        .state
        .releases
        .set_status(&caller(), release.id, ReleaseStatus::Draft)
        .await
        .unwrap();
    assert_eq!(back.status, ReleaseStatus::Draft);

    // Fixed tracks are appended; the broken ones still count against the score.
    let outcome = ctx
        .state
        .releases
        .add_tracks(&caller(), release.id, vec![track("Fixed", Some("USRC9"), 200)])
        .await
        .unwrap();
    assert_eq!(outcome.release.tracks.len(), 3);

    let rerun = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap();
    assert_eq!(rerun.status, ReleaseStatus::QcFailed);
}

#[tokio::test]
async fn test_qc_is_idempotent_on_unchanged_release() {
    let ctx = setup().await;
    let release = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Album"))
        .await
        .unwrap();
    ctx.state
        .releases
        .add_tracks(&caller(), release.id, vec![track("Explicit Jam", None, 120)])
        .await
        .unwrap();

    let first = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap();
    let second = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap();

    let (a, b) = (first.qc_result.unwrap(), second.qc_result.unwrap());
    assert_eq!(a.score, b.score);
    assert_eq!(a.status, b.status);
    assert_eq!(a.findings, b.findings);
    assert_eq!(a.score, 80);
    assert_eq!(first.status, second.status);
}

#[tokio::test]
async fn test_add_tracks_validation_and_split_warnings() {
    let ctx = setup().await;
    let release = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Album"))
        .await
        .unwrap();

    let err = ctx
        .state
        .releases
        .add_tracks(&caller(), release.id, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let mut uneven = track("Uneven", Some("USRC1"), 100);
    uneven.splits = vec![split("writer", 60.0), split("producer", 30.0)];
    let mut even = track("Even", Some("USRC2"), 100);
    even.splits = vec![split("writer", 50.0), split("producer", 50.0)];

    let outcome = ctx
        .state
        .releases
        .add_tracks(&caller(), release.id, vec![uneven, even])
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("Uneven"));
    // Splits are stored exactly as submitted.
    let stored = &outcome.release.tracks[0];
    assert_eq!(stored.splits.len(), 2);
    assert!(!stored.splits_balanced());
    assert!(outcome.release.updated_at >= release.updated_at);
}

#[tokio::test]
async fn test_delivered_release_is_closed_to_changes() {
    let ctx = setup().await;
    let release = helpers::ready_release(&ctx.state, "artist-1").await;
    ctx.state
        .releases
        .set_status(&caller(), release.id, ReleaseStatus::Delivered)
        .await
        .unwrap();

    let err = ctx
        .state
        .releases
        .add_tracks(&caller(), release.id, vec![track("Late", Some("X1"), 10)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));

    let err = ctx.state.releases.run_qc(&caller(), release.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));

    // The administrative override still works on a terminal release.
    let reopened = ctx
        .state
        .releases
        .set_status(&caller(), release.id, ReleaseStatus::Draft)
        .await
        .unwrap();
    assert_eq!(reopened.status, ReleaseStatus::Draft);
}

#[tokio::test]
async fn test_stale_write_is_rejected() {
    let ctx = setup().await;
    let release = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Album"))
        .await
        .unwrap();
    let repo = ReleaseRepository::new(ctx.state.db.clone());

    let mut first = repo.require(release.id).await.unwrap();
    let mut second = first.clone();

    first.title = "First writer".to_string();
    let saved = repo.replace(&first).await.unwrap();
    assert_eq!(saved.revision, release.revision + 1);

    second.title = "Second writer".to_string();
    let err = repo.replace(&second).await.unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));

    let stored = repo.require(release.id).await.unwrap();
    assert_eq!(stored.title, "First writer");
}

#[tokio::test]
async fn test_readiness_reports_each_missing_item() {
    let ctx = setup().await;
    let mut bare = new_release("artist-1", "Album");
    bare.upc = Some("12-34".to_string());
    bare.cover_art_ref = None;
    bare.release_date = None;
    let release = ctx.state.releases.create_release(&caller(), bare).await.unwrap();

    let report = ctx.state.releases.check_readiness(release.id).await.unwrap();
    assert!(!report.ready);
    let codes_found: Vec<&str> = report.findings.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(
        codes_found,
        vec![codes::INVALID_UPC, codes::MISSING_COVER_ART, codes::MISSING_RELEASE_DATE]
    );

    let complete = ctx
        .state
        .releases
        .create_release(&caller(), new_release("artist-1", "Complete"))
        .await
        .unwrap();
    let report = ctx.state.releases.check_readiness(complete.id).await.unwrap();
    assert!(report.ready);
    assert!(report.findings.is_empty());
}
