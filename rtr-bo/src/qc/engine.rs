//! Scored QC rule set
//!
//! Rules run in a fixed order against a score that starts at 100:
//!
//! | # | Rule | Code | Severity | Penalty |
//! |---|------|------|----------|---------|
//! | 1 | Release title not blank | `MISSING_TITLE` | critical | 25 |
//! | 2 | At least one track | `NO_TRACKS` | critical | 30 |
//! | 3 | Track has ISRC | `MISSING_ISRC` | error | 15 per track |
//! | 4 | Track duration > 0 | `INVALID_DURATION` | error | 15 per track |
//! | 5 | "explicit" in title but flag unset | `EXPLICIT_FLAG_MISMATCH` | warning | 5 per track |
//!
//! Track rules are skipped when rule 2 fails. The score is floored at 0 and the
//! release passes when `score >= pass_threshold`. Penalties and threshold come
//! from `[qc]` configuration.

use chrono::{DateTime, Utc};
use rtr_common::config::QcConfig;

use super::codes;
use crate::models::{QcFinding, QcResult, QcSeverity, QcStatus, Release, Track};

const MAX_SCORE: u32 = 100;

/// Stateless QC evaluator
#[derive(Debug, Clone)]
pub struct QcEngine {
    config: QcConfig,
}

impl Default for QcEngine {
    fn default() -> Self {
        Self::new(QcConfig::default())
    }
}

impl QcEngine {
    pub fn new(config: QcConfig) -> Self {
        Self { config }
    }

    /// Evaluate a release and its tracks.
    ///
    /// Pure: identical input (including `checked_at`) yields an identical
    /// result. The caller persists the outcome.
    pub fn validate(&self, release: &Release, checked_at: DateTime<Utc>) -> QcResult {
        let mut findings = Vec::new();
        let mut penalty: u32 = 0;

        if release.title.trim().is_empty() {
            findings.push(QcFinding::new(
                codes::MISSING_TITLE,
                "Release title is missing",
                QcSeverity::Critical,
            ));
            penalty = penalty.saturating_add(self.config.missing_title_penalty);
        }

        if release.tracks.is_empty() {
            findings.push(QcFinding::new(
                codes::NO_TRACKS,
                "Release has no tracks",
                QcSeverity::Critical,
            ));
            penalty = penalty.saturating_add(self.config.no_tracks_penalty);
        } else {
            for track in &release.tracks {
                penalty = penalty.saturating_add(self.check_track(track, &mut findings));
            }
        }

        let score = MAX_SCORE.saturating_sub(penalty);
        let status = if score >= self.config.pass_threshold {
            QcStatus::Passed
        } else {
            QcStatus::Failed
        };

        let summary = match (status, findings.is_empty()) {
            (_, true) => "All QC checks passed".to_string(),
            (QcStatus::Passed, false) => {
                format!("QC passed with {} finding(s), score {}", findings.len(), score)
            }
            (QcStatus::Failed, false) => {
                format!("QC failed with {} finding(s), score {}", findings.len(), score)
            }
        };

        QcResult {
            status,
            score,
            findings,
            summary,
            checked_at,
        }
    }

    /// Per-track rules 3-5. Returns the accumulated penalty.
    fn check_track(&self, track: &Track, findings: &mut Vec<QcFinding>) -> u32 {
        let mut penalty: u32 = 0;
        let label = if track.title.trim().is_empty() {
            track.id.to_string()
        } else {
            track.title.clone()
        };

        if !track.has_isrc() {
            findings.push(
                QcFinding::new(
                    codes::MISSING_ISRC,
                    format!("Track '{}' has no ISRC", label),
                    QcSeverity::Error,
                )
                .for_track(track.id),
            );
            penalty = penalty.saturating_add(self.config.missing_isrc_penalty);
        }

        if track.duration_seconds <= 0 {
            findings.push(
                QcFinding::new(
                    codes::INVALID_DURATION,
                    format!(
                        "Track '{}' has invalid duration {}s",
                        label, track.duration_seconds
                    ),
                    QcSeverity::Error,
                )
                .for_track(track.id),
            );
            penalty = penalty.saturating_add(self.config.invalid_duration_penalty);
        }

        if track.title.to_lowercase().contains("explicit") && !track.explicit {
            findings.push(
                QcFinding::new(
                    codes::EXPLICIT_FLAG_MISMATCH,
                    format!(
                        "Track '{}' mentions explicit content but is not flagged explicit",
                        label
                    ),
                    QcSeverity::Warning,
                )
                .for_track(track.id),
            );
            penalty = penalty.saturating_add(self.config.explicit_mismatch_penalty);
        }

        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewRelease, NewTrack};

    fn release(title: &str, tracks: Vec<NewTrack>) -> Release {
        let mut release = Release::new(
            NewRelease {
                artist_id: "artist-1".to_string(),
                title: title.to_string(),
                ..Default::default()
            },
            Utc::now(),
        );
        let id = release.id;
        release.tracks = tracks.into_iter().map(|t| Track::from_new(id, t)).collect();
        release
    }

    fn track(title: &str, duration_seconds: i64, isrc: Option<&str>) -> NewTrack {
        NewTrack {
            title: title.to_string(),
            duration_seconds,
            isrc: isrc.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_release_scores_100() {
        let release = release("Album", vec![track("T1", 180, Some("USRC001"))]);
        let result = QcEngine::default().validate(&release, Utc::now());

        assert_eq!(result.score, 100);
        assert_eq!(result.status, QcStatus::Passed);
        assert!(result.findings.is_empty());
        assert_eq!(result.summary, "All QC checks passed");
    }

    #[test]
    fn test_blank_title_and_no_tracks() {
        let release = release("", vec![]);
        let result = QcEngine::default().validate(&release, Utc::now());

        let codes: Vec<_> = result.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec![codes::MISSING_TITLE, codes::NO_TRACKS]);
        assert_eq!(result.score, 45);
        assert_eq!(result.status, QcStatus::Failed);
        assert!(result
            .findings
            .iter()
            .all(|f| f.severity == QcSeverity::Critical));
    }

    #[test]
    fn test_zero_tracks_fails_critical() {
        let release = release("Titled", vec![]);
        let result = QcEngine::default().validate(&release, Utc::now());

        assert!(result.score <= 70);
        assert_eq!(result.status, QcStatus::Failed);
        let finding = &result.findings[0];
        assert_eq!(finding.code, codes::NO_TRACKS);
        assert_eq!(finding.severity, QcSeverity::Critical);
        assert!(finding.track_id.is_none());
    }

    #[test]
    fn test_per_track_penalties_accumulate() {
        let release = release(
            "Album",
            vec![
                track("T1", 0, None),
                track("Explicit Version", 200, Some("USRC002")),
            ],
        );
        let result = QcEngine::default().validate(&release, Utc::now());

        // 15 + 15 + 5
        assert_eq!(result.score, 65);
        assert_eq!(result.status, QcStatus::Failed);
        assert_eq!(result.findings.len(), 3);
        assert_eq!(result.findings[0].track_id, Some(release.tracks[0].id));
        assert_eq!(result.findings[2].code, codes::EXPLICIT_FLAG_MISMATCH);
        assert_eq!(result.findings[2].track_id, Some(release.tracks[1].id));
    }

    #[test]
    fn test_warning_only_still_passes() {
        let mut new_track = track("explicit intro", 90, Some("USRC003"));
        new_track.explicit = false;
        let release = release("EP", vec![new_track]);
        let result = QcEngine::default().validate(&release, Utc::now());

        assert_eq!(result.score, 95);
        assert!(result.passed());
        assert!(result.has_finding(codes::EXPLICIT_FLAG_MISMATCH));
    }

    #[test]
    fn test_flagged_explicit_track_is_clean() {
        let mut new_track = track("Explicit Version", 90, Some("USRC003"));
        new_track.explicit = true;
        let result = QcEngine::default().validate(&release("EP", vec![new_track]), Utc::now());
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_score_floored_at_zero() {
        let tracks = (0..10).map(|i| track(&format!("T{}", i), 0, None)).collect();
        let result = QcEngine::default().validate(&release("Big", tracks), Utc::now());
        assert_eq!(result.score, 0);
        assert_eq!(result.findings.len(), 20);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let release = release("Album", vec![track("T1", 180, None)]);
        let lenient = QcEngine::new(QcConfig {
            pass_threshold: 85,
            ..Default::default()
        });
        assert!(lenient.validate(&release, Utc::now()).passed());

        let strict = QcEngine::new(QcConfig {
            pass_threshold: 90,
            ..Default::default()
        });
        assert!(!strict.validate(&release, Utc::now()).passed());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let release = release(
            "Album",
            vec![track("T1", -3, None), track("Explicit", 10, Some("X"))],
        );
        let engine = QcEngine::default();
        let checked_at = Utc::now();
        assert_eq!(
            engine.validate(&release, checked_at),
            engine.validate(&release, checked_at)
        );
    }

    #[test]
    fn test_oversized_penalties_saturate_to_zero_score() {
        let engine = QcEngine::new(QcConfig {
            missing_isrc_penalty: u32::MAX,
            invalid_duration_penalty: u32::MAX,
            ..QcConfig::default()
        });
        let release = release("Album", vec![track("T1", 0, None), track("T2", 0, None)]);

        let result = engine.validate(&release, Utc::now());

        assert_eq!(result.score, 0);
        assert_eq!(result.status, QcStatus::Failed);
        assert_eq!(result.findings.len(), 4);
    }
}
