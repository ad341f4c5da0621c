//! Distribution-readiness check
//!
//! Store-facing metadata that DSP ingestion requires on top of the scored QC
//! rules. Every missing item is its own finding; the verdict is boolean.

use super::codes;
use crate::models::{QcFinding, QcSeverity, ReadinessReport, Release};

/// UPC/EAN lengths accepted after stripping non-digits
const UPC_LENGTHS: [usize; 2] = [12, 13];

pub fn check_readiness(release: &Release) -> ReadinessReport {
    let mut findings = Vec::new();

    match release.upc.as_deref().map(str::trim).filter(|upc| !upc.is_empty()) {
        None => findings.push(QcFinding::new(
            codes::MISSING_UPC,
            "Release has no UPC",
            QcSeverity::Error,
        )),
        Some(upc) => {
            let digits = upc.chars().filter(char::is_ascii_digit).count();
            if !UPC_LENGTHS.contains(&digits) {
                findings.push(QcFinding::new(
                    codes::INVALID_UPC,
                    format!("UPC {:?} must have 12 or 13 digits, found {}", upc, digits),
                    QcSeverity::Error,
                ));
            }
        }
    }

    if release
        .cover_art_ref
        .as_deref()
        .map_or(true, |art| art.trim().is_empty())
    {
        findings.push(QcFinding::new(
            codes::MISSING_COVER_ART,
            "Release has no cover art",
            QcSeverity::Error,
        ));
    }

    if release.release_date.is_none() {
        findings.push(QcFinding::new(
            codes::MISSING_RELEASE_DATE,
            "Release has no release date",
            QcSeverity::Error,
        ));
    }

    ReadinessReport {
        release_id: release.id,
        ready: findings.is_empty(),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRelease;
    use chrono::{NaiveDate, Utc};

    fn release(upc: Option<&str>, cover: Option<&str>, date: Option<NaiveDate>) -> Release {
        Release::new(
            NewRelease {
                artist_id: "artist-1".to_string(),
                title: "Album".to_string(),
                upc: upc.map(str::to_string),
                cover_art_ref: cover.map(str::to_string),
                release_date: date,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_complete_release_is_ready() {
        let report = check_readiness(&release(
            Some("0-12345-67890-5"),
            Some("s3://art/cover.jpg"),
            NaiveDate::from_ymd_opt(2025, 11, 7),
        ));
        assert!(report.ready);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_each_missing_item_is_a_finding() {
        let report = check_readiness(&release(None, None, None));
        assert!(!report.ready);
        let codes: Vec<_> = report.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                codes::MISSING_UPC,
                codes::MISSING_COVER_ART,
                codes::MISSING_RELEASE_DATE
            ]
        );
    }

    #[test]
    fn test_upc_digit_count() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 7);
        assert!(check_readiness(&release(Some("4006381333931"), Some("c"), date)).ready);
        assert!(check_readiness(&release(Some("012345678905"), Some("c"), date)).ready);

        let report = check_readiness(&release(Some("12345"), Some("c"), date));
        assert!(!report.ready);
        assert_eq!(report.findings[0].code, codes::INVALID_UPC);
    }

    #[test]
    fn test_blank_cover_art_is_missing() {
        let report = check_readiness(&release(
            Some("012345678905"),
            Some("  "),
            NaiveDate::from_ymd_opt(2025, 11, 7),
        ));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].code, codes::MISSING_COVER_ART);
    }
}
