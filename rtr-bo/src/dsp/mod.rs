//! DSP payload mapping
//!
//! Each supported DSP has a pure mapping from common track metadata into its
//! own payload shape, with its own required-field set. Wire formatting and
//! transport belong to the external sender; the orchestrator only needs a
//! validated payload per track before it queues a delivery.

pub mod payloads;

use rtr_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Release, Track};

pub use payloads::{
    AmazonMusicPayload, AppleMusicPayload, BeatportPayload, DspPayload, ShazamPayload,
    SpotifyPayload, TikTokPayload, YouTubeMusicPayload,
};

/// Supported digital service providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dsp {
    Spotify,
    AppleMusic,
    AmazonMusic,
    Beatport,
    Shazam,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "youtube_music")]
    YouTubeMusic,
}

impl Dsp {
    pub const ALL: [Dsp; 7] = [
        Dsp::Spotify,
        Dsp::AppleMusic,
        Dsp::AmazonMusic,
        Dsp::Beatport,
        Dsp::Shazam,
        Dsp::TikTok,
        Dsp::YouTubeMusic,
    ];

    /// Canonical name, used in delivery records and dedupe keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Dsp::Spotify => "spotify",
            Dsp::AppleMusic => "apple_music",
            Dsp::AmazonMusic => "amazon_music",
            Dsp::Beatport => "beatport",
            Dsp::Shazam => "shazam",
            Dsp::TikTok => "tiktok",
            Dsp::YouTubeMusic => "youtube_music",
        }
    }

    /// Metadata fields the DSP rejects a track without
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Dsp::Beatport => &["isrc", "bpm"],
            _ => &["isrc"],
        }
    }

    /// Map one track into this DSP's payload
    pub fn map_track(&self, metadata: &TrackMetadata) -> Result<DspPayload> {
        payloads::map_track(*self, metadata)
    }
}

impl fmt::Display for Dsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dsp {
    type Err = Error;

    /// Case-insensitive, accepts common short names (`apple`, `amazon`,
    /// `youtube`)
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "spotify" => Ok(Dsp::Spotify),
            "apple" | "apple_music" | "applemusic" | "itunes" => Ok(Dsp::AppleMusic),
            "amazon" | "amazon_music" | "amazonmusic" => Ok(Dsp::AmazonMusic),
            "beatport" => Ok(Dsp::Beatport),
            "shazam" => Ok(Dsp::Shazam),
            "tiktok" | "tik_tok" => Ok(Dsp::TikTok),
            "youtube" | "youtube_music" | "youtubemusic" => Ok(Dsp::YouTubeMusic),
            _ => Err(Error::UnsupportedDsp(s.trim().to_string())),
        }
    }
}

/// DSP-neutral view of one track in its release context
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub track_id: String,
    /// 1-based position within the release
    pub track_number: u32,
    pub title: String,
    pub artist: String,
    pub release_title: String,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub duration_seconds: i64,
    pub explicit: bool,
    pub bpm: Option<f64>,
}

impl TrackMetadata {
    pub fn from_release_track(release: &Release, track: &Track, position: usize) -> Self {
        let artist = if release.primary_artist.trim().is_empty() {
            release.artist_id.clone()
        } else {
            release.primary_artist.clone()
        };

        Self {
            track_id: track.id.to_string(),
            track_number: (position + 1) as u32,
            title: track.title.clone(),
            artist,
            release_title: release.title.clone(),
            isrc: track
                .isrc
                .as_deref()
                .map(str::trim)
                .filter(|isrc| !isrc.is_empty())
                .map(str::to_string),
            upc: release.upc.clone(),
            duration_seconds: track.duration_seconds,
            explicit: track.explicit,
            bpm: track.bpm.filter(|bpm| bpm.is_finite() && *bpm > 0.0),
        }
    }

    /// Every track of a release, in order
    pub fn for_release(release: &Release) -> Vec<TrackMetadata> {
        release
            .tracks
            .iter()
            .enumerate()
            .map(|(position, track)| Self::from_release_track(release, track, position))
            .collect()
    }
}

/// Parse and de-duplicate a list of DSP names, preserving order
pub fn parse_dsps(names: &[String]) -> Result<Vec<Dsp>> {
    let mut dsps = Vec::with_capacity(names.len());
    for name in names {
        let dsp: Dsp = name.parse()?;
        if !dsps.contains(&dsp) {
            dsps.push(dsp);
        }
    }
    Ok(dsps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_aliases() {
        for dsp in Dsp::ALL {
            assert_eq!(dsp.as_str().parse::<Dsp>().unwrap(), dsp);
        }
        assert_eq!("Apple".parse::<Dsp>().unwrap(), Dsp::AppleMusic);
        assert_eq!("amazon".parse::<Dsp>().unwrap(), Dsp::AmazonMusic);
        assert_eq!("YouTube".parse::<Dsp>().unwrap(), Dsp::YouTubeMusic);
        assert_eq!("TikTok".parse::<Dsp>().unwrap(), Dsp::TikTok);
    }

    #[test]
    fn test_unknown_dsp_is_unsupported() {
        match "napster".parse::<Dsp>() {
            Err(Error::UnsupportedDsp(name)) => assert_eq!(name, "napster"),
            other => panic!("expected UnsupportedDsp, got {:?}", other),
        }
    }

    #[test]
    fn test_serde_names_match_canonical() {
        for dsp in Dsp::ALL {
            let json = serde_json::to_string(&dsp).unwrap();
            assert_eq!(json, format!("\"{}\"", dsp.as_str()));
        }
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(Dsp::Beatport.required_fields(), &["isrc", "bpm"]);
        for dsp in Dsp::ALL.iter().filter(|d| **d != Dsp::Beatport) {
            assert_eq!(dsp.required_fields(), &["isrc"]);
        }
    }

    #[test]
    fn test_parse_dsps_dedupes() {
        let names = vec![
            "spotify".to_string(),
            "tiktok".to_string(),
            "Spotify".to_string(),
        ];
        assert_eq!(parse_dsps(&names).unwrap(), vec![Dsp::Spotify, Dsp::TikTok]);

        let bad = vec!["spotify".to_string(), "deezer".to_string()];
        assert!(matches!(parse_dsps(&bad), Err(Error::UnsupportedDsp(_))));
    }
}
