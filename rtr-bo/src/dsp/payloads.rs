//! Per-DSP payload shapes

use rtr_common::{Error, Result};
use serde::Serialize;

use super::{Dsp, TrackMetadata};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotifyPayload {
    pub isrc: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album_name: String,
    pub track_number: u32,
    pub duration_ms: i64,
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppleMusicPayload {
    pub isrc: String,
    pub title: String,
    pub artist_name: String,
    pub collection_name: String,
    pub upc: Option<String>,
    pub track_number: u32,
    pub duration_millis: i64,
    /// `explicit` or `clean`
    pub content_advisory: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmazonMusicPayload {
    pub isrc: String,
    pub track_title: String,
    pub artist: String,
    pub album_title: String,
    pub duration_seconds: i64,
    pub parental_advisory: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatportPayload {
    pub isrc: String,
    pub title: String,
    pub artist: String,
    pub release_title: String,
    pub length_ms: i64,
    pub bpm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShazamPayload {
    pub isrc: String,
    pub title: String,
    pub artist: String,
    pub album: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TikTokPayload {
    pub isrc: String,
    pub title: String,
    pub artist: String,
    pub duration_seconds: i64,
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YouTubeMusicPayload {
    pub isrc: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_seconds: i64,
    pub explicit: bool,
}

/// Mapped payload, tagged with its DSP
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dsp", rename_all = "snake_case")]
pub enum DspPayload {
    Spotify(SpotifyPayload),
    AppleMusic(AppleMusicPayload),
    AmazonMusic(AmazonMusicPayload),
    Beatport(BeatportPayload),
    Shazam(ShazamPayload),
    #[serde(rename = "tiktok")]
    TikTok(TikTokPayload),
    #[serde(rename = "youtube_music")]
    YouTubeMusic(YouTubeMusicPayload),
}

impl DspPayload {
    pub fn dsp(&self) -> Dsp {
        match self {
            DspPayload::Spotify(_) => Dsp::Spotify,
            DspPayload::AppleMusic(_) => Dsp::AppleMusic,
            DspPayload::AmazonMusic(_) => Dsp::AmazonMusic,
            DspPayload::Beatport(_) => Dsp::Beatport,
            DspPayload::Shazam(_) => Dsp::Shazam,
            DspPayload::TikTok(_) => Dsp::TikTok,
            DspPayload::YouTubeMusic(_) => Dsp::YouTubeMusic,
        }
    }
}

/// Map common metadata into `dsp`'s payload.
///
/// Fails with `Error::Validation` naming every missing required field.
pub fn map_track(dsp: Dsp, metadata: &TrackMetadata) -> Result<DspPayload> {
    let missing: Vec<&str> = dsp
        .required_fields()
        .iter()
        .copied()
        .filter(|field| match *field {
            "isrc" => metadata.isrc.is_none(),
            "bpm" => metadata.bpm.is_none(),
            _ => false,
        })
        .collect();

    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "{} payload for track '{}' ({}) is missing required field(s): {}",
            dsp,
            metadata.title,
            metadata.track_id,
            missing.join(", ")
        )));
    }

    let isrc = metadata.isrc.clone().unwrap_or_default();
    let duration_ms = metadata.duration_seconds.saturating_mul(1000);

    let payload = match dsp {
        Dsp::Spotify => DspPayload::Spotify(SpotifyPayload {
            isrc,
            name: metadata.title.clone(),
            artists: vec![metadata.artist.clone()],
            album_name: metadata.release_title.clone(),
            track_number: metadata.track_number,
            duration_ms,
            explicit: metadata.explicit,
        }),
        Dsp::AppleMusic => DspPayload::AppleMusic(AppleMusicPayload {
            isrc,
            title: metadata.title.clone(),
            artist_name: metadata.artist.clone(),
            collection_name: metadata.release_title.clone(),
            upc: metadata.upc.clone(),
            track_number: metadata.track_number,
            duration_millis: duration_ms,
            content_advisory: if metadata.explicit { "explicit" } else { "clean" }.to_string(),
        }),
        Dsp::AmazonMusic => DspPayload::AmazonMusic(AmazonMusicPayload {
            isrc,
            track_title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            album_title: metadata.release_title.clone(),
            duration_seconds: metadata.duration_seconds,
            parental_advisory: metadata.explicit,
        }),
        Dsp::Beatport => DspPayload::Beatport(BeatportPayload {
            isrc,
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            release_title: metadata.release_title.clone(),
            length_ms: duration_ms,
            bpm: metadata.bpm.unwrap_or_default(),
        }),
        Dsp::Shazam => DspPayload::Shazam(ShazamPayload {
            isrc,
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            album: metadata.release_title.clone(),
        }),
        Dsp::TikTok => DspPayload::TikTok(TikTokPayload {
            isrc,
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            duration_seconds: metadata.duration_seconds,
            explicit: metadata.explicit,
        }),
        Dsp::YouTubeMusic => DspPayload::YouTubeMusic(YouTubeMusicPayload {
            isrc,
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            album: metadata.release_title.clone(),
            duration_seconds: metadata.duration_seconds,
            explicit: metadata.explicit,
        }),
    };

    Ok(payload)
}
