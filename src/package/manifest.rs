//! Package manifest
//!
//! The manifest is the one JSON entry of an exported package:
//!
//! ```json
//! { "intervals": [30, 30, 12], "audioFilename": "take.mp3" }
//! ```
//!
//! `version` and `exportedAt` are written too; readers ignore them when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{clamp_interval, parse_interval, MediaKind, MIN_INTERVAL_SECS};

/// Manifest format written by this version
pub const MANIFEST_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Seconds per page, in page order
    #[serde(deserialize_with = "lenient_intervals")]
    pub intervals: Vec<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl PackageManifest {
    pub fn new(intervals: Vec<u32>, media: Option<(MediaKind, String)>) -> Self {
        let (audio_filename, video_filename) = match media {
            Some((MediaKind::Audio, name)) => (Some(name), None),
            Some((MediaKind::Video, name)) => (None, Some(name)),
            None => (None, None),
        };
        Self {
            intervals,
            audio_filename,
            video_filename,
            version: Some(MANIFEST_VERSION.to_string()),
            exported_at: Some(Utc::now()),
        }
    }

    /// Kind and filename of the media entry, if the package has one
    ///
    /// A manifest naming both an audio and a video file keeps the audio.
    pub fn media(&self) -> Option<(MediaKind, &str)> {
        match (&self.audio_filename, &self.video_filename) {
            (Some(audio), Some(video)) => {
                log::warn!("Manifest names both {} and {}, using the audio", audio, video);
                Some((MediaKind::Audio, audio))
            }
            (Some(audio), None) => Some((MediaKind::Audio, audio)),
            (None, Some(video)) => Some((MediaKind::Video, video)),
            (None, None) => None,
        }
    }
}

/// Accept any JSON value per interval, coercing it the way the editor does
fn lenient_intervals<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values.iter().map(coerce_interval).collect())
}

fn coerce_interval(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(clamp_interval)
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| clamp_interval(f.floor() as i64))
            })
            .unwrap_or(MIN_INTERVAL_SECS),
        serde_json::Value::String(s) => parse_interval(s),
        _ => MIN_INTERVAL_SECS,
    }
}
