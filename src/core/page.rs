//! Page and media resource types
//!
//! `PageImage` and `MediaFile` are the raw blobs a loader produces. Once the
//! session adopts them they become `Page` and `MediaAttachment`, each paired
//! with the transient handle the session owns.

use serde::{Deserialize, Serialize};

use super::resources::ObjectUrl;

/// One rasterized sheet-music page as produced by a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Name the page was loaded under (original filename, or
    /// `<file>#<n>` for rasterized PDF pages)
    pub name: String,
    /// MIME type of `bytes`, e.g. `image/png`
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl PageImage {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// File extension matching the MIME type, used when exporting
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/svg+xml" => "svg",
            _ => "img",
        }
    }
}

/// A page adopted by the session
#[derive(Debug)]
pub struct Page {
    pub image: PageImage,
    pub url: ObjectUrl,
}

impl Page {
    pub fn name(&self) -> &str {
        &self.image.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.image.bytes
    }
}

/// Kind of the optional media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Infer the kind from a MIME type such as `audio/mpeg` or `video/mp4`
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("audio/") {
            Some(MediaKind::Audio)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// An audio or video file as produced by a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub kind: MediaKind,
    /// Display name, also used as the filename inside exported packages
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(
        kind: MediaKind,
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// The media track adopted by the session
#[derive(Debug)]
pub struct MediaAttachment {
    pub file: MediaFile,
    pub url: ObjectUrl,
}

impl MediaAttachment {
    pub fn kind(&self) -> MediaKind {
        self.file.kind
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }
}
