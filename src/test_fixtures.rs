//! Test fixtures for session, playback and package tests
//!
//! Page contents are tiny fake images: tests only care that bytes survive a
//! round trip, never that they decode.

#![cfg(test)]

use crate::core::{MediaFile, MediaKind, PageImage, Session};

/// PNG signature followed by a marker unique to `n`
pub fn fake_png(n: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(format!("page-{}", n).as_bytes());
    bytes
}

/// `count` pages named `page1.png`, `page2.png`, ...
pub fn page_images(count: usize) -> Vec<PageImage> {
    (1..=count)
        .map(|n| PageImage::new(format!("page{}.png", n), "image/png", fake_png(n)))
        .collect()
}

pub fn audio_file(name: &str) -> MediaFile {
    MediaFile::new(MediaKind::Audio, name, "audio/mpeg", b"ID3fake-audio".to_vec())
}

pub fn video_file(name: &str) -> MediaFile {
    MediaFile::new(MediaKind::Video, name, "video/mp4", b"ftypfake-video".to_vec())
}

/// A session with `count` pages all set to `interval` seconds
pub fn session_with(count: usize, interval: u32) -> Session {
    let mut session = Session::default();
    session.load(page_images(count), Some(vec![interval; count]), None);
    session
}
