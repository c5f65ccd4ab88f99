use std::path::Path;

use crate::core::MediaKind;

/// What a loader should do with an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Image,
    Pdf,
    Media(MediaKind),
    /// A previously exported package
    Package,
    Unsupported,
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Guess a MIME type from a file name's extension
pub fn mime_for(name: &str) -> &'static str {
    match extension_of(name).as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "aac" => "audio/mp4",
        "opus" => "audio/opus",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Classify an input file by its name
pub fn classify(name: &str) -> InputKind {
    let mime = mime_for(name);
    if mime.starts_with("image/") {
        InputKind::Image
    } else if mime == "application/pdf" {
        InputKind::Pdf
    } else if mime == "application/zip" {
        InputKind::Package
    } else if let Some(kind) = MediaKind::from_mime(mime) {
        InputKind::Media(kind)
    } else {
        InputKind::Unsupported
    }
}
