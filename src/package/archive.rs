//! Package export and import
//!
//! A package is a ZIP archive holding `manifest.json`, one entry per page
//! (`page-001.png`, ... zero padded so name order is page order) and the
//! optional media file under its own name.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::manifest::PackageManifest;
use crate::core::{sort_naturally_by, MediaFile, PageImage, SessionSnapshot};
use crate::error::{Result, ViewerError};
use crate::loading::mime_for;

/// Name of the manifest entry
pub const MANIFEST_NAME: &str = "manifest.json";

/// Contents of an imported package, ready for `Session::load`
#[derive(Debug, Clone)]
pub struct ImportedPackage {
    pub pages: Vec<PageImage>,
    pub intervals: Vec<u32>,
    pub media: Option<MediaFile>,
}

/// Entry name for page `index` of `count`
fn page_entry_name(index: usize, count: usize, extension: &str) -> String {
    let width = count.to_string().len().max(3);
    format!("page-{:0width$}.{}", index + 1, extension, width = width)
}

/// Serialize a session into package bytes
pub fn export_package(snapshot: SessionSnapshot<'_>) -> Result<Vec<u8>> {
    let page_count = snapshot.pages.len();
    let page_names: Vec<String> = snapshot
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| page_entry_name(i, page_count, page.image.extension()))
        .collect();

    // Keep the media entry from shadowing a page or the manifest
    let media_name = snapshot.media.map(|media| {
        let name = media.name();
        if name == MANIFEST_NAME || page_names.iter().any(|p| p == name) {
            format!("media-{}", name)
        } else {
            name.to_string()
        }
    });

    let manifest = PackageManifest::new(
        snapshot.intervals.to_vec(),
        snapshot.media.zip(media_name.clone()).map(|(m, name)| (m.kind(), name)),
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Images are already compressed, so only the manifest is deflated
    writer.start_file(MANIFEST_NAME, deflated)?;
    writer.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    for (page, name) in snapshot.pages.iter().zip(&page_names) {
        writer.start_file(name.as_str(), stored)?;
        writer.write_all(page.bytes())?;
    }

    if let (Some(media), Some(name)) = (snapshot.media, media_name) {
        writer.start_file(name.as_str(), stored)?;
        writer.write_all(&media.file.bytes)?;
    }

    let bytes = writer.finish()?.into_inner();
    log::info!(
        "Exported package: {} pages, {} bytes",
        page_count,
        bytes.len()
    );
    Ok(bytes)
}

/// Export a session to a package file
pub fn write_package(snapshot: SessionSnapshot<'_>, path: &Path) -> Result<()> {
    let bytes = export_package(snapshot)?;
    std::fs::write(path, bytes)?;
    log::info!("Wrote package to {}", path.display());
    Ok(())
}

/// Parse package bytes
///
/// Fails without side effects if the archive is unreadable, has no manifest,
/// the manifest does not parse, or the media file it names is missing.
pub fn import_package(bytes: &[u8]) -> Result<ImportedPackage> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();

        // Declared sizes come from the archive and are not trusted for allocation
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        if data.len() as u64 != file.size() {
            return Err(ViewerError::CorruptEntry {
                name,
                declared: file.size(),
                actual: data.len() as u64,
            });
        }
        entries.push((name, data));
    }

    // The manifest decides which entry is the media file
    let manifest_index = entries
        .iter()
        .position(|(name, _)| name == MANIFEST_NAME)
        .ok_or(ViewerError::MissingManifest(MANIFEST_NAME))?;
    let (_, manifest_bytes) = entries.remove(manifest_index);
    let manifest: PackageManifest = serde_json::from_slice(&manifest_bytes)?;

    let media = match manifest.media() {
        Some((kind, filename)) => {
            let index = entries
                .iter()
                .position(|(name, _)| name == filename)
                .ok_or_else(|| ViewerError::MissingMediaEntry(filename.to_string()))?;
            let (name, data) = entries.remove(index);
            let mime = mime_for(&name).to_string();
            Some(MediaFile::new(kind, name, mime, data))
        }
        None => None,
    };

    // Everything left is a page, in name order
    sort_naturally_by(&mut entries, |(name, _)| name.as_str());
    let pages: Vec<PageImage> = entries
        .into_iter()
        .map(|(name, data)| {
            let mime = mime_for(&name).to_string();
            PageImage::new(name, mime, data)
        })
        .collect();

    if pages.len() != manifest.intervals.len() {
        log::warn!(
            "Package has {} pages but {} intervals",
            pages.len(),
            manifest.intervals.len()
        );
    }
    log::info!(
        "Imported package: {} pages, media: {}",
        pages.len(),
        media.as_ref().map(|m| m.name.as_str()).unwrap_or("none")
    );

    Ok(ImportedPackage {
        pages,
        intervals: manifest.intervals,
        media,
    })
}

/// Read and parse a package file
pub fn read_package(path: &Path) -> Result<ImportedPackage> {
    let bytes = std::fs::read(path).map_err(|source| ViewerError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    import_package(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MediaKind, Session};
    use crate::test_fixtures::{audio_file, page_images, video_file};
    use tempfile::TempDir;

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_round_trip_with_audio() {
        let mut session = Session::default();
        session.load(page_images(12), None, Some(audio_file("take 1.mp3")));
        session.set_interval(3, 7);

        let bytes = export_package(session.snapshot()).unwrap();
        let imported = import_package(&bytes).unwrap();

        assert_eq!(imported.pages.len(), 12);
        assert_eq!(imported.intervals, session.intervals());
        for (page, original) in imported.pages.iter().zip(session.pages()) {
            assert_eq!(page.bytes, original.bytes());
            assert_eq!(page.mime, "image/png");
        }
        let media = imported.media.unwrap();
        assert_eq!(media.kind, MediaKind::Audio);
        assert_eq!(media.name, "take 1.mp3");
        assert_eq!(media.bytes, audio_file("take 1.mp3").bytes);
    }

    #[test]
    fn test_round_trip_with_video_into_session() {
        let mut session = Session::default();
        session.load(page_images(3), Some(vec![4, 5, 6]), Some(video_file("clip.mp4")));
        let bytes = export_package(session.snapshot()).unwrap();

        let imported = import_package(&bytes).unwrap();
        let mut restored = Session::default();
        restored.load(imported.pages, Some(imported.intervals), imported.media);

        assert_eq!(restored.page_count(), 3);
        assert_eq!(restored.intervals(), &[4, 5, 6]);
        assert_eq!(restored.media_kind(), Some(MediaKind::Video));
        assert_eq!(restored.media().map(|m| m.name()), Some("clip.mp4"));
    }

    #[test]
    fn test_round_trip_empty_session() {
        let session = Session::default();
        let imported = import_package(&export_package(session.snapshot()).unwrap()).unwrap();
        assert!(imported.pages.is_empty());
        assert!(imported.intervals.is_empty());
        assert!(imported.media.is_none());
    }

    #[test]
    fn test_page_names_sort_in_page_order() {
        assert_eq!(page_entry_name(0, 5, "png"), "page-001.png");
        assert_eq!(page_entry_name(1233, 1234, "jpg"), "page-1234.jpg");
    }

    #[test]
    fn test_media_name_colliding_with_page_is_renamed() {
        let mut session = Session::default();
        let media = MediaFile::new(MediaKind::Audio, "page-001.png", "audio/mpeg", vec![1, 2]);
        session.load(page_images(1), None, Some(media));

        let imported = import_package(&export_package(session.snapshot()).unwrap()).unwrap();
        assert_eq!(imported.pages.len(), 1);
        assert_eq!(imported.media.unwrap().name, "media-page-001.png");
    }

    #[test]
    fn test_import_sorts_pages_numerically() {
        let bytes = zip_of(&[
            ("manifest.json", r#"{"intervals": [1, 2, 3]}"#),
            ("p10.png", "ten"),
            ("p2.png", "two"),
            ("p1.png", "one"),
        ]);
        let imported = import_package(&bytes).unwrap();
        let names: Vec<&str> = imported.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p1.png", "p2.png", "p10.png"]);
    }

    #[test]
    fn test_missing_manifest_is_distinct_error() {
        let bytes = zip_of(&[("page-001.png", "x")]);
        assert!(matches!(
            import_package(&bytes),
            Err(ViewerError::MissingManifest(_))
        ));
    }

    #[test]
    fn test_bad_manifest_is_reported() {
        let bytes = zip_of(&[("manifest.json", "{not json")]);
        assert!(matches!(import_package(&bytes), Err(ViewerError::Manifest(_))));
    }

    #[test]
    fn test_missing_media_entry_is_reported() {
        let bytes = zip_of(&[(
            "manifest.json",
            r#"{"intervals": [], "audioFilename": "gone.mp3"}"#,
        )]);
        assert!(matches!(
            import_package(&bytes),
            Err(ViewerError::MissingMediaEntry(name)) if name == "gone.mp3"
        ));
    }

    /// Overwrite the uncompressed size in every zip64 extra field that
    /// currently holds `size`; returns how many were changed
    fn declare_huge_size(bytes: &mut [u8], size: u64) -> usize {
        let mut patched = 0;
        let mut i = 0;
        while i + 12 <= bytes.len() {
            let is_zip64_field = bytes[i] == 0x01 && bytes[i + 1] == 0x00;
            let value = u64::from_le_bytes(bytes[i + 4..i + 12].try_into().unwrap());
            if is_zip64_field && value == size {
                bytes[i + 4..i + 12].fill(0xFF);
                patched += 1;
                i += 12;
            } else {
                i += 1;
            }
        }
        patched
    }

    #[test]
    fn test_oversized_entry_is_an_error() {
        let page = "0123456789abcdefghijklmnopqrstuvwxyz!";
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(true);
        writer.start_file(MANIFEST_NAME, options).unwrap();
        writer.write_all(br#"{"intervals": [3]}"#).unwrap();
        writer.start_file("page-001.png", options).unwrap();
        writer.write_all(page.as_bytes()).unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        assert!(declare_huge_size(&mut bytes, page.len() as u64) > 0);
        assert!(import_package(&bytes).is_err());
    }

    #[test]
    fn test_not_an_archive() {
        assert!(matches!(
            import_package(b"definitely not a zip"),
            Err(ViewerError::Archive(_))
        ));
    }

    #[test]
    fn test_write_and_read_package_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.zip");

        let mut session = Session::default();
        session.load(page_images(2), Some(vec![9, 9]), None);
        write_package(session.snapshot(), &path).unwrap();

        let imported = read_package(&path).unwrap();
        assert_eq!(imported.intervals, vec![9, 9]);
        assert_eq!(imported.pages.len(), 2);
    }
}
