//! Building a score from input files
//!
//! A load runs to completion before anything reaches the session: the
//! `LoadedScore` it returns is adopted in one `Session::load` call, and an
//! error leaves the current session as it was.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::detection::{classify, mime_for, InputKind};
use super::pdf::{NoPdfSupport, PdfRasterizer};
use crate::core::{sort_naturally_by, MediaFile, PageImage, Session};
use crate::error::{Result, ViewerError};
use crate::package::{import_package, ImportedPackage};

/// One file handed to the loader
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, named after its file name
    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::read_as(path, name)
    }

    fn read_as(path: &Path, name: String) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| ViewerError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { name, bytes })
    }
}

/// Collect input files from paths, scanning directories recursively
///
/// Files inside a directory are named by their path relative to it and only
/// picked up when the loader recognizes them. Paths given directly are
/// always read.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::new();

    for path in paths {
        if !path.is_dir() {
            inputs.push(InputFile::read(path)?);
            continue;
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if !entry_path.is_file() {
                continue;
            }
            // Relative names keep subfolders grouped when sorted
            let name = entry_path
                .strip_prefix(path)
                .unwrap_or(entry_path)
                .to_string_lossy()
                .replace('\\', "/");
            if classify(&name) == InputKind::Unsupported {
                log::debug!("Skipping {}", entry_path.display());
                continue;
            }
            inputs.push(InputFile::read_as(entry_path, name)?);
        }
    }

    log::info!("Collected {} input files", inputs.len());
    Ok(inputs)
}

/// Everything a load produced, not yet adopted by a session
#[derive(Debug, Clone, Default)]
pub struct LoadedScore {
    pub pages: Vec<PageImage>,
    /// Per-page intervals, present only when loaded from a package
    pub intervals: Option<Vec<u32>>,
    pub media: Option<MediaFile>,
}

impl LoadedScore {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Replace the session's contents with this score
    pub fn adopt_into(self, session: &mut Session) {
        session.load(self.pages, self.intervals, self.media);
    }
}

impl From<ImportedPackage> for LoadedScore {
    fn from(package: ImportedPackage) -> Self {
        Self {
            pages: package.pages,
            intervals: Some(package.intervals),
            media: package.media,
        }
    }
}

/// Progress reported while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProgress {
    Reading { file: String },
    Rasterizing {
        file: String,
        rendered: usize,
        total: usize,
    },
}

/// Turns input files into a `LoadedScore`
#[derive(Debug, Default)]
pub struct ScoreLoader<R = NoPdfSupport> {
    rasterizer: R,
}

impl ScoreLoader<NoPdfSupport> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: PdfRasterizer> ScoreLoader<R> {
    pub fn with_rasterizer(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    pub fn load(&self, files: Vec<InputFile>) -> Result<LoadedScore> {
        self.load_with_progress(files, |_| {})
    }

    /// Load files into a score
    ///
    /// Images and PDFs become pages in natural filename order, PDF pages in
    /// document order. The first audio or video file becomes the media
    /// track. A package must be the only input and is imported whole.
    /// Unrecognized files are skipped.
    pub fn load_with_progress(
        &self,
        mut files: Vec<InputFile>,
        mut progress: impl FnMut(LoadProgress),
    ) -> Result<LoadedScore> {
        sort_naturally_by(&mut files, |f| f.name.as_str());

        // A package already carries pages, intervals and media
        if let Some(package) = files.iter().find(|f| classify(&f.name) == InputKind::Package) {
            if files.len() > 1 {
                return Err(ViewerError::UnsupportedFile(format!(
                    "{} must be loaded on its own",
                    package.name
                )));
            }
            progress(LoadProgress::Reading {
                file: package.name.clone(),
            });
            return Ok(import_package(&package.bytes)?.into());
        }

        let mut pages = Vec::new();
        let mut media: Option<MediaFile> = None;

        for file in files {
            progress(LoadProgress::Reading {
                file: file.name.clone(),
            });
            match classify(&file.name) {
                InputKind::Image => {
                    let mime = mime_for(&file.name);
                    pages.push(PageImage::new(file.name, mime, file.bytes));
                }
                InputKind::Pdf => {
                    // Rendered pages take the PDF's place in the file order
                    let rendered = self.rasterizer.rasterize(&file.name, &file.bytes, &mut |p| {
                        progress(LoadProgress::Rasterizing {
                            file: file.name.clone(),
                            rendered: p.rendered,
                            total: p.total,
                        })
                    })?;
                    pages.extend(rendered);
                }
                // Only one track per session
                InputKind::Media(kind) => match &media {
                    Some(existing) => {
                        log::warn!("Ignoring {}, already using {}", file.name, existing.name);
                    }
                    None => {
                        let mime = mime_for(&file.name);
                        media = Some(MediaFile::new(kind, file.name, mime, file.bytes));
                    }
                },
                InputKind::Package | InputKind::Unsupported => {
                    log::warn!("Skipping unsupported file {}", file.name);
                }
            }
        }

        log::info!(
            "Loaded {} pages, media: {}",
            pages.len(),
            media.as_ref().map(|m| m.name.as_str()).unwrap_or("none")
        );
        Ok(LoadedScore {
            pages,
            intervals: None,
            media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MediaKind;
    use crate::package::export_package;
    use crate::test_fixtures::{audio_file, fake_png, page_images, session_with};
    use std::fs;
    use tempfile::TempDir;

    /// Renders every PDF as two pages
    struct TwoPagePdf;

    impl PdfRasterizer for TwoPagePdf {
        fn page_count(&self, _file: &str, _bytes: &[u8]) -> Result<usize> {
            Ok(2)
        }

        fn render_page(&self, _file: &str, _bytes: &[u8], page: usize) -> Result<PageImage> {
            Ok(PageImage::new("", "image/png", fake_png(page)))
        }
    }

    fn png(name: &str) -> InputFile {
        InputFile::new(name, fake_png(name.len()))
    }

    fn names(score: &LoadedScore) -> Vec<&str> {
        score.pages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_orders_images_naturally() {
        let score = ScoreLoader::new()
            .load(vec![png("p10.png"), png("p2.png"), png("P1.png")])
            .unwrap();
        assert_eq!(names(&score), vec!["P1.png", "p2.png", "p10.png"]);
        assert!(score.intervals.is_none());
        assert!(score.media.is_none());
    }

    #[test]
    fn test_picks_up_first_media_file() {
        let files = vec![
            png("a.png"),
            InputFile::new("take2.mp3", vec![2]),
            InputFile::new("take1.mp3", vec![1]),
        ];
        let score = ScoreLoader::new().load(files).unwrap();
        let media = score.media.unwrap();
        assert_eq!(media.name, "take1.mp3");
        assert_eq!(media.kind, MediaKind::Audio);
        assert_eq!(media.mime, "audio/mpeg");
        assert_eq!(score.pages.len(), 1);
    }

    #[test]
    fn test_skips_unsupported_files() {
        let files = vec![png("a.png"), InputFile::new("notes.txt", b"hi".to_vec())];
        let score = ScoreLoader::new().load(files).unwrap();
        assert_eq!(names(&score), vec!["a.png"]);
    }

    #[test]
    fn test_pdf_without_renderer_fails() {
        let files = vec![png("a.png"), InputFile::new("b.pdf", b"%PDF".to_vec())];
        assert!(matches!(
            ScoreLoader::new().load(files),
            Err(ViewerError::Pdf { .. })
        ));
    }

    #[test]
    fn test_pdf_pages_keep_document_order() {
        let files = vec![
            png("3-coda.png"),
            InputFile::new("2-body.pdf", b"%PDF".to_vec()),
            png("1-intro.png"),
        ];
        let mut events = Vec::new();
        let score = ScoreLoader::with_rasterizer(TwoPagePdf)
            .load_with_progress(files, |p| events.push(p))
            .unwrap();

        assert_eq!(
            names(&score),
            vec!["1-intro.png", "2-body.pdf#1", "2-body.pdf#2", "3-coda.png"]
        );
        assert!(events.contains(&LoadProgress::Rasterizing {
            file: "2-body.pdf".to_string(),
            rendered: 2,
            total: 2,
        }));
    }

    #[test]
    fn test_imports_package() {
        let session = session_with(3, 12);
        let bytes = export_package(session.snapshot()).unwrap();

        let score = ScoreLoader::new()
            .load(vec![InputFile::new("old.zip", bytes)])
            .unwrap();
        assert_eq!(score.page_count(), 3);
        assert_eq!(score.intervals, Some(vec![12, 12, 12]));
    }

    #[test]
    fn test_package_must_be_alone() {
        let session = session_with(1, 5);
        let bytes = export_package(session.snapshot()).unwrap();
        let files = vec![InputFile::new("old.zip", bytes), png("extra.png")];
        assert!(matches!(
            ScoreLoader::new().load(files),
            Err(ViewerError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_failed_load_leaves_session_untouched() {
        let mut session = session_with(4, 10);
        let result = ScoreLoader::new().load(vec![InputFile::new("bad.zip", b"nope".to_vec())]);
        assert!(result.is_err());
        assert_eq!(session.page_count(), 4);

        ScoreLoader::new()
            .load(vec![png("a.png")])
            .unwrap()
            .adopt_into(&mut session);
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.intervals(), &[session.default_interval()]);
    }

    #[test]
    fn test_collect_inputs_scans_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("part2")).unwrap();
        for (i, page) in page_images(2).into_iter().enumerate() {
            fs::write(root.join(format!("p{}.png", i + 1)), page.bytes).unwrap();
        }
        fs::write(root.join("part2").join("p1.png"), fake_png(9)).unwrap();
        fs::write(root.join("take.mp3"), audio_file("take.mp3").bytes).unwrap();
        fs::write(root.join("readme.txt"), "ignored").unwrap();

        let inputs = collect_inputs(&[root.to_path_buf()]).unwrap();
        assert_eq!(inputs.len(), 4);

        let score = ScoreLoader::new().load(inputs).unwrap();
        assert_eq!(names(&score), vec!["p1.png", "p2.png", "part2/p1.png"]);
        assert_eq!(score.media.map(|m| m.name), Some("take.mp3".to_string()));
    }

    #[test]
    fn test_collect_inputs_missing_file() {
        let result = collect_inputs(&[PathBuf::from("/nonexistent/score.png")]);
        assert!(matches!(result, Err(ViewerError::ReadFile { .. })));
    }
}
