//! Loading scores from images, PDFs, media files and packages

mod detection;
mod loader;
mod pdf;

pub use detection::{classify, mime_for, InputKind};
pub use loader::{collect_inputs, InputFile, LoadProgress, LoadedScore, ScoreLoader};
pub use pdf::{NoPdfSupport, PdfProgress, PdfRasterizer};
