//! PDF rasterization seam
//!
//! The loader hands each PDF to a `PdfRasterizer`, which renders it one page
//! at a time. No renderer ships with the crate; `NoPdfSupport` rejects every
//! document so callers see a clear error instead of silently missing pages.

use crate::core::PageImage;
use crate::error::{Result, ViewerError};

/// Progress of a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfProgress {
    /// Pages rendered so far
    pub rendered: usize,
    pub total: usize,
}

/// Renders PDF documents into page images
pub trait PdfRasterizer {
    /// Number of pages in the document
    fn page_count(&self, file: &str, bytes: &[u8]) -> Result<usize>;

    /// Render one page (0-based) to an image
    fn render_page(&self, file: &str, bytes: &[u8], page: usize) -> Result<PageImage>;

    /// Render every page in order, reporting progress after each
    ///
    /// Pages are named `<file>#<n>` with `n` counting from 1.
    fn rasterize(
        &self,
        file: &str,
        bytes: &[u8],
        progress: &mut dyn FnMut(PdfProgress),
    ) -> Result<Vec<PageImage>> {
        let total = self.page_count(file, bytes)?;
        let mut pages = Vec::with_capacity(total);
        for index in 0..total {
            let mut page = self.render_page(file, bytes, index)?;
            page.name = format!("{}#{}", file, index + 1);
            pages.push(page);
            progress(PdfProgress {
                rendered: index + 1,
                total,
            });
        }
        log::debug!("Rasterized {} pages from {}", total, file);
        Ok(pages)
    }
}

/// Rasterizer used when no PDF renderer is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPdfSupport;

impl PdfRasterizer for NoPdfSupport {
    fn page_count(&self, file: &str, _bytes: &[u8]) -> Result<usize> {
        Err(ViewerError::Pdf {
            file: file.to_string(),
            reason: "no PDF renderer available".to_string(),
        })
    }

    fn render_page(&self, file: &str, _bytes: &[u8], _page: usize) -> Result<PageImage> {
        Err(ViewerError::Pdf {
            file: file.to_string(),
            reason: "no PDF renderer available".to_string(),
        })
    }
}
