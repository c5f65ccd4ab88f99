//! Session model
//!
//! The session is the aggregate root of the viewer: the ordered page list,
//! one interval (seconds) per page, and an optional media track. It owns the
//! transient handle of every resource it holds and releases each of them
//! exactly once, when the resource is replaced or the session is cleared.
//!
//! Invariant: `intervals.len() == pages.len()` after every operation.

use super::page::{MediaAttachment, MediaFile, MediaKind, Page, PageImage};
use super::resources::ObjectUrls;

/// Interval given to pages that have none configured
pub const DEFAULT_INTERVAL_SECS: u32 = 30;

/// Smallest interval a page may have
pub const MIN_INTERVAL_SECS: u32 = 1;

/// Coerce an interval to the valid range
pub fn clamp_interval(seconds: i64) -> u32 {
    seconds.clamp(MIN_INTERVAL_SECS as i64, u32::MAX as i64) as u32
}

/// Parse a user-typed interval, falling back to the minimum
///
/// Editing never rejects input: `""`, `"abc"` and `"-4"` all become 1.
pub fn parse_interval(text: &str) -> u32 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return clamp_interval(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => clamp_interval(value.floor() as i64),
        _ => MIN_INTERVAL_SECS,
    }
}

/// Read-only view of a session for the exporter
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot<'a> {
    pub pages: &'a [Page],
    pub intervals: &'a [u32],
    pub media: Option<&'a MediaAttachment>,
}

/// Ordered pages, their intervals and the optional media track
#[derive(Debug)]
pub struct Session {
    pages: Vec<Page>,
    intervals: Vec<u32>,
    media: Option<MediaAttachment>,
    default_interval: u32,
    urls: ObjectUrls,
}

impl Session {
    /// Create an empty session that mints handles from `urls`
    pub fn new(urls: ObjectUrls) -> Self {
        Self {
            pages: Vec::new(),
            intervals: Vec::new(),
            media: None,
            default_interval: DEFAULT_INTERVAL_SECS,
            urls,
        }
    }

    /// Use a different interval when filling pages that have none
    pub fn with_default_interval(mut self, seconds: u32) -> Self {
        self.default_interval = clamp_interval(seconds as i64);
        self
    }

    /// Replace the whole session
    ///
    /// The previous session's resources are released before the new ones are
    /// adopted. Intervals that are missing, or whose length does not match
    /// the page count, are replaced by the default for every page.
    pub fn load(
        &mut self,
        pages: Vec<PageImage>,
        intervals: Option<Vec<u32>>,
        media: Option<MediaFile>,
    ) -> &mut Self {
        self.clear();

        let intervals = match intervals {
            Some(intervals) if intervals.len() == pages.len() => intervals
                .into_iter()
                .map(|s| clamp_interval(s as i64))
                .collect(),
            Some(intervals) => {
                log::warn!(
                    "Got {} intervals for {} pages, using {}s for every page",
                    intervals.len(),
                    pages.len(),
                    self.default_interval
                );
                vec![self.default_interval; pages.len()]
            }
            None => vec![self.default_interval; pages.len()],
        };

        self.pages = pages
            .into_iter()
            .map(|image| {
                let url = self.urls.create(image.bytes.len());
                Page { image, url }
            })
            .collect();
        self.intervals = intervals;
        self.media = media.map(|file| self.adopt_media(file));

        log::info!(
            "Loaded session: {} pages, media: {}",
            self.pages.len(),
            self.media
                .as_ref()
                .map(|m| format!("{} ({})", m.name(), m.kind()))
                .unwrap_or_else(|| "none".to_string())
        );
        self
    }

    /// Set the interval of one page, clamped to at least one second
    ///
    /// # Panics
    /// If `index` is not a page index.
    pub fn set_interval(&mut self, index: usize, seconds: i64) -> &mut Self {
        assert!(
            index < self.intervals.len(),
            "set_interval: index {} out of range for {} pages",
            index,
            self.intervals.len()
        );
        self.intervals[index] = clamp_interval(seconds);
        self
    }

    /// Set every page's interval, clamped to at least one second
    pub fn set_all_intervals(&mut self, seconds: i64) -> &mut Self {
        let seconds = clamp_interval(seconds);
        self.intervals.iter_mut().for_each(|s| *s = seconds);
        self
    }

    /// Replace all intervals at once
    ///
    /// Values are clamped; a list of the wrong length is padded with the
    /// default interval or truncated so the invariant holds.
    pub fn replace_intervals(&mut self, intervals: Vec<u32>) -> &mut Self {
        if intervals.len() != self.pages.len() {
            log::debug!(
                "Normalizing {} intervals to {} pages",
                intervals.len(),
                self.pages.len()
            );
        }
        let mut intervals: Vec<u32> = intervals
            .into_iter()
            .take(self.pages.len())
            .map(|s| clamp_interval(s as i64))
            .collect();
        intervals.resize(self.pages.len(), self.default_interval);
        self.intervals = intervals;
        self
    }

    /// Attach a media track, releasing any previous one
    pub fn attach_media(&mut self, file: MediaFile) -> &mut Self {
        self.clear_media();
        log::info!("Attached {} track: {}", file.kind, file.name);
        self.media = Some(self.adopt_media(file));
        self
    }

    /// Detach and release the media track, if any
    pub fn clear_media(&mut self) -> &mut Self {
        if let Some(media) = self.media.take() {
            log::debug!("Releasing media {}", media.name());
            self.urls.revoke(media.url);
        }
        self
    }

    /// Empty the session, releasing every resource it owns
    pub fn clear(&mut self) -> &mut Self {
        let released = self.pages.len();
        for page in self.pages.drain(..) {
            self.urls.revoke(page.url);
        }
        self.intervals.clear();
        self.clear_media();
        if released > 0 {
            log::debug!("Released {} pages", released);
        }
        self
    }

    fn adopt_media(&self, file: MediaFile) -> MediaAttachment {
        let url = self.urls.create(file.bytes.len());
        MediaAttachment { file, url }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }

    /// Interval of one page, or the default if there is no such page
    pub fn interval_at(&self, index: usize) -> u32 {
        self.intervals
            .get(index)
            .copied()
            .unwrap_or(self.default_interval)
    }

    pub fn default_interval(&self) -> u32 {
        self.default_interval
    }

    pub fn media(&self) -> Option<&MediaAttachment> {
        self.media.as_ref()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.media.as_ref().map(|m| m.kind())
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    /// Registry the session mints its handles from
    pub fn urls(&self) -> &ObjectUrls {
        &self.urls
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            pages: &self.pages,
            intervals: &self.intervals,
            media: self.media.as_ref(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ObjectUrls::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{audio_file, page_images};

    fn loaded(count: usize) -> Session {
        let mut session = Session::default();
        session.load(page_images(count), None, None);
        session
    }

    #[test]
    fn test_load_fills_default_intervals() {
        let session = loaded(3);
        assert_eq!(session.page_count(), 3);
        assert_eq!(session.intervals(), &[30, 30, 30]);
    }

    #[test]
    fn test_load_keeps_matching_intervals() {
        let mut session = Session::default();
        session.load(page_images(2), Some(vec![5, 0]), None);
        assert_eq!(session.intervals(), &[5, 1]);
    }

    #[test]
    fn test_load_replaces_mismatched_intervals() {
        let mut session = Session::default().with_default_interval(12);
        session.load(page_images(3), Some(vec![5, 5]), None);
        assert_eq!(session.intervals(), &[12, 12, 12]);
    }

    #[test]
    fn test_load_empty_is_valid() {
        let mut session = Session::default();
        session.load(Vec::new(), None, None);
        assert!(session.is_empty());
        assert!(session.intervals().is_empty());
    }

    #[test]
    fn test_set_interval_clamps() {
        let mut session = loaded(2);
        session.set_interval(1, -7);
        session.set_interval(0, 45);
        assert_eq!(session.intervals(), &[45, 1]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_interval_out_of_range_panics() {
        let mut session = loaded(2);
        session.set_interval(2, 10);
    }

    #[test]
    fn test_set_all_intervals_zero_clamps_to_one() {
        let mut session = loaded(4);
        session.set_all_intervals(0);
        assert_eq!(session.intervals(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_replace_intervals_normalizes_length() {
        let mut session = loaded(3);
        session.replace_intervals(vec![4]);
        assert_eq!(session.intervals(), &[4, 30, 30]);
        session.replace_intervals(vec![1, 2, 3, 4, 5]);
        assert_eq!(session.intervals(), &[1, 2, 3]);
    }

    #[test]
    fn test_reload_releases_previous_resources() {
        let urls = ObjectUrls::new();
        let mut session = Session::new(urls.clone());
        session.load(page_images(3), None, Some(audio_file("take.mp3")));
        assert_eq!(urls.live_count(), 4);

        session.load(page_images(2), None, None);
        assert_eq!(urls.live_count(), 2);
        assert_eq!(urls.totals(), (6, 4));
    }

    #[test]
    fn test_attach_media_replaces_and_releases() {
        let urls = ObjectUrls::new();
        let mut session = Session::new(urls.clone());
        session.load(page_images(1), None, None);
        session.attach_media(audio_file("a.mp3"));
        session.attach_media(audio_file("b.mp3"));
        assert_eq!(session.media().map(|m| m.name()), Some("b.mp3"));
        assert_eq!(urls.live_count(), 2);

        session.clear_media();
        assert!(!session.has_media());
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn test_clear_releases_everything_once() {
        let urls = ObjectUrls::new();
        let mut session = Session::new(urls.clone());
        session.load(page_images(5), None, Some(audio_file("a.mp3")));
        session.clear();
        session.clear();
        assert!(session.is_empty());
        assert!(!session.has_media());
        assert_eq!(urls.live_count(), 0);
        assert_eq!(urls.totals(), (6, 6));
    }

    #[test]
    fn test_parse_interval_is_lenient() {
        assert_eq!(parse_interval("15"), 15);
        assert_eq!(parse_interval(" 8 "), 8);
        assert_eq!(parse_interval("2.9"), 2);
        assert_eq!(parse_interval("0"), 1);
        assert_eq!(parse_interval("-3"), 1);
        assert_eq!(parse_interval("abc"), 1);
        assert_eq!(parse_interval(""), 1);
    }

    #[test]
    fn test_interval_at_falls_back_to_default() {
        let session = loaded(1);
        assert_eq!(session.interval_at(0), 30);
        assert_eq!(session.interval_at(9), 30);
    }
}
