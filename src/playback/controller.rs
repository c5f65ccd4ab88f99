//! Playback controller
//!
//! State machine over the viewing position, the play/pause flag and the
//! countdown, layered on the session it owns. Every transition ends with
//! [`PlaybackController::reevaluate_countdown`], the one place the countdown
//! is disarmed and re-armed, so at most one countdown is ever outstanding.
//!
//! There are two distinct ways playback stops on its own: `next()` at the
//! terminal spread (page exhaustion), and the media element reporting that
//! its track ended. The first leaves the position at the terminal spread,
//! the second leaves it wherever it was.

use super::countdown::Countdown;
use super::media::{MediaError, MediaEvent, MediaSink};
use super::spread::{Layout, Spread, VisiblePages};
use crate::core::{MediaFile, PageImage, Session};

/// Coarse playback status for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No pages to show
    Idle,
    Paused,
    Playing {
        /// Whether a countdown is running
        armed: bool,
    },
}

/// Result of a play request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Playing,
    /// Nothing to play
    NoPages,
    /// The media track refused to start; playback stayed paused
    MediaFailed(MediaError),
}

/// Result of a next request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    /// Already at the terminal spread; playback was stopped
    AtEnd,
    /// Nothing to step through
    NoPages,
}

pub struct PlaybackController<M: MediaSink> {
    session: Session,
    media: M,
    spread: Spread,
    playing: bool,
    countdown: Option<Countdown>,
    generation: u64,
}

impl<M: MediaSink> PlaybackController<M> {
    /// Build a controller over a session, starting at the cover, paused
    pub fn new(session: Session, media: M) -> Self {
        Self {
            session,
            media,
            spread: Spread::COVER,
            playing: false,
            countdown: None,
            generation: 0,
        }
    }

    // ===== Intents =====

    /// Start playback, and the media track if one is attached
    pub fn play(&mut self) -> PlayOutcome {
        if self.session.is_empty() {
            log::debug!("Play ignored: no pages");
            return PlayOutcome::NoPages;
        }
        if self.playing {
            return PlayOutcome::Playing;
        }

        self.playing = true;
        if self.session.has_media()
            && let Err(e) = self.media.start()
        {
            log::warn!("Media failed to start, staying paused: {}", e);
            self.playing = false;
            self.reevaluate_countdown();
            return PlayOutcome::MediaFailed(e);
        }

        log::info!("Playing from {}", self.describe());
        self.reevaluate_countdown();
        PlayOutcome::Playing
    }

    /// Stop playback and the media track
    pub fn pause(&mut self) {
        if self.playing {
            log::info!("Paused at {}", self.describe());
        }
        self.playing = false;
        self.pause_media();
        self.reevaluate_countdown();
    }

    /// Advance one spread, or stop playback at the terminal spread
    pub fn next(&mut self) -> StepOutcome {
        let page_count = self.session.page_count();
        if page_count == 0 {
            return StepOutcome::NoPages;
        }

        let outcome = match self.spread.next(page_count) {
            Some(spread) => {
                self.spread = spread;
                log::debug!("Advanced to {}", self.describe());
                StepOutcome::Advanced
            }
            None => {
                if self.playing {
                    log::info!("Reached the end of the score, stopping");
                }
                self.playing = false;
                self.pause_media();
                StepOutcome::AtEnd
            }
        };
        self.reevaluate_countdown();
        outcome
    }

    /// Go back one spread, never before the cover
    ///
    /// Playback keeps going; the countdown restarts for the new position.
    pub fn prev(&mut self) {
        if self.session.is_empty() {
            return;
        }
        self.spread = self.spread.prev();
        log::debug!("Went back to {}", self.describe());
        self.reevaluate_countdown();
    }

    /// Replace every interval and restart the view at the cover, paused
    pub fn reconfigure(&mut self, intervals: Vec<u32>) {
        self.pause();
        self.session.replace_intervals(intervals);
        self.rewind();
        log::info!("Reconfigured intervals: {:?}", self.session.intervals());
    }

    /// Set one page's interval (clamped); the view is kept
    ///
    /// # Panics
    /// If `index` is not a page index.
    pub fn set_interval(&mut self, index: usize, seconds: i64) {
        self.session.set_interval(index, seconds);
        self.reevaluate_countdown();
    }

    /// Set every page's interval (clamped); the view is kept
    pub fn set_all_intervals(&mut self, seconds: i64) {
        self.session.set_all_intervals(seconds);
        self.reevaluate_countdown();
    }

    /// Replace the session's content and restart at the cover, paused
    pub fn load(
        &mut self,
        pages: Vec<PageImage>,
        intervals: Option<Vec<u32>>,
        media: Option<MediaFile>,
    ) {
        self.pause();
        self.session.load(pages, intervals, media);
        self.rewind();
    }

    /// Swap the media track; playback pauses first
    pub fn attach_media(&mut self, file: MediaFile) {
        self.pause();
        self.session.attach_media(file);
    }

    /// Drop the media track; playback pauses first
    pub fn clear_media(&mut self) {
        self.pause();
        self.session.clear_media();
    }

    /// Empty the session ("new session")
    pub fn clear(&mut self) {
        self.pause();
        self.session.clear();
        self.rewind();
    }

    // ===== Events =====

    /// React to the media element
    pub fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Ended => {
                if self.playing {
                    log::info!("Media ended, stopping at {}", self.describe());
                }
                self.playing = false;
            }
            MediaEvent::StartFailed(reason) => {
                log::warn!("Media failed to start, stopping: {}", reason);
                self.playing = false;
            }
        }
        self.reevaluate_countdown();
    }

    /// The countdown with `generation` ran out
    ///
    /// Returns false, without touching any state, if that countdown is no
    /// longer the armed one.
    pub fn on_countdown_elapsed(&mut self, generation: u64) -> bool {
        match self.countdown {
            Some(countdown) if countdown.generation() == generation => {
                self.countdown = None;
                self.next();
                true
            }
            _ => {
                log::trace!("Ignoring stale countdown {}", generation);
                false
            }
        }
    }

    // ===== Queries =====

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn spread(&self) -> Spread {
        self.spread
    }

    pub fn left_index(&self) -> isize {
        self.spread.left_index()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn page_count(&self) -> usize {
        self.session.page_count()
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.session.is_empty() {
            PlaybackStatus::Idle
        } else if self.playing {
            PlaybackStatus::Playing {
                armed: self.countdown.is_some(),
            }
        } else {
            PlaybackStatus::Paused
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.spread.is_terminal(self.page_count())
    }

    /// Whether a "next" control should be enabled
    pub fn can_advance(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether a "previous" control should be enabled
    pub fn can_go_back(&self) -> bool {
        !self.session.is_empty() && !self.spread.is_cover()
    }

    pub fn visible_pages(&self, layout: Layout) -> VisiblePages {
        self.spread.visible_pages(layout, self.page_count())
    }

    pub fn label(&self, layout: Layout) -> Option<String> {
        self.spread.label(layout, self.page_count())
    }

    /// Give back the session, e.g. to release it
    pub fn into_session(self) -> Session {
        self.session
    }

    // ===== Internals =====

    fn rewind(&mut self) {
        self.spread = Spread::COVER;
        self.playing = false;
        self.reevaluate_countdown();
    }

    fn pause_media(&mut self) {
        if self.session.has_media() {
            self.media.pause();
        }
    }

    /// Disarm, then arm once if playing and not at the terminal spread
    fn reevaluate_countdown(&mut self) {
        self.countdown = None;
        if !self.playing || self.is_terminal() {
            return;
        }

        let page = self.spread.timing_page();
        let seconds = self.session.interval_at(page);
        self.generation = self.generation.wrapping_add(1);
        self.countdown = Some(Countdown::new(self.generation, page, seconds));
        log::trace!("Armed countdown {} for {}s (page {})", self.generation, seconds, page);
    }

    fn describe(&self) -> String {
        self.label(Layout::Book)
            .unwrap_or_else(|| "empty score".to_string())
    }
}
