//! Paging and playback
//!
//! The controller is a synchronous state machine; the runner drives it on a
//! tokio task so the countdown and user intents share one entry point.

mod controller;
mod countdown;
mod media;
mod runner;
mod spread;

pub use controller::{PlayOutcome, PlaybackController, PlaybackStatus, StepOutcome};
pub use countdown::Countdown;
pub use media::{MediaError, MediaEvent, MediaSink, NoMedia};
pub use runner::{start_playback, PlaybackCommand, PlaybackHandle, PlaybackSnapshot};
pub use spread::{Layout, Spread, VisiblePages};
