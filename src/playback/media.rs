//! Media element seam
//!
//! The controller never plays audio or video itself. It asks a [`MediaSink`]
//! bound to the session's media track to start or pause, and reacts to the
//! [`MediaEvent`]s the element reports back.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("media playback was rejected: {0}")]
    Rejected(String),

    #[error("media is not ready: {0}")]
    NotReady(String),
}

/// Events raised by the media element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// The track played to its end
    Ended,
    /// A start that was accepted earlier failed later
    StartFailed(String),
}

/// The element that plays the attached audio or video track
pub trait MediaSink: Send {
    /// Request playback to start
    fn start(&mut self) -> Result<(), MediaError>;

    /// Request playback to pause
    fn pause(&mut self);
}

/// Sink for sessions without an element to drive
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMedia;

impl MediaSink for NoMedia {
    fn start(&mut self) -> Result<(), MediaError> {
        Ok(())
    }

    fn pause(&mut self) {}
}

impl<S: MediaSink + ?Sized> MediaSink for Box<S> {
    fn start(&mut self) -> Result<(), MediaError> {
        (**self).start()
    }

    fn pause(&mut self) {
        (**self).pause()
    }
}
