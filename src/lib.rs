//! Page Turner
//!
//! Core of a sheet-music viewer: a session of pages with per-page intervals
//! and an optional media track, a playback controller that pages through it
//! two pages at a time, and export/import of the session as a ZIP package.

pub mod core;
pub mod error;
pub mod loading;
pub mod logging;
pub mod package;
pub mod playback;

#[cfg(test)]
mod test_fixtures;

pub use crate::core::{Session, ViewerSettings};
pub use crate::error::{Result, ViewerError};
