//! Core session state
//!
//! This module contains:
//! - The session model (pages, intervals, media)
//! - Page and media resource types
//! - The transient handle registry that owns resource lifetimes
//! - Numeric-aware ordering of page names
//! - Persisted viewer settings

mod ordering;
mod page;
mod resources;
mod session;
mod state;

pub use ordering::{natural_cmp, sort_naturally_by};
pub use page::{MediaAttachment, MediaFile, MediaKind, Page, PageImage};
pub use resources::{ObjectUrl, ObjectUrls};
pub use session::{
    clamp_interval, parse_interval, Session, SessionSnapshot, DEFAULT_INTERVAL_SECS,
    MIN_INTERVAL_SECS,
};
pub use state::{ViewerSettings, DEFAULT_NARROW_BREAKPOINT_PX};
