//! Viewer preferences
//!
//! Persisted to `<data dir>/Page Turner/settings.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::session::{clamp_interval, DEFAULT_INTERVAL_SECS};
use crate::error::{Result, ViewerError};

/// Viewport width (in CSS pixels) below which a single page is shown
pub const DEFAULT_NARROW_BREAKPOINT_PX: u32 = 768;

const APP_DIR_NAME: &str = "Page Turner";

fn default_interval_secs() -> u32 {
    DEFAULT_INTERVAL_SECS
}

fn default_narrow_breakpoint_px() -> u32 {
    DEFAULT_NARROW_BREAKPOINT_PX
}

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Interval given to every page when a load supplies none
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u32,
    /// Viewports narrower than this show one page at a time
    #[serde(default = "default_narrow_breakpoint_px")]
    pub narrow_breakpoint_px: u32,
    /// Start playing as soon as a session is loaded
    #[serde(default)]
    pub autoplay_on_load: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_interval_secs: DEFAULT_INTERVAL_SECS,
            narrow_breakpoint_px: DEFAULT_NARROW_BREAKPOINT_PX,
            autoplay_on_load: false,
        }
    }
}

impl ViewerSettings {
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Get the app data directory, creating it if needed
    fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ViewerError::Settings("Could not determine data directory".into()))?;

        let app_dir = data_dir.join(APP_DIR_NAME);
        if !app_dir.exists() {
            std::fs::create_dir_all(&app_dir)?;
        }

        Ok(app_dir)
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let loaded = Self::get_app_data_dir()
            .and_then(|dir| Self::load_from(&dir.join(Self::SETTINGS_FILE)));
        match loaded {
            Ok(settings) => {
                log::debug!("Loaded viewer settings from disk");
                settings
            }
            Err(e) => {
                log::debug!("Using default viewer settings: {}", e);
                Self::default()
            }
        }
    }

    /// Read settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ViewerError::Settings(format!(
                "Settings file not found: {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ViewerError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Self = serde_json::from_str(&contents)?;
        Ok(settings.normalized())
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::get_app_data_dir()?.join(Self::SETTINGS_FILE);
        self.save_to(&path)
    }

    /// Write settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::debug!("Saved viewer settings to {:?}", path);
        Ok(())
    }

    /// Whether playback should start right after a load
    ///
    /// `requested` is an explicit request from the caller, which wins over a
    /// disabled setting.
    pub fn should_autoplay(&self, requested: bool) -> bool {
        requested || self.autoplay_on_load
    }

    /// Whether a viewport of `width_px` shows one page at a time
    pub fn is_narrow(&self, width_px: u32) -> bool {
        width_px < self.narrow_breakpoint_px
    }

    fn normalized(mut self) -> Self {
        self.default_interval_secs = clamp_interval(self.default_interval_secs as i64);
        self
    }
}
