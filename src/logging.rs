//! Logging configuration for Page Turner
//!
//! Logs go to the terminal and to a file at:
//! `~/Library/Logs/Page-Turner/page-turner.log` on macOS, or
//! `<data_local_dir>/Page-Turner/logs/page-turner.log` elsewhere.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "page-turner.log";

/// Size at which the previous log is moved aside
const ROTATE_BYTES: u64 = 10 * 1024 * 1024;

/// Get the log directory path
pub fn get_log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join("Page-Turner"))
    } else {
        dirs::data_local_dir().map(|d| d.join("Page-Turner").join("logs"))
    }
}

/// Get the current log file path
pub fn get_log_file_path() -> Option<PathBuf> {
    get_log_directory().map(|d| d.join(LOG_FILE_NAME))
}

/// Move `log_path` to `<name>.old` once it grows past `limit` bytes
///
/// Returns true if the file was rotated.
fn rotate_if_large(log_path: &Path, limit: u64) -> bool {
    let Ok(metadata) = fs::metadata(log_path) else {
        return false;
    };
    if metadata.len() <= limit {
        return false;
    }
    let mut backup = log_path.as_os_str().to_owned();
    backup.push(".old");
    fs::rename(log_path, PathBuf::from(backup)).is_ok()
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

/// Initialize the logging system
///
/// `verbose` raises the terminal level from info to debug. Returns the path
/// to the log file, or None if only terminal logging could be set up.
pub fn init_logging(verbose: bool) -> Option<PathBuf> {
    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let Some(log_dir) = get_log_directory() else {
        eprintln!("Warning: Could not determine log directory");
        init_terminal_only(term_level);
        return None;
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only(term_level);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_large(&log_path, ROTATE_BYTES);

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only(term_level);
            return None;
        }
    };

    let config = log_config();
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(term_level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, config, log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("=== Page Turner session started ===");
    log::info!("Log file: {}", log_path.display());

    Some(log_path)
}

/// Terminal-only logging, used when the log file is unavailable
fn init_terminal_only(level: LevelFilter) {
    let term_logger = TermLogger::new(level, log_config(), TerminalMode::Mixed, ColorChoice::Auto);
    let _ = CombinedLogger::init(vec![term_logger]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_log_directory_returns_path() {
        let dir = get_log_directory();
        assert!(dir.is_some(), "Should return a log directory path");

        let path = dir.unwrap();
        assert!(
            path.to_string_lossy().contains("Page-Turner"),
            "Path should contain app name"
        );
    }

    #[test]
    fn test_log_file_path_is_inside_log_directory() {
        let dir = get_log_directory().unwrap();
        let file = get_log_file_path().unwrap();

        assert!(file.starts_with(&dir), "Log file should be inside log directory");
        assert!(file.to_string_lossy().ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn test_rotates_large_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join(LOG_FILE_NAME);
        fs::write(&log_path, vec![b'x'; 64]).unwrap();

        assert!(!rotate_if_large(&log_path, 64));
        assert!(rotate_if_large(&log_path, 32));
        assert!(!log_path.exists());
        assert!(temp_dir.path().join("page-turner.log.old").exists());
    }

    #[test]
    fn test_rotate_ignores_missing_log() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!rotate_if_large(&temp_dir.path().join("absent.log"), 0));
    }
}
