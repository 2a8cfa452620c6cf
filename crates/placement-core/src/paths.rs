//! Centralized path utilities
//!
//! All application paths in one place for consistency

use std::path::PathBuf;

use crate::constants::ui;

/// Get the placement config directory (~/.placement)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ui::CONFIG_DIR_NAME)
}

/// Get the config file path (~/.placement/config.toml)
pub fn config_path() -> PathBuf {
    config_dir().join(ui::CONFIG_FILE_NAME)
}

/// Get the logs directory (~/.placement/logs)
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Get the CLI log file (~/.placement/logs/placement.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join(ui::LOG_FILE_NAME)
}
