//! Messages database path discovery.

use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Location of `chat.db` relative to the home directory.
const MESSAGES_DB_PATH: &str = "Library/Messages/chat.db";

/// Default Messages database location for the current user.
///
/// # Errors
/// Returns error if the home directory cannot be determined.
pub fn default_messages_db() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| AppError::Config {
        message: "Could not determine home directory".into(),
    })?;

    Ok(home.join(MESSAGES_DB_PATH))
}

/// Picks the database path: explicit flag, then config, then the default.
///
/// # Errors
/// Returns error if no path is given and the home directory is unknown.
pub fn resolve_messages_db(explicit: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = &config.paths.messages_db {
        tracing::debug!("Using messages database from config: {}", path.display());
        return Ok(path.clone());
    }

    default_messages_db()
}
