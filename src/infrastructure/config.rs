//! Configuration file management.
//!
//! Handles loading and creating the TOML configuration file.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Message History Exporter Configuration
# Auto-generated - edit as needed

[paths]
# Messages database (defaults to ~/Library/Messages/chat.db)
# messages_db = "/path/to/chat.db"

# Directory export files are written to (defaults to the current directory)
# output_dir = "/path/to/exports"

[export]
# Shown for messages whose text could not be recovered
unavailable_placeholder = "[content unavailable]"

# Shown for unrecoverable messages that carry attachments
attachment_placeholder = "[attachment]"

[batch]
# Estimated tokens per chunk (1 token ~ 4 characters)
max_tokens = 30000

# Optional cap on messages per chunk
# max_messages = 500

[extraction]
# Class names preceding the message text in attributedBody payloads
sentinels = ["NSString", "NSMutableString"]

# Type tag byte of the string run (43 = '+')
string_type_tag = 43

# Bytes searched after a sentinel for the type tag
max_preamble = 8

# Short runs need a letter or digit to be kept by the fallback scan
preferred_min_run = 4

# Characters collapsed into a single space
separators = ["\uFFFD", "\uFFFC"]

# Serialization tokens stripped from recovered text.
# Leave unset to use the built-in list.
# keywords = ["streamtyped", "NSString", "NSDictionary"]
"#;

/// Load configuration from a file, or the default location.
///
/// A missing file yields the default configuration.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map_or_else(AppConfig::default_config_path, Path::to_path_buf);

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })?;

    tracing::info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns `true` when a new file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %path.display(), "Created default configuration");

    Ok(true)
}
