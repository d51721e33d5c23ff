//! Configuration models.
//!
//! Contains the application configuration and the extraction rule table
//! used to recover text from `attributedBody` payloads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Markers, tags and keywords of the typedstream format.
///
/// The values differ slightly between OS releases, so they are data rather
/// than constants and can be overridden from the `[extraction]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRules {
    /// Class names that precede the primary string run.
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,

    /// Type tag byte introducing a C string (`+`).
    #[serde(default = "default_string_type_tag")]
    pub string_type_tag: u8,

    /// How many bytes after a sentinel to search for the type tag.
    #[serde(default = "default_max_preamble")]
    pub max_preamble: usize,

    /// Runs at least this long win over shorter runs in the heuristic scan.
    #[serde(default = "default_preferred_min_run")]
    pub preferred_min_run: usize,

    /// Serialization tokens removed from recovered text.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Characters whose runs are collapsed to a single space.
    #[serde(default = "default_separators")]
    pub separators: Vec<char>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            sentinels: default_sentinels(),
            string_type_tag: default_string_type_tag(),
            max_preamble: default_max_preamble(),
            preferred_min_run: default_preferred_min_run(),
            keywords: default_keywords(),
            separators: default_separators(),
        }
    }
}

impl ExtractionRules {
    /// Keywords ordered longest first, skipping empty entries.
    #[must_use]
    pub fn keywords_longest_first(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self
            .keywords
            .iter()
            .map(String::as_str)
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keywords.dedup();
        keywords
    }
}

fn default_sentinels() -> Vec<String> {
    vec!["NSString".into(), "NSMutableString".into()]
}

const fn default_string_type_tag() -> u8 {
    b'+'
}

const fn default_max_preamble() -> usize {
    8
}

const fn default_preferred_min_run() -> usize {
    4
}

fn default_keywords() -> Vec<String> {
    [
        "streamtyped",
        "NSMutableAttributedString",
        "NSAttributedString",
        "NSMutableString",
        "NSString",
        "NSDictionary",
        "NSMutableDictionary",
        "NSArray",
        "NSNumber",
        "NSValue",
        "NSObject",
        "NSData",
        "NSMutableData",
        "__kIMMessagePartAttributeName",
        "__kIMFileTransferGUIDAttributeName",
        "__kIMBaseWritingDirectionAttributeName",
        "__kIMDataDetectedAttributeName",
        "__kIMLinkAttributeName",
        "__kIMMentionConfirmedMention",
        "$classname",
        "$classes",
        "utableData",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_separators() -> Vec<char> {
    vec!['\u{FFFD}', '\u{FFFC}']
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Messages database (defaults to `~/Library/Messages/chat.db`).
    #[serde(default)]
    pub messages_db: Option<PathBuf>,

    /// Directory export files are written to (defaults to the current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Transcript rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Shown for messages whose content could not be recovered.
    #[serde(default = "default_unavailable_placeholder")]
    pub unavailable_placeholder: String,

    /// Shown for unrecoverable messages that carry attachments.
    #[serde(default = "default_attachment_placeholder")]
    pub attachment_placeholder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            unavailable_placeholder: default_unavailable_placeholder(),
            attachment_placeholder: default_attachment_placeholder(),
        }
    }
}

fn default_unavailable_placeholder() -> String {
    "[content unavailable]".into()
}

fn default_attachment_placeholder() -> String {
    "[attachment]".into()
}

/// Transcript chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Estimated token budget per chunk.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Optional cap on messages per chunk.
    #[serde(default)]
    pub max_messages: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            max_messages: None,
        }
    }
}

const fn default_max_tokens() -> usize {
    30_000
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub extraction: ExtractionRules,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".message-history-exporter")
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Directory exports go to.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.paths
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
