//! Domain models for exported message history.
//!
//! These models represent rows read from the Messages `chat.db` and the
//! transcript built from them.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z (Apple's epoch).
const APPLE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Raw dates above this value are nanoseconds; older databases store seconds.
const NANOSECOND_THRESHOLD: i64 = 100_000_000_000;

/// One message row as stored by the Messages app.
#[derive(Debug, Clone, Default)]
pub struct MessageRecord {
    /// `message.ROWID`.
    pub rowid: i64,
    /// The plain `text` column (often NULL on newer systems).
    pub plain_text: Option<String>,
    /// The `attributedBody` typedstream blob.
    pub rich_payload: Option<Vec<u8>>,
    /// Raw `message.date` value (Apple epoch).
    pub timestamp: i64,
    /// Whether the message was sent by the local user.
    pub is_from_me: bool,
    /// Service name (iMessage, SMS, ...).
    pub service: String,
    /// Whether the row references attachments.
    pub has_attachments: bool,
}

impl MessageRecord {
    /// Convert the raw Apple timestamp to UTC.
    #[must_use]
    pub fn sent_at_utc(&self) -> Option<DateTime<Utc>> {
        apple_timestamp_to_utc(self.timestamp)
    }

    /// Sent time in the local timezone, as shown in transcripts.
    #[must_use]
    pub fn sent_at_local(&self) -> Option<NaiveDateTime> {
        self.sent_at_utc()
            .map(|dt| Local.from_utc_datetime(&dt.naive_utc()).naive_local())
    }
}

/// Converts a raw `message.date` value to a UTC datetime.
#[must_use]
pub fn apple_timestamp_to_utc(raw: i64) -> Option<DateTime<Utc>> {
    let (secs, nanos) = if raw.unsigned_abs() > NANOSECOND_THRESHOLD.unsigned_abs() {
        (raw.div_euclid(1_000_000_000), raw.rem_euclid(1_000_000_000))
    } else {
        (raw, 0)
    };

    let nanos = u32::try_from(nanos).ok()?;
    DateTime::from_timestamp(secs.checked_add(APPLE_EPOCH_OFFSET_SECS)?, nanos)
}

/// Where the final text of a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Taken from the plain `text` column.
    Plain,
    /// Recovered from the rich-text payload.
    Extracted,
    /// Nothing could be recovered.
    Unavailable,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Extracted => write!(f, "extracted"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Printable content recovered from one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub kind: SourceKind,
}

impl ExtractedText {
    #[must_use]
    pub const fn plain(text: String) -> Self {
        Self {
            text,
            kind: SourceKind::Plain,
        }
    }

    #[must_use]
    pub const fn extracted(text: String) -> Self {
        Self {
            text,
            kind: SourceKind::Extracted,
        }
    }

    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            text: String::new(),
            kind: SourceKind::Unavailable,
        }
    }

    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self.kind, SourceKind::Unavailable)
    }
}

/// A handle row matching a contact search.
#[derive(Debug, Clone, Serialize)]
pub struct Handle {
    /// Phone number or email address (`handle.id`).
    pub id: String,
    /// Service the handle is registered on.
    pub service: String,
    /// Number of messages exchanged with this handle.
    pub message_count: usize,
}

/// A single resolved message in a transcript.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub rowid: i64,
    /// Raw Apple timestamp, used for ordering.
    #[serde(skip)]
    pub timestamp: i64,
    /// Local send time.
    pub sent_at: Option<NaiveDateTime>,
    pub is_from_me: bool,
    pub service: String,
    pub has_attachments: bool,
    pub content: ExtractedText,
    /// Text to display: the content, or a placeholder when unavailable.
    pub display_text: String,
}

impl TranscriptEntry {
    /// Formatted local send time.
    #[must_use]
    pub fn readable_date(&self) -> String {
        self.sent_at.map_or_else(
            || "unknown date".to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
    }
}

/// All messages exchanged with one contact, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    /// Handle identifier the messages were queried by.
    pub contact_id: String,
    /// Name shown as the other party.
    pub contact_name: String,
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.entries.len()
    }

    /// Sender label for an entry.
    #[must_use]
    pub fn sender<'a>(&'a self, entry: &TranscriptEntry) -> &'a str {
        if entry.is_from_me {
            "You"
        } else {
            &self.contact_name
        }
    }

    /// Receiver label for an entry.
    #[must_use]
    pub fn receiver<'a>(&'a self, entry: &TranscriptEntry) -> &'a str {
        if entry.is_from_me {
            &self.contact_name
        } else {
            "You"
        }
    }

    /// First and last message dates.
    #[must_use]
    pub fn date_range(&self) -> Option<(String, String)> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        Some((first.readable_date(), last.readable_date()))
    }

    /// Filesystem-safe form of the contact name.
    #[must_use]
    pub fn safe_name(&self) -> String {
        self.contact_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }

    /// Count messages by sender and source kind.
    #[must_use]
    pub fn stats(&self) -> TranscriptStats {
        let mut stats = TranscriptStats {
            total: self.entries.len(),
            ..TranscriptStats::default()
        };

        for entry in &self.entries {
            if entry.is_from_me {
                stats.from_me += 1;
            } else {
                stats.from_contact += 1;
            }
            match entry.content.kind {
                SourceKind::Plain => stats.plain += 1,
                SourceKind::Extracted => stats.extracted += 1,
                SourceKind::Unavailable => stats.unavailable += 1,
            }
        }

        stats
    }
}

/// Message counts for a transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptStats {
    pub total: usize,
    pub from_me: usize,
    pub from_contact: usize,
    pub plain: usize,
    pub extracted: usize,
    pub unavailable: usize,
}
