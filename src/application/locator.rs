//! Chooses which column of a message row holds its content.

use crate::domain::MessageRecord;

/// Borrowed reference to the content-bearing field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRef<'a> {
    /// The plain `text` column.
    PlainText(&'a str),
    /// The `attributedBody` blob.
    RichBlob(&'a [u8]),
    /// Neither field carries anything.
    Empty,
}

/// Locates the content of a message.
///
/// Non-blank plain text wins; otherwise a non-empty rich payload is used.
#[must_use]
pub fn locate(record: &MessageRecord) -> PayloadRef<'_> {
    if let Some(text) = record.plain_text.as_deref() {
        if !text.trim().is_empty() {
            return PayloadRef::PlainText(text);
        }
    }

    match record.rich_payload.as_deref() {
        Some(blob) if !blob.is_empty() => PayloadRef::RichBlob(blob),
        _ => PayloadRef::Empty,
    }
}
