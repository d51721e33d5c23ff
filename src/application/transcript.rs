//! Transcript building.
//!
//! Resolves every queried message and orders the conversation oldest first.

use crate::domain::{ExportConfig, ExtractionRules, MessageRecord, Transcript, TranscriptEntry};

use super::resolver::resolve;

/// Builds a transcript from the raw rows of one contact.
///
/// Every record produces an entry; unrecoverable messages keep a placeholder
/// so counts match the database.
#[must_use]
pub fn build_transcript(
    contact_id: &str,
    contact_name: &str,
    records: &[MessageRecord],
    rules: &ExtractionRules,
    export: &ExportConfig,
) -> Transcript {
    let mut entries: Vec<TranscriptEntry> = records
        .iter()
        .map(|record| {
            let content = resolve(record, rules);
            let display_text = if content.is_unavailable() {
                if record.has_attachments {
                    export.attachment_placeholder.clone()
                } else {
                    export.unavailable_placeholder.clone()
                }
            } else {
                content.text.clone()
            };

            TranscriptEntry {
                rowid: record.rowid,
                timestamp: record.timestamp,
                sent_at: record.sent_at_local(),
                is_from_me: record.is_from_me,
                service: record.service.clone(),
                has_attachments: record.has_attachments,
                content,
                display_text,
            }
        })
        .collect();

    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.rowid.cmp(&b.rowid)));

    let transcript = Transcript {
        contact_id: contact_id.to_string(),
        contact_name: contact_name.to_string(),
        entries,
    };

    let stats = transcript.stats();
    tracing::info!(
        total = stats.total,
        plain = stats.plain,
        extracted = stats.extracted,
        unavailable = stats.unavailable,
        "Built transcript for {}",
        contact_id
    );

    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SourceKind;

    fn record(rowid: i64, timestamp: i64, text: Option<&str>, attachments: bool) -> MessageRecord {
        MessageRecord {
            rowid,
            plain_text: text.map(String::from),
            rich_payload: None,
            timestamp,
            is_from_me: rowid % 2 == 0,
            service: "iMessage".into(),
            has_attachments: attachments,
        }
    }

    #[test]
    fn test_sorted_oldest_first_with_rowid_tiebreak() {
        let records = vec![
            record(3, 300, Some("third"), false),
            record(2, 100, Some("second"), false),
            record(1, 100, Some("first"), false),
        ];
        let t = build_transcript(
            "+15550100",
            "+15550100",
            &records,
            &ExtractionRules::default(),
            &ExportConfig::default(),
        );
        let texts: Vec<&str> = t.entries.iter().map(|e| e.display_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unavailable_messages_are_kept_with_placeholder() {
        let records = vec![
            record(1, 1, Some("hello"), false),
            record(2, 2, None, true),
            record(3, 3, None, false),
        ];
        let t = build_transcript(
            "a@example.com",
            "Alex",
            &records,
            &ExtractionRules::default(),
            &ExportConfig::default(),
        );

        assert_eq!(t.message_count(), 3);
        assert_eq!(t.entries[1].display_text, "[attachment]");
        assert_eq!(t.entries[2].display_text, "[content unavailable]");
        assert_eq!(t.entries[2].content.kind, SourceKind::Unavailable);

        let stats = t.stats();
        assert_eq!(stats.plain, 1);
        assert_eq!(stats.unavailable, 2);
        assert_eq!(stats.from_me, 1);
        assert_eq!(stats.from_contact, 2);
    }
}
