//! Per-message content resolution.

use crate::domain::{ExtractedText, ExtractionRules, MessageRecord};

use super::binary_text::extract;
use super::cleaner::clean;
use super::locator::{locate, PayloadRef};

/// Resolves the printable content of one message.
///
/// Never fails: anything that cannot be recovered comes back as
/// [`ExtractedText::unavailable`].
#[must_use]
pub fn resolve(record: &MessageRecord, rules: &ExtractionRules) -> ExtractedText {
    let resolved = match locate(record) {
        PayloadRef::PlainText(text) => ExtractedText::plain(clean(text, rules)),
        PayloadRef::RichBlob(blob) => match extract(blob, rules) {
            Some(raw) => {
                let text = clean(&raw, rules);
                if text.is_empty() {
                    ExtractedText::unavailable()
                } else {
                    ExtractedText::extracted(text)
                }
            }
            None => ExtractedText::unavailable(),
        },
        PayloadRef::Empty => ExtractedText::unavailable(),
    };

    tracing::trace!(rowid = record.rowid, kind = %resolved.kind, "Resolved message content");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SourceKind;

    fn record(plain: Option<&str>, rich: Option<Vec<u8>>) -> MessageRecord {
        MessageRecord {
            rowid: 1,
            plain_text: plain.map(String::from),
            rich_payload: rich,
            ..MessageRecord::default()
        }
    }

    #[test]
    fn test_plain_text_is_cleaned() {
        let rules = ExtractionRules::default();
        let resolved = resolve(&record(Some("  hey\u{0} there  "), None), &rules);
        assert_eq!(resolved.kind, SourceKind::Plain);
        assert_eq!(resolved.text, clean("  hey\u{0} there  ", &rules));
        assert_eq!(resolved.text, "hey there");
    }

    #[test]
    fn test_plain_text_wins_over_payload() {
        let rules = ExtractionRules::default();
        let resolved = resolve(
            &record(Some("from text"), Some(b"NSString+\x03abc".to_vec())),
            &rules,
        );
        assert_eq!(resolved, ExtractedText::plain("from text".into()));
    }

    #[test]
    fn test_empty_record_is_unavailable() {
        let rules = ExtractionRules::default();
        for r in [
            record(None, None),
            record(Some(""), None),
            record(Some("   "), Some(Vec::new())),
        ] {
            assert_eq!(resolve(&r, &rules), ExtractedText::unavailable());
        }
    }

    #[test]
    fn test_payload_with_sentinel() {
        let rules = ExtractionRules::default();
        let mut blob = b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01@\x84\x84\x84\x08NSString\x01\x94\x84\x01+".to_vec();
        blob.push(19);
        blob.extend_from_slice(b"Hello, how are you?\x86\x84\x02iI\x01\x13\x92");
        let resolved = resolve(&record(None, Some(blob)), &rules);
        assert_eq!(
            resolved,
            ExtractedText::extracted("Hello, how are you?".into())
        );
    }

    #[test]
    fn test_payload_without_sentinel() {
        let rules = ExtractionRules::default();
        let mut blob = vec![0x04, 0x00, 0x84, 0x12];
        blob.extend_from_slice(b"I'm doing great, thanks!");
        blob.extend_from_slice(&[0x86, 0x84, 0x00, 0x1f, 0x92]);
        let resolved = resolve(&record(Some(""), Some(blob)), &rules);
        assert_eq!(
            resolved,
            ExtractedText::extracted("I'm doing great, thanks!".into())
        );
    }

    #[test]
    fn test_noise_payload_is_unavailable() {
        let rules = ExtractionRules::default();
        let pool: Vec<u8> = (0x00..=0x1f)
            .filter(|b| *b != b'\n' && *b != b'\t')
            .chain(0x7f..=0xff)
            .collect();
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            let blob: Vec<u8> = (0..200)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    pool[usize::try_from(state % pool.len() as u64).unwrap()]
                })
                .collect();
            let resolved = resolve(&record(None, Some(blob)), &rules);
            assert_eq!(resolved.kind, SourceKind::Unavailable);
            assert!(resolved.text.is_empty());
        }
    }

    #[test]
    fn test_keyword_only_run_after_sentinel_is_unavailable() {
        let rules = ExtractionRules::default();
        let blob = b"NSString+\x08NSObject\x00".to_vec();
        let resolved = resolve(&record(None, Some(blob)), &rules);
        assert_eq!(resolved, ExtractedText::unavailable());
    }
}
