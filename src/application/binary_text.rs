//! Text recovery from `attributedBody` payloads.
//!
//! The payload is an NSArchiver typedstream. Rather than decoding the object
//! graph, the extractor looks for the string run that follows a known class
//! name and, failing that, picks the longest printable run in the blob.

use crate::domain::ExtractionRules;

use super::cleaner::strip_keywords;

/// Length prefix: a little-endian `u16` follows.
const LENGTH_U16: u8 = 0x81;
/// Length prefix: a little-endian `u32` follows.
const LENGTH_U32: u8 = 0x82;

/// Recovers the primary text run of a rich-text payload.
///
/// Returns `None` when the payload holds no printable text at all.
#[must_use]
pub fn extract(blob: &[u8], rules: &ExtractionRules) -> Option<String> {
    if let Some(text) = extract_after_sentinel(blob, rules) {
        tracing::trace!(chars = text.chars().count(), "Recovered run after sentinel");
        return Some(text);
    }

    let run = longest_printable_run(blob, rules);
    tracing::trace!(found = run.is_some(), "Fell back to printable-run scan");
    run
}

/// Tries every sentinel occurrence, earliest first.
fn extract_after_sentinel(blob: &[u8], rules: &ExtractionRules) -> Option<String> {
    let mut hits: Vec<usize> = rules
        .sentinels
        .iter()
        .filter(|s| !s.is_empty())
        .flat_map(|s| find_all(blob, s.as_bytes()).map(move |pos| pos + s.len()))
        .collect();
    hits.sort_unstable();
    hits.dedup();

    hits.into_iter()
        .find_map(|after| read_string_run(blob, after, rules))
}

fn find_all<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, window)| *window == needle)
        .map(|(pos, _)| pos)
}

/// Reads the length-prefixed string declared after a sentinel.
fn read_string_run(blob: &[u8], start: usize, rules: &ExtractionRules) -> Option<String> {
    let preamble_end = start.saturating_add(rules.max_preamble).min(blob.len());
    let preamble = blob.get(start..preamble_end)?;
    let tag = preamble.iter().position(|&b| b == rules.string_type_tag)?;

    let cursor = start + tag + 1;
    let (len, header) = read_length(blob.get(cursor..)?)?;
    let text_start = cursor + header;
    let text_end = text_start.checked_add(len)?;
    let bytes = blob.get(text_start..text_end)?;

    let text = std::str::from_utf8(bytes).ok()?;
    if text.chars().any(is_printable) && !text.chars().all(char::is_whitespace) {
        Some(text.to_string())
    } else {
        None
    }
}

/// Decodes a typedstream length, returning `(length, bytes consumed)`.
fn read_length(bytes: &[u8]) -> Option<(usize, usize)> {
    match *bytes.first()? {
        LENGTH_U16 => {
            let raw: [u8; 2] = bytes.get(1..3)?.try_into().ok()?;
            Some((usize::from(u16::from_le_bytes(raw)), 3))
        }
        LENGTH_U32 => {
            let raw: [u8; 4] = bytes.get(1..5)?.try_into().ok()?;
            Some((usize::try_from(u32::from_le_bytes(raw)).ok()?, 5))
        }
        len if len < 0x80 => Some((usize::from(len), 1)),
        _ => None,
    }
}

/// Characters kept in a printable run.
fn is_printable(c: char) -> bool {
    c != char::REPLACEMENT_CHARACTER && (!c.is_control() || c == '\n' || c == '\t')
}

/// Longest printable run of the lossily decoded blob; ties go to the earliest.
fn longest_printable_run(blob: &[u8], rules: &ExtractionRules) -> Option<String> {
    let decoded = String::from_utf8_lossy(blob);
    let keywords = rules.keywords_longest_first();

    let mut best: Option<(&str, usize)> = None;
    for run in decoded.split(|c: char| !is_printable(c)) {
        let len = run.chars().count();
        if len == 0 || best.is_some_and(|(_, best_len)| len <= best_len) {
            continue;
        }
        if !is_candidate(run, len, rules.preferred_min_run, &keywords) {
            continue;
        }
        best = Some((run, len));
    }

    best.map(|(run, _)| run.to_string())
}

/// Accepts runs carrying ASCII letters or digits that are not just keywords.
///
/// Lossy decoding turns stray high bytes into arbitrary non-ASCII letters, so
/// those never qualify a run on their own, and runs shorter than
/// `preferred_min_run` must be pure ASCII.
fn is_candidate(run: &str, len: usize, preferred_min_run: usize, keywords: &[&str]) -> bool {
    if !run.chars().any(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    if len < preferred_min_run && !run.is_ascii() {
        return false;
    }
    !strip_keywords(run, keywords).trim().is_empty()
}
