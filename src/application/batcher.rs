//! Splits exported transcripts into chunks that fit an LLM context window.

use crate::domain::BatchConfig;

const TITLE_PREFIX: &str = "💬 MESSAGE CONVERSATION";
const TOTAL_PREFIX: &str = "📊 Total Messages:";

/// Rough token estimate: one token per four characters.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// One chunk of a split transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Header and message lines, in output order.
    pub lines: Vec<String>,
    /// Number of message lines.
    pub message_count: usize,
}

/// Whether a trimmed line is a numbered message line (`  1. [date] ...`).
fn is_message_line(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
        && line.contains('[')
        && line.contains(']')
}

/// Splits a simple transcript into chunks.
///
/// Lines before the first message form the header; unnumbered lines after it
/// belong to the preceding message, minus its trailing blank lines. The header opens the first chunk and later
/// chunks repeat it without the title line. A chunk closes when the next
/// message would exceed the token budget or the message cap is reached.
#[must_use]
pub fn split_transcript(content: &str, options: &BatchConfig) -> Vec<Chunk> {
    let mut headers: Vec<&str> = Vec::new();
    let mut messages: Vec<String> = Vec::new();

    for line in content.lines().map(str::trim) {
        if is_message_line(line) {
            messages.push(line.to_string());
        } else if let Some(last) = messages.last_mut() {
            // Continuation of a multi-line message.
            last.push('\n');
            last.push_str(line);
        } else {
            headers.push(line);
        }
    }
    for message in &mut messages {
        let len = message.trim_end_matches('\n').len();
        message.truncate(len);
    }
    while headers.last().is_some_and(|l| l.is_empty()) {
        headers.pop();
    }

    tracing::debug!(
        headers = headers.len(),
        messages = messages.len(),
        "Classified transcript lines"
    );

    let new_chunk = |repeat_header: bool| {
        let header = if repeat_header {
            headers.get(1..).unwrap_or_default()
        } else {
            &headers[..]
        };
        let mut lines: Vec<String> = header.iter().map(|l| (*l).to_string()).collect();
        if !header.is_empty() {
            lines.push(String::new());
        }
        Chunk {
            lines,
            message_count: 0,
        }
    };

    let mut chunks = Vec::new();
    let mut current = new_chunk(false);
    let mut current_tokens = 0;

    for message in messages {
        let tokens = estimate_tokens(&message);
        let over_budget =
            current.message_count > 0 && current_tokens + tokens > options.max_tokens;
        let at_cap = options
            .max_messages
            .is_some_and(|max| max > 0 && current.message_count >= max);

        if over_budget || at_cap {
            chunks.push(std::mem::replace(&mut current, new_chunk(true)));
            current_tokens = 0;
        }

        current.lines.push(message);
        current.lines.push(String::new());
        current.message_count += 1;
        current_tokens += tokens;
    }

    if current.message_count > 0 || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Renders a chunk, labelling its title and message total with its position.
#[must_use]
pub fn render_chunk(chunk: &Chunk, index: usize, total: usize) -> String {
    chunk
        .lines
        .iter()
        .map(|line| {
            if line.starts_with(TOTAL_PREFIX) {
                format!(
                    "{TOTAL_PREFIX} {} (Chunk {index} of {total})",
                    chunk.message_count
                )
            } else if line.starts_with(TITLE_PREFIX) {
                format!("{TITLE_PREFIX} (Chunk {index} of {total})")
            } else {
                line.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chunk file name: `<stem>_chunk_<ii>_of_<nn>_<timestamp>.txt`.
#[must_use]
pub fn chunk_file_name(stem: &str, index: usize, total: usize, timestamp: &str) -> String {
    format!("{stem}_chunk_{index:02}_of_{total:02}_{timestamp}.txt")
}

/// Per-chunk figures reported in the batch summary.
#[derive(Debug, Clone)]
pub struct ChunkReport {
    pub file_name: String,
    pub message_count: usize,
    pub tokens: usize,
}

/// Renders the batch summary file.
#[must_use]
pub fn format_batch_summary(source: &str, reports: &[ChunkReport]) -> String {
    let mut lines = vec![
        "📋 BATCH SUMMARY".to_string(),
        "=".repeat(60),
        format!("📄 Original File: {source}"),
        format!("📊 Total Chunks: {}", reports.len()),
        String::new(),
        "📁 Generated Files:".to_string(),
        "-".repeat(30),
    ];

    for report in reports {
        lines.push(format!("  📄 {}", report.file_name));
        lines.push(format!("     Messages: {}", report.message_count));
        lines.push(format!("     Tokens: ~{}", group_thousands(report.tokens)));
        lines.push(String::new());
    }

    let total_messages: usize = reports.iter().map(|r| r.message_count).sum();
    let total_tokens: usize = reports.iter().map(|r| r.tokens).sum();

    lines.push("📊 TOTAL:".to_string());
    lines.push(format!("  Messages: {total_messages}"));
    lines.push(format!("  Tokens: ~{}", group_thousands(total_tokens)));
    lines.push(String::new());
    lines.push("💡 Usage Tips:".to_string());
    lines.push("  - Process chunks sequentially for chronological order".to_string());
    lines.push("  - Use chunk numbers to maintain conversation flow".to_string());

    lines.join("\n")
}

/// Formats `1234567` as `1,234,567`.
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(messages: usize) -> String {
        let mut lines = vec![
            "💬 MESSAGE CONVERSATION".to_string(),
            "=".repeat(60),
            "📱 Contact: Sam (+15550100)".to_string(),
            format!("📊 Total Messages: {messages}"),
            String::new(),
        ];
        for i in 1..=messages {
            lines.push(format!("{i:3}. [2025-07-31 13:49:00] Sam: message number {i}"));
            lines.push(String::new());
        }
        lines.join("\n")
    }

    #[test]
    fn test_single_chunk_when_under_budget() {
        let chunks = split_transcript(&transcript(3), &BatchConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].message_count, 3);
        assert_eq!(chunks[0].lines[0], "💬 MESSAGE CONVERSATION");
    }

    #[test]
    fn test_splits_on_token_budget() {
        let options = BatchConfig {
            max_tokens: 25,
            max_messages: None,
        };
        let chunks = split_transcript(&transcript(5), &options);
        // Each message line is 46 chars, 11 tokens: two per chunk.
        assert_eq!(
            chunks.iter().map(|c| c.message_count).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert_ne!(chunks[1].lines[0], "💬 MESSAGE CONVERSATION");
        assert!(chunks[1].lines.iter().any(|l| l.starts_with("📱 Contact:")));
    }

    #[test]
    fn test_splits_on_message_cap() {
        let options = BatchConfig {
            max_tokens: 30_000,
            max_messages: Some(4),
        };
        let chunks = split_transcript(&transcript(10), &options);
        assert_eq!(
            chunks.iter().map(|c| c.message_count).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
    }

    #[test]
    fn test_oversized_message_gets_own_chunk() {
        let options = BatchConfig {
            max_tokens: 1,
            max_messages: None,
        };
        let chunks = split_transcript(&transcript(2), &options);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.message_count == 1));
    }

    #[test]
    fn test_multi_line_message_keeps_paragraph_breaks() {
        let content = [
            "💬 MESSAGE CONVERSATION",
            "📊 Total Messages: 2",
            "",
            "  1. [2025-07-31 13:49:00] Sam: first line",
            "",
            "second paragraph",
            "",
            "",
            "  2. [2025-07-31 13:50:00] Me: ok",
            "",
        ]
        .join("\n");
        let chunks = split_transcript(&content, &BatchConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].message_count, 2);
        assert!(chunks[0]
            .lines
            .contains(&"1. [2025-07-31 13:49:00] Sam: first line\n\nsecond paragraph".to_string()));
        assert!(chunks[0]
            .lines
            .contains(&"2. [2025-07-31 13:50:00] Me: ok".to_string()));
    }

    #[test]
    fn test_render_chunk_labels() {
        let options = BatchConfig {
            max_tokens: 30_000,
            max_messages: Some(2),
        };
        let chunks = split_transcript(&transcript(3), &options);
        let first = render_chunk(&chunks[0], 1, chunks.len());
        assert!(first.contains("💬 MESSAGE CONVERSATION (Chunk 1 of 2)"));
        assert!(first.contains("📊 Total Messages: 2 (Chunk 1 of 2)"));

        let second = render_chunk(&chunks[1], 2, chunks.len());
        assert!(second.contains("📊 Total Messages: 1 (Chunk 2 of 2)"));
    }

    #[test]
    fn test_chunk_file_name() {
        assert_eq!(
            chunk_file_name("conversation_Sam", 3, 12, "20250731_134949"),
            "conversation_Sam_chunk_03_of_12_20250731_134949.txt"
        );
    }

    #[test]
    fn test_batch_summary_totals() {
        let reports = vec![
            ChunkReport {
                file_name: "a.txt".into(),
                message_count: 10,
                tokens: 1500,
            },
            ChunkReport {
                file_name: "b.txt".into(),
                message_count: 5,
                tokens: 700,
            },
        ];
        let out = format_batch_summary("conv.txt", &reports);
        assert!(out.contains("📊 Total Chunks: 2"));
        assert!(out.contains("  Messages: 15"));
        assert!(out.contains("  Tokens: ~2,200"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
