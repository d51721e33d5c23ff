//! Output formatting for exported transcripts.
//!
//! Renders the simple transcript, the detailed transcript and the summary
//! written by `export`, plus the table and JSON views used by `contacts` and
//! `inspect`.

use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Handle, Transcript};

/// Output format for the `inspect` command.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

fn push_header(lines: &mut Vec<String>, title: &str, transcript: &Transcript) {
    lines.push(title.to_string());
    lines.push("=".repeat(60));
    lines.push(format!(
        "📱 Contact: {} ({})",
        transcript.contact_name, transcript.contact_id
    ));
    if let Some((first, last)) = transcript.date_range() {
        lines.push(format!("📅 Date Range: {first} to {last}"));
    }
    lines.push(format!("📊 Total Messages: {}", transcript.message_count()));
    lines.push(String::new());
}

/// Simple transcript: one numbered line per message.
pub fn format_simple(transcript: &Transcript) -> String {
    let mut lines = Vec::new();
    push_header(&mut lines, "💬 MESSAGE CONVERSATION", transcript);

    for (i, entry) in transcript.entries.iter().enumerate() {
        lines.push(format!(
            "{:3}. [{}] {}: {}",
            i + 1,
            entry.readable_date(),
            transcript.sender(entry),
            entry.display_text
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Detailed transcript with sender, receiver and service per message.
pub fn format_detailed(transcript: &Transcript) -> String {
    let mut lines = Vec::new();
    push_header(&mut lines, "💬 DETAILED MESSAGE CONVERSATION", transcript);
    lines.push("📋 CONVERSATION:".to_string());
    lines.push("-".repeat(60));
    lines.push(String::new());

    for (i, entry) in transcript.entries.iter().enumerate() {
        lines.push(format!("{:3}. [{}]", i + 1, entry.readable_date()));
        lines.push(format!("    FROM: {}", transcript.sender(entry)));
        lines.push(format!("    TO: {}", transcript.receiver(entry)));
        lines.push(format!("    MESSAGE: {}", entry.display_text));
        if !entry.service.is_empty() {
            lines.push(format!("    📱 Service: {}", entry.service));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Count-based summary followed by every message.
pub fn format_summary(transcript: &Transcript) -> String {
    let stats = transcript.stats();
    let mut lines = vec![
        "📋 CONVERSATION SUMMARY".to_string(),
        "=".repeat(60),
        format!(
            "📱 Contact: {} ({})",
            transcript.contact_name, transcript.contact_id
        ),
        String::new(),
        "📊 Message Count:".to_string(),
        format!("  You: {} messages", stats.from_me),
        format!(
            "  {}: {} messages",
            transcript.contact_name, stats.from_contact
        ),
        format!("  Total: {} messages", stats.total),
        String::new(),
        "🔎 Content Sources:".to_string(),
        format!("  Plain text: {}", stats.plain),
        format!("  Recovered from rich text: {}", stats.extracted),
        format!("  Unavailable: {}", stats.unavailable),
        String::new(),
        "📝 All Messages:".to_string(),
        "-".repeat(30),
    ];

    for (i, entry) in transcript.entries.iter().enumerate() {
        lines.push(format!(
            "{:2}. [{}] {}: {}",
            i + 1,
            entry.readable_date(),
            transcript.sender(entry),
            entry.display_text
        ));
    }

    lines.join("\n")
}

/// Table of resolved messages with their content source.
pub fn format_entries_table(transcript: &Transcript) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Row", "Date", "From", "Source", "Text"]);

    for entry in &transcript.entries {
        table.add_row(vec![
            entry.rowid.to_string(),
            entry.readable_date(),
            transcript.sender(entry).to_string(),
            entry.content.kind.to_string(),
            truncate(&entry.display_text, 60),
        ]);
    }

    table.to_string()
}

/// Resolved messages as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_entries_json(transcript: &Transcript) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(transcript)
}

/// Table of handles matching a contact search.
pub fn format_handles_table(handles: &[Handle]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Handle", "Service", "Messages"]);

    for handle in handles {
        table.add_row(vec![
            handle.id.clone(),
            handle.service.clone(),
            handle.message_count.to_string(),
        ]);
    }

    table.to_string()
}

/// Truncates to the first line and at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
