//! Artifact cleanup for recovered message text.

use crate::domain::ExtractionRules;

/// Cleans recovered text into printable form.
///
/// Steps, in order: remove serialization keywords, drop control characters
/// (newline and tab survive), collapse separator runs into one space, then
/// trim and squeeze runs of three or more blank lines into one. The pass is
/// repeated until nothing changes, so `clean(clean(x)) == clean(x)`.
#[must_use]
pub fn clean(raw: &str, rules: &ExtractionRules) -> String {
    let keywords = rules.keywords_longest_first();
    let mut current = clean_once(raw, &keywords, &rules.separators);

    loop {
        let next = clean_once(&current, &keywords, &rules.separators);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str, keywords: &[&str], separators: &[char]) -> String {
    let text = strip_keywords(text, keywords);
    let text = remove_control_chars(&text);
    let text = collapse_separators(&text, separators);
    tidy_whitespace(&text)
}

/// Removes every keyword occurrence, including ones formed by earlier removals.
pub(crate) fn strip_keywords(text: &str, keywords: &[&str]) -> String {
    let mut out = text.to_string();

    loop {
        let before = out.len();
        for keyword in keywords {
            if out.contains(keyword) {
                out = out.replace(keyword, "");
            }
        }
        if out.len() == before {
            return out;
        }
    }
}

fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect()
}

fn collapse_separators(text: &str, separators: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for c in text.chars() {
        if separators.contains(&c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}

/// Trims the text and squeezes 3+ consecutive blank lines into one.
fn tidy_whitespace(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blanks: Vec<&str> = Vec::new();

    for line in text.trim().split('\n') {
        if line.trim().is_empty() {
            blanks.push(line);
            continue;
        }
        if blanks.len() >= 3 {
            lines.push("");
        } else {
            lines.append(&mut blanks);
        }
        blanks.clear();
        lines.push(line);
    }

    lines.join("\n")
}
