//! Writes transcripts and transcript chunks to disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::application::{
    chunk_file_name, estimate_tokens, format_batch_summary, format_detailed, format_simple,
    format_summary, render_chunk, Chunk, ChunkReport,
};
use crate::domain::{AppError, Result, Transcript};

/// Timestamp used in generated file names.
#[must_use]
pub fn file_timestamp(now: NaiveDateTime) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Paths of the three files written for one export.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub simple: PathBuf,
    pub detailed: PathBuf,
    pub summary: PathBuf,
}

/// Writes the simple, detailed and summary transcripts into `dir`.
///
/// # Errors
/// Returns error if the directory or a file cannot be written.
pub fn write_exports(transcript: &Transcript, dir: &Path, now: NaiveDateTime) -> Result<ExportPaths> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::io(format!("Failed to create directory {}", dir.display()), e)
    })?;

    let stamp = file_timestamp(now);
    let safe = transcript.safe_name();

    let paths = ExportPaths {
        simple: dir.join(format!("conversation_{safe}_{stamp}.txt")),
        detailed: dir.join(format!("detailed_conversation_{safe}_{stamp}.txt")),
        summary: dir.join(format!("summary_{safe}_{stamp}.txt")),
    };

    write_file(&paths.simple, &format_simple(transcript))?;
    write_file(&paths.detailed, &format_detailed(transcript))?;
    write_file(&paths.summary, &format_summary(transcript))?;

    tracing::info!(
        messages = transcript.message_count(),
        "Wrote exports to {}",
        dir.display()
    );

    Ok(paths)
}

/// Writes chunk files next to `source` plus a batch summary.
///
/// Returns the per-chunk reports and the summary path.
///
/// # Errors
/// Returns error if a file cannot be written.
pub fn write_chunks(
    source: &Path,
    chunks: &[Chunk],
    now: NaiveDateTime,
) -> Result<(Vec<ChunkReport>, PathBuf)> {
    let stamp = file_timestamp(now);
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::InvalidData {
            message: format!("Not a file path: {}", source.display()),
        })?;

    let total = chunks.len();
    let mut reports = Vec::with_capacity(total);

    for (i, chunk) in chunks.iter().enumerate() {
        let index = i + 1;
        let content = render_chunk(chunk, index, total);
        let file_name = chunk_file_name(&stem, index, total, &stamp);
        write_file(&dir.join(&file_name), &content)?;

        reports.push(ChunkReport {
            file_name,
            message_count: chunk.message_count,
            tokens: estimate_tokens(&content),
        });
    }

    let summary_path = dir.join(format!("{stem}_batch_summary_{stamp}.txt"));
    write_file(
        &summary_path,
        &format_batch_summary(&source.display().to_string(), &reports),
    )?;

    Ok((reports, summary_path))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{build_transcript, split_transcript};
    use crate::domain::{BatchConfig, ExportConfig, ExtractionRules, MessageRecord};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 31)
            .and_then(|d| d.and_hms_opt(13, 49, 49))
            .unwrap()
    }

    fn sample_transcript(count: i64) -> Transcript {
        let records: Vec<MessageRecord> = (1..=count)
            .map(|i| MessageRecord {
                rowid: i,
                plain_text: Some(format!("message {i}")),
                timestamp: i,
                is_from_me: i % 2 == 0,
                service: "SMS".into(),
                ..MessageRecord::default()
            })
            .collect();
        build_transcript(
            "+15550100",
            "+1 555 0100",
            &records,
            &ExtractionRules::default(),
            &ExportConfig::default(),
        )
    }

    #[test]
    fn test_write_exports_names_files() {
        let dir = tempdir().unwrap();
        let paths = write_exports(&sample_transcript(3), dir.path(), now()).unwrap();

        assert_eq!(
            paths.simple.file_name().unwrap(),
            "conversation__1_555_0100_20250731_134949.txt"
        );
        assert_eq!(
            paths.summary.file_name().unwrap(),
            "summary__1_555_0100_20250731_134949.txt"
        );

        let detailed = fs::read_to_string(&paths.detailed).unwrap();
        assert!(detailed.contains("    📱 Service: SMS"));
        assert!(detailed.contains("MESSAGE: message 3"));
    }

    #[test]
    fn test_write_chunks_round_trip_through_export() {
        let dir = tempdir().unwrap();
        let paths = write_exports(&sample_transcript(5), dir.path(), now()).unwrap();

        let content = fs::read_to_string(&paths.simple).unwrap();
        let options = BatchConfig {
            max_tokens: 30_000,
            max_messages: Some(2),
        };
        let chunks = split_transcript(&content, &options);
        let (reports, summary) = write_chunks(&paths.simple, &chunks, now()).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(
            reports.iter().map(|r| r.message_count).sum::<usize>(),
            5
        );
        assert_eq!(
            reports[0].file_name,
            "conversation__1_555_0100_20250731_134949_chunk_01_of_03_20250731_134949.txt"
        );
        assert!(dir.path().join(&reports[2].file_name).exists());
        assert!(fs::read_to_string(summary).unwrap().contains("Messages: 5"));
    }
}
