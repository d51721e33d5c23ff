//! Message History Exporter - Export a contact's message history from the
//! macOS Messages database.
//!
//! Messages stores the text of newer messages only inside `attributedBody`,
//! a serialized rich-text blob. This tool recovers printable text from those
//! payloads and writes each conversation as three text files.
//!
//!   msg-export contacts 555               # Find matching handles
//!   msg-export export +15550100           # Write transcript, detailed, summary
//!   msg-export inspect +15550100 --last 20 # Check how text was recovered
//!   msg-export batch conversation_x.txt   # Split a transcript into chunks

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    build_transcript, format_entries_json, format_entries_table, format_handles_table,
    split_transcript, OutputFormat,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, BatchConfig, Transcript};
use infrastructure::{
    ensure_config_exists, load_config, resolve_messages_db, write_chunks, write_exports,
    MessageDb,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);

    // init-config must work even when the existing file is broken
    if matches!(cli.command, Commands::InitConfig) {
        return cmd_init_config(&config_path);
    }

    let config = load_config(Some(&config_path))?;
    let db_path = resolve_messages_db(cli.db.as_deref(), &config)?;

    match cli.command {
        Commands::Export { search, name, dir } => {
            cmd_export(&db_path, &config, &search, name.as_deref(), dir)?;
        }
        Commands::Contacts { search, limit } => {
            cmd_contacts(&db_path, &search, limit)?;
        }
        Commands::Inspect {
            search,
            last,
            format,
        } => {
            let format: OutputFormat = format
                .parse()
                .map_err(|message| AppError::Config { message })?;
            cmd_inspect(&db_path, &config, &search, last, format)?;
        }
        Commands::Batch {
            file,
            max_tokens,
            max_messages,
        } => {
            let options = BatchConfig {
                max_tokens: max_tokens.unwrap_or(config.batch.max_tokens),
                max_messages: max_messages.or(config.batch.max_messages),
            };
            cmd_batch(&file, &options)?;
        }
        Commands::Paths => {
            cmd_paths(&db_path, &config_path);
        }
        Commands::InitConfig => {}
    }

    Ok(())
}

/// Resolves a contact and builds its transcript.
fn load_transcript(
    db_path: &Path,
    config: &AppConfig,
    search: &str,
    name: Option<&str>,
) -> domain::Result<Transcript> {
    let db = MessageDb::open(db_path)?;
    let contact_id = db.find_contact(search)?;
    let records = db.fetch_messages(&contact_id)?;

    if records.is_empty() {
        return Err(AppError::NoMessages { contact_id });
    }

    Ok(build_transcript(
        &contact_id,
        name.unwrap_or(&contact_id),
        &records,
        &config.extraction,
        &config.export,
    ))
}

/// Export command: writes the three transcript files.
fn cmd_export(
    db_path: &Path,
    config: &AppConfig,
    search: &str,
    name: Option<&str>,
    dir: Option<PathBuf>,
) -> domain::Result<()> {
    println!("🔍 Searching for: {search}");

    let transcript = load_transcript(db_path, config, search, name)?;
    let stats = transcript.stats();

    println!(
        "{} Found {} messages with {} ({})",
        "✓".green().bold(),
        stats.total,
        transcript.contact_name.cyan(),
        transcript.contact_id
    );
    if stats.unavailable > 0 {
        println!(
            "  {} {} messages had no recoverable text",
            "!".yellow().bold(),
            stats.unavailable
        );
    }

    let dir = dir.unwrap_or_else(|| config.output_dir());
    let paths = write_exports(&transcript, &dir, Local::now().naive_local())?;

    for path in [&paths.simple, &paths.detailed, &paths.summary] {
        println!("{} {}", "✓".green(), path.display());
    }

    println!("\n{} Export completed", "📁".bold());
    Ok(())
}

/// Contacts command: lists matching handles.
fn cmd_contacts(db_path: &Path, search: &str, limit: usize) -> domain::Result<()> {
    let db = MessageDb::open(db_path)?;
    let handles = db.search_handles(search, limit)?;

    if handles.is_empty() {
        return Err(AppError::ContactNotFound {
            search: search.to_string(),
        });
    }

    println!("{}", format_handles_table(&handles));
    Ok(())
}

/// Inspect command: shows each message with its content source.
fn cmd_inspect(
    db_path: &Path,
    config: &AppConfig,
    search: &str,
    last: Option<usize>,
    format: OutputFormat,
) -> domain::Result<()> {
    let mut transcript = load_transcript(db_path, config, search, None)?;

    if let Some(n) = last {
        let len = transcript.entries.len();
        if n < len {
            transcript.entries = transcript.entries.split_off(len - n);
        }
    }

    let output = match format {
        OutputFormat::Table => format_entries_table(&transcript),
        OutputFormat::Json => {
            format_entries_json(&transcript).map_err(AppError::json_parse)?
        }
    };

    println!("{output}");
    Ok(())
}

/// Batch command: splits a transcript file into chunk files.
fn cmd_batch(file: &Path, options: &BatchConfig) -> domain::Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| AppError::io(format!("Failed to read {}", file.display()), e))?;

    let chunks = split_transcript(&content, options);
    let (reports, summary) = write_chunks(file, &chunks, Local::now().naive_local())?;

    for (i, report) in reports.iter().enumerate() {
        println!(
            "  📄 Chunk {:2}: {:4} messages, ~{:5} tokens → {}",
            i + 1,
            report.message_count,
            report.tokens,
            report.file_name
        );
    }

    println!(
        "{} Created {} chunks, summary: {}",
        "✓".green().bold(),
        reports.len(),
        summary.display()
    );
    Ok(())
}

/// Paths command: shows where data is read from.
fn cmd_paths(db_path: &Path, config_path: &Path) {
    let status = |p: &Path| {
        if p.exists() {
            "found".green()
        } else {
            "missing".red()
        }
    };

    println!("{}", "📂 Paths".bold());
    println!();
    println!("  [{}] database: {}", status(db_path), db_path.display());
    println!("  [{}] config:   {}", status(config_path), config_path.display());
}

/// Init-config command: writes the default configuration file.
fn cmd_init_config(config_path: &Path) -> domain::Result<()> {
    if ensure_config_exists(config_path)? {
        println!("{} Created {}", "✓".green().bold(), config_path.display());
    } else {
        println!("Configuration already exists: {}", config_path.display());
    }
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
