//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Message History Exporter - Export a contact's message history from the
/// Messages database into readable text files.
#[derive(Parser, Debug)]
#[command(name = "msg-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to ~/.message-history-exporter/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Messages database (defaults to ~/Library/Messages/chat.db).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the full history with a contact to three text files.
    Export {
        /// Phone number, email or name fragment.
        search: String,

        /// Name shown for the contact (defaults to the matched handle).
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory (defaults to the configured one).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List handles matching a search term.
    Contacts {
        /// Phone number, email or name fragment.
        search: String,

        /// Maximum number of handles to show.
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show how each message's text was recovered.
    Inspect {
        /// Phone number, email or name fragment.
        search: String,

        /// Show only the last N messages.
        #[arg(short, long)]
        last: Option<usize>,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Split an exported conversation file into chunks.
    Batch {
        /// Conversation file produced by `export`.
        file: PathBuf,

        /// Estimated tokens per chunk (defaults to the configured value).
        #[arg(short = 't', long)]
        max_tokens: Option<usize>,

        /// Maximum messages per chunk.
        #[arg(short = 'm', long)]
        max_messages: Option<usize>,
    },

    /// Show database and configuration paths being used.
    Paths,

    /// Write the default configuration file if none exists.
    InitConfig,
}
