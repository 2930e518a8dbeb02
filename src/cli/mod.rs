//! CLI module - Command-line interface for CKS AI
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CKS AI - search-backed chat and sample media service
#[derive(Parser)]
#[command(name = "cks-ai")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Answer a question once and print the Markdown reply
    #[command(alias = "a")]
    Ask {
        /// Question text
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Generate a sample file into the media directory
    Synth {
        /// video, image, audio (or mp4, jpg, wav)
        kind: String,
        /// Store under this filename instead of a timestamped one
        #[arg(long)]
        name: Option<String>,
    },

    /// List stored media files
    #[command(alias = "ls")]
    List,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
