//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paisa - expense tracking from free-form notes
#[derive(Parser)]
#[command(name = "paisa")]
#[command(about = "Turn free-form spending notes into a categorized ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze notes: extract, categorize, and save transactions
    Analyze {
        /// Notes to analyze, e.g. "coffee 150 yesterday, Uber 450 today"
        text: Option<String>,

        /// Read notes from a file (.txt, .pdf, or .docx; repeatable)
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Attach a receipt image (.png, .jpg, or .webp; repeatable)
        #[arg(short, long)]
        image: Vec<PathBuf>,

        /// Extraction proxy URL (overrides PAISA_GATEWAY_URL)
        #[arg(long)]
        server: Option<String>,

        /// Show what would be saved without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Add one transaction directly
    Add {
        /// Item label, kept exactly as typed
        item: String,

        /// Amount
        price: f64,

        /// Category (defaults to Other)
        #[arg(short, long, default_value = "Other")]
        category: String,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Record as income instead of expense
        #[arg(long)]
        income: bool,
    },

    /// List transactions, newest first
    List {
        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show a specific month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Edit fields of one transaction
    Edit {
        /// Transaction id
        id: i64,

        #[arg(long)]
        item: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        /// New date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete one transaction
    Delete {
        /// Transaction id
        id: i64,
    },

    /// Show the current month's summary
    Summary {
        /// Show a specific month (YYYY-MM) in the trend breakdown
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Watch the ledger and reprint the summary on every change
    Watch,

    /// Show or set the monthly budget
    Budget {
        /// New budget amount; omit to show the current one
        amount: Option<f64>,
    },

    /// Export the ledger as CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the extraction proxy server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long)]
        origin: Vec<String>,

        /// Use the deterministic mock extractor instead of Gemini
        ///
        /// For offline demos and tests; no GEMINI_API_KEY needed.
        #[arg(long)]
        mock: bool,
    },
}
