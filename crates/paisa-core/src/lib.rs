//! Paisa Core Library
//!
//! Shared functionality for the Paisa expense tracker:
//! - Transaction models and the ledger storage boundary (memory + SQLite)
//! - Knowledge base built from categorization history
//! - AI extraction gateway (proxy client, Gemini upstream, mock)
//! - Reconciliation of extracted candidates against learned categories
//! - Ledger aggregation (monthly/daily/category/trend summaries)
//! - Session lifecycle with debounced recompute
//! - File text extraction for uploaded notes (txt/pdf/docx)

pub mod ai;
pub mod debounce;
pub mod error;
pub mod export;
pub mod files;
pub mod knowledge;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod store;

/// Test utilities including the stub model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{ExtractionRequest, Extractor, ExtractorClient, GatewayClient, GeminiExtractor, ImageAttachment, MockExtractor};
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use knowledge::KnowledgeBase;
pub use ledger::{summarize, trend, LedgerSummary, TrendPoint};
pub use models::{
    BatchInsertReport, CandidateRecord, LedgerSnapshot, NewTransaction, Transaction,
    TransactionKind, TransactionPatch,
};
pub use reconcile::{reconcile_batch, CategoryResolver, LearnedResolver};
pub use session::{Session, SessionState};
pub use store::{LedgerStore, MemoryStore, SqliteStore};
