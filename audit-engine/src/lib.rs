//! Analyzer audit trail for LabTrack Engine
//!
//! Every mutation of an analyzer produces a history entry describing what
//! changed, who did it and why. Writing that entry must never delay or fail
//! the request that caused it, so entries go through a queue:
//!
//! - [`AuditTrail::record`] enqueues and returns immediately
//! - a background worker resolves the table tag and appends the entry
//! - failures are logged (acting user redacted) and the entry is dropped
//!
//! Audit completeness is best-effort: a store outage loses entries rather than
//! requests.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use audit_engine::{AuditTrail, HistoryAction, PendingEntry};
//! use database_layer::{MemoryHistoryStore, MemoryTableRegistry};
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), audit_engine::AuditError> {
//! let history = Arc::new(MemoryHistoryStore::new());
//! let (trail, worker) = AuditTrail::spawn(
//!     "analyzers",
//!     Arc::new(MemoryTableRegistry::with_tables(&["analyzers"])),
//!     history.clone(),
//! );
//!
//! trail.record(
//!     PendingEntry::new(Uuid::new_v4(), "tech@lab.example", HistoryAction::Create)
//!         .with_brief(Some("Create new analyzer: Cobas 6000".to_string())),
//! );
//!
//! drop(trail);
//! worker.shutdown().await;
//! assert_eq!(history.entries().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod error;
pub mod trail;

pub use entry::*;
pub use error::*;
pub use trail::*;
