//! Persistence layer for LabTrack Engine
//!
//! Three narrow ports sit in front of the backing store:
//!
//! - [`AnalyzerStore`]: create/find/update/delete analyzers by id or id-set
//! - [`TableRegistry`]: resolve a logical table name to the id that tags history
//! - [`HistoryStore`]: append-only audit history
//!
//! Each port has a PostgreSQL implementation (sqlx) and a process-local one in
//! [`memory`]. Callers hold them as `Arc<dyn Trait>` and never see which one
//! is in use.
//!
//! # Example
//!
//! ```rust
//! use database_layer::{AnalyzerFilter, AnalyzerStore, MemoryAnalyzerStore, NewAnalyzer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), database_layer::DatabaseError> {
//! let store = MemoryAnalyzerStore::new();
//! let analyzer = store.create(NewAnalyzer::new("Cobas 6000")).await?;
//! let listed = store.find_all(AnalyzerFilter::default()).await?;
//! assert_eq!(listed, vec![analyzer]);
//! # Ok(())
//! # }
//! ```

pub mod analyzer_repository;
pub mod connection;
pub mod error;
pub mod history_repository;
pub mod memory;
pub mod models;
pub mod table_repository;

pub use analyzer_repository::*;
pub use connection::*;
pub use error::*;
pub use history_repository::*;
pub use memory::*;
pub use models::*;
pub use table_repository::*;
