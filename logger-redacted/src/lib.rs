//! Logging setup for LabTrack Engine with PII redaction
//!
//! Audit-trail failures are logged together with the acting user, and those
//! identities are emails. This crate installs the tracing subscriber used by
//! the binaries and offers [`redact_email`] so log lines never carry raw
//! addresses.
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init, redact_email, LogFormat, LoggerConfig};
//!
//! let config = LoggerConfig {
//!     format: LogFormat::Json,
//!     ..LoggerConfig::default()
//! };
//! init(&config).ok();
//!
//! tracing::warn!(user = %redact_email("tech@lab.example"), "History write dropped");
//! ```

pub mod config;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;
