//! Common error handling utilities for LabTrack Engine
//!
//! This crate provides the process-level error type used by binaries and the
//! stable error codes that API error bodies carry, so every module reports
//! failures the same way.
//!
//! # Error Categories
//!
//! - **DatabaseError**: backing-store failures at startup
//! - **ConfigError** / **ServerError** / **NetworkError**: startup and serving failures
//! - **Other**: anything wrapped from `anyhow`
//!
//! # Example
//!
//! ```rust
//! use error_common::{LabTrackError, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| LabTrackError::ConfigError(format!("invalid port: {raw}")))
//! }
//!
//! assert!(parse_port("8080").is_ok());
//! assert!(parse_port("http").is_err());
//! ```

pub mod codes;
pub mod types;

pub use codes::*;
pub use types::*;
