//! Configuration management for LabTrack Engine
//!
//! Settings are merged from, in increasing precedence:
//!
//! - **Defaults**: [`AppConfig::default`]
//! - **File**: `labtrack.{yaml,toml,json}` or an explicit path
//! - **Environment**: `LABTRACK__<SECTION>__<KEY>`
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::ConfigEngine;
//!
//! let config = ConfigEngine::new().with_file("labtrack.yaml").load()?;
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod engine;
pub mod error;
pub mod settings;
pub mod validation;

pub use engine::*;
pub use error::*;
pub use settings::*;
