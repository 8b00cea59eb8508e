//! Business services used by handlers

pub mod analyzer_service;

pub use analyzer_service::AnalyzerService;
