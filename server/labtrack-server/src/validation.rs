//! Request validation utilities for consistent validation across handlers
//!
//! This module provides a `RequestValidation` trait and helper macros to
//! centralize validation logic and ensure consistent error messages.

use database_layer::{AnalyzerPatch, NewAnalyzer};

use crate::error::ApiError;

const NAME_MAX_LEN: usize = 200;

/// Trait for validating request payloads
///
/// Implemented for every create/update body the API accepts.
pub trait RequestValidation {
    /// Returns `Err(ApiError::Validation)` describing the first failed rule.
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.name, !self.name.trim().is_empty(), "Name is required");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

impl RequestValidation for NewAnalyzer {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "Analyzer name is required");
        validate_length!(
            self.name,
            1,
            NAME_MAX_LEN,
            "Analyzer name must be between 1 and 200 characters"
        );
        Ok(())
    }
}

impl RequestValidation for AnalyzerPatch {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate_required!(name, "Analyzer name cannot be blank");
            validate_length!(
                name,
                1,
                NAME_MAX_LEN,
                "Analyzer name must be between 1 and 200 characters"
            );
        }
        Ok(())
    }
}
