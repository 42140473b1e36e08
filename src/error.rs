//! Error types for the withholding engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition the engine refuses to recover from silently.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the withholding engine.
///
/// Formula-mandated clamps (floor at zero, cap at a ceiling) are never errors;
/// anything else the engine cannot compute is reported through this type.
///
/// # Example
///
/// ```
/// use withholding_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/provincial.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/provincial.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but its contents are unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of what is wrong with the dataset.
        message: String,
    },

    /// A caller-supplied value was outside its allowed domain.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No bracket in the table contains the given income.
    #[error("No tax bracket contains income {income}")]
    BracketOutOfRange {
        /// The income that was looked up.
        income: Decimal,
    },

    /// The request names a tax year other than the loaded dataset.
    #[error("Requested tax year {requested} but loaded dataset is for {loaded}")]
    TaxYearMismatch {
        /// The year named in the request.
        requested: i32,
        /// The year of the loaded dataset.
        loaded: i32,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
