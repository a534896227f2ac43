//! # Engine Error Types
//!
//! Error types for floor operations and configuration.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Engine Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Lookup         │  │  Input          │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  TableNotFound  │  │  Validation     │  │  InvalidConfig          │ │
//! │  │  OrderNotFound  │  │  ProductNotFound│  │  ConfigLoadFailed       │ │
//! │  │                 │  │                 │  │  ConfigSaveFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ignored transitions are not errors; they come back as
//! `Ok(Transition::Ignored(_))`.

use bistro_core::ValidationError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// Table id is not on the floor and lazy creation is off.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl EngineError {
    /// An id the caller referenced does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TableNotFound(_)
                | EngineError::OrderNotFound(_)
                | EngineError::ProductNotFound(_)
        )
    }

    /// The caller sent bad input.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_)
                | EngineError::ConfigLoadFailed(_)
                | EngineError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = EngineError::OrderNotFound("ord-9".into());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Order not found: ord-9");

        let err: EngineError = ValidationError::NonZero {
            field: "delta".into(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_config_category() {
        assert!(EngineError::InvalidConfig("slots".into()).is_config_error());
        assert!(!EngineError::TableNotFound("1".into()).is_config_error());
    }
}
