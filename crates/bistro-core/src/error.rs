//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bistro-engine errors (separate crate)                                 │
//! │  └── EngineError      - Lookups, wrapped validation, config failures   │
//! │                                                                         │
//! │  bistro-server errors (app)                                            │
//! │  └── ApiError         - What the table/manager UI sees (serialized)    │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → ApiError → UI                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! An invalid transition (attending a waiter call nobody made, placing an
//! order from an empty cart, moving an order backwards) is a safe no-op and
//! is reported as [`crate::transition::Transition::Ignored`], never as an
//! `Err`. Double taps from several phones at the same table must not blow up.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    NonZero { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}
