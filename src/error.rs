//! Error types for envaware.
//!
//! All errors are strongly typed using thiserror. Validation failures are
//! local to the call that caused them and leave state untouched.

use thiserror::Error;

/// Validation errors raised by state mutations and policy configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Decay rate {rate} is out of range [0.0, 1.0)")]
    DecayRateOutOfRange {
        rate: f64,
    },

    #[error("Reinforcement amount {amount} for '{token}' must be finite and positive")]
    InvalidReinforcement {
        token: String,
        amount: f64,
    },

    #[error("Token name cannot be empty")]
    EmptyToken,

    #[error("Conversion target path cannot be empty")]
    EmptyTarget,

    #[error("Weight floor {floor} must be finite")]
    InvalidFloor {
        floor: f64,
    },

    #[error("Threshold '{name}' has invalid value {value}")]
    InvalidThreshold {
        name: String,
        value: f64,
    },

    #[error("Invalid command template '{template}': {reason}")]
    InvalidTemplate {
        template: String,
        reason: String,
    },
}

/// Top-level error type for envaware.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a serialization error.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Returns true if this is an I/O error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Result type alias for envaware operations.
pub type EnvResult<T> = Result<T, EnvError>;
