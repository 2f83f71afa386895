use core_config::ConfigError;
use thiserror::Error;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Why a raw field or canonical offer failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    /// The field is required but absent (or a null token such as `NA`)
    Missing,
    /// The value is not one of the spellings the provider dialect recognizes
    Unrecognized { value: String },
    /// The value should be numeric but does not parse
    NotANumber { value: String },
    /// The value parsed but violates a range constraint
    OutOfRange { value: String, constraint: String },
    /// The value contradicts another field of the same row
    Inconsistent { detail: String },
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationKind::Missing => write!(f, "missing required value"),
            ValidationKind::Unrecognized { value } => write!(f, "unrecognized value {value:?}"),
            ValidationKind::NotANumber { value } => write!(f, "{value:?} is not a number"),
            ValidationKind::OutOfRange { value, constraint } => {
                write!(f, "{value} violates {constraint}")
            }
            ValidationKind::Inconsistent { detail } => write!(f, "{detail}"),
        }
    }
}

/// A raw field that could not be mapped onto the canonical schema.
///
/// `field` is the provider-native key for normalizer failures and the
/// canonical field name for invariant failures on already-built offers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field `{field}`: {kind}")]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Missing)
    }

    pub fn unrecognized(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationKind::Unrecognized {
                value: value.into(),
            },
        )
    }

    pub fn not_a_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationKind::NotANumber {
                value: value.into(),
            },
        )
    }

    pub fn out_of_range(
        field: impl Into<String>,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        Self::new(
            field,
            ValidationKind::OutOfRange {
                value: value.to_string(),
                constraint: constraint.into(),
            },
        )
    }

    pub fn inconsistent(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationKind::Inconsistent {
                detail: detail.into(),
            },
        )
    }
}

/// Errors that can occur in the pricing domain
#[derive(Debug, Error)]
pub enum PricingError {
    /// A single row or offer failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A row inside a batch failed validation
    #[error("row {index}: {source}")]
    Row {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// The offer source failed to produce a snapshot
    #[error("Offer source error: {0}")]
    Source(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PricingError {
    /// The validation failure behind this error, if any
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            PricingError::Validation(e) | PricingError::Row { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
