//! Domain error model.

use thiserror::Error;

/// Result type used across the validation/aggregation layer.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Input validation failure.
///
/// Every variant is recoverable by the caller correcting its input; nothing
/// here is fatal. Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was blank after trimming.
    #[error("{field} must not be empty")]
    EmptyField { field: String },

    /// A raw value could not be parsed as a decimal number.
    #[error("{field} is not a valid number: {value:?}")]
    InvalidNumber { field: String, value: String },

    /// A value that must be strictly positive was zero or negative.
    #[error("{field} must be a positive number")]
    NonPositiveValue { field: String },

    /// A value that must be non-negative was negative.
    #[error("{field} must not be negative")]
    NegativeValue { field: String },

    /// An invoice cannot be aggregated without line items.
    #[error("an invoice needs at least one line item")]
    NoItems,

    /// Customer data failed validation (e.g. blank name, malformed email).
    #[error("invalid customer: {0}")]
    InvalidCustomer(String),

    /// Tax rate failed validation (negative or unparseable).
    #[error("invalid tax rate: {0}")]
    InvalidTaxRate(String),

    /// A discount larger than the subtotal would push totals negative.
    #[error("discount must not exceed the subtotal")]
    DiscountExceedsSubtotal,

    /// Checked decimal arithmetic overflowed the representable range.
    #[error("{field} exceeds the representable amount range")]
    AmountOverflow { field: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }

    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn non_positive(field: impl Into<String>) -> Self {
        Self::NonPositiveValue {
            field: field.into(),
        }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        Self::NegativeValue {
            field: field.into(),
        }
    }

    pub fn invalid_customer(msg: impl Into<String>) -> Self {
        Self::InvalidCustomer(msg.into())
    }

    pub fn invalid_tax_rate(msg: impl Into<String>) -> Self {
        Self::InvalidTaxRate(msg.into())
    }

    pub fn amount_overflow(field: impl Into<String>) -> Self {
        Self::AmountOverflow {
            field: field.into(),
        }
    }
}

/// Document rendering failure.
///
/// Rendering is all-or-nothing: any failure means no bytes were produced.
/// These are not retried automatically since the invoice content does not
/// change between attempts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The invoice's stored totals do not recompute from its items.
    ///
    /// Unreachable for invoices produced by the aggregator; this exists so a
    /// hand-built or corrupted value can never reach the page.
    #[error("invoice totals are inconsistent: {0}")]
    InconsistentTotals(String),

    /// The output byte stream could not be produced.
    #[error("could not produce document bytes: {0}")]
    Output(String),
}

impl RenderError {
    pub fn inconsistent_totals(msg: impl Into<String>) -> Self {
        Self::InconsistentTotals(msg.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }
}
