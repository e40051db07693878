//! Fixed-point monetary values.
//!
//! All monetary arithmetic uses [`rust_decimal::Decimal`] — never binary
//! floating point. Rounding is round-half-up (`MidpointAwayFromZero`) at two
//! fractional digits and happens at exactly two points in the pipeline: the
//! line amount (quantity × unit price) and the tax amount. Everything else is
//! exact addition/subtraction of already-rounded values.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Fractional digits carried by every monetary value.
pub const MONETARY_SCALE: u32 = 2;

/// Currency marker used by display formatting (single-currency system).
pub const CURRENCY_MARKER: &str = "Rs.";

/// Parse a raw text field into a decimal.
///
/// Trims surrounding whitespace first; a blank field and an unparseable field
/// are distinct errors so the caller can surface a precise message.
pub fn parse_decimal(field: &str, raw: &str) -> ValidationResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Decimal::from_str(trimmed).map_err(|_| ValidationError::invalid_number(field, raw))
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONETARY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Monetary value at [`MONETARY_SCALE`] fractional digits.
///
/// Value object: immutable, compared by value. Construction always normalizes
/// to the monetary scale, so two `Money` values representing the same amount
/// are equal.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Build from an arbitrary decimal, rounding half-up to the monetary scale.
    pub fn from_decimal(value: Decimal) -> Self {
        Self(round_half_up(value))
    }

    /// Parse a raw text field into a monetary value.
    pub fn parse(field: &str, raw: &str) -> ValidationResult<Self> {
        parse_decimal(field, raw).map(Self::from_decimal)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Exact addition; `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Exact subtraction; `None` on overflow.
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Line amount: quantity × unit price, rounded half-up to the monetary
    /// scale. `None` on overflow.
    pub fn checked_mul_quantity(&self, quantity: Decimal) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money::from_decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_MARKER} {:.2}", self.0)
    }
}

/// Tax rate as a non-negative percentage (e.g. `10` = 10%).
///
/// Rates above 100% are unusual but not rejected; only negative rates are
/// invalid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Build from a percentage value.
    pub fn from_percent(percent: Decimal) -> ValidationResult<Self> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(ValidationError::invalid_tax_rate("must not be negative"));
        }
        Ok(Self(percent))
    }

    /// Parse a raw text field into a tax rate.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let trimmed = raw.trim();
        let percent = Decimal::from_str(trimmed)
            .map_err(|_| ValidationError::invalid_tax_rate(format!("not a number: {raw:?}")))?;
        Self::from_percent(percent)
    }

    pub fn percent(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Tax amount on a base: `round_half_up(base × percent / 100)`.
    ///
    /// `None` on overflow.
    pub fn tax_on(&self, base: Money) -> Option<Money> {
        base.amount()
            .checked_mul(self.0)?
            .checked_div(Decimal::ONE_HUNDRED)
            .map(Money::from_decimal)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}
