//! Line-item validation: raw text in, typed entry out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billforge_core::{Money, ValidationError, ValidationResult, parse_decimal};

/// One validated row of an invoice.
///
/// Invariant: `amount == round_half_up(quantity × unit_price)` at all times;
/// the amount is derived during validation and the fields are immutable
/// afterwards, so it can never drift from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    name: String,
    quantity: Decimal,
    unit_price: Money,
    amount: Money,
}

impl LineItem {
    /// Validate one raw item into a typed entry.
    ///
    /// Quantity policy: fractional quantities are allowed (weight-based
    /// items), but must be strictly positive. Unit price is rounded to the
    /// monetary scale at parse time; the derived amount is rounded half-up.
    ///
    /// Pure function: no side effects.
    pub fn validate(name: &str, quantity_raw: &str, unit_price_raw: &str) -> ValidationResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        let quantity = parse_decimal("quantity", quantity_raw)?;
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::non_positive("quantity"));
        }

        let unit_price = Money::parse("unit_price", unit_price_raw)?;
        if unit_price.is_negative() {
            return Err(ValidationError::negative("unit_price"));
        }

        let amount = unit_price
            .checked_mul_quantity(quantity)
            .ok_or_else(|| ValidationError::amount_overflow("amount"))?;

        Ok(Self {
            name: name.to_string(),
            quantity,
            unit_price,
            amount,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Invariant check: the stored amount recomputes from its inputs.
    pub fn amount_is_consistent(&self) -> bool {
        self.unit_price.checked_mul_quantity(self.quantity) == Some(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valid_item_derives_its_amount() {
        let item = LineItem::validate("Widget", "2", "9.99").unwrap();
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.quantity(), dec!(2));
        assert_eq!(item.unit_price().amount(), dec!(9.99));
        assert_eq!(item.amount().amount(), dec!(19.98));
        assert!(item.amount_is_consistent());
    }

    #[test]
    fn fractional_quantities_are_allowed() {
        // 1.5 kg at 33.33 → 49.995 → 50.00 (half-up)
        let item = LineItem::validate("Rice", "1.5", "33.33").unwrap();
        assert_eq!(item.amount().amount(), dec!(50.00));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = LineItem::validate("  ", "1", "1.00").unwrap_err();
        assert_eq!(err, ValidationError::empty_field("name"));
    }

    #[test]
    fn unparseable_quantity_is_rejected() {
        let err = LineItem::validate("Widget", "two", "1.00").unwrap_err();
        assert_eq!(err, ValidationError::invalid_number("quantity", "two"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = LineItem::validate("Widget", "0", "1.00").unwrap_err();
        assert_eq!(err, ValidationError::non_positive("quantity"));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = LineItem::validate("Widget", "-3", "1.00").unwrap_err();
        assert_eq!(err, ValidationError::non_positive("quantity"));
    }

    #[test]
    fn unparseable_unit_price_is_rejected() {
        let err = LineItem::validate("Widget", "1", "free").unwrap_err();
        assert_eq!(err, ValidationError::invalid_number("unit_price", "free"));
    }

    #[test]
    fn negative_unit_price_is_rejected() {
        let err = LineItem::validate("Widget", "1", "-0.01").unwrap_err();
        assert_eq!(err, ValidationError::negative("unit_price"));
    }

    #[test]
    fn zero_unit_price_is_allowed() {
        // Free items are legitimate rows.
        let item = LineItem::validate("Sample", "3", "0").unwrap();
        assert!(item.amount().is_zero());
    }
}
