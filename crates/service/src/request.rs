//! Boundary DTOs for raw invoice input.
//!
//! Everything here is untrusted: the form/transport layer is free to send
//! numbers as JSON numbers or as strings, and fields may be missing or blank.
//! Parsing and validation happen behind this boundary, never in front of it.

use serde::{Deserialize, Serialize};

use billforge_invoicing::PaymentMode;

/// A numeric field as delivered by the transport: string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Text(String),
    Number(serde_json::Number),
}

impl RawNumber {
    /// Normalize to text for the parse-then-validate boundary.
    pub fn as_text(&self) -> String {
        match self {
            RawNumber::Text(s) => s.clone(),
            RawNumber::Number(n) => n.to_string(),
        }
    }

    /// Whether the field is effectively absent (blank text).
    pub fn is_blank(&self) -> bool {
        match self {
            RawNumber::Text(s) => s.trim().is_empty(),
            RawNumber::Number(_) => false,
        }
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

impl From<String> for RawNumber {
    fn from(value: String) -> Self {
        RawNumber::Text(value)
    }
}

/// Raw customer fields, all optional at the wire level; requiredness is the
/// validator's call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// One raw line-item row, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub name: String,
    pub quantity: RawNumber,
    pub unit_price: RawNumber,
}

/// Everything a caller supplies to generate one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateInvoiceRequest {
    pub customer: RawCustomer,
    #[serde(default)]
    pub items: Vec<RawItem>,
    /// Percentage; absent or blank means no tax.
    #[serde(default)]
    pub tax_rate: Option<RawNumber>,
    /// Flat amount; absent or blank means no discount.
    #[serde(default)]
    pub discount: Option<RawNumber>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_arrive_as_strings_or_numbers() {
        let request: GenerateInvoiceRequest = serde_json::from_value(serde_json::json!({
            "customer": { "name": "Jane Doe" },
            "items": [
                { "name": "Widget", "quantity": 2, "unit_price": "9.99" },
                { "name": "Gadget", "quantity": "1", "unit_price": 19.50 },
            ],
            "tax_rate": 10,
            "payment_mode": "credit",
        }))
        .unwrap();

        assert_eq!(request.items[0].quantity.as_text(), "2");
        assert_eq!(request.items[0].unit_price.as_text(), "9.99");
        assert_eq!(request.items[1].unit_price.as_text(), "19.5");
        assert_eq!(request.payment_mode, Some(PaymentMode::Credit));
        assert_eq!(request.discount, None);
    }

    #[test]
    fn blank_detection_covers_whitespace() {
        assert!(RawNumber::from("   ").is_blank());
        assert!(!RawNumber::from("0").is_blank());
    }
}
