//! Customer and merchant parties.

use serde::{Deserialize, Serialize};

use billforge_core::{ValidationError, ValidationResult};

/// The customer an invoice is billed to.
///
/// Immutable once constructed; every invoice exclusively owns its customer
/// value. Name is required, the contact fields are optional but checked for
/// obviously broken formats when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    name: String,
    address: String,
    phone: String,
    email: String,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> ValidationResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::invalid_customer("name must not be empty"));
        }

        let phone = phone.into().trim().to_string();
        if !phone.is_empty() {
            validate_phone(&phone)?;
        }

        let email = email.into().trim().to_string();
        if !email.is_empty() {
            validate_email(&email)?;
        }

        Ok(Self {
            name,
            address: address.into().trim().to_string(),
            phone,
            email,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

fn validate_phone(phone: &str) -> ValidationResult<()> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '/');
    if !phone.chars().all(allowed) || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_customer(format!(
            "phone looks malformed: {phone:?}"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> ValidationResult<()> {
    // Intentionally shallow: one '@' with non-empty sides and a dot in the
    // domain. Real deliverability checks are not this system's job.
    let malformed = || {
        ValidationError::invalid_customer(format!("email looks malformed: {email:?}"))
    };
    let (local, domain) = email.split_once('@').ok_or_else(malformed)?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(malformed());
    }
    Ok(())
}

/// The merchant (store) issuing the invoice; rendered in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl Default for Merchant {
    fn default() -> Self {
        Self {
            name: "Retail Store".to_string(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
        }
    }
}
