//! The generation pipeline: `Collecting → Validating → Aggregating →
//! Rendering → Done`, with any failure short-circuiting to `Failed`.
//!
//! Each invocation owns its own draft and invoice value; there is no shared
//! mutable state between concurrent generations. Nothing here is retried —
//! the invoice content does not change between attempts, so retrying is the
//! caller's decision, as is any timeout around the whole call.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use billforge_core::{
    InvoiceId, InvoiceNumber, Money, RenderError, TaxRate, ValidationError,
};
use billforge_invoicing::{Customer, InvoiceDraft, InvoiceMeta, Merchant};
use billforge_render::{RenderedDocument, render};

use crate::request::{GenerateInvoiceRequest, RawNumber};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Collecting,
    Validating,
    Aggregating,
    Rendering,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Collecting => "collecting",
            Stage::Validating => "validating",
            Stage::Aggregating => "aggregating",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed pipeline run: which stage gave up, and why.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Input was rejected; `item` is the zero-based row when the failure is
    /// tied to one line item.
    #[error("{stage} failed: {source}")]
    Validation {
        stage: Stage,
        item: Option<usize>,
        #[source]
        source: ValidationError,
    },

    #[error("rendering failed: {source}")]
    Render {
        #[source]
        source: RenderError,
    },
}

impl PipelineError {
    fn validation(stage: Stage, source: ValidationError) -> Self {
        Self::Validation {
            stage,
            item: None,
            source,
        }
    }

    fn item_validation(item: usize, source: ValidationError) -> Self {
        Self::Validation {
            stage: Stage::Validating,
            item: Some(item),
            source,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Validation { stage, .. } => *stage,
            PipelineError::Render { .. } => Stage::Rendering,
        }
    }

    /// Field-level text suitable for showing to the person filling the form.
    ///
    /// Never a stack trace, never a generic failure.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation { item, source, .. } => {
                let message = validation_message(source);
                match item {
                    Some(index) => format!("line {}: {message}", index + 1),
                    None => message,
                }
            }
            PipelineError::Render { .. } => {
                "the invoice document could not be generated; nothing was saved".to_string()
            }
        }
    }
}

fn validation_message(error: &ValidationError) -> String {
    match error {
        ValidationError::EmptyField { field } => {
            format!("{} must not be empty", field_label(field))
        }
        ValidationError::InvalidNumber { field, .. } => {
            format!("{} must be a number", field_label(field))
        }
        ValidationError::NonPositiveValue { field } => {
            format!("{} must be a positive number", field_label(field))
        }
        ValidationError::NegativeValue { field } => {
            format!("{} must not be negative", field_label(field))
        }
        ValidationError::NoItems => "add at least one line item".to_string(),
        ValidationError::InvalidCustomer(msg) => format!("customer {msg}"),
        ValidationError::InvalidTaxRate(msg) => format!("tax rate {msg}"),
        ValidationError::DiscountExceedsSubtotal => {
            "discount must not exceed the subtotal".to_string()
        }
        ValidationError::AmountOverflow { .. } => {
            "amounts are too large to bill on a single invoice".to_string()
        }
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "unit_price" => "unit price",
        "name" => "item name",
        other => other,
    }
}

/// Per-call ambient inputs, passed explicitly so the pipeline never reads the
/// clock or a counter itself.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub invoice_id: InvoiceId,
    pub number: InvoiceNumber,
    pub issued_on: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

/// Thin orchestrator over the invoicing core.
///
/// Holds only read-only configuration (the merchant header block), so one
/// instance is safely shareable across concurrent generations.
#[derive(Debug, Clone, Default)]
pub struct InvoiceService {
    merchant: Merchant,
}

impl InvoiceService {
    pub fn new(merchant: Merchant) -> Self {
        Self { merchant }
    }

    pub fn merchant(&self) -> &Merchant {
        &self.merchant
    }

    /// Run the whole pipeline for one raw request.
    ///
    /// Synchronous and bounded; a caller-imposed timeout around this call is
    /// the transport's concern.
    pub fn generate(
        &self,
        request: &GenerateInvoiceRequest,
        ctx: &GenerationContext,
    ) -> Result<RenderedDocument, PipelineError> {
        let span = tracing::info_span!("generate_invoice", number = %ctx.number);
        let _enter = span.enter();

        tracing::debug!(stage = %Stage::Collecting, items = request.items.len(), "request received");

        let result = self.run(request, ctx);
        match &result {
            Ok(document) => {
                tracing::info!(
                    stage = %Stage::Done,
                    filename = document.filename(),
                    bytes = document.bytes().len(),
                    "invoice generated"
                );
            }
            Err(error) => {
                tracing::warn!(stage = %error.stage(), %error, "invoice generation failed");
            }
        }
        result
    }

    fn run(
        &self,
        request: &GenerateInvoiceRequest,
        ctx: &GenerationContext,
    ) -> Result<RenderedDocument, PipelineError> {
        // Validating: raw text becomes typed values, field by field.
        tracing::debug!(stage = %Stage::Validating, "validating input");

        let customer = Customer::new(
            request.customer.name.as_str(),
            request.customer.address.as_str(),
            request.customer.phone.as_str(),
            request.customer.email.as_str(),
        )
        .map_err(|e| PipelineError::validation(Stage::Validating, e))?;

        let mut draft = InvoiceDraft::new();
        draft.set_customer(customer);
        for (index, item) in request.items.iter().enumerate() {
            draft
                .add_item(
                    &item.name,
                    &item.quantity.as_text(),
                    &item.unit_price.as_text(),
                )
                .map_err(|e| PipelineError::item_validation(index, e))?;
        }

        draft.set_tax_rate(
            parse_optional(&request.tax_rate, TaxRate::zero(), |raw| {
                TaxRate::parse(&raw.as_text())
            })
            .map_err(|e| PipelineError::validation(Stage::Validating, e))?,
        );
        draft.set_discount(
            parse_optional(&request.discount, Money::zero(), |raw| {
                Money::parse("discount", &raw.as_text())
            })
            .map_err(|e| PipelineError::validation(Stage::Validating, e))?,
        );
        if let Some(mode) = request.payment_mode {
            draft.set_payment_mode(mode);
        }
        if let Some(notes) = &request.notes {
            draft.set_notes(notes.clone());
        }

        // Aggregating: freeze the draft into a finalized invoice.
        tracing::debug!(stage = %Stage::Aggregating, items = draft.items().len(), "aggregating totals");
        let meta = InvoiceMeta {
            id: ctx.invoice_id,
            number: ctx.number.clone(),
            issued_on: ctx.issued_on,
        };
        let invoice = draft
            .finalize(meta, self.merchant.clone())
            .map_err(|e| PipelineError::validation(Stage::Aggregating, e))?;

        // Rendering: all-or-nothing byte production.
        tracing::debug!(stage = %Stage::Rendering, "rendering document");
        render(&invoice, ctx.generated_at).map_err(|source| PipelineError::Render { source })
    }
}

/// Absent or blank optional fields fall back to their zero value; anything
/// else must parse.
fn parse_optional<T>(
    raw: &Option<RawNumber>,
    fallback: T,
    parse: impl FnOnce(&RawNumber) -> Result<T, ValidationError>,
) -> Result<T, ValidationError> {
    match raw {
        None => Ok(fallback),
        Some(value) if value.is_blank() => Ok(fallback),
        Some(value) => parse(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_renders_lowercase() {
        assert_eq!(Stage::Validating.to_string(), "validating");
        assert_eq!(Stage::Done.as_str(), "done");
    }

    #[test]
    fn item_errors_carry_the_row_number() {
        let error = PipelineError::item_validation(2, ValidationError::non_positive("quantity"));
        assert_eq!(error.stage(), Stage::Validating);
        assert_eq!(error.user_message(), "line 3: quantity must be a positive number");
    }

    #[test]
    fn messages_use_human_field_labels() {
        let error = PipelineError::validation(
            Stage::Validating,
            ValidationError::negative("unit_price"),
        );
        assert_eq!(error.user_message(), "unit price must not be negative");

        let error = PipelineError::validation(
            Stage::Aggregating,
            ValidationError::invalid_customer("name must not be empty"),
        );
        assert_eq!(error.user_message(), "customer name must not be empty");
    }

    #[test]
    fn render_failures_never_leak_internals() {
        let error = PipelineError::Render {
            source: RenderError::output("stream encode failed"),
        };
        assert_eq!(error.stage(), Stage::Rendering);
        assert!(!error.user_message().contains("encode"));
    }
}
