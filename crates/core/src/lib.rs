//! `billforge-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy, fixed-point monetary value objects, and strongly-typed
//! identifiers shared by the invoicing pipeline.

pub mod error;
pub mod id;
pub mod money;

pub use error::{RenderError, ValidationError, ValidationResult};
pub use id::{InvoiceId, InvoiceNumber};
pub use money::{Money, TaxRate, parse_decimal};
