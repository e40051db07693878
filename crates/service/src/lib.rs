//! Invoice generation orchestrator.
//!
//! Thin boundary layer between a transport (HTTP route, CLI, desktop shell —
//! all external to this workspace) and the invoicing core. It accepts raw,
//! possibly-malformed textual input, drives the
//! `Validate → Aggregate → Render` pipeline, and maps every failure to a
//! stage-tagged, field-level message.

pub mod pipeline;
pub mod request;

pub use pipeline::{GenerationContext, InvoiceService, PipelineError, Stage};
pub use request::{GenerateInvoiceRequest, RawCustomer, RawItem, RawNumber};
