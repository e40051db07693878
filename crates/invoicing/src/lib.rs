//! Invoicing domain module.
//!
//! This crate contains the business rules for turning raw line-item input into
//! a finalized, arithmetically-consistent invoice, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;
pub mod invoice;
pub mod line_item;

pub use customer::{Customer, Merchant};
pub use invoice::{Invoice, InvoiceDraft, InvoiceMeta, PaymentMode};
pub use line_item::LineItem;
