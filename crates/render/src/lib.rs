//! Deterministic fixed-layout PDF rendering for finalized invoices.
//!
//! The renderer is a pure function of the invoice content plus an explicit
//! generation timestamp: the same inputs always produce byte-identical output.
//! It never mutates the invoice it receives, and it is all-or-nothing — a
//! failure means no bytes were produced.

pub mod layout;
pub mod pdf;

pub use pdf::{RenderedDocument, render};
