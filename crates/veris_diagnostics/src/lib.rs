//! Structured diagnostics for the Veris SystemVerilog front-end.
//!
//! This crate provides [`Diagnostic`] messages with category-prefixed
//! codes (severity is a pure function of the code's category), annotated
//! source labels, and structured sub-diagnostic notes. The
//! [`DiagnosticStore`] accumulates them, deduplicates repeats at the same
//! code and location, and hands them out sorted by source location.
//! Rendering to terminal or machine formats is an external concern.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod severity;
pub mod store;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Note};
pub use label::{Label, LabelStyle};
pub use severity::Severity;
pub use store::DiagnosticStore;
