//! Source text management for the Veris SystemVerilog front-end.
//!
//! The elaboration engine itself never reads source text; it carries
//! [`Span`]s through the semantic model so that diagnostics can be
//! resolved to line/column coordinates by external renderers. The
//! [`SourceDb`] is the collaborator interface those renderers (and the
//! parser) use.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
