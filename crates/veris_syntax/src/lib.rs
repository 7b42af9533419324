//! Syntax tree types for the Veris SystemVerilog front-end.
//!
//! The parser (an external collaborator) produces one immutable
//! [`SyntaxTree`] per source file. The elaboration engine borrows trees
//! for its whole lifetime and never mutates them; every node carries a
//! [`Span`](veris_source::Span), which doubles as the node's stable
//! identity for sideband maps (attributes, bind-directive tracking).
//!
//! Error recovery is represented by `Error(Span)` variants at the item,
//! statement, and expression levels; the elaboration engine treats those
//! as already-diagnosed holes and skips them silently.

#![warn(missing_docs)]

pub mod ast;
pub mod tree;

pub use ast::*;
pub use tree::{DefaultNetType, SyntaxTree, TimeScale, TimeUnit, UnconnectedDrive};
