//! The Veris semantic elaboration engine.
//!
//! Given a collection of parsed syntax trees, a [`Compilation`]
//! constructs a fully elaborated design: a hierarchy of instances,
//! types, values, expressions, and bindings, while enforcing the
//! language's scoping, typing, constant-evaluation, driver, and
//! assertion-instantiation rules.
//!
//! # Lifecycle
//!
//! A compilation is constructed with [`CompilationOptions`], accepts
//! syntax trees via [`Compilation::add_tree`], and freezes when the
//! design root is first requested through [`Compilation::root`] (or any
//! query that forces it, such as
//! [`Compilation::semantic_diagnostics`]). After that point the model is
//! immutable and every query returns stable results.
//!
//! ```
//! use veris_common::Interner;
//! use veris_sema::{Compilation, CompilationOptions};
//! use veris_source::Span;
//! use veris_syntax::{SourceUnit, SyntaxTree};
//!
//! let interner = Interner::new();
//! let tree = SyntaxTree::new(SourceUnit { items: vec![], span: Span::DUMMY });
//! let mut compilation = Compilation::new(&interner, CompilationOptions::default());
//! compilation.add_tree(&tree).unwrap();
//! let root = compilation.root().unwrap();
//! assert!(compilation.is_finalized());
//! assert!(compilation.symbol(root).scope().is_some());
//! ```

#![warn(missing_docs)]

pub mod assertions;
pub mod compilation;
pub mod const_eval;
pub mod const_value;
pub mod coverage;
pub mod declared_types;
pub mod definitions;
pub mod drivers;
pub mod errors;
pub mod expr;
pub mod lazy;
pub mod lookup;
pub mod members;
pub mod options;
pub mod overrides;
pub mod scope;
pub mod stmt;
pub mod symbols;
pub mod types;

pub use compilation::Compilation;
pub use const_eval::{EvalContext, EvalFlags};
pub use const_value::ConstantValue;
pub use drivers::{Driver, DriverKind, DriverSource};
pub use expr::{BindContext, BindFlags, Expression, ExpressionKind};
pub use lazy::Lazy;
pub use lookup::{LookupFlags, LookupLocation};
pub use options::{CompilationOptions, MinTypMax};
pub use symbols::{Symbol, SymbolId, SymbolKind};
pub use types::{TypeDb, TypeId, TypeKind};
