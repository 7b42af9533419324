//! Shared foundational types used across the Veris SystemVerilog front-end.
//!
//! This crate provides interned identifiers, IEEE 1800 four-state logic
//! values, arbitrary-width packed logic vectors with the arithmetic needed
//! by constant evaluation, and the internal-error result types used for
//! contract violations.

#![warn(missing_docs)]

pub mod ident;
pub mod logic;
pub mod logic_vec;
pub mod result;

pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use result::{InternalError, VerisResult};
