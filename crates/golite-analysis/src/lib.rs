//! Type model and assignment checking for golite.
//!
//! The crate checks function bodies against a Go-style type system. Its
//! focus is the assignment family: `var` and `const` declarations, short
//! variable declarations, `=` assignments and `return` statements,
//! including untyped constant conversion, comma-ok forms and unused
//! variable reporting.
//!
//! # Architecture
//!
//! ```text
//!   syntax tree ──▶ Checker ──▶ TypeInfo (expr types, defs, uses, scopes)
//!                     │
//!                     └──────▶ DiagnosticSink (errors, warnings)
//! ```
//!
//! Entities live in [`TCObjects`] arenas and are referred to by typed keys
//! ([`ObjKey`], [`TypeKey`], [`ScopeKey`], [`PackageKey`]).
//!
//! # Example
//!
//! ```ignore
//! use golite_analysis::{Checker, Config};
//!
//! let mut checker = Checker::with_config(interner, Config::from_env());
//! let sig = checker.check_func(&func.sig, &func.body);
//! for diag in checker.take_diagnostics() {
//!     eprintln!("{}", diag.message);
//! }
//! ```

pub mod arena;
pub mod check;
pub mod config;
pub mod constant;
pub mod lookup;
pub mod obj;
pub mod objects;
pub mod operand;
pub mod package;
pub mod scope;
pub mod typ;
pub mod universe;

pub use check::{Checker, ExprClass, TypeAndValue, TypeError, TypeInfo};
pub use config::Config;
pub use obj::{ConstValue, EntityType, LangObj};
pub use objects::{ObjKey, PackageKey, ScopeKey, TCObjects, TypeKey};
pub use operand::{Operand, OperandMode};
