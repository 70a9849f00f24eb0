//! Type checking of function bodies.
//!
//! The checker validates declarations, assignments and returns, records
//! the type of every expression it visits and reports diagnostics to its
//! sink.

mod assignable;
mod assignment;
mod call;
pub(crate) mod checker;
mod conversion;
pub mod errors;
mod expr;
mod stmt;
mod type_info;
mod typexpr;
mod util;

#[cfg(test)]
mod tests;

pub use checker::{Checker, DelayedAction, ObjContext};
pub use errors::TypeError;
pub use expr::ExprClass;
pub use type_info::{TypeAndValue, TypeInfo};
