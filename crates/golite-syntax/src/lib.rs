//! # golite-syntax
//!
//! The tree the golite checker consumes. Trees are produced by a front end
//! (or built directly, as the checker tests do); this crate has no parser.

pub mod ast;
pub mod format;

pub use ast::*;
pub use format::{format_expr, format_stmt, format_type_expr};
