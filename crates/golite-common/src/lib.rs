//! # golite-common
//!
//! Infrastructure shared by the golite front end:
//! - byte spans over a global position space
//! - source files for rendering diagnostics
//! - structured diagnostics and their sink
//! - identifier interning

pub mod diagnostics;
pub mod source;
pub mod span;
pub mod symbol;

pub use diagnostics::{Diagnostic, DiagnosticEmitter, DiagnosticSink, Label, Severity};
pub use source::{FileId, SourceFile, SourceMap};
pub use span::{BytePos, Span};
pub use symbol::{Ident, Symbol, SymbolInterner};
