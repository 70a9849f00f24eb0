//! Diagnostic codes for the golite type checker.
//!
//! Error code ranges:
//! - 2000-2099: Assignment and conversion errors
//! - 2100-2199: Expression errors
//! - 2200-2299: Declaration and scope errors
//! - 2300-2399: Call errors
//! - 2400-2499: Malformed trees
//! - 2500-2599: Statement errors
//! - 2900-2999: Warnings (soft errors)

use golite_common::diagnostics::{Diagnostic, Label};
use golite_common::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TypeError {
    // === Assignment (2000-2099) ===
    /// Value not assignable to the target type.
    IncompatibleAssign = 2000,
    /// Untyped nil without a type context.
    UntypedNilUse = 2001,
    /// Fractional constant converted to an integer type.
    TruncatedFloat = 2002,
    /// Constant out of range for its target type.
    NumericOverflow = 2003,
    /// Constant initialized with a non-constant value.
    InvalidConstInit = 2004,
    /// Left-hand side is not addressable.
    UnassignableOperand = 2005,
    /// Field of a map element on the left-hand side.
    UnaddressableFieldAssign = 2006,
    /// Different number of variables and values.
    WrongAssignCount = 2007,
    /// Different number of return values and results.
    WrongResultCount = 2008,
    /// Value does not implement the target interface.
    InvalidIfaceAssign = 2009,
    /// Channel value with mismatched direction or naming.
    InvalidChanAssign = 2010,
    /// Untyped value with no matching target representation.
    InvalidUntypedConversion = 2011,
    /// Constant not representable in the target type.
    InvalidConstVal = 2012,
    /// Explicit conversion between incompatible types.
    InvalidConversion = 2013,

    // === Expressions (2100-2199) ===
    /// A type used where a value is expected.
    NotAnExpr = 2100,
    /// A multi-valued or void expression in single-value context.
    TooManyValues = 2101,
    /// Non-integer or negative index.
    InvalidIndex = 2102,
    /// Index applied to a non-indexable operand.
    NonIndexableOperand = 2103,
    /// Selector names no field or method.
    MissingFieldOrMethod = 2104,
    /// Type assertion on a non-interface.
    InvalidAssert = 2105,
    /// Type assertion that can never succeed.
    ImpossibleAssert = 2106,
    /// Receive from a non-channel or send-only channel.
    InvalidReceive = 2107,
    /// Address of a non-addressable operand.
    UnaddressableOperand = 2108,
    /// Indirection of a non-pointer.
    InvalidIndirection = 2109,
    /// Operator not defined for the operand type.
    UndefinedOp = 2110,
    /// `_` used as a value.
    InvalidBlank = 2111,
    /// Expression statement whose value is discarded.
    UnusedExpr = 2112,
    /// Selector matching several embedded fields or methods at one depth.
    AmbiguousSelector = 2113,
    /// Pointer method selected on a non-addressable value.
    InvalidMethodExpr = 2114,

    // === Declarations (2200-2299) ===
    /// Name not declared.
    UndeclaredName = 2200,
    /// Name declared twice in one block.
    DuplicateDecl = 2201,
    /// Non-name on the left side of `:=`.
    BadDecl = 2202,
    /// Name repeated on the left side of `:=`.
    RepeatedDecl = 2203,
    /// Non-type used as a type.
    NotAType = 2204,
    /// Constant declared with a non-constant type.
    InvalidConstType = 2205,
    /// Generic function used without instantiation.
    WrongTypeArgCount = 2206,

    // === Calls (2300-2399) ===
    /// Call of a non-function.
    InvalidCall = 2300,
    /// Argument count does not match the signature.
    WrongArgCount = 2301,
    /// `...` in a call to a non-variadic function.
    NonVariadicDotDotDot = 2302,
    /// `...` applied to a multi-valued argument.
    InvalidDotDotDot = 2303,

    // === Malformed trees (2400-2499) ===
    InvalidSyntaxTree = 2400,

    // === Statements (2500-2599) ===
    /// Function with results may fall off its end.
    MissingReturn = 2500,
    /// Result parameter shadowed at a naked return.
    OutOfScopeResult = 2501,

    // === Warnings (2900-2999) ===
    /// Short variable declaration introduces nothing.
    NoNewVar = 2900,
    /// Local variable never used.
    UnusedVar = 2901,
}

impl TypeError {
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Soft errors are reported as warnings.
    #[inline]
    pub fn is_warning(self) -> bool {
        self.code() >= 2900
    }

    /// The default message, used when no specific message is given.
    pub fn message(self) -> &'static str {
        match self {
            TypeError::IncompatibleAssign => "incompatible assignment",
            TypeError::UntypedNilUse => "use of untyped nil",
            TypeError::TruncatedFloat => "constant truncated",
            TypeError::NumericOverflow => "constant overflows",
            TypeError::InvalidConstInit => "value is not constant",
            TypeError::UnassignableOperand => "cannot assign to operand",
            TypeError::UnaddressableFieldAssign => "cannot assign to struct field in map",
            TypeError::WrongAssignCount => "assignment mismatch",
            TypeError::WrongResultCount => "wrong number of return values",
            TypeError::InvalidIfaceAssign => "value does not implement interface",
            TypeError::InvalidChanAssign => "invalid channel assignment",
            TypeError::InvalidUntypedConversion => "invalid untyped conversion",
            TypeError::InvalidConstVal => "invalid constant value",
            TypeError::InvalidConversion => "invalid conversion",

            TypeError::NotAnExpr => "not an expression",
            TypeError::TooManyValues => "multiple-value expression in single-value context",
            TypeError::InvalidIndex => "invalid index",
            TypeError::NonIndexableOperand => "cannot index expression",
            TypeError::MissingFieldOrMethod => "missing field or method",
            TypeError::InvalidAssert => "invalid type assertion",
            TypeError::ImpossibleAssert => "impossible type assertion",
            TypeError::InvalidReceive => "invalid receive",
            TypeError::UnaddressableOperand => "cannot take address",
            TypeError::InvalidIndirection => "invalid indirection",
            TypeError::UndefinedOp => "operator not defined",
            TypeError::InvalidBlank => "cannot use _ as value",
            TypeError::UnusedExpr => "expression is not used",
            TypeError::AmbiguousSelector => "ambiguous selector",
            TypeError::InvalidMethodExpr => "cannot call pointer method",

            TypeError::UndeclaredName => "undeclared name",
            TypeError::DuplicateDecl => "redeclared in this block",
            TypeError::BadDecl => "non-name on left side of :=",
            TypeError::RepeatedDecl => "name repeated on left side of :=",
            TypeError::NotAType => "not a type",
            TypeError::InvalidConstType => "invalid constant type",
            TypeError::WrongTypeArgCount => "generic function without instantiation",

            TypeError::InvalidCall => "cannot call non-function",
            TypeError::WrongArgCount => "wrong number of arguments",
            TypeError::NonVariadicDotDotDot => "cannot use ... in call to non-variadic function",
            TypeError::InvalidDotDotDot => "invalid use of ...",

            TypeError::InvalidSyntaxTree => "invalid syntax tree",

            TypeError::MissingReturn => "missing return",
            TypeError::OutOfScopeResult => "result parameter not in scope at return",

            TypeError::NoNewVar => "no new variables on left side of :=",
            TypeError::UnusedVar => "declared and not used",
        }
    }

    /// A located-less diagnostic with the default message.
    pub fn diagnostic(self) -> Diagnostic {
        self.with_message(self.message())
    }

    pub fn with_message(self, message: impl Into<String>) -> Diagnostic {
        if self.is_warning() {
            Diagnostic::warning(message).with_code(self.code())
        } else {
            Diagnostic::error(message).with_code(self.code())
        }
    }

    pub fn at(self, span: impl Into<Span>) -> Diagnostic {
        self.diagnostic().with_label(Label::primary(span))
    }

    pub fn at_with_message(self, span: impl Into<Span>, message: impl Into<String>) -> Diagnostic {
        self.with_message(message).with_label(Label::primary(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_ranges() {
        assert_eq!(TypeError::IncompatibleAssign.code(), 2000);
        assert_eq!(TypeError::InvalidConversion.code(), 2013);
        assert_eq!(TypeError::NotAnExpr.code(), 2100);
        assert_eq!(TypeError::UndeclaredName.code(), 2200);
        assert_eq!(TypeError::InvalidMethodExpr.code(), 2114);
        assert_eq!(TypeError::InvalidCall.code(), 2300);
        assert_eq!(TypeError::InvalidDotDotDot.code(), 2303);
        assert_eq!(TypeError::InvalidSyntaxTree.code(), 2400);
        assert_eq!(TypeError::MissingReturn.code(), 2500);
        assert_eq!(TypeError::NoNewVar.code(), 2900);
    }

    #[test]
    fn test_soft_errors_are_warnings() {
        let diag = TypeError::UnusedVar.at(0u32..5u32);
        assert!(diag.is_warning());
        let diag = TypeError::NoNewVar.with_message("no new variables on left side of :=");
        assert!(diag.is_warning());
        let diag = TypeError::WrongAssignCount.at_with_message(3u32..4u32, "assignment mismatch");
        assert!(diag.is_error());
        assert_eq!(diag.primary_span(), Some(Span::from_u32(3, 4)));
    }
}
