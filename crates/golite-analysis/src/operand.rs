//! Operands: the intermediate result of evaluating an expression.

use std::fmt::{self, Write};

use golite_common::span::Span;
use golite_common::symbol::SymbolInterner;
use golite_syntax::ast::Expr;
use golite_syntax::format::format_expr;

use crate::obj::ConstValue;
use crate::objects::{TCObjects, TypeKey};
use crate::typ::{self, BasicType, Type};

/// How an operand may be used.
#[derive(Clone, Debug, PartialEq)]
pub enum OperandMode {
    Invalid,
    /// The result of a call without results.
    NoValue,
    /// The operand denotes a type.
    TypeExpr,
    /// A constant; the type is a basic type.
    Constant(ConstValue),
    /// An addressable variable.
    Variable,
    /// A map index expression: assignable but not addressable.
    MapIndex,
    Value,
    /// The untyped `nil`.
    NilValue,
    /// A value that may also produce an untyped boolean `ok`.
    CommaOk,
    /// A value that may also produce an `error`. No expression form
    /// produces it; `expr_list` still expands it for host-provided operands.
    CommaErr,
}

impl OperandMode {
    pub fn constant_val(&self) -> Option<&ConstValue> {
        match self {
            OperandMode::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// Modes that denote a usable value.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            OperandMode::Constant(_)
                | OperandMode::Variable
                | OperandMode::MapIndex
                | OperandMode::Value
                | OperandMode::NilValue
                | OperandMode::CommaOk
                | OperandMode::CommaErr
        )
    }
}

impl fmt::Display for OperandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperandMode::Invalid => "invalid operand",
            OperandMode::NoValue => "no value",
            OperandMode::TypeExpr => "type",
            OperandMode::Constant(_) => "constant",
            OperandMode::Variable => "variable",
            OperandMode::MapIndex => "map index expression",
            OperandMode::Value => "value",
            OperandMode::NilValue => "nil",
            OperandMode::CommaOk => "comma, ok expression",
            OperandMode::CommaErr => "comma, error expression",
        })
    }
}

/// An operand borrows the expression that produced it.
#[derive(Clone, Debug)]
pub struct Operand<'a> {
    pub mode: OperandMode,
    pub expr: Option<&'a Expr>,
    pub typ: Option<TypeKey>,
}

impl<'a> Default for Operand<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Operand<'a> {
    pub fn new() -> Operand<'a> {
        Operand {
            mode: OperandMode::Invalid,
            expr: None,
            typ: None,
        }
    }

    pub fn with_expr(mode: OperandMode, expr: &'a Expr, typ: Option<TypeKey>) -> Operand<'a> {
        Operand {
            mode,
            expr: Some(expr),
            typ,
        }
    }

    pub fn invalid(&self) -> bool {
        self.mode == OperandMode::Invalid
    }

    pub fn set_invalid(&mut self) {
        self.mode = OperandMode::Invalid;
    }

    pub fn span(&self) -> Span {
        self.expr.map_or(Span::dummy(), |e| e.span)
    }

    /// The untyped `nil` value.
    pub fn is_nil(&self, objs: &TCObjects) -> bool {
        self.mode == OperandMode::NilValue
            && self.typ.map_or(false, |t| {
                objs.types[t]
                    .try_as_basic()
                    .map_or(false, |b| b.typ() == BasicType::UntypedNil)
            })
    }

    /// The source text of the operand's expression, or its value when it
    /// has none.
    pub fn expr_string(&self, interner: &SymbolInterner) -> String {
        match self.expr {
            Some(e) => format_expr(e, interner),
            None => match &self.mode {
                OperandMode::Constant(val) => val.to_string(),
                _ => String::new(),
            },
        }
    }

    /// Describes the operand for diagnostics, e.g.
    /// `x (variable of struct type Point)` or `1.5 (untyped float constant)`.
    pub fn display(&self, objs: &TCObjects, interner: &SymbolInterner) -> String {
        let mut buf = String::new();
        let _ = self.fmt_into(&mut buf, objs, interner);
        buf
    }

    fn fmt_into(&self, f: &mut String, objs: &TCObjects, interner: &SymbolInterner) -> fmt::Result {
        if self.mode == OperandMode::NilValue {
            let invalid = objs.universe().invalid_type();
            return match self.typ {
                None => f.write_str("nil (with invalid type)"),
                Some(t) if t == invalid => f.write_str("nil (with invalid type)"),
                Some(t) if typ::is_untyped(t, objs) => f.write_str("nil"),
                Some(t) => write!(f, "nil (of type {})", typ::type_string(t, objs)),
            };
        }

        // <expr> (
        let expr = match (self.expr, &self.mode) {
            (None, OperandMode::TypeExpr) => typ::type_string_o(self.typ, objs),
            _ => self.expr_string(interner),
        };
        if !expr.is_empty() {
            write!(f, "{} (", expr)?;
        }

        // <untyped kind>
        let mut has_type = false;
        match self.mode {
            OperandMode::Invalid | OperandMode::NoValue | OperandMode::TypeExpr => {}
            _ => {
                if let Some(t) = self.typ {
                    match &objs.types[t] {
                        Type::Basic(b) if b.typ().is_untyped() => {
                            write!(f, "{} ", b.name())?;
                        }
                        _ => has_type = true,
                    }
                }
            }
        }

        // <mode>
        write!(f, "{}", self.mode)?;

        // <val>
        if let OperandMode::Constant(val) = &self.mode {
            let s = val.to_string();
            if s != expr {
                write!(f, " {}", s)?;
            }
        }

        // <typ>
        if has_type {
            if let Some(t) = self.typ {
                if t == objs.universe().invalid_type() {
                    f.write_str(" with invalid type")?;
                } else {
                    f.write_str(" of ")?;
                    match &objs.types[t] {
                        Type::Named(_) => {
                            let kind = typ::composite_kind(t, objs);
                            if kind.is_empty() {
                                let u = typ::underlying_type(t, objs);
                                if let Some(b) = objs.types[u].try_as_basic() {
                                    write!(f, "{} ", b.name())?;
                                }
                            } else {
                                write!(f, "{} ", kind)?;
                            }
                        }
                        _ => {}
                    }
                    write!(f, "type {}", typ::type_string(t, objs))?;
                    if let Some(tp) = objs.types[t].try_as_type_param() {
                        write!(f, " constrained by {}", typ::type_string(tp.bound(), objs))?;
                    }
                }
            }
        }

        // )
        if !expr.is_empty() {
            f.write_char(')')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use golite_syntax::ast::{BasicLit, ExprId, ExprKind};
    use golite_common::symbol::Ident;

    fn ident(interner: &mut SymbolInterner, name: &str) -> Expr {
        Expr {
            id: ExprId(1),
            kind: ExprKind::Ident(Ident::new(interner.intern(name), Span::dummy())),
            span: Span::from_u32(1, 2),
        }
    }

    #[test]
    fn test_display_variable_of_named_struct() {
        let mut objs = TCObjects::new();
        let mut interner = SymbolInterner::new();
        let st = objs.new_t_struct(vec![]);
        let (_, point) = objs.new_named_type(Span::dummy(), "Point", st);
        let e = ident(&mut interner, "p");
        let x = Operand::with_expr(OperandMode::Variable, &e, Some(point));
        assert_eq!(x.display(&objs, &interner), "p (variable of struct type Point)");

        let int = objs.universe().types()[&BasicType::Int];
        let (_, celsius) = objs.new_named_type(Span::dummy(), "Celsius", int);
        let y = Operand::with_expr(OperandMode::Value, &e, Some(celsius));
        assert_eq!(y.display(&objs, &interner), "p (value of int type Celsius)");
    }

    #[test]
    fn test_display_constants() {
        let objs = TCObjects::new();
        let mut interner = SymbolInterner::new();
        let raw = interner.intern("1.5");
        let lit = Expr {
            id: ExprId(2),
            kind: ExprKind::FloatLit(BasicLit { raw }),
            span: Span::from_u32(3, 6),
        };
        let uf = objs.universe().types()[&BasicType::UntypedFloat];
        let x = Operand::with_expr(
            OperandMode::Constant(crate::constant::float_from_literal("1.5")),
            &lit,
            Some(uf),
        );
        assert_eq!(x.display(&objs, &interner), "1.5 (untyped float constant)");

        let c = ident(&mut interner, "c");
        let int = objs.universe().types()[&BasicType::Int];
        let y = Operand::with_expr(OperandMode::Constant(ConstValue::Int64(3)), &c, Some(int));
        assert_eq!(y.display(&objs, &interner), "c (constant 3 of type int)");
    }

    #[test]
    fn test_display_nil_and_invalid() {
        let objs = TCObjects::new();
        let mut interner = SymbolInterner::new();
        let e = ident(&mut interner, "nil");
        let untyped_nil = objs.universe().types()[&BasicType::UntypedNil];
        let x = Operand::with_expr(OperandMode::NilValue, &e, Some(untyped_nil));
        assert!(x.is_nil(&objs));
        assert_eq!(x.display(&objs, &interner), "nil");

        let v = ident(&mut interner, "v");
        let invalid = objs.universe().invalid_type();
        let y = Operand::with_expr(OperandMode::Value, &v, Some(invalid));
        assert_eq!(y.display(&objs, &interner), "v (value with invalid type)");
    }

    #[test]
    fn test_mode_strings() {
        assert_eq!(OperandMode::MapIndex.to_string(), "map index expression");
        assert_eq!(OperandMode::CommaErr.to_string(), "comma, error expression");
        assert!(!OperandMode::TypeExpr.is_value());
        assert!(OperandMode::NilValue.is_value());
    }
}
