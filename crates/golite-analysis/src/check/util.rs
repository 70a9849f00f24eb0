//! Accessors, formatting helpers and the `use` family of evaluations shared
//! by the checker modules.

use golite_common::span::Span;
use golite_common::symbol::Ident;
use golite_syntax::ast::Expr;
use golite_syntax::format::format_expr;

use crate::obj::LangObj;
use crate::objects::{ObjKey, TCObjects, TypeKey};
use crate::operand::Operand;
use crate::typ::{self, BasicType, Type};
use crate::universe::Universe;

use super::checker::Checker;
use super::errors::TypeError;

impl Checker {
    // =========================================================================
    // Accessor methods
    // =========================================================================

    pub(crate) fn lobj(&self, key: ObjKey) -> &LangObj {
        &self.tc_objs.lobjs[key]
    }

    pub(crate) fn lobj_mut(&mut self, key: ObjKey) -> &mut LangObj {
        &mut self.tc_objs.lobjs[key]
    }

    pub(crate) fn otype(&self, key: TypeKey) -> &Type {
        &self.tc_objs.types[key]
    }

    pub(crate) fn universe(&self) -> &Universe {
        self.tc_objs.universe()
    }

    pub(crate) fn basic_type(&self, t: BasicType) -> TypeKey {
        self.universe().types()[&t]
    }

    pub(crate) fn invalid_type(&self) -> TypeKey {
        self.universe().invalid_type()
    }

    #[inline]
    pub(crate) fn objs(&self) -> &TCObjects {
        &self.tc_objs
    }

    /// A missing type counts as invalid.
    pub(crate) fn is_invalid_type(&self, t: Option<TypeKey>) -> bool {
        t.map_or(true, |t| t == self.invalid_type())
    }

    pub(crate) fn underlying(&self, t: TypeKey) -> TypeKey {
        typ::underlying_type(t, &self.tc_objs)
    }

    // =========================================================================
    // Formatting for diagnostics
    // =========================================================================

    pub(crate) fn op_str(&self, x: &Operand) -> String {
        x.display(&self.tc_objs, &self.interner)
    }

    pub(crate) fn type_str(&self, t: TypeKey) -> String {
        typ::type_string(t, &self.tc_objs)
    }

    pub(crate) fn type_str_o(&self, t: Option<TypeKey>) -> String {
        typ::type_string_o(t, &self.tc_objs)
    }

    pub(crate) fn expr_str(&self, e: &Expr) -> String {
        format_expr(e, &self.interner)
    }

    /// Reports an invalid operation error.
    pub(crate) fn invalid_op(&self, code: TypeError, span: Span, msg: impl AsRef<str>) {
        self.error_code_msg(code, span, format!("invalid operation: {}", msg.as_ref()));
    }

    /// Reports an invalid argument error.
    pub(crate) fn invalid_arg(&self, code: TypeError, span: Span, msg: impl AsRef<str>) {
        self.error_code_msg(code, span, format!("invalid argument: {}", msg.as_ref()));
    }

    // =========================================================================
    // use
    // =========================================================================

    /// Evaluates expressions for their side effects on the recorded type
    /// information and variable usage after an earlier error. A `_`,
    /// possibly parenthesized, is skipped.
    pub(crate) fn use_exprs(&mut self, exprs: &[Expr]) {
        for e in exprs {
            if self.is_blank_ident(e.unparen()) {
                continue;
            }
            let mut x = Operand::new();
            self.raw_expr(&mut x, e);
        }
    }

    /// The variable of this package that `ident` denotes, if any.
    pub(crate) fn local_var(&self, ident: &Ident) -> Option<ObjKey> {
        let okey = self.lookup(self.resolve_ident(ident))?;
        let obj = self.lobj(okey);
        (obj.entity_type().is_var() && obj.pkg() == Some(self.pkg)).then_some(okey)
    }

    pub(crate) fn is_blank_ident(&self, e: &Expr) -> bool {
        e.as_ident()
            .map_or(false, |ident| self.resolve_ident(ident) == "_")
    }

    /// Marks the local variables named among `exprs` as used without
    /// evaluating anything.
    pub(crate) fn mark_lhs_used(&mut self, exprs: &[Expr]) {
        for e in exprs {
            if let Some(okey) = e.unparen().as_ident().and_then(|ident| self.local_var(ident)) {
                self.lobj_mut(okey).set_var_used(true);
            }
        }
    }
}
