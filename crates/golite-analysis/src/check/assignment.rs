//! Assignment checking.
//!
//! This module implements assignment compatibility checking, variable and
//! constant initialization, multi-value assignment with the comma-ok form,
//! and short variable declarations.

use std::collections::HashSet;

use tracing::debug;

use golite_common::span::Span;
use golite_syntax::ast::{Expr, ExprKind};

use crate::objects::{ObjKey, TypeKey};
use crate::operand::{Operand, OperandMode};
use crate::typ::{self, BasicType};

use super::checker::Checker;
use super::errors::TypeError;

impl Checker {
    /// Checks that `x` can be assigned to a variable of type `t`, converting
    /// an untyped `x` to the appropriate type first. `t == None` denotes
    /// assignment to the blank identifier. `x.mode` is set to invalid if the
    /// assignment failed.
    pub(crate) fn assignment(&mut self, x: &mut Operand, t: Option<TypeKey>, context: &str) {
        self.single_value(x);

        match x.mode {
            OperandMode::Invalid => return,
            OperandMode::Constant(_)
            | OperandMode::Variable
            | OperandMode::MapIndex
            | OperandMode::Value
            | OperandMode::NilValue
            | OperandMode::CommaOk
            | OperandMode::CommaErr => {}
            OperandMode::NoValue | OperandMode::TypeExpr => {
                // Only reachable after other problems.
                let msg = format!(
                    "cannot assign {} to {} in {}",
                    self.op_str(x),
                    self.type_str_o(t),
                    context
                );
                self.error_code_msg(TypeError::IncompatibleAssign, x.span(), msg);
                return;
            }
        }

        if let Some(xt) = x.typ.filter(|&xt| self.is_untyped(xt)) {
            // An untyped constant assigned to an interface or to `_` takes
            // its default type.
            let is_nil = x.is_nil(self.objs());
            let target = match t {
                None if is_nil => {
                    let msg = format!("use of untyped nil in {}", context);
                    self.error_code_msg(TypeError::UntypedNilUse, x.span(), msg);
                    x.set_invalid();
                    return;
                }
                Some(t) if is_nil || !typ::is_non_type_param_interface(t, self.objs()) => t,
                _ => typ::untyped_default_type(xt, self.objs()),
            };
            match self.implicit_type_and_value(x, target) {
                Ok((new_type, val)) => {
                    debug!(
                        from = %self.type_str(xt),
                        to = %self.type_str_o(new_type),
                        "untyped conversion"
                    );
                    self.apply_implicit(x, new_type, val);
                }
                Err(code) => {
                    let mut msg = format!(
                        "cannot use {} as {} value in {}",
                        self.op_str(x),
                        self.type_str(target),
                        context
                    );
                    let code = match code {
                        TypeError::TruncatedFloat => {
                            msg.push_str(" (truncated)");
                            code
                        }
                        TypeError::NumericOverflow => {
                            msg.push_str(" (overflows)");
                            code
                        }
                        _ => TypeError::IncompatibleAssign,
                    };
                    self.error_code_msg(code, x.span(), msg);
                    x.set_invalid();
                    return;
                }
            }
        }
        // x.typ is typed

        // A generic function value cannot be assigned without instantiation.
        // This is reported without invalidating x.
        if let Some(xt) = x.typ {
            let generic = self
                .otype(self.underlying(xt))
                .try_as_signature()
                .map_or(false, |sig| !sig.type_params().is_empty());
            if generic {
                let msg = format!(
                    "cannot use generic function {} without instantiation in {}",
                    self.op_str(x),
                    context
                );
                self.error_code_msg(TypeError::WrongTypeArgCount, x.span(), msg);
            }
        }

        // Any typed value, or non-constant value other than nil, may be
        // assigned to the blank identifier.
        let Some(t) = t else {
            return;
        };

        let mut cause = String::new();
        let (ok, code) = self.assignable_to(x, t, &mut cause);
        if !ok {
            let msg = if cause.is_empty() {
                format!("cannot use {} as {} value in {}", self.op_str(x), self.type_str(t), context)
            } else {
                format!(
                    "cannot use {} as {} value in {}: {}",
                    self.op_str(x),
                    self.type_str(t),
                    context,
                    cause
                )
            };
            self.error_code_msg(code, x.span(), msg);
            x.set_invalid();
        }
    }

    /// Initializes the constant `lhs` with `x`. A constant without a
    /// declared type takes the type of `x`, untyped or not.
    pub(crate) fn init_const(&mut self, lhs: ObjKey, x: &mut Operand) {
        let invalid = self.invalid_type();
        let lhs_type = self.lobj(lhs).typ();
        if x.invalid() || x.typ == Some(invalid) || lhs_type == Some(invalid) {
            if lhs_type.is_none() {
                self.lobj_mut(lhs).set_type(Some(invalid));
            }
            return;
        }

        if !matches!(x.mode, OperandMode::Constant(_)) {
            let msg = format!("{} is not constant", self.op_str(x));
            self.error_code_msg(TypeError::InvalidConstInit, x.span(), msg);
            if lhs_type.is_none() {
                self.lobj_mut(lhs).set_type(Some(invalid));
            }
            return;
        }

        let t = match lhs_type {
            Some(t) => t,
            None => {
                self.lobj_mut(lhs).set_type(x.typ);
                x.typ.unwrap_or(invalid)
            }
        };

        self.assignment(x, Some(t), "constant declaration");
        if let OperandMode::Constant(val) = &x.mode {
            self.lobj_mut(lhs).set_const_val(val.clone());
        }
    }

    /// Initializes the variable `lhs` with `x` and returns the type of `x`,
    /// or `None` on failure. A variable without a declared type takes the
    /// default type of `x`. On failure the variable is marked used to
    /// avoid a follow-on "declared and not used" error.
    pub(crate) fn init_var(&mut self, lhs: ObjKey, x: &mut Operand, context: &str) -> Option<TypeKey> {
        let invalid = self.invalid_type();
        let lhs_type = self.lobj(lhs).typ();
        if x.invalid() || x.typ == Some(invalid) || lhs_type == Some(invalid) {
            let obj = self.lobj_mut(lhs);
            if lhs_type.is_none() {
                obj.set_type(Some(invalid));
            }
            obj.set_var_used(true);
            return None;
        }

        let t = match lhs_type {
            Some(t) => t,
            None => {
                let mut t = x.typ.unwrap_or(invalid);
                if self.is_untyped(t) {
                    if t == self.basic_type(BasicType::UntypedNil) {
                        let msg = format!("use of untyped nil in {}", context);
                        self.error_code_msg(TypeError::UntypedNilUse, x.span(), msg);
                        self.lobj_mut(lhs).set_type(Some(invalid));
                        return None;
                    }
                    t = typ::untyped_default_type(t, self.objs());
                }
                self.lobj_mut(lhs).set_type(Some(t));
                t
            }
        };

        self.assignment(x, Some(t), context);
        if x.invalid() {
            self.lobj_mut(lhs).set_var_used(true);
            return None;
        }
        x.typ
    }

    /// Checks the left-hand side of an assignment and returns its type:
    /// `None` for the blank identifier and the invalid type for an invalid
    /// target. Naming a variable here does not count as a use of it.
    pub(crate) fn lhs_var(&mut self, lhs: &Expr) -> Option<TypeKey> {
        let invalid = self.invalid_type();
        let ident = lhs.unparen().as_ident();

        if let Some(ident) = ident {
            if self.resolve_ident(ident) == "_" {
                self.result.record_def(ident, None);
                return None;
            }
        }

        // Evaluate without marking the variable used.
        let saved = ident
            .and_then(|ident| self.local_var(ident))
            .map(|okey| (okey, self.lobj(okey).var_used()));

        let mut x = Operand::new();
        self.expr(&mut x, lhs);

        if let Some((okey, used)) = saved {
            self.lobj_mut(okey).set_var_used(used);
        }

        if x.invalid() || x.typ == Some(invalid) {
            return Some(invalid);
        }

        // Each left-hand side must be addressable or a map index expression.
        match x.mode {
            OperandMode::Variable | OperandMode::MapIndex => x.typ,
            _ => {
                if let ExprKind::Selector(sel) = &lhs.kind {
                    let mut base = Operand::new();
                    self.expr(&mut base, &sel.expr);
                    if base.mode == OperandMode::MapIndex {
                        let msg = format!("cannot assign to struct field {} in map", self.expr_str(lhs));
                        self.error_code_msg(TypeError::UnaddressableFieldAssign, x.span(), msg);
                        return Some(invalid);
                    }
                }
                let msg = format!("cannot assign to {}", self.op_str(&x));
                self.error_code_msg(TypeError::UnassignableOperand, x.span(), msg);
                Some(invalid)
            }
        }
    }

    /// Checks the assignment `lhs = x` and returns the type of `x`, or
    /// `None` if the assignment is invalid.
    pub(crate) fn assign_var(&mut self, lhs: &Expr, x: &mut Operand) -> Option<TypeKey> {
        let invalid = self.invalid_type();
        if x.invalid() || x.typ == Some(invalid) {
            self.use_exprs(std::slice::from_ref(lhs));
            return None;
        }

        let t = self.lhs_var(lhs);
        if t == Some(invalid) {
            return None;
        }

        let context = if t.is_none() {
            "assignment to _ identifier"
        } else {
            "assignment"
        };
        self.assignment(x, t, context);
        if x.invalid() {
            return None;
        }
        x.typ
    }

    /// Reports a mismatch between `nvars` variables and `nvals` values.
    /// Without any right-hand expression the tree is malformed and the
    /// error goes to `lhs_span`.
    fn assign_error(&self, lhs_span: Span, rhs: &[Expr], nvars: usize, nvals: usize) {
        let Some(rhs0) = rhs.first() else {
            self.error_code_msg(
                TypeError::InvalidSyntaxTree,
                lhs_span,
                "invalid syntax tree: missing right-hand side",
            );
            return;
        };
        let vars = typ::measure(nvars, "variable");
        let vals = typ::measure(nvals, "value");

        let msg = match &rhs0.unparen().kind {
            ExprKind::Call(call) if rhs.len() == 1 => format!(
                "assignment mismatch: {} but {} returns {}",
                vars,
                self.expr_str(&call.func),
                vals
            ),
            _ => format!("assignment mismatch: {} but {}", vars, vals),
        };
        self.error_code_msg(TypeError::WrongAssignCount, rhs0.span, msg);
    }

    /// Reports a mismatch between the result variables `lhs` and the
    /// returned values `rhs`. The error is placed at the first extra value,
    /// at the last value, or at the return statement if there are none.
    fn return_error(&self, return_span: Span, lhs: &[ObjKey], rhs: &[Operand]) {
        let (qualifier, at) = if rhs.len() > lhs.len() {
            ("too many", rhs[lhs.len()].span())
        } else if let Some(last) = rhs.last() {
            ("not enough", last.span())
        } else {
            ("not enough", return_span)
        };
        let have: Vec<Option<TypeKey>> = rhs.iter().map(|x| x.typ).collect();
        let want: Vec<Option<TypeKey>> = lhs.iter().map(|&v| self.lobj(v).typ()).collect();
        let diag = TypeError::WrongResultCount
            .at_with_message(at, format!("{} return values", qualifier))
            .with_note(format!("have {}", typ::types_summary(&have, false, self.objs())))
            .with_note(format!("want {}", typ::types_summary(&want, false, self.objs())));
        self.emit(diag);
    }

    /// Initializes the variables `lhs` with the values of `orig_rhs`.
    /// `return_stmt` is the span of the return statement when checking the
    /// returned values against the result variables.
    pub(crate) fn init_vars(&mut self, lhs: &[ObjKey], orig_rhs: &[Expr], return_stmt: Option<Span>) {
        let (mut rhs, comma_ok) = self.expr_list(orig_rhs, lhs.len() == 2 && return_stmt.is_none());

        if lhs.len() != rhs.len() {
            let invalid = self.invalid_type();
            for &v in lhs {
                let obj = self.lobj_mut(v);
                obj.set_var_used(true);
                if obj.typ().is_none() {
                    obj.set_type(Some(invalid));
                }
            }
            // An invalid value has been reported already.
            if rhs.iter().any(|x| x.invalid()) {
                return;
            }
            match return_stmt {
                Some(span) => self.return_error(span, lhs, &rhs),
                None => {
                    let lhs_span = lhs.first().map_or(Span::dummy(), |&v| self.lobj(v).span());
                    self.assign_error(lhs_span, orig_rhs, lhs.len(), rhs.len());
                }
            }
            return;
        }

        let context = if return_stmt.is_some() {
            "return statement"
        } else {
            "assignment"
        };

        if comma_ok {
            let mut a = [None; 2];
            for (i, x) in rhs.iter_mut().enumerate() {
                a[i] = self.init_var(lhs[i], x, context);
            }
            debug!(value = ?a[0], ok = ?a[1], "comma-ok initialization");
            self.record_comma_ok_types(&orig_rhs[0], a);
            return;
        }

        let mut ok = true;
        for (&v, x) in lhs.iter().zip(rhs.iter_mut()) {
            if self.init_var(v, x, context).is_none() {
                ok = false;
            }
        }

        // Avoid follow-on "declared and not used" errors.
        if !ok {
            for &v in lhs {
                self.lobj_mut(v).set_var_used(true);
            }
        }
    }

    /// Checks the assignment `lhs = orig_rhs`.
    pub(crate) fn assign_vars(&mut self, lhs: &[Expr], orig_rhs: &[Expr]) {
        let (mut rhs, comma_ok) = self.expr_list(orig_rhs, lhs.len() == 2);

        if lhs.len() != rhs.len() {
            self.use_exprs(lhs);
            if rhs.iter().any(|x| x.invalid()) {
                return;
            }
            let lhs_span = match (lhs.first(), lhs.last()) {
                (Some(first), Some(last)) => first.span.to(last.span),
                _ => Span::dummy(),
            };
            self.assign_error(lhs_span, orig_rhs, lhs.len(), rhs.len());
            return;
        }

        if comma_ok {
            let mut a = [None; 2];
            for (i, x) in rhs.iter_mut().enumerate() {
                a[i] = self.assign_var(&lhs[i], x);
            }
            debug!(value = ?a[0], ok = ?a[1], "comma-ok assignment");
            self.record_comma_ok_types(&orig_rhs[0], a);
            return;
        }

        let mut ok = true;
        for (l, x) in lhs.iter().zip(rhs.iter_mut()) {
            if self.assign_var(l, x).is_none() {
                ok = false;
            }
        }

        // Avoid follow-on "declared and not used" errors without evaluating
        // the left-hand sides again.
        if !ok {
            self.mark_lhs_used(lhs);
        }
    }

    /// Checks the short variable declaration `lhs := rhs` at `span`.
    ///
    /// Names already declared in the current scope are assigned to; the
    /// others declare new variables. New variables become visible after the
    /// last right-hand expression, so the right-hand side never sees them.
    pub(crate) fn short_var_decl(&mut self, span: Span, lhs: &[Expr], rhs: &[Expr]) {
        let top = self.delayed_count();
        let Some(scope) = self.octx.scope else {
            self.error_code_msg(TypeError::InvalidSyntaxTree, span, "invalid syntax tree: no scope for :=");
            return;
        };

        let mut seen: HashSet<String> = HashSet::with_capacity(lhs.len());
        let mut lhs_vars: Vec<Option<ObjKey>> = vec![None; lhs.len()];
        let mut new_vars: Vec<ObjKey> = Vec::with_capacity(lhs.len());
        let mut has_err = false;

        for (i, e) in lhs.iter().enumerate() {
            let Some(ident) = e.as_ident() else {
                self.use_exprs(std::slice::from_ref(e));
                let msg = format!("non-name {} on left side of :=", self.expr_str(e));
                self.error_code_msg(TypeError::BadDecl, e.span, msg);
                has_err = true;
                continue;
            };

            let name = self.resolve_ident(ident).to_string();
            if name != "_" && !seen.insert(name.clone()) {
                let msg = format!("{} repeated on left side of :=", name);
                self.error_code_msg(TypeError::RepeatedDecl, e.span, msg);
                has_err = true;
                continue;
            }

            // A redeclared name must denote a variable of this scope. New
            // variables are inserted into the scope only at the end.
            if let Some(alt) = self.tc_objs.scopes[scope].lookup(&name) {
                self.result.record_use(ident, alt);
                if self.lobj(alt).entity_type().is_var() {
                    lhs_vars[i] = Some(alt);
                } else {
                    let msg = format!("cannot assign to {}", self.expr_str(e));
                    self.error_code_msg(TypeError::UnassignableOperand, e.span, msg);
                    has_err = true;
                }
                continue;
            }

            let okey = self
                .tc_objs
                .new_var(ident.span, Some(self.pkg), name.clone(), None);
            lhs_vars[i] = Some(okey);
            if name != "_" {
                new_vars.push(okey);
            }
            self.result.record_def(ident, Some(okey));
        }

        // Placeholders keep the targets aligned with the values.
        let pkg = self.pkg;
        let lhs_vars: Vec<ObjKey> = lhs_vars
            .into_iter()
            .zip(lhs)
            .map(|(v, e)| {
                v.unwrap_or_else(|| self.tc_objs.new_var(e.span, Some(pkg), "_".to_string(), None))
            })
            .collect();

        self.init_vars(&lhs_vars, rhs, None);

        // Function literals on the right-hand side are checked before the
        // new variables become visible.
        self.process_delayed(top);

        if new_vars.is_empty() && !has_err {
            self.error_code_msg(TypeError::NoNewVar, span, "no new variables on left side of :=");
            return;
        }

        let scope_pos = rhs.last().map_or(span.end, |e| e.span.end);
        debug!(new = new_vars.len(), total = lhs.len(), "short variable declaration");
        for v in new_vars {
            self.declare(scope, None, v, scope_pos);
        }
    }
}
