//! Statement checking.
//!
//! Walks function bodies statement by statement. Declarations bind their
//! names at the end of the declaring statement; function literals queued
//! while checking a statement are checked when that statement is done.

use golite_common::diagnostics::Label;
use golite_common::span::Span;
use golite_common::symbol::Ident;
use golite_syntax::ast::{Block, ConstSpec, Expr, ReturnStmt, Stmt, StmtKind, VarSpec};

use crate::obj::ConstValue;
use crate::objects::{ObjKey, ScopeKey, TypeKey};
use crate::operand::{Operand, OperandMode};
use crate::typ;

use super::checker::{Checker, ObjContext};
use super::errors::TypeError;
use super::expr::ExprClass;

impl Checker {
    /// Checks the body of a function with signature `sig`. `scope` is the
    /// function scope holding the parameters; the body's statements are
    /// checked directly in it.
    pub(crate) fn func_body(&mut self, name: &str, sig: TypeKey, scope: ScopeKey, body: &Block) {
        if self.config.trace {
            self.trace_print(&format!("--- {}: {}", name, self.type_str(sig)));
        }

        let saved = std::mem::replace(
            &mut self.octx,
            ObjContext {
                scope: Some(scope),
                sig: Some(sig),
            },
        );

        self.stmt_list(&body.stmts);

        let has_results = self
            .otype(sig)
            .try_as_signature()
            .map_or(false, |s| !typ::tuple_vars(s.results(), self.objs()).is_empty());
        if has_results && !self.is_terminating_list(&body.stmts) {
            let end = body.span.end.0;
            self.error_code_msg(
                TypeError::MissingReturn,
                Span::from_u32(end.saturating_sub(1), end),
                "missing return",
            );
        }

        if self.config.report_unused {
            self.usage(scope);
        }

        self.octx = saved;
    }

    /// Reports the unused variables of `scope` and its nested block scopes
    /// in source order. Function literal scopes are reported by their own
    /// body check.
    fn usage(&self, scope: ScopeKey) {
        let mut unused: Vec<ObjKey> = self.tc_objs.scopes[scope]
            .objects()
            .filter(|&o| {
                let obj = self.lobj(o);
                obj.entity_type().is_var() && !obj.var_used()
            })
            .collect();
        unused.sort_by_key(|&o| self.lobj(o).pos());
        for o in unused {
            let obj = self.lobj(o);
            self.error_code_msg(
                TypeError::UnusedVar,
                obj.span(),
                format!("declared and not used: {}", obj.name()),
            );
        }

        for &child in self.tc_objs.scopes[scope].children() {
            if !self.tc_objs.scopes[child].is_func() {
                self.usage(child);
            }
        }
    }

    pub(crate) fn stmt_list(&mut self, stmts: &[Stmt]) {
        for s in stmts {
            self.stmt(s);
        }
    }

    fn stmt(&mut self, s: &Stmt) {
        self.trace_stmt(s);
        // Function literals are checked before the scope changes.
        let top = self.delayed_count();

        match &s.kind {
            StmtKind::Empty => {}
            StmtKind::Block(block) => {
                self.open_scope(block.span, "block");
                self.stmt_list(&block.stmts);
                self.close_scope();
            }
            StmtKind::Var(decl) => {
                for spec in &decl.specs {
                    self.var_spec(spec);
                }
            }
            StmtKind::Const(decl) => {
                for spec in &decl.specs {
                    self.const_spec(spec);
                }
            }
            StmtKind::ShortVar(decl) => self.short_var_decl(s.span, &decl.lhs, &decl.rhs),
            StmtKind::Assign(assign) => self.assign_vars(&assign.lhs, &assign.rhs),
            StmtKind::Return(ret) => self.return_stmt(s.span, ret),
            StmtKind::Expr(e) => self.expr_stmt(e),
        }

        self.process_delayed(top);
        self.trace_stmt_end();
    }

    /// A call or receive may stand alone; other expressions are unused.
    fn expr_stmt(&mut self, e: &Expr) {
        let mut x = Operand::new();
        let class = self.raw_expr(&mut x, e);
        let (code, what) = match x.mode {
            OperandMode::Invalid => return,
            OperandMode::TypeExpr => (TypeError::NotAnExpr, "is not an expression"),
            _ if class == ExprClass::Statement => return,
            _ => (TypeError::UnusedExpr, "is not used"),
        };
        let msg = format!("{} {}", self.op_str(&x), what);
        self.error_code_msg(code, x.span(), msg);
    }

    fn return_stmt(&mut self, span: Span, ret: &ReturnStmt) {
        let Some(sig) = self.octx.sig else {
            self.error_code_msg(TypeError::InvalidSyntaxTree, span, "invalid syntax tree: return outside function");
            return;
        };
        let results: Vec<ObjKey> = self
            .otype(sig)
            .try_as_signature()
            .map(|s| typ::tuple_vars(s.results(), self.objs()).to_vec())
            .unwrap_or_default();

        let named = results.first().map_or(false, |&r| !self.lobj(r).name().is_empty());
        if ret.values.is_empty() && named {
            // A naked return needs every result parameter in scope.
            for &r in &results {
                let name = self.lobj(r).name().to_string();
                let Some(alt) = self.lookup(&name) else {
                    continue;
                };
                if alt == r {
                    continue;
                }
                let alt_span = self.lobj(alt).span();
                let mut diag = TypeError::OutOfScopeResult
                    .at_with_message(span, format!("result parameter {} not in scope at return", name));
                if alt_span.is_dummy() {
                    diag = diag.with_note(format!("inner declaration of {}", name));
                } else {
                    diag = diag.with_label(
                        Label::secondary(alt_span).with_message(format!("inner declaration of {}", name)),
                    );
                }
                self.emit(diag);
            }
        } else if !ret.values.is_empty() || !results.is_empty() {
            self.init_vars(&results, &ret.values, Some(span));
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `var a, b T = x, y`. The names are declared at the end of the spec.
    fn var_spec(&mut self, spec: &VarSpec) {
        let declared = spec.ty.as_ref().map(|t| self.typexpr(t));
        let vars: Vec<ObjKey> = spec
            .names
            .iter()
            .map(|name| {
                let n = self.resolve_ident(name).to_string();
                self.tc_objs.new_var(name.span, Some(self.pkg), n, declared)
            })
            .collect();

        match spec.values.len() {
            0 => {
                if declared.is_none() {
                    let invalid = self.invalid_type();
                    for &v in &vars {
                        self.lobj_mut(v).set_type(Some(invalid));
                    }
                }
            }
            1 if vars.len() > 1 => {
                // A single multi-valued initializer.
                self.init_vars(&vars, &spec.values, None);
            }
            n if n == vars.len() => {
                for (&v, e) in vars.iter().zip(&spec.values) {
                    let mut x = Operand::new();
                    self.expr(&mut x, e);
                    self.init_var(v, &mut x, "variable declaration");
                }
            }
            _ => {
                for (i, &v) in vars.iter().enumerate() {
                    match spec.values.get(i) {
                        Some(e) => {
                            let mut x = Operand::new();
                            self.expr(&mut x, e);
                            self.init_var(v, &mut x, "variable declaration");
                        }
                        None if declared.is_none() => {
                            let invalid = self.invalid_type();
                            self.lobj_mut(v).set_type(Some(invalid));
                        }
                        None => {}
                    }
                }
            }
        }

        // Without a type there must be values.
        if declared.is_none() || !spec.values.is_empty() {
            self.arity(&spec.names, &spec.values, false);
        }

        let scope = self.octx.scope.unwrap_or_else(|| self.pkg_scope());
        for (name, &v) in spec.names.iter().zip(&vars) {
            self.declare(scope, Some(name), v, spec.span.end);
        }
    }

    /// `const a, b T = x, y`. The names are declared at the end of the
    /// spec.
    fn const_spec(&mut self, spec: &ConstSpec) {
        let declared = match &spec.ty {
            None => None,
            Some(ty) => {
                let t = self.typexpr(ty);
                if typ::is_const_type(t, self.objs()) {
                    Some(Ok(t))
                } else {
                    if !typ::is_invalid(self.underlying(t), self.objs()) {
                        let msg = format!("invalid constant type {}", self.type_str(t));
                        self.error_code_msg(TypeError::InvalidConstType, ty.span, msg);
                    }
                    Some(Err(()))
                }
            }
        };

        let mut consts = Vec::with_capacity(spec.names.len());
        for (i, name) in spec.names.iter().enumerate() {
            let n = self.resolve_ident(name).to_string();
            let okey = self
                .tc_objs
                .new_const(name.span, Some(self.pkg), n, None, ConstValue::Unknown);
            consts.push(okey);
            match declared {
                Some(Err(())) => {
                    let invalid = self.invalid_type();
                    self.lobj_mut(okey).set_type(Some(invalid));
                    continue;
                }
                Some(Ok(t)) => self.lobj_mut(okey).set_type(Some(t)),
                None => {}
            }
            let mut x = Operand::new();
            if let Some(e) = spec.values.get(i) {
                self.expr(&mut x, e);
            }
            self.init_const(okey, &mut x);
        }

        self.arity(&spec.names, &spec.values, true);

        let scope = self.octx.scope.unwrap_or_else(|| self.pkg_scope());
        for (name, &c) in spec.names.iter().zip(&consts) {
            self.declare(scope, Some(name), c, spec.span.end);
        }
    }

    /// Reports a mismatch between declared names and initializers. A
    /// single initializer for several variables may be multi-valued and is
    /// checked by `init_vars` instead.
    fn arity(&self, names: &[Ident], inits: &[Expr], const_decl: bool) {
        let (l, r) = (names.len(), inits.len());
        if l < r {
            self.error_code_msg(TypeError::WrongAssignCount, inits[l].span, "extra init expr");
        } else if l > r && (const_decl || r != 1) {
            let name = &names[r];
            let msg = format!("missing init expr for {}", self.resolve_ident(name));
            self.error_code_msg(TypeError::WrongAssignCount, name.span, msg);
        }
    }

    // =========================================================================
    // Termination
    // =========================================================================

    /// Reports whether the statement list ends in a terminating statement.
    /// Trailing empty statements are ignored.
    fn is_terminating_list(&self, stmts: &[Stmt]) -> bool {
        stmts
            .iter()
            .rev()
            .find(|s| !matches!(s.kind, StmtKind::Empty))
            .map_or(false, |s| self.is_terminating(s))
    }

    fn is_terminating(&self, s: &Stmt) -> bool {
        match &s.kind {
            StmtKind::Return(_) => true,
            StmtKind::Block(block) => self.is_terminating_list(&block.stmts),
            _ => false,
        }
    }
}
