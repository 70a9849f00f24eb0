//! The type checker.
//!
//! `Checker` owns every entity created during a check together with the
//! diagnostics and the recorded type information. Statement and expression
//! checking live in sibling modules as further `impl Checker` blocks.

use std::cell::{Cell, RefCell};

use tracing::trace;

use golite_common::diagnostics::{Diagnostic, DiagnosticSink, Label};
use golite_common::span::{BytePos, Span};
use golite_common::symbol::{Ident, SymbolInterner};
use golite_syntax::ast::{Block, Expr, FuncSig, Stmt};
use golite_syntax::format::{format_expr, format_stmt};

use super::errors::TypeError;
use super::type_info::TypeInfo;
use crate::config::Config;
use crate::obj::ConstValue;
use crate::objects::{ObjKey, PackageKey, ScopeKey, TCObjects, TypeKey};
use crate::operand::Operand;
use crate::scope::{self, Scope};
use crate::typ;

/// Context within which the current function body is checked.
#[derive(Clone, Debug, Default)]
pub struct ObjContext {
    /// Innermost scope for lookups.
    pub scope: Option<ScopeKey>,
    /// Signature of the enclosing function; `None` outside function bodies.
    pub sig: Option<TypeKey>,
}

/// Work deferred until the end of the current statement, such as the body
/// of a function literal.
pub type DelayedAction = Box<dyn FnOnce(&mut Checker)>;

pub struct Checker {
    pub tc_objs: TCObjects,
    pub interner: SymbolInterner,
    /// Interior mutability so that `&self` helpers can report.
    pub diagnostics: RefCell<DiagnosticSink>,
    pub pkg: PackageKey,
    pub config: Config,
    pub octx: ObjContext,
    pub result: TypeInfo,
    trace_indent: Cell<usize>,
    delayed: Vec<DelayedAction>,
}

impl Checker {
    pub fn new(interner: SymbolInterner) -> Checker {
        Checker::with_config(interner, Config::default())
    }

    pub fn with_config(interner: SymbolInterner, config: Config) -> Checker {
        let mut tc_objs = TCObjects::new();
        let pkg = tc_objs.new_package("main".to_string(), "main".to_string());
        let scope = tc_objs.pkgs[pkg].scope();
        Checker {
            tc_objs,
            interner,
            diagnostics: RefCell::new(DiagnosticSink::new()),
            pkg,
            config,
            octx: ObjContext {
                scope: Some(scope),
                sig: None,
            },
            result: TypeInfo::new(),
            trace_indent: Cell::new(0),
            delayed: Vec::new(),
        }
    }

    /// The package block.
    pub fn pkg_scope(&self) -> ScopeKey {
        self.tc_objs.pkgs[self.pkg].scope()
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.result
    }

    pub(crate) fn resolve_ident(&self, ident: &Ident) -> &str {
        ident.as_str(&self.interner)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().emit(diagnostic);
    }

    pub(crate) fn error_code_msg(&self, code: TypeError, span: Span, msg: impl Into<String>) {
        self.emit(code.at_with_message(span, msg));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().error_count()
    }

    /// Drains the diagnostics reported so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().take()
    }

    // =========================================================================
    // Tracing
    // =========================================================================

    pub(crate) fn trace_print(&self, msg: &str) {
        let prefix = ".  ".repeat(self.trace_indent.get());
        trace!("{}{}", prefix, msg);
    }

    pub(crate) fn trace_expr(&self, expr: &Expr) {
        if self.config.trace {
            self.trace_print(&format!("expr[ {} ]", format_expr(expr, &self.interner)));
            self.trace_indent.set(self.trace_indent.get() + 1);
        }
    }

    pub(crate) fn trace_expr_end(&self, x: &Operand) {
        if self.config.trace {
            self.trace_indent.set(self.trace_indent.get().saturating_sub(1));
            self.trace_print(&format!("=> {}", self.op_str(x)));
        }
    }

    pub(crate) fn trace_stmt(&self, stmt: &Stmt) {
        if self.config.trace {
            self.trace_print(&format!("stmt[ {} ]", format_stmt(stmt, &self.interner)));
            self.trace_indent.set(self.trace_indent.get() + 1);
        }
    }

    pub(crate) fn trace_stmt_end(&self) {
        if self.config.trace {
            self.trace_indent.set(self.trace_indent.get().saturating_sub(1));
        }
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Looks a name up from the current scope outward.
    pub(crate) fn lookup(&self, name: &str) -> Option<ObjKey> {
        let scope_key = self.octx.scope?;
        scope::lookup_parent(scope_key, name, &self.tc_objs).map(|(_, okey)| okey)
    }

    /// Inserts `okey` into `scope`, visible from `scope_pos` on. A blank
    /// name introduces no binding. `ident`, if given, is recorded as the
    /// defining occurrence.
    pub(crate) fn declare(
        &mut self,
        scope: ScopeKey,
        ident: Option<&Ident>,
        okey: ObjKey,
        scope_pos: BytePos,
    ) {
        if !self.lobj(okey).is_blank() {
            if let Some(alt) = Scope::insert(scope, okey, &mut self.tc_objs) {
                let obj = self.lobj(okey);
                let alt_obj = self.lobj(alt);
                let mut diag = TypeError::DuplicateDecl
                    .at_with_message(obj.span(), format!("{} redeclared in this block", obj.name()));
                if !alt_obj.span().is_dummy() {
                    diag = diag.with_label(
                        Label::secondary(alt_obj.span())
                            .with_message(format!("other declaration of {}", alt_obj.name())),
                    );
                }
                self.emit(diag);
                return;
            }
            self.lobj_mut(okey).set_scope_pos(scope_pos);
        }
        if let Some(ident) = ident {
            self.result.record_def(ident, Some(okey));
        }
    }

    pub(crate) fn open_scope(&mut self, span: Span, comment: &str) {
        let scope = self
            .tc_objs
            .new_scope(self.octx.scope, span.start, span.end, comment, false);
        self.result.record_scope(span, scope);
        self.octx.scope = Some(scope);
    }

    pub(crate) fn close_scope(&mut self) {
        self.octx.scope = self
            .octx
            .scope
            .and_then(|s| self.tc_objs.scopes[s].parent());
    }

    // =========================================================================
    // Delayed actions
    // =========================================================================

    pub(crate) fn later(&mut self, action: DelayedAction) {
        self.delayed.push(action);
    }

    pub(crate) fn delayed_count(&self) -> usize {
        self.delayed.len()
    }

    /// Runs the actions queued from index `top` on, in order. Actions
    /// queued while processing run in the same pass.
    pub(crate) fn process_delayed(&mut self, top: usize) {
        let mut i = top;
        while i < self.delayed.len() {
            let action = std::mem::replace(&mut self.delayed[i], Box::new(|_: &mut Checker| {}));
            action(self);
            i += 1;
        }
        self.delayed.truncate(top);
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Checks a function body against `sig`. Named parameters and results
    /// of the signature are declared in a fresh function scope under the
    /// package block.
    pub fn check_func_body(&mut self, sig: TypeKey, body: &Block) {
        let scope = self.tc_objs.new_scope(
            Some(self.pkg_scope()),
            body.span.start,
            body.span.end,
            "function",
            true,
        );
        let vars: Vec<ObjKey> = match self.otype(sig).try_as_signature() {
            Some(detail) => detail
                .param_vars(&self.tc_objs)
                .iter()
                .chain(detail.result_vars(&self.tc_objs))
                .copied()
                .collect(),
            None => {
                self.error_code_msg(
                    TypeError::InvalidSyntaxTree,
                    body.span,
                    format!("invalid syntax tree: {} is not a signature", self.type_str(sig)),
                );
                return;
            }
        };
        for v in vars {
            if !self.lobj(v).name().is_empty() {
                self.declare(scope, None, v, body.span.start);
            }
        }
        self.func_body("<function>", sig, scope, body);
        self.process_delayed(0);
    }

    /// Resolves a function signature from syntax and checks `body` against
    /// it. Returns the signature type.
    pub fn check_func(&mut self, sig: &FuncSig, body: &Block) -> TypeKey {
        let (sig_type, scope) = self.with_scope(self.pkg_scope(), |c| c.func_type(sig));
        self.func_body("<function>", sig_type, scope, body);
        self.process_delayed(0);
        sig_type
    }

    /// Checks a block of statements in the current context.
    pub fn check_block(&mut self, block: &Block) {
        let top = self.delayed_count();
        self.open_scope(block.span, "block");
        self.stmt_list(&block.stmts);
        self.close_scope();
        self.process_delayed(top);
    }

    /// Declares a package-level variable; it counts as used.
    pub fn declare_pkg_var(&mut self, name: &str, typ: TypeKey) -> ObjKey {
        let okey = self
            .tc_objs
            .new_var(Span::dummy(), Some(self.pkg), name.to_string(), Some(typ));
        self.lobj_mut(okey).set_var_used(true);
        self.declare(self.pkg_scope(), None, okey, BytePos::default());
        okey
    }

    /// Declares a package-level constant.
    pub fn declare_pkg_const(&mut self, name: &str, typ: TypeKey, val: ConstValue) -> ObjKey {
        let okey = self
            .tc_objs
            .new_const(Span::dummy(), Some(self.pkg), name.to_string(), Some(typ), val);
        self.declare(self.pkg_scope(), None, okey, BytePos::default());
        okey
    }

    /// Declares a package-level type name, e.g. one made by
    /// `TCObjects::new_named_type`.
    pub fn declare_pkg_type(&mut self, okey: ObjKey) {
        self.declare(self.pkg_scope(), None, okey, BytePos::default());
    }

    /// Declares a package-level function.
    pub fn declare_pkg_func(&mut self, name: &str, sig: TypeKey) -> ObjKey {
        let okey = self
            .tc_objs
            .new_func(Span::dummy(), Some(self.pkg), name.to_string(), Some(sig));
        self.declare(self.pkg_scope(), None, okey, BytePos::default());
        okey
    }

    /// Runs `f` with `scope` as the current scope.
    pub(crate) fn with_scope<R>(&mut self, scope: ScopeKey, f: impl FnOnce(&mut Checker) -> R) -> R {
        let saved = self.octx.scope.replace(scope);
        let r = f(self);
        self.octx.scope = saved;
        r
    }

    pub(crate) fn is_untyped(&self, t: TypeKey) -> bool {
        typ::is_untyped(t, &self.tc_objs)
    }
}
