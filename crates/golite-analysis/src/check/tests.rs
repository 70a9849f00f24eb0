//! Tests for the checker, run on trees built directly.

use std::rc::Rc;

use golite_common::diagnostics::Diagnostic;
use golite_common::span::Span;
use golite_common::symbol::{Ident, SymbolInterner};
use golite_syntax::ast::*;

use super::*;
use crate::config::Config;
use crate::obj::ConstValue;
use crate::objects::{ObjKey, TypeKey};
use crate::operand::Operand;
use crate::typ::{BasicType, ChanDir};

// =============================================================================
// Tree building
// =============================================================================

/// Builds syntax trees with unique expression ids and increasing,
/// non-overlapping spans.
struct TreeBuilder {
    interner: SymbolInterner,
    next_id: u32,
    pos: u32,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            interner: SymbolInterner::new(),
            next_id: 0,
            pos: 1,
        }
    }

    fn finish(self) -> SymbolInterner {
        self.interner
    }

    fn span(&mut self) -> Span {
        let span = Span::from_u32(self.pos, self.pos + 1);
        self.pos += 2;
        span
    }

    fn span_from(&mut self, start: Span) -> Span {
        let end = self.span();
        start.to(end)
    }

    fn expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        Expr { id, kind, span }
    }

    fn ident(&mut self, name: &str) -> Ident {
        let symbol = self.interner.intern(name);
        Ident::new(symbol, self.span())
    }

    /// An expression naming an identifier made by `ident`.
    fn use_ident(&mut self, ident: Ident) -> Expr {
        self.expr(ExprKind::Ident(ident), ident.span)
    }

    fn name(&mut self, name: &str) -> Expr {
        let ident = self.ident(name);
        self.use_ident(ident)
    }

    fn lit(&mut self, raw: &str) -> BasicLit {
        BasicLit {
            raw: self.interner.intern(raw),
        }
    }

    fn int(&mut self, raw: &str) -> Expr {
        let lit = self.lit(raw);
        let span = self.span();
        self.expr(ExprKind::IntLit(lit), span)
    }

    fn float(&mut self, raw: &str) -> Expr {
        let lit = self.lit(raw);
        let span = self.span();
        self.expr(ExprKind::FloatLit(lit), span)
    }

    /// A string literal; `raw` excludes the quotes.
    fn string(&mut self, raw: &str) -> Expr {
        let lit = self.lit(&format!("\"{}\"", raw));
        let span = self.span();
        self.expr(ExprKind::StringLit(lit), span)
    }

    fn paren(&mut self, inner: Expr) -> Expr {
        let span = self.span_from(inner.span);
        self.expr(ExprKind::Paren(Box::new(inner)), span)
    }

    fn call(&mut self, func: Expr, args: Vec<Expr>) -> Expr {
        let span = self.span_from(func.span);
        self.expr(
            ExprKind::Call(Box::new(CallExpr {
                func,
                args,
                spread: false,
            })),
            span,
        )
    }

    fn index(&mut self, base: Expr, index: Expr) -> Expr {
        let span = self.span_from(base.span);
        self.expr(ExprKind::Index(Box::new(IndexExpr { expr: base, index })), span)
    }

    fn select(&mut self, base: Expr, name: &str) -> Expr {
        let sel = self.ident(name);
        let span = base.span.to(sel.span);
        self.expr(ExprKind::Selector(Box::new(SelectorExpr { expr: base, sel })), span)
    }

    fn assert(&mut self, base: Expr, ty: TypeExpr) -> Expr {
        let span = self.span_from(base.span);
        self.expr(
            ExprKind::TypeAssert(Box::new(TypeAssertExpr { expr: base, ty })),
            span,
        )
    }

    fn recv(&mut self, ch: Expr) -> Expr {
        let start = self.span();
        let span = start.to(ch.span);
        self.expr(ExprKind::Receive(Box::new(ch)), span)
    }

    fn func_lit(&mut self, sig: FuncSig, body: Block) -> Expr {
        let span = sig.span.to(body.span);
        self.expr(ExprKind::FuncLit(Rc::new(FuncLit { sig, body })), span)
    }

    fn ty(&mut self, name: &str) -> TypeExpr {
        let ident = self.ident(name);
        TypeExpr {
            kind: TypeExprKind::Ident(ident),
            span: ident.span,
        }
    }

    fn slice_ty(&mut self, elem: &str) -> TypeExpr {
        let elem = self.ty(elem);
        let span = self.span_from(elem.span);
        TypeExpr {
            kind: TypeExprKind::Slice(Box::new(elem)),
            span,
        }
    }

    fn param(&mut self, name: Option<&str>, ty: &str) -> Param {
        let name = name.map(|n| self.ident(n));
        let ty = self.ty(ty);
        let span = name.map_or(ty.span, |n| n.span.to(ty.span));
        Param { name, ty, span }
    }

    fn sig(&mut self, params: Vec<Param>, results: Vec<Param>) -> FuncSig {
        let start = self.span();
        let span = self.span_from(start);
        FuncSig {
            params,
            results,
            variadic: false,
            span,
        }
    }

    fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let span = self.span();
        Stmt { kind, span }
    }

    fn short_var(&mut self, lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        let start = lhs.first().map_or(Span::dummy(), |e| e.span);
        let span = self.span_from(start);
        Stmt {
            kind: StmtKind::ShortVar(ShortVarDecl { lhs, rhs }),
            span,
        }
    }

    fn assign(&mut self, lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        let start = lhs.first().map_or(Span::dummy(), |e| e.span);
        let span = self.span_from(start);
        Stmt {
            kind: StmtKind::Assign(AssignStmt { lhs, rhs }),
            span,
        }
    }

    fn var_decl(&mut self, names: Vec<Ident>, ty: Option<TypeExpr>, values: Vec<Expr>) -> Stmt {
        let start = names.first().map_or(Span::dummy(), |n| n.span);
        let span = self.span_from(start);
        let spec = VarSpec {
            names,
            ty,
            values,
            span,
        };
        Stmt {
            kind: StmtKind::Var(VarDecl { specs: vec![spec] }),
            span,
        }
    }

    fn const_decl(&mut self, names: Vec<Ident>, ty: Option<TypeExpr>, values: Vec<Expr>) -> Stmt {
        let start = names.first().map_or(Span::dummy(), |n| n.span);
        let span = self.span_from(start);
        let spec = ConstSpec {
            names,
            ty,
            values,
            span,
        };
        Stmt {
            kind: StmtKind::Const(ConstDecl { specs: vec![spec] }),
            span,
        }
    }

    fn ret(&mut self, values: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(ReturnStmt { values }))
    }

    fn expr_stmt(&mut self, e: Expr) -> Stmt {
        let span = e.span;
        Stmt {
            kind: StmtKind::Expr(e),
            span,
        }
    }

    fn body(&mut self, stmts: Vec<Stmt>) -> Block {
        let start = stmts.first().map_or_else(|| self.span(), |s| s.span);
        let span = self.span_from(start);
        Block { stmts, span }
    }

    fn block(&mut self, stmts: Vec<Stmt>) -> Stmt {
        let block = self.body(stmts);
        Stmt {
            span: block.span,
            kind: StmtKind::Block(block),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn checker(b: TreeBuilder) -> Checker {
    Checker::with_config(b.finish(), Config::default().with_report_unused(false))
}

fn checker_reporting_unused(b: TreeBuilder) -> Checker {
    Checker::with_config(b.finish(), Config::default())
}

/// Checks `body` as the body of `func()`.
fn check_body(c: &mut Checker, b_sig: FuncSig, body: &Block) -> Vec<Diagnostic> {
    c.check_func(&b_sig, body);
    c.take_diagnostics()
}

fn codes(diags: &[Diagnostic]) -> Vec<u16> {
    diags.iter().filter_map(|d| d.code).collect()
}

fn messages(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.message.as_str()).collect()
}

fn obj_of(c: &Checker, ident: &Ident) -> ObjKey {
    c.result
        .object_of(ident)
        .unwrap_or_else(|| panic!("no object recorded for identifier at {:?}", ident.span))
}

fn type_of_obj(c: &Checker, ident: &Ident) -> Option<TypeKey> {
    c.lobj(obj_of(c, ident)).typ()
}

fn tuple_types(c: &Checker, t: TypeKey) -> Vec<Option<TypeKey>> {
    let tuple = c.otype(t).try_as_tuple().expect("tuple type");
    tuple.vars().iter().map(|&v| c.lobj(v).typ()).collect()
}

// =============================================================================
// Untyped conversion
// =============================================================================

#[test]
fn test_untyped_int_defaults_to_int() {
    let mut b = TreeBuilder::new();
    let x = b.ident("x");
    let lhs = b.use_ident(x);
    let one = b.int("1");
    let one_id = one.id;
    let stmt = b.short_var(vec![lhs], vec![one]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    let int = c.basic_type(BasicType::Int);
    assert_eq!(type_of_obj(&c, &x), Some(int));
    assert_eq!(c.result.type_of(one_id), Some(int));
}

#[test]
fn test_untyped_constant_to_interface_takes_default_type() {
    let mut b = TreeBuilder::new();
    let i = b.ident("i");
    let any = b.ty("any");
    let one = b.int("1");
    let one_id = one.id;
    let stmt = b.var_decl(vec![i], Some(any), vec![one]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    let int = c.basic_type(BasicType::Int);
    assert_eq!(c.result.type_of(one_id), Some(int));
    assert_eq!(type_of_obj(&c, &i), Some(c.universe().any_type()));
}

#[test]
fn test_constant_overflow() {
    let mut b = TreeBuilder::new();
    let v = b.ident("v");
    let int8 = b.ty("int8");
    let value = b.int("300");
    let value_span = value.span;
    let stmt = b.var_decl(vec![v], Some(int8), vec![value]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::NumericOverflow.code()]);
    assert_eq!(
        diags[0].message,
        "cannot use 300 (untyped int constant) as int8 value in variable declaration (overflows)"
    );
    assert_eq!(diags[0].primary_span(), Some(value_span));
}

#[test]
fn test_constant_truncated() {
    let mut b = TreeBuilder::new();
    let v = b.ident("v");
    let int = b.ty("int");
    let value = b.float("1.5");
    let stmt = b.var_decl(vec![v], Some(int), vec![value]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::TruncatedFloat.code()]);
    assert!(diags[0].message.ends_with("(truncated)"), "{}", diags[0].message);
}

#[test]
fn test_untyped_constant_of_wrong_kind() {
    let mut b = TreeBuilder::new();
    let s = b.ident("s");
    let string = b.ty("string");
    let one = b.int("1");
    let stmt = b.var_decl(vec![s], Some(string), vec![one]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::IncompatibleAssign.code()]);
    assert_eq!(
        diags[0].message,
        "cannot use 1 (untyped int constant) as string value in variable declaration"
    );
}

// =============================================================================
// Blank identifier and nil
// =============================================================================

#[test]
fn test_blank_accepts_any_value() {
    let mut b = TreeBuilder::new();
    let blank1 = b.name("_");
    let s = b.name("s");
    let a1 = b.assign(vec![blank1], vec![s]);
    let blank2 = b.name("_");
    let blank3 = b.name("_");
    let one = b.int("1");
    let text = b.string("a");
    let a2 = b.assign(vec![blank2, blank3], vec![one, text]);
    let body = b.body(vec![a1, a2]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let string = c.basic_type(BasicType::Str);
    c.declare_pkg_var("s", string);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));
}

#[test]
fn test_nil_to_blank() {
    let mut b = TreeBuilder::new();
    let blank = b.name("_");
    let nil = b.name("nil");
    let stmt = b.assign(vec![blank], vec![nil]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UntypedNilUse.code()]);
    assert_eq!(diags[0].message, "use of untyped nil in assignment to _ identifier");
}

#[test]
fn test_nil_initializer_without_type() {
    let mut b = TreeBuilder::new();
    let x = b.ident("x");
    let lhs = b.use_ident(x);
    let nil = b.name("nil");
    let stmt = b.short_var(vec![lhs], vec![nil]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UntypedNilUse.code()]);
    assert_eq!(diags[0].message, "use of untyped nil in assignment");
    assert_eq!(type_of_obj(&c, &x), Some(c.invalid_type()));
}

// =============================================================================
// Arity
// =============================================================================

#[test]
fn test_assignment_mismatch_marks_targets_used() {
    let mut b = TreeBuilder::new();
    let a = b.ident("a");
    let bb = b.ident("b");
    let lhs = vec![b.use_ident(a), b.use_ident(bb)];
    let rhs = vec![b.int("1"), b.int("2"), b.int("3")];
    let first_span = rhs[0].span;
    let stmt = b.short_var(lhs, rhs);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker_reporting_unused(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::WrongAssignCount.code()]);
    assert_eq!(diags[0].message, "assignment mismatch: 2 variables but 3 values");
    assert_eq!(diags[0].primary_span(), Some(first_span));
    for ident in [&a, &bb] {
        assert!(c.lobj(obj_of(&c, ident)).var_used());
        assert_eq!(type_of_obj(&c, ident), Some(c.invalid_type()));
    }
}

#[test]
fn test_assignment_mismatch_names_call() {
    let mut b = TreeBuilder::new();
    let lhs = vec![b.name("a"), b.name("b")];
    let f = b.name("f");
    let call = b.call(f, vec![]);
    let stmt = b.short_var(lhs, vec![call]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let f_sig = c.tc_objs.new_t_signature_of(&[], &[int, int, int], false);
    c.declare_pkg_func("f", f_sig);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["assignment mismatch: 2 variables but f returns 3 values"]);
}

#[test]
fn test_assignment_mismatch_single_value() {
    let mut b = TreeBuilder::new();
    let lhs = vec![b.name("x"), b.name("y")];
    let one = b.int("1");
    let stmt = b.assign(lhs, vec![one]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    c.declare_pkg_var("x", int);
    c.declare_pkg_var("y", int);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["assignment mismatch: 2 variables but 1 value"]);
}

#[test]
fn test_mismatch_after_invalid_operand_is_not_reported() {
    let mut b = TreeBuilder::new();
    let lhs = vec![b.name("a"), b.name("b")];
    let nope = b.name("nope");
    let stmt = b.short_var(lhs, vec![nope]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker_reporting_unused(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UndeclaredName.code()]);
    assert_eq!(diags[0].message, "undefined: nope");
}

// =============================================================================
// Comma-ok
// =============================================================================

#[test]
fn test_comma_ok_map_index() {
    let mut b = TreeBuilder::new();
    let v = b.ident("v");
    let ok = b.ident("ok");
    let lhs = vec![b.use_ident(v), b.use_ident(ok)];
    let m = b.name("m");
    let key = b.string("k");
    let index = b.index(m, key);
    let index_id = index.id;
    let stmt = b.short_var(lhs, vec![index]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let string = c.basic_type(BasicType::Str);
    let bool_t = c.basic_type(BasicType::Bool);
    let map = c.tc_objs.new_t_map(string, int);
    c.declare_pkg_var("m", map);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    assert_eq!(type_of_obj(&c, &v), Some(int));
    assert_eq!(type_of_obj(&c, &ok), Some(bool_t));
    let pair = c.result.type_of(index_id).expect("recorded index type");
    assert_eq!(tuple_types(&c, pair), vec![Some(int), Some(bool_t)]);
}

#[test]
fn test_comma_ok_type_assertion_in_assignment() {
    let mut b = TreeBuilder::new();
    let n_decl = b.ident("n");
    let int_ty = b.ty("int");
    let decl_n = b.var_decl(vec![n_decl], Some(int_ty), vec![]);
    let ok_decl = b.ident("ok");
    let bool_ty = b.ty("bool");
    let decl_ok = b.var_decl(vec![ok_decl], Some(bool_ty), vec![]);

    let lhs = vec![b.name("n"), b.name("ok")];
    let e = b.name("e");
    let int_ty = b.ty("int");
    let paren_assert = {
        let inner = b.assert(e, int_ty);
        b.paren(inner)
    };
    let paren_id = paren_assert.id;
    let stmt = b.assign(lhs, vec![paren_assert]);
    let body = b.body(vec![decl_n, decl_ok, stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let any = c.universe().any_type();
    c.declare_pkg_var("e", any);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    let int = c.basic_type(BasicType::Int);
    let bool_t = c.basic_type(BasicType::Bool);
    let pair = c.result.type_of(paren_id).expect("recorded assertion type");
    assert_eq!(tuple_types(&c, pair), vec![Some(int), Some(bool_t)]);
}

#[test]
fn test_comma_ok_receive() {
    let mut b = TreeBuilder::new();
    let v = b.ident("v");
    let ok = b.ident("ok");
    let lhs = vec![b.use_ident(v), b.use_ident(ok)];
    let ch = b.name("ch");
    let recv = b.recv(ch);
    let recv_id = recv.id;
    let stmt = b.short_var(lhs, vec![recv]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let string = c.basic_type(BasicType::Str);
    let bool_t = c.basic_type(BasicType::Bool);
    let chan = c.tc_objs.new_t_chan(ChanDir::SendRecv, string);
    c.declare_pkg_var("ch", chan);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    assert_eq!(type_of_obj(&c, &v), Some(string));
    assert_eq!(type_of_obj(&c, &ok), Some(bool_t));
    let pair = c.result.type_of(recv_id).expect("recorded receive type");
    assert_eq!(tuple_types(&c, pair), vec![Some(string), Some(bool_t)]);
}

#[test]
fn test_receive_from_send_only_channel() {
    let mut b = TreeBuilder::new();
    let lhs = vec![b.name("v")];
    let ch = b.name("ch");
    let recv = b.recv(ch);
    let stmt = b.short_var(lhs, vec![recv]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker_reporting_unused(b);
    let int = c.basic_type(BasicType::Int);
    let chan = c.tc_objs.new_t_chan(ChanDir::SendOnly, int);
    c.declare_pkg_var("ch", chan);
    let diags = check_body(&mut c, sig, &body);
    // The failed initialization marks v used.
    assert_eq!(codes(&diags), vec![TypeError::InvalidReceive.code()]);
}

// =============================================================================
// Short variable declarations
// =============================================================================

#[test]
fn test_no_new_variables() {
    let mut b = TreeBuilder::new();
    let first = {
        let x = b.name("x");
        let one = b.int("1");
        b.short_var(vec![x], vec![one])
    };
    let second = {
        let x = b.name("x");
        let two = b.int("2");
        b.short_var(vec![x], vec![two])
    };
    let second_span = second.span;
    let body = b.body(vec![first, second]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::NoNewVar.code()]);
    assert!(diags[0].is_warning());
    assert_eq!(diags[0].message, "no new variables on left side of :=");
    assert_eq!(diags[0].primary_span(), Some(second_span));
}

#[test]
fn test_redeclaration_reuses_variable() {
    let mut b = TreeBuilder::new();
    let x1 = b.ident("x");
    let y = b.ident("y");
    let first = {
        let lhs = vec![b.use_ident(x1), b.use_ident(y)];
        let rhs = vec![b.int("1"), b.int("2")];
        b.short_var(lhs, rhs)
    };
    let x2 = b.ident("x");
    let z = b.ident("z");
    let second = {
        let lhs = vec![b.use_ident(x2), b.use_ident(z)];
        let rhs = vec![b.int("3"), b.int("4")];
        b.short_var(lhs, rhs)
    };
    let body = b.body(vec![first, second]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    assert_eq!(obj_of(&c, &x1), obj_of(&c, &x2));
    assert!(c.result.uses.contains_key(&x2.span));
    assert_ne!(obj_of(&c, &y), obj_of(&c, &z));
}

#[test]
fn test_right_side_sees_outer_binding() {
    let mut b = TreeBuilder::new();
    let outer = b.ident("x");
    let outer_decl = {
        let lhs = b.use_ident(outer);
        let s = b.string("s");
        b.short_var(vec![lhs], vec![s])
    };
    let inner = b.ident("x");
    let rhs_x = b.ident("x");
    let inner_decl = {
        let lhs = b.use_ident(inner);
        let rhs = b.use_ident(rhs_x);
        b.short_var(vec![lhs], vec![rhs])
    };
    let block = b.block(vec![inner_decl]);
    let body = b.body(vec![outer_decl, block]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));

    let outer_obj = obj_of(&c, &outer);
    assert_eq!(obj_of(&c, &rhs_x), outer_obj);
    assert_ne!(obj_of(&c, &inner), outer_obj);
    assert_eq!(type_of_obj(&c, &inner), Some(c.basic_type(BasicType::Str)));
}

#[test]
fn test_non_name_on_left_side() {
    let mut b = TreeBuilder::new();
    let m = b.name("m");
    let key = b.string("k");
    let index = b.index(m, key);
    let y = b.ident("y");
    let lhs = vec![index, b.use_ident(y)];
    let rhs = vec![b.int("1"), b.int("2")];
    let stmt = b.short_var(lhs, rhs);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let string = c.basic_type(BasicType::Str);
    let map = c.tc_objs.new_t_map(string, int);
    c.declare_pkg_var("m", map);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::BadDecl.code()]);
    assert_eq!(diags[0].message, "non-name m[\"k\"] on left side of :=");
    // The remaining name is still declared.
    assert_eq!(type_of_obj(&c, &y), Some(int));
}

#[test]
fn test_repeated_name_on_left_side() {
    let mut b = TreeBuilder::new();
    let lhs = vec![b.name("a"), b.name("a")];
    let second_span = lhs[1].span;
    let rhs = vec![b.int("1"), b.int("2")];
    let stmt = b.short_var(lhs, rhs);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::RepeatedDecl.code()]);
    assert_eq!(diags[0].message, "a repeated on left side of :=");
    assert_eq!(diags[0].primary_span(), Some(second_span));
}

#[test]
fn test_short_decl_over_constant() {
    let mut b = TreeBuilder::new();
    let k = b.ident("k");
    let one = b.int("1");
    let decl = b.const_decl(vec![k], None, vec![one]);
    let lhs = vec![b.name("k"), b.name("d")];
    let rhs = vec![b.int("2"), b.int("3")];
    let stmt = b.short_var(lhs, rhs);
    let body = b.body(vec![decl, stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UnassignableOperand.code()]);
    assert_eq!(diags[0].message, "cannot assign to k");
}

#[test]
fn test_func_lit_body_checked_before_new_variable_is_visible() {
    let mut b = TreeBuilder::new();
    let inner = {
        let blank = b.name("_");
        let x = b.name("x");
        b.assign(vec![blank], vec![x])
    };
    let lit_body = b.body(vec![inner]);
    let lit_sig = b.sig(vec![], vec![]);
    let lit = b.func_lit(lit_sig, lit_body);
    let x = b.name("x");
    let stmt = b.short_var(vec![x], vec![lit]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UndeclaredName.code()]);
    assert_eq!(diags[0].message, "undefined: x");
}

// =============================================================================
// Assignment targets
// =============================================================================

#[test]
fn test_assign_to_constant_operand() {
    let mut b = TreeBuilder::new();
    let one = b.int("1");
    let two = b.int("2");
    let stmt = b.assign(vec![one], vec![two]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UnassignableOperand.code()]);
    assert_eq!(diags[0].message, "cannot assign to 1 (untyped int constant)");
}

#[test]
fn test_assign_to_struct_field_in_map() {
    let mut b = TreeBuilder::new();
    let pts = b.name("pts");
    let key = b.string("a");
    let index = b.index(pts, key);
    let field = b.select(index, "f");
    let one = b.int("1");
    let stmt = b.assign(vec![field], vec![one]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let string = c.basic_type(BasicType::Str);
    let f = c.tc_objs.new_field(Span::dummy(), None, "f".to_string(), Some(int), false);
    let st = c.tc_objs.new_t_struct(vec![f]);
    let (point_obj, point) = c.tc_objs.new_named_type(Span::dummy(), "Point", st);
    c.declare_pkg_type(point_obj);
    let map = c.tc_objs.new_t_map(string, point);
    c.declare_pkg_var("pts", map);

    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UnaddressableFieldAssign.code()]);
    assert_eq!(diags[0].message, "cannot assign to struct field pts[\"a\"].f in map");
}

#[test]
fn test_assignment_is_not_a_use() {
    let mut b = TreeBuilder::new();
    let x = b.ident("x");
    let decl_x = {
        let lhs = b.use_ident(x);
        let one = b.int("1");
        b.short_var(vec![lhs], vec![one])
    };
    let assign_x = {
        let lhs = b.name("x");
        let two = b.int("2");
        b.assign(vec![lhs], vec![two])
    };
    let decl_y = {
        let lhs = b.name("y");
        let three = b.int("3");
        b.short_var(vec![lhs], vec![three])
    };
    let use_y = {
        let blank = b.name("_");
        let y = b.name("y");
        b.assign(vec![blank], vec![y])
    };
    let body = b.body(vec![decl_x, assign_x, decl_y, use_y]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker_reporting_unused(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UnusedVar.code()]);
    assert!(diags[0].is_warning());
    assert_eq!(diags[0].message, "declared and not used: x");
    assert_eq!(diags[0].primary_span(), Some(x.span));
}

#[test]
fn test_array_elements_are_addressable() {
    let mut b = TreeBuilder::new();
    let x = b.ident("x");
    let read = {
        let lhs = b.use_ident(x);
        let a = b.name("a");
        let one = b.int("1");
        let elem = b.index(a, one);
        b.short_var(vec![lhs], vec![elem])
    };
    let write = {
        let a = b.name("a");
        let zero = b.int("0");
        let elem = b.index(a, zero);
        let value = b.name("x");
        b.assign(vec![elem], vec![value])
    };
    let body = b.body(vec![read, write]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker_reporting_unused(b);
    let int = c.basic_type(BasicType::Int);
    let grid = c.tc_objs.new_t_array(int, 3);
    c.declare_pkg_var("a", grid);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));
    assert_eq!(type_of_obj(&c, &x), Some(int));
}

#[test]
fn test_assignment_without_values() {
    let mut b = TreeBuilder::new();
    let x = b.name("x");
    let y = b.name("y");
    let lhs_span = x.span.to(y.span);
    let stmt = b.assign(vec![x, y], vec![]);
    let block = b.body(vec![stmt]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    c.declare_pkg_var("x", int);
    c.declare_pkg_var("y", int);
    c.check_block(&block);
    let diags = c.take_diagnostics();
    assert_eq!(codes(&diags), vec![TypeError::InvalidSyntaxTree.code()]);
    assert_eq!(diags[0].message, "invalid syntax tree: missing right-hand side");
    assert_eq!(diags[0].primary_span(), Some(lhs_span));
}

#[test]
fn test_invalid_operand_is_reported_once() {
    let mut b = TreeBuilder::new();
    let value = b.int("300");

    let mut c = checker(b);
    let int8 = c.basic_type(BasicType::Int8);
    let mut x = Operand::new();
    c.expr(&mut x, &value);
    c.assignment(&mut x, Some(int8), "assignment");
    assert_eq!(codes(&c.take_diagnostics()), vec![TypeError::NumericOverflow.code()]);
    assert!(x.invalid());

    // Neither a second assignment nor an initialization reports again.
    c.assignment(&mut x, Some(int8), "assignment");
    let pkg = c.pkg;
    let v = c.tc_objs.new_var(Span::dummy(), Some(pkg), "v".to_string(), None);
    assert_eq!(c.init_var(v, &mut x, "assignment"), None);
    assert!(c.take_diagnostics().is_empty());
    assert!(c.lobj(v).var_used());
    assert_eq!(c.lobj(v).typ(), Some(c.invalid_type()));
}

// =============================================================================
// Generic functions
// =============================================================================

#[test]
fn test_generic_function_value_is_reported() {
    let mut b = TreeBuilder::new();
    let blank = b.name("_");
    let g = b.name("g");
    let stmt = b.assign(vec![blank], vec![g]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let bound = c.tc_objs.new_t_empty_interface();
    let (_, tparam) = c.tc_objs.new_type_param(Span::dummy(), "T", 0, bound);
    let params = c.tc_objs.new_t_tuple_of(&[tparam]);
    let results = c.tc_objs.new_t_tuple_of(&[]);
    let g_sig = c.tc_objs.new_t_signature(params, results, false, vec![tparam]);
    c.declare_pkg_func("g", g_sig);

    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::WrongTypeArgCount.code()]);
    assert!(
        diags[0].message.starts_with("cannot use generic function g"),
        "{}",
        diags[0].message
    );
    assert!(diags[0].message.ends_with("without instantiation in assignment to _ identifier"));
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn test_var_decl_single_value_for_two_names() {
    let mut b = TreeBuilder::new();
    let names = vec![b.ident("a"), b.ident("b")];
    let int = b.ty("int");
    let one = b.int("1");
    let stmt = b.var_decl(names, Some(int), vec![one]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["assignment mismatch: 2 variables but 1 value"]);
}

#[test]
fn test_var_decl_extra_init_expr() {
    let mut b = TreeBuilder::new();
    let names = vec![b.ident("a"), b.ident("b")];
    let values = vec![b.int("1"), b.int("2"), b.int("3")];
    let extra_span = values[2].span;
    let stmt = b.var_decl(names, None, values);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::WrongAssignCount.code()]);
    assert_eq!(diags[0].message, "extra init expr");
    assert_eq!(diags[0].primary_span(), Some(extra_span));
}

#[test]
fn test_var_decl_missing_init_expr() {
    let mut b = TreeBuilder::new();
    let names = vec![b.ident("a"), b.ident("b"), b.ident("c")];
    let c_span = names[2].span;
    let int = b.ty("int");
    let values = vec![b.int("1"), b.int("2")];
    let stmt = b.var_decl(names, Some(int), values);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["missing init expr for c"]);
    assert_eq!(diags[0].primary_span(), Some(c_span));
}

#[test]
fn test_const_decl_overflow() {
    let mut b = TreeBuilder::new();
    let k = b.ident("k");
    let int8 = b.ty("int8");
    let value = b.int("1000");
    let stmt = b.const_decl(vec![k], Some(int8), vec![value]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::NumericOverflow.code()]);
    assert_eq!(
        diags[0].message,
        "cannot use 1000 (untyped int constant) as int8 value in constant declaration (overflows)"
    );
}

#[test]
fn test_const_decl_requires_constant() {
    let mut b = TreeBuilder::new();
    let k = b.ident("k");
    let s = b.name("s");
    let stmt = b.const_decl(vec![k], None, vec![s]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let string = c.basic_type(BasicType::Str);
    c.declare_pkg_var("s", string);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::InvalidConstInit.code()]);
    assert_eq!(diags[0].message, "s (variable of type string) is not constant");
    assert_eq!(type_of_obj(&c, &k), Some(c.invalid_type()));
}

#[test]
fn test_untyped_constant_keeps_untyped_type() {
    let mut b = TreeBuilder::new();
    let k = b.ident("k");
    let two = b.int("2");
    let decl_k = b.const_decl(vec![k], None, vec![two]);
    let v = b.ident("v");
    let int8 = b.ty("int8");
    let use_k = b.name("k");
    let decl_v = b.var_decl(vec![v], Some(int8), vec![use_k]);
    let body = b.body(vec![decl_k, decl_v]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));
    assert_eq!(type_of_obj(&c, &k), Some(c.basic_type(BasicType::UntypedInt)));
    assert_eq!(type_of_obj(&c, &v), Some(c.basic_type(BasicType::Int8)));
}

#[test]
fn test_invalid_constant_type() {
    let mut b = TreeBuilder::new();
    let k = b.ident("k");
    let ints = b.slice_ty("int");
    let ints_span = ints.span;
    let nil = b.name("nil");
    let stmt = b.const_decl(vec![k], Some(ints), vec![nil]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::InvalidConstType.code()]);
    assert_eq!(diags[0].message, "invalid constant type []int");
    assert_eq!(diags[0].primary_span(), Some(ints_span));
}

// =============================================================================
// Returns
// =============================================================================

#[test]
fn test_not_enough_return_values() {
    let mut b = TreeBuilder::new();
    let one = b.int("1");
    let one_span = one.span;
    let ret = b.ret(vec![one]);
    let body = b.body(vec![ret]);
    let results = vec![b.param(None, "int"), b.param(None, "string")];
    let sig = b.sig(vec![], results);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::WrongResultCount.code()]);
    assert_eq!(diags[0].message, "not enough return values");
    assert_eq!(diags[0].notes, vec!["have (number)", "want (int, string)"]);
    assert_eq!(diags[0].primary_span(), Some(one_span));
}

#[test]
fn test_too_many_return_values() {
    let mut b = TreeBuilder::new();
    let values = vec![b.int("1"), b.string("a"), b.int("2")];
    let extra_span = values[2].span;
    let ret = b.ret(values);
    let body = b.body(vec![ret]);
    let results = vec![b.param(None, "int"), b.param(None, "string")];
    let sig = b.sig(vec![], results);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["too many return values"]);
    assert_eq!(diags[0].notes, vec!["have (number, string, number)", "want (int, string)"]);
    assert_eq!(diags[0].primary_span(), Some(extra_span));
}

#[test]
fn test_empty_return_with_unnamed_results() {
    let mut b = TreeBuilder::new();
    let ret = b.ret(vec![]);
    let ret_span = ret.span;
    let body = b.body(vec![ret]);
    let results = vec![b.param(None, "int")];
    let sig = b.sig(vec![], results);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["not enough return values"]);
    assert_eq!(diags[0].notes, vec!["have ()", "want (int)"]);
    assert_eq!(diags[0].primary_span(), Some(ret_span));
}

#[test]
fn test_missing_return() {
    let mut b = TreeBuilder::new();
    let stmt = {
        let blank = b.name("_");
        let one = b.int("1");
        b.assign(vec![blank], vec![one])
    };
    let body = b.body(vec![stmt]);
    let end = body.span.end.0;
    let results = vec![b.param(None, "int")];
    let sig = b.sig(vec![], results);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::MissingReturn.code()]);
    assert_eq!(diags[0].primary_span(), Some(Span::from_u32(end - 1, end)));
}

#[test]
fn test_naked_return_with_shadowed_result() {
    let mut b = TreeBuilder::new();
    let inner_r = b.ident("r");
    let decl = {
        let lhs = b.use_ident(inner_r);
        let two = b.int("2");
        b.short_var(vec![lhs], vec![two])
    };
    let ret = b.ret(vec![]);
    let ret_span = ret.span;
    let block = b.block(vec![decl, ret]);
    let body = b.body(vec![block]);
    let results = vec![b.param(Some("r"), "int")];
    let sig = b.sig(vec![], results);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::OutOfScopeResult.code()]);
    assert_eq!(diags[0].message, "result parameter r not in scope at return");
    assert_eq!(diags[0].primary_span(), Some(ret_span));
    let inner = &diags[0].labels[1];
    assert_eq!(inner.span, inner_r.span);
    assert_eq!(inner.message.as_deref(), Some("inner declaration of r"));
}

#[test]
fn test_named_results_assigned_and_returned() {
    let mut b = TreeBuilder::new();
    let assign = {
        let lhs = b.name("r");
        let one = b.int("1");
        b.assign(vec![lhs], vec![one])
    };
    let ret = b.ret(vec![]);
    let body = b.body(vec![assign, ret]);
    let results = vec![b.param(Some("r"), "int")];
    let sig = b.sig(vec![], results);

    let mut c = checker_reporting_unused(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));
}

// =============================================================================
// Calls and conversions
// =============================================================================

#[test]
fn test_too_many_arguments() {
    let mut b = TreeBuilder::new();
    let f = b.name("f");
    let args = vec![b.int("1"), b.int("2")];
    let extra_span = args[1].span;
    let call = b.call(f, args);
    let stmt = b.expr_stmt(call);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let f_sig = c.tc_objs.new_t_signature_of(&[int], &[], false);
    c.declare_pkg_func("f", f_sig);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::WrongArgCount.code()]);
    assert_eq!(diags[0].message, "too many arguments in call to f");
    assert_eq!(diags[0].notes, vec!["have (number, number)", "want (int)"]);
    assert_eq!(diags[0].primary_span(), Some(extra_span));
}

#[test]
fn test_variadic_arguments() {
    let mut b = TreeBuilder::new();
    let ok_call = {
        let f = b.name("f");
        let args = vec![b.int("1"), b.int("2"), b.int("3")];
        let call = b.call(f, args);
        b.expr_stmt(call)
    };
    let bad_call = {
        let f = b.name("f");
        let args = vec![b.int("1"), b.string("a")];
        let call = b.call(f, args);
        b.expr_stmt(call)
    };
    let body = b.body(vec![ok_call, bad_call]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let ints = c.tc_objs.new_t_slice(int);
    let f_sig = c.tc_objs.new_t_signature_of(&[ints], &[], true);
    c.declare_pkg_func("f", f_sig);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(
        messages(&diags),
        vec!["cannot use \"a\" (untyped string constant) as int value in argument to f"]
    );
}

#[test]
fn test_conversion_overflow() {
    let mut b = TreeBuilder::new();
    let x = b.ident("x");
    let lhs = b.use_ident(x);
    let int8 = b.name("int8");
    let value = b.int("1000");
    let conv = b.call(int8, vec![value]);
    let stmt = b.short_var(vec![lhs], vec![conv]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker_reporting_unused(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(messages(&diags), vec!["constant 1000 overflows int8"]);
    assert_eq!(type_of_obj(&c, &x), Some(c.invalid_type()));
}

#[test]
fn test_conversion_fixes_type() {
    let mut b = TreeBuilder::new();
    let y = b.ident("y");
    let lhs = b.use_ident(y);
    let float64 = b.name("float64");
    let one = b.int("1");
    let conv = b.call(float64, vec![one]);
    let stmt = b.short_var(vec![lhs], vec![conv]);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));
    assert_eq!(type_of_obj(&c, &y), Some(c.basic_type(BasicType::Float64)));
}

#[test]
fn test_unused_expression_statement() {
    let mut b = TreeBuilder::new();
    let one = b.int("1");
    let stmt = b.expr_stmt(one);
    let body = b.body(vec![stmt]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::UnusedExpr.code()]);
    assert_eq!(diags[0].message, "1 (untyped int constant) is not used");
}

// =============================================================================
// Interfaces
// =============================================================================

#[test]
fn test_interface_assignment() {
    let mut b = TreeBuilder::new();
    let good = {
        let name = b.ident("a");
        let ty = b.ty("Stringer");
        let value = b.name("named");
        b.var_decl(vec![name], Some(ty), vec![value])
    };
    let bad = {
        let name = b.ident("b");
        let ty = b.ty("Stringer");
        let value = b.name("plain");
        b.var_decl(vec![name], Some(ty), vec![value])
    };
    let body = b.body(vec![good, bad]);
    let sig = b.sig(vec![], vec![]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let string = c.basic_type(BasicType::Str);
    let string_sig = c.tc_objs.new_t_signature_of(&[], &[string], false);
    let method = c
        .tc_objs
        .new_func(Span::dummy(), None, "String".to_string(), Some(string_sig));
    let iface = c.tc_objs.new_t_interface(vec![method], None);
    let (stringer_obj, _) = c.tc_objs.new_named_type(Span::dummy(), "Stringer", iface);
    c.declare_pkg_type(stringer_obj);

    let (_, with_method) = c.tc_objs.new_named_type(Span::dummy(), "Name", int);
    c.tc_objs.add_method(with_method, "String", string_sig, false);
    let (_, without_method) = c.tc_objs.new_named_type(Span::dummy(), "Plain", int);
    c.declare_pkg_var("named", with_method);
    c.declare_pkg_var("plain", without_method);

    let diags = check_body(&mut c, sig, &body);
    assert_eq!(codes(&diags), vec![TypeError::InvalidIfaceAssign.code()]);
    assert!(
        diags[0]
            .message
            .ends_with("Plain does not implement Stringer (missing method String)"),
        "{}",
        diags[0].message
    );
}

// =============================================================================
// Entry points
// =============================================================================

#[test]
fn test_check_func_body_with_prebuilt_signature() {
    let mut b = TreeBuilder::new();
    let values = vec![b.name("limit"), b.string("ok")];
    let ret = b.ret(values);
    let body = b.body(vec![ret]);

    let mut c = checker(b);
    let int = c.basic_type(BasicType::Int);
    let string = c.basic_type(BasicType::Str);
    let sig = c.tc_objs.new_t_signature_of(&[], &[int, string], false);
    let untyped_int = c.basic_type(BasicType::UntypedInt);
    c.declare_pkg_const("limit", untyped_int, ConstValue::Int64(10));
    c.check_func_body(sig, &body);
    assert!(!c.has_errors());
    assert_eq!(c.error_count(), 0);
}

#[test]
fn test_check_block_reports_into_sink() {
    let mut b = TreeBuilder::new();
    let stmt = {
        let blank = b.name("_");
        let nil = b.name("nil");
        b.assign(vec![blank], vec![nil])
    };
    let block = b.body(vec![stmt]);

    let mut c = checker(b);
    c.check_block(&block);
    assert!(c.has_errors());
    assert_eq!(c.error_count(), 1);
    assert!(c.type_info().scopes.contains_key(&block.span));
}

// =============================================================================
// Tracing
// =============================================================================

#[test]
fn test_tracing_does_not_change_results() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();

    let mut b = TreeBuilder::new();
    let lhs = vec![b.name("a"), b.name("b")];
    let rhs = vec![b.int("1"), b.string("s")];
    let stmt = b.short_var(lhs, rhs);
    let inner = b.block(vec![]);
    let body = b.body(vec![stmt, inner]);
    let sig = b.sig(vec![], vec![]);

    let mut c = Checker::with_config(
        b.finish(),
        Config::default().with_trace(true).with_report_unused(false),
    );
    let diags = check_body(&mut c, sig, &body);
    assert!(diags.is_empty(), "{:?}", messages(&diags));
}
