//! Source-like rendering of tree nodes for diagnostics and traces.
//!
//! Function literal bodies are elided as `{…}`.

use std::fmt::Write;

use golite_common::symbol::{Ident, Symbol, SymbolInterner};

use crate::ast::*;

pub fn format_expr(expr: &Expr, interner: &SymbolInterner) -> String {
    let mut buf = String::new();
    write_expr(&mut buf, expr, interner);
    buf
}

pub fn format_type_expr(ty: &TypeExpr, interner: &SymbolInterner) -> String {
    let mut buf = String::new();
    write_type_expr(&mut buf, ty, interner);
    buf
}

/// One-line summary of a statement for trace output.
pub fn format_stmt(stmt: &Stmt, interner: &SymbolInterner) -> String {
    let mut buf = String::new();
    write_stmt(&mut buf, stmt, interner);
    buf
}

fn write_ident(buf: &mut String, ident: &Ident, interner: &SymbolInterner) {
    buf.push_str(interner.resolve(ident.symbol).unwrap_or("<ident>"));
}

fn write_raw(buf: &mut String, raw: Symbol, interner: &SymbolInterner) {
    buf.push_str(interner.resolve(raw).unwrap_or("<lit>"));
}

fn write_list(buf: &mut String, exprs: &[Expr], interner: &SymbolInterner) {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        write_expr(buf, e, interner);
    }
}

fn write_expr(buf: &mut String, expr: &Expr, interner: &SymbolInterner) {
    match &expr.kind {
        ExprKind::Ident(ident) => write_ident(buf, ident, interner),
        ExprKind::IntLit(lit)
        | ExprKind::FloatLit(lit)
        | ExprKind::ImagLit(lit)
        | ExprKind::RuneLit(lit)
        | ExprKind::StringLit(lit) => write_raw(buf, lit.raw, interner),
        ExprKind::Paren(inner) => {
            buf.push('(');
            write_expr(buf, inner, interner);
            buf.push(')');
        }
        ExprKind::Selector(sel) => {
            write_expr(buf, &sel.expr, interner);
            buf.push('.');
            write_ident(buf, &sel.sel, interner);
        }
        ExprKind::Index(idx) => {
            write_expr(buf, &idx.expr, interner);
            buf.push('[');
            write_expr(buf, &idx.index, interner);
            buf.push(']');
        }
        ExprKind::Call(call) => {
            write_expr(buf, &call.func, interner);
            buf.push('(');
            write_list(buf, &call.args, interner);
            if call.spread {
                buf.push_str("...");
            }
            buf.push(')');
        }
        ExprKind::TypeAssert(ta) => {
            write_expr(buf, &ta.expr, interner);
            buf.push_str(".(");
            write_type_expr(buf, &ta.ty, interner);
            buf.push(')');
        }
        ExprKind::Unary(un) => {
            buf.push_str(match un.op {
                UnaryOp::Pos => "+",
                UnaryOp::Neg => "-",
                UnaryOp::Not => "!",
                UnaryOp::Addr => "&",
                UnaryOp::Deref => "*",
            });
            write_expr(buf, &un.operand, interner);
        }
        ExprKind::Receive(ch) => {
            buf.push_str("<-");
            write_expr(buf, ch, interner);
        }
        ExprKind::FuncLit(lit) => {
            write_sig(buf, &lit.sig, interner);
            buf.push_str(" {…}");
        }
    }
}

fn write_params(buf: &mut String, params: &[Param], variadic: bool, interner: &SymbolInterner) {
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        if let Some(name) = &p.name {
            write_ident(buf, name, interner);
            buf.push(' ');
        }
        if variadic && i == params.len() - 1 {
            buf.push_str("...");
        }
        write_type_expr(buf, &p.ty, interner);
    }
}

fn write_sig(buf: &mut String, sig: &FuncSig, interner: &SymbolInterner) {
    buf.push_str("func(");
    write_params(buf, &sig.params, sig.variadic, interner);
    buf.push(')');
    match sig.results.as_slice() {
        [] => {}
        [single] if single.name.is_none() => {
            buf.push(' ');
            write_type_expr(buf, &single.ty, interner);
        }
        results => {
            buf.push_str(" (");
            write_params(buf, results, false, interner);
            buf.push(')');
        }
    }
}

fn write_type_expr(buf: &mut String, ty: &TypeExpr, interner: &SymbolInterner) {
    match &ty.kind {
        TypeExprKind::Ident(ident) => write_ident(buf, ident, interner),
        TypeExprKind::Pointer(elem) => {
            buf.push('*');
            write_type_expr(buf, elem, interner);
        }
        TypeExprKind::Slice(elem) => {
            buf.push_str("[]");
            write_type_expr(buf, elem, interner);
        }
        TypeExprKind::Map(m) => {
            buf.push_str("map[");
            write_type_expr(buf, &m.key, interner);
            buf.push(']');
            write_type_expr(buf, &m.value, interner);
        }
        TypeExprKind::Chan(c) => {
            buf.push_str(match c.dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            write_type_expr(buf, &c.elem, interner);
        }
        TypeExprKind::Func(sig) => write_sig(buf, sig, interner),
    }
}

fn write_stmt(buf: &mut String, stmt: &Stmt, interner: &SymbolInterner) {
    match &stmt.kind {
        StmtKind::Empty => {}
        StmtKind::Block(block) => {
            let _ = write!(buf, "{{ {} stmts }}", block.stmts.len());
        }
        StmtKind::Var(decl) => {
            for spec in &decl.specs {
                buf.push_str("var ");
                write_spec(buf, &spec.names, spec.ty.as_ref(), &spec.values, interner);
            }
        }
        StmtKind::Const(decl) => {
            for spec in &decl.specs {
                buf.push_str("const ");
                write_spec(buf, &spec.names, spec.ty.as_ref(), &spec.values, interner);
            }
        }
        StmtKind::ShortVar(s) => {
            write_list(buf, &s.lhs, interner);
            buf.push_str(" := ");
            write_list(buf, &s.rhs, interner);
        }
        StmtKind::Assign(s) => {
            write_list(buf, &s.lhs, interner);
            buf.push_str(" = ");
            write_list(buf, &s.rhs, interner);
        }
        StmtKind::Return(r) => {
            buf.push_str("return");
            if !r.values.is_empty() {
                buf.push(' ');
                write_list(buf, &r.values, interner);
            }
        }
        StmtKind::Expr(e) => write_expr(buf, e, interner),
    }
}

fn write_spec(
    buf: &mut String,
    names: &[Ident],
    ty: Option<&TypeExpr>,
    values: &[Expr],
    interner: &SymbolInterner,
) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        write_ident(buf, name, interner);
    }
    if let Some(ty) = ty {
        buf.push(' ');
        write_type_expr(buf, ty, interner);
    }
    if !values.is_empty() {
        buf.push_str(" = ");
        write_list(buf, values, interner);
    }
}
