//! Syntax tree definitions.
//!
//! Covers the statement and expression forms that take part in
//! declarations and assignments: short variable declarations, `=`
//! assignments, `var`/`const` specs, returns, and the operand-producing
//! expressions on either side of them.

use std::rc::Rc;

use golite_common::span::Span;
use golite_common::symbol::{Ident, Symbol};

/// Identity of an expression node, used to key recorded types.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct ExprId(pub u32);

// =============================================================================
// Type expressions
// =============================================================================

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeExprKind {
    /// A type name: `int`, `Point`.
    Ident(Ident),
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `map[K]V`
    Map(Box<MapType>),
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan(Box<ChanType>),
    /// `func(T) R`
    Func(Box<FuncSig>),
}

#[derive(Debug, Clone)]
pub struct MapType {
    pub key: TypeExpr,
    pub value: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub struct ChanType {
    pub dir: ChanDir,
    pub elem: TypeExpr,
}

/// A parameter or result; unnamed when `name` is `None`.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FuncSig {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// The last parameter is `...T`; its `ty` holds `T`.
    pub variadic: bool,
    pub span: Span,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Empty,
    Block(Block),
    Var(VarDecl),
    Const(ConstDecl),
    /// `lhs := rhs`
    ShortVar(ShortVarDecl),
    /// `lhs = rhs`
    Assign(AssignStmt),
    Return(ReturnStmt),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub specs: Vec<VarSpec>,
}

/// `var a, b T = x, y`
#[derive(Debug, Clone)]
pub struct VarSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub specs: Vec<ConstSpec>,
}

/// `const a, b T = x, y`
#[derive(Debug, Clone)]
pub struct ConstSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// Left-hand sides are expressions so that `a.b := 1` reaches the checker.
#[derive(Debug, Clone)]
pub struct ShortVarDecl {
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub values: Vec<Expr>,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(Ident),
    IntLit(BasicLit),
    FloatLit(BasicLit),
    /// `2i`, `1.5i`
    ImagLit(BasicLit),
    RuneLit(BasicLit),
    StringLit(BasicLit),
    Paren(Box<Expr>),
    Selector(Box<SelectorExpr>),
    Index(Box<IndexExpr>),
    Call(Box<CallExpr>),
    TypeAssert(Box<TypeAssertExpr>),
    Unary(Box<UnaryExpr>),
    /// `<-ch`
    Receive(Box<Expr>),
    /// Shared so that deferred body checks can hold on to it.
    FuncLit(Rc<FuncLit>),
}

/// A literal kept as written, quotes and prefixes included.
#[derive(Debug, Clone)]
pub struct BasicLit {
    pub raw: Symbol,
}

#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub expr: Expr,
    pub sel: Ident,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub expr: Expr,
    pub index: Expr,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub func: Expr,
    pub args: Vec<Expr>,
    /// `f(xs...)`
    pub spread: bool,
}

#[derive(Debug, Clone)]
pub struct TypeAssertExpr {
    pub expr: Expr,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Addr,
    Deref,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone)]
pub struct FuncLit {
    pub sig: FuncSig,
    pub body: Block,
}

impl Expr {
    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let ExprKind::Paren(inner) = &e.kind {
            e = inner;
        }
        e
    }

    /// The identifier, if this is a bare (not parenthesized) name.
    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}
