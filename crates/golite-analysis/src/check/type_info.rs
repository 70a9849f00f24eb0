//! Type information produced by type checking.

use std::collections::HashMap;

use golite_common::span::Span;
use golite_common::symbol::Ident;
use golite_syntax::ast::ExprId;

use crate::objects::{ObjKey, ScopeKey, TypeKey};
use crate::operand::OperandMode;

/// The mode and type of a checked expression; constants carry their value
/// in the mode.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAndValue {
    pub mode: OperandMode,
    pub typ: TypeKey,
}

impl TypeAndValue {
    pub(crate) fn new(mode: OperandMode, typ: TypeKey) -> Self {
        TypeAndValue { mode, typ }
    }
}

#[derive(Debug, Default)]
pub struct TypeInfo {
    /// Maps expressions to their types (and values for constants). Untyped
    /// expressions are updated in place once their final type is known.
    pub types: HashMap<ExprId, TypeAndValue>,

    /// Maps defining identifiers, keyed by span, to the objects they
    /// declare. A blank `_` on the left of an assignment maps to `None`.
    pub defs: HashMap<Span, Option<ObjKey>>,

    /// Maps identifiers, keyed by span, to the objects they denote.
    pub uses: HashMap<Span, ObjKey>,

    /// Maps blocks and function literals, keyed by span, to their scopes.
    pub scopes: HashMap<Span, ScopeKey>,
}

impl TypeInfo {
    pub(crate) fn new() -> TypeInfo {
        TypeInfo::default()
    }

    pub(crate) fn record_type_and_value(&mut self, expr_id: ExprId, mode: OperandMode, typ: TypeKey) {
        self.types.insert(expr_id, TypeAndValue::new(mode, typ));
    }

    pub(crate) fn record_def(&mut self, ident: &Ident, obj: Option<ObjKey>) {
        self.defs.insert(ident.span, obj);
    }

    pub(crate) fn record_use(&mut self, ident: &Ident, obj: ObjKey) {
        self.uses.insert(ident.span, obj);
    }

    pub(crate) fn record_scope(&mut self, span: Span, scope: ScopeKey) {
        self.scopes.insert(span, scope);
    }

    /// The recorded type of an expression.
    pub fn type_of(&self, expr_id: ExprId) -> Option<TypeKey> {
        self.types.get(&expr_id).map(|tv| tv.typ)
    }

    /// The object an identifier defines or refers to.
    pub fn object_of(&self, ident: &Ident) -> Option<ObjKey> {
        match self.defs.get(&ident.span) {
            Some(def) => *def,
            None => self.uses.get(&ident.span).copied(),
        }
    }
}
