//! Language objects: the named entities a scope can hold.

use golite_common::span::{BytePos, Span};

pub use crate::constant::Value as ConstValue;
use crate::objects::{PackageKey, ScopeKey, TypeKey};

#[derive(Clone, Debug, PartialEq)]
pub struct VarProperty {
    pub embedded: bool,
    pub is_field: bool,
    pub used: bool,
}

impl VarProperty {
    pub fn new(embedded: bool, is_field: bool, used: bool) -> VarProperty {
        VarProperty {
            embedded,
            is_field,
            used,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityType {
    Const { val: ConstValue },
    TypeName,
    /// Variables, parameters, results and struct fields.
    Var(VarProperty),
    /// Functions and methods, including interface methods.
    Func { has_ptr_recv: bool },
    /// The predeclared `nil`.
    Nil,
}

impl EntityType {
    pub fn is_const(&self) -> bool {
        matches!(self, EntityType::Const { .. })
    }

    pub fn is_type_name(&self) -> bool {
        matches!(self, EntityType::TypeName)
    }

    pub fn is_var(&self) -> bool {
        matches!(self, EntityType::Var(_))
    }

    pub fn is_func(&self) -> bool {
        matches!(self, EntityType::Func { .. })
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, EntityType::Nil)
    }
}

#[derive(Clone, Debug)]
pub struct LangObj {
    entity_type: EntityType,
    parent: Option<ScopeKey>,
    span: Span,
    pkg: Option<PackageKey>,
    name: String,
    typ: Option<TypeKey>,
    /// Where the object becomes visible; set when it is declared.
    scope_pos: BytePos,
}

impl LangObj {
    fn new(
        entity_type: EntityType,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
    ) -> LangObj {
        LangObj {
            entity_type,
            parent: None,
            span,
            pkg,
            name,
            typ,
            scope_pos: BytePos::default(),
        }
    }

    pub fn new_const(
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
        val: ConstValue,
    ) -> LangObj {
        LangObj::new(EntityType::Const { val }, span, pkg, name, typ)
    }

    pub fn new_type_name(
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
    ) -> LangObj {
        LangObj::new(EntityType::TypeName, span, pkg, name, typ)
    }

    pub fn new_var(span: Span, pkg: Option<PackageKey>, name: String, typ: Option<TypeKey>) -> LangObj {
        LangObj::new(
            EntityType::Var(VarProperty::new(false, false, false)),
            span,
            pkg,
            name,
            typ,
        )
    }

    /// Parameters start out used: an unread parameter is not an error.
    pub fn new_param(span: Span, pkg: Option<PackageKey>, name: String, typ: Option<TypeKey>) -> LangObj {
        LangObj::new(
            EntityType::Var(VarProperty::new(false, false, true)),
            span,
            pkg,
            name,
            typ,
        )
    }

    pub fn new_field(
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
        embedded: bool,
    ) -> LangObj {
        LangObj::new(
            EntityType::Var(VarProperty::new(embedded, true, false)),
            span,
            pkg,
            name,
            typ,
        )
    }

    pub fn new_func(span: Span, pkg: Option<PackageKey>, name: String, typ: Option<TypeKey>) -> LangObj {
        LangObj::new(EntityType::Func { has_ptr_recv: false }, span, pkg, name, typ)
    }

    pub fn new_nil(typ: TypeKey) -> LangObj {
        LangObj::new(EntityType::Nil, Span::dummy(), None, "nil".to_string(), Some(typ))
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn parent(&self) -> Option<ScopeKey> {
        self.parent
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn pos(&self) -> BytePos {
        self.span.start
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> Option<TypeKey> {
        self.typ
    }

    pub fn pkg(&self) -> Option<PackageKey> {
        self.pkg
    }

    pub fn scope_pos(&self) -> BytePos {
        self.scope_pos
    }

    pub fn set_type(&mut self, typ: Option<TypeKey>) {
        self.typ = typ;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ScopeKey>) {
        self.parent = parent;
    }

    pub(crate) fn set_scope_pos(&mut self, pos: BytePos) {
        self.scope_pos = pos;
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }

    pub fn const_val(&self) -> Option<&ConstValue> {
        match &self.entity_type {
            EntityType::Const { val } => Some(val),
            _ => None,
        }
    }

    pub fn set_const_val(&mut self, v: ConstValue) {
        if let EntityType::Const { val } = &mut self.entity_type {
            *val = v;
        }
    }

    pub fn var_embedded(&self) -> bool {
        match &self.entity_type {
            EntityType::Var(prop) => prop.embedded,
            _ => false,
        }
    }

    pub fn var_is_field(&self) -> bool {
        match &self.entity_type {
            EntityType::Var(prop) => prop.is_field,
            _ => false,
        }
    }

    pub fn var_used(&self) -> bool {
        match &self.entity_type {
            EntityType::Var(prop) => prop.used,
            _ => false,
        }
    }

    pub fn set_var_used(&mut self, used: bool) {
        if let EntityType::Var(prop) = &mut self.entity_type {
            prop.used = used;
        }
    }

    pub fn func_has_ptr_recv(&self) -> bool {
        match &self.entity_type {
            EntityType::Func { has_ptr_recv } => *has_ptr_recv,
            _ => false,
        }
    }

    pub fn set_func_has_ptr_recv(&mut self, has: bool) {
        if let EntityType::Func { has_ptr_recv } = &mut self.entity_type {
            *has_ptr_recv = has;
        }
    }
}
