//! Central container for all checker entities.
//!
//! Objects, types, scopes and packages are allocated in arenas and
//! referred to by typed keys for the whole lifetime of a check.

use golite_common::span::{BytePos, Span};

use crate::arena::Arena;
use crate::obj::{ConstValue, LangObj};
use crate::package::Package;
use crate::scope::Scope;
use crate::typ::{
    self, ArrayDetail, ChanDetail, ChanDir, InterfaceDetail, MapDetail, NamedDetail,
    PointerDetail, SignatureDetail, SliceDetail, StructDetail, TupleDetail, Type, TypeParamDetail,
};
use crate::universe::Universe;

crate::define_keys! {
    /// A language object: variable, constant, type name, function or nil.
    pub struct ObjKey;
    pub struct TypeKey;
    pub struct ScopeKey;
    pub struct PackageKey;
}

pub type LangObjs = Arena<ObjKey, LangObj>;
pub type Types = Arena<TypeKey, Type>;
pub type Scopes = Arena<ScopeKey, Scope>;
pub type Packages = Arena<PackageKey, Package>;

pub struct TCObjects {
    pub lobjs: LangObjs,
    pub types: Types,
    pub scopes: Scopes,
    pub pkgs: Packages,
    universe: Universe,
}

impl Default for TCObjects {
    fn default() -> Self {
        Self::new()
    }
}

impl TCObjects {
    pub fn new() -> Self {
        let mut lobjs = Arena::new();
        let mut types = Arena::new();
        let mut scopes = Arena::new();
        let universe = Universe::new(&mut lobjs, &mut types, &mut scopes);
        TCObjects {
            lobjs,
            types,
            scopes,
            pkgs: Arena::new(),
            universe,
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    // ------------------------------------------------------------------------
    // Scopes and packages

    pub fn new_scope(
        &mut self,
        parent: Option<ScopeKey>,
        pos: BytePos,
        end: BytePos,
        comment: &str,
        is_func: bool,
    ) -> ScopeKey {
        let scope = if is_func {
            Scope::new_func(parent, pos, end)
        } else {
            Scope::new(parent, pos, end, comment)
        };
        let skey = self.scopes.insert(scope);
        if let Some(p) = parent {
            if p != self.universe.scope() {
                self.scopes[p].add_child(skey);
            }
        }
        skey
    }

    pub fn new_package(&mut self, path: String, name: String) -> PackageKey {
        let comment = format!("package {}", path);
        let skey = self.new_scope(
            Some(self.universe.scope()),
            BytePos::default(),
            BytePos::default(),
            &comment,
            false,
        );
        self.pkgs.insert(Package::new(path, name, skey))
    }

    // ------------------------------------------------------------------------
    // Objects

    pub fn new_const(
        &mut self,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
        val: ConstValue,
    ) -> ObjKey {
        self.lobjs.insert(LangObj::new_const(span, pkg, name, typ, val))
    }

    pub fn new_type_name(
        &mut self,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
    ) -> ObjKey {
        self.lobjs.insert(LangObj::new_type_name(span, pkg, name, typ))
    }

    pub fn new_var(
        &mut self,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
    ) -> ObjKey {
        self.lobjs.insert(LangObj::new_var(span, pkg, name, typ))
    }

    pub fn new_param_var(
        &mut self,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
    ) -> ObjKey {
        self.lobjs.insert(LangObj::new_param(span, pkg, name, typ))
    }

    pub fn new_field(
        &mut self,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
        embedded: bool,
    ) -> ObjKey {
        self.lobjs
            .insert(LangObj::new_field(span, pkg, name, typ, embedded))
    }

    pub fn new_func(
        &mut self,
        span: Span,
        pkg: Option<PackageKey>,
        name: String,
        typ: Option<TypeKey>,
    ) -> ObjKey {
        self.lobjs.insert(LangObj::new_func(span, pkg, name, typ))
    }

    // ------------------------------------------------------------------------
    // Types

    pub fn new_t_pointer(&mut self, base: TypeKey) -> TypeKey {
        self.types.insert(Type::Pointer(PointerDetail::new(base)))
    }

    pub fn new_t_slice(&mut self, elem: TypeKey) -> TypeKey {
        self.types.insert(Type::Slice(SliceDetail::new(elem)))
    }

    pub fn new_t_array(&mut self, elem: TypeKey, len: u64) -> TypeKey {
        self.types.insert(Type::Array(ArrayDetail::new(elem, len)))
    }

    pub fn new_t_map(&mut self, key: TypeKey, elem: TypeKey) -> TypeKey {
        self.types.insert(Type::Map(MapDetail::new(key, elem)))
    }

    pub fn new_t_chan(&mut self, dir: ChanDir, elem: TypeKey) -> TypeKey {
        self.types.insert(Type::Chan(ChanDetail::new(dir, elem)))
    }

    pub fn new_t_struct(&mut self, fields: Vec<ObjKey>) -> TypeKey {
        self.types.insert(Type::Struct(StructDetail::new(fields)))
    }

    pub fn new_t_tuple(&mut self, vars: Vec<ObjKey>) -> TypeKey {
        self.types.insert(Type::Tuple(TupleDetail::new(vars)))
    }

    /// A tuple of unnamed variables of the given types.
    pub fn new_t_tuple_of(&mut self, types: &[TypeKey]) -> TypeKey {
        let vars = types
            .iter()
            .map(|&t| self.new_param_var(Span::dummy(), None, String::new(), Some(t)))
            .collect();
        self.new_t_tuple(vars)
    }

    pub fn new_t_signature(
        &mut self,
        params: TypeKey,
        results: TypeKey,
        variadic: bool,
        type_params: Vec<TypeKey>,
    ) -> TypeKey {
        self.types.insert(Type::Signature(SignatureDetail::new(
            params,
            results,
            variadic,
            type_params,
        )))
    }

    /// A non-generic signature with unnamed parameters and results. For a
    /// variadic signature the last parameter type must be a slice.
    pub fn new_t_signature_of(
        &mut self,
        params: &[TypeKey],
        results: &[TypeKey],
        variadic: bool,
    ) -> TypeKey {
        let params = self.new_t_tuple_of(params);
        let results = self.new_t_tuple_of(results);
        self.new_t_signature(params, results, variadic, Vec::new())
    }

    pub fn new_t_interface(&mut self, methods: Vec<ObjKey>, terms: Option<Vec<TypeKey>>) -> TypeKey {
        self.types
            .insert(Type::Interface(InterfaceDetail::new(methods, terms)))
    }

    pub fn new_t_empty_interface(&mut self) -> TypeKey {
        self.types.insert(Type::Interface(InterfaceDetail::new_empty()))
    }

    /// A defined type over the structural type beneath `underlying`.
    pub fn new_t_named(&mut self, obj: ObjKey, underlying: TypeKey) -> TypeKey {
        let underlying = typ::underlying_type(underlying, self);
        self.types.insert(Type::Named(NamedDetail::new(obj, underlying)))
    }

    /// Declares a defined type together with its type name object.
    pub fn new_named_type(&mut self, span: Span, name: &str, underlying: TypeKey) -> (ObjKey, TypeKey) {
        let obj = self.new_type_name(span, None, name.to_string(), None);
        let t = self.new_t_named(obj, underlying);
        self.lobjs[obj].set_type(Some(t));
        (obj, t)
    }

    /// Declares a type parameter and its type name object. `bound` must be
    /// an interface.
    pub fn new_type_param(&mut self, span: Span, name: &str, index: usize, bound: TypeKey) -> (ObjKey, TypeKey) {
        let obj = self.new_type_name(span, None, name.to_string(), None);
        let t = self
            .types
            .insert(Type::TypeParam(TypeParamDetail::new(obj, index, bound)));
        self.lobjs[obj].set_type(Some(t));
        (obj, t)
    }

    /// Adds a method with the given signature to a defined type.
    pub fn add_method(&mut self, named: TypeKey, name: &str, sig: TypeKey, ptr_recv: bool) -> ObjKey {
        let m = self.new_func(Span::dummy(), None, name.to_string(), Some(sig));
        self.lobjs[m].set_func_has_ptr_recv(ptr_recv);
        if let Some(detail) = self.types[named].try_as_named_mut() {
            detail.add_method(m);
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typ::{type_string, BasicType};

    #[test]
    fn test_named_over_named_is_flattened() {
        let mut objs = TCObjects::new();
        let int = objs.universe().types()[&BasicType::Int];
        let (_, a) = objs.new_named_type(Span::dummy(), "A", int);
        let (_, b) = objs.new_named_type(Span::dummy(), "B", a);
        let underlying = objs.types[b].try_as_named().map(|n| n.underlying());
        assert_eq!(underlying, Some(int));
        assert_eq!(type_string(b, &objs), "B");
    }

    #[test]
    fn test_package_scope_is_not_a_universe_child() {
        let mut objs = TCObjects::new();
        let pkg = objs.new_package("main".to_string(), "main".to_string());
        let scope = objs.pkgs[pkg].scope();
        assert_eq!(objs.scopes[scope].parent(), Some(objs.universe().scope()));
        assert!(objs.scopes[objs.universe().scope()].children().is_empty());
    }
}
