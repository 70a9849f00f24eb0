//! Type representations.
//!
//! Every type lives in the `TCObjects` type arena and is referred to by a
//! `TypeKey`. Composite types point at their element types by key; struct
//! fields, tuple entries and interface methods are objects in the object
//! arena.

use std::collections::HashSet;
use std::fmt::{self, Write};

use crate::objects::{ObjKey, TCObjects, TypeKey};

#[derive(Debug)]
pub enum Type {
    Basic(BasicDetail),
    Array(ArrayDetail),
    Slice(SliceDetail),
    Struct(StructDetail),
    Pointer(PointerDetail),
    Tuple(TupleDetail),
    Signature(SignatureDetail),
    Interface(InterfaceDetail),
    Map(MapDetail),
    Chan(ChanDetail),
    Named(NamedDetail),
    TypeParam(TypeParamDetail),
}

impl Type {
    pub fn try_as_basic(&self) -> Option<&BasicDetail> {
        match self {
            Type::Basic(b) => Some(b),
            _ => None,
        }
    }

    pub fn try_as_array(&self) -> Option<&ArrayDetail> {
        match self {
            Type::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn try_as_slice(&self) -> Option<&SliceDetail> {
        match self {
            Type::Slice(s) => Some(s),
            _ => None,
        }
    }

    pub fn try_as_struct(&self) -> Option<&StructDetail> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn try_as_pointer(&self) -> Option<&PointerDetail> {
        match self {
            Type::Pointer(p) => Some(p),
            _ => None,
        }
    }

    pub fn try_as_tuple(&self) -> Option<&TupleDetail> {
        match self {
            Type::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn try_as_signature(&self) -> Option<&SignatureDetail> {
        match self {
            Type::Signature(s) => Some(s),
            _ => None,
        }
    }

    pub fn try_as_interface(&self) -> Option<&InterfaceDetail> {
        match self {
            Type::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn try_as_map(&self) -> Option<&MapDetail> {
        match self {
            Type::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn try_as_chan(&self) -> Option<&ChanDetail> {
        match self {
            Type::Chan(c) => Some(c),
            _ => None,
        }
    }

    pub fn try_as_named(&self) -> Option<&NamedDetail> {
        match self {
            Type::Named(n) => Some(n),
            _ => None,
        }
    }

    pub fn try_as_named_mut(&mut self) -> Option<&mut NamedDetail> {
        match self {
            Type::Named(n) => Some(n),
            _ => None,
        }
    }

    pub fn try_as_type_param(&self) -> Option<&TypeParamDetail> {
        match self {
            Type::TypeParam(t) => Some(t),
            _ => None,
        }
    }

    /// The next type in the underlying chain, if this type has one.
    /// A type parameter's underlying type is its constraint interface.
    pub fn underlying(&self) -> Option<TypeKey> {
        match self {
            Type::Named(detail) => Some(detail.underlying),
            Type::TypeParam(detail) => Some(detail.bound),
            _ => None,
        }
    }

    pub fn underlying_val<'a>(&'a self, objs: &'a TCObjects) -> &'a Type {
        match self.underlying() {
            Some(k) => &objs.types[underlying_type(k, objs)],
            None => self,
        }
    }

    /// Basic, defined and type-parameter types have names.
    pub fn is_named(&self) -> bool {
        matches!(self, Type::Basic(_) | Type::Named(_) | Type::TypeParam(_))
    }

    fn basic_info(&self, objs: &TCObjects) -> Option<BasicInfo> {
        self.underlying_val(objs).try_as_basic().map(|b| b.info())
    }

    pub fn is_invalid(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs) == Some(BasicInfo::IsInvalid)
    }

    pub fn is_boolean(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs) == Some(BasicInfo::IsBoolean)
    }

    pub fn is_integer(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs) == Some(BasicInfo::IsInteger)
    }

    pub fn is_float(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs) == Some(BasicInfo::IsFloat)
    }

    pub fn is_complex(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs) == Some(BasicInfo::IsComplex)
    }

    pub fn is_numeric(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs).map_or(false, |i| i.is_numeric())
    }

    pub fn is_string(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs) == Some(BasicInfo::IsString)
    }

    /// Untyped types are never named or wrapped, so no unwrapping is needed.
    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Basic(b) if b.typ().is_untyped())
    }

    pub fn is_const_type(&self, objs: &TCObjects) -> bool {
        self.basic_info(objs).map_or(false, |i| i.is_const_type())
    }

    pub fn is_interface(&self, objs: &TCObjects) -> bool {
        matches!(self.underlying_val(objs), Type::Interface(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BasicType {
    Invalid,
    // predeclared types
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Str,
    // types for untyped values, in widening order for the numeric kinds
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
    // aliases
    Byte,
    Rune,
}

impl BasicType {
    pub fn is_untyped(&self) -> bool {
        matches!(
            self,
            BasicType::UntypedBool
                | BasicType::UntypedInt
                | BasicType::UntypedRune
                | BasicType::UntypedFloat
                | BasicType::UntypedComplex
                | BasicType::UntypedString
                | BasicType::UntypedNil
        )
    }

    pub fn real_type(&self) -> BasicType {
        match self {
            BasicType::Byte => BasicType::Uint8,
            BasicType::Rune => BasicType::Int32,
            _ => *self,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BasicInfo {
    IsInvalid,
    IsBoolean,
    IsInteger,
    IsFloat,
    IsComplex,
    IsString,
    /// Untyped nil.
    IsNil,
}

impl BasicInfo {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BasicInfo::IsInteger | BasicInfo::IsFloat | BasicInfo::IsComplex
        )
    }

    pub fn is_const_type(&self) -> bool {
        !matches!(self, BasicInfo::IsInvalid | BasicInfo::IsNil)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct BasicDetail {
    typ: BasicType,
    info: BasicInfo,
    name: &'static str,
}

impl BasicDetail {
    pub fn new(typ: BasicType, info: BasicInfo, name: &'static str) -> BasicDetail {
        BasicDetail { typ, info, name }
    }

    pub fn typ(&self) -> BasicType {
        self.typ
    }

    pub fn info(&self) -> BasicInfo {
        self.info
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug)]
pub struct ArrayDetail {
    len: u64,
    elem: TypeKey,
}

impl ArrayDetail {
    pub fn new(elem: TypeKey, len: u64) -> ArrayDetail {
        ArrayDetail { len, elem }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn elem(&self) -> TypeKey {
        self.elem
    }
}

#[derive(Debug)]
pub struct SliceDetail {
    elem: TypeKey,
}

impl SliceDetail {
    pub fn new(elem: TypeKey) -> SliceDetail {
        SliceDetail { elem }
    }

    pub fn elem(&self) -> TypeKey {
        self.elem
    }
}

#[derive(Debug)]
pub struct StructDetail {
    fields: Vec<ObjKey>,
}

impl StructDetail {
    pub fn new(fields: Vec<ObjKey>) -> StructDetail {
        StructDetail { fields }
    }

    pub fn fields(&self) -> &[ObjKey] {
        &self.fields
    }
}

#[derive(Debug)]
pub struct PointerDetail {
    base: TypeKey,
}

impl PointerDetail {
    pub fn new(base: TypeKey) -> PointerDetail {
        PointerDetail { base }
    }

    pub fn base(&self) -> TypeKey {
        self.base
    }
}

/// An ordered list of variables: parameter lists, result lists and the
/// value of a multi-valued call.
#[derive(Debug)]
pub struct TupleDetail {
    vars: Vec<ObjKey>,
}

impl TupleDetail {
    pub fn new(vars: Vec<ObjKey>) -> TupleDetail {
        TupleDetail { vars }
    }

    pub fn vars(&self) -> &[ObjKey] {
        &self.vars
    }
}

#[derive(Clone, Debug)]
pub struct SignatureDetail {
    params: TypeKey,
    results: TypeKey,
    /// The last parameter has slice type and was declared `...T`.
    variadic: bool,
    /// Non-empty for generic functions.
    type_params: Vec<TypeKey>,
}

impl SignatureDetail {
    pub fn new(
        params: TypeKey,
        results: TypeKey,
        variadic: bool,
        type_params: Vec<TypeKey>,
    ) -> SignatureDetail {
        SignatureDetail {
            params,
            results,
            variadic,
            type_params,
        }
    }

    pub fn params(&self) -> TypeKey {
        self.params
    }

    pub fn results(&self) -> TypeKey {
        self.results
    }

    pub fn variadic(&self) -> bool {
        self.variadic
    }

    pub fn type_params(&self) -> &[TypeKey] {
        &self.type_params
    }

    pub fn param_vars<'a>(&self, objs: &'a TCObjects) -> &'a [ObjKey] {
        tuple_vars(self.params, objs)
    }

    pub fn result_vars<'a>(&self, objs: &'a TCObjects) -> &'a [ObjKey] {
        tuple_vars(self.results, objs)
    }
}

/// An interface is a method set, optionally restricted to a union of
/// types. Only constraint interfaces carry terms.
#[derive(Debug)]
pub struct InterfaceDetail {
    methods: Vec<ObjKey>,
    terms: Option<Vec<TypeKey>>,
}

impl InterfaceDetail {
    pub fn new(methods: Vec<ObjKey>, terms: Option<Vec<TypeKey>>) -> InterfaceDetail {
        InterfaceDetail { methods, terms }
    }

    pub fn new_empty() -> InterfaceDetail {
        InterfaceDetail::new(Vec::new(), None)
    }

    pub fn methods(&self) -> &[ObjKey] {
        &self.methods
    }

    pub fn terms(&self) -> Option<&[TypeKey]> {
        self.terms.as_deref()
    }

    /// No methods and no type restriction.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.terms.is_none()
    }
}

#[derive(Debug)]
pub struct MapDetail {
    key: TypeKey,
    elem: TypeKey,
}

impl MapDetail {
    pub fn new(key: TypeKey, elem: TypeKey) -> MapDetail {
        MapDetail { key, elem }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn elem(&self) -> TypeKey {
        self.elem
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChanDir {
    SendRecv,
    SendOnly,
    RecvOnly,
}

#[derive(Debug)]
pub struct ChanDetail {
    dir: ChanDir,
    elem: TypeKey,
}

impl ChanDetail {
    pub fn new(dir: ChanDir, elem: TypeKey) -> ChanDetail {
        ChanDetail { dir, elem }
    }

    pub fn dir(&self) -> ChanDir {
        self.dir
    }

    pub fn elem(&self) -> TypeKey {
        self.elem
    }
}

#[derive(Debug)]
pub struct NamedDetail {
    obj: ObjKey,
    underlying: TypeKey,
    methods: Vec<ObjKey>,
}

impl NamedDetail {
    pub fn new(obj: ObjKey, underlying: TypeKey) -> NamedDetail {
        NamedDetail {
            obj,
            underlying,
            methods: Vec::new(),
        }
    }

    pub fn obj(&self) -> ObjKey {
        self.obj
    }

    pub fn underlying(&self) -> TypeKey {
        self.underlying
    }

    pub fn methods(&self) -> &[ObjKey] {
        &self.methods
    }

    pub fn add_method(&mut self, m: ObjKey) {
        self.methods.push(m);
    }
}

#[derive(Debug)]
pub struct TypeParamDetail {
    obj: ObjKey,
    index: usize,
    bound: TypeKey,
}

impl TypeParamDetail {
    pub fn new(obj: ObjKey, index: usize, bound: TypeKey) -> TypeParamDetail {
        TypeParamDetail { obj, index, bound }
    }

    pub fn obj(&self) -> ObjKey {
        self.obj
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The constraint; always an interface or a named interface.
    pub fn bound(&self) -> TypeKey {
        self.bound
    }
}

// ----------------------------------------------------------------------------
// Utility functions

/// Follows defined types and type parameters down to a structural type.
pub fn underlying_type(t: TypeKey, objs: &TCObjects) -> TypeKey {
    let mut cur = t;
    // Bounded by the arena size to stay finite on malformed chains.
    for _ in 0..=objs.types.len() {
        match objs.types[cur].underlying() {
            Some(next) if next != cur => cur = next,
            _ => return cur,
        }
    }
    cur
}

pub fn tuple_vars(t: TypeKey, objs: &TCObjects) -> &[ObjKey] {
    objs.types[t].try_as_tuple().map_or(&[], |tuple| tuple.vars())
}

pub fn is_named(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_named()
}

pub fn is_invalid(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_invalid(objs)
}

pub fn is_boolean(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_boolean(objs)
}

pub fn is_integer(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_integer(objs)
}

pub fn is_numeric(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_numeric(objs)
}

pub fn is_string(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_string(objs)
}

pub fn is_typed(t: TypeKey, objs: &TCObjects) -> bool {
    !objs.types[t].is_untyped()
}

pub fn is_untyped(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_untyped()
}

pub fn is_const_type(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_const_type(objs)
}

/// True for interfaces and for type parameters, whose underlying type is
/// their constraint.
pub fn is_interface(t: TypeKey, objs: &TCObjects) -> bool {
    objs.types[t].is_interface(objs)
}

pub fn is_type_param(t: TypeKey, objs: &TCObjects) -> bool {
    matches!(objs.types[t], Type::TypeParam(_))
}

/// An interface that is not a type parameter.
pub fn is_non_type_param_interface(t: TypeKey, objs: &TCObjects) -> bool {
    !is_type_param(t, objs) && is_interface(t, objs)
}

pub fn is_untyped_numeric(t: TypeKey, objs: &TCObjects) -> bool {
    match &objs.types[t] {
        Type::Basic(b) => b.typ().is_untyped() && b.info().is_numeric(),
        _ => false,
    }
}

/// The explicit type terms of a type parameter's constraint; `None` when the
/// constraint admits any type.
pub fn type_param_terms(t: TypeKey, objs: &TCObjects) -> Option<&[TypeKey]> {
    let tp = objs.types[t].try_as_type_param()?;
    objs.types[underlying_type(tp.bound(), objs)]
        .try_as_interface()
        .and_then(|i| i.terms())
}

/// Reports whether the type includes the nil value. A type parameter does
/// only when every type in its constraint's type set does.
pub fn has_nil(t: TypeKey, objs: &TCObjects) -> bool {
    match &objs.types[underlying_type(t, objs)] {
        Type::Slice(_) | Type::Pointer(_) | Type::Signature(_) | Type::Map(_) | Type::Chan(_) => {
            true
        }
        Type::Interface(_) => {
            if !is_type_param(t, objs) {
                return true;
            }
            match type_param_terms(t, objs) {
                Some(terms) => terms.iter().all(|&term| has_nil(term, objs)),
                None => false,
            }
        }
        _ => false,
    }
}

/// Returns the default type of an untyped type; other types are returned
/// unchanged. Untyped nil has no default.
pub fn untyped_default_type(t: TypeKey, objs: &TCObjects) -> TypeKey {
    let univ = objs.universe();
    objs.types[t].try_as_basic().map_or(t, |bt| match bt.typ() {
        BasicType::UntypedBool => univ.types()[&BasicType::Bool],
        BasicType::UntypedInt => univ.types()[&BasicType::Int],
        BasicType::UntypedRune => univ.rune(),
        BasicType::UntypedFloat => univ.types()[&BasicType::Float64],
        BasicType::UntypedComplex => univ.types()[&BasicType::Complex128],
        BasicType::UntypedString => univ.types()[&BasicType::Str],
        _ => t,
    })
}

pub fn identical(x: TypeKey, y: TypeKey, objs: &TCObjects) -> bool {
    identical_impl(x, y, &mut HashSet::new(), objs)
}

pub fn identical_o(x: Option<TypeKey>, y: Option<TypeKey>, objs: &TCObjects) -> bool {
    match (x, y) {
        (Some(a), Some(b)) => identical(a, b, objs),
        (None, None) => true,
        _ => false,
    }
}

fn identical_impl(
    x: TypeKey,
    y: TypeKey,
    dup: &mut HashSet<(TypeKey, TypeKey)>,
    objs: &TCObjects,
) -> bool {
    if x == y {
        return true;
    }
    let same_vars = |a: &[ObjKey], b: &[ObjKey], dup: &mut HashSet<(TypeKey, TypeKey)>| {
        a.len() == b.len()
            && a.iter().zip(b).all(|(&va, &vb)| {
                identical_impl_o(objs.lobjs[va].typ(), objs.lobjs[vb].typ(), dup, objs)
            })
    };

    match (&objs.types[x], &objs.types[y]) {
        (Type::Basic(bx), Type::Basic(by)) => bx.typ().real_type() == by.typ().real_type(),
        (Type::Array(ax), Type::Array(ay)) => {
            ax.len() == ay.len() && identical_impl(ax.elem(), ay.elem(), dup, objs)
        }
        (Type::Slice(sx), Type::Slice(sy)) => identical_impl(sx.elem(), sy.elem(), dup, objs),
        (Type::Struct(sx), Type::Struct(sy)) => {
            sx.fields().len() == sy.fields().len()
                && sx.fields().iter().zip(sy.fields()).all(|(&fa, &fb)| {
                    let (oa, ob) = (&objs.lobjs[fa], &objs.lobjs[fb]);
                    oa.name() == ob.name()
                        && oa.var_embedded() == ob.var_embedded()
                        && identical_impl_o(oa.typ(), ob.typ(), dup, objs)
                })
        }
        (Type::Pointer(px), Type::Pointer(py)) => identical_impl(px.base(), py.base(), dup, objs),
        (Type::Tuple(tx), Type::Tuple(ty)) => same_vars(tx.vars(), ty.vars(), dup),
        (Type::Signature(sx), Type::Signature(sy)) => {
            sx.type_params().len() == sy.type_params().len()
                && sx.variadic() == sy.variadic()
                && identical_impl(sx.params(), sy.params(), dup, objs)
                && identical_impl(sx.results(), sy.results(), dup, objs)
        }
        (Type::Interface(ix), Type::Interface(iy)) => {
            if ix.methods().len() != iy.methods().len() {
                return false;
            }
            let terms_match = match (ix.terms(), iy.terms()) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.len() == b.len()
                        && a.iter().all(|&ta| b.iter().any(|&tb| identical(ta, tb, objs)))
                }
                _ => false,
            };
            if !terms_match {
                return false;
            }
            if !dup.insert((x, y)) {
                return true;
            }
            ix.methods().iter().all(|&ma| {
                let oa = &objs.lobjs[ma];
                iy.methods().iter().any(|&mb| {
                    let ob = &objs.lobjs[mb];
                    oa.name() == ob.name() && identical_impl_o(oa.typ(), ob.typ(), dup, objs)
                })
            })
        }
        (Type::Map(mx), Type::Map(my)) => {
            identical_impl(mx.key(), my.key(), dup, objs)
                && identical_impl(mx.elem(), my.elem(), dup, objs)
        }
        (Type::Chan(cx), Type::Chan(cy)) => {
            cx.dir() == cy.dir() && identical_impl(cx.elem(), cy.elem(), dup, objs)
        }
        (Type::Named(nx), Type::Named(ny)) => nx.obj() == ny.obj(),
        _ => false,
    }
}

fn identical_impl_o(
    x: Option<TypeKey>,
    y: Option<TypeKey>,
    dup: &mut HashSet<(TypeKey, TypeKey)>,
    objs: &TCObjects,
) -> bool {
    match (x, y) {
        (Some(a), Some(b)) => identical_impl(a, b, dup, objs),
        (None, None) => true,
        _ => false,
    }
}

/// The kind word for a composite underlying type, as used in operand
/// descriptions ("variable of struct type Point"); empty for basic types.
pub fn composite_kind(t: TypeKey, objs: &TCObjects) -> &'static str {
    match &objs.types[underlying_type(t, objs)] {
        Type::Basic(_) | Type::Named(_) | Type::TypeParam(_) => "",
        Type::Array(_) => "array",
        Type::Slice(_) => "slice",
        Type::Struct(_) => "struct",
        Type::Pointer(_) => "pointer",
        Type::Signature(_) => "func",
        Type::Interface(_) => "interface",
        Type::Map(_) => "map",
        Type::Chan(_) => "chan",
        Type::Tuple(_) => "tuple",
    }
}

// ----------------------------------------------------------------------------
// Summaries

/// Renders a list of types for arity notes: `(int, number)`.
///
/// Untyped numeric types print as `number`, other untyped types drop the
/// `untyped ` prefix, and missing or invalid types print as `unknown type`.
/// With `variadic`, the last entry is a slice shown as `...elem`.
pub fn types_summary(list: &[Option<TypeKey>], variadic: bool, objs: &TCObjects) -> String {
    let mut parts = Vec::with_capacity(list.len());
    for (i, t) in list.iter().enumerate() {
        let s = match *t {
            Some(t) if !is_invalid(t, objs) => {
                if is_untyped_numeric(t, objs) {
                    "number".to_string()
                } else if is_untyped(t, objs) {
                    type_string(t, objs)
                        .trim_start_matches("untyped ")
                        .to_string()
                } else if variadic && i + 1 == list.len() {
                    match objs.types[t].try_as_slice() {
                        Some(s) => format!("...{}", type_string(s.elem(), objs)),
                        None => type_string(t, objs),
                    }
                } else {
                    type_string(t, objs)
                }
            }
            _ => "unknown type".to_string(),
        };
        parts.push(s);
    }
    format!("({})", parts.join(", "))
}

/// `"1 variable"`, `"2 values"`.
pub fn measure(n: usize, unit: &str) -> String {
    let plural = if n == 1 { "" } else { "s" };
    format!("{} {}{}", n, unit, plural)
}

// ----------------------------------------------------------------------------
// Formatting

pub fn type_string(t: TypeKey, objs: &TCObjects) -> String {
    let mut buf = String::new();
    let _ = fmt_type_impl(Some(t), &mut buf, &mut HashSet::new(), objs);
    buf
}

pub fn type_string_o(t: Option<TypeKey>, objs: &TCObjects) -> String {
    let mut buf = String::new();
    let _ = fmt_type_impl(t, &mut buf, &mut HashSet::new(), objs);
    buf
}

fn fmt_type_impl(
    t: Option<TypeKey>,
    f: &mut impl Write,
    visited: &mut HashSet<TypeKey>,
    objs: &TCObjects,
) -> fmt::Result {
    let Some(tkey) = t else {
        return f.write_str("<nil>");
    };
    if tkey == objs.universe().any_type() {
        return f.write_str("any");
    }
    let typ = &objs.types[tkey];
    if !typ.is_named() && !visited.insert(tkey) {
        return write!(f, "type#{}", tkey.raw());
    }
    match typ {
        Type::Basic(detail) => f.write_str(detail.name())?,
        Type::Array(detail) => {
            write!(f, "[{}]", detail.len())?;
            fmt_type_impl(Some(detail.elem()), f, visited, objs)?;
        }
        Type::Slice(detail) => {
            f.write_str("[]")?;
            fmt_type_impl(Some(detail.elem()), f, visited, objs)?;
        }
        Type::Struct(detail) => {
            f.write_str("struct{")?;
            for (i, key) in detail.fields().iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                let field = &objs.lobjs[*key];
                if !field.var_embedded() {
                    write!(f, "{} ", field.name())?;
                }
                fmt_type_impl(field.typ(), f, visited, objs)?;
            }
            f.write_char('}')?;
        }
        Type::Pointer(detail) => {
            f.write_char('*')?;
            fmt_type_impl(Some(detail.base()), f, visited, objs)?;
        }
        Type::Tuple(_) => fmt_tuple(tkey, false, f, visited, objs)?,
        Type::Signature(_) => {
            f.write_str("func")?;
            fmt_signature_impl(tkey, f, visited, objs)?;
        }
        Type::Interface(detail) => {
            f.write_str("interface{")?;
            let mut first = true;
            for k in detail.methods() {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                let mobj = &objs.lobjs[*k];
                f.write_str(mobj.name())?;
                if let Some(sig) = mobj.typ() {
                    fmt_signature_impl(sig, f, visited, objs)?;
                }
            }
            if let Some(terms) = detail.terms() {
                if !first {
                    f.write_str("; ")?;
                }
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    fmt_type_impl(Some(*term), f, visited, objs)?;
                }
            }
            f.write_char('}')?;
        }
        Type::Map(detail) => {
            f.write_str("map[")?;
            fmt_type_impl(Some(detail.key()), f, visited, objs)?;
            f.write_char(']')?;
            fmt_type_impl(Some(detail.elem()), f, visited, objs)?;
        }
        Type::Chan(detail) => {
            let (s, paren) = match detail.dir() {
                ChanDir::SendRecv => {
                    let elem_recv = objs.types[detail.elem()]
                        .try_as_chan()
                        .map_or(false, |c| c.dir() == ChanDir::RecvOnly);
                    ("chan ", elem_recv)
                }
                ChanDir::SendOnly => ("chan<- ", false),
                ChanDir::RecvOnly => ("<-chan ", false),
            };
            f.write_str(s)?;
            if paren {
                f.write_char('(')?;
            }
            fmt_type_impl(Some(detail.elem()), f, visited, objs)?;
            if paren {
                f.write_char(')')?;
            }
        }
        Type::Named(detail) => f.write_str(objs.lobjs[detail.obj()].name())?,
        Type::TypeParam(detail) => f.write_str(objs.lobjs[detail.obj()].name())?,
    }
    Ok(())
}

fn fmt_signature_impl(
    t: TypeKey,
    f: &mut impl Write,
    visited: &mut HashSet<TypeKey>,
    objs: &TCObjects,
) -> fmt::Result {
    let Some(sig) = objs.types[t].try_as_signature() else {
        return Ok(());
    };
    if !sig.type_params().is_empty() {
        f.write_char('[')?;
        for (i, tp) in sig.type_params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt_type_impl(Some(*tp), f, visited, objs)?;
            if let Some(detail) = objs.types[*tp].try_as_type_param() {
                f.write_char(' ')?;
                fmt_type_impl(Some(detail.bound()), f, visited, objs)?;
            }
        }
        f.write_char(']')?;
    }
    fmt_tuple(sig.params(), sig.variadic(), f, visited, objs)?;
    let results = sig.result_vars(objs);
    if results.is_empty() {
        return Ok(());
    }
    f.write_char(' ')?;
    if results.len() == 1 {
        let obj = &objs.lobjs[results[0]];
        if obj.name().is_empty() {
            return fmt_type_impl(obj.typ(), f, visited, objs);
        }
    }
    fmt_tuple(sig.results(), false, f, visited, objs)
}

fn fmt_tuple(
    tkey: TypeKey,
    variadic: bool,
    f: &mut impl Write,
    visited: &mut HashSet<TypeKey>,
    objs: &TCObjects,
) -> fmt::Result {
    f.write_char('(')?;
    let vars = tuple_vars(tkey, objs);
    for (i, v) in vars.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        let obj = &objs.lobjs[*v];
        if !obj.name().is_empty() {
            write!(f, "{} ", obj.name())?;
        }
        let var_typ = obj.typ();
        let slice_elem = var_typ
            .and_then(|t| objs.types[t].try_as_slice())
            .map(|s| s.elem());
        match slice_elem {
            Some(elem) if variadic && i + 1 == vars.len() => {
                f.write_str("...")?;
                fmt_type_impl(Some(elem), f, visited, objs)?;
            }
            _ => fmt_type_impl(var_typ, f, visited, objs)?,
        }
    }
    f.write_char(')')
}

#[cfg(test)]
mod tests {
    use super::*;
    use golite_common::span::Span;

    fn basic(objs: &TCObjects, t: BasicType) -> TypeKey {
        objs.universe().types()[&t]
    }

    #[test]
    fn test_signature_strings() {
        let mut objs = TCObjects::new();
        let int = basic(&objs, BasicType::Int);
        let string = basic(&objs, BasicType::Str);
        let boolean = basic(&objs, BasicType::Bool);
        let error = objs.universe().error_type();

        let strings = objs.new_t_slice(string);
        let sig = objs.new_t_signature_of(&[int, strings], &[boolean, error], true);
        assert_eq!(type_string(sig, &objs), "func(int, ...string) (bool, error)");

        let empty = objs.new_t_signature_of(&[], &[], false);
        assert_eq!(type_string(empty, &objs), "func()");

        let single = objs.new_t_signature_of(&[], &[int], false);
        assert_eq!(type_string(single, &objs), "func() int");
    }

    #[test]
    fn test_composite_strings() {
        let mut objs = TCObjects::new();
        let int = basic(&objs, BasicType::Int);
        let string = basic(&objs, BasicType::Str);
        let m = objs.new_t_map(string, int);
        assert_eq!(type_string(m, &objs), "map[string]int");
        let recv = objs.new_t_chan(ChanDir::RecvOnly, int);
        assert_eq!(type_string(recv, &objs), "<-chan int");
        let nested = objs.new_t_chan(ChanDir::SendRecv, recv);
        assert_eq!(type_string(nested, &objs), "chan (<-chan int)");
        let any = objs.universe().any_type();
        assert_eq!(type_string(any, &objs), "any");
        let empty = objs.new_t_empty_interface();
        assert_eq!(type_string(empty, &objs), "interface{}");
    }

    #[test]
    fn test_identical_structural() {
        let mut objs = TCObjects::new();
        let int = basic(&objs, BasicType::Int);
        let a = objs.new_t_slice(int);
        let b = objs.new_t_slice(int);
        assert!(identical(a, b, &objs));
        let byte = objs.universe().byte();
        let uint8 = basic(&objs, BasicType::Uint8);
        assert!(identical(byte, uint8, &objs));
        let p = objs.new_t_pointer(int);
        assert!(!identical(a, p, &objs));
    }

    #[test]
    fn test_types_summary() {
        let mut objs = TCObjects::new();
        let int = basic(&objs, BasicType::Int);
        let untyped_float = basic(&objs, BasicType::UntypedFloat);
        let untyped_string = basic(&objs, BasicType::UntypedString);
        let invalid = basic(&objs, BasicType::Invalid);
        let s = types_summary(
            &[Some(int), Some(untyped_float), Some(untyped_string), Some(invalid), None],
            false,
            &objs,
        );
        assert_eq!(s, "(int, number, string, unknown type, unknown type)");

        let ints = objs.new_t_slice(int);
        assert_eq!(types_summary(&[Some(int), Some(ints)], true, &objs), "(int, ...int)");
        assert_eq!(measure(1, "variable"), "1 variable");
        assert_eq!(measure(3, "value"), "3 values");
    }

    #[test]
    fn test_defaults_and_nil() {
        let mut objs = TCObjects::new();
        let untyped_rune = basic(&objs, BasicType::UntypedRune);
        assert_eq!(type_string(untyped_default_type(untyped_rune, &objs), &objs), "rune");
        let untyped_nil = basic(&objs, BasicType::UntypedNil);
        assert_eq!(untyped_default_type(untyped_nil, &objs), untyped_nil);

        let int = basic(&objs, BasicType::Int);
        let slice = objs.new_t_slice(int);
        assert!(has_nil(slice, &objs));
        assert!(!has_nil(int, &objs));
        assert!(has_nil(objs.universe().error_type(), &objs));
    }

    #[test]
    fn test_composite_types() {
        let mut objs = TCObjects::new();
        let int = basic(&objs, BasicType::Int);
        let string = basic(&objs, BasicType::Str);

        let counts = objs.new_t_map(string, int);
        let detail = objs.types[counts].try_as_map().expect("map type");
        assert_eq!((detail.key(), detail.elem()), (string, int));
        assert!(objs.types[counts].try_as_struct().is_none());
        assert_eq!(type_string(counts, &objs), "map[string]int");

        let x = objs.new_field(Span::dummy(), None, "x".to_string(), Some(int), false);
        let point = objs.new_t_struct(vec![x]);
        assert_eq!(objs.types[point].try_as_struct().map(|s| s.fields().len()), Some(1));

        let grid = objs.new_t_array(int, 3);
        assert_eq!(objs.types[grid].try_as_array().map(|a| a.len()), Some(3));
        assert_eq!(type_string(grid, &objs), "[3]int");
        assert!(!has_nil(grid, &objs));
    }
}
