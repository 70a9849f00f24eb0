//! Field and method lookup.
//!
//! Implements the selector lookup rules: depth-first by embedding level,
//! breadth-first within a level, with ambiguity detection for names that
//! occur more than once at the shallowest depth. Also answers whether a
//! type implements an interface method set (`missing_method`) and whether
//! a type assertion can possibly succeed (`assertable_to`).

use std::collections::{HashMap, HashSet};

use crate::objects::{ObjKey, TCObjects, TypeKey};
use crate::typ::{self, Type};

/// Result of looking up a field or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Found a field or method. Contains the object, the index path to it,
    /// and whether a pointer indirection occurred on the way.
    Entry(ObjKey, Vec<usize>, bool),
    /// The name occurs more than once at the shallowest depth; the index
    /// path leads to the second occurrence.
    Ambiguous(Vec<usize>),
    /// Found a method with a pointer receiver, but the operand is neither a
    /// pointer nor addressable.
    BadMethodReceiver,
    NotFound,
}

/// Tracks an embedded type during breadth-first search.
#[derive(Debug, Clone)]
struct EmbeddedType {
    typ: TypeKey,
    indices: Vec<usize>,
    indirect: bool,
    /// The type appeared more than once at this depth.
    multiples: bool,
}

impl EmbeddedType {
    fn new(typ: TypeKey, indices: Vec<usize>, indirect: bool, multiples: bool) -> Self {
        EmbeddedType {
            typ,
            indices,
            indirect,
            multiples,
        }
    }
}

/// Dereferences an unnamed pointer type.
fn deref(t: TypeKey, objs: &TCObjects) -> (TypeKey, bool) {
    match objs.types[t].try_as_pointer() {
        Some(p) => (p.base(), true),
        None => (t, false),
    }
}

fn concat(indices: &[usize], i: usize) -> Vec<usize> {
    let mut v = Vec::with_capacity(indices.len() + 1);
    v.extend_from_slice(indices);
    v.push(i);
    v
}

/// Looks up the field or method `name` in `t`.
///
/// `addressable` states whether a value of type `t` is addressable; it
/// decides whether methods with pointer receivers are reachable.
pub fn lookup_field_or_method(t: TypeKey, addressable: bool, name: &str, objs: &TCObjects) -> LookupResult {
    if name == "_" {
        return LookupResult::NotFound;
    }
    // Methods cannot be associated with a named pointer type: look through
    // it, but discard method results.
    if let Type::Named(named) = &objs.types[t] {
        let u = named.underlying();
        if objs.types[u].try_as_pointer().is_some() {
            let result = lookup_impl(u, false, name, objs);
            if let LookupResult::Entry(okey, ..) = &result {
                if objs.lobjs[*okey].entity_type().is_func() {
                    return LookupResult::NotFound;
                }
            }
            return result;
        }
    }
    lookup_impl(t, addressable, name, objs)
}

fn lookup_impl(t: TypeKey, addressable: bool, name: &str, objs: &TCObjects) -> LookupResult {
    let (t, is_ptr) = deref(t, objs);
    // A pointer to an interface has no methods.
    if is_ptr && typ::is_interface(t, objs) {
        return LookupResult::NotFound;
    }

    let mut current = vec![EmbeddedType::new(t, vec![], is_ptr, false)];
    let mut seen: HashSet<TypeKey> = HashSet::new();

    while !current.is_empty() {
        let mut next: Vec<EmbeddedType> = vec![];
        let mut target: Option<(ObjKey, Vec<usize>, bool)> = None;

        for et in &current {
            if let Type::Named(named) = &objs.types[et.typ] {
                if !seen.insert(et.typ) {
                    // Already searched at a shallower depth.
                    continue;
                }
                let found = named
                    .methods()
                    .iter()
                    .enumerate()
                    .find(|(_, &m)| objs.lobjs[m].name() == name);
                if let Some((i, &m)) = found {
                    let indices = concat(&et.indices, i);
                    if et.multiples || target.is_some() {
                        return LookupResult::Ambiguous(indices);
                    }
                    target = Some((m, indices, et.indirect));
                    // A matching field cannot exist alongside a method.
                    continue;
                }
            }

            match &objs.types[typ::underlying_type(et.typ, objs)] {
                Type::Struct(detail) => {
                    for (i, &f) in detail.fields().iter().enumerate() {
                        let field = &objs.lobjs[f];
                        if field.name() == name {
                            let indices = concat(&et.indices, i);
                            if et.multiples || target.is_some() {
                                return LookupResult::Ambiguous(indices);
                            }
                            target = Some((f, indices, et.indirect));
                            continue;
                        }
                        // Collect embedded fields for the next depth.
                        if target.is_none() && field.var_embedded() {
                            if let Some(ft) = field.typ() {
                                let (ft, is_ptr) = deref(ft, objs);
                                next.push(EmbeddedType::new(
                                    ft,
                                    concat(&et.indices, i),
                                    et.indirect || is_ptr,
                                    et.multiples,
                                ));
                            }
                        }
                    }
                }
                Type::Interface(detail) => {
                    let found = detail
                        .methods()
                        .iter()
                        .enumerate()
                        .find(|(_, &m)| objs.lobjs[m].name() == name);
                    if let Some((i, &m)) = found {
                        let indices = concat(&et.indices, i);
                        if et.multiples || target.is_some() {
                            return LookupResult::Ambiguous(indices);
                        }
                        target = Some((m, indices, et.indirect));
                    }
                }
                _ => {}
            }
        }

        if let Some((okey, indices, indirect)) = target {
            let obj = &objs.lobjs[okey];
            if obj.func_has_ptr_recv() && !indirect && !addressable {
                return LookupResult::BadMethodReceiver;
            }
            return LookupResult::Entry(okey, indices, indirect);
        }

        current = consolidate_multiples(next);
    }

    LookupResult::NotFound
}

/// Merges entries for the same named type, marking them as multiples.
fn consolidate_multiples(list: Vec<EmbeddedType>) -> Vec<EmbeddedType> {
    if list.len() <= 1 {
        return list;
    }
    let mut result: Vec<EmbeddedType> = Vec::with_capacity(list.len());
    let mut seen: HashMap<TypeKey, usize> = HashMap::new();
    for et in list {
        match seen.get(&et.typ) {
            Some(&idx) => result[idx].multiples = true,
            None => {
                seen.insert(et.typ, result.len());
                result.push(et);
            }
        }
    }
    result
}

/// Why a type fails to implement an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingMethod {
    /// The interface method has no counterpart.
    Missing(ObjKey),
    /// A method of that name exists with a different signature.
    WrongType { want: ObjKey, have: ObjKey },
    /// The method exists but is declared on the pointer type.
    PointerReceiver(ObjKey),
}

impl MissingMethod {
    /// The interface method in question.
    pub fn method(&self) -> ObjKey {
        match self {
            MissingMethod::Missing(m) | MissingMethod::PointerReceiver(m) => *m,
            MissingMethod::WrongType { want, .. } => *want,
        }
    }
}

/// Returns the first method of interface `iface` that `t` lacks, if any.
///
/// If `t` is itself an interface, a method it does not have counts as
/// missing only when `static_` is set; for a type assertion the dynamic
/// type may still provide it.
pub fn missing_method(t: TypeKey, iface: TypeKey, static_: bool, objs: &TCObjects) -> Option<MissingMethod> {
    let idetail = objs.types[typ::underlying_type(iface, objs)].try_as_interface()?;
    if idetail.methods().is_empty() {
        return None;
    }

    let same_sig = |a: ObjKey, b: ObjKey| typ::identical_o(objs.lobjs[a].typ(), objs.lobjs[b].typ(), objs);

    if let Some(tdetail) = objs.types[typ::underlying_type(t, objs)].try_as_interface() {
        for &m in idetail.methods() {
            let name = objs.lobjs[m].name();
            match tdetail.methods().iter().find(|&&f| objs.lobjs[f].name() == name) {
                None if static_ => return Some(MissingMethod::Missing(m)),
                None => {}
                Some(&f) if !same_sig(f, m) => {
                    return Some(MissingMethod::WrongType { want: m, have: f });
                }
                Some(_) => {}
            }
        }
        return None;
    }

    for &m in idetail.methods() {
        match lookup_field_or_method(t, false, objs.lobjs[m].name(), objs) {
            LookupResult::Entry(f, _, _) if objs.lobjs[f].entity_type().is_func() => {
                if !same_sig(f, m) {
                    return Some(MissingMethod::WrongType { want: m, have: f });
                }
            }
            LookupResult::BadMethodReceiver => return Some(MissingMethod::PointerReceiver(m)),
            _ => return Some(MissingMethod::Missing(m)),
        }
    }
    None
}

/// Reports why a value of interface type `iface` can never hold a `t`, if
/// that can be decided statically. Asserting to another interface is
/// always possible.
pub fn assertable_to(iface: TypeKey, t: TypeKey, objs: &TCObjects) -> Option<MissingMethod> {
    if typ::is_interface(t, objs) {
        return None;
    }
    missing_method(t, iface, false, objs)
}
