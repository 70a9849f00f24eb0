//! The universe scope: predeclared types, constants and `nil`.

use std::collections::HashMap;

use golite_common::span::{BytePos, Span};

use crate::obj::{ConstValue, LangObj};
use crate::objects::{LangObjs, ObjKey, ScopeKey, Scopes, TypeKey, Types};
use crate::scope::Scope;
use crate::typ::{
    BasicDetail, BasicInfo, BasicType, InterfaceDetail, NamedDetail, SignatureDetail,
    TupleDetail, Type,
};

const BASICS: &[(BasicType, BasicInfo, &str)] = &[
    (BasicType::Invalid, BasicInfo::IsInvalid, "invalid type"),
    (BasicType::Bool, BasicInfo::IsBoolean, "bool"),
    (BasicType::Int, BasicInfo::IsInteger, "int"),
    (BasicType::Int8, BasicInfo::IsInteger, "int8"),
    (BasicType::Int16, BasicInfo::IsInteger, "int16"),
    (BasicType::Int32, BasicInfo::IsInteger, "int32"),
    (BasicType::Int64, BasicInfo::IsInteger, "int64"),
    (BasicType::Uint, BasicInfo::IsInteger, "uint"),
    (BasicType::Uint8, BasicInfo::IsInteger, "uint8"),
    (BasicType::Uint16, BasicInfo::IsInteger, "uint16"),
    (BasicType::Uint32, BasicInfo::IsInteger, "uint32"),
    (BasicType::Uint64, BasicInfo::IsInteger, "uint64"),
    (BasicType::Uintptr, BasicInfo::IsInteger, "uintptr"),
    (BasicType::Float32, BasicInfo::IsFloat, "float32"),
    (BasicType::Float64, BasicInfo::IsFloat, "float64"),
    (BasicType::Complex64, BasicInfo::IsComplex, "complex64"),
    (BasicType::Complex128, BasicInfo::IsComplex, "complex128"),
    (BasicType::Str, BasicInfo::IsString, "string"),
    (BasicType::UntypedBool, BasicInfo::IsBoolean, "untyped bool"),
    (BasicType::UntypedInt, BasicInfo::IsInteger, "untyped int"),
    (BasicType::UntypedRune, BasicInfo::IsInteger, "untyped rune"),
    (BasicType::UntypedFloat, BasicInfo::IsFloat, "untyped float"),
    (BasicType::UntypedComplex, BasicInfo::IsComplex, "untyped complex"),
    (BasicType::UntypedString, BasicInfo::IsString, "untyped string"),
    (BasicType::UntypedNil, BasicInfo::IsNil, "untyped nil"),
];

const ALIASES: &[(BasicType, BasicInfo, &str)] = &[
    (BasicType::Byte, BasicInfo::IsInteger, "byte"),
    (BasicType::Rune, BasicInfo::IsInteger, "rune"),
];

#[derive(Debug)]
pub struct Universe {
    scope: ScopeKey,
    byte: TypeKey,
    rune: TypeKey,
    error_type: TypeKey,
    any_type: TypeKey,
    no_value_tuple: TypeKey,
    types: HashMap<BasicType, TypeKey>,
}

impl Universe {
    pub fn new(lobjs: &mut LangObjs, types: &mut Types, scopes: &mut Scopes) -> Universe {
        let scope = scopes.insert(Scope::new(
            None,
            BytePos::default(),
            BytePos::default(),
            "universe",
        ));
        let mut define = |lobjs: &mut LangObjs, obj: LangObj| {
            let name = obj.name().to_string();
            let okey = lobjs.insert(obj);
            lobjs[okey].set_parent(Some(scope));
            scopes[scope].insert_elem(&name, okey);
            okey
        };

        let mut basic_types = HashMap::new();
        for &(typ, info, name) in BASICS.iter().chain(ALIASES) {
            let tkey = types.insert(Type::Basic(BasicDetail::new(typ, info, name)));
            basic_types.insert(typ, tkey);
            // Untyped kinds have no spelling in source.
            if !typ.is_untyped() && typ != BasicType::Invalid {
                define(lobjs, LangObj::new_type_name(Span::dummy(), None, name.to_string(), Some(tkey)));
            }
        }
        let byte = basic_types[&BasicType::Byte];
        let rune = basic_types[&BasicType::Rune];
        let string = basic_types[&BasicType::Str];

        let no_value_tuple = types.insert(Type::Tuple(TupleDetail::new(vec![])));

        // type error interface { Error() string }
        let result = lobjs.insert(LangObj::new_param(Span::dummy(), None, String::new(), Some(string)));
        let results = types.insert(Type::Tuple(TupleDetail::new(vec![result])));
        let sig = types.insert(Type::Signature(SignatureDetail::new(
            no_value_tuple,
            results,
            false,
            Vec::new(),
        )));
        let method = lobjs.insert(LangObj::new_func(Span::dummy(), None, "Error".to_string(), Some(sig)));
        let iface = types.insert(Type::Interface(InterfaceDetail::new(vec![method], None)));
        let error_obj = define(lobjs, LangObj::new_type_name(Span::dummy(), None, "error".to_string(), None));
        let error_type = types.insert(Type::Named(NamedDetail::new(error_obj, iface)));
        lobjs[error_obj].set_type(Some(error_type));

        let any_type = types.insert(Type::Interface(InterfaceDetail::new_empty()));
        define(lobjs, LangObj::new_type_name(Span::dummy(), None, "any".to_string(), Some(any_type)));

        let untyped_bool = basic_types[&BasicType::UntypedBool];
        for (name, val) in [("true", true), ("false", false)] {
            define(
                lobjs,
                LangObj::new_const(Span::dummy(), None, name.to_string(), Some(untyped_bool), ConstValue::Bool(val)),
            );
        }
        define(lobjs, LangObj::new_nil(basic_types[&BasicType::UntypedNil]));

        Universe {
            scope,
            byte,
            rune,
            error_type,
            any_type,
            no_value_tuple,
            types: basic_types,
        }
    }

    pub fn scope(&self) -> ScopeKey {
        self.scope
    }

    pub fn byte(&self) -> TypeKey {
        self.byte
    }

    pub fn rune(&self) -> TypeKey {
        self.rune
    }

    pub fn error_type(&self) -> TypeKey {
        self.error_type
    }

    /// The predeclared `any`; printed by name.
    pub fn any_type(&self) -> TypeKey {
        self.any_type
    }

    pub fn no_value_tuple(&self) -> TypeKey {
        self.no_value_tuple
    }

    pub fn types(&self) -> &HashMap<BasicType, TypeKey> {
        &self.types
    }

    pub fn invalid_type(&self) -> TypeKey {
        self.types[&BasicType::Invalid]
    }

    /// The universe object with the given name, if predeclared.
    pub fn lookup(&self, name: &str, scopes: &Scopes) -> Option<ObjKey> {
        scopes[self.scope].lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::objects::TCObjects;
    use crate::typ::{type_string, BasicType};

    #[test]
    fn test_predeclared_names() {
        let objs = TCObjects::new();
        let univ = objs.universe();
        for name in ["int", "byte", "rune", "error", "any", "true", "false", "nil", "complex128"] {
            assert!(univ.lookup(name, &objs.scopes).is_some(), "{} missing", name);
        }
        assert!(univ.lookup("untyped int", &objs.scopes).is_none());
        assert_eq!(type_string(univ.error_type(), &objs), "error");
        assert_eq!(type_string(univ.types()[&BasicType::UntypedNil], &objs), "untyped nil");
    }

    #[test]
    fn test_true_is_untyped_bool_constant() {
        let objs = TCObjects::new();
        let univ = objs.universe();
        let t = univ.lookup("true", &objs.scopes).map(|k| &objs.lobjs[k]);
        assert!(t.map_or(false, |o| o.entity_type().is_const()));
        assert_eq!(t.and_then(|o| o.typ()), Some(univ.types()[&BasicType::UntypedBool]));
    }
}
