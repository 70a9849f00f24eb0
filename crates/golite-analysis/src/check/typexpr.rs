//! Type expression resolution.
//!
//! Converts syntax type expressions into `TypeKey`s. Unresolvable types
//! are reported and resolve to the invalid type.

use golite_common::symbol::Ident;
use golite_syntax::ast::{self, FuncSig, Param, TypeExpr, TypeExprKind};

use crate::objects::{ObjKey, ScopeKey, TypeKey};
use crate::typ::ChanDir;

use super::checker::Checker;
use super::errors::TypeError;

impl Checker {
    /// Resolves a type expression.
    pub(crate) fn typexpr(&mut self, ty: &TypeExpr) -> TypeKey {
        match &ty.kind {
            TypeExprKind::Ident(ident) => self.type_name(ident),
            TypeExprKind::Pointer(base) => {
                let base = self.typexpr(base);
                self.tc_objs.new_t_pointer(base)
            }
            TypeExprKind::Slice(elem) => {
                let elem = self.typexpr(elem);
                self.tc_objs.new_t_slice(elem)
            }
            TypeExprKind::Map(map) => {
                let key = self.typexpr(&map.key);
                let value = self.typexpr(&map.value);
                self.tc_objs.new_t_map(key, value)
            }
            TypeExprKind::Chan(chan) => {
                let elem = self.typexpr(&chan.elem);
                let dir = match chan.dir {
                    ast::ChanDir::Both => ChanDir::SendRecv,
                    ast::ChanDir::Send => ChanDir::SendOnly,
                    ast::ChanDir::Recv => ChanDir::RecvOnly,
                };
                self.tc_objs.new_t_chan(dir, elem)
            }
            TypeExprKind::Func(sig) => self.func_type(sig).0,
        }
    }

    /// Resolves a type name such as `int` or `Point`.
    fn type_name(&mut self, ident: &Ident) -> TypeKey {
        let name = self.resolve_ident(ident);
        if name == "_" {
            self.error_code_msg(TypeError::InvalidBlank, ident.span, "cannot use _ as value or type");
            return self.invalid_type();
        }
        let Some(okey) = self.lookup(name) else {
            let msg = format!("undefined: {}", name);
            self.error_code_msg(TypeError::UndeclaredName, ident.span, msg);
            return self.invalid_type();
        };
        self.result.record_use(ident, okey);

        let obj = self.lobj(okey);
        if !obj.entity_type().is_type_name() {
            let msg = format!("{} is not a type", obj.name());
            self.error_code_msg(TypeError::NotAType, ident.span, msg);
            return self.invalid_type();
        }
        obj.typ().unwrap_or_else(|| self.invalid_type())
    }

    /// Resolves a function signature. Named parameters and results are
    /// declared in a new function scope, visible from the end of the
    /// signature on; the scope is returned for checking the body.
    pub(crate) fn func_type(&mut self, sig: &FuncSig) -> (TypeKey, ScopeKey) {
        let scope = self
            .tc_objs
            .new_scope(self.octx.scope, sig.span.start, sig.span.end, "function", true);
        self.result.record_scope(sig.span, scope);

        let params = self.collect_params(scope, sig, &sig.params, sig.variadic);
        let results = self.collect_params(scope, sig, &sig.results, false);
        let params = self.tc_objs.new_t_tuple(params);
        let results = self.tc_objs.new_t_tuple(results);
        let t = self
            .tc_objs
            .new_t_signature(params, results, sig.variadic, Vec::new());
        (t, scope)
    }

    fn collect_params(&mut self, scope: ScopeKey, sig: &FuncSig, list: &[Param], variadic: bool) -> Vec<ObjKey> {
        let last = list.len().saturating_sub(1);
        list.iter()
            .enumerate()
            .map(|(i, p)| {
                let mut t = self.typexpr(&p.ty);
                // `...T` is a parameter of type []T.
                if variadic && i == last {
                    t = self.tc_objs.new_t_slice(t);
                }
                match &p.name {
                    Some(ident) => {
                        let name = self.resolve_ident(ident).to_string();
                        let okey = self.tc_objs.new_param_var(ident.span, Some(self.pkg), name, Some(t));
                        self.declare(scope, Some(ident), okey, sig.span.end);
                        okey
                    }
                    None => self
                        .tc_objs
                        .new_param_var(p.span, Some(self.pkg), String::new(), Some(t)),
                }
            })
            .collect()
    }
}
