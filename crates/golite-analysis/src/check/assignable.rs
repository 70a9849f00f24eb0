//! Assignability, implicit conversion of untyped operands, and interface
//! satisfaction.

use tracing::debug;

use crate::lookup::{self, LookupResult, MissingMethod};
use crate::obj::ConstValue;
use crate::objects::{ObjKey, TypeKey};
use crate::operand::{Operand, OperandMode};
use crate::typ::{self, BasicType, ChanDir, Type};

use super::checker::Checker;
use super::errors::TypeError;

/// The outcome of implicitly converting an untyped operand: the new type
/// (`None` if the operand had none) and, for constants, the value as
/// represented in that type.
pub(crate) type Implicit = (Option<TypeKey>, Option<ConstValue>);

impl Checker {
    /// Returns the type and value an untyped operand `x` takes on when used
    /// where a value of type `target` is expected. Typed and invalid
    /// operands are returned unchanged.
    pub(crate) fn implicit_type_and_value(&self, x: &Operand, target: TypeKey) -> Result<Implicit, TypeError> {
        let xt = match x.typ {
            Some(t) if !x.invalid() && self.is_untyped(t) && !typ::is_invalid(target, self.objs()) => t,
            _ => return Ok((x.typ, None)),
        };

        if self.is_untyped(target) {
            // Both untyped.
            return match self.max_type(xt, target) {
                Some(m) => Ok((Some(m), None)),
                None => Err(TypeError::InvalidUntypedConversion),
            };
        }

        if x.is_nil(self.objs()) {
            return if typ::has_nil(target, self.objs()) {
                Ok((Some(target), None))
            } else {
                Err(TypeError::InvalidUntypedConversion)
            };
        }

        let tu = self.underlying(target);
        match self.otype(tu) {
            Type::Basic(_) => {
                if let OperandMode::Constant(_) = &x.mode {
                    let v = self.representation(x, tu)?;
                    return Ok((Some(target), Some(v)));
                }
                // Non-constant untyped values come from comparisons.
                let objs = self.objs();
                let ok = match self.otype(xt).try_as_basic().map(|b| b.typ()) {
                    Some(BasicType::UntypedBool) => typ::is_boolean(target, objs),
                    Some(
                        BasicType::UntypedInt
                        | BasicType::UntypedRune
                        | BasicType::UntypedFloat
                        | BasicType::UntypedComplex,
                    ) => typ::is_numeric(target, objs),
                    Some(BasicType::UntypedString) => typ::is_string(target, objs),
                    _ => false,
                };
                if !ok {
                    return Err(TypeError::InvalidUntypedConversion);
                }
            }
            Type::Interface(detail) => {
                if typ::is_type_param(target, self.objs()) {
                    let terms = typ::type_param_terms(target, self.objs()).unwrap_or(&[]);
                    let all = !terms.is_empty()
                        && terms.iter().all(|&term| {
                            let u = self.underlying(term);
                            matches!(self.implicit_type_and_value(x, u), Ok((Some(_), _)))
                        });
                    if !all {
                        return Err(TypeError::InvalidUntypedConversion);
                    }
                } else {
                    // Values in interfaces need a concrete dynamic type.
                    if !detail.is_empty() {
                        return Err(TypeError::InvalidUntypedConversion);
                    }
                    return Ok((Some(typ::untyped_default_type(xt, self.objs())), None));
                }
            }
            _ => return Err(TypeError::InvalidUntypedConversion),
        }
        Ok((Some(target), None))
    }

    /// The larger of two untyped types: identical types, or the wider of
    /// two numeric kinds.
    fn max_type(&self, x: TypeKey, y: TypeKey) -> Option<TypeKey> {
        if x == y {
            return Some(x);
        }
        let objs = self.objs();
        if typ::is_untyped_numeric(x, objs) && typ::is_untyped_numeric(y, objs) {
            let kx = self.otype(x).try_as_basic()?.typ();
            let ky = self.otype(y).try_as_basic()?.typ();
            return Some(if kx > ky { x } else { y });
        }
        None
    }

    /// Returns the constant `x` as represented in the basic type `t`.
    pub(crate) fn representation(&self, x: &Operand, t: TypeKey) -> Result<ConstValue, TypeError> {
        let Some(val) = x.mode.constant_val() else {
            return Err(TypeError::InvalidConstVal);
        };
        let Some(basic) = self.otype(t).try_as_basic() else {
            return Err(TypeError::InvalidConstVal);
        };
        let mut rounded = val.clone();
        if val.representable(basic, Some(&mut rounded)) {
            return Ok(rounded);
        }
        let objs = self.objs();
        let xt = x.typ.unwrap_or_else(|| self.invalid_type());
        if typ::is_numeric(xt, objs) && typ::is_numeric(t, objs) {
            if !typ::is_integer(xt, objs) && typ::is_integer(t, objs) {
                Err(TypeError::TruncatedFloat)
            } else {
                Err(TypeError::NumericOverflow)
            }
        } else {
            Err(TypeError::InvalidConstVal)
        }
    }

    /// Checks that the constant `x` fits the basic type `t` and stores the
    /// represented value; reports and invalidates `x` otherwise.
    pub(crate) fn representable(&self, x: &mut Operand, t: TypeKey) {
        match self.representation(x, t) {
            Ok(v) => x.mode = OperandMode::Constant(v),
            Err(code) => {
                self.invalid_conversion(code, x, t);
                x.set_invalid();
            }
        }
    }

    pub(crate) fn invalid_conversion(&self, code: TypeError, x: &Operand, target: TypeKey) {
        let msg = match code {
            TypeError::TruncatedFloat => format!("{} truncated to {}", self.op_str(x), self.type_str(target)),
            TypeError::NumericOverflow => format!("{} overflows {}", self.op_str(x), self.type_str(target)),
            _ => format!("cannot convert {} to type {}", self.op_str(x), self.type_str(target)),
        };
        self.error_code_msg(code, x.span(), msg);
    }

    /// Converts an untyped operand to `target` in place, updating the
    /// recorded type and value of its expression.
    pub(crate) fn convert_untyped(&mut self, x: &mut Operand, target: TypeKey) {
        match self.implicit_type_and_value(x, target) {
            Err(code) => {
                let t = if typ::is_type_param(target, self.objs()) {
                    target
                } else {
                    self.underlying(target)
                };
                self.invalid_conversion(code, x, t);
                x.set_invalid();
            }
            Ok((new_type, val)) => self.apply_implicit(x, new_type, val),
        }
    }

    /// Stores the outcome of an implicit conversion in `x` and in the
    /// recorded type information.
    pub(crate) fn apply_implicit(&mut self, x: &mut Operand, new_type: Option<TypeKey>, val: Option<ConstValue>) {
        if let Some(v) = val {
            if let Some(e) = x.expr {
                self.update_expr_val(e, &v);
            }
            x.mode = OperandMode::Constant(v);
        }
        if new_type != x.typ {
            x.typ = new_type;
            if let (Some(e), Some(t)) = (x.expr, new_type) {
                self.update_expr_type(e, t);
            }
        }
    }

    // =========================================================================
    // Assignability
    // =========================================================================

    /// Reports whether `x` is assignable to a variable of type `t`. On
    /// failure the returned code classifies the error and `cause` may hold
    /// an explanation.
    pub(crate) fn assignable_to(&self, x: &Operand, t: TypeKey, cause: &mut String) -> (bool, TypeError) {
        let invalid = self.invalid_type();
        let v = match x.typ {
            Some(v) if !x.invalid() && t != invalid => v,
            _ => return (true, TypeError::IncompatibleAssign),
        };
        let objs = self.objs();

        if typ::identical(v, t, objs) {
            return (true, TypeError::IncompatibleAssign);
        }

        let vu = self.underlying(v);
        let tu = self.underlying(t);
        let v_tp = typ::is_type_param(v, objs);
        let t_tp = typ::is_type_param(t, objs);

        // An untyped value representable by a value of type t.
        if self.is_untyped(vu) {
            if t_tp {
                let terms = typ::type_param_terms(t, objs).unwrap_or(&[]);
                let ok = !terms.is_empty()
                    && terms
                        .iter()
                        .all(|&term| matches!(self.implicit_type_and_value(x, term), Ok((Some(_), _))));
                return (ok, TypeError::IncompatibleAssign);
            }
            let ok = matches!(self.implicit_type_and_value(x, t), Ok((Some(_), _)));
            return (ok, TypeError::IncompatibleAssign);
        }

        // Identical underlying types and at least one side unnamed.
        if typ::identical(vu, tu, objs)
            && (!typ::is_named(v, objs) || !typ::is_named(t, objs))
            && !v_tp
            && !t_tp
        {
            return (true, TypeError::IncompatibleAssign);
        }

        // t is an interface (but not a type parameter) and v implements it.
        if (matches!(self.otype(tu), Type::Interface(_)) && !t_tp) || self.is_interface_ptr(tu) {
            if self.implements(v, t, cause) {
                return (true, TypeError::IncompatibleAssign);
            }
            // A type parameter v may still be assignable.
            if !v_tp {
                return (false, TypeError::InvalidIfaceAssign);
            }
            cause.clear();
        }

        // v is an interface: hint at a type assertion when t implements it.
        if matches!(self.otype(vu), Type::Interface(_)) && !v_tp && self.implements(t, v, &mut String::new()) {
            *cause = "need type assertion".to_string();
            return (false, TypeError::IncompatibleAssign);
        }

        // A bidirectional channel assigned to a channel type with identical
        // element types.
        if let (Some(vc), Some(tc)) = (self.otype(vu).try_as_chan(), self.otype(tu).try_as_chan()) {
            if vc.dir() == ChanDir::SendRecv && typ::identical(vc.elem(), tc.elem(), objs) {
                return (
                    !typ::is_named(v, objs) || !typ::is_named(t, objs),
                    TypeError::InvalidChanAssign,
                );
            }
        }

        if !v_tp && !t_tp {
            return (false, TypeError::IncompatibleAssign);
        }

        // An unnamed v is assignable to a type parameter if it is
        // assignable to every type in its type set.
        if !typ::is_named(v, objs) && t_tp {
            let terms = typ::type_param_terms(t, objs).unwrap_or(&[]);
            if terms.is_empty() {
                return (false, TypeError::IncompatibleAssign);
            }
            for &term in terms {
                let (ok, code) = self.assignable_to(x, term, cause);
                if !ok {
                    let msg = format!(
                        "cannot assign {} to {} (in {})",
                        self.type_str(v),
                        self.type_str(term),
                        self.type_str(t)
                    );
                    wrap_cause(cause, msg);
                    return (false, code);
                }
            }
            return (true, TypeError::IncompatibleAssign);
        }

        // A type parameter v is assignable to an unnamed t if every type in
        // its type set is.
        if v_tp && !typ::is_named(t, objs) {
            let terms = typ::type_param_terms(v, objs).unwrap_or(&[]);
            if terms.is_empty() {
                return (false, TypeError::IncompatibleAssign);
            }
            for &term in terms {
                let mut y = x.clone();
                y.typ = Some(term);
                let (ok, code) = self.assignable_to(&y, t, cause);
                if !ok {
                    let msg = format!(
                        "cannot assign {} (in {}) to {}",
                        self.type_str(term),
                        self.type_str(v),
                        self.type_str(t)
                    );
                    wrap_cause(cause, msg);
                    return (false, code);
                }
            }
            return (true, TypeError::IncompatibleAssign);
        }

        (false, TypeError::IncompatibleAssign)
    }

    pub(crate) fn is_interface_ptr(&self, t: TypeKey) -> bool {
        self.otype(t)
            .try_as_pointer()
            .map_or(false, |p| typ::is_interface(p.base(), self.objs()))
    }

    /// Reports whether `v` implements the interface `t`; `cause` explains a
    /// failure.
    pub(crate) fn implements(&self, v: TypeKey, t: TypeKey, cause: &mut String) -> bool {
        let vu = self.underlying(v);
        let tu = self.underlying(t);
        let objs = self.objs();
        if typ::is_invalid(vu, objs) || typ::is_invalid(tu, objs) {
            return true;
        }
        if let Some(p) = self.otype(vu).try_as_pointer() {
            if typ::is_invalid(self.underlying(p.base()), objs) {
                return true;
            }
        }

        let Some(ti) = self.otype(tu).try_as_interface() else {
            let detail = if self.is_interface_ptr(tu) {
                format!("type {} is pointer to interface, not interface", self.type_str(t))
            } else {
                format!("{} is not an interface", self.type_str(t))
            };
            *cause = format!("{} does not implement {} ({})", self.type_str(v), self.type_str(t), detail);
            return false;
        };

        if ti.terms().is_some() {
            *cause = format!(
                "cannot use type {} outside a type constraint: interface contains type constraints",
                self.type_str(t)
            );
            return false;
        }
        if ti.is_empty() {
            return true;
        }

        if let Some(missing) = lookup::missing_method(v, t, true, objs) {
            debug!(method = self.lobj(missing.method()).name(), "missing method");
            *cause = format!(
                "{} does not implement {} {}",
                self.type_str(v),
                self.type_str(t),
                self.missing_method_cause(v, &missing)
            );
            return false;
        }
        true
    }

    /// The parenthesized reason in "T does not implement I (...)".
    pub(crate) fn missing_method_cause(&self, v: TypeKey, missing: &MissingMethod) -> String {
        match missing {
            MissingMethod::WrongType { want, have } => format!(
                "(wrong type for method {})\n\t\thave {}\n\t\twant {}",
                self.lobj(*want).name(),
                self.func_string(*have),
                self.func_string(*want)
            ),
            MissingMethod::PointerReceiver(m) => {
                format!("(method {} has pointer receiver)", self.lobj(*m).name())
            }
            MissingMethod::Missing(m) => {
                let name = self.lobj(*m).name();
                if self.is_interface_ptr(v) {
                    return format!(
                        "(type {} is pointer to interface, not interface)",
                        self.type_str(v)
                    );
                }
                if let LookupResult::Entry(f, _, _) = lookup::lookup_field_or_method(v, true, name, self.objs()) {
                    if self.lobj(f).entity_type().is_var() {
                        return format!("({}.{} is a field, not a method)", self.type_str(v), name);
                    }
                }
                format!("(missing method {})", name)
            }
        }
    }

    /// A method as written in an interface: `String() string`.
    fn func_string(&self, f: ObjKey) -> String {
        let obj = self.lobj(f);
        let sig = self.type_str_o(obj.typ());
        format!("{}{}", obj.name(), sig.strip_prefix("func").unwrap_or(&sig))
    }
}

fn wrap_cause(cause: &mut String, msg: String) {
    if cause.is_empty() {
        *cause = msg;
    } else {
        *cause = format!("{}\n\t{}", msg, cause);
    }
}
