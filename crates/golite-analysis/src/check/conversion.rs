//! Explicit conversions `T(x)`.

use crate::constant;
use crate::obj::ConstValue;
use crate::objects::TypeKey;
use crate::operand::{Operand, OperandMode};
use crate::typ::{self, BasicType};

use super::checker::Checker;
use super::errors::TypeError;

impl Checker {
    /// Converts `x` to type `t` in place, reporting an error and
    /// invalidating `x` if the conversion is not permitted.
    pub(crate) fn conversion(&mut self, x: &mut Operand, t: TypeKey) {
        let const_arg = matches!(x.mode, OperandMode::Constant(_));
        let mut cause = String::new();

        let ok = if const_arg && typ::is_const_type(t, self.objs()) {
            let converted = x.mode.constant_val().and_then(|v| self.const_convert(x, v, t));
            match converted {
                Some(v) => {
                    x.mode = OperandMode::Constant(v);
                    true
                }
                None => {
                    let xt = x.typ.unwrap_or_else(|| self.invalid_type());
                    // Integer to integer can only fail by overflow.
                    if typ::is_integer(xt, self.objs()) && typ::is_integer(t, self.objs()) {
                        let val = x.mode.constant_val().map(|v| v.to_string()).unwrap_or_default();
                        let msg = format!("constant {} overflows {}", val, self.type_str(t));
                        self.error_code_msg(TypeError::InvalidConversion, x.span(), msg);
                        x.mode = OperandMode::Invalid;
                        return;
                    }
                    false
                }
            }
        } else if const_arg && typ::is_type_param(t, self.objs()) {
            // Convertible if convertible to every type in the type set.
            let terms = typ::type_param_terms(t, self.objs()).unwrap_or(&[]).to_vec();
            let ok = !terms.is_empty()
                && terms.iter().all(|&term| {
                    let fits = x
                        .mode
                        .constant_val()
                        .map_or(false, |v| self.const_convert(x, v, term).is_some());
                    if !fits {
                        cause = format!(
                            "cannot convert {} to type {} (in {})",
                            self.op_str(x),
                            self.type_str(term),
                            self.type_str(t)
                        );
                    }
                    fits
                });
            // Type parameters are not constants.
            x.mode = OperandMode::Value;
            ok
        } else if self.convertible_to(x, t, &mut cause) {
            x.mode = OperandMode::Value;
            true
        } else {
            false
        };

        if !ok {
            let msg = if cause.is_empty() {
                format!("cannot convert {} to type {}", self.op_str(x), self.type_str(t))
            } else {
                format!("cannot convert {} to type {}: {}", self.op_str(x), self.type_str(t), cause)
            };
            self.error_code_msg(TypeError::InvalidConversion, x.span(), msg);
            x.mode = OperandMode::Invalid;
            return;
        }

        // The conversion fixes the type of an untyped argument.
        if let Some(xt) = x.typ.filter(|&xt| self.is_untyped(xt)) {
            let objs = self.objs();
            let to_interface = typ::is_interface(t, objs) && !typ::is_type_param(t, objs);
            let final_type = if to_interface || (const_arg && !typ::is_const_type(t, objs)) || x.is_nil(objs) {
                typ::untyped_default_type(xt, objs)
            } else if matches!(x.mode, OperandMode::Constant(_)) && typ::is_integer(xt, objs) && typ::is_string(t, objs)
            {
                xt
            } else {
                t
            };
            if let Some(e) = x.expr {
                self.update_expr_type(e, final_type);
            }
        }

        x.typ = Some(t);
    }

    /// The constant `val` converted to the basic type underlying `t`, if it
    /// is representable there. An integer converted to a string yields the
    /// corresponding character, or U+FFFD if it is not a valid code point.
    fn const_convert(&self, x: &Operand, val: &ConstValue, t: TypeKey) -> Option<ConstValue> {
        let u = self.underlying(t);
        let basic = self.otype(u).try_as_basic()?;
        let mut rounded = val.clone();
        if val.representable(basic, Some(&mut rounded)) {
            return Some(rounded);
        }
        let xt = x.typ?;
        if typ::is_integer(xt, self.objs()) && typ::is_string(u, self.objs()) {
            let (i, exact) = constant::int64_val(val);
            let c = if exact && i >= 0 {
                u32::try_from(i).ok().and_then(char::from_u32)
            } else {
                None
            };
            return Some(constant::make_string(c.unwrap_or('\u{FFFD}').to_string()));
        }
        None
    }

    /// Reports whether the non-constant `x` can be converted to `t`.
    fn convertible_to(&self, x: &Operand, t: TypeKey, cause: &mut String) -> bool {
        if self.assignable_to(x, t, cause).0 {
            return true;
        }
        let objs = self.objs();
        let Some(v) = x.typ else {
            return false;
        };
        let vu = self.underlying(v);
        let tu = self.underlying(t);
        let v_tp = typ::is_type_param(v, objs);
        let t_tp = typ::is_type_param(t, objs);

        if typ::identical(vu, tu, objs) && !v_tp && !t_tp {
            return true;
        }

        // Unnamed pointers with identical base types.
        if let (Some(vp), Some(tp)) = (self.otype(v).try_as_pointer(), self.otype(t).try_as_pointer()) {
            if typ::identical(self.underlying(vp.base()), self.underlying(tp.base()), objs)
                && !typ::is_type_param(vp.base(), objs)
                && !typ::is_type_param(tp.base(), objs)
            {
                return true;
            }
        }

        let int_or_float = |k: TypeKey| typ::is_integer(k, objs) || self.otype(k).is_float(objs);
        if int_or_float(vu) && int_or_float(tu) {
            return true;
        }
        if self.otype(vu).is_complex(objs) && self.otype(tu).is_complex(objs) {
            return true;
        }
        if (typ::is_integer(vu, objs) || self.is_bytes_or_runes(vu)) && typ::is_string(tu, objs) {
            return true;
        }
        if typ::is_string(vu, objs) && self.is_bytes_or_runes(tu) {
            return true;
        }

        // A slice converts to an array, or pointer to array, of the same
        // element type.
        if let Some(s) = self.otype(vu).try_as_slice() {
            let arr = match self.otype(tu).try_as_pointer() {
                Some(p) => self.otype(self.underlying(p.base())).try_as_array(),
                None => self.otype(tu).try_as_array(),
            };
            if arr.map_or(false, |a| typ::identical(s.elem(), a.elem(), objs)) {
                return true;
            }
        }

        match (v_tp, t_tp) {
            (true, true) => {
                let vterms = typ::type_param_terms(v, objs).unwrap_or(&[]);
                let tterms = typ::type_param_terms(t, objs).unwrap_or(&[]);
                !vterms.is_empty()
                    && !tterms.is_empty()
                    && vterms.iter().all(|&vt| {
                        let mut y = x.clone();
                        y.typ = Some(vt);
                        tterms.iter().all(|&tt| {
                            let ok = self.convertible_to(&y, tt, cause);
                            if !ok {
                                *cause = format!(
                                    "cannot convert {} (in {}) to type {} (in {})",
                                    self.type_str(vt),
                                    self.type_str(v),
                                    self.type_str(tt),
                                    self.type_str(t)
                                );
                            }
                            ok
                        })
                    })
            }
            (true, false) => {
                let vterms = typ::type_param_terms(v, objs).unwrap_or(&[]);
                !vterms.is_empty()
                    && vterms.iter().all(|&vt| {
                        let mut y = x.clone();
                        y.typ = Some(vt);
                        let ok = self.convertible_to(&y, t, cause);
                        if !ok {
                            *cause = format!(
                                "cannot convert {} (in {}) to type {}",
                                self.type_str(vt),
                                self.type_str(v),
                                self.type_str(t)
                            );
                        }
                        ok
                    })
            }
            (false, true) => {
                let tterms = typ::type_param_terms(t, objs).unwrap_or(&[]);
                !tterms.is_empty()
                    && tterms.iter().all(|&tt| {
                        let ok = self.convertible_to(x, tt, cause);
                        if !ok {
                            *cause = format!(
                                "cannot convert {} to type {} (in {})",
                                self.type_str(v),
                                self.type_str(tt),
                                self.type_str(t)
                            );
                        }
                        ok
                    })
            }
            (false, false) => false,
        }
    }

    /// `[]byte` or `[]rune`, possibly named.
    fn is_bytes_or_runes(&self, t: TypeKey) -> bool {
        let Some(s) = self.otype(t).try_as_slice() else {
            return false;
        };
        self.otype(self.underlying(s.elem()))
            .try_as_basic()
            .map_or(false, |b| matches!(b.typ().real_type(), BasicType::Uint8 | BasicType::Int32))
    }
}
