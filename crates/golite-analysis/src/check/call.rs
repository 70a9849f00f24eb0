//! Function call checking.
//!
//! A call whose function operand is a type is a conversion; see
//! `conversion.rs`.

use golite_syntax::ast::{CallExpr, Expr};

use crate::objects::TypeKey;
use crate::operand::{Operand, OperandMode};
use crate::typ;

use super::checker::Checker;
use super::errors::TypeError;
use super::expr::ExprClass;

impl Checker {
    /// Type-checks the call `e`.
    pub(crate) fn call<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr, call: &'a CallExpr) -> ExprClass {
        self.expr_or_type(x, &call.func);

        match x.mode {
            OperandMode::Invalid => {
                self.use_exprs(&call.args);
                x.expr = Some(e);
                return ExprClass::Statement;
            }
            OperandMode::TypeExpr => {
                self.conversion_call(x, e, call);
                return ExprClass::Conversion;
            }
            _ => {}
        }

        let func_type = x.typ.unwrap_or_else(|| self.invalid_type());
        let sig = self.underlying(func_type);
        let Some(detail) = self.otype(sig).try_as_signature() else {
            self.invalid_op(
                TypeError::InvalidCall,
                x.span(),
                format!("cannot call non-function {}", self.op_str(x)),
            );
            self.use_exprs(&call.args);
            x.mode = OperandMode::Invalid;
            x.expr = Some(e);
            return ExprClass::Statement;
        };
        let generic = !detail.type_params().is_empty();
        let results = detail.results();

        if generic {
            let msg = format!(
                "cannot use generic function {} without instantiation",
                self.expr_str(&call.func)
            );
            self.error_code_msg(TypeError::WrongTypeArgCount, call.func.span, msg);
            self.use_exprs(&call.args);
            x.mode = OperandMode::Invalid;
            x.expr = Some(e);
            return ExprClass::Statement;
        }

        let (mut args, _) = self.expr_list(&call.args, false);
        self.arguments(e, call, sig, &mut args);

        let result_vars = typ::tuple_vars(results, self.objs());
        match result_vars {
            [] => {
                x.mode = OperandMode::NoValue;
                x.typ = Some(self.universe().no_value_tuple());
            }
            [v] => {
                x.mode = OperandMode::Value;
                x.typ = self.lobj(*v).typ();
            }
            _ => {
                x.mode = OperandMode::Value;
                x.typ = Some(results);
            }
        }
        x.expr = Some(e);
        ExprClass::Statement
    }

    /// `T(x)`.
    fn conversion_call<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr, call: &'a CallExpr) {
        let t = x.typ.unwrap_or_else(|| self.invalid_type());
        x.mode = OperandMode::Invalid;
        match call.args.as_slice() {
            [] => {
                let msg = format!("missing argument in conversion to {}", self.type_str(t));
                self.error_code_msg(TypeError::WrongArgCount, e.span, msg);
            }
            [arg] => {
                self.expr(x, arg);
                if !x.invalid() {
                    if call.spread {
                        let msg = format!("invalid use of ... in conversion to {}", self.type_str(t));
                        self.error_code_msg(TypeError::InvalidConversion, arg.span, msg);
                        x.mode = OperandMode::Invalid;
                    } else {
                        self.conversion(x, t);
                    }
                }
            }
            [.., last] => {
                self.use_exprs(&call.args);
                let msg = format!("too many arguments in conversion to {}", self.type_str(t));
                self.error_code_msg(TypeError::WrongArgCount, last.span, msg);
            }
        }
        x.expr = Some(e);
    }

    /// Checks the evaluated arguments `args` of `call` against the
    /// parameters of `sig`.
    fn arguments(&mut self, e: &Expr, call: &CallExpr, sig: TypeKey, args: &mut [Operand]) {
        let Some(detail) = self.otype(sig).try_as_signature() else {
            return;
        };
        let variadic = detail.variadic();
        let params: Vec<TypeKey> = detail
            .param_vars(self.objs())
            .iter()
            .map(|&v| self.lobj(v).typ().unwrap_or_else(|| self.invalid_type()))
            .collect();

        let nargs = args.len();
        let mut npars = params.len();
        let mut targets = params.clone();

        if variadic {
            if call.spread {
                // f(g()...) is not permitted for a multi-valued g().
                if call.args.len() == 1 && nargs > 1 {
                    let msg = format!(
                        "cannot use ... with {}-valued {}",
                        nargs,
                        self.expr_str(&call.args[0])
                    );
                    self.error_code_msg(TypeError::InvalidDotDotDot, e.span, msg);
                    return;
                }
            } else if nargs + 1 >= npars {
                // Each trailing argument maps to the element type of the
                // final slice parameter.
                let last = params[npars - 1];
                let elem = self
                    .otype(last)
                    .try_as_slice()
                    .map_or_else(|| self.invalid_type(), |s| s.elem());
                targets.truncate(npars - 1);
                targets.resize(nargs, elem);
                npars = nargs;
            } else {
                npars -= 1;
            }
        } else if call.spread {
            let msg = format!(
                "cannot use ... in call to non-variadic {}",
                self.expr_str(&call.func)
            );
            self.error_code_msg(TypeError::NonVariadicDotDotDot, e.span, msg);
            return;
        }

        if nargs != npars {
            let (qualifier, at) = if nargs > npars {
                ("too many", args[npars].span())
            } else if nargs > 0 {
                ("not enough", args[nargs - 1].span())
            } else {
                ("not enough", e.span)
            };
            let have: Vec<Option<TypeKey>> = args.iter().map(|a| a.typ).collect();
            let want: Vec<Option<TypeKey>> = params.iter().map(|&t| Some(t)).collect();
            let msg = format!("{} arguments in call to {}", qualifier, self.expr_str(&call.func));
            let diag = TypeError::WrongArgCount
                .at_with_message(at, msg)
                .with_note(format!("have {}", typ::types_summary(&have, false, self.objs())))
                .with_note(format!("want {}", typ::types_summary(&want, variadic, self.objs())));
            self.emit(diag);
            return;
        }

        let context = format!("argument to {}", self.expr_str(&call.func));
        for (a, &t) in args.iter_mut().zip(&targets) {
            self.assignment(a, Some(t), &context);
        }
    }
}
