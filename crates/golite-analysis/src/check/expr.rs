//! Expression evaluation.
//!
//! Every expression is evaluated into an `Operand` by `raw_expr`, which
//! also records the expression's mode and type. Untyped expressions are
//! recorded with their untyped type and updated in place once the context
//! fixes their final type.

use std::rc::Rc;

use tracing::debug;

use golite_common::symbol::Ident;
use golite_syntax::ast::{
    BasicLit, Expr, ExprKind, FuncLit, IndexExpr, SelectorExpr, TypeAssertExpr, UnaryExpr, UnaryOp,
};

use crate::constant;
use crate::lookup::{self, LookupResult};
use crate::obj::{ConstValue, EntityType};
use crate::objects::TypeKey;
use crate::operand::{Operand, OperandMode};
use crate::typ::{self, BasicType, ChanDir, Type};

use super::checker::Checker;
use super::errors::TypeError;

/// How an expression may appear in statement context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprClass {
    Conversion,
    Expression,
    /// Calls and receives, which may stand alone as statements.
    Statement,
}

/// Marks `x` invalid after an error in `e`. Erroneous expressions count as
/// statements so that no follow-up "is not used" error is reported.
fn invalid_expr<'a>(x: &mut Operand<'a>, e: &'a Expr) -> ExprClass {
    x.mode = OperandMode::Invalid;
    x.expr = Some(e);
    ExprClass::Statement
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Pos => "+",
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::Addr => "&",
        UnaryOp::Deref => "*",
    }
}

impl Checker {
    // =========================================================================
    // Entry points
    // =========================================================================

    /// Evaluates `e` into `x` and records the result. `x` may be a value,
    /// a type, or no value at all.
    pub(crate) fn raw_expr<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr) -> ExprClass {
        self.trace_expr(e);
        let class = self.expr_internal(x, e);
        self.record(x);
        self.trace_expr_end(x);
        class
    }

    /// Evaluates `e` as a single value.
    pub(crate) fn expr<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr) {
        self.raw_expr(x, e);
        self.exclude(x, false);
        self.single_value(x);
    }

    /// Evaluates `e` as a single value or a type.
    pub(crate) fn expr_or_type<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr) {
        self.raw_expr(x, e);
        self.exclude(x, true);
        self.single_value(x);
    }

    /// Evaluates `e` and returns one operand per value it produces. With
    /// `allow_comma_ok`, a comma-ok expression yields a second operand for
    /// its boolean (or `error`) result, and the flag is returned as true.
    pub(crate) fn multi_expr<'a>(&mut self, e: &'a Expr, allow_comma_ok: bool) -> (Vec<Operand<'a>>, bool) {
        let mut x = Operand::new();
        self.raw_expr(&mut x, e);
        self.exclude(&mut x, false);

        if !x.invalid() {
            if let Some(vars) = x.typ.and_then(|t| self.otype(t).try_as_tuple()).map(|t| t.vars().to_vec()) {
                let list = vars
                    .iter()
                    .map(|&v| Operand::with_expr(OperandMode::Value, e, self.lobj(v).typ()))
                    .collect();
                return (list, false);
            }
        }

        let second = match x.mode {
            OperandMode::MapIndex | OperandMode::CommaOk if allow_comma_ok => {
                Some(self.basic_type(BasicType::UntypedBool))
            }
            OperandMode::CommaErr if allow_comma_ok => Some(self.universe().error_type()),
            _ => None,
        };
        match second {
            Some(t) => (vec![x, Operand::with_expr(OperandMode::Value, e, Some(t))], true),
            None => (vec![x], false),
        }
    }

    /// Evaluates a list of expressions. A single expression may produce
    /// several values; in a longer list each must be single-valued.
    pub(crate) fn expr_list<'a>(&mut self, elist: &'a [Expr], allow_comma_ok: bool) -> (Vec<Operand<'a>>, bool) {
        match elist {
            [] => (Vec::new(), false),
            [e] => self.multi_expr(e, allow_comma_ok),
            _ => {
                let list = elist
                    .iter()
                    .map(|e| {
                        let mut x = Operand::new();
                        self.expr(&mut x, e);
                        x
                    })
                    .collect();
                (list, false)
            }
        }
    }

    /// Rejects operands without a value and, unless `allow_type`, types.
    fn exclude(&self, x: &mut Operand, allow_type: bool) {
        let (code, what) = match x.mode {
            OperandMode::NoValue if allow_type => (TypeError::TooManyValues, "used as value or type"),
            OperandMode::NoValue => (TypeError::TooManyValues, "used as value"),
            OperandMode::TypeExpr if !allow_type => (TypeError::NotAnExpr, "is not an expression"),
            _ => return,
        };
        self.error_code_msg(code, x.span(), format!("{} {}", self.op_str(x), what));
        x.set_invalid();
    }

    /// Rejects multi-valued operands.
    pub(crate) fn single_value(&self, x: &mut Operand) {
        if x.mode != OperandMode::Value {
            return;
        }
        if x.typ.map_or(false, |t| self.otype(t).try_as_tuple().is_some()) {
            self.error_code_msg(
                TypeError::TooManyValues,
                x.span(),
                format!("multiple-value {} in single-value context", self.op_str(x)),
            );
            x.set_invalid();
        }
    }

    // =========================================================================
    // Recording
    // =========================================================================

    fn record(&mut self, x: &Operand) {
        let Some(e) = x.expr else {
            return;
        };
        let (mode, t) = match &x.mode {
            OperandMode::Invalid => return,
            OperandMode::NoValue => (OperandMode::NoValue, self.universe().no_value_tuple()),
            mode => match x.typ {
                Some(t) => (mode.clone(), t),
                None => return,
            },
        };
        self.result.record_type_and_value(e.id, mode, t);
    }

    /// Replaces the recorded untyped type of `e` with `t`. Non-constant
    /// parenthesized and unary operands take on the same type.
    pub(crate) fn update_expr_type(&mut self, e: &Expr, t: TypeKey) {
        let Some(old) = self.result.types.get(&e.id) else {
            return;
        };
        if !self.is_untyped(old.typ) {
            return;
        }
        let is_const = matches!(old.mode, OperandMode::Constant(_));
        match &e.kind {
            ExprKind::Paren(inner) => self.update_expr_type(inner, t),
            ExprKind::Unary(u) if !is_const && matches!(u.op, UnaryOp::Pos | UnaryOp::Neg | UnaryOp::Not) => {
                self.update_expr_type(&u.operand, t)
            }
            _ => {}
        }
        if let Some(tv) = self.result.types.get_mut(&e.id) {
            tv.typ = t;
        }
    }

    /// Replaces the recorded value of the untyped constant `e`.
    pub(crate) fn update_expr_val(&mut self, e: &Expr, val: &ConstValue) {
        let untyped = match self.result.types.get(&e.id) {
            Some(tv) => self.is_untyped(tv.typ) && matches!(tv.mode, OperandMode::Constant(_)),
            None => false,
        };
        if let (true, Some(tv)) = (untyped, self.result.types.get_mut(&e.id)) {
            tv.mode = OperandMode::Constant(val.clone());
        }
    }

    /// Records the pair type of a comma-ok expression used in a two-value
    /// context, on `e` and every parenthesized expression inside it.
    pub(crate) fn record_comma_ok_types(&mut self, e: &Expr, a: [Option<TypeKey>; 2]) {
        let [Some(a0), Some(a1)] = a else {
            return;
        };
        let tuple = self.tc_objs.new_t_tuple_of(&[a0, a1]);
        let mut cur = e;
        loop {
            if let Some(tv) = self.result.types.get_mut(&cur.id) {
                tv.typ = tuple;
            }
            match &cur.kind {
                ExprKind::Paren(inner) => cur = inner,
                _ => break,
            }
        }
    }

    // =========================================================================
    // Expression kinds
    // =========================================================================

    fn expr_internal<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr) -> ExprClass {
        // Make sure x has a valid state in case of bailout.
        x.mode = OperandMode::Invalid;
        x.typ = Some(self.invalid_type());

        match &e.kind {
            ExprKind::Ident(ident) => {
                self.ident(x, ident);
                if x.invalid() {
                    return invalid_expr(x, e);
                }
            }
            ExprKind::IntLit(lit)
            | ExprKind::FloatLit(lit)
            | ExprKind::ImagLit(lit)
            | ExprKind::RuneLit(lit)
            | ExprKind::StringLit(lit) => {
                if !self.basic_lit(x, e, lit) {
                    return invalid_expr(x, e);
                }
            }
            ExprKind::FuncLit(lit) => self.func_lit(x, lit),
            ExprKind::Paren(inner) => {
                let class = self.raw_expr(x, inner);
                x.expr = Some(e);
                return class;
            }
            ExprKind::Selector(sel) => {
                if !self.selector(x, sel) {
                    return invalid_expr(x, e);
                }
            }
            ExprKind::Index(ie) => {
                if !self.index_expr(x, ie) {
                    return invalid_expr(x, e);
                }
            }
            ExprKind::TypeAssert(ta) => {
                if !self.type_assert(x, e, ta) {
                    return invalid_expr(x, e);
                }
            }
            ExprKind::Call(call) => return self.call(x, e, call),
            ExprKind::Receive(ch) => {
                if !self.receive(x, ch) {
                    return invalid_expr(x, e);
                }
                x.expr = Some(e);
                return ExprClass::Statement;
            }
            ExprKind::Unary(ue) => {
                if !self.unary(x, e, ue) {
                    return invalid_expr(x, e);
                }
            }
        }

        x.expr = Some(e);
        ExprClass::Expression
    }

    fn ident(&mut self, x: &mut Operand, ident: &Ident) {
        let name = self.resolve_ident(ident);
        if name == "_" {
            self.error_code_msg(TypeError::InvalidBlank, ident.span, "cannot use _ as value");
            return;
        }
        let Some(okey) = self.lookup(name) else {
            let msg = format!("undefined: {}", name);
            self.error_code_msg(TypeError::UndeclaredName, ident.span, msg);
            return;
        };
        self.result.record_use(ident, okey);

        let obj = self.lobj(okey);
        let typ = obj.typ();
        let local_var = obj.entity_type().is_var() && obj.pkg() == Some(self.pkg);
        let mode = match obj.entity_type() {
            EntityType::Const { val } => OperandMode::Constant(val.clone()),
            EntityType::TypeName => OperandMode::TypeExpr,
            EntityType::Var(_) => OperandMode::Variable,
            EntityType::Func { .. } => OperandMode::Value,
            EntityType::Nil => OperandMode::NilValue,
        };
        if local_var {
            self.lobj_mut(okey).set_var_used(true);
        }
        if self.is_invalid_type(typ) {
            return;
        }
        x.mode = mode;
        x.typ = typ;
    }

    fn basic_lit(&mut self, x: &mut Operand, e: &Expr, lit: &BasicLit) -> bool {
        let raw = self.interner.resolve(lit.raw).unwrap_or("").to_string();
        let (val, kind) = match &e.kind {
            ExprKind::IntLit(_) => (constant::int_from_literal(&raw), BasicType::UntypedInt),
            ExprKind::FloatLit(_) => (constant::float_from_literal(&raw), BasicType::UntypedFloat),
            ExprKind::ImagLit(_) => (constant::imag_from_literal(&raw), BasicType::UntypedComplex),
            ExprKind::RuneLit(_) => (constant::rune_from_literal(&raw), BasicType::UntypedRune),
            _ => (constant::string_from_literal(&raw), BasicType::UntypedString),
        };
        if val.is_unknown() {
            self.error_code_msg(TypeError::InvalidConstVal, e.span, format!("malformed constant: {}", raw));
            return false;
        }
        x.mode = OperandMode::Constant(val);
        x.typ = Some(self.basic_type(kind));
        true
    }

    fn func_lit(&mut self, x: &mut Operand, lit: &Rc<FuncLit>) {
        let (sig, scope) = self.func_type(&lit.sig);
        let lit = Rc::clone(lit);
        // The body may refer to variables declared by the enclosing
        // statement, so it is checked once that statement is done.
        self.later(Box::new(move |c: &mut Checker| {
            c.func_body("<function literal>", sig, scope, &lit.body);
        }));
        x.mode = OperandMode::Value;
        x.typ = Some(sig);
    }

    fn selector<'a>(&mut self, x: &mut Operand<'a>, sel: &'a SelectorExpr) -> bool {
        self.expr(x, &sel.expr);
        if x.invalid() {
            return false;
        }
        let Some(base) = x.typ else {
            return false;
        };
        let name = self.resolve_ident(&sel.sel).to_string();
        let addressable = x.mode == OperandMode::Variable;

        match lookup::lookup_field_or_method(base, addressable, &name, self.objs()) {
            LookupResult::Entry(okey, _, indirect) => {
                self.result.record_use(&sel.sel, okey);
                let obj = self.lobj(okey);
                let t = obj.typ();
                if obj.entity_type().is_var() {
                    x.mode = if x.mode == OperandMode::Variable || indirect {
                        OperandMode::Variable
                    } else {
                        OperandMode::Value
                    };
                } else {
                    x.mode = OperandMode::Value;
                }
                x.typ = t;
                true
            }
            _ if typ::is_invalid(self.underlying(base), self.objs()) => false,
            LookupResult::Ambiguous(_) => {
                let msg = format!("ambiguous selector {}.{}", x.expr_string(&self.interner), name);
                self.error_code_msg(TypeError::AmbiguousSelector, sel.sel.span, msg);
                false
            }
            LookupResult::BadMethodReceiver => {
                let msg = format!("cannot call pointer method {} on {}", name, self.type_str(base));
                self.error_code_msg(TypeError::InvalidMethodExpr, sel.sel.span, msg);
                false
            }
            LookupResult::NotFound => {
                let why = if self.is_interface_ptr(base) {
                    format!("type {} is pointer to interface, not interface", self.type_str(base))
                } else {
                    format!("type {} has no field or method {}", self.type_str(base), name)
                };
                let msg = format!("{}.{} undefined ({})", x.expr_string(&self.interner), name, why);
                self.error_code_msg(TypeError::MissingFieldOrMethod, sel.sel.span, msg);
                false
            }
        }
    }

    fn index_expr<'a>(&mut self, x: &mut Operand<'a>, ie: &'a IndexExpr) -> bool {
        self.expr(x, &ie.expr);
        if x.invalid() {
            self.use_exprs(std::slice::from_ref(&ie.index));
            return false;
        }
        let base = x.typ.unwrap_or_else(|| self.invalid_type());

        let mut valid = false;
        let mut length: Option<u64> = None;
        match self.otype(self.underlying(base)) {
            Type::Basic(_) if typ::is_string(base, self.objs()) => {
                valid = true;
                if let OperandMode::Constant(ConstValue::Str(s)) = &x.mode {
                    length = Some(s.len() as u64);
                }
                // Indexing a string yields a byte value, even for constants.
                x.mode = OperandMode::Value;
                x.typ = Some(self.universe().byte());
            }
            Type::Array(detail) => {
                valid = true;
                length = Some(detail.len());
                if x.mode != OperandMode::Variable {
                    x.mode = OperandMode::Value;
                }
                x.typ = Some(detail.elem());
            }
            Type::Pointer(detail) => {
                if let Some(arr) = self.otype(self.underlying(detail.base())).try_as_array() {
                    valid = true;
                    length = Some(arr.len());
                    x.mode = OperandMode::Variable;
                    x.typ = Some(arr.elem());
                }
            }
            Type::Slice(detail) => {
                valid = true;
                x.mode = OperandMode::Variable;
                x.typ = Some(detail.elem());
            }
            Type::Map(detail) => {
                let (key, elem) = (detail.key(), detail.elem());
                let mut k = Operand::new();
                self.expr(&mut k, &ie.index);
                self.assignment(&mut k, Some(key), "map index");
                // The element type is known even if the key is bad.
                x.mode = OperandMode::MapIndex;
                x.typ = Some(elem);
                return true;
            }
            _ => {}
        }

        if !valid {
            self.invalid_op(
                TypeError::NonIndexableOperand,
                x.span(),
                format!("cannot index {}", self.op_str(x)),
            );
            self.use_exprs(std::slice::from_ref(&ie.index));
            return false;
        }

        self.index(&ie.index, length);
        true
    }

    /// Checks an index against an optional length.
    fn index(&mut self, index: &Expr, max: Option<u64>) {
        let mut x = Operand::new();
        self.expr(&mut x, index);
        if !self.is_valid_index(&mut x) {
            return;
        }
        let OperandMode::Constant(val) = &x.mode else {
            return;
        };
        if val.is_unknown() {
            return;
        }
        let (v, _) = constant::int64_val(val);
        if let Some(max) = max {
            if v >= 0 && v as u64 >= max {
                self.invalid_arg(
                    TypeError::InvalidIndex,
                    x.span(),
                    format!("index {} out of bounds [0:{}]", val, max),
                );
            }
        }
    }

    fn is_valid_index(&mut self, x: &mut Operand) -> bool {
        // An untyped constant index is given type int.
        let int = self.basic_type(BasicType::Int);
        self.convert_untyped(x, int);
        if x.invalid() {
            return false;
        }
        if !x.typ.map_or(false, |t| typ::is_integer(t, self.objs())) {
            self.invalid_arg(
                TypeError::InvalidIndex,
                x.span(),
                format!("index {} must be integer", self.op_str(x)),
            );
            return false;
        }
        if let OperandMode::Constant(val) = &x.mode {
            if constant::sign(val) < 0 {
                self.invalid_arg(
                    TypeError::InvalidIndex,
                    x.span(),
                    format!("index {} must not be negative", self.op_str(x)),
                );
                return false;
            }
            let fits = self
                .otype(int)
                .try_as_basic()
                .map_or(false, |b| val.representable(b, None));
            if !fits {
                self.invalid_arg(
                    TypeError::InvalidIndex,
                    x.span(),
                    format!("index {} overflows int", self.op_str(x)),
                );
                return false;
            }
        }
        true
    }

    fn type_assert<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr, ta: &'a TypeAssertExpr) -> bool {
        self.expr(x, &ta.expr);
        if x.invalid() {
            return false;
        }
        let Some(xt) = x.typ else {
            return false;
        };
        if typ::is_type_param(xt, self.objs()) {
            self.invalid_op(
                TypeError::InvalidAssert,
                x.span(),
                format!("cannot use type assertion on type parameter value {}", self.op_str(x)),
            );
            return false;
        }
        if !typ::is_interface(xt, self.objs()) {
            self.invalid_op(
                TypeError::InvalidAssert,
                x.span(),
                format!("{} is not an interface", self.op_str(x)),
            );
            return false;
        }
        let t = self.typexpr(&ta.ty);
        if typ::is_invalid(t, self.objs()) {
            return false;
        }
        if let Some(missing) = lookup::assertable_to(xt, t, self.objs()) {
            debug!(target_type = %self.type_str(t), "impossible type assertion");
            let msg = format!(
                "impossible type assertion: {}\n\t{} does not implement {} {}",
                self.expr_str(e),
                self.type_str(t),
                self.type_str(xt),
                self.missing_method_cause(t, &missing)
            );
            self.error_code_msg(TypeError::ImpossibleAssert, e.span, msg);
            return false;
        }
        x.mode = OperandMode::CommaOk;
        x.typ = Some(t);
        true
    }

    fn receive<'a>(&mut self, x: &mut Operand<'a>, ch: &'a Expr) -> bool {
        self.expr(x, ch);
        if x.invalid() {
            return false;
        }
        let u = self.underlying(x.typ.unwrap_or_else(|| self.invalid_type()));
        let Some(detail) = self.otype(u).try_as_chan() else {
            self.invalid_op(
                TypeError::InvalidReceive,
                x.span(),
                format!("cannot receive from non-channel {}", self.op_str(x)),
            );
            return false;
        };
        if detail.dir() == ChanDir::SendOnly {
            self.invalid_op(
                TypeError::InvalidReceive,
                x.span(),
                format!("cannot receive from send-only channel {}", self.op_str(x)),
            );
            return false;
        }
        x.mode = OperandMode::CommaOk;
        x.typ = Some(detail.elem());
        true
    }

    fn unary<'a>(&mut self, x: &mut Operand<'a>, e: &'a Expr, ue: &'a UnaryExpr) -> bool {
        if ue.op == UnaryOp::Deref {
            return self.indirection(x, &ue.operand);
        }

        self.expr(x, &ue.operand);
        if x.invalid() {
            return false;
        }
        let Some(xt) = x.typ else {
            return false;
        };

        if ue.op == UnaryOp::Addr {
            if x.mode != OperandMode::Variable {
                self.invalid_op(
                    TypeError::UnaddressableOperand,
                    x.span(),
                    format!("cannot take address of {}", self.op_str(x)),
                );
                return false;
            }
            x.mode = OperandMode::Value;
            x.typ = Some(self.tc_objs.new_t_pointer(xt));
            return true;
        }

        let defined = match ue.op {
            UnaryOp::Not => typ::is_boolean(xt, self.objs()),
            _ => typ::is_numeric(xt, self.objs()),
        };
        if !defined {
            self.invalid_op(
                TypeError::UndefinedOp,
                x.span(),
                format!("operator {} not defined on {}", unary_op_str(ue.op), self.op_str(x)),
            );
            return false;
        }

        if let OperandMode::Constant(val) = &x.mode {
            if val.is_unknown() {
                return true;
            }
            let folded = constant::unary_op(ue.op, val);
            x.mode = OperandMode::Constant(folded);
            x.expr = Some(e);
            // A typed constant result must fit its type.
            if typ::is_typed(xt, self.objs()) {
                let u = self.underlying(xt);
                self.representable(x, u);
                return !x.invalid();
            }
            return true;
        }

        x.mode = OperandMode::Value;
        true
    }

    /// `*x`: a pointer dereference, or a pointer type if `x` is a type.
    fn indirection<'a>(&mut self, x: &mut Operand<'a>, operand: &'a Expr) -> bool {
        self.expr_or_type(x, operand);
        match x.mode {
            OperandMode::Invalid => false,
            OperandMode::TypeExpr => {
                let base = x.typ.unwrap_or_else(|| self.invalid_type());
                x.typ = Some(self.tc_objs.new_t_pointer(base));
                true
            }
            _ => {
                let u = self.underlying(x.typ.unwrap_or_else(|| self.invalid_type()));
                match self.otype(u).try_as_pointer() {
                    Some(p) => {
                        x.mode = OperandMode::Variable;
                        x.typ = Some(p.base());
                        true
                    }
                    None => {
                        self.invalid_op(
                            TypeError::InvalidIndirection,
                            x.span(),
                            format!("cannot indirect {}", self.op_str(x)),
                        );
                        false
                    }
                }
            }
        }
    }
}
