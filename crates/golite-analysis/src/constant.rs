//! Compile-time constant values.
//!
//! Values follow the untyped constant model of the language:
//! - integers are `i64` when they fit and `BigInt` otherwise
//! - decimal floating literals are kept as exact rationals; values whose
//!   numerator or denominator grow too large degrade to `f64`
//! - complex values pair two real values
//!
//! Constants never carry a type; whether a value fits a given basic type is
//! answered by [`Value::representable`].

use std::fmt;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{Num, Signed, ToPrimitive, Zero};

use golite_syntax::ast::UnaryOp;

use crate::typ::{BasicDetail, BasicInfo, BasicType};

/// Largest exponent (in bits or decimal digits) kept in exact form.
const MAX_EXP: usize = 4 << 10;

/// Longest rendered string constant, quotes included.
const MAX_QUOTED_LEN: usize = 72;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Unknown,
    Bool,
    String,
    Int,
    Float,
    Complex,
}

#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The value of an erroneous or not-yet-known constant.
    #[default]
    Unknown,
    Bool(bool),
    Str(String),
    Int64(i64),
    IntBig(BigInt),
    Rat(BigRational),
    Float(f64),
    /// Real and imaginary parts; each is an Int or Float value.
    Complex(Box<Value>, Box<Value>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Unknown => Kind::Unknown,
            Value::Bool(_) => Kind::Bool,
            Value::Str(_) => Kind::String,
            Value::Int64(_) | Value::IntBig(_) => Kind::Int,
            Value::Rat(_) | Value::Float(_) => Kind::Float,
            Value::Complex(..) => Kind::Complex,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    fn is_numeric(&self) -> bool {
        matches!(self.kind(), Kind::Int | Kind::Float | Kind::Complex)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unknown, Value::Unknown) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Complex(ar, ai), Value::Complex(br, bi)) => ar == br && ai == bi,
            (a, b) if a.is_numeric() && b.is_numeric() => {
                if a.kind() == Kind::Complex || b.kind() == Kind::Complex {
                    return to_complex(a) == to_complex(b);
                }
                match (exact_rat(a), exact_rat(b)) {
                    (Some(x), Some(y)) => x == y,
                    _ => float64_val(a).0 == float64_val(b).0,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unknown => f.write_str("unknown"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(&quote_short(s)),
            Value::Int64(i) => write!(f, "{}", i),
            Value::IntBig(i) => write!(f, "{}", i),
            Value::Rat(_) | Value::Float(_) => f.write_str(&fmt_float(self)),
            Value::Complex(re, im) => write!(f, "({} + {}i)", re, im),
        }
    }
}

// ----------------------------------------------------------------------------
// Construction

fn small_int(x: &BigInt) -> bool {
    x.bits() < MAX_EXP as u64
}

fn big_to_f64(x: &BigInt) -> f64 {
    x.to_f64().unwrap_or(f64::INFINITY)
}

fn rat_to_f64(x: &BigRational) -> f64 {
    match x.to_f64() {
        Some(f) => f,
        None => {
            let num = big_to_f64(x.numer());
            let den = big_to_f64(x.denom());
            num / den
        }
    }
}

pub fn make_string(s: String) -> Value {
    Value::Str(s)
}

/// Non-finite inputs yield `Unknown`; `-0.0` becomes `0`.
pub fn make_float64(x: f64) -> Value {
    if !x.is_finite() {
        return Value::Unknown;
    }
    let x = if x == 0.0 { 0.0 } else { x };
    match BigRational::from_float(x) {
        Some(r) => make_rat(r),
        None => Value::Float(x),
    }
}

pub fn make_imag(x: Value) -> Value {
    match x.kind() {
        Kind::Unknown => Value::Unknown,
        Kind::Int | Kind::Float => Value::Complex(Box::new(Value::Int64(0)), Box::new(x)),
        _ => Value::Unknown,
    }
}

fn make_int(x: BigInt) -> Value {
    match x.to_i64() {
        Some(i) => Value::Int64(i),
        None => Value::IntBig(x),
    }
}

fn make_rat(x: BigRational) -> Value {
    if small_int(x.numer()) && small_int(x.denom()) {
        Value::Rat(x)
    } else {
        make_float(rat_to_f64(&x))
    }
}

fn make_float(x: f64) -> Value {
    if !x.is_finite() {
        return Value::Unknown;
    }
    Value::Float(if x == 0.0 { 0.0 } else { x })
}

// ----------------------------------------------------------------------------
// Literals

/// Parses an integer literal: decimal, `0x`, `0o`, `0b` or legacy `0` octal,
/// with optional `_` separators.
pub fn int_from_literal(lit: &str) -> Value {
    let lit = lit.replace('_', "");
    let (digits, radix) = split_radix(&lit);
    if digits.is_empty() {
        return Value::Unknown;
    }
    if let Ok(i) = i64::from_str_radix(digits, radix) {
        return Value::Int64(i);
    }
    match BigInt::from_str_radix(digits, radix) {
        Ok(x) => make_int(x),
        Err(_) => Value::Unknown,
    }
}

fn split_radix(lit: &str) -> (&str, u32) {
    let bytes = lit.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (&lit[2..], 16),
            b'o' | b'O' => return (&lit[2..], 8),
            b'b' | b'B' => return (&lit[2..], 2),
            _ => return (&lit[1..], 8),
        }
    }
    (lit, 10)
}

/// Parses a decimal floating literal exactly. Hexadecimal mantissas fall
/// back to `f64`.
pub fn float_from_literal(lit: &str) -> Value {
    let lit = lit.replace('_', "");
    if lit.starts_with("0x") || lit.starts_with("0X") {
        return match parse_hex_float(&lit[2..]) {
            Some(f) => make_float64(f),
            None => Value::Unknown,
        };
    }
    match parse_decimal(&lit) {
        Some(r) => make_rat(r),
        None => Value::Unknown,
    }
}

fn parse_decimal(lit: &str) -> Option<BigRational> {
    let (mant, exp) = match lit.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&lit[..i], lit[i + 1..].parse::<i64>().ok()?),
        None => (lit, 0),
    };
    let (int_part, frac_part) = mant.split_once('.').unwrap_or((mant, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let digits = format!("{}{}", int_part, frac_part);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let numer = BigInt::from_str_radix(&digits, 10).ok()?;
    let scale = exp - frac_part.len() as i64;
    if scale.unsigned_abs() as usize > MAX_EXP {
        return BigRational::from_float(lit.parse::<f64>().ok()?.min(f64::MAX));
    }
    let ten = BigInt::from(10);
    let pow = num_traits::pow(ten, scale.unsigned_abs() as usize);
    Some(if scale >= 0 {
        BigRational::from_integer(numer * pow)
    } else {
        BigRational::new(numer, pow)
    })
}

fn parse_hex_float(body: &str) -> Option<f64> {
    let (mant, exp) = match body.find(|c: char| c == 'p' || c == 'P') {
        Some(i) => (&body[..i], body[i + 1..].parse::<i32>().ok()?),
        None => (body, 0),
    };
    let (int_part, frac_part) = mant.split_once('.').unwrap_or((mant, ""));
    let mut value = 0f64;
    for c in int_part.chars().chain(frac_part.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let shift = exp - 4 * frac_part.len() as i32;
    Some(value * 2f64.powi(shift))
}

/// Parses an imaginary literal such as `2i` or `1.5e3i`.
pub fn imag_from_literal(lit: &str) -> Value {
    let Some(body) = lit.strip_suffix('i') else {
        return Value::Unknown;
    };
    let is_int = body.bytes().all(|b| b.is_ascii_digit() || b == b'_');
    let v = if is_int {
        // A leading zero does not mean octal here.
        int_from_literal(body.trim_start_matches('0')).or_zero()
    } else {
        float_from_literal(body)
    };
    make_imag(v)
}

impl Value {
    fn or_zero(self) -> Value {
        match self {
            Value::Unknown => Value::Int64(0),
            v => v,
        }
    }
}

/// Parses a quoted rune literal to its code point.
pub fn rune_from_literal(lit: &str) -> Value {
    let Some(body) = lit.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) else {
        return Value::Unknown;
    };
    let mut out = Vec::new();
    let mut chars = body.chars().peekable();
    let code = match chars.next() {
        Some('\\') => match unescape(&mut chars, '\'', &mut out) {
            Some(Some(c)) => c as i64,
            Some(None) if out.len() == 1 => i64::from(out[0]),
            _ => return Value::Unknown,
        },
        Some(c) => c as i64,
        None => return Value::Unknown,
    };
    if chars.next().is_some() {
        return Value::Unknown;
    }
    Value::Int64(code)
}

/// Parses an interpreted (`"..."`) or raw (`` `...` ``) string literal.
pub fn string_from_literal(lit: &str) -> Value {
    if let Some(raw) = lit.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return Value::Str(raw.replace('\r', ""));
    }
    let Some(body) = lit.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return Value::Unknown;
    };
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match unescape(&mut chars, '"', &mut out) {
            Some(Some(c)) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            Some(None) => {}
            None => return Value::Unknown,
        }
    }
    Value::Str(String::from_utf8_lossy(&out).into_owned())
}

/// Decodes one escape sequence after the backslash. Character escapes are
/// returned; byte escapes (`\x`, octal) are pushed to `bytes` instead.
fn unescape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
    bytes: &mut Vec<u8>,
) -> Option<Option<char>> {
    let c = chars.next()?;
    let simple = match c {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0B}'),
        '\\' => Some('\\'),
        c if c == quote => Some(c),
        _ => None,
    };
    if simple.is_some() {
        return Some(simple);
    }
    let mut take = |n: usize, radix: u32| -> Option<u32> {
        let mut v = 0u32;
        for _ in 0..n {
            v = v.checked_mul(radix)?.checked_add(chars.next()?.to_digit(radix)?)?;
        }
        Some(v)
    };
    match c {
        'x' => {
            bytes.push(take(2, 16)? as u8);
            Some(None)
        }
        'u' => char::from_u32(take(4, 16)?).map(Some),
        'U' => char::from_u32(take(8, 16)?).map(Some),
        '0'..='7' => {
            let rest = take(2, 8)?;
            let v = (c as u32 - '0' as u32) * 64 + rest;
            if v > 255 {
                return None;
            }
            bytes.push(v as u8);
            Some(None)
        }
        _ => None,
    }
}

// ----------------------------------------------------------------------------
// Accessors

/// Returns the `i64` value of an Int and whether it is exact.
pub fn int64_val(x: &Value) -> (i64, bool) {
    match x {
        Value::Int64(i) => (*i, true),
        Value::IntBig(i) => match i.to_i64() {
            Some(v) => (v, true),
            None => (0, false),
        },
        _ => (0, false),
    }
}

/// Returns the nearest `f64` of a real numeric value and whether it is exact.
pub fn float64_val(x: &Value) -> (f64, bool) {
    match x {
        Value::Int64(i) => {
            let f = *i as f64;
            (f, f as i64 == *i)
        }
        Value::IntBig(i) => (big_to_f64(i), false),
        Value::Rat(r) => {
            let f = rat_to_f64(r);
            let exact = BigRational::from_float(f).map_or(false, |r2| r2 == *r);
            (f, exact)
        }
        Value::Float(f) => (*f, true),
        _ => (0.0, false),
    }
}

/// `-1`, `0` or `1`; Unknown reports `1`.
pub fn sign(x: &Value) -> i32 {
    match x {
        Value::Int64(i) => i.signum() as i32,
        Value::IntBig(i) => match i.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        },
        Value::Rat(r) => {
            if r.is_negative() {
                -1
            } else if r.is_zero() {
                0
            } else {
                1
            }
        }
        Value::Float(f) => {
            if *f < 0.0 {
                -1
            } else if *f > 0.0 {
                1
            } else {
                0
            }
        }
        Value::Complex(re, im) => sign(re) | sign(im),
        _ => 1,
    }
}

fn exact_rat(x: &Value) -> Option<BigRational> {
    match x {
        Value::Int64(i) => Some(BigRational::from_integer(BigInt::from(*i))),
        Value::IntBig(i) => Some(BigRational::from_integer(i.clone())),
        Value::Rat(r) => Some(r.clone()),
        _ => None,
    }
}

// ----------------------------------------------------------------------------
// Conversions

/// The value as an Int if it is integral, else Unknown.
pub fn to_int(x: &Value) -> Value {
    match x {
        Value::Int64(_) | Value::IntBig(_) => x.clone(),
        Value::Rat(r) if r.is_integer() => make_int(r.numer().clone()),
        Value::Float(f) if f.fract() == 0.0 => match BigRational::from_float(*f) {
            Some(r) => make_int(r.to_integer()),
            None => Value::Unknown,
        },
        Value::Complex(re, im) if sign(im) == 0 => to_int(re),
        _ => Value::Unknown,
    }
}

/// The value as a Float if it is real, else Unknown.
pub fn to_float(x: &Value) -> Value {
    match x {
        Value::Int64(i) => Value::Rat(BigRational::from_integer(BigInt::from(*i))),
        Value::IntBig(i) if small_int(i) => Value::Rat(BigRational::from_integer(i.clone())),
        Value::IntBig(i) => make_float(big_to_f64(i)),
        Value::Rat(_) | Value::Float(_) => x.clone(),
        Value::Complex(re, im) if sign(im) == 0 => to_float(re),
        _ => Value::Unknown,
    }
}

/// The value as a Complex if it is numeric, else Unknown.
pub fn to_complex(x: &Value) -> Value {
    match x {
        Value::Int64(_) | Value::IntBig(_) | Value::Rat(_) | Value::Float(_) => {
            Value::Complex(Box::new(x.clone()), Box::new(Value::Int64(0)))
        }
        Value::Complex(..) => x.clone(),
        _ => Value::Unknown,
    }
}

// ----------------------------------------------------------------------------
// Operations

/// Folds `op y` for the value operators `+`, `-` and `!`.
pub fn unary_op(op: UnaryOp, y: &Value) -> Value {
    match (op, y) {
        (_, Value::Unknown) => Value::Unknown,
        (UnaryOp::Pos, v) if v.is_numeric() => v.clone(),
        (UnaryOp::Neg, Value::Int64(i)) => match i.checked_neg() {
            Some(n) => Value::Int64(n),
            None => make_int(-BigInt::from(*i)),
        },
        (UnaryOp::Neg, Value::IntBig(i)) => make_int(-i),
        (UnaryOp::Neg, Value::Rat(r)) => make_rat(-r),
        (UnaryOp::Neg, Value::Float(f)) => make_float(-f),
        (UnaryOp::Neg, Value::Complex(re, im)) => Value::Complex(
            Box::new(unary_op(UnaryOp::Neg, re)),
            Box::new(unary_op(UnaryOp::Neg, im)),
        ),
        (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
        _ => Value::Unknown,
    }
}

// ----------------------------------------------------------------------------
// Representability

impl Value {
    /// Reports whether the value fits `base`. When it does and `rounded` is
    /// given, the value as stored for that type is written to it.
    pub fn representable(&self, base: &BasicDetail, rounded: Option<&mut Value>) -> bool {
        if self.is_unknown() {
            return true;
        }
        match base.info() {
            BasicInfo::IsInteger => {
                let x = to_int(self);
                let fits = match &x {
                    Value::Int64(i) => int_fits(*i, base.typ()),
                    Value::IntBig(i) => big_fits(i, base.typ()),
                    _ => return false,
                };
                if fits {
                    if let Some(r) = rounded {
                        *r = x;
                    }
                }
                fits
            }
            BasicInfo::IsFloat => {
                let x = to_float(self);
                if x.kind() != Kind::Float {
                    return false;
                }
                match round_float(&x, base.typ()) {
                    Some(v) => {
                        if let Some(r) = rounded {
                            *r = v;
                        }
                        true
                    }
                    None => false,
                }
            }
            BasicInfo::IsComplex => {
                let Value::Complex(re, im) = to_complex(self) else {
                    return false;
                };
                let part = match base.typ() {
                    BasicType::Complex64 => BasicType::Float32,
                    BasicType::Complex128 => BasicType::Float64,
                    _ => BasicType::UntypedFloat,
                };
                match (round_float(&to_float(&re), part), round_float(&to_float(&im), part)) {
                    (Some(re), Some(im)) => {
                        if let Some(r) = rounded {
                            *r = Value::Complex(Box::new(re), Box::new(im));
                        }
                        true
                    }
                    _ => false,
                }
            }
            BasicInfo::IsBoolean => matches!(self, Value::Bool(_)),
            BasicInfo::IsString => matches!(self, Value::Str(_)),
            BasicInfo::IsInvalid | BasicInfo::IsNil => false,
        }
    }
}

fn int_fits(i: i64, typ: BasicType) -> bool {
    match typ {
        BasicType::Int8 => i8::try_from(i).is_ok(),
        BasicType::Int16 => i16::try_from(i).is_ok(),
        BasicType::Int32 | BasicType::Rune => i32::try_from(i).is_ok(),
        BasicType::Int | BasicType::Int64 => true,
        BasicType::Uint8 | BasicType::Byte => u8::try_from(i).is_ok(),
        BasicType::Uint16 => u16::try_from(i).is_ok(),
        BasicType::Uint32 => u32::try_from(i).is_ok(),
        BasicType::Uint | BasicType::Uint64 | BasicType::Uintptr => i >= 0,
        BasicType::UntypedInt | BasicType::UntypedRune => true,
        _ => false,
    }
}

fn big_fits(i: &BigInt, typ: BasicType) -> bool {
    match typ {
        BasicType::Uint | BasicType::Uint64 | BasicType::Uintptr => i.to_u64().is_some(),
        BasicType::UntypedInt | BasicType::UntypedRune => true,
        // Every other sized integer is covered by the `i64` path.
        _ => false,
    }
}

/// Rounds a Float value to the precision of `typ`; `None` on overflow.
fn round_float(x: &Value, typ: BasicType) -> Option<Value> {
    if x.kind() != Kind::Float {
        return None;
    }
    match typ {
        BasicType::Float32 => {
            let (f, _) = float64_val(x);
            let r = f as f32;
            if r.is_infinite() {
                None
            } else {
                Some(make_float64(f64::from(r)))
            }
        }
        BasicType::Float64 => {
            let (f, _) = float64_val(x);
            if f.is_infinite() {
                None
            } else {
                Some(x.clone())
            }
        }
        BasicType::UntypedFloat => Some(x.clone()),
        _ => None,
    }
}

// ----------------------------------------------------------------------------
// Formatting

fn quote_short(s: &str) -> String {
    let quoted = format!("{:?}", s);
    if quoted.chars().count() <= MAX_QUOTED_LEN {
        return quoted;
    }
    let head: String = quoted.chars().take(MAX_QUOTED_LEN - 3).collect();
    format!("{}...", head)
}

/// Six significant digits, switching to exponent form outside
/// `[1e-4, 1e6)`. A non-integral value that would print without a decimal
/// point is printed in full instead.
fn fmt_float(x: &Value) -> String {
    let (f, _) = float64_val(x);
    let s = fmt_g6(f);
    let integral = match x {
        Value::Rat(r) => r.is_integer(),
        _ => f.fract() == 0.0,
    };
    if !integral && !s.contains('.') && !s.contains('e') {
        return format!("{}", f);
    }
    s
}

fn fmt_g6(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:.5e}", f);
    let Some((mant, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mant), sign, exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, f)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
