//! Identifier interning.

use std::fmt;

use string_interner::{backend::StringBackend, DefaultSymbol, StringInterner};

use crate::span::Span;

/// An interned string. Copying and comparing is a `u32` operation; use a
/// `SymbolInterner` to get the text back.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Option<DefaultSymbol>);

impl Symbol {
    /// Placeholder for nodes built without an interner.
    pub const DUMMY: Symbol = Symbol(None);

    #[inline]
    pub const fn is_dummy(self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        use string_interner::Symbol as _;
        self.0.map(|s| s.to_usize() as u32).unwrap_or(u32::MAX)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            write!(f, "Symbol(DUMMY)")
        } else {
            write!(f, "Symbol({})", self.as_u32())
        }
    }
}

/// Registry of every interned identifier.
#[derive(Clone)]
pub struct SymbolInterner {
    interner: StringInterner<StringBackend<DefaultSymbol>>,
}

impl SymbolInterner {
    pub fn new() -> Self {
        Self {
            interner: StringInterner::new(),
        }
    }

    /// Interns `string`, returning the existing symbol if it was seen before.
    #[inline]
    pub fn intern(&mut self, string: &str) -> Symbol {
        Symbol(Some(self.interner.get_or_intern(string)))
    }

    /// Looks up a string without interning it.
    #[inline]
    pub fn get(&self, string: &str) -> Option<Symbol> {
        self.interner.get(string).map(|s| Symbol(Some(s)))
    }

    /// Returns `None` for `Symbol::DUMMY` or a symbol from another interner.
    #[inline]
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        symbol.0.and_then(|s| self.interner.resolve(s))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.interner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}

impl Default for SymbolInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SymbolInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolInterner")
            .field("len", &self.interner.len())
            .finish()
    }
}

/// An identifier occurrence: the interned name plus where it was written.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Ident {
    pub symbol: Symbol,
    pub span: Span,
}

impl Ident {
    #[inline]
    pub const fn new(symbol: Symbol, span: Span) -> Self {
        Self { symbol, span }
    }

    #[inline]
    pub const fn dummy() -> Self {
        Self::new(Symbol::DUMMY, Span::dummy())
    }

    /// Resolves the identifier text, or `"<unknown>"` for a dummy.
    pub fn as_str<'a>(&self, interner: &'a SymbolInterner) -> &'a str {
        interner.resolve(self.symbol).unwrap_or("<unknown>")
    }
}
