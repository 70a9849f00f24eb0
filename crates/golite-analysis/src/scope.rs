//! Lexical scopes.
//!
//! A scope maps names to objects and links to its enclosing scope. Objects
//! are inserted when their scope begins, so a plain parent walk sees
//! exactly the names visible at the current point of the check.

use std::collections::HashMap;
use std::fmt;

use golite_common::span::BytePos;

use crate::objects::{ObjKey, ScopeKey, TCObjects};

#[derive(Debug)]
pub struct Scope {
    parent: Option<ScopeKey>,
    children: Vec<ScopeKey>,
    elems: HashMap<String, ObjKey>,
    pos: BytePos,
    end: BytePos,
    comment: String,
    is_func: bool,
}

impl Scope {
    pub fn new(parent: Option<ScopeKey>, pos: BytePos, end: BytePos, comment: &str) -> Scope {
        Scope {
            parent,
            children: Vec::new(),
            elems: HashMap::new(),
            pos,
            end,
            comment: comment.to_string(),
            is_func: false,
        }
    }

    pub fn new_func(parent: Option<ScopeKey>, pos: BytePos, end: BytePos) -> Scope {
        let mut scope = Scope::new(parent, pos, end, "function");
        scope.is_func = true;
        scope
    }

    pub fn parent(&self) -> Option<ScopeKey> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeKey] {
        &self.children
    }

    pub fn pos(&self) -> BytePos {
        self.pos
    }

    pub fn end(&self) -> BytePos {
        self.end
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn is_func(&self) -> bool {
        self.is_func
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn add_child(&mut self, child: ScopeKey) {
        self.children.push(child);
    }

    /// Looks up a name in this scope only.
    pub fn lookup(&self, name: &str) -> Option<ObjKey> {
        self.elems.get(name).copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjKey> + '_ {
        self.elems.values().copied()
    }

    /// Adds `okey` under `name` unless the name is taken, in which case the
    /// existing object is returned and the scope is unchanged.
    pub(crate) fn insert_elem(&mut self, name: &str, okey: ObjKey) -> Option<ObjKey> {
        if let Some(&existing) = self.elems.get(name) {
            return Some(existing);
        }
        self.elems.insert(name.to_string(), okey);
        None
    }

    /// Inserts an object into the scope `self_key`. On a name clash the
    /// existing object is returned; otherwise the object's parent is set if
    /// it had none.
    pub fn insert(self_key: ScopeKey, okey: ObjKey, objs: &mut TCObjects) -> Option<ObjKey> {
        let name = objs.lobjs[okey].name().to_string();
        if let Some(existing) = objs.scopes[self_key].insert_elem(&name, okey) {
            return Some(existing);
        }
        if objs.lobjs[okey].parent().is_none() {
            objs.lobjs[okey].set_parent(Some(self_key));
        }
        None
    }
}

/// Looks a name up from `start` outward.
pub fn lookup_parent(start: ScopeKey, name: &str, objs: &TCObjects) -> Option<(ScopeKey, ObjKey)> {
    let mut current = Some(start);
    while let Some(scope_key) = current {
        let scope = &objs.scopes[scope_key];
        if let Some(obj) = scope.lookup(name) {
            return Some((scope_key, obj));
        }
        current = scope.parent();
    }
    None
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} scope", self.comment)?;
        let mut names: Vec<_> = self.elems.keys().collect();
        names.sort();
        for name in names {
            writeln!(f, ".  {}", name)?;
        }
        Ok(())
    }
}
