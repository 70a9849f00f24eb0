//! The package being checked.

use crate::objects::ScopeKey;

#[derive(Debug)]
pub struct Package {
    path: String,
    name: String,
    scope: ScopeKey,
}

impl Package {
    pub fn new(path: String, name: String, scope: ScopeKey) -> Package {
        Package { path, name, scope }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package block, directly under the universe.
    pub fn scope(&self) -> ScopeKey {
        self.scope
    }
}
