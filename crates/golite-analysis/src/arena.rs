//! Append-only typed storage.
//!
//! Checker entities (objects, types, scopes, packages) are never freed
//! during a check, so a growable vector indexed by a typed `u32` key is all
//! the storage they need.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

pub trait ArenaKey: Copy + Eq + std::hash::Hash + std::fmt::Debug {
    fn from_index(idx: usize) -> Self;
    fn index(self) -> usize;
}

#[derive(Debug)]
pub struct Arena<K: ArenaKey, V> {
    items: Vec<V>,
    _key: PhantomData<K>,
}

impl<K: ArenaKey, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _key: PhantomData,
        }
    }

    #[inline]
    pub fn insert(&mut self, value: V) -> K {
        self.items.push(value);
        K::from_index(self.items.len() - 1)
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.items.get(key.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, v)| (K::from_index(i), v))
    }
}

impl<K: ArenaKey, V> Index<K> for Arena<K, V> {
    type Output = V;

    #[inline]
    fn index(&self, key: K) -> &V {
        &self.items[key.index()]
    }
}

impl<K: ArenaKey, V> IndexMut<K> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.items[key.index()]
    }
}

/// Declares `u32` newtype keys usable with `Arena`.
#[macro_export]
macro_rules! define_keys {
    ($($(#[$attr:meta])* $vis:vis struct $name:ident;)*) => {
        $(
            $(#[$attr])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            #[repr(transparent)]
            $vis struct $name(u32);

            impl $name {
                #[inline]
                pub fn raw(self) -> u32 {
                    self.0
                }
            }

            impl $crate::arena::ArenaKey for $name {
                #[inline]
                fn from_index(idx: usize) -> Self {
                    Self(idx as u32)
                }

                #[inline]
                fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}
