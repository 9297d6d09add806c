//! Specialized collection types

use std::marker::PhantomData;

pub use slotmap::{SlotMap, DefaultKey};

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<DefaultKey, T>;

/// Typed handle for type-safe asset references
///
/// The phantom parameter only tags the handle; it does not require `T` to be
/// `Copy` or `Eq` for the handle itself to be.
pub struct TypedHandle<T> {
    key: DefaultKey,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TypedHandle<T> {
    /// Create a new typed handle from a key
    pub fn new(key: DefaultKey) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying key
    pub fn key(&self) -> DefaultKey {
        self.key
    }
}

impl<T> Clone for TypedHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedHandle<T> {}

impl<T> PartialEq for TypedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for TypedHandle<T> {}

impl<T> std::hash::Hash for TypedHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> std::fmt::Debug for TypedHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedHandle").field(&self.key).finish()
    }
}
