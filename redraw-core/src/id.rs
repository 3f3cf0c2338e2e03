//! # IDs
//! Opaque handles handed out to layers (and anything else that needs one) are `ReplayID<T>`,
//! unique within this process and namespaced by the marker type `T`.
//!
//! A fresh ID comes from `Default`. IDs carry no ordering meaning, the layer stack owns order.

use std::sync::atomic::{AtomicU64, Ordering};

// Next free value per namespace.
static NAMESPACES: parking_lot::RwLock<std::collections::BTreeMap<std::any::TypeId, AtomicU64>> =
    parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// Process-unique ID. IDs of different namespaces may share a raw value but never compare equal,
/// as they are different types.
pub struct ReplayID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    _namespace: std::marker::PhantomData<fn() -> T>,
}
impl<T: std::any::Any> Clone for ReplayID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for ReplayID<T> {}
impl<T: std::any::Any> PartialEq for ReplayID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for ReplayID<T> {}
impl<T: std::any::Any> std::hash::Hash for ReplayID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: std::any::Any> ReplayID<T> {
    /// Raw numeric value. Only meaningful within one namespace and one run of the program.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id.get()
    }
    fn next() -> Self {
        let ty = std::any::TypeId::of::<T>();
        let raw = {
            let read = NAMESPACES.upgradable_read();
            if let Some(counter) = read.get(&ty) {
                counter.fetch_add(1, Ordering::Relaxed)
            } else {
                // First ID of this namespace. Rare, so take the write lock.
                let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
                let counter = write.entry(ty).or_insert_with(|| AtomicU64::new(1));
                counter.fetch_add(1, Ordering::Relaxed)
            }
        };
        // Counter starts at one and 2^64 allocations will not happen in one session.
        let id = std::num::NonZeroU64::new(raw).unwrap_or(std::num::NonZeroU64::MIN);
        Self {
            id,
            _namespace: std::marker::PhantomData,
        }
    }
}
impl<T: std::any::Any> Default for ReplayID<T> {
    fn default() -> Self {
        Self::next()
    }
}
impl<T: std::any::Any> std::fmt::Display for ReplayID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{short}#{}", self.id)
    }
}
impl<T: std::any::Any> std::fmt::Debug for ReplayID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
