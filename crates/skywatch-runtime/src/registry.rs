#![forbid(unsafe_code)]

//! Ordered, identity-unique collection of dependent handles.
//!
//! # Invariants
//!
//! 1. Entries keep insertion order.
//! 2. A [`DependentId`] appears at most once.
//! 3. [`snapshot`](Registry::snapshot) returns an owned copy; later
//!    mutations never affect a snapshot already taken.

use crate::dependent::DependentId;

/// Registry generic over the handle type so both station flavours share it.
#[derive(Debug)]
pub struct Registry<H> {
    entries: Vec<(DependentId, H)>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> Registry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handle` under `id`. Returns `false` (and drops `handle`) if
    /// `id` is already registered.
    pub fn insert(&mut self, id: DependentId, handle: H) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push((id, handle));
        true
    }

    /// Remove `id`. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: DependentId) -> bool {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: DependentId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identities in attachment order.
    #[must_use]
    pub fn ids(&self) -> Vec<DependentId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }
}

impl<H: Clone> Registry<H> {
    /// Owned copy of the current entries, in attachment order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(DependentId, H)> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ids(n: usize) -> (Vec<Rc<RefCell<u8>>>, Vec<DependentId>) {
        let handles: Vec<_> = (0..n).map(|_| Rc::new(RefCell::new(0u8))).collect();
        let ids = handles.iter().map(DependentId::of).collect();
        (handles, ids)
    }

    #[test]
    fn preserves_insertion_order() {
        let (_handles, ids) = ids(3);
        let mut registry = Registry::new();
        for (i, id) in ids.iter().enumerate() {
            assert!(registry.insert(*id, i));
        }
        assert_eq!(registry.ids(), ids);
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let (_handles, ids) = ids(1);
        let mut registry = Registry::new();
        assert!(registry.insert(ids[0], "first"));
        assert!(!registry.insert(ids[0], "second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot()[0].1, "first");
    }

    #[test]
    fn remove_unknown_is_noop() {
        let (_handles, ids) = ids(2);
        let mut registry = Registry::new();
        registry.insert(ids[0], ());
        assert!(!registry.remove(ids[1]));
        assert_eq!(registry.ids(), vec![ids[0]]);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let (_handles, ids) = ids(3);
        let mut registry = Registry::new();
        for id in &ids {
            registry.insert(*id, ());
        }
        assert!(registry.remove(ids[1]));
        assert_eq!(registry.ids(), vec![ids[0], ids[2]]);
        assert!(!registry.contains(ids[1]));
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let (_handles, ids) = ids(2);
        let mut registry = Registry::new();
        registry.insert(ids[0], 'a');
        let snapshot = registry.snapshot();
        registry.insert(ids[1], 'b');
        registry.remove(ids[0]);
        assert_eq!(snapshot, vec![(ids[0], 'a')]);
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<()> = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }
}
