//! A thread-safe map keyed by `(id, name)` pairs, queryable by either half.
//!
//! One reader-writer lock guards the primary map and both secondary indexes
//! as a unit: a reader never sees a write applied to one map and not yet to
//! the others. Every query returning several values hands out an owned
//! snapshot, so nothing borrowed from the internal maps outlives the lock.

use crate::error::CollectionError;
use crate::index::{same_value, SecondaryIndex};
use crate::key::{CompositeKey, KeyPart, KeyRef};
use crate::stats;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;

pub type Entry<Id, Name, V> = (CompositeKey<Id, Name>, V);

#[derive(Debug)]
struct Indexes<Id, Name, V> {
    primary: IndexMap<CompositeKey<Id, Name>, V>,
    by_id: SecondaryIndex<Id, Name, V>,
    by_name: SecondaryIndex<Name, Id, V>,
}

impl<Id, Name, V> Indexes<Id, Name, V>
where
    Id: KeyPart,
    Name: KeyPart,
    V: Clone + PartialEq,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            primary: IndexMap::with_capacity(capacity),
            by_id: SecondaryIndex::with_capacity(capacity),
            by_name: SecondaryIndex::with_capacity(capacity),
        }
    }

    /// The caller checked that `key` is not in the primary map.
    fn insert(&mut self, key: CompositeKey<Id, Name>, value: V) {
        self.by_id
            .insert(key.id().clone(), key.name().clone(), value.clone());
        self.by_name
            .insert(key.name().clone(), key.id().clone(), value.clone());
        let previous = self.primary.insert(key, value);
        debug_assert!(previous.is_none(), "primary key inserted twice");
    }

    fn clear(&mut self) -> usize {
        let dropped = self.primary.len();
        self.primary.clear();
        self.by_id.clear();
        self.by_name.clear();
        dropped
    }

    fn is_consistent(&self) -> bool {
        let mut by_id: HashMap<&Id, Vec<(&Name, &V)>> = HashMap::new();
        let mut by_name: HashMap<&Name, Vec<(&Id, &V)>> = HashMap::new();
        for (key, value) in &self.primary {
            by_id.entry(key.id()).or_default().push((key.name(), value));
            by_name.entry(key.name()).or_default().push((key.id(), value));
        }

        self.by_id.matches(&by_id) && self.by_name.matches(&by_name)
    }
}

/// Values indexed by a [`CompositeKey`], with lookups by id or by name alone.
///
/// Reads (`get`, `get_by_id`, `get_by_name`, `contains`, `count`, `entries`,
/// `copy_to`) share the lock. Writes (`add`, `set`, `remove`, `clear`) take it
/// exclusively and either update all three maps or none of them.
/// A blocked call waits for the lock without timeout.
#[derive(Debug)]
pub struct IndexedCollection<Id, Name, V> {
    indexes: RwLock<Indexes<Id, Name, V>>,
}

impl<Id, Name, V> Default for IndexedCollection<Id, Name, V>
where
    Id: KeyPart,
    Name: KeyPart,
    V: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, Name, V> IndexedCollection<Id, Name, V>
where
    Id: KeyPart,
    Name: KeyPart,
    V: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty collection with room for `capacity` entries before
    /// the maps reallocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indexes: RwLock::new(Indexes::with_capacity(capacity)),
        }
    }

    /// Create a collection holding a single entry.
    pub fn with_entry(id: Id, name: Name, value: V) -> Self {
        Self::with_key(CompositeKey::new(id, name), value)
    }

    pub fn with_key(key: CompositeKey<Id, Name>, value: V) -> Self {
        let mut collection = Self::new();
        collection.indexes.get_mut().insert(key, value);
        stats::inc_added(1);
        collection
    }

    /// Add a new entry.
    /// Fails with [`CollectionError::AlreadyExists`] and leaves every index
    /// untouched if the `(id, name)` pair is already present.
    pub fn add(&self, id: Id, name: Name, value: V) -> Result<(), CollectionError> {
        self.add_entry(CompositeKey::new(id, name), value)
    }

    pub fn add_entry(&self, key: CompositeKey<Id, Name>, value: V) -> Result<(), CollectionError> {
        let mut indexes = self.indexes.write();
        if indexes.primary.contains_key(&key) {
            drop(indexes);
            log::debug!("rejecting add, {key:?} already exists");
            stats::inc_rejected();
            return Err(CollectionError::AlreadyExists(format!("{key:?}")));
        }

        log::trace!("adding {key:?}");
        indexes.insert(key, value);
        let len = indexes.primary.len();
        drop(indexes);

        stats::inc_added(len);
        Ok(())
    }

    pub fn get(&self, id: &Id, name: &Name) -> Result<V, CollectionError> {
        let key = KeyRef::new(id, name);
        self.indexes
            .read()
            .primary
            .get(&key)
            .cloned()
            .ok_or_else(|| CollectionError::NotFound(format!("{key:?}")))
    }

    /// Replace the value stored under an existing `(id, name)` pair.
    /// The old value leaves both secondary indexes and the new one is
    /// appended to them in the same exclusive section.
    pub fn set(&self, id: &Id, name: &Name, value: V) -> Result<(), CollectionError> {
        let key = KeyRef::new(id, name);
        let mut guard = self.indexes.write();
        let indexes = &mut *guard;

        let Some(current) = indexes.primary.get_mut(&key) else {
            drop(guard);
            log::debug!("rejecting set, {key:?} does not exist");
            stats::inc_rejected();
            return Err(CollectionError::NotFound(format!("{key:?}")));
        };

        let by_id = indexes.by_id.replace(id, name, value.clone());
        let by_name = indexes.by_name.replace(name, id, value.clone());
        debug_assert!(by_id && by_name, "secondary indexes out of sync with {key:?}");
        *current = value;
        drop(guard);

        log::trace!("updated {key:?}");
        stats::inc_updated();
        Ok(())
    }

    /// Remove the entry if `key` currently holds `value`.
    /// Returns false when the key is absent or holds another value.
    /// Values unequal to themselves, like NaN, match one another here.
    pub fn remove(&self, key: &CompositeKey<Id, Name>, value: &V) -> bool {
        let mut guard = self.indexes.write();
        let indexes = &mut *guard;

        if !indexes
            .primary
            .get(key)
            .is_some_and(|current| same_value(current, value))
        {
            return false;
        }

        indexes.primary.swap_remove(key);
        let by_id = indexes.by_id.remove(key.id(), key.name());
        let by_name = indexes.by_name.remove(key.name(), key.id());
        debug_assert!(
            by_id.is_some() && by_name.is_some(),
            "secondary indexes out of sync with {key:?}"
        );
        let len = indexes.primary.len();
        drop(guard);

        log::trace!("removed {key:?}");
        stats::inc_removed(len);
        true
    }

    /// Whether `key` is present and holds `value`, compared like in [`Self::remove`].
    pub fn contains(&self, key: &CompositeKey<Id, Name>, value: &V) -> bool {
        self.indexes
            .read()
            .primary
            .get(key)
            .is_some_and(|current| same_value(current, value))
    }

    pub fn contains_key(&self, id: &Id, name: &Name) -> bool {
        self.indexes
            .read()
            .primary
            .contains_key(&KeyRef::new(id, name))
    }

    /// Every value stored under `id`, whatever its name, in insertion order.
    /// An id with no entries is reported as [`CollectionError::NotFound`].
    pub fn get_by_id(&self, id: &Id) -> Result<Vec<V>, CollectionError> {
        self.indexes
            .read()
            .by_id
            .snapshot(id)
            .ok_or_else(|| CollectionError::NotFound(format!("{id:?}")))
    }

    /// Every value stored under `name`, whatever its id, in insertion order.
    /// A name with no entries is reported as [`CollectionError::NotFound`].
    pub fn get_by_name(&self, name: &Name) -> Result<Vec<V>, CollectionError> {
        self.indexes
            .read()
            .by_name
            .snapshot(name)
            .ok_or_else(|| CollectionError::NotFound(format!("{name:?}")))
    }

    /// Distinct ids currently in use.
    pub fn ids(&self) -> Vec<Id> {
        let indexes = self.indexes.read();
        let mut ids = Vec::with_capacity(indexes.by_id.len());
        ids.extend(indexes.by_id.keys().cloned());
        ids
    }

    /// Distinct names currently in use.
    pub fn names(&self) -> Vec<Name> {
        let indexes = self.indexes.read();
        let mut names = Vec::with_capacity(indexes.by_name.len());
        names.extend(indexes.by_name.keys().cloned());
        names
    }

    pub fn count(&self) -> usize {
        self.indexes.read().primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn clear(&self) {
        let dropped = self.indexes.write().clear();
        log::debug!("cleared {dropped} entries");
        stats::inc_cleared(dropped);
    }

    /// Snapshot of every entry. Entries come in insertion order until the
    /// first removal, in an unspecified order afterwards.
    pub fn entries(&self) -> Vec<Entry<Id, Name, V>> {
        self.indexes
            .read()
            .primary
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn iter(&self) -> std::vec::IntoIter<Entry<Id, Name, V>> {
        self.entries().into_iter()
    }

    /// Copy every entry into `dest`, starting at `offset`.
    /// Nothing is written unless all entries fit.
    pub fn copy_to(
        &self,
        dest: &mut [Option<Entry<Id, Name, V>>],
        offset: usize,
    ) -> Result<(), CollectionError> {
        let len = dest.len();
        if offset > len {
            return Err(CollectionError::OutOfRange { offset, len });
        }

        let indexes = self.indexes.read();
        let required = indexes.primary.len();
        let available = len - offset;
        if available < required {
            return Err(CollectionError::InsufficientCapacity {
                required,
                available,
            });
        }

        for (slot, (key, value)) in dest[offset..].iter_mut().zip(&indexes.primary) {
            *slot = Some((key.clone(), value.clone()));
        }

        Ok(())
    }

    /// Check that both secondary indexes hold exactly the values of the
    /// primary map, bucketed by id and by name.
    pub fn is_consistent(&self) -> bool {
        self.indexes.read().is_consistent()
    }
}

impl<'a, Id, Name, V> IntoIterator for &'a IndexedCollection<Id, Name, V>
where
    Id: KeyPart,
    Name: KeyPart,
    V: Clone + PartialEq,
{
    type Item = Entry<Id, Name, V>;
    type IntoIter = std::vec::IntoIter<Entry<Id, Name, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
