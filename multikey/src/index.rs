use std::collections::HashMap;
use std::hash::Hash;

/// Value equality that also holds between two values unequal to themselves,
/// such as two NaNs.
pub(crate) fn same_value<V: PartialEq>(a: &V, b: &V) -> bool {
    #[allow(clippy::eq_op)]
    let non_reflexive = a != a && b != b;
    a == b || non_reflexive
}

/// A multimap from one key component to every value stored under it.
///
/// Each value is kept next to the other component of its composite key, the
/// partner, and entries are found by partner rather than by value. Since the
/// composite key is unique, a partner appears at most once per bucket.
/// Buckets keep insertion order and never stay empty: removing the last entry
/// removes the key.
#[derive(Debug, Clone)]
pub(crate) struct SecondaryIndex<K, P, V> {
    buckets: HashMap<K, Vec<(P, V)>>,
}

impl<K, P, V> Default for SecondaryIndex<K, P, V> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<K, P, V> SecondaryIndex<K, P, V>
where
    K: Eq + Hash,
    P: Eq,
    V: PartialEq,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: K, partner: P, value: V) {
        self.buckets.entry(key).or_default().push((partner, value));
    }

    /// Remove the entry of `partner` under `key`, returning its value.
    pub fn remove(&mut self, key: &K, partner: &P) -> Option<V> {
        let entries = self.buckets.get_mut(key)?;

        debug_assert!(!entries.is_empty());
        let index = entries.iter().position(|(el, _)| el == partner)?;

        if entries.len() == 1 {
            self.buckets.remove(key).and_then(|mut entries| entries.pop()).map(|(_, value)| value)
        } else {
            Some(entries.remove(index).1)
        }
    }

    /// Replace the value of `partner` under `key`, the entry going last.
    pub fn replace(&mut self, key: &K, partner: &P, value: V) -> bool {
        let Some(entries) = self.buckets.get_mut(key) else {
            return false;
        };

        let Some(index) = entries.iter().position(|(el, _)| el == partner) else {
            return false;
        };

        let (partner, _) = entries.remove(index);
        entries.push((partner, value));

        true
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Compare against the buckets `expected` should produce, ignoring the
    /// order of entries inside a bucket.
    pub fn matches(&self, expected: &HashMap<&K, Vec<(&P, &V)>>) -> bool {
        self.buckets.len() == expected.len()
            && self.buckets.iter().all(|(key, entries)| {
                expected
                    .get(key)
                    .is_some_and(|expected| same_entries(entries, expected))
            })
    }
}

impl<K, P, V> SecondaryIndex<K, P, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn snapshot(&self, key: &K) -> Option<Vec<V>> {
        self.buckets
            .get(key)
            .map(|entries| entries.iter().map(|(_, value)| value.clone()).collect())
    }
}

fn has_entry<'a, P, V>(
    mut among: impl Iterator<Item = (&'a P, &'a V)>,
    partner: &P,
    value: &V,
) -> bool
where
    P: Eq + 'a,
    V: PartialEq + 'a,
{
    among.any(|(p, v)| p == partner && same_value(v, value))
}

fn same_entries<P: Eq, V: PartialEq>(entries: &[(P, V)], expected: &[(&P, &V)]) -> bool {
    entries.len() == expected.len()
        && entries
            .iter()
            .all(|(partner, value)| has_entry(expected.iter().copied(), partner, value))
        && expected.iter().all(|(partner, value)| {
            has_entry(entries.iter().map(|(p, v)| (p, v)), partner, value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_keeps_order() {
        let mut index = SecondaryIndex::default();
        index.insert("a", 'x', 1);
        index.insert("a", 'y', 2);
        index.insert("b", 'x', 3);

        assert_eq!(index.snapshot(&"a"), Some(vec![1, 2]));
        assert_eq!(index.snapshot(&"b"), Some(vec![3]));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn remove_by_partner() {
        let mut index = SecondaryIndex::default();
        index.insert("a", 'x', 1);
        index.insert("a", 'y', 1);
        index.insert("a", 'z', 2);

        assert_eq!(index.remove(&"a", &'y'), Some(1));
        assert_eq!(index.snapshot(&"a"), Some(vec![1, 2]));
        assert_eq!(index.remove(&"a", &'y'), None);
        assert_eq!(index.remove(&"z", &'x'), None);
    }

    #[test]
    fn remove_last_drops_bucket() {
        let mut index = SecondaryIndex::default();
        index.insert("a", 'x', 1);

        assert_eq!(index.remove(&"a", &'x'), Some(1));
        assert_eq!(index.snapshot(&"a"), None);
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn replace_value() {
        let mut index = SecondaryIndex::default();
        index.insert("a", 'x', 1);
        index.insert("a", 'y', 2);

        assert!(index.replace(&"a", &'x', 10));
        assert_eq!(index.snapshot(&"a"), Some(vec![2, 10]));
        assert!(!index.replace(&"a", &'z', 11));
        assert!(!index.replace(&"b", &'x', 11));
    }

    #[test]
    fn nan_entries_are_found_by_partner() {
        let mut index = SecondaryIndex::default();
        index.insert(1, "A", f64::NAN);
        index.insert(1, "B", 2.0);

        assert!(index.replace(&1, &"A", 1.0));
        assert_eq!(index.snapshot(&1), Some(vec![2.0, 1.0]));

        index.insert(2, "A", f64::NAN);
        assert!(index.remove(&2, &"A").is_some_and(f64::is_nan));
        assert_eq!(index.snapshot(&2), None);
    }

    #[test]
    fn same_value_treats_nan_as_itself() {
        assert!(same_value(&f64::NAN, &f64::NAN));
        assert!(same_value(&1.0, &1.0));
        assert!(!same_value(&f64::NAN, &1.0));
        assert!(!same_value(&1.0, &2.0));
    }

    #[test]
    fn entry_matching() {
        let mut index = SecondaryIndex::default();
        index.insert(1, 'a', 5);
        index.insert(1, 'b', 6);

        let mut expected = HashMap::new();
        expected.insert(&1, vec![(&'b', &6), (&'a', &5)]);
        assert!(index.matches(&expected));

        expected.insert(&1, vec![(&'a', &6), (&'b', &5)]);
        assert!(!index.matches(&expected));

        expected.insert(&1, vec![(&'a', &5), (&'a', &5)]);
        assert!(!index.matches(&expected));

        expected.insert(&1, vec![(&'b', &6), (&'a', &5)]);
        expected.insert(&2, vec![(&'c', &7)]);
        assert!(!index.matches(&expected));
    }
}
