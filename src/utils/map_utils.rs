use std::collections::hash_map::Entry as HEntry;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

pub trait MultiMapUtils<K, V> {
    fn push_or_insert(&mut self, key: K, value: V);

    /// Removes the first occurrence of the value under the key, dropping the key once its list is empty.
    /// Returns whether anything was removed.
    fn remove_from_key(&mut self, key: K, value: &V) -> bool;
}

impl<K, V, S> MultiMapUtils<K, V> for HashMap<K, Vec<V>, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn push_or_insert(&mut self, key: K, value: V) {
        match self.entry(key) {
            HEntry::Occupied(mut e) => {
                e.get_mut().push(value);
            }
            HEntry::Vacant(e) => {
                e.insert(vec![value]);
            }
        }
    }

    fn remove_from_key(&mut self, key: K, value: &V) -> bool {
        match self.entry(key) {
            HEntry::Occupied(mut e) => {
                let Some(index) = e.get().iter().position(|v| v == value) else {
                    return false;
                };
                e.get_mut().remove(index);
                if e.get().is_empty() {
                    e.remove();
                }
                true
            }
            HEntry::Vacant(_) => false,
        }
    }
}

pub trait CountMapUtils<K> {
    fn increment(&mut self, key: K);
}

impl<K, S> CountMapUtils<K> for HashMap<K, usize, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn increment(&mut self, key: K) {
        *self.entry(key).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::map_utils::{CountMapUtils, MultiMapUtils};
    use rustc_hash::FxHashMap;

    #[test]
    fn test_push_and_remove() {
        let mut map: FxHashMap<u32, Vec<&str>> = FxHashMap::default();
        map.push_or_insert(1, "a");
        map.push_or_insert(1, "b");
        assert!(map.remove_from_key(1, &"a"));
        assert!(!map.remove_from_key(1, &"a"));
        assert_eq!(map.get(&1), Some(&vec!["b"]));
        assert!(map.remove_from_key(1, &"b"));
        assert!(!map.contains_key(&1));
        assert!(!map.remove_from_key(2, &"b"));
    }

    #[test]
    fn test_increment() {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        counts.increment("belt");
        counts.increment("belt");
        counts.increment("chest");
        assert_eq!(counts["belt"], 2);
        assert_eq!(counts["chest"], 1);
    }
}
