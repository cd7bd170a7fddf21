use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Locates a value inside the history state. Actions keep the lens and re-resolve it on every apply, so they never
/// hold references into the state.
pub trait Lens<S, V>: 'static {
    fn focus<'a>(&self, state: &'a mut S) -> Option<&'a mut V>;
}

/// Keyed storage whose entries can be recorded in the history.
pub trait KeyedCollection {
    type Key: Clone + 'static;
    type Value: Clone + 'static;

    fn get_value(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn set_value(&mut self, key: Self::Key, value: Self::Value);

    fn delete_value(&mut self, key: &Self::Key);
}

impl<K, V> KeyedCollection for BTreeMap<K, V>
where
    K: Ord + Clone + 'static,
    V: Clone + 'static,
{
    type Key = K;
    type Value = V;

    fn get_value(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn set_value(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn delete_value(&mut self, key: &K) {
        self.remove(key);
    }
}

impl<K, V, H> KeyedCollection for HashMap<K, V, H>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
    H: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn get_value(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn set_value(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn delete_value(&mut self, key: &K) {
        self.remove(key);
    }
}
