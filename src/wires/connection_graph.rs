use crate::document::placed_object::ObjectId;
use crate::history::lens::KeyedCollection;
use crate::utils::map_utils::MultiMapUtils;
use crate::wires::wire_link::{WireColor, WireLink};
use rustc_hash::FxHashMap;

/// Wire links by hash, with the hashes of the links of every object.
#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    links: FxHashMap<String, WireLink>,
    by_object: FxHashMap<ObjectId, Vec<String>>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        ConnectionGraph::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, link: &WireLink) -> bool {
        self.links.contains_key(&link.hash())
    }

    pub fn get(&self, hash: &str) -> Option<&WireLink> {
        self.links.get(hash)
    }

    pub fn links(&self) -> impl Iterator<Item = &WireLink> {
        self.links.values()
    }

    pub fn link_hashes(&self, object: ObjectId) -> &[String] {
        self.by_object.get(&object).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All links of the object, in the order they were added.
    pub fn connections(&self, object: ObjectId) -> Vec<WireLink> {
        self.link_hashes(object)
            .iter()
            .filter_map(|hash| self.links.get(hash).copied())
            .collect()
    }

    /// Objects at the other end of the object's links of the given color.
    pub fn neighbours(&self, object: ObjectId, color: WireColor) -> Vec<ObjectId> {
        self.connections(object)
            .into_iter()
            .filter(|link| link.color() == color)
            .filter_map(|link| link.other_end(object))
            .map(|endpoint| endpoint.object)
            .collect()
    }

    pub fn count(&self, object: ObjectId, color: WireColor) -> usize {
        self.connections(object)
            .iter()
            .filter(|link| link.color() == color)
            .count()
    }

    fn insert(&mut self, hash: String, link: WireLink) {
        if let Some(previous) = self.links.insert(hash.clone(), link) {
            self.unindex(&hash, &previous);
        }
        let [a, b] = link.endpoints();
        self.by_object.push_or_insert(a.object, hash.clone());
        if b.object != a.object {
            self.by_object.push_or_insert(b.object, hash);
        }
    }

    fn remove(&mut self, hash: &str) {
        if let Some(link) = self.links.remove(hash) {
            self.unindex(hash, &link);
        }
    }

    fn unindex(&mut self, hash: &str, link: &WireLink) {
        let hash = hash.to_string();
        let [a, b] = link.endpoints();
        self.by_object.remove_from_key(a.object, &hash);
        if b.object != a.object {
            self.by_object.remove_from_key(b.object, &hash);
        }
    }
}

impl KeyedCollection for ConnectionGraph {
    type Key = String;
    type Value = WireLink;

    fn get_value(&self, key: &String) -> Option<&WireLink> {
        self.links.get(key)
    }

    fn set_value(&mut self, key: String, value: WireLink) {
        self.insert(key, value);
    }

    fn delete_value(&mut self, key: &String) {
        self.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use crate::document::placed_object::ObjectId;
    use crate::history::lens::KeyedCollection;
    use crate::wires::connection_graph::ConnectionGraph;
    use crate::wires::wire_link::{WireColor, WireEndpoint, WireLink};

    fn add(graph: &mut ConnectionGraph, link: WireLink) {
        graph.set_value(link.hash(), link);
    }

    #[test]
    fn test_adjacency() {
        let mut graph = ConnectionGraph::new();
        let (a, b, c) = (ObjectId(1), ObjectId(2), ObjectId(3));
        let red = WireLink::new(WireColor::Red, WireEndpoint::new(a, 1), WireEndpoint::new(b, 1));
        add(&mut graph, red);
        add(&mut graph, WireLink::pole(b, c));
        assert_eq!(graph.connections(a), vec![red]);
        assert_eq!(graph.connections(b).len(), 2);
        assert_eq!(graph.neighbours(b, WireColor::Copper), vec![c]);
        assert_eq!(graph.count(b, WireColor::Red), 1);

        graph.delete_value(&red.hash());
        assert!(graph.connections(a).is_empty());
        assert_eq!(graph.connections(b), vec![WireLink::pole(b, c)]);
        assert!(graph.link_hashes(a).is_empty());
    }

    #[test]
    fn test_self_link_indexed_once() {
        let mut graph = ConnectionGraph::new();
        let combinator = ObjectId(5);
        let link = WireLink::new(
            WireColor::Green,
            WireEndpoint::new(combinator, 1),
            WireEndpoint::new(combinator, 2),
        );
        add(&mut graph, link);
        add(&mut graph, link);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.link_hashes(combinator).len(), 1);
        graph.delete_value(&link.hash());
        assert!(graph.is_empty());
        assert!(graph.link_hashes(combinator).is_empty());
    }
}
