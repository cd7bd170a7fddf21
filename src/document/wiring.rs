use crate::catalog::prototypes::EntityKind::ElectricPole;
use crate::config::MAX_POLE_CONNECTION_COUNT;
use crate::document::events::DocumentEvent;
use crate::document::placed_object::ObjectId;
use crate::document::state::{wires, DocumentState};
use crate::document::Document;
use crate::geometry::area::Area;
use crate::spatial_index::ObjectLookup;
use crate::wires::wire_link::{WireColor, WireLink};
use log::{debug, trace};
use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Undirected;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

fn link_replaced(state: &mut DocumentState, current: &Option<WireLink>, replaced: &Option<WireLink>) {
    match (current, replaced) {
        (Some(link), _) => state.emit(DocumentEvent::WireCreated(*link)),
        (None, Some(link)) => state.emit(DocumentEvent::WireRemoved(*link)),
        (None, None) => {}
    }
}

impl Document {
    /// Adds the link if both of its objects exist and it is not there yet.
    pub fn create_wire(&mut self, link: WireLink) -> bool {
        let [a, b] = link.endpoints();
        if !link.is_valid()
            || self.state.wires.contains(&link)
            || !self.state.objects.contains_key(&a.object)
            || !self.state.objects.contains_key(&b.object)
        {
            return false;
        }
        self.history
            .update_map(&mut self.state, wires, link.hash(), Some(link), "Create wire")
            .on_done(link_replaced)
            .commit(&mut self.state);
        true
    }

    pub fn remove_wire(&mut self, link: &WireLink) -> bool {
        if !self.state.wires.contains(link) {
            return false;
        }
        self.history
            .update_map(&mut self.state, wires, link.hash(), None, "Remove wire")
            .on_done(link_replaced)
            .commit(&mut self.state);
        true
    }

    /// Links of the object in the order they were created.
    pub fn connections(&self, id: ObjectId) -> Vec<WireLink> {
        self.state.wires.connections(id)
    }

    /// Wires a power pole to the nearest poles in reach that still have a free copper slot, like placing it in the
    /// game would. A pole already connected to one of the chosen poles is skipped. Returns how many links were made.
    pub fn connect_power_pole(&mut self, id: ObjectId) -> usize {
        let view = self.view();
        let Some((pole, prototype)) = view.object_with_prototype(id) else {
            return 0;
        };
        if prototype.kind != ElectricPole {
            return 0;
        }

        let reach = prototype.max_wire_distance;
        let size = ((reach + 1.0) * 2.0).ceil() as i32;
        let mut candidates = self
            .state
            .grid
            .objects_in_area(&Area::new(pole.position, size, size))
            .into_iter()
            .filter(|&other| other != id)
            .filter_map(|other| {
                let (object, other_prototype) = view.object_with_prototype(other)?;
                let in_reach = other_prototype.kind == ElectricPole
                    && self.state.wires.count(other, WireColor::Copper) < MAX_POLE_CONNECTION_COUNT
                    && object
                        .position
                        .in_circle(pole.position, reach.min(other_prototype.max_wire_distance));
                in_reach.then(|| (other, object.position.manhattan_distance(pole.position)))
            })
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let mut skipped = FxHashSet::default();
        let mut links = Vec::new();
        for (other, _) in candidates {
            if links.len() == MAX_POLE_CONNECTION_COUNT {
                break;
            }
            if !skipped.insert(other) {
                continue;
            }
            skipped.extend(self.state.wires.neighbours(other, WireColor::Copper));
            links.push(WireLink::pole(id, other));
        }

        self.history.start_transaction(Some("Connect power pole"), true);
        let created = links.into_iter().filter(|&link| self.create_wire(link)).count();
        self.commit_transaction();
        trace!("Connected power pole {} to {} poles.", id, created);
        created
    }

    /// Connects all power poles with the shortest set of copper wires that keeps every group of poles in mutual
    /// reach connected. Existing links are kept. Returns how many links were added.
    pub fn generate_power_pole_wires(&mut self) -> usize {
        let view = self.view();
        let poles = self
            .state
            .objects
            .values()
            .filter_map(|object| {
                let prototype = view.prototype(&object.name)?;
                (prototype.kind == ElectricPole).then_some((object.id, object.position, prototype.max_wire_distance))
            })
            .collect::<Vec<_>>();
        if poles.len() < 2 {
            return 0;
        }

        let mut graph = StableGraph::<ObjectId, f64, Undirected>::default();
        let nodes = poles.iter().map(|&(id, _, _)| graph.add_node(id)).collect::<Vec<_>>();
        for (i, &(_, position, reach)) in poles.iter().enumerate() {
            for (j, &(_, other_position, other_reach)) in poles.iter().enumerate().skip(i + 1) {
                if other_position.in_circle(position, reach.min(other_reach)) {
                    graph.add_edge(nodes[i], nodes[j], position.manhattan_distance(other_position));
                }
            }
        }

        let links = min_spanning_tree(&graph)
            .filter_map(|element| match element {
                Element::Edge { source, target, .. } => Some(WireLink::pole(
                    graph[NodeIndex::new(source)],
                    graph[NodeIndex::new(target)],
                )),
                Element::Node { .. } => None,
            })
            .collect::<Vec<_>>();

        self.history.start_transaction(Some("Generate power pole wires"), true);
        let created = links.into_iter().filter(|&link| self.create_wire(link)).count();
        self.commit_transaction();
        debug!("Generated {} wires between {} power poles.", created, poles.len());
        created
    }
}
