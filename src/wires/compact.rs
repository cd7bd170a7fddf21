use crate::catalog::prototypes::EntityKind;
use crate::codec::payload::WireData;
use crate::document::placed_object::ObjectId;
use crate::spatial_index::ObjectLookup;
use crate::wires::wire_link::{WireColor, WireEndpoint, WireLink};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// The per-object form in which wires are stored in blueprints. Circuit wires are listed by the side they leave from,
/// copper wires of power switches in the `Cu0`/`Cu1` slots. Pole to pole wires are kept separately as `neighbours`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactConnections {
    #[serde(rename = "1")]
    pub side1: Option<CompactSide>,
    #[serde(rename = "2")]
    pub side2: Option<CompactSide>,
    #[serde(rename = "Cu0")]
    pub copper0: Option<Vec<CopperTarget>>,
    #[serde(rename = "Cu1")]
    pub copper1: Option<Vec<CopperTarget>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactSide {
    pub red: Option<Vec<CircuitTarget>>,
    pub green: Option<Vec<CircuitTarget>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitTarget {
    pub entity_id: ObjectId,
    pub circuit_id: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopperTarget {
    pub entity_id: ObjectId,
    #[serde(default)]
    pub wire_id: u8,
}

impl CompactConnections {
    pub fn is_empty(&self) -> bool {
        self.side1.is_none() && self.side2.is_none() && self.copper0.is_none() && self.copper1.is_none()
    }

    fn side_mut(&mut self, side: u8) -> Option<&mut CompactSide> {
        let slot = match side {
            1 => &mut self.side1,
            2 => &mut self.side2,
            _ => return None,
        };
        Some(slot.get_or_insert_with(CompactSide::default))
    }

    fn copper_mut(&mut self, side: u8) -> Option<&mut Vec<CopperTarget>> {
        let slot = match side {
            1 => &mut self.copper0,
            2 => &mut self.copper1,
            _ => return None,
        };
        Some(slot.get_or_insert_with(Vec::new))
    }
}

impl CompactSide {
    fn targets_mut(&mut self, color: WireColor) -> Option<&mut Vec<CircuitTarget>> {
        let slot = match color {
            WireColor::Red => &mut self.red,
            WireColor::Green => &mut self.green,
            WireColor::Copper => return None,
        };
        Some(slot.get_or_insert_with(Vec::new))
    }
}

/// Links stored on one object. A target without a circuit id is on side 1. Only the first entry of a copper slot is
/// read, as a power switch terminal holds a single copper wire.
pub fn links_from_compact(
    object: ObjectId,
    connections: Option<&CompactConnections>,
    neighbours: Option<&[ObjectId]>,
) -> Vec<WireLink> {
    let mut links = Vec::new();

    if let Some(connections) = connections {
        for (side, compact) in [(1, &connections.side1), (2, &connections.side2)] {
            let Some(compact) = compact else {
                continue;
            };
            for (color, targets) in [(WireColor::Red, &compact.red), (WireColor::Green, &compact.green)] {
                for target in targets.iter().flatten() {
                    links.push(WireLink::new(
                        color,
                        WireEndpoint::new(object, side),
                        WireEndpoint::new(target.entity_id, target.circuit_id.unwrap_or(1)),
                    ));
                }
            }
        }

        for (side, slot) in [(1, &connections.copper0), (2, &connections.copper1)] {
            if let Some(target) = slot.as_ref().and_then(|targets| targets.first()) {
                links.push(WireLink::new(
                    WireColor::Copper,
                    WireEndpoint::new(object, side),
                    WireEndpoint::new(target.entity_id, 1),
                ));
            }
        }
    }

    for &other in neighbours.into_iter().flatten() {
        links.push(WireLink::pole(object, other));
    }

    links
}

/// Color and side of a connector id of the top-level wire list. Ids 1 to 4 are the red and green terminals of the
/// first and second side, 5 and 6 the copper terminals.
fn connector(id: u8) -> Option<(WireColor, u8)> {
    Some(match id {
        1 => (WireColor::Red, 1),
        2 => (WireColor::Green, 1),
        3 => (WireColor::Red, 2),
        4 => (WireColor::Green, 2),
        5 => (WireColor::Copper, 1),
        6 => (WireColor::Copper, 2),
        _ => return None,
    })
}

/// Links of the top-level wire list. Wires joining connectors of different colors are dropped.
pub fn links_from_wire_list(wires: &[WireData]) -> Vec<WireLink> {
    wires
        .iter()
        .filter_map(|&WireData(a, a_connector, b, b_connector)| {
            match (connector(a_connector), connector(b_connector)) {
                (Some((color, a_side)), Some((b_color, b_side))) if color == b_color => Some(WireLink::new(
                    color,
                    WireEndpoint::new(a, a_side),
                    WireEndpoint::new(b, b_side),
                )),
                _ => {
                    warn!("Dropping wire {}:{} - {}:{} between mismatched connectors.", a, a_connector, b, b_connector);
                    None
                }
            }
        })
        .collect()
}

/// Compact form of the object's links. Links whose other end `renumber` maps to `None` are left out, the rest are
/// written with the renumbered ids. Copper wires are only written towards power poles: as `neighbours` of a pole or in
/// the copper slots of a power switch.
pub fn links_to_compact<L, F>(
    object: ObjectId,
    links: &[WireLink],
    lookup: &L,
    renumber: F,
) -> (Option<CompactConnections>, Option<Vec<ObjectId>>)
where
    L: ObjectLookup,
    F: Fn(ObjectId) -> Option<ObjectId>,
{
    let kind_of = |id: ObjectId| lookup.object_with_prototype(id).map(|(_, prototype)| prototype.kind);
    let own_kind = kind_of(object);

    let mut connections = CompactConnections::default();
    let mut neighbours = Vec::new();

    for link in links {
        let (Some(this), Some(other)) = (link.endpoint_of(object), link.other_end(object)) else {
            continue;
        };
        let Some(other_id) = renumber(other.object) else {
            continue;
        };

        match link.color() {
            WireColor::Copper => {
                if kind_of(other.object) != Some(EntityKind::ElectricPole) {
                    continue;
                }
                match own_kind {
                    Some(EntityKind::ElectricPole) => neighbours.push(other_id),
                    Some(EntityKind::PowerSwitch) => {
                        if let Some(slot) = connections.copper_mut(this.side) {
                            slot.push(CopperTarget {
                                entity_id: other_id,
                                wire_id: 0,
                            });
                        }
                    }
                    _ => {}
                }
            }
            color => {
                if let Some(targets) = connections.side_mut(this.side).and_then(|side| side.targets_mut(color)) {
                    targets.push(CircuitTarget {
                        entity_id: other_id,
                        circuit_id: Some(other.side),
                    });
                }
            }
        }
    }

    (
        (!connections.is_empty()).then_some(connections),
        (!neighbours.is_empty()).then_some(neighbours),
    )
}
