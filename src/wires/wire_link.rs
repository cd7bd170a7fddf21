use crate::document::placed_object::ObjectId;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireColor {
    #[display(fmt = "red")]
    Red,
    #[display(fmt = "green")]
    Green,
    #[display(fmt = "copper")]
    Copper,
}

impl WireColor {
    pub fn is_circuit(self) -> bool {
        self != WireColor::Copper
    }
}

/// A terminal of an object. Sides are numbered from 1; combinators use side 2 for their output and power switches
/// for their second copper terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Constructor, Display)]
#[display(fmt = "{}:{}", object, side)]
pub struct WireEndpoint {
    pub object: ObjectId,
    pub side: u8,
}

/// An undirected wire. The endpoints are kept sorted by object and side, so two links between the same terminals
/// compare and hash equal regardless of the order they were given in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct WireLink {
    color: WireColor,
    first: WireEndpoint,
    second: WireEndpoint,
}

impl WireLink {
    pub fn new(color: WireColor, a: WireEndpoint, b: WireEndpoint) -> Self {
        let (first, second) = if b < a { (b, a) } else { (a, b) };
        WireLink { color, first, second }
    }

    /// Copper link between the single terminals of two power poles.
    pub fn pole(a: ObjectId, b: ObjectId) -> Self {
        WireLink::new(WireColor::Copper, WireEndpoint::new(a, 1), WireEndpoint::new(b, 1))
    }

    pub fn color(&self) -> WireColor {
        self.color
    }

    pub fn endpoints(&self) -> [WireEndpoint; 2] {
        [self.first, self.second]
    }

    /// Key of the link, e.g. `red-1-2-1-1`.
    pub fn hash(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.color, self.first.object.0, self.second.object.0, self.first.side, self.second.side
        )
    }

    /// A link may only join an object to itself between two different terminals.
    pub fn is_valid(&self) -> bool {
        self.first != self.second
    }

    pub fn touches(&self, object: ObjectId) -> bool {
        self.first.object == object || self.second.object == object
    }

    /// The endpoint on the given object. For a self-link this is the first one.
    pub fn endpoint_of(&self, object: ObjectId) -> Option<WireEndpoint> {
        if self.first.object == object {
            Some(self.first)
        } else if self.second.object == object {
            Some(self.second)
        } else {
            None
        }
    }

    pub fn other_end(&self, object: ObjectId) -> Option<WireEndpoint> {
        if self.first.object == object {
            Some(self.second)
        } else if self.second.object == object {
            Some(self.first)
        } else {
            None
        }
    }

    /// The same link with both object ids translated, e.g. to renumbered ids on export.
    pub fn map_objects<F: Fn(ObjectId) -> Option<ObjectId>>(&self, f: F) -> Option<WireLink> {
        Some(WireLink::new(
            self.color,
            WireEndpoint::new(f(self.first.object)?, self.first.side),
            WireEndpoint::new(f(self.second.object)?, self.second.side),
        ))
    }
}
