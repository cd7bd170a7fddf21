use crate::catalog::prototypes::SignalType;
use crate::document::placed_object::{ObjectId, ObjectSettings};
use crate::geometry::direction::{Direction, DirectionType};
use crate::geometry::Point;
use crate::wires::compact::CompactConnections;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

pub const BLUEPRINT_ITEM: &str = "blueprint";
pub const BOOK_ITEM: &str = "blueprint-book";

/// The JSON object inside a blueprint string, either `{"blueprint": ...}` or `{"blueprint_book": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Blueprint(BlueprintData),
    BlueprintBook(BookData),
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintData {
    #[serde(default = "blueprint_item")]
    pub item: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub icons: Option<Vec<IconData>>,
    pub entities: Option<Vec<EntityData>>,
    pub tiles: Option<Vec<TileData>>,
    /// Wires listed next to the entities instead of inside them.
    pub wires: Option<Vec<WireData>>,
    pub version: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BlueprintData {
    fn default() -> Self {
        BlueprintData {
            item: blueprint_item(),
            label: None,
            description: None,
            icons: None,
            entities: None,
            tiles: None,
            wires: None,
            version: None,
            extra: Map::new(),
        }
    }
}

fn blueprint_item() -> String {
    BLUEPRINT_ITEM.to_string()
}

fn book_item() -> String {
    BOOK_ITEM.to_string()
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub entity_number: ObjectId,
    pub name: String,
    pub position: Point,
    pub direction: Option<Direction>,
    /// Input or output end of an underground pair.
    #[serde(rename = "type")]
    pub direction_type: Option<DirectionType>,
    pub connections: Option<CompactConnections>,
    pub neighbours: Option<Vec<ObjectId>>,
    #[serde(flatten)]
    pub settings: ObjectSettings,
}

/// One wire of the top-level list: entity number and connector id of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireData(pub ObjectId, pub u8, pub ObjectId, pub u8);

/// A tile, positioned by its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileData {
    pub name: String,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconData {
    pub index: u8,
    pub signal: SignalId,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalId {
    #[serde(rename = "type")]
    pub kind: Option<SignalType>,
    pub name: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookData {
    #[serde(default = "book_item")]
    pub item: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub icons: Option<Vec<IconData>>,
    #[serde(default)]
    pub blueprints: Vec<BookEntry>,
    #[serde(default)]
    pub active_index: usize,
    pub version: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One slot of a book. Slots holding planners keep them in `extra` and do not count as blueprints.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    #[serde(default)]
    pub index: usize,
    pub blueprint: Option<BlueprintData>,
    pub blueprint_book: Option<BookData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BookEntry {
    pub fn blueprint(index: usize, blueprint: BlueprintData) -> Self {
        BookEntry {
            index,
            blueprint: Some(blueprint),
            blueprint_book: None,
            extra: Map::new(),
        }
    }

    pub fn book(index: usize, book: BookData) -> Self {
        BookEntry {
            index,
            blueprint: None,
            blueprint_book: Some(book),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::payload::{Payload, BOOK_ITEM};
    use crate::document::placed_object::ObjectId;
    use crate::geometry::direction::{Direction, DirectionType};
    use serde_json::json;

    #[test]
    fn test_parse_blueprint() {
        let payload: Payload = serde_json::from_value(json!({
            "blueprint": {
                "item": "blueprint",
                "entities": [{
                    "entity_number": 1,
                    "name": "underground-belt",
                    "position": {"x": 0.5, "y": -1},
                    "direction": 2,
                    "type": "output",
                    "tags": {"note": "kept"}
                }],
                "version": 281479278886912u64,
                "snap-to-grid": {"x": 4, "y": 4}
            }
        }))
        .unwrap();
        let Payload::Blueprint(blueprint) = payload else {
            panic!("expected a blueprint");
        };
        let entity = &blueprint.entities.as_ref().unwrap()[0];
        assert_eq!(entity.entity_number, ObjectId(1));
        assert_eq!(entity.position.y, -1.0);
        assert_eq!(entity.direction, Some(Direction::East));
        assert_eq!(entity.direction_type, Some(DirectionType::Output));
        assert!(entity.settings.extra.contains_key("tags"));
        assert!(blueprint.extra.contains_key("snap-to-grid"));
    }

    #[test]
    fn test_book_entries() {
        let payload: Payload = serde_json::from_value(json!({
            "blueprint_book": {
                "blueprints": [
                    {"index": 0, "blueprint": {"label": "a"}},
                    {"index": 1, "deconstruction_planner": {"item": "deconstruction-planner"}},
                    {"index": 2, "blueprint_book": {"blueprints": []}}
                ],
                "active_index": 2
            }
        }))
        .unwrap();
        let Payload::BlueprintBook(book) = payload else {
            panic!("expected a book");
        };
        assert_eq!(book.item, BOOK_ITEM);
        assert_eq!(book.blueprints[0].blueprint.as_ref().and_then(|b| b.label.as_deref()), Some("a"));
        assert!(book.blueprints[1].extra.contains_key("deconstruction_planner"));
        assert!(book.blueprints[2].blueprint_book.is_some());

        let serialized = serde_json::to_value(Payload::BlueprintBook(book)).unwrap();
        assert_eq!(serialized["blueprint_book"]["blueprints"][1]["deconstruction_planner"]["item"], "deconstruction-planner");
        assert!(serialized["blueprint_book"].get("label").is_none());
    }
}
