use crate::geometry::direction::{Direction, DirectionType};
use crate::geometry::Point;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;

/// Identifier of an object within its document. Serialized as the entity number.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display(fmt = "#{}", _0)]
pub struct ObjectId(pub u32);

pub type ObjectTable = BTreeMap<ObjectId, PlacedObject>;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Whitelist,
    Blacklist,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    pub index: u32,
    pub name: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RequestFilter {
    pub index: u32,
    pub name: String,
    pub count: u32,
}

/// Per-type settings of an object. Which fields are meaningful depends on the entity kind and is checked against the
/// catalog by the setters of the document. Anything the engine does not model is kept verbatim in `extra`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectSettings {
    pub recipe: Option<String>,
    /// Modules by item name.
    pub items: Option<BTreeMap<String, u32>>,
    pub filters: Option<Vec<ItemFilter>>,
    pub request_filters: Option<Vec<RequestFilter>>,
    pub request_from_buffers: Option<bool>,
    /// Splitter output filter.
    pub filter: Option<String>,
    pub input_priority: Option<Priority>,
    pub output_priority: Option<Priority>,
    pub filter_mode: Option<FilterMode>,
    pub override_stack_size: Option<u32>,
    pub bar: Option<u32>,
    pub station: Option<String>,
    pub manual_trains_limit: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectSettings {
    /// Module names with their multiplicity, sorted by name.
    pub fn module_list(&self) -> Vec<String> {
        self.items
            .iter()
            .flatten()
            .flat_map(|(name, count)| std::iter::repeat(name.clone()).take(*count as usize))
            .collect()
    }
}

/// One placed building.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub name: String,
    pub position: Point,
    pub direction: Direction,
    pub direction_type: Option<DirectionType>,
    pub settings: ObjectSettings,
}

/// Description of an object to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObject {
    pub id: Option<ObjectId>,
    pub name: String,
    pub position: Point,
    pub direction: Direction,
    pub direction_type: Option<DirectionType>,
    pub settings: ObjectSettings,
}

impl NewObject {
    pub fn new(name: &str, position: Point) -> Self {
        NewObject {
            id: None,
            name: name.to_string(),
            position,
            direction: Direction::North,
            direction_type: None,
            settings: ObjectSettings::default(),
        }
    }

    pub fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_direction_type(mut self, direction_type: DirectionType) -> Self {
        self.direction_type = Some(direction_type);
        self
    }

    pub fn with_settings(mut self, settings: ObjectSettings) -> Self {
        self.settings = settings;
        self
    }

    pub(crate) fn into_object(self, id: ObjectId) -> PlacedObject {
        PlacedObject {
            id,
            name: self.name,
            position: self.position,
            direction: self.direction,
            direction_type: self.direction_type,
            settings: self.settings,
        }
    }
}

impl From<&PlacedObject> for NewObject {
    fn from(object: &PlacedObject) -> Self {
        NewObject {
            id: Some(object.id),
            name: object.name.clone(),
            position: object.position,
            direction: object.direction,
            direction_type: object.direction_type,
            settings: object.settings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::placed_object::{ObjectSettings, Priority};
    use serde_json::json;

    #[test]
    fn test_settings_keep_unknown_fields() {
        let settings: ObjectSettings = serde_json::from_value(json!({
            "recipe": "iron-gear-wheel",
            "input_priority": "left",
            "control_behavior": {"circuit_enable_disable": true}
        }))
        .unwrap();
        assert_eq!(settings.recipe.as_deref(), Some("iron-gear-wheel"));
        assert_eq!(settings.input_priority, Some(Priority::Left));
        assert!(settings.extra.contains_key("control_behavior"));
        let serialized = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            serialized,
            json!({
                "recipe": "iron-gear-wheel",
                "input_priority": "left",
                "control_behavior": {"circuit_enable_disable": true}
            })
        );
    }

    #[test]
    fn test_module_list() {
        let settings: ObjectSettings =
            serde_json::from_value(json!({"items": {"speed-module": 2, "efficiency-module": 1}})).unwrap();
        assert_eq!(
            settings.module_list(),
            vec!["efficiency-module", "speed-module", "speed-module"]
        );
    }
}
