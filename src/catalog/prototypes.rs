use crate::geometry::area::Area;
use crate::geometry::direction::Direction;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Behavior class of an entity, as far as the document engine cares about it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    AssemblingMachine,
    Furnace,
    RocketSilo,
    Beacon,
    MiningDrill,
    Lab,
    Inserter,
    TransportBelt,
    UndergroundBelt,
    Splitter,
    Loader,
    Pipe,
    PipeToGround,
    ElectricPole,
    PowerSwitch,
    StraightRail,
    CurvedRail,
    Gate,
    Wall,
    RailSignal,
    RailChainSignal,
    TrainStop,
    ArithmeticCombinator,
    DeciderCombinator,
    ConstantCombinator,
    Container,
    LogisticContainer,
    #[default]
    #[serde(other)]
    Other,
}

impl EntityKind {
    pub fn is_rail(self) -> bool {
        matches!(self, EntityKind::StraightRail | EntityKind::CurvedRail)
    }

    pub fn is_rail_signal(self) -> bool {
        matches!(self, EntityKind::RailSignal | EntityKind::RailChainSignal)
    }

    /// Objects paired with a partner of the same type some distance away in their direction.
    pub fn is_underground(self) -> bool {
        matches!(self, EntityKind::UndergroundBelt | EntityKind::PipeToGround)
    }

    pub fn is_crafting_machine(self) -> bool {
        matches!(
            self,
            EntityKind::AssemblingMachine | EntityKind::Furnace | EntityKind::RocketSilo
        )
    }

    /// Combinators have a separate input and output terminal.
    pub fn has_two_terminals(self) -> bool {
        matches!(
            self,
            EntityKind::ArithmeticCombinator | EntityKind::DeciderCombinator
        )
    }

    /// Mirroring these would change which side of the track they are on.
    pub fn is_flippable(self) -> bool {
        !matches!(
            self,
            EntityKind::TrainStop | EntityKind::RailSignal | EntityKind::RailChainSignal
        )
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityFlag {
    NotRotatable,
    BuildingDirection8Way,
    PlaceableOffGrid,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Default for Size {
    fn default() -> Self {
        Size { width: 1, height: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPrototype {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub flags: Vec<EntityFlag>,
    #[serde(default)]
    pub fast_replaceable_group: Option<String>,
    /// Copper wire reach. Zero for objects without power terminals.
    #[serde(default)]
    pub max_wire_distance: f64,
    #[serde(default)]
    pub circuit_wire_max_distance: f64,
    /// Maximum distance to an underground partner.
    #[serde(default)]
    pub max_distance: u32,
    #[serde(default)]
    pub module_slots: u32,
    #[serde(default)]
    pub crafting_categories: Vec<String>,
    /// Module effects this entity accepts. Empty means any.
    #[serde(default)]
    pub allowed_effects: Vec<String>,
    #[serde(default)]
    pub filter_count: u32,
    /// The item that places this entity, if named differently.
    #[serde(default)]
    pub item: Option<String>,
}

impl EntityPrototype {
    pub fn new(name: &str, kind: EntityKind, width: i32, height: i32) -> Self {
        EntityPrototype {
            name: name.to_string(),
            kind,
            size: Size { width, height },
            flags: Vec::new(),
            fast_replaceable_group: None,
            max_wire_distance: 0.0,
            circuit_wire_max_distance: 0.0,
            max_distance: 0,
            module_slots: 0,
            crafting_categories: Vec::new(),
            allowed_effects: Vec::new(),
            filter_count: 0,
            item: None,
        }
    }

    pub fn with_flag(mut self, flag: EntityFlag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.fast_replaceable_group = Some(group.to_string());
        self
    }

    pub fn with_wire_distance(mut self, power: f64, circuit: f64) -> Self {
        self.max_wire_distance = power;
        self.circuit_wire_max_distance = circuit;
        self
    }

    pub fn with_max_distance(mut self, max_distance: u32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_modules(mut self, slots: u32, allowed_effects: &[&str]) -> Self {
        self.module_slots = slots;
        self.allowed_effects = allowed_effects.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_crafting_categories(mut self, categories: &[&str]) -> Self {
        self.crafting_categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_filter_count(mut self, filter_count: u32) -> Self {
        self.filter_count = filter_count;
        self
    }

    pub fn has_flag(&self, flag: EntityFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_rotatable(&self) -> bool {
        !self.has_flag(EntityFlag::NotRotatable)
    }

    pub fn is_eight_way(&self) -> bool {
        self.has_flag(EntityFlag::BuildingDirection8Way)
    }

    /// Width and height after rotation. Non-square footprints are transposed when facing east or west.
    pub fn size_for(&self, direction: Direction) -> (i32, i32) {
        let Size { width, height } = self.size;
        if width != height && direction.is_horizontal() {
            (height, width)
        } else {
            (width, height)
        }
    }

    pub fn footprint(&self, position: Point, direction: Direction) -> Area {
        let (width, height) = self.size_for(direction);
        Area::new(position, width, height)
    }

    /// Reach of wires attached to this entity. Power reach takes precedence over circuit reach.
    pub fn max_wire_distance(&self) -> f64 {
        if self.max_wire_distance > 0.0 {
            self.max_wire_distance
        } else {
            self.circuit_wire_max_distance
        }
    }

    pub fn placing_item(&self) -> &str {
        self.item.as_deref().unwrap_or(&self.name)
    }

    /// Whether `other` may replace this entity in place.
    pub fn shares_replace_group(&self, other: &EntityPrototype) -> bool {
        match (&self.fast_replaceable_group, &other.fast_replaceable_group) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulePrototype {
    pub category: String,
    #[serde(default)]
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPrototype {
    pub name: String,
    #[serde(default)]
    pub module: Option<ModulePrototype>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePrototype {
    pub name: String,
    #[serde(default = "default_recipe_category")]
    pub category: String,
    #[serde(default)]
    pub allow_productivity: bool,
}

fn default_recipe_category() -> String {
    "crafting".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilePrototype {
    pub name: String,
    #[serde(default)]
    pub item: Option<String>,
}

impl TilePrototype {
    pub fn placing_item(&self) -> &str {
        self.item.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Item,
    Fluid,
    Virtual,
}

#[cfg(test)]
mod tests {
    use crate::catalog::prototypes::{EntityKind, EntityPrototype};
    use crate::geometry::direction::Direction;
    use crate::geometry::Point;

    #[test]
    fn test_size_for_direction() {
        let combinator = EntityPrototype::new("arithmetic-combinator", EntityKind::ArithmeticCombinator, 1, 2);
        assert_eq!(combinator.size_for(Direction::North), (1, 2));
        assert_eq!(combinator.size_for(Direction::East), (2, 1));
        assert_eq!(combinator.size_for(Direction::South), (1, 2));
        let area = combinator.footprint(Point::new(1.0, 0.5), Direction::West);
        assert_eq!((area.width, area.height), (2, 1));
    }

    #[test]
    fn test_replace_group() {
        let a = EntityPrototype::new("a", EntityKind::TransportBelt, 1, 1).with_group("belt");
        let b = EntityPrototype::new("b", EntityKind::TransportBelt, 1, 1).with_group("belt");
        let c = EntityPrototype::new("c", EntityKind::TransportBelt, 1, 1).with_group("");
        let d = EntityPrototype::new("d", EntityKind::TransportBelt, 1, 1);
        assert!(a.shares_replace_group(&b));
        assert!(!c.shares_replace_group(&c.clone()));
        assert!(!a.shares_replace_group(&d));
    }

    #[test]
    fn test_deserialize_defaults() {
        let prototype: EntityPrototype = serde_json::from_str(
            r#"{"name": "modded-thing", "type": "some-unknown-type", "size": {"width": 2, "height": 3}}"#,
        )
        .unwrap();
        assert_eq!(prototype.kind, EntityKind::Other);
        assert_eq!(prototype.size.height, 3);
        assert!(prototype.is_rotatable());
        assert_eq!(prototype.max_wire_distance(), 0.0);
    }
}
