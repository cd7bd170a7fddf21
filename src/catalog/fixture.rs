use crate::catalog::prototypes::EntityFlag::{BuildingDirection8Way, NotRotatable, PlaceableOffGrid};
use crate::catalog::prototypes::EntityKind::*;
use crate::catalog::prototypes::{EntityPrototype, ItemPrototype, ModulePrototype, RecipePrototype, TilePrototype};
use crate::catalog::Catalog;
use std::rc::Rc;

const MACHINE_EFFECTS: [&str; 4] = ["consumption", "speed", "productivity", "pollution"];

fn module(name: &str, category: &str, effects: &[&str]) -> ItemPrototype {
    ItemPrototype {
        name: name.to_string(),
        module: Some(ModulePrototype {
            category: category.to_string(),
            effects: effects.iter().map(|e| e.to_string()).collect(),
        }),
    }
}

fn item(name: &str) -> ItemPrototype {
    ItemPrototype {
        name: name.to_string(),
        module: None,
    }
}

fn recipe(name: &str, category: &str, allow_productivity: bool) -> RecipePrototype {
    RecipePrototype {
        name: name.to_string(),
        category: category.to_string(),
        allow_productivity,
    }
}

fn tile(name: &str, item: &str) -> TilePrototype {
    TilePrototype {
        name: name.to_string(),
        item: Some(item.to_string()),
    }
}

/// A small vanilla-like catalog shared by the tests.
pub fn test_catalog() -> Catalog {
    let entities = vec![
        EntityPrototype::new("wooden-chest", Container, 1, 1).with_group("container").with_flag(NotRotatable),
        EntityPrototype::new("iron-chest", Container, 1, 1).with_group("container").with_flag(NotRotatable),
        EntityPrototype::new("logistic-chest-requester", LogisticContainer, 1, 1)
            .with_group("container")
            .with_flag(NotRotatable)
            .with_filter_count(12),
        EntityPrototype::new("transport-belt", TransportBelt, 1, 1).with_group("transport-belt"),
        EntityPrototype::new("fast-transport-belt", TransportBelt, 1, 1).with_group("transport-belt"),
        EntityPrototype::new("underground-belt", UndergroundBelt, 1, 1)
            .with_group("underground-belt")
            .with_max_distance(5),
        EntityPrototype::new("fast-underground-belt", UndergroundBelt, 1, 1)
            .with_group("underground-belt")
            .with_max_distance(7),
        EntityPrototype::new("splitter", Splitter, 2, 1).with_group("splitter").with_filter_count(1),
        EntityPrototype::new("fast-splitter", Splitter, 2, 1).with_group("splitter").with_filter_count(1),
        EntityPrototype::new("inserter", Inserter, 1, 1).with_group("inserter"),
        EntityPrototype::new("filter-inserter", Inserter, 1, 1).with_group("inserter").with_filter_count(5),
        EntityPrototype::new("assembling-machine-1", AssemblingMachine, 3, 3)
            .with_group("assembling-machine")
            .with_crafting_categories(&["crafting"]),
        EntityPrototype::new("assembling-machine-2", AssemblingMachine, 3, 3)
            .with_group("assembling-machine")
            .with_crafting_categories(&["crafting", "advanced-crafting", "crafting-with-fluid"])
            .with_modules(2, &MACHINE_EFFECTS),
        EntityPrototype::new("electric-furnace", Furnace, 3, 3)
            .with_crafting_categories(&["smelting"])
            .with_modules(2, &MACHINE_EFFECTS)
            .with_flag(NotRotatable),
        EntityPrototype::new("beacon", Beacon, 3, 3)
            .with_modules(2, &["consumption", "speed", "pollution"])
            .with_flag(NotRotatable),
        EntityPrototype::new("small-electric-pole", ElectricPole, 1, 1)
            .with_wire_distance(7.5, 0.0)
            .with_flag(NotRotatable),
        EntityPrototype::new("medium-electric-pole", ElectricPole, 1, 1)
            .with_wire_distance(9.0, 0.0)
            .with_flag(NotRotatable),
        EntityPrototype::new("big-electric-pole", ElectricPole, 2, 2)
            .with_wire_distance(30.0, 0.0)
            .with_flag(NotRotatable),
        EntityPrototype::new("power-switch", PowerSwitch, 2, 2)
            .with_wire_distance(10.0, 10.0)
            .with_flag(NotRotatable),
        EntityPrototype::new("constant-combinator", ConstantCombinator, 1, 1).with_wire_distance(0.0, 9.0),
        EntityPrototype::new("arithmetic-combinator", ArithmeticCombinator, 1, 2).with_wire_distance(0.0, 9.0),
        EntityPrototype::new("straight-rail", StraightRail, 2, 2).with_flag(BuildingDirection8Way),
        EntityPrototype::new("curved-rail", CurvedRail, 4, 8).with_flag(BuildingDirection8Way),
        EntityPrototype::new("gate", Gate, 1, 1),
        EntityPrototype::new("stone-wall", Wall, 1, 1).with_flag(NotRotatable),
        EntityPrototype::new("rail-signal", RailSignal, 1, 1).with_flag(BuildingDirection8Way),
        EntityPrototype::new("rail-chain-signal", RailChainSignal, 1, 1).with_flag(BuildingDirection8Way),
        EntityPrototype::new("train-stop", TrainStop, 2, 2),
        EntityPrototype::new("pipe", Pipe, 1, 1).with_group("pipe").with_flag(NotRotatable),
        EntityPrototype::new("pipe-to-ground", PipeToGround, 1, 1)
            .with_group("pipe")
            .with_max_distance(10),
        EntityPrototype::new("pumpjack", MiningDrill, 3, 3).with_modules(2, &MACHINE_EFFECTS),
        EntityPrototype::new("land-mine", Other, 1, 1).with_flag(PlaceableOffGrid),
    ];

    let mut catalog = Catalog::default();
    for entity in entities {
        catalog = catalog.with_item(item(&entity.name)).with_entity(entity);
    }
    for name in [
        "iron-plate",
        "copper-plate",
        "copper-cable",
        "iron-gear-wheel",
        "electronic-circuit",
        "wood",
        "automation-science-pack",
        "logistic-science-pack",
        "stone-brick",
        "concrete",
        "landfill",
    ] {
        catalog = catalog.with_item(item(name));
    }
    catalog
        .with_item(module("speed-module", "speed", &["speed", "consumption"]))
        .with_item(module("productivity-module", "productivity", &MACHINE_EFFECTS))
        .with_item(module("efficiency-module", "effectivity", &["consumption"]))
        .with_recipe(recipe("iron-gear-wheel", "crafting", true))
        .with_recipe(recipe("electronic-circuit", "crafting", true))
        .with_recipe(recipe("automation-science-pack", "crafting", true))
        .with_recipe(recipe("assembling-machine-1", "crafting", false))
        .with_recipe(recipe("iron-plate", "smelting", true))
        .with_fluid("water")
        .with_tile(tile("stone-path", "stone-brick"))
        .with_tile(tile("concrete", "concrete"))
        .with_tile(tile("landfill", "landfill"))
        .with_signal("signal-A")
        .with_signal("signal-B")
}

pub fn shared_test_catalog() -> Rc<Catalog> {
    Rc::new(test_catalog())
}
