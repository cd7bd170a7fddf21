use crate::catalog::Catalog;
use crate::errors::CodecError;
use derive_more::Display;
use log::debug;
use serde_json::{Map, Value};

/// Entities that only exist on trains, which documents can not represent.
const TRAIN_ENTITIES: [&str; 4] = ["locomotive", "cargo-wagon", "fluid-wagon", "artillery-wagon"];

/// Tiles that are valid in blueprints even when the catalog does not list them.
const ALWAYS_VALID_TILES: [&str; 1] = ["landfill"];

const MAX_ICON_COUNT: usize = 4;

/// Connector ids of the top-level wire list go from 1 to this.
const MAX_WIRE_CONNECTOR: u8 = 6;

/// What kind of check failed. The first group are lookups in the catalog, the rest are structural.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum Keyword {
    #[display(fmt = "entity")]
    Entity,
    #[display(fmt = "item")]
    Item,
    #[display(fmt = "recipe")]
    Recipe,
    #[display(fmt = "tile")]
    Tile,
    #[display(fmt = "signal")]
    Signal,
    #[display(fmt = "type")]
    Type,
    #[display(fmt = "range")]
    Range,
    #[display(fmt = "maxItems")]
    MaxItems,
}

impl Keyword {
    pub fn is_catalog_lookup(self) -> bool {
        matches!(
            self,
            Keyword::Entity | Keyword::Item | Keyword::Recipe | Keyword::Tile | Keyword::Signal
        )
    }
}

/// One failed check, with a JSON pointer to the offending value.
#[derive(Debug, Clone, PartialEq, Display)]
#[display(fmt = "{} at {} ({})", keyword, path, data)]
pub struct ValidationIssue {
    pub path: String,
    pub keyword: Keyword,
    pub data: Value,
}

/// Checks the parsed JSON of a blueprint string against the structure of blueprints and the names in the catalog.
pub fn validate(value: &Value, catalog: &Catalog) -> Vec<ValidationIssue> {
    let mut validator = Validator {
        catalog,
        issues: Vec::new(),
    };
    match value.as_object() {
        Some(root) if root.len() == 1 && root.contains_key("blueprint") => {
            validator.blueprint("/blueprint", &root["blueprint"]);
        }
        Some(root) if root.len() == 1 && root.contains_key("blueprint_book") => {
            validator.book("/blueprint_book", &root["blueprint_book"]);
        }
        _ => validator.issue("", Keyword::Type, value.clone()),
    }
    validator.issues
}

/// Chooses the error for a non-empty list of issues: train content first, then unknown names, then the list itself.
pub fn classify(issues: Vec<ValidationIssue>) -> CodecError {
    let is_train = |issue: &ValidationIssue| {
        issue.keyword == Keyword::Entity && issue.data.as_str().is_some_and(|name| TRAIN_ENTITIES.contains(&name))
    };
    if issues.iter().any(is_train) {
        debug!("Blueprint rejected for train content.");
        return CodecError::UnsupportedTrainContent;
    }

    if issues.iter().any(|issue| issue.keyword.is_catalog_lookup()) {
        let mut names = Vec::new();
        for issue in issues.iter().filter(|issue| issue.keyword.is_catalog_lookup()) {
            let name = match &issue.data {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        debug!("Blueprint rejected for {} unknown names.", names.len());
        return CodecError::ModdedContent(names);
    }

    debug!("Blueprint rejected with {} schema issues.", issues.len());
    CodecError::SchemaInvalid(issues)
}

struct Validator<'a> {
    catalog: &'a Catalog,
    issues: Vec<ValidationIssue>,
}

impl Validator<'_> {
    fn issue(&mut self, path: &str, keyword: Keyword, data: Value) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            keyword,
            data,
        });
    }

    fn object<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        let object = value.as_object();
        if object.is_none() {
            self.issue(path, Keyword::Type, value.clone());
        }
        object
    }

    fn array<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Vec<Value>> {
        let array = value.as_array();
        if array.is_none() {
            self.issue(path, Keyword::Type, value.clone());
        }
        array
    }

    fn string<'v>(&mut self, path: &str, value: Option<&'v Value>) -> Option<&'v str> {
        let string = value.and_then(Value::as_str);
        if string.is_none() {
            self.issue(path, Keyword::Type, value.cloned().unwrap_or(Value::Null));
        }
        string
    }

    fn optional_string(&mut self, path: &str, value: Option<&Value>) {
        if value.is_some_and(|value| !value.is_string()) {
            self.string(path, value);
        }
    }

    fn integer_in(&mut self, path: &str, value: Option<&Value>, min: u64, max: u64) {
        match value.map(|value| (value, value.as_u64())) {
            Some((_, Some(number))) if (min..=max).contains(&number) => {}
            Some((value, _)) => self.issue(path, Keyword::Range, value.clone()),
            None => self.issue(path, Keyword::Type, Value::Null),
        }
    }

    fn position(&mut self, path: &str, value: Option<&Value>) {
        let is_point = value
            .and_then(Value::as_object)
            .is_some_and(|point| point.get("x").is_some_and(Value::is_number) && point.get("y").is_some_and(Value::is_number));
        if !is_point {
            self.issue(path, Keyword::Type, value.cloned().unwrap_or(Value::Null));
        }
    }

    fn item(&mut self, path: &str, value: Option<&Value>) {
        if let Some(name) = self.string(path, value) {
            if !self.catalog.has_item(name) {
                self.issue(path, Keyword::Item, Value::String(name.to_string()));
            }
        }
    }

    /// `[entity, connector, entity, connector]`.
    fn wire(&mut self, path: &str, value: &Value) {
        let Some(wire) = self.array(path, value) else {
            return;
        };
        if wire.len() != 4 {
            self.issue(path, Keyword::Type, value.clone());
            return;
        }
        for (i, part) in wire.iter().enumerate() {
            let (min, max) = if i % 2 == 0 {
                (1, u32::MAX as u64)
            } else {
                (1, MAX_WIRE_CONNECTOR as u64)
            };
            self.integer_in(&format!("{}/{}", path, i), Some(part), min, max);
        }
    }

    fn book(&mut self, path: &str, value: &Value) {
        let Some(book) = self.object(path, value) else {
            return;
        };
        self.optional_string(&format!("{}/label", path), book.get("label"));
        if let Some(icons) = book.get("icons") {
            self.icons(&format!("{}/icons", path), icons);
        }
        if let Some(index) = book.get("active_index") {
            if !index.is_u64() {
                self.issue(&format!("{}/active_index", path), Keyword::Type, index.clone());
            }
        }
        let Some(blueprints) = book.get("blueprints") else {
            return;
        };
        let path = format!("{}/blueprints", path);
        let Some(entries) = self.array(&path, blueprints) else {
            return;
        };
        for (i, entry) in entries.iter().enumerate() {
            let entry_path = format!("{}/{}", path, i);
            let Some(entry) = self.object(&entry_path, entry) else {
                continue;
            };
            if let Some(blueprint) = entry.get("blueprint") {
                self.blueprint(&format!("{}/blueprint", entry_path), blueprint);
            }
            if let Some(book) = entry.get("blueprint_book") {
                self.book(&format!("{}/blueprint_book", entry_path), book);
            }
        }
    }

    fn blueprint(&mut self, path: &str, value: &Value) {
        let Some(blueprint) = self.object(path, value) else {
            return;
        };
        self.optional_string(&format!("{}/label", path), blueprint.get("label"));
        if let Some(version) = blueprint.get("version") {
            if !version.is_u64() {
                self.issue(&format!("{}/version", path), Keyword::Type, version.clone());
            }
        }
        if let Some(icons) = blueprint.get("icons") {
            self.icons(&format!("{}/icons", path), icons);
        }
        if let Some(entities) = blueprint.get("entities") {
            let path = format!("{}/entities", path);
            if let Some(entities) = self.array(&path, entities) {
                for (i, entity) in entities.iter().enumerate() {
                    self.entity(&format!("{}/{}", path, i), entity);
                }
            }
        }
        if let Some(wires) = blueprint.get("wires") {
            let path = format!("{}/wires", path);
            if let Some(wires) = self.array(&path, wires) {
                for (i, wire) in wires.iter().enumerate() {
                    self.wire(&format!("{}/{}", path, i), wire);
                }
            }
        }
        if let Some(tiles) = blueprint.get("tiles") {
            let path = format!("{}/tiles", path);
            if let Some(tiles) = self.array(&path, tiles) {
                for (i, tile) in tiles.iter().enumerate() {
                    self.tile(&format!("{}/{}", path, i), tile);
                }
            }
        }
    }

    fn entity(&mut self, path: &str, value: &Value) {
        let Some(entity) = self.object(path, value) else {
            return;
        };
        let name_path = format!("{}/name", path);
        if let Some(name) = self.string(&name_path, entity.get("name")) {
            if !self.catalog.has_entity(name) {
                self.issue(&name_path, Keyword::Entity, Value::String(name.to_string()));
            }
        }
        self.integer_in(
            &format!("{}/entity_number", path),
            entity.get("entity_number"),
            1,
            u32::MAX as u64,
        );
        self.position(&format!("{}/position", path), entity.get("position"));
        if let Some(direction) = entity.get("direction") {
            self.integer_in(&format!("{}/direction", path), Some(direction), 0, 7);
        }
        if let Some(kind) = entity.get("type") {
            if !matches!(kind.as_str(), Some("input" | "output")) {
                self.issue(&format!("{}/type", path), Keyword::Type, kind.clone());
            }
        }

        if let Some(recipe) = entity.get("recipe") {
            let recipe_path = format!("{}/recipe", path);
            if let Some(recipe) = self.string(&recipe_path, Some(recipe)) {
                if !self.catalog.has_recipe(recipe) {
                    self.issue(&recipe_path, Keyword::Recipe, Value::String(recipe.to_string()));
                }
            }
        }
        if let Some(items) = entity.get("items") {
            let items_path = format!("{}/items", path);
            if let Some(items) = self.object(&items_path, items) {
                for (name, count) in items {
                    let item_path = format!("{}/{}", items_path, name);
                    if !self.catalog.has_item(name) {
                        self.issue(&item_path, Keyword::Item, Value::String(name.clone()));
                    }
                    if !count.is_u64() {
                        self.issue(&item_path, Keyword::Type, count.clone());
                    }
                }
            }
        }
        for field in ["filters", "request_filters"] {
            let Some(filters) = entity.get(field) else {
                continue;
            };
            let filters_path = format!("{}/{}", path, field);
            let Some(filters) = self.array(&filters_path, filters) else {
                continue;
            };
            for (i, filter) in filters.iter().enumerate() {
                let filter_path = format!("{}/{}", filters_path, i);
                if let Some(filter) = self.object(&filter_path, filter) {
                    self.item(&format!("{}/name", filter_path), filter.get("name"));
                    self.integer_in(&format!("{}/index", filter_path), filter.get("index"), 1, u32::MAX as u64);
                }
            }
        }
        if let Some(filter) = entity.get("filter") {
            self.item(&format!("{}/filter", path), Some(filter));
        }
    }

    fn tile(&mut self, path: &str, value: &Value) {
        let Some(tile) = self.object(path, value) else {
            return;
        };
        let name_path = format!("{}/name", path);
        if let Some(name) = self.string(&name_path, tile.get("name")) {
            if !self.catalog.has_tile(name) && !ALWAYS_VALID_TILES.contains(&name) {
                self.issue(&name_path, Keyword::Tile, Value::String(name.to_string()));
            }
        }
        self.position(&format!("{}/position", path), tile.get("position"));
    }

    fn icons(&mut self, path: &str, value: &Value) {
        let Some(icons) = self.array(path, value) else {
            return;
        };
        if icons.len() > MAX_ICON_COUNT {
            self.issue(path, Keyword::MaxItems, Value::from(icons.len()));
        }
        for (i, icon) in icons.iter().enumerate() {
            let icon_path = format!("{}/{}", path, i);
            let Some(icon) = self.object(&icon_path, icon) else {
                continue;
            };
            self.integer_in(&format!("{}/index", icon_path), icon.get("index"), 1, MAX_ICON_COUNT as u64);
            let signal_path = format!("{}/signal", icon_path);
            let Some(signal) = icon.get("signal").and_then(Value::as_object) else {
                self.issue(&signal_path, Keyword::Type, icon.get("signal").cloned().unwrap_or(Value::Null));
                continue;
            };
            // Icon slots may be left empty.
            if let Some(name) = signal.get("name").filter(|name| !name.is_null()) {
                let name_path = format!("{}/name", signal_path);
                if let Some(name) = self.string(&name_path, Some(name)) {
                    if self.catalog.signal_type(name).is_none() {
                        self.issue(&name_path, Keyword::Signal, Value::String(name.to_string()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixture::test_catalog;
    use crate::codec::validation::{classify, validate, Keyword, ValidationIssue};
    use crate::errors::CodecError;
    use serde_json::json;

    #[test]
    fn test_valid_blueprint() {
        let catalog = test_catalog();
        let value = json!({"blueprint": {
            "item": "blueprint",
            "icons": [{"index": 1, "signal": {"type": "item", "name": "assembling-machine-2"}}],
            "entities": [{
                "entity_number": 1,
                "name": "assembling-machine-2",
                "position": {"x": 1.5, "y": 1.5},
                "recipe": "electronic-circuit",
                "items": {"speed-module": 2}
            }, {
                "entity_number": 2,
                "name": "splitter",
                "position": {"x": 5, "y": 0.5},
                "direction": 2,
                "filter": "iron-plate"
            }],
            "tiles": [{"name": "landfill", "position": {"x": 0, "y": 0}}],
            "version": 281479278886912u64
        }});
        assert_eq!(validate(&value, &catalog), vec![]);
    }

    #[test]
    fn test_structural_issues() {
        let catalog = test_catalog();
        let value = json!({"blueprint": {
            "icons": [
                {"index": 0, "signal": {"name": "signal-A"}},
                {"index": 2, "signal": {}},
                {"index": 3, "signal": {"name": "signal-B"}},
                {"index": 4, "signal": {"name": "signal-B"}},
                {"index": 4, "signal": {"name": "signal-B"}}
            ],
            "entities": [{"entity_number": 0, "name": "inserter", "position": {"x": 0.5}, "direction": 9}]
        }});
        let issues = validate(&value, &catalog);
        let keywords = issues.iter().map(|issue| (issue.path.as_str(), issue.keyword)).collect::<Vec<_>>();
        assert_eq!(
            keywords,
            vec![
                ("/blueprint/icons", Keyword::MaxItems),
                ("/blueprint/icons/0/index", Keyword::Range),
                ("/blueprint/entities/0/entity_number", Keyword::Range),
                ("/blueprint/entities/0/position", Keyword::Type),
                ("/blueprint/entities/0/direction", Keyword::Range),
            ]
        );
        assert!(matches!(classify(issues), CodecError::SchemaInvalid(issues) if issues.len() == 5));
        assert_eq!(validate(&json!({"upgrade_planner": {}}), &catalog).len(), 1);
    }

    #[test]
    fn test_unknown_names_in_book() {
        let catalog = test_catalog();
        let value = json!({"blueprint_book": {
            "blueprints": [{"index": 0, "blueprint_book": {"blueprints": [{"index": 0, "blueprint": {
                "entities": [
                    {"entity_number": 1, "name": "laser-turret", "position": {"x": 0, "y": 0}},
                    {"entity_number": 2, "name": "filter-inserter", "position": {"x": 3.5, "y": 0.5},
                     "filters": [{"index": 1, "name": "unobtainium"}]},
                    {"entity_number": 3, "name": "laser-turret", "position": {"x": 6, "y": 0}}
                ],
                "tiles": [{"name": "refined-concrete", "position": {"x": 0, "y": 0}}]
            }}]}}]
        }});
        let issues = validate(&value, &catalog);
        assert_eq!(issues.len(), 4);
        assert_eq!(
            issues[0].path,
            "/blueprint_book/blueprints/0/blueprint_book/blueprints/0/blueprint/entities/0/name"
        );
        match classify(issues) {
            CodecError::ModdedContent(names) => {
                assert_eq!(names, vec!["laser-turret", "unobtainium", "refined-concrete"])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_train_content() {
        let catalog = test_catalog();
        let value = json!({"blueprint": {"entities": [
            {"entity_number": 1, "name": "laser-turret", "position": {"x": 0, "y": 0}},
            {"entity_number": 2, "name": "locomotive", "position": {"x": 0, "y": 5}}
        ]}});
        assert!(matches!(classify(validate(&value, &catalog)), CodecError::UnsupportedTrainContent));
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue {
            path: "/blueprint/entities/0/direction".to_string(),
            keyword: Keyword::Range,
            data: json!(9),
        };
        assert_eq!(issue.to_string(), "range at /blueprint/entities/0/direction (9)");
    }
}
