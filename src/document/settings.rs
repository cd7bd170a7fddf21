use crate::catalog::prototypes::{EntityKind, EntityPrototype};
use crate::document::events::{DocumentEvent, ObjectProperty};
use crate::document::placed_object::{ItemFilter, ObjectId, PlacedObject, Priority, RequestFilter};
use crate::document::state::{DocumentState, ObjectField};
use crate::document::Document;
use crate::history::property_path::PropertyPath;
use log::trace;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

type Modules = BTreeMap<String, u32>;

fn recipe(object: &mut PlacedObject) -> &mut Option<String> {
    &mut object.settings.recipe
}

fn items(object: &mut PlacedObject) -> &mut Option<Modules> {
    &mut object.settings.items
}

fn filters(object: &mut PlacedObject) -> &mut Option<Vec<ItemFilter>> {
    &mut object.settings.filters
}

fn request_filters(object: &mut PlacedObject) -> &mut Option<Vec<RequestFilter>> {
    &mut object.settings.request_filters
}

fn request_from_buffers(object: &mut PlacedObject) -> &mut Option<bool> {
    &mut object.settings.request_from_buffers
}

fn splitter_filter(object: &mut PlacedObject) -> &mut Option<String> {
    &mut object.settings.filter
}

fn input_priority(object: &mut PlacedObject) -> &mut Option<Priority> {
    &mut object.settings.input_priority
}

fn output_priority(object: &mut PlacedObject) -> &mut Option<Priority> {
    &mut object.settings.output_priority
}

fn station(object: &mut PlacedObject) -> &mut Option<String> {
    &mut object.settings.station
}

fn extra(object: &mut PlacedObject) -> &mut Map<String, Value> {
    &mut object.settings.extra
}

fn count_modules(modules: &[String]) -> Option<Modules> {
    let mut counts = Modules::new();
    for module in modules {
        *counts.entry(module.clone()).or_insert(0) += 1;
    }
    (!counts.is_empty()).then_some(counts)
}

impl Document {
    fn object_prototype(&self, id: ObjectId) -> Option<(&PlacedObject, &EntityPrototype)> {
        let object = self.state.objects.get(&id)?;
        Some((object, self.state.catalog.entity(&object.name)?))
    }

    /// Records a new value of one settings field and notifies subscribers with `property` on every apply.
    fn record_field<V>(
        &mut self,
        id: ObjectId,
        field: fn(&mut PlacedObject) -> &mut V,
        value: V,
        property: ObjectProperty,
        text: &str,
    ) -> bool
    where
        V: Clone + PartialEq + 'static,
    {
        let Some(object) = self.state.objects.get_mut(&id) else {
            return false;
        };
        if *field(object) == value {
            return false;
        }
        self.history
            .update_value(&mut self.state, ObjectField::new(id, field), value, text)
            .on_done(move |state: &mut DocumentState, _: &V, _: &V| {
                state.emit(DocumentEvent::ObjectChanged {
                    id,
                    property: property.clone(),
                })
            })
            .commit(&mut self.state);
        true
    }

    /// Names of the recipes the object can craft, sorted.
    pub fn accepted_recipes(&self, id: ObjectId) -> Vec<String> {
        let Some((_, prototype)) = self.object_prototype(id) else {
            return Vec::new();
        };
        let catalog = &self.state.catalog;
        let mut recipes = catalog
            .recipes()
            .filter(|recipe| catalog.accepts_recipe(prototype, &recipe.name))
            .map(|recipe| recipe.name.clone())
            .collect::<Vec<_>>();
        recipes.sort();
        recipes
    }

    /// Whether the module may be inserted into the object given the recipe it currently crafts.
    pub fn accepts_module(&self, id: ObjectId, module: &str) -> bool {
        self.object_prototype(id).is_some_and(|(object, prototype)| {
            self.state
                .catalog
                .accepts_module(prototype, module, object.settings.recipe.as_deref())
        })
    }

    /// The modules that fit into the object for the recipe, in the given order and cut to the slot count.
    fn fitting_modules(&self, id: ObjectId, modules: &[String], recipe: Option<&str>) -> Vec<String> {
        let Some((_, prototype)) = self.object_prototype(id) else {
            return Vec::new();
        };
        modules
            .iter()
            .filter(|module| self.state.catalog.accepts_module(prototype, module, recipe))
            .take(prototype.module_slots as usize)
            .cloned()
            .collect()
    }

    /// Sets the recipe of a crafting machine. Modules not allowed with the new recipe are removed in the same step.
    pub fn set_recipe(&mut self, id: ObjectId, new_recipe: Option<&str>) -> bool {
        let Some((object, prototype)) = self.object_prototype(id) else {
            return false;
        };
        if !prototype.kind.is_crafting_machine() {
            return false;
        }
        if let Some(name) = new_recipe {
            if !self.state.catalog.accepts_recipe(prototype, name) {
                trace!("{} can not craft {}.", object.name, name);
                return false;
            }
        }
        let modules = object.settings.module_list();
        let kept = self.fitting_modules(id, &modules, new_recipe);

        self.history.start_transaction(Some("Change recipe"), true);
        let changed = self.record_field(
            id,
            recipe,
            new_recipe.map(str::to_string),
            ObjectProperty::Recipe,
            "Change recipe",
        );
        if changed && kept.len() != modules.len() {
            self.record_field(id, items, count_modules(&kept), ObjectProperty::Modules, "Change modules");
        }
        self.commit_transaction();
        changed
    }

    /// Replaces the modules of the object with those of the list it accepts, up to its slot count.
    pub fn set_modules(&mut self, id: ObjectId, modules: &[String]) -> bool {
        let Some((object, _)) = self.object_prototype(id) else {
            return false;
        };
        let current_recipe = object.settings.recipe.clone();
        let kept = self.fitting_modules(id, modules, current_recipe.as_deref());
        self.record_field(id, items, count_modules(&kept), ObjectProperty::Modules, "Change modules")
    }

    /// Sets the item filters of the object. Filters of unknown items or beyond the filter count are dropped.
    pub fn set_filters(&mut self, id: ObjectId, new_filters: Vec<ItemFilter>) -> bool {
        let Some((_, prototype)) = self.object_prototype(id) else {
            return false;
        };
        if prototype.filter_count == 0 || prototype.kind == EntityKind::Splitter {
            return false;
        }
        let filter_count = prototype.filter_count;
        let kept = new_filters
            .into_iter()
            .filter(|filter| (1..=filter_count).contains(&filter.index) && self.state.catalog.has_item(&filter.name))
            .collect::<Vec<_>>();
        let value = (!kept.is_empty()).then_some(kept);
        self.record_field(id, filters, value, ObjectProperty::Filters, "Change filters")
    }

    /// Sets the logistic requests of a requester container.
    pub fn set_request_filters(&mut self, id: ObjectId, new_filters: Vec<RequestFilter>) -> bool {
        let Some((_, prototype)) = self.object_prototype(id) else {
            return false;
        };
        if prototype.kind != EntityKind::LogisticContainer {
            return false;
        }
        let kept = new_filters
            .into_iter()
            .filter(|filter| self.state.catalog.has_item(&filter.name))
            .collect::<Vec<_>>();
        let value = (!kept.is_empty()).then_some(kept);
        self.record_field(id, request_filters, value, ObjectProperty::RequestFilters, "Change requests")
    }

    pub fn set_request_from_buffers(&mut self, id: ObjectId, enabled: bool) -> bool {
        let is_requester = self
            .object_prototype(id)
            .is_some_and(|(_, prototype)| prototype.kind == EntityKind::LogisticContainer);
        is_requester
            && self.record_field(
                id,
                request_from_buffers,
                enabled.then_some(true),
                ObjectProperty::RequestFilters,
                "Change requests",
            )
    }

    /// Sets the input and output priorities of a splitter. Without an output priority the output filter is cleared.
    pub fn set_splitter_priorities(&mut self, id: ObjectId, input: Option<Priority>, output: Option<Priority>) -> bool {
        if !self.is_splitter(id) {
            return false;
        }
        let property = ObjectProperty::SplitterSettings;
        self.history.start_transaction(Some("Change splitter priorities"), true);
        let mut changed = self.record_field(id, input_priority, input, property.clone(), "Change input priority");
        changed |= self.record_field(id, output_priority, output, property.clone(), "Change output priority");
        if output.is_none() {
            changed |= self.record_field(id, splitter_filter, None, property, "Change splitter filter");
        }
        self.commit_transaction();
        changed
    }

    /// Sets the item a splitter sorts out. A filter needs an output side, so left is chosen when none is set.
    pub fn set_splitter_filter(&mut self, id: ObjectId, item: Option<&str>) -> bool {
        if !self.is_splitter(id) || item.is_some_and(|item| !self.state.catalog.has_item(item)) {
            return false;
        }
        let needs_side = item.is_some()
            && self
                .state
                .objects
                .get(&id)
                .is_some_and(|object| object.settings.output_priority.is_none());
        let property = ObjectProperty::SplitterSettings;
        self.history.start_transaction(Some("Change splitter filter"), true);
        let mut changed =
            self.record_field(id, splitter_filter, item.map(str::to_string), property.clone(), "Change splitter filter");
        if changed && needs_side {
            changed |= self.record_field(id, output_priority, Some(Priority::Left), property, "Change output priority");
        }
        self.commit_transaction();
        changed
    }

    fn is_splitter(&self, id: ObjectId) -> bool {
        self.object_prototype(id)
            .is_some_and(|(_, prototype)| prototype.kind == EntityKind::Splitter)
    }

    pub fn set_station(&mut self, id: ObjectId, name: Option<&str>) -> bool {
        let is_stop = self
            .object_prototype(id)
            .is_some_and(|(_, prototype)| prototype.kind == EntityKind::TrainStop);
        is_stop && self.record_field(id, station, name.map(str::to_string), ObjectProperty::Station, "Rename station")
    }

    /// Sets or, with `None`, deletes a value in the settings the engine does not model, e.g.,
    /// `control_behavior.circuit_condition`.
    pub fn set_property(&mut self, id: ObjectId, path: &str, value: Option<Value>) -> bool {
        let path = PropertyPath::parse(path);
        let Some(object) = self.state.objects.get(&id) else {
            return false;
        };
        if path.segments().is_empty() || path.get_in(&object.settings.extra) == value.as_ref() {
            return false;
        }
        let property = ObjectProperty::Extra(path.to_string());
        self.history
            .update_path(&mut self.state, ObjectField::new(id, extra), path, value, "Change property")
            .on_done(move |state: &mut DocumentState, _, _| {
                state.emit(DocumentEvent::ObjectChanged {
                    id,
                    property: property.clone(),
                })
            })
            .commit(&mut self.state);
        true
    }

    /// Copies the settings of `source` onto `target` when both are of the same kind, keeping only what the target
    /// accepts. Returns false when the objects are incompatible.
    pub fn paste_settings(&mut self, target: ObjectId, source: ObjectId) -> bool {
        let (Some((_, target_prototype)), Some((source_object, source_prototype))) =
            (self.object_prototype(target), self.object_prototype(source))
        else {
            return false;
        };
        if target == source || target_prototype.kind != source_prototype.kind {
            return false;
        }
        let source_object = source_object.clone();
        self.history.start_transaction(Some("Paste settings"), true);
        self.paste_settings_from(target, &source_object);
        self.commit_transaction();
        true
    }

    pub(crate) fn paste_settings_from(&mut self, id: ObjectId, source: &PlacedObject) {
        let Some((_, prototype)) = self.object_prototype(id) else {
            return;
        };
        let kind = prototype.kind;
        let settings = &source.settings;

        if kind.is_crafting_machine() {
            if let Some(name) = settings.recipe.as_deref() {
                self.set_recipe(id, Some(name));
            }
        }
        if settings.items.is_some() {
            self.set_modules(id, &settings.module_list());
        }
        match kind {
            EntityKind::Splitter => {
                self.set_splitter_priorities(id, settings.input_priority, settings.output_priority);
                if let Some(item) = settings.filter.as_deref() {
                    self.set_splitter_filter(id, Some(item));
                }
            }
            EntityKind::LogisticContainer => {
                if let Some(requests) = settings.request_filters.clone() {
                    self.set_request_filters(id, requests);
                }
                self.set_request_from_buffers(id, settings.request_from_buffers.unwrap_or(false));
            }
            _ => {}
        }
        if let Some(source_filters) = settings.filters.clone() {
            self.set_filters(id, source_filters);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixture::shared_test_catalog;
    use crate::document::events::{DocumentEvent, ObjectProperty};
    use crate::document::placed_object::{ItemFilter, NewObject, ObjectId, Priority, RequestFilter};
    use crate::document::Document;
    use crate::geometry::Point;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn place(document: &mut Document, name: &str, x: f64, y: f64) -> ObjectId {
        document.place_object(NewObject::new(name, Point::new(x, y))).unwrap().unwrap()
    }

    fn modules(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn filter(index: u32, name: &str) -> ItemFilter {
        ItemFilter {
            index,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_set_recipe() {
        let mut document = Document::new(shared_test_catalog());
        let machine = place(&mut document, "assembling-machine-1", 1.5, 1.5);
        let furnace = place(&mut document, "electric-furnace", 5.5, 1.5);
        let chest = place(&mut document, "wooden-chest", 8.5, 0.5);

        assert!(document.set_recipe(machine, Some("iron-gear-wheel")));
        assert!(!document.set_recipe(machine, Some("iron-gear-wheel")));
        assert!(!document.set_recipe(machine, Some("iron-plate")));
        assert!(document.set_recipe(furnace, Some("iron-plate")));
        assert!(!document.set_recipe(chest, Some("iron-gear-wheel")));
        assert_eq!(document.object(machine).unwrap().settings.recipe.as_deref(), Some("iron-gear-wheel"));

        assert!(document.set_recipe(machine, None));
        assert_eq!(document.object(machine).unwrap().settings.recipe, None);
        assert_eq!(
            document.accepted_recipes(machine),
            vec!["assembling-machine-1", "automation-science-pack", "electronic-circuit", "iron-gear-wheel"]
        );
    }

    #[test]
    fn test_recipe_removes_disallowed_modules() {
        let mut document = Document::new(shared_test_catalog());
        let machine = place(&mut document, "assembling-machine-2", 1.5, 1.5);
        assert!(document.set_modules(
            machine,
            &modules(&["productivity-module", "productivity-module", "speed-module"])
        ));
        assert_eq!(
            document.object(machine).unwrap().settings.module_list(),
            modules(&["productivity-module", "productivity-module"])
        );

        let steps = document.history().len();
        assert!(document.set_recipe(machine, Some("assembling-machine-1")));
        assert_eq!(document.history().len(), steps + 1);
        assert_eq!(document.object(machine).unwrap().settings.items, None);
        assert!(!document.accepts_module(machine, "productivity-module"));
        assert!(document.accepts_module(machine, "speed-module"));

        document.undo();
        let settings = &document.object(machine).unwrap().settings;
        assert_eq!(settings.recipe, None);
        assert_eq!(settings.module_list().len(), 2);
    }

    #[test]
    fn test_beacon_modules() {
        let mut document = Document::new(shared_test_catalog());
        let beacon = place(&mut document, "beacon", 1.5, 1.5);
        assert!(document.set_modules(beacon, &modules(&["productivity-module", "speed-module"])));
        assert_eq!(document.object(beacon).unwrap().settings.module_list(), modules(&["speed-module"]));
        assert!(!document.set_modules(beacon, &modules(&["productivity-module", "speed-module"])));
    }

    #[test]
    fn test_filters() {
        let mut document = Document::new(shared_test_catalog());
        let inserter = place(&mut document, "filter-inserter", 0.5, 0.5);
        assert!(document.set_filters(
            inserter,
            vec![filter(1, "iron-plate"), filter(6, "copper-plate"), filter(2, "unobtainium")]
        ));
        assert_eq!(document.object(inserter).unwrap().settings.filters, Some(vec![filter(1, "iron-plate")]));

        let plain = place(&mut document, "inserter", 1.5, 0.5);
        assert!(!document.set_filters(plain, vec![filter(1, "iron-plate")]));
    }

    #[test]
    fn test_splitter_settings() {
        let mut document = Document::new(shared_test_catalog());
        let splitter = place(&mut document, "splitter", 1.0, 0.5);
        assert!(document.set_splitter_filter(splitter, Some("iron-plate")));
        let settings = &document.object(splitter).unwrap().settings;
        assert_eq!(settings.filter.as_deref(), Some("iron-plate"));
        assert_eq!(settings.output_priority, Some(Priority::Left));

        assert!(document.set_splitter_priorities(splitter, Some(Priority::Right), None));
        let settings = &document.object(splitter).unwrap().settings;
        assert_eq!(settings.input_priority, Some(Priority::Right));
        assert_eq!(settings.output_priority, None);
        assert_eq!(settings.filter, None);

        document.undo();
        assert_eq!(document.object(splitter).unwrap().settings.filter.as_deref(), Some("iron-plate"));
    }

    #[test]
    fn test_station_and_requests() {
        let mut document = Document::new(shared_test_catalog());
        let stop = place(&mut document, "train-stop", 1.0, 1.0);
        let requester = place(&mut document, "logistic-chest-requester", 5.5, 0.5);
        assert!(document.set_station(stop, Some("Iron pickup")));
        assert!(!document.set_station(requester, Some("Iron pickup")));

        let requests = vec![
            RequestFilter {
                index: 1,
                name: "iron-plate".to_string(),
                count: 200,
            },
            RequestFilter {
                index: 2,
                name: "unobtainium".to_string(),
                count: 1,
            },
        ];
        assert!(document.set_request_filters(requester, requests));
        assert!(document.set_request_from_buffers(requester, true));
        let settings = &document.object(requester).unwrap().settings;
        assert_eq!(settings.request_filters.as_ref().map(Vec::len), Some(1));
        assert_eq!(settings.request_from_buffers, Some(true));
    }

    #[test]
    fn test_set_property() {
        let mut document = Document::new(shared_test_catalog());
        let combinator = place(&mut document, "constant-combinator", 0.5, 0.5);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        document.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        assert!(document.set_property(combinator, "control_behavior.is_on", Some(json!(false))));
        assert!(!document.set_property(combinator, "control_behavior.is_on", Some(json!(false))));
        assert_eq!(
            document.object(combinator).unwrap().settings.extra.get("control_behavior"),
            Some(&json!({"is_on": false}))
        );
        assert!(document.set_property(combinator, "control_behavior.is_on", None));
        assert_eq!(
            document.object(combinator).unwrap().settings.extra.get("control_behavior"),
            Some(&json!({}))
        );
        document.undo();
        assert_eq!(
            document.object(combinator).unwrap().settings.extra.get("control_behavior"),
            Some(&json!({"is_on": false}))
        );
        assert_eq!(
            events.borrow()[0],
            DocumentEvent::ObjectChanged {
                id: combinator,
                property: ObjectProperty::Extra("control_behavior.is_on".to_string()),
            }
        );
    }

    #[test]
    fn test_paste_settings() {
        let mut document = Document::new(shared_test_catalog());
        let source = place(&mut document, "assembling-machine-2", 1.5, 1.5);
        let target = place(&mut document, "assembling-machine-1", 5.5, 1.5);
        let chest = place(&mut document, "wooden-chest", 8.5, 0.5);
        document.set_recipe(source, Some("electronic-circuit"));
        document.set_modules(source, &modules(&["speed-module", "speed-module"]));

        assert!(document.paste_settings(target, source));
        let settings = &document.object(target).unwrap().settings;
        assert_eq!(settings.recipe.as_deref(), Some("electronic-circuit"));
        assert_eq!(settings.items, None);
        assert!(!document.paste_settings(chest, source));
        assert!(!document.paste_settings(source, source));

        let steps = document.history().len();
        let filtered = place(&mut document, "filter-inserter", 0.5, 5.5);
        let plain = place(&mut document, "inserter", 1.5, 5.5);
        document.set_filters(filtered, vec![filter(1, "iron-plate")]);
        assert!(document.paste_settings(plain, filtered));
        assert_eq!(document.object(plain).unwrap().settings.filters, None);
        assert_eq!(document.history().len(), steps + 3);
    }
}
