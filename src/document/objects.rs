use crate::catalog::prototypes::EntityKind;
use crate::document::events::{DocumentEvent, ObjectProperty};
use crate::document::placed_object::{NewObject, ObjectId, PlacedObject, Priority};
use crate::document::state::{objects, DocumentState, ObjectField, ObjectsView};
use crate::document::Document;
use crate::errors::DocumentError;
use crate::geometry::direction::{Direction, DirectionType};
use crate::geometry::Point;
use crate::spatial_index::ObjectLookup;
use log::trace;
use std::cmp::Ordering;

fn position(object: &mut PlacedObject) -> &mut Point {
    &mut object.position
}

fn direction(object: &mut PlacedObject) -> &mut Direction {
    &mut object.direction
}

fn direction_type(object: &mut PlacedObject) -> &mut Option<DirectionType> {
    &mut object.direction_type
}

/// Keeps the spatial index and subscribers in step with insertions and deletions in the object table.
fn object_replaced(state: &mut DocumentState, current: &Option<PlacedObject>, replaced: &Option<PlacedObject>) {
    if let Some(old) = replaced {
        state.unindex_object(old);
    }
    if let Some(new) = current {
        state.index_object(new);
    }
    match (current, replaced) {
        (Some(new), _) => state.emit(DocumentEvent::ObjectCreated(new.id)),
        (None, Some(old)) => state.emit(DocumentEvent::ObjectRemoved(old.id)),
        (None, None) => {}
    }
}

/// Moves the footprint of an object in the spatial index after its position or direction changed.
fn reindex(state: &mut DocumentState, id: ObjectId, from: (Point, Direction)) {
    let Some(object) = state.objects.get(&id) else {
        return;
    };
    let Some(prototype) = state.catalog.entity(&object.name) else {
        return;
    };
    let old_area = prototype.footprint(from.0, from.1);
    let new_area = prototype.footprint(object.position, object.direction);
    state.grid.remove_tile_data(id, old_area);
    let view = ObjectsView::new(&state.objects, &state.catalog);
    state.grid.set_tile_data(&view, id, new_area);
}

fn swap_priority(priority: Option<Priority>) -> Option<Priority> {
    priority.map(|priority| match priority {
        Priority::Left => Priority::Right,
        Priority::Right => Priority::Left,
    })
}

impl Document {
    /// Inserts an object without checking the space it takes. Uses the requested id if there is one.
    pub fn create_object(&mut self, new_object: NewObject) -> Result<ObjectId, DocumentError> {
        if !self.state.catalog.has_entity(&new_object.name) {
            return Err(DocumentError::UnknownType(new_object.name));
        }
        let id = self.allocate_id(new_object.id);
        let object = new_object.into_object(id);
        self.history
            .update_map(&mut self.state, objects, id, Some(object), "Create object")
            .on_done(object_replaced)
            .commit(&mut self.state);
        Ok(id)
    }

    /// Creates an object if its footprint is free, as a user placing it would. Underground objects without a type
    /// get the one that pairs them with the nearest partner and new power poles are wired to their neighbours.
    pub fn place_object(&mut self, mut new_object: NewObject) -> Result<Option<ObjectId>, DocumentError> {
        let catalog = self.state.catalog.clone();
        let Some(prototype) = catalog.entity(&new_object.name) else {
            return Err(DocumentError::UnknownType(new_object.name));
        };
        if !self.state.grid.is_area_available(
            &self.view(),
            &new_object.name,
            new_object.position,
            new_object.direction,
            None,
        ) {
            trace!("Not placing {} at {:?}, the area is taken.", new_object.name, new_object.position);
            return Ok(None);
        }
        if prototype.kind.is_underground() && new_object.direction_type.is_none() {
            new_object.direction_type = Some(self.paired_direction_type(
                &new_object.name,
                new_object.direction,
                new_object.position,
            ));
        }

        self.history.start_transaction(Some("Place object"), true);
        let created = self.create_object(new_object);
        if let Ok(id) = created {
            if prototype.kind == EntityKind::ElectricPole {
                self.connect_power_pole(id);
            }
        }
        self.commit_transaction();
        created.map(Some)
    }

    /// The type of an underground object that makes it the exit of an entrance behind it, or an entrance otherwise.
    fn paired_direction_type(&self, name: &str, direction: Direction, position: Point) -> DirectionType {
        let view = self.view();
        let max_distance = view.prototype(name).map(|p| p.max_distance).unwrap_or(0);
        let entrance = self
            .state
            .grid
            .get_opposing_object(&view, name, direction, position, direction.opposite(), max_distance)
            .and_then(|id| view.object(id))
            .is_some_and(|partner| partner.direction_type != Some(DirectionType::Output));
        if entrance {
            DirectionType::Output
        } else {
            DirectionType::Input
        }
    }

    /// Removes the object together with its wires in one step.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        if !self.state.objects.contains_key(&id) {
            return false;
        }
        self.history.start_transaction(Some("Remove object"), true);
        for link in self.state.wires.connections(id) {
            self.remove_wire(&link);
        }
        self.history
            .update_map(&mut self.state, objects, id, None, "Remove object")
            .on_done(object_replaced)
            .commit(&mut self.state);
        self.commit_transaction();
        true
    }

    pub fn remove_objects(&mut self, ids: &[ObjectId]) -> usize {
        self.history.start_transaction(Some("Remove objects"), true);
        let removed = ids.iter().filter(|&&id| self.remove_object(id)).count();
        self.commit_transaction();
        removed
    }

    /// Whether every wire of the object that reaches now would still reach from the position.
    pub fn connections_reach(&self, id: ObjectId, position: Point) -> bool {
        let view = self.view();
        let Some((object, prototype)) = view.object_with_prototype(id) else {
            return false;
        };
        self.state.wires.connections(id).iter().all(|link| {
            let Some((other, other_prototype)) =
                link.other_end(id).and_then(|end| view.object_with_prototype(end.object))
            else {
                return true;
            };
            let reach = prototype.max_wire_distance().min(other_prototype.max_wire_distance());
            !other.position.in_circle(object.position, reach) || other.position.in_circle(position, reach)
        })
    }

    /// Moves the object unless the destination is taken or, when wire reach is limited, a wire would break.
    pub fn move_object(&mut self, id: ObjectId, to: Point) -> bool {
        let Some(object) = self.state.objects.get(&id) else {
            return false;
        };
        if object.position == to {
            return false;
        }
        let (name, current_direction) = (object.name.clone(), object.direction);
        if !self.state.grid.is_area_available(&self.view(), &name, to, current_direction, Some(id)) {
            trace!("Not moving {} to {:?}, the area is taken.", id, to);
            return false;
        }
        if self.options().limit_wire_reach && !self.connections_reach(id, to) {
            trace!("Not moving {} to {:?}, a wire would break.", id, to);
            return false;
        }

        self.history
            .update_value(&mut self.state, ObjectField::new(id, position), to, "Move object")
            .on_done(move |state: &mut DocumentState, current: &Point, replaced: &Point| {
                let direction = state.objects.get(&id).map(|o| o.direction).unwrap_or_default();
                reindex(state, id, (*replaced, direction));
                state.emit(DocumentEvent::ObjectMoved {
                    id,
                    from: *replaced,
                    to: *current,
                });
            })
            .commit(&mut self.state);
        self.debug_verify();
        true
    }

    /// Moves the objects by the offset as one step. Objects ahead in the direction of the offset move first so that
    /// members of the group do not block each other. Returns how many moved.
    pub fn move_objects_by(&mut self, ids: &[ObjectId], offset: Point) -> usize {
        let mut ordered = ids
            .iter()
            .filter_map(|id| self.state.objects.get(id))
            .map(|object| (object.id, object.position.x * offset.x + object.position.y * offset.y))
            .collect::<Vec<_>>();
        ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        self.history.start_transaction(Some("Move objects"), true);
        let mut moved = 0;
        for (id, _) in ordered {
            let Some(position) = self.state.objects.get(&id).map(|o| o.position) else {
                continue;
            };
            if self.move_object(id, position + offset) {
                moved += 1;
            }
        }
        self.commit_transaction();
        moved
    }

    fn record_direction(&mut self, id: ObjectId, new_direction: Direction) {
        self.history
            .update_value(&mut self.state, ObjectField::new(id, direction), new_direction, "Change direction")
            .on_done(move |state: &mut DocumentState, _: &Direction, replaced: &Direction| {
                let position = state.objects.get(&id).map(|o| o.position).unwrap_or_default();
                reindex(state, id, (position, *replaced));
                state.emit(DocumentEvent::ObjectChanged {
                    id,
                    property: ObjectProperty::Direction,
                });
            })
            .commit(&mut self.state);
    }

    /// Turns the object. Underground objects take the type that pairs them in the new direction.
    ///
    /// Unlike `rotate`, the footprint is not checked against other objects, so a non-square object may end up
    /// overlapping its neighbours. Callers that turn objects on behalf of a user go through `rotate`.
    pub fn set_direction(&mut self, id: ObjectId, new_direction: Direction) -> bool {
        let Some(object) = self.state.objects.get(&id) else {
            return false;
        };
        if object.direction == new_direction {
            return false;
        }
        let (name, position) = (object.name.clone(), object.position);
        let underground = self
            .state
            .catalog
            .entity(&name)
            .is_some_and(|prototype| prototype.kind.is_underground());

        self.history.start_transaction(Some("Change direction"), true);
        self.record_direction(id, new_direction);
        if underground {
            let direction_type = self.paired_direction_type(&name, new_direction, position);
            self.set_direction_type(id, direction_type);
        }
        self.commit_transaction();
        true
    }

    pub fn set_direction_type(&mut self, id: ObjectId, new_type: DirectionType) -> bool {
        let Some(object) = self.state.objects.get(&id) else {
            return false;
        };
        if object.direction_type == Some(new_type) {
            return false;
        }
        self.history
            .update_value(
                &mut self.state,
                ObjectField::new(id, direction_type),
                Some(new_type),
                "Change direction type",
            )
            .on_done(move |state: &mut DocumentState, _, _| {
                state.emit(DocumentEvent::ObjectChanged {
                    id,
                    property: ObjectProperty::DirectionType,
                })
            })
            .commit(&mut self.state);
        self.debug_verify();
        true
    }

    /// Rotates the object in place. Underground objects turn around and swap their type, optionally together with
    /// their partner. Objects sharing a cell with others are not rotated.
    pub fn rotate(&mut self, id: ObjectId, counter_clockwise: bool, rotate_opposing: bool) -> bool {
        let view = self.view();
        let Some((object, prototype)) = view.object_with_prototype(id) else {
            return false;
        };
        if !prototype.is_rotatable() {
            return false;
        }
        let area = prototype.footprint(object.position, object.direction);
        if self.state.grid.shares_cell(&area) {
            return false;
        }
        let underground = prototype.kind.is_underground();
        let new_direction = if underground {
            object.direction.opposite()
        } else {
            object.direction.rotate(counter_clockwise, prototype.is_eight_way())
        };
        if new_direction == object.direction
            || !self
                .state
                .grid
                .is_area_available(&view, &object.name, object.position, new_direction, Some(id))
        {
            return false;
        }

        let partner = if underground && rotate_opposing {
            let search = if object.direction_type == Some(DirectionType::Output) {
                object.direction.opposite()
            } else {
                object.direction
            };
            self.state.grid.get_opposing_object(
                &view,
                &object.name,
                object.direction,
                object.position,
                search,
                prototype.max_distance,
            )
        } else {
            None
        };
        let toggled = object.direction_type.unwrap_or_default().toggled();

        self.history.start_transaction(Some("Rotate object"), true);
        if let Some(partner) = partner {
            self.rotate(partner, counter_clockwise, false);
        }
        if underground {
            self.set_direction_type(id, toggled);
        }
        self.record_direction(id, new_direction);
        self.commit_transaction();
        true
    }

    /// Replaces the object with one of another type in the same place, keeping its id, its wires and the settings the
    /// new type accepts.
    pub fn fast_replace(
        &mut self,
        id: ObjectId,
        name: &str,
        new_direction: Direction,
    ) -> Result<ObjectId, DocumentError> {
        if !self.state.catalog.has_entity(name) {
            return Err(DocumentError::UnknownType(name.to_string()));
        }
        let Some(old) = self.state.objects.get(&id).cloned() else {
            return Err(DocumentError::UnknownObject(id));
        };
        let links = self.state.wires.connections(id);

        self.history.start_transaction(Some("Fast replace object"), true);
        self.remove_object(id);
        let replacement = NewObject::new(name, old.position).facing(new_direction).with_id(id);
        let replacement = match old.direction_type {
            Some(direction_type) => replacement.with_direction_type(direction_type),
            None => replacement,
        };
        let result = self.create_object(replacement);
        if result.is_ok() {
            self.paste_settings_from(id, &old);
            for link in links.iter() {
                self.create_wire(*link);
            }
        }
        self.commit_transaction();
        result
    }

    /// Replaces whatever the spatial index reports as replaceable by an object of the type at the position.
    pub fn fast_replace_at(&mut self, name: &str, new_direction: Direction, at: Point) -> Option<ObjectId> {
        let target = self
            .state
            .grid
            .check_fast_replaceable_group(&self.view(), name, new_direction, at)?;
        self.fast_replace(target, name, new_direction).ok()
    }

    /// Description of the object mirrored across an axis through the origin.
    pub fn flipped_copy(&self, id: ObjectId, vertical: bool) -> Result<NewObject, DocumentError> {
        let view = self.view();
        let (object, prototype) = view.object_with_prototype(id).ok_or(DocumentError::UnknownObject(id))?;
        if !prototype.kind.is_flippable() {
            return Err(DocumentError::IllegalFlip(object.name.clone()));
        }

        let flipped = if prototype.is_rotatable() {
            object.direction.flip(vertical)
        } else {
            Direction::North
        };
        let mut copy = NewObject::from(object);
        copy.id = None;
        copy.direction = flipped;
        copy.position = if vertical {
            Point::new(object.position.x, -object.position.y)
        } else {
            Point::new(-object.position.x, object.position.y)
        };
        let swaps_sides = if vertical {
            flipped == Direction::East || flipped == Direction::South
        } else {
            flipped == Direction::North || flipped == Direction::West
        };
        if swaps_sides {
            copy.settings.input_priority = swap_priority(copy.settings.input_priority);
            copy.settings.output_priority = swap_priority(copy.settings.output_priority);
        }
        Ok(copy)
    }

    /// Description of the object rotated by a quarter turn around the origin.
    pub fn rotated_copy(&self, id: ObjectId, counter_clockwise: bool) -> Result<NewObject, DocumentError> {
        let view = self.view();
        let (object, prototype) = view.object_with_prototype(id).ok_or(DocumentError::UnknownObject(id))?;
        let mut copy = NewObject::from(object);
        copy.id = None;
        copy.position = if counter_clockwise {
            Point::new(object.position.y, -object.position.x)
        } else {
            Point::new(-object.position.y, object.position.x)
        };
        copy.direction = if prototype.is_rotatable() {
            object.direction.rotate(counter_clockwise, false)
        } else {
            Direction::North
        };
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixture::shared_test_catalog;
    use crate::config::DocumentOptions;
    use crate::document::placed_object::{NewObject, ObjectId, ObjectSettings, Priority};
    use crate::document::Document;
    use crate::errors::DocumentError;
    use crate::geometry::cell::Cell;
    use crate::geometry::direction::Direction::*;
    use crate::geometry::direction::DirectionType;
    use crate::geometry::Point;
    use crate::spatial_index::Occupancy;
    use crate::wires::wire_link::{WireColor, WireEndpoint, WireLink};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn document() -> Document {
        Document::new(shared_test_catalog())
    }

    fn place(document: &mut Document, name: &str, x: f64, y: f64) -> ObjectId {
        document.place_object(NewObject::new(name, Point::new(x, y))).unwrap().unwrap()
    }

    #[test]
    fn test_create_assigns_ids() {
        let mut document = document();
        let a = document.create_object(NewObject::new("wooden-chest", Point::new(0.5, 0.5))).unwrap();
        let b = document
            .create_object(NewObject::new("wooden-chest", Point::new(1.5, 0.5)).with_id(ObjectId(10)))
            .unwrap();
        let c = document.create_object(NewObject::new("wooden-chest", Point::new(2.5, 0.5))).unwrap();
        assert_eq!((a, b, c), (ObjectId(1), ObjectId(10), ObjectId(11)));
        assert_eq!(
            document.create_object(NewObject::new("modded-chest", Point::new(0.5, 0.5))),
            Err(DocumentError::UnknownType("modded-chest".to_string()))
        );
    }

    #[test]
    fn test_place_blocked_by_occupant() {
        let mut document = document();
        place(&mut document, "assembling-machine-1", 1.5, 1.5);
        let blocked = document.place_object(NewObject::new("wooden-chest", Point::new(2.5, 2.5))).unwrap();
        assert_eq!(blocked, None);
        assert_eq!(document.object_count(), 1);
        assert_eq!(document.history().len(), 1);
    }

    #[test]
    fn test_remove_restores_on_undo() {
        let mut document = document();
        let chest = place(&mut document, "wooden-chest", 0.5, 0.5);
        let combinator = place(&mut document, "constant-combinator", 1.5, 0.5);
        let link = WireLink::new(WireColor::Red, WireEndpoint::new(chest, 1), WireEndpoint::new(combinator, 1));
        assert!(document.create_wire(link));

        assert!(document.remove_object(chest));
        assert!(!document.remove_object(chest));
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), None);
        assert!(document.connections(combinator).is_empty());

        assert!(document.undo());
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), Some(chest));
        assert_eq!(document.connections(combinator), vec![link]);
        assert!(document.is_consistent());
    }

    #[test]
    fn test_remove_objects_is_one_step() {
        let mut document = document();
        let ids = (0..3)
            .map(|i| place(&mut document, "iron-chest", i as f64 + 0.5, 0.5))
            .collect::<Vec<_>>();
        let steps = document.history().len();
        assert_eq!(document.remove_objects(&ids), 3);
        assert_eq!(document.history().len(), steps + 1);
        document.undo();
        assert_eq!(document.object_count(), 3);
    }

    #[test]
    fn test_move_object() {
        let mut document = document();
        let chest = place(&mut document, "wooden-chest", 0.5, 0.5);
        place(&mut document, "wooden-chest", 2.5, 0.5);
        assert!(!document.move_object(chest, Point::new(2.5, 0.5)));
        assert!(document.move_object(chest, Point::new(1.5, 0.5)));
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), None);
        assert_eq!(document.object_at(Point::new(1.5, 0.5)), Some(chest));
        document.undo();
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), Some(chest));
    }

    #[test]
    fn test_move_keeps_wires_in_reach() {
        let mut document = document();
        let a = place(&mut document, "small-electric-pole", 0.5, 0.5);
        let b = place(&mut document, "small-electric-pole", 5.5, 0.5);
        assert_eq!(document.connections(a).len(), 1);
        assert!(!document.move_object(b, Point::new(9.5, 0.5)));
        assert!(document.move_object(b, Point::new(7.5, 0.5)));

        document.set_options(DocumentOptions {
            limit_wire_reach: false,
            ..DocumentOptions::default()
        });
        assert!(document.move_object(b, Point::new(12.5, 0.5)));
        assert!(document.move_object(b, Point::new(20.5, 0.5)));
    }

    #[test]
    fn test_move_group_along_itself() {
        let mut document = document();
        let ids = (0..3)
            .map(|i| place(&mut document, "transport-belt", i as f64 + 0.5, 0.5))
            .collect::<Vec<_>>();
        assert_eq!(document.move_objects_by(&ids, Point::new(1.0, 0.0)), 3);
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), None);
        assert_eq!(document.object_at(Point::new(3.5, 0.5)), Some(ids[2]));
        assert!(document.undo());
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), Some(ids[0]));
        assert!(document.is_consistent());
    }

    #[test]
    fn test_direction_changes_footprint() {
        let mut document = document();
        let combinator = place(&mut document, "arithmetic-combinator", 0.5, 1.0);
        assert_eq!(document.object_at(Point::new(0.5, 1.5)), Some(combinator));
        assert!(document.set_direction(combinator, East));
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), None);
        assert_eq!(document.object_at(Point::new(1.5, 1.5)), Some(combinator));
        assert!(document.is_consistent());
        assert!(!document.set_direction(combinator, East));
        document.undo();
        assert_eq!(document.object_at(Point::new(0.5, 0.5)), Some(combinator));
        assert_eq!(document.object_at(Point::new(1.5, 1.5)), None);
    }

    #[test]
    fn test_set_direction_skips_footprint_check() {
        let mut document = document();
        let combinator = place(&mut document, "arithmetic-combinator", 0.5, 1.0);
        place(&mut document, "wooden-chest", 1.5, 1.5);
        assert!(!document.rotate(combinator, false, false));
        assert_eq!(document.object(combinator).unwrap().direction, North);
        assert!(document.set_direction(combinator, East));
        assert_eq!(document.object(combinator).unwrap().direction, East);
    }

    #[test]
    fn test_underground_pairing() {
        let mut document = document();
        let entrance = place(&mut document, "underground-belt", 0.5, 0.5);
        let exit = document
            .place_object(NewObject::new("underground-belt", Point::new(0.5, -3.5)))
            .unwrap()
            .unwrap();
        assert_eq!(document.object(entrance).unwrap().direction_type, Some(DirectionType::Input));
        assert_eq!(document.object(exit).unwrap().direction_type, Some(DirectionType::Output));

        let far = place(&mut document, "underground-belt", 5.5, 0.5);
        assert_eq!(document.object(far).unwrap().direction_type, Some(DirectionType::Input));
    }

    #[test]
    fn test_rotate() {
        let mut document = document();
        let inserter = place(&mut document, "inserter", 0.5, 0.5);
        assert!(document.rotate(inserter, false, false));
        assert_eq!(document.object(inserter).unwrap().direction, East);
        assert!(document.rotate(inserter, true, false));
        assert!(document.rotate(inserter, true, false));
        assert_eq!(document.object(inserter).unwrap().direction, West);

        let chest = place(&mut document, "wooden-chest", 2.5, 0.5);
        assert!(!document.rotate(chest, false, false));
    }

    #[test]
    fn test_rotate_underground_pair() {
        let mut document = document();
        let entrance = place(&mut document, "underground-belt", 0.5, 0.5);
        let exit = place(&mut document, "underground-belt", 0.5, -2.5);
        assert!(document.rotate(entrance, false, true));
        let entrance = document.object(entrance).unwrap();
        let exit = document.object(exit).unwrap();
        assert_eq!((entrance.direction, entrance.direction_type), (South, Some(DirectionType::Output)));
        assert_eq!((exit.direction, exit.direction_type), (South, Some(DirectionType::Input)));
        assert_eq!(document.history().len(), 3);
    }

    #[test]
    fn test_fast_replace_scenario() {
        let mut document = document();
        let x = place(&mut document, "transport-belt", 0.5, 0.5);
        let y = place(&mut document, "fast-transport-belt", 1.5, 0.5);
        let replaced = document.fast_replace(x, "fast-transport-belt", East).unwrap();
        assert_eq!(replaced, x);

        let at_origin = document
            .objects()
            .filter(|o| o.position == Point::new(0.5, 0.5))
            .collect::<Vec<_>>();
        assert_eq!(at_origin.len(), 1);
        assert_eq!(at_origin[0].name, "fast-transport-belt");
        assert_eq!(at_origin[0].direction, East);
        assert_eq!(document.grid().cell(Cell::new(0, 0)), Some(&Occupancy::Single(x)));
        assert!(document.object(y).is_some());

        assert!(document.undo());
        assert_eq!(document.object(x).unwrap().name, "transport-belt");
        assert_eq!(
            document.fast_replace(ObjectId(99), "fast-transport-belt", North),
            Err(DocumentError::UnknownObject(ObjectId(99)))
        );
    }

    #[test]
    fn test_fast_replace_keeps_settings_and_wires() {
        let mut document = document();
        let machine = place(&mut document, "assembling-machine-1", 1.5, 1.5);
        let pole = place(&mut document, "small-electric-pole", 4.5, 0.5);
        let link = WireLink::new(WireColor::Green, WireEndpoint::new(machine, 1), WireEndpoint::new(pole, 1));
        document.create_wire(link);
        assert!(document.set_recipe(machine, Some("iron-gear-wheel")));

        assert_eq!(document.fast_replace_at("assembling-machine-2", North, Point::new(1.5, 1.5)), Some(machine));
        let replaced = document.object(machine).unwrap();
        assert_eq!(replaced.name, "assembling-machine-2");
        assert_eq!(replaced.settings.recipe.as_deref(), Some("iron-gear-wheel"));
        assert_eq!(document.connections(machine), vec![link]);
        assert_eq!(document.fast_replace_at("assembling-machine-2", North, Point::new(9.5, 9.5)), None);
    }

    #[test]
    fn test_flipped_copy() {
        let mut document = document();
        let settings = ObjectSettings {
            input_priority: Some(Priority::Left),
            ..ObjectSettings::default()
        };
        let splitter = document
            .place_object(NewObject::new("splitter", Point::new(3.0, 1.5)).facing(North).with_settings(settings))
            .unwrap()
            .unwrap();
        let copy = document.flipped_copy(splitter, false).unwrap();
        assert_eq!(copy.position, Point::new(-3.0, 1.5));
        assert_eq!(copy.direction, North);
        assert_eq!(copy.settings.input_priority, Some(Priority::Right));
        assert_eq!(copy.id, None);

        let copy = document.flipped_copy(splitter, true).unwrap();
        assert_eq!(copy.direction, South);
        assert_eq!(copy.settings.input_priority, Some(Priority::Right));

        let stop = place(&mut document, "train-stop", 10.0, 10.0);
        assert_eq!(
            document.flipped_copy(stop, true),
            Err(DocumentError::IllegalFlip("train-stop".to_string()))
        );
    }

    #[test]
    fn test_rotated_copy() {
        let mut document = document();
        let inserter = document
            .place_object(NewObject::new("inserter", Point::new(2.5, 0.5)).facing(East))
            .unwrap()
            .unwrap();
        let copy = document.rotated_copy(inserter, false).unwrap();
        assert_eq!(copy.position, Point::new(-0.5, 2.5));
        assert_eq!(copy.direction, South);
        let copy = document.rotated_copy(inserter, true).unwrap();
        assert_eq!(copy.position, Point::new(0.5, -2.5));
        assert_eq!(copy.direction, North);
    }

    fn snapshot(document: &Document) -> (Vec<String>, Vec<String>) {
        let objects = document
            .objects()
            .map(|o| format!("{} {} {:?} {:?} {:?}", o.id, o.name, o.position, o.direction, o.direction_type))
            .collect();
        let mut links = document.links().map(WireLink::hash).collect::<Vec<_>>();
        links.sort();
        (objects, links)
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut document = document();
        let names = ["wooden-chest", "transport-belt", "inserter", "small-electric-pole", "underground-belt"];
        let mut states = vec![snapshot(&document)];

        for _ in 0..150 {
            let ids = document.objects().map(|o| o.id).collect::<Vec<_>>();
            let changed = match rng.gen_range(0..5) {
                0 | 1 => {
                    let name = names[rng.gen_range(0..names.len())];
                    let position = Point::new(rng.gen_range(-6..6) as f64 + 0.5, rng.gen_range(-6..6) as f64 + 0.5);
                    document.place_object(NewObject::new(name, position)).unwrap().is_some()
                }
                2 if !ids.is_empty() => document.remove_object(ids[rng.gen_range(0..ids.len())]),
                3 if !ids.is_empty() => {
                    let offset = Point::new(rng.gen_range(-2..=2) as f64, rng.gen_range(-2..=2) as f64);
                    let id = ids[rng.gen_range(0..ids.len())];
                    let to = document.object(id).unwrap().position + offset;
                    document.move_object(id, to)
                }
                4 if !ids.is_empty() => document.rotate(ids[rng.gen_range(0..ids.len())], rng.gen_bool(0.5), true),
                _ => false,
            };
            if changed {
                states.push(snapshot(&document));
            }
            assert!(document.is_consistent());
        }

        assert_eq!(document.history().len(), states.len() - 1);
        let last = states.len() - 1;
        for expected in states[..last].iter().rev() {
            assert!(document.undo());
            assert_eq!(&snapshot(&document), expected);
            assert!(document.is_consistent());
        }
        assert!(!document.undo());
        while document.redo() {}
        assert_eq!(snapshot(&document), states[last]);
    }
}
