use crate::catalog::prototypes::EntityKind::{CurvedRail, Gate, RailChainSignal, RailSignal, StraightRail};
use crate::catalog::prototypes::EntityPrototype;
use crate::document::placed_object::{ObjectId, PlacedObject};
use crate::geometry::area::Area;
use crate::geometry::cell::Cell;
use crate::geometry::direction::Direction;
use crate::geometry::Point;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::collections::hash_map::Entry;

/// Access to the objects the index refers to by id.
pub trait ObjectLookup {
    fn object(&self, id: ObjectId) -> Option<&PlacedObject>;

    fn prototype(&self, name: &str) -> Option<&EntityPrototype>;

    fn object_with_prototype(&self, id: ObjectId) -> Option<(&PlacedObject, &EntityPrototype)> {
        let object = self.object(id)?;
        Some((object, self.prototype(&object.name)?))
    }

    fn footprint(&self, id: ObjectId) -> Option<Area> {
        let (object, prototype) = self.object_with_prototype(id)?;
        Some(prototype.footprint(object.position, object.direction))
    }
}

/// Objects in one cell. Several objects share a cell only for the few combinations allowed by
/// `is_area_available`, and are then ordered from the largest footprint to the smallest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupancy {
    Single(ObjectId),
    Stack(Vec<ObjectId>),
}

impl Occupancy {
    pub fn ids(&self) -> &[ObjectId] {
        match self {
            Occupancy::Single(id) => std::slice::from_ref(id),
            Occupancy::Stack(ids) => ids,
        }
    }

    /// The smallest occupant.
    pub fn top(&self) -> Option<ObjectId> {
        self.ids().last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighbourData {
    pub cell: Cell,
    pub relative_direction: Direction,
    pub object: Option<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    cells: FxHashMap<Cell, Occupancy>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        SpatialIndex::default()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, cell: Cell) -> Option<&Occupancy> {
        self.cells.get(&cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&Cell, &Occupancy)> {
        self.cells.iter()
    }

    fn ids_at(&self, cell: Cell) -> &[ObjectId] {
        self.cells.get(&cell).map(Occupancy::ids).unwrap_or(&[])
    }

    pub fn set_tile_data<L: ObjectLookup>(&mut self, lookup: &L, id: ObjectId, area: Area) {
        let size_of = |other: ObjectId| {
            if other == id {
                area.size()
            } else {
                lookup.footprint(other).map(|a| a.size()).unwrap_or(0)
            }
        };
        for cell in area.cells() {
            match self.cells.entry(cell) {
                Entry::Vacant(e) => {
                    e.insert(Occupancy::Single(id));
                }
                Entry::Occupied(mut e) => {
                    let mut ids = vec![id];
                    ids.extend(e.get().ids().iter().copied().filter(|&other| other != id));
                    if ids.len() == 1 {
                        e.insert(Occupancy::Single(id));
                    } else {
                        ids.sort_by_key(|&other| Reverse(size_of(other)));
                        e.insert(Occupancy::Stack(ids));
                    }
                }
            }
        }
    }

    pub fn remove_tile_data(&mut self, id: ObjectId, area: Area) {
        for cell in area.cells() {
            let Entry::Occupied(mut e) = self.cells.entry(cell) else {
                continue;
            };
            let remaining = match e.get() {
                Occupancy::Single(other) if *other == id => Some(None),
                Occupancy::Single(_) => None,
                Occupancy::Stack(ids) if ids.contains(&id) => {
                    let rest = ids.iter().copied().filter(|&other| other != id).collect::<Vec<_>>();
                    Some(match rest.len() {
                        0 => None,
                        1 => Some(Occupancy::Single(rest[0])),
                        _ => Some(Occupancy::Stack(rest)),
                    })
                }
                Occupancy::Stack(_) => None,
            };
            match remaining {
                Some(Some(occupancy)) => {
                    e.insert(occupancy);
                }
                Some(None) => {
                    e.remove();
                }
                None => {}
            }
        }
    }

    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        self.object_at_cell(point.floor())
    }

    pub fn object_at_cell(&self, cell: Cell) -> Option<ObjectId> {
        self.cells.get(&cell).and_then(Occupancy::top)
    }

    pub fn is_area_empty(&self, area: &Area) -> bool {
        area.cells().all(|cell| !self.cells.contains_key(&cell))
    }

    /// Whether any cell of the area holds more than one object.
    pub fn shares_cell(&self, area: &Area) -> bool {
        area.cells()
            .any(|cell| matches!(self.cells.get(&cell), Some(Occupancy::Stack(_))))
    }

    /// Distinct objects in the area, in the order they are first found.
    pub fn objects_in_area(&self, area: &Area) -> Vec<ObjectId> {
        let mut seen = FxHashSet::default();
        area.cells()
            .flat_map(|cell| self.ids_at(cell).iter().copied())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn find_in_area<F>(&self, area: &Area, predicate: F) -> Option<ObjectId>
    where
        F: Fn(ObjectId) -> bool,
    {
        area.cells()
            .flat_map(|cell| self.ids_at(cell).iter().copied())
            .find(|&id| predicate(id))
    }

    /// Whether an object of the given type may be placed there. Occupied cells are only allowed for the crossings
    /// of rails with gates, signals and other rails listed below. `ignore` excludes an object from the check, e.g.,
    /// the one being moved.
    pub fn is_area_available<L: ObjectLookup>(
        &self,
        lookup: &L,
        name: &str,
        position: Point,
        direction: Direction,
        ignore: Option<ObjectId>,
    ) -> bool {
        let Some(prototype) = lookup.prototype(name) else {
            return false;
        };
        let area = prototype.footprint(position, direction);

        let mut straight_rails = Vec::new();
        let mut curved_rail = None;
        let mut gate = None;
        let mut signal = false;
        let mut others = false;
        let mut empty = true;

        for id in self.objects_in_area(&area) {
            if Some(id) == ignore {
                continue;
            }
            empty = false;
            let Some((object, occupant)) = lookup.object_with_prototype(id) else {
                others = true;
                continue;
            };
            match occupant.kind {
                Gate => gate = Some(object.direction),
                CurvedRail => curved_rail = Some(object.direction),
                StraightRail => straight_rails.push(object.direction),
                RailSignal | RailChainSignal => signal = true,
                _ => others = true,
            }
        }

        if empty {
            return true;
        }

        let kind = prototype.kind;
        let parallel_rail = straight_rails.iter().any(|d| d.is_parallel(direction));

        (kind == Gate && straight_rails.len() == 1 && !straight_rails[0].is_parallel(direction) && gate.is_none())
            || (kind == StraightRail
                && gate.is_some_and(|d| !d.is_parallel(direction))
                && straight_rails.is_empty()
                && !others)
            || (kind == StraightRail && !straight_rails.is_empty() && !parallel_rail && gate.is_none())
            || (kind == CurvedRail && !straight_rails.is_empty() && gate.is_none())
            || (kind == StraightRail && curved_rail.is_some())
            || (kind == CurvedRail && curved_rail.is_some_and(|d| d != direction))
            || (kind.is_rail_signal() && (curved_rail.is_some() || !straight_rails.is_empty()))
            || (kind.is_rail() && signal)
    }

    /// The object that an entity of the given type would fast-replace at exactly this position, i.e., one of a
    /// different type in the same replace group covering the whole footprint alone.
    pub fn check_fast_replaceable_group<L: ObjectLookup>(
        &self,
        lookup: &L,
        name: &str,
        direction: Direction,
        position: Point,
    ) -> Option<ObjectId> {
        let prototype = lookup.prototype(name)?;
        let area = prototype.footprint(position, direction);
        if self.shares_cell(&area) {
            return None;
        }
        let id = self.find_in_area(&area, |id| {
            lookup
                .object_with_prototype(id)
                .is_some_and(|(object, other)| object.name != name && other.shares_replace_group(prototype))
        })?;
        (lookup.object(id)?.position == position).then_some(id)
    }

    /// The object of the same type at exactly this position that only differs in direction, i.e., the one a
    /// placement there would rotate.
    pub fn check_same_type_different_direction<L: ObjectLookup>(
        &self,
        lookup: &L,
        name: &str,
        direction: Direction,
        position: Point,
    ) -> Option<ObjectId> {
        let prototype = lookup.prototype(name)?;
        if prototype.kind == StraightRail {
            return None;
        }
        let area = prototype.footprint(position, direction);
        if self.shares_cell(&area) {
            return None;
        }
        let id = self.find_in_area(&area, |id| lookup.object(id).is_some_and(|object| object.name == name))?;
        let object = lookup.object(id)?;
        (object.position == position && object.direction != direction).then_some(id)
    }

    /// Scans up to `max_distance` cells along `search_direction` for the partner of an underground object: the
    /// first object of the same type facing `direction`. A same-type object facing the opposite way blocks the scan.
    pub fn get_opposing_object<L: ObjectLookup>(
        &self,
        lookup: &L,
        name: &str,
        direction: Direction,
        position: Point,
        search_direction: Direction,
        max_distance: u32,
    ) -> Option<ObjectId> {
        let horizontal = search_direction as u8 % 4 != 0;
        let sign = if search_direction == Direction::North || search_direction == Direction::West {
            -1
        } else {
            1
        };
        let origin = position.floor();

        for i in 1..=max_distance as i32 {
            let cell = if horizontal {
                origin.offset(i * sign, 0)
            } else {
                origin.offset(0, i * sign)
            };
            let Some(Occupancy::Single(id)) = self.cells.get(&cell) else {
                continue;
            };
            let Some(object) = lookup.object(*id) else {
                continue;
            };
            if object.name == name {
                if object.direction == direction {
                    return Some(*id);
                }
                if object.direction.opposite() == direction {
                    return None;
                }
            }
        }

        None
    }

    /// Distinct objects touching the area from outside, corners included.
    pub fn surrounding_objects(&self, area: &Area) -> Vec<ObjectId> {
        let mut seen = FxHashSet::default();
        area.perimeter()
            .into_iter()
            .flat_map(|cell| self.ids_at(cell).iter().copied())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// The four cardinal neighbours of the cell containing the point.
    pub fn neighbour_data(&self, point: Point) -> Vec<NeighbourData> {
        let origin = point.floor();
        [Direction::North, Direction::East, Direction::South, Direction::West]
            .into_iter()
            .map(|relative_direction| {
                let (dx, dy) = relative_direction.offset();
                let cell = origin.offset(dx, dy);
                NeighbourData {
                    cell,
                    relative_direction,
                    object: self.object_at_cell(cell),
                }
            })
            .collect()
    }
}
