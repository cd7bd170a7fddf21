pub mod events;
pub mod generators;
pub mod objects;
pub mod placed_object;
pub mod placed_tile;
pub mod settings;
pub mod state;
pub mod wiring;

use crate::catalog::Catalog;
use crate::config::DocumentOptions;
use crate::document::events::{DocumentEvent, ListenerId};
use crate::document::placed_object::{ObjectId, PlacedObject};
use crate::document::placed_tile::{tile_hash, PlacedTile};
use crate::document::state::{tiles, DocumentState, ObjectsView};
use crate::geometry::area::{Area, Bounds};
use crate::geometry::{round_half_up, Point};
use crate::history::History;
use crate::spatial_index::{ObjectLookup, SpatialIndex};
use crate::utils::map_utils::CountMapUtils;
use crate::wires::wire_link::WireLink;
use log::{debug, error};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

/// One editable blueprint. All changes go through the history, which keeps the object table, the tiles, the wires and
/// the spatial index in step and notifies subscribers.
pub struct Document {
    pub(crate) state: DocumentState,
    pub(crate) history: History<DocumentState>,
    next_id: u32,
    options: DocumentOptions,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Icon signal names by their 1-based slot.
    pub icons: BTreeMap<u8, String>,
    /// Blueprint fields the engine does not interpret, kept for export.
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(catalog: Rc<Catalog>) -> Self {
        Document::with_options(catalog, DocumentOptions::default())
    }

    pub fn with_options(catalog: Rc<Catalog>, options: DocumentOptions) -> Self {
        Document {
            state: DocumentState::new(catalog),
            history: History::with_limits(options.max_history_length, options.min_history_length),
            next_id: 1,
            options,
            label: None,
            description: None,
            icons: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    pub fn catalog(&self) -> &Rc<Catalog> {
        &self.state.catalog
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DocumentOptions) {
        self.options = options;
    }

    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.state.objects.get(&id)
    }

    /// Objects in the order of their ids.
    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.state.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.state.objects.len()
    }

    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        self.state.grid.object_at(point)
    }

    pub fn tile(&self, position: Point) -> Option<&PlacedTile> {
        self.state.tiles.get(&tile_hash(position))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.state.tiles.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &WireLink> {
        self.state.wires.links()
    }

    pub fn grid(&self) -> &SpatialIndex {
        &self.state.grid
    }

    pub fn view(&self) -> ObjectsView<'_> {
        self.state.view()
    }

    pub fn is_empty(&self) -> bool {
        self.state.objects.is_empty() && self.state.tiles.is_empty()
    }

    pub fn footprint(&self, id: ObjectId) -> Option<Area> {
        self.view().footprint(id)
    }

    pub(crate) fn allocate_id(&mut self, requested: Option<ObjectId>) -> ObjectId {
        match requested {
            Some(id) => {
                self.next_id = self.next_id.max(id.0 + 1);
                id
            }
            None => {
                let id = ObjectId(self.next_id);
                self.next_id += 1;
                id
            }
        }
    }

    // History.

    pub fn history(&self) -> &History<DocumentState> {
        &self.history
    }

    /// Groups the following changes into one undo step until the matching `commit_transaction`.
    pub fn start_transaction(&mut self, text: &str) -> bool {
        self.history.start_transaction(Some(text), true)
    }

    pub fn commit_transaction(&mut self) -> bool {
        let committed = self.history.commit_transaction(&mut self.state);
        self.debug_verify();
        committed
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.state);
        self.debug_verify();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.state);
        self.debug_verify();
        redone
    }

    /// Makes the current content the starting point of the history, e.g., after loading.
    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    // Events.

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&DocumentEvent) + 'static,
    {
        self.state.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.state.listeners.unsubscribe(id)
    }

    // Tiles.

    /// Places tiles centered at the positions, replacing existing ones.
    pub fn create_tiles(&mut self, name: &str, positions: &[Point]) -> usize {
        if !self.state.catalog.has_tile(name) {
            debug!("Ignoring tiles of unknown type {}.", name);
            return 0;
        }
        self.history.start_transaction(Some("Create tiles"), true);
        let mut created = 0;
        for &position in positions {
            let tile = PlacedTile::new(name, position);
            if self.state.tiles.get(&tile.hash()) == Some(&tile) {
                continue;
            }
            self.history
                .update_map(&mut self.state, tiles, tile.hash(), Some(tile), "Create tile")
                .on_done(tile_replaced)
                .commit(&mut self.state);
            created += 1;
        }
        self.commit_transaction();
        created
    }

    pub fn remove_tiles(&mut self, positions: &[Point]) -> usize {
        self.history.start_transaction(Some("Remove tiles"), true);
        let mut removed = 0;
        for &position in positions {
            let hash = tile_hash(position);
            if !self.state.tiles.contains_key(&hash) {
                continue;
            }
            self.history
                .update_map(&mut self.state, tiles, hash, None, "Remove tile")
                .on_done(tile_replaced)
                .commit(&mut self.state);
            removed += 1;
        }
        self.commit_transaction();
        removed
    }

    // Layout.

    /// Box around all object footprints and tiles.
    pub fn bounds(&self) -> Option<Bounds> {
        let view = self.view();
        let objects = self
            .state
            .objects
            .keys()
            .filter_map(|&id| view.footprint(id))
            .map(|area| Bounds::of_area(&area));
        let tiles = self
            .state
            .tiles
            .values()
            .map(|tile| Bounds::of_area(&Area::new(tile.position, 1, 1)));
        objects.chain(tiles).fold(None, Bounds::extend)
    }

    /// Whole-cell center of the content, the origin of exported positions.
    pub fn center(&self) -> Point {
        match self.bounds() {
            Some(bounds) => {
                let center = bounds.center();
                Point::new(round_half_up(center.x), round_half_up(center.y))
            }
            None => Point::default(),
        }
    }

    /// Position of the first rail-like object, which decides the rail grid parity on export.
    pub fn first_rail_position(&self) -> Option<Point> {
        use crate::catalog::prototypes::EntityKind::{CurvedRail, StraightRail, TrainStop};
        let view = self.view();
        self.state.objects.values().find_map(|object| {
            let prototype = view.prototype(&object.name)?;
            match prototype.kind {
                StraightRail | TrainStop => Some(object.position),
                CurvedRail => Some(object.position - Point::new(1.0, 1.0)),
                _ => None,
            }
        })
    }

    /// Icons describing the content: the most prominent placed item and, when large enough, the runner-up. Tile
    /// blueprints get the item of the most common tile.
    pub fn generated_icons(&self) -> BTreeMap<u8, String> {
        let catalog = &self.state.catalog;
        let mut icons = BTreeMap::new();

        if !self.state.objects.is_empty() {
            let mut counts: Vec<(String, i32, i32)> = Vec::new();
            for object in self.state.objects.values() {
                let Some(prototype) = catalog.entity(&object.name) else {
                    continue;
                };
                let item = prototype.placing_item();
                match counts.iter_mut().find(|(name, _, _)| name == item) {
                    Some((_, _, count)) => *count += 1,
                    None => counts.push((item.to_string(), prototype.size.width * prototype.size.height, 1)),
                }
            }
            counts.sort_by(|(a, a_area, a_count), (b, b_area, b_count)| {
                (b_area * b_count).cmp(&(a_area * a_count)).then_with(|| a.cmp(b))
            });
            if let Some((first, first_area, first_count)) = counts.first() {
                icons.insert(1, first.clone());
                if let Some((second, second_area, second_count)) = counts.get(1) {
                    let first_score = (first_area * first_count) as f64;
                    let second_score = (second_area * second_count) as f64;
                    if *second_area > 1 && second_score * 2.5 > first_score {
                        icons.insert(2, second.clone());
                    }
                }
            }
        } else if !self.state.tiles.is_empty() {
            let mut counts: FxHashMap<String, usize> = FxHashMap::default();
            for tile in self.state.tiles.values() {
                let item = catalog
                    .tile(&tile.name)
                    .map(|prototype| prototype.placing_item().to_string())
                    .unwrap_or_else(|| tile.name.clone());
                counts.increment(item);
            }
            let most_common = counts
                .into_iter()
                .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)));
            if let Some((first, _)) = most_common {
                icons.insert(1, first);
            }
        }

        icons
    }

    // Consistency.

    /// Whether the spatial index holds exactly the footprints of the objects in the table.
    pub fn is_consistent(&self) -> bool {
        let view = self.view();
        let mut expected = 0;
        for &id in self.state.objects.keys() {
            let Some(area) = view.footprint(id) else {
                return false;
            };
            for cell in area.cells() {
                expected += 1;
                if !self.state.grid.cell(cell).is_some_and(|occupancy| occupancy.ids().contains(&id)) {
                    return false;
                }
            }
        }
        let indexed: usize = self.state.grid.cells().map(|(_, occupancy)| occupancy.ids().len()).sum();
        let links_valid = self
            .state
            .wires
            .links()
            .all(|link| link.endpoints().iter().all(|e| self.state.objects.contains_key(&e.object)));
        indexed == expected && links_valid
    }

    fn debug_verify(&self) {
        if cfg!(debug_assertions) && self.history.is_idle() && !self.is_consistent() {
            error!("The spatial index or the wires no longer match the objects of the document.");
            debug_assert!(false);
        }
    }
}

fn tile_replaced(state: &mut DocumentState, current: &Option<PlacedTile>, replaced: &Option<PlacedTile>) {
    if let Some(old) = replaced {
        state.emit(DocumentEvent::TileRemoved(old.hash()));
    }
    if let Some(new) = current {
        state.emit(DocumentEvent::TileCreated(new.hash()));
    }
}
