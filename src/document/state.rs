use crate::catalog::prototypes::EntityPrototype;
use crate::catalog::Catalog;
use crate::document::events::{DocumentEvent, EventListeners};
use crate::document::placed_object::{ObjectId, ObjectTable, PlacedObject};
use crate::document::placed_tile::PlacedTile;
use crate::history::lens::Lens;
use crate::spatial_index::{ObjectLookup, SpatialIndex};
use crate::wires::connection_graph::ConnectionGraph;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type TileTable = BTreeMap<String, PlacedTile>;

/// Everything the history of a document records changes of, together with the indexes derived from it.
pub struct DocumentState {
    pub(crate) catalog: Rc<Catalog>,
    pub(crate) objects: ObjectTable,
    pub(crate) tiles: TileTable,
    pub(crate) wires: ConnectionGraph,
    pub(crate) grid: SpatialIndex,
    pub(crate) listeners: EventListeners,
}

impl DocumentState {
    pub fn new(catalog: Rc<Catalog>) -> Self {
        DocumentState {
            catalog,
            objects: ObjectTable::new(),
            tiles: TileTable::new(),
            wires: ConnectionGraph::new(),
            grid: SpatialIndex::new(),
            listeners: EventListeners::default(),
        }
    }

    pub fn view(&self) -> ObjectsView<'_> {
        ObjectsView::new(&self.objects, &self.catalog)
    }

    pub(crate) fn emit(&mut self, event: DocumentEvent) {
        self.listeners.emit(event);
    }

    /// Registers the footprint of an object that has just been inserted into the table.
    pub(crate) fn index_object(&mut self, object: &PlacedObject) {
        let Some(prototype) = self.catalog.entity(&object.name) else {
            return;
        };
        let area = prototype.footprint(object.position, object.direction);
        let view = ObjectsView::new(&self.objects, &self.catalog);
        self.grid.set_tile_data(&view, object.id, area);
    }

    pub(crate) fn unindex_object(&mut self, object: &PlacedObject) {
        if let Some(prototype) = self.catalog.entity(&object.name) {
            self.grid
                .remove_tile_data(object.id, prototype.footprint(object.position, object.direction));
        }
    }
}

pub(crate) fn objects(state: &mut DocumentState) -> &mut ObjectTable {
    &mut state.objects
}

pub(crate) fn tiles(state: &mut DocumentState) -> &mut TileTable {
    &mut state.tiles
}

pub(crate) fn wires(state: &mut DocumentState) -> &mut ConnectionGraph {
    &mut state.wires
}

/// Read access to objects and their prototypes, as needed by the spatial index and the wire codec.
#[derive(Copy, Clone)]
pub struct ObjectsView<'a> {
    objects: &'a ObjectTable,
    catalog: &'a Catalog,
}

impl<'a> ObjectsView<'a> {
    pub fn new(objects: &'a ObjectTable, catalog: &'a Catalog) -> Self {
        ObjectsView { objects, catalog }
    }
}

impl ObjectLookup for ObjectsView<'_> {
    fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    fn prototype(&self, name: &str) -> Option<&EntityPrototype> {
        self.catalog.entity(name)
    }
}

/// A field of one object, resolved anew on every apply.
pub struct ObjectField<V: 'static> {
    id: ObjectId,
    field: fn(&mut PlacedObject) -> &mut V,
}

impl<V: 'static> ObjectField<V> {
    pub fn new(id: ObjectId, field: fn(&mut PlacedObject) -> &mut V) -> Self {
        ObjectField { id, field }
    }
}

impl<V: 'static> Lens<DocumentState, V> for ObjectField<V> {
    fn focus<'a>(&self, state: &'a mut DocumentState) -> Option<&'a mut V> {
        state.objects.get_mut(&self.id).map(self.field)
    }
}
