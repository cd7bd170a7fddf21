use crate::document::placed_object::ObjectId;
use crate::geometry::Point;
use crate::wires::wire_link::WireLink;

/// Settings group of an object that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectProperty {
    Direction,
    DirectionType,
    Recipe,
    Modules,
    Filters,
    RequestFilters,
    SplitterSettings,
    Station,
    Extra(String),
}

/// Notification about a change of the document, sent on apply, undo and redo alike.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    ObjectCreated(ObjectId),
    ObjectRemoved(ObjectId),
    ObjectMoved { id: ObjectId, from: Point, to: Point },
    ObjectChanged { id: ObjectId, property: ObjectProperty },
    TileCreated(String),
    TileRemoved(String),
    WireCreated(WireLink),
    WireRemoved(WireLink),
}

pub type ListenerId = u32;

type Listener = Box<dyn FnMut(&DocumentEvent)>;

#[derive(Default)]
pub struct EventListeners {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, Listener)>,
}

impl EventListeners {
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&DocumentEvent) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let len = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != len
    }

    pub fn emit(&mut self, event: DocumentEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}
