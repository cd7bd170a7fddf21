use crate::catalog::Catalog;
use crate::codec::conversion::{document_from_data, document_to_data};
use crate::codec::payload::{BlueprintData, BookData, BookEntry, BOOK_ITEM};
use crate::config::{DocumentOptions, EXPORT_VERSION};
use crate::document::Document;
use crate::errors::CodecError;
use log::{debug, warn};
use std::rc::Rc;

/// Number of blueprints in the entries and all books nested in them.
fn leaf_count(entries: &[BookEntry]) -> usize {
    entries
        .iter()
        .map(|entry| match (&entry.blueprint, &entry.blueprint_book) {
            (Some(_), _) => 1,
            (None, Some(book)) => leaf_count(&book.blueprints),
            (None, None) => 0,
        })
        .sum()
}

/// Position of the entry the active index of a book refers to.
fn active_position(book: &BookData) -> Option<usize> {
    book.blueprints
        .iter()
        .position(|entry| entry.index == book.active_index)
}

/// Flattened index of the blueprint that is active in the book, following active indexes into nested books. A
/// selected planner or empty book selects the first blueprint.
fn flattened_active_index(book: &BookData) -> usize {
    let Some(position) = active_position(book) else {
        return 0;
    };
    let active = &book.blueprints[position];
    let nested = match (&active.blueprint, &active.blueprint_book) {
        (Some(_), _) => 0,
        (None, Some(nested)) if leaf_count(&nested.blueprints) > 0 => flattened_active_index(nested),
        _ => return 0,
    };
    leaf_count(&book.blueprints[..position]) + nested
}

fn leaf_at(entries: &[BookEntry], mut index: usize) -> Option<&BlueprintData> {
    for entry in entries {
        if let Some(blueprint) = &entry.blueprint {
            if index == 0 {
                return Some(blueprint);
            }
            index -= 1;
        } else if let Some(book) = &entry.blueprint_book {
            let count = leaf_count(&book.blueprints);
            if index < count {
                return leaf_at(&book.blueprints, index);
            }
            index -= count;
        }
    }
    None
}

/// Replaces the blueprint at the flattened index and makes it active in every book on the way to it. Returns the
/// index of the entry holding it, or `None` when the index is out of range.
fn store_leaf(entries: &mut [BookEntry], mut index: usize, data: BlueprintData) -> Option<usize> {
    for entry in entries.iter_mut() {
        if entry.blueprint.is_some() {
            if index == 0 {
                entry.blueprint = Some(data);
                return Some(entry.index);
            }
            index -= 1;
        } else if let Some(book) = &mut entry.blueprint_book {
            let count = leaf_count(&book.blueprints);
            if index < count {
                let nested = store_leaf(&mut book.blueprints, index, data)?;
                book.active_index = nested;
                return Some(entry.index);
            }
            index -= count;
        }
    }
    None
}

/// A blueprint book: nested entries of which one blueprint at a time is open for editing as a `Document`. Blueprints
/// are addressed by their position in a depth-first walk over the nested books, counting blueprints only.
pub struct DocumentSet {
    catalog: Rc<Catalog>,
    options: DocumentOptions,
    data: BookData,
    active_index: usize,
    active: Document,
}

impl DocumentSet {
    /// Opens the book at its active blueprint. Fails when the book holds no blueprint at all.
    pub fn new(data: BookData, catalog: Rc<Catalog>, options: DocumentOptions) -> Result<Self, CodecError> {
        let count = leaf_count(&data.blueprints);
        if count == 0 {
            return Err(CodecError::EmptyDocumentSet);
        }
        let active_index = flattened_active_index(&data);
        let active = document_from_data(u!(leaf_at(&data.blueprints, active_index)).clone(), catalog.clone(), options);
        debug!("Opened a book with {} blueprints at {}.", count, active_index);
        Ok(DocumentSet {
            catalog,
            options,
            data,
            active_index,
            active,
        })
    }

    pub fn label(&self) -> Option<&str> {
        self.data.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.data.description.as_deref()
    }

    /// Number of blueprints, nested ones included.
    pub fn len(&self) -> usize {
        leaf_count(&self.data.blueprints)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_index(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active(&self) -> &Document {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut Document {
        &mut self.active
    }

    /// Writes the active document back into the book, then opens the blueprint at the index. An index out of range
    /// selects the first blueprint, no index reopens the active one.
    pub fn select(&mut self, index: Option<usize>) -> &mut Document {
        self.store_active();
        if let Some(index) = index {
            if index >= self.len() {
                warn!("Blueprint {} is not in the book of {}, selecting the first one.", index, self.len());
            }
            self.active_index = if index < self.len() { index } else { 0 };
        }
        let data = u!(leaf_at(&self.data.blueprints, self.active_index)).clone();
        self.active = document_from_data(data, self.catalog.clone(), self.options);
        &mut self.active
    }

    /// The book with the active document written back into it and its entries numbered by position.
    pub fn serialize(&mut self) -> BookData {
        let active_entry = self.store_active();
        let mut data = self.data.clone();
        let mut active_index = 0;
        for (position, entry) in data.blueprints.iter_mut().enumerate() {
            if Some(entry.index) == active_entry {
                active_index = position;
            }
            entry.index = position;
        }
        data.active_index = active_index;
        data.item = BOOK_ITEM.to_string();
        data.version = Some(EXPORT_VERSION.pack());
        data
    }

    fn store_active(&mut self) -> Option<usize> {
        let entry = store_leaf(&mut self.data.blueprints, self.active_index, document_to_data(&self.active));
        if let Some(entry) = entry {
            self.data.active_index = entry;
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use crate::book::{flattened_active_index, leaf_at, leaf_count, DocumentSet};
    use crate::catalog::fixture::shared_test_catalog;
    use crate::codec::payload::{BlueprintData, BookData, BookEntry};
    use crate::config::DocumentOptions;
    use crate::document::placed_object::NewObject;
    use crate::errors::CodecError;
    use crate::geometry::Point;
    use serde_json::json;

    fn blueprint(label: &str) -> BlueprintData {
        serde_json::from_value(json!({
            "label": label,
            "entities": [{"entity_number": 1, "name": "wooden-chest", "position": {"x": 0.5, "y": 0.5}}]
        }))
        .unwrap()
    }

    fn book(entries: Vec<BookEntry>, active_index: usize) -> BookData {
        serde_json::from_value::<BookData>(json!({"blueprints": [], "active_index": active_index}))
            .map(|mut book| {
                book.blueprints = entries;
                book
            })
            .unwrap()
    }

    fn planner(index: usize) -> BookEntry {
        serde_json::from_value(json!({"index": index, "upgrade_planner": {"item": "upgrade-planner"}})).unwrap()
    }

    /// a, planner, [b, [], [c, d]], e
    fn nested(outer_active: usize, inner_active: usize) -> BookData {
        let innermost = book(vec![BookEntry::blueprint(0, blueprint("c")), BookEntry::blueprint(1, blueprint("d"))], 1);
        let inner = book(
            vec![
                BookEntry::blueprint(0, blueprint("b")),
                BookEntry::book(1, book(vec![], 0)),
                BookEntry::book(2, innermost),
            ],
            inner_active,
        );
        book(
            vec![
                BookEntry::blueprint(0, blueprint("a")),
                planner(1),
                BookEntry::book(2, inner),
                BookEntry::blueprint(3, blueprint("e")),
            ],
            outer_active,
        )
    }

    #[test]
    fn test_flattening() {
        let data = nested(2, 2);
        assert_eq!(leaf_count(&data.blueprints), 5);
        let labels = (0..5)
            .map(|i| leaf_at(&data.blueprints, i).and_then(|b| b.label.clone()).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["a", "b", "c", "d", "e"]);
        assert!(leaf_at(&data.blueprints, 5).is_none());

        assert_eq!(flattened_active_index(&nested(2, 2)), 3);
        assert_eq!(flattened_active_index(&nested(2, 0)), 1);
        assert_eq!(flattened_active_index(&nested(3, 0)), 4);
        assert_eq!(flattened_active_index(&nested(1, 0)), 0);
        assert_eq!(flattened_active_index(&nested(2, 1)), 1);
        assert_eq!(flattened_active_index(&nested(9, 0)), 0);
    }

    #[test]
    fn test_active_index_refers_to_entry_index() {
        // Entries saved after others were removed from the book keep their original indexes.
        let sparse = |active_index| {
            book(
                vec![
                    BookEntry::blueprint(0, blueprint("a")),
                    BookEntry::blueprint(5, blueprint("b")),
                    BookEntry::blueprint(7, blueprint("c")),
                ],
                active_index,
            )
        };
        assert_eq!(flattened_active_index(&sparse(7)), 2);
        assert_eq!(flattened_active_index(&sparse(5)), 1);
        assert_eq!(flattened_active_index(&sparse(2)), 0);
        assert_eq!(flattened_active_index(&sparse(1)), 0);

        let set = DocumentSet::new(sparse(7), shared_test_catalog(), DocumentOptions::default()).unwrap();
        assert_eq!(set.active_index(), 2);
        assert_eq!(set.active().label.as_deref(), Some("c"));
    }

    #[test]
    fn test_select_keeps_edits() {
        let mut set = DocumentSet::new(nested(0, 0), shared_test_catalog(), DocumentOptions::default()).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.active_index(), 0);
        assert_eq!(set.active().label.as_deref(), Some("a"));

        set.active_mut()
            .create_object(NewObject::new("iron-chest", Point::new(4.5, 0.5)))
            .unwrap();
        let document = set.select(Some(3));
        assert_eq!(document.label.as_deref(), Some("d"));

        assert_eq!(set.select(Some(0)).object_count(), 2);
        assert_eq!(set.select(Some(17)).label.as_deref(), Some("a"));
        assert_eq!(set.active_index(), 0);
    }

    #[test]
    fn test_serialize() {
        let mut set = DocumentSet::new(nested(0, 0), shared_test_catalog(), DocumentOptions::default()).unwrap();
        set.select(Some(2));
        let data = set.serialize();
        assert_eq!(data.active_index, 2);
        let inner = data.blueprints[2].blueprint_book.as_ref().unwrap();
        assert_eq!(inner.active_index, 2);
        assert_eq!(inner.blueprints[2].blueprint_book.as_ref().unwrap().active_index, 0);
        assert!(data.version.is_some());
        assert_eq!(flattened_active_index(&data), 2);

        let reopened = DocumentSet::new(data, shared_test_catalog(), DocumentOptions::default()).unwrap();
        assert_eq!(reopened.active_index(), 2);
        assert_eq!(reopened.active().label.as_deref(), Some("c"));
    }

    #[test]
    fn test_reindexes_entries() {
        let mut data = nested(3, 0);
        for (i, entry) in data.blueprints.iter_mut().enumerate() {
            entry.index = i * 2;
        }
        data.active_index = 6;
        let mut set = DocumentSet::new(data, shared_test_catalog(), DocumentOptions::default()).unwrap();
        assert_eq!(set.active().label.as_deref(), Some("e"));
        let data = set.serialize();
        assert_eq!(data.blueprints.iter().map(|entry| entry.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(data.active_index, 3);
    }

    #[test]
    fn test_empty_book() {
        let data = book(vec![planner(0), BookEntry::book(1, book(vec![], 0))], 0);
        assert!(matches!(
            DocumentSet::new(data, shared_test_catalog(), DocumentOptions::default()),
            Err(CodecError::EmptyDocumentSet)
        ));
    }
}
