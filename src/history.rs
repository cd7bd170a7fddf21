pub mod action;
pub mod lens;
pub mod property_path;
pub mod transaction;

use crate::config::{MAX_HISTORY_LENGTH, MIN_HISTORY_LENGTH};
use crate::history::action::{Action, ActionBuilder, HistoryAction, HistoryValue};
use crate::history::lens::{KeyedCollection, Lens};
use crate::history::property_path::PropertyPath;
use crate::history::transaction::Transaction;
use log::{debug, trace, warn};
use more_asserts::debug_assert_le;
use serde_json::{Map, Value};

/// Undo/redo log over a state `S`. Every change is recorded as an action inside a transaction, transactions nest
/// through a counter and only the outermost commit creates an undo step.
pub struct History<S> {
    max_length: usize,
    min_length: usize,
    history_index: usize,
    transaction_count: u32,
    active_transaction: Option<Transaction<S>>,
    transaction_history: Vec<Transaction<S>>,
}

impl<S: 'static> Default for History<S> {
    fn default() -> Self {
        History::with_limits(MAX_HISTORY_LENGTH, MIN_HISTORY_LENGTH)
    }
}

impl<S: 'static> History<S> {
    pub fn new() -> Self {
        History::default()
    }

    /// History keeping at most `max_length` steps. When exceeded, the oldest ones are evicted until `min_length`
    /// remain.
    pub fn with_limits(max_length: usize, min_length: usize) -> Self {
        debug_assert_le!(min_length, max_length);
        History {
            max_length,
            min_length: min_length.min(max_length),
            history_index: 0,
            transaction_count: 0,
            active_transaction: None,
            transaction_history: Vec::new(),
        }
    }

    /// Number of undo steps available.
    pub fn index(&self) -> usize {
        self.history_index
    }

    pub fn len(&self) -> usize {
        self.transaction_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_history.is_empty()
    }

    /// No transaction is being recorded.
    pub fn is_idle(&self) -> bool {
        self.transaction_count == 0
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index < self.transaction_history.len()
    }

    /// Description of the step that `undo` would revert.
    pub fn undo_text(&self) -> Option<&str> {
        self.history_index
            .checked_sub(1)
            .and_then(|i| self.transaction_history.get(i))
            .map(Transaction::text)
    }

    pub fn reset(&mut self) {
        self.history_index = 0;
        self.transaction_count = 0;
        self.active_transaction = None;
        self.transaction_history.clear();
    }

    /// Opens a transaction, or one more nesting level of the active one.
    /// Returns true when a new outermost transaction was started. Nested levels inherit its settings.
    pub fn start_transaction(&mut self, text: Option<&str>, apply_immediate: bool) -> bool {
        self.transaction_count += 1;
        if self.active_transaction.is_none() {
            self.active_transaction = Some(Transaction::new(text, apply_immediate));
            true
        } else {
            false
        }
    }

    /// Closes one nesting level. Closing the outermost one applies queued actions, drops redoable steps and pushes
    /// the transaction. Returns whether a step was added.
    pub fn commit_transaction(&mut self, state: &mut S) -> bool {
        if self.transaction_count == 0 {
            warn!("Committing a transaction while none is active.");
            return false;
        }
        self.transaction_count -= 1;
        if self.transaction_count > 0 {
            return false;
        }

        let Some(transaction) = self.active_transaction.take() else {
            return false;
        };
        if transaction.is_empty() {
            return false;
        }

        self.transaction_history.truncate(self.history_index);
        if !transaction.apply_immediate() {
            transaction.apply(state);
        }
        debug!(
            "Committed transaction \"{}\" with {} actions.",
            transaction.text(),
            transaction.len()
        );
        self.transaction_history.push(transaction);
        self.history_index += 1;

        if self.transaction_history.len() > self.max_length {
            let evicted = self.transaction_history.len() - self.min_length;
            self.transaction_history.drain(..evicted);
            self.history_index -= evicted;
            trace!("Evicted {} oldest history steps.", evicted);
        }

        true
    }

    pub fn undo(&mut self, state: &mut S) -> bool {
        if !self.is_idle() || !self.can_undo() {
            return false;
        }
        self.history_index -= 1;
        let transaction = &self.transaction_history[self.history_index];
        transaction.undo(state);
        debug!("Undone \"{}\".", transaction.text());
        true
    }

    pub fn redo(&mut self, state: &mut S) -> bool {
        if !self.is_idle() || !self.can_redo() {
            return false;
        }
        let transaction = &self.transaction_history[self.history_index];
        transaction.apply(state);
        debug!("Redone \"{}\".", transaction.text());
        self.history_index += 1;
        true
    }

    pub(crate) fn push_action(&mut self, state: &mut S, action: Box<dyn HistoryAction<S>>) {
        if self.active_transaction.is_none() {
            self.start_transaction(None, true);
        }
        if let Some(transaction) = self.active_transaction.as_mut() {
            if transaction.apply_immediate() {
                action.apply(state, HistoryValue::New);
            }
            transaction.push(action);
        }
    }

    /// Records setting `key` of the collection to `value`, or deleting it when `value` is `None`.
    pub fn update_map<C>(
        &mut self,
        state: &mut S,
        target: fn(&mut S) -> &mut C,
        key: C::Key,
        value: Option<C::Value>,
        text: &str,
    ) -> ActionBuilder<'_, S, Option<C::Value>>
    where
        C: KeyedCollection + 'static,
    {
        self.start_transaction(None, true);
        let old_value = target(state).get_value(&key).cloned();
        let apply_fn = Box::new(move |state: &mut S, value: &Option<C::Value>| {
            let collection = target(state);
            match value {
                Some(value) => collection.set_value(key.clone(), value.clone()),
                None => collection.delete_value(&key),
            }
        });
        ActionBuilder::new(self, Action::new(old_value, value, text.to_string(), apply_fn))
    }

    /// Records assigning `value` to the place the lens focuses on. Optional fields use `V = Option<_>`, where `None`
    /// deletes.
    pub fn update_value<V, L>(&mut self, state: &mut S, lens: L, value: V, text: &str) -> ActionBuilder<'_, S, V>
    where
        V: Clone + 'static,
        L: Lens<S, V>,
    {
        self.start_transaction(None, true);
        let old_value = match lens.focus(state) {
            Some(current) => current.clone(),
            None => {
                warn!("Recording \"{}\" on a missing value.", text);
                value.clone()
            }
        };
        let apply_fn = Box::new(move |state: &mut S, value: &V| {
            if let Some(slot) = lens.focus(state) {
                *slot = value.clone();
            }
        });
        ActionBuilder::new(self, Action::new(old_value, value, text.to_string(), apply_fn))
    }

    /// Records a change at `path` inside a JSON object. `None` deletes the path, array parents push and splice.
    pub fn update_path<L>(
        &mut self,
        state: &mut S,
        root: L,
        path: PropertyPath,
        value: Option<Value>,
        text: &str,
    ) -> ActionBuilder<'_, S, Option<Value>>
    where
        L: Lens<S, Map<String, Value>>,
    {
        self.start_transaction(None, true);
        let old_value = root.focus(state).and_then(|root| path.get_in(root).cloned());
        let apply_fn = Box::new(move |state: &mut S, value: &Option<Value>| {
            if let Some(root) = root.focus(state) {
                match value {
                    Some(value) => path.set_in(root, value.clone()),
                    None => path.delete_in(root),
                }
            }
        });
        ActionBuilder::new(self, Action::new(old_value, value, text.to_string(), apply_fn))
    }
}
