use crate::history::History;

/// Which of the two recorded values an action should put into effect.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HistoryValue {
    New,
    Old,
}

pub trait HistoryAction<S> {
    fn apply(&self, state: &mut S, value: HistoryValue);

    fn text(&self) -> &str;
}

pub type ApplyFn<S, V> = Box<dyn Fn(&mut S, &V)>;
pub type DoneFn<S, V> = Box<dyn Fn(&mut S, &V, &V)>;

/// A single reversible change. Applying it with the other value reverts it.
pub struct Action<S, V> {
    old_value: V,
    new_value: V,
    text: String,
    apply_fn: ApplyFn<S, V>,
    done_callbacks: Vec<DoneFn<S, V>>,
}

impl<S, V> Action<S, V> {
    pub(crate) fn new(old_value: V, new_value: V, text: String, apply_fn: ApplyFn<S, V>) -> Self {
        Action {
            old_value,
            new_value,
            text,
            apply_fn,
            done_callbacks: Vec::new(),
        }
    }
}

impl<S, V> HistoryAction<S> for Action<S, V> {
    fn apply(&self, state: &mut S, value: HistoryValue) {
        let (current, replaced) = match value {
            HistoryValue::New => (&self.new_value, &self.old_value),
            HistoryValue::Old => (&self.old_value, &self.new_value),
        };
        (self.apply_fn)(state, current);
        for callback in self.done_callbacks.iter() {
            callback(state, current, replaced);
        }
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// A recorded action waiting for its callbacks and the commit.
/// Dropping it without committing leaves the implicitly opened transaction open.
#[must_use = "the change is not recorded until it is committed"]
pub struct ActionBuilder<'h, S: 'static, V: 'static> {
    history: &'h mut History<S>,
    action: Action<S, V>,
}

impl<'h, S: 'static, V: 'static> ActionBuilder<'h, S, V> {
    pub(crate) fn new(history: &'h mut History<S>, action: Action<S, V>) -> Self {
        ActionBuilder { history, action }
    }

    /// Registers a callback run on every apply, undo and redo with the value now in effect and the value it
    /// replaced.
    pub fn on_done<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut S, &V, &V) + 'static,
    {
        self.action.done_callbacks.push(Box::new(callback));
        self
    }

    /// Adds the action to the active transaction and commits one level of it.
    /// Returns whether an outermost transaction was pushed onto the history.
    pub fn commit(self, state: &mut S) -> bool {
        self.history.push_action(state, Box::new(self.action));
        self.history.commit_transaction(state)
    }
}
