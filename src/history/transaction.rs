use crate::history::action::{HistoryAction, HistoryValue};

/// One undo step.
pub struct Transaction<S> {
    text: Option<String>,
    apply_immediate: bool,
    actions: Vec<Box<dyn HistoryAction<S>>>,
}

impl<S> Transaction<S> {
    pub fn new(text: Option<&str>, apply_immediate: bool) -> Self {
        Transaction {
            text: text.map(str::to_string),
            apply_immediate,
            actions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn apply_immediate(&self) -> bool {
        self.apply_immediate
    }

    /// The explicit description, or the one of the first action.
    pub fn text(&self) -> &str {
        match &self.text {
            Some(text) => text,
            None => self.actions.first().map(|a| a.text()).unwrap_or(""),
        }
    }

    pub(crate) fn push(&mut self, action: Box<dyn HistoryAction<S>>) {
        self.actions.push(action);
    }

    pub fn apply(&self, state: &mut S) {
        for action in self.actions.iter() {
            action.apply(state, HistoryValue::New);
        }
    }

    pub fn undo(&self, state: &mut S) {
        for action in self.actions.iter().rev() {
            action.apply(state, HistoryValue::Old);
        }
    }
}
