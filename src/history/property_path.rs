use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Path into a JSON-like value. Segments address object keys, or array indices when the parent is an array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new<I, T>(segments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        PropertyPath(segments.into_iter().map(Into::into).collect())
    }

    /// Parses a dot separated path such as `control_behavior.filters.0`.
    pub fn parse(path: &str) -> Self {
        PropertyPath::new(path.split('.').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |value, segment| child(value, segment))
    }

    /// Like `get`, with the first segment addressing a key of the map.
    pub fn get_in<'a>(&self, map: &'a Map<String, Value>) -> Option<&'a Value> {
        let (first, rest) = self.0.split_first()?;
        rest.iter().try_fold(map.get(first)?, |value, segment| child(value, segment))
    }

    pub fn set_in(&self, map: &mut Map<String, Value>, value: Value) {
        if !self.0.is_empty() {
            with_object(map, |root| self.set(root, value));
        }
    }

    pub fn delete_in(&self, map: &mut Map<String, Value>) {
        if !self.0.is_empty() {
            with_object(map, |root| self.delete(root));
        }
    }

    /// Writes the value, creating missing intermediate objects. An array parent gets the value appended.
    pub fn set(&self, root: &mut Value, value: Value) {
        let Some((last, parents)) = self.0.split_last() else {
            *root = value;
            return;
        };
        let mut current = root;
        for segment in parents {
            if current.is_null() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(map) => map
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                Value::Array(array) => match segment.parse::<usize>().ok().and_then(|i| array.get_mut(i)) {
                    Some(element) => element,
                    None => return,
                },
                _ => return,
            };
        }
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        match current {
            Value::Object(map) => {
                map.insert(last.clone(), value);
            }
            Value::Array(array) => array.push(value),
            _ => {}
        }
    }

    /// Removes the value. An array parent has the element spliced out.
    pub fn delete(&self, root: &mut Value) {
        let Some((last, parents)) = self.0.split_last() else {
            *root = Value::Null;
            return;
        };
        let mut current = root;
        for segment in parents {
            current = match child_mut(current, segment) {
                Some(child) => child,
                None => return,
            };
        }
        match current {
            Value::Object(map) => {
                map.remove(last);
            }
            Value::Array(array) => {
                if let Some(index) = last.parse::<usize>().ok().filter(|&i| i < array.len()) {
                    array.remove(index);
                }
            }
            _ => {}
        }
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

fn with_object<F: FnOnce(&mut Value)>(map: &mut Map<String, Value>, f: F) {
    let mut root = Value::Object(std::mem::take(map));
    f(&mut root);
    if let Value::Object(object) = root {
        *map = object;
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(array) => segment.parse::<usize>().ok().and_then(|i| array.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(array) => segment.parse::<usize>().ok().and_then(|i| array.get_mut(i)),
        _ => None,
    }
}
