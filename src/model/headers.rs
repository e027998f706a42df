//! Ordered, case-insensitive header storage.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

/// Headers of one message segment, in the order they first appeared.
///
/// Names are stored lowercase. Inserting a name that already exists replaces
/// its value in place; folded continuation lines are joined by the parser
/// before they reach the map. Lookups go through a name index, so building
/// a map stays linear in the number of headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a header. The name is lowercased.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.index.get(&name) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    /// Append a continuation to an existing header, separated by one space.
    pub(crate) fn append(&mut self, name: &str, continuation: &str) {
        if let Some(&pos) = self.index.get(name) {
            let value = &mut self.entries[pos].1;
            value.push(' ');
            value.push_str(continuation);
        }
    }

    /// Look up a header value (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        let pos = match self.index.get(name) {
            Some(&pos) => pos,
            None => *self.index.get(&name.to_ascii_lowercase())?,
        };
        Some(self.entries[pos].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Serialized as a JSON-style object, keys in insertion order.
impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
