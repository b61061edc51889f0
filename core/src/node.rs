use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A materialized metadata tree. Keys are path segments; the top level of a
/// crawl result is keyed by namespace.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Node {
    entries: BTreeMap<String, LeafValue>,
}

/// What a key in a [`Node`] holds. Chosen once, when the value is
/// materialized.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LeafValue {
    Scalar(String),
    List(Vec<String>),
    Json(serde_json::Value),
    SubTree(Node),
}

impl LeafValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            LeafValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Node> {
        match self {
            LeafValue::SubTree(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, LeafValue::SubTree(_))
    }
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&LeafValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, LeafValue> {
        self.entries.iter()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: LeafValue) -> Option<LeafValue> {
        self.entries.insert(key.into(), value)
    }

    /// Follows `keys` through nested sub-trees.
    pub fn lookup<'a, I>(&self, keys: I) -> Option<&LeafValue>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keys = keys.into_iter();
        let mut current = self.entries.get(keys.next()?)?;
        for key in keys {
            current = current.as_tree()?.entries.get(key)?;
        }
        Some(current)
    }

    /// Like [`Node::lookup`] with a `/`-separated path.
    pub fn lookup_path(&self, path: &str) -> Option<&LeafValue> {
        self.lookup(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Stores `value` at `keys`, creating intermediate sub-trees. An
    /// intermediate key that currently holds a non-tree value is replaced by a
    /// sub-tree.
    pub fn insert_at(&mut self, keys: &[&str], value: LeafValue) {
        let Some((last, parents)) = keys.split_last() else {
            return;
        };
        let mut current = self;
        for key in parents {
            let slot = current
                .entries
                .entry((*key).to_string())
                .or_insert_with(|| LeafValue::SubTree(Node::new()));
            if !slot.is_tree() {
                *slot = LeafValue::SubTree(Node::new());
            }
            let LeafValue::SubTree(next) = slot else {
                unreachable!("slot was just made a sub-tree");
            };
            current = next;
        }
        current.entries.insert((*last).to_string(), value);
    }

    /// Copies every entry of `other` into `self`, recursing where both sides
    /// hold sub-trees.
    pub fn merge(&mut self, other: Node) {
        for (key, value) in other.entries {
            match (self.entries.get_mut(&key), value) {
                (Some(LeafValue::SubTree(existing)), LeafValue::SubTree(incoming)) => {
                    existing.merge(incoming);
                }
                (_, value) => {
                    self.entries.insert(key, value);
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = (&'a String, &'a LeafValue);
    type IntoIter = btree_map::Iter<'a, String, LeafValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, LeafValue)> for Node {
    fn from_iter<T: IntoIterator<Item = (String, LeafValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
