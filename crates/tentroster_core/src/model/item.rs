//! Item metadata and registry.
//!
//! # Responsibility
//! - Hold opaque per-item metadata (display name, free-form attributes).
//! - Provide id lookups for callers that render or audit the roster.
//!
//! # Invariants
//! - Registry keys are unique; re-inserting an id replaces its metadata but
//!   keeps its original insertion position.
//! - Core logic never branches on anything but `Item::id`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Stable identifier for one draggable participant.
///
/// Kept as a type alias so ids flow unchanged to and from the listing endpoint.
pub type ItemId = String;

/// One draggable participant (e.g. a family member).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable id used by containers and drag events.
    pub id: ItemId,
    /// User-facing label. Never written to logs.
    pub display_name: String,
    /// Opaque key/value metadata owned by the caller.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Item {
    /// Creates an item with no attributes.
    pub fn new(id: impl Into<ItemId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Id-keyed item metadata lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRegistry {
    items: HashMap<ItemId, Item>,
    order: Vec<ItemId>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one item. Returns the previous metadata, if any.
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        let previous = self.items.insert(item.id.clone(), item.clone());
        if previous.is_none() {
            self.order.push(item.id);
        }
        previous
    }

    /// Removes one item from the registry.
    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let removed = self.items.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Returns the display name, falling back to the raw id for unknown items.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.items
            .get(id)
            .map(|item| item.display_name.as_str())
            .unwrap_or(id)
    }

    /// Iterates items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for ItemRegistry {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        let mut registry = Self::new();
        for item in iter {
            registry.insert(item);
        }
        registry
    }
}
