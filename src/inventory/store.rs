//! Insertion-ordered in-memory item collection.

use super::types::Item;

/// In-memory list of registered items.
///
/// Lookups are linear scans; the store is small-scale by construction and keeps no index.
#[derive(Debug, Default)]
pub struct InventoryStore {
    items: Vec<Item>,
}

impl InventoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Identifier uniqueness is left to the id generator.
    pub fn insert(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Return the first item with the given identifier.
    pub fn find_by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Mutable variant of [`InventoryStore::find_by_id`].
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Remove and return the first item with the given identifier.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Snapshot of every item in insertion order.
    pub fn list_all(&self) -> Vec<Item> {
        self.items.clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
