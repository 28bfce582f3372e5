//! Ordered containers of ordered item ids, with an item -> container index.
//!
//! # Responsibility
//! - Provide O(1) `container_of` lookups through a reverse index.
//! - Provide move/reorder/create/delete primitives used by services.
//!
//! # Invariants
//! - Each public mutator checks all preconditions before its first write, so a
//!   returned error implies the store is unchanged.
//! - Lock flags are stored here but enforced by the transfer service.

use crate::model::container::{
    is_reserved_id, Container, ContainerAssignment, ContainerId, ContainerListing,
};
use crate::model::item::ItemId;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by container store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from container store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Item is not assigned to any container.
    ItemNotFound(ItemId),
    /// Container id is not stored.
    ContainerNotFound(ContainerId),
    /// Container id is already stored.
    DuplicateContainer(ContainerId),
    /// Item id appears more than once across the listing.
    DuplicateItem(ItemId),
    /// Container id collides with a sentinel target id.
    ReservedContainerId(ContainerId),
    /// Container id is blank after trim.
    InvalidContainerId(ContainerId),
    /// Index is outside the valid range for the addressed list.
    IndexOutOfBounds {
        container: Option<ContainerId>,
        index: usize,
        len: usize,
    },
    /// Container still holds members.
    ContainerNotEmpty(ContainerId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "item is not assigned to a container: {id}"),
            Self::ContainerNotFound(id) => write!(f, "container not found: {id}"),
            Self::DuplicateContainer(id) => write!(f, "container already exists: {id}"),
            Self::DuplicateItem(id) => write!(f, "item assigned more than once: {id}"),
            Self::ReservedContainerId(id) => {
                write!(f, "container id is reserved for a drop sentinel: {id}")
            }
            Self::InvalidContainerId(id) => write!(f, "container id must not be blank: `{id}`"),
            Self::IndexOutOfBounds {
                container: Some(container),
                index,
                len,
            } => write!(
                f,
                "index {index} out of bounds for container {container} of length {len}"
            ),
            Self::IndexOutOfBounds {
                container: None,
                index,
                len,
            } => write!(f, "index {index} out of bounds for container order of length {len}"),
            Self::ContainerNotEmpty(id) => write!(f, "container is not empty: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Roster membership store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStore {
    containers: HashMap<ContainerId, Container>,
    order: Vec<ContainerId>,
    index: HashMap<ItemId, ContainerId>,
}

impl ContainerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from listing endpoint rows, preserving row order.
    ///
    /// # Errors
    /// - `InvalidContainerId` / `ReservedContainerId` for unusable ids.
    /// - `DuplicateContainer` when a container id repeats.
    /// - `DuplicateItem` when one item is listed in two places.
    pub fn from_listing<I>(listing: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = ContainerListing>,
    {
        let mut store = Self::new();
        for row in listing {
            validate_new_container_id(&row.container_id)?;
            if store.containers.contains_key(&row.container_id) {
                return Err(StoreError::DuplicateContainer(row.container_id));
            }

            let mut seen = HashSet::new();
            for member in &row.member_ids {
                if store.index.contains_key(member) || !seen.insert(member.as_str()) {
                    return Err(StoreError::DuplicateItem(member.clone()));
                }
            }
            for member in &row.member_ids {
                store.index.insert(member.clone(), row.container_id.clone());
            }

            store.order.push(row.container_id.clone());
            store.containers.insert(
                row.container_id.clone(),
                Container {
                    id: row.container_id,
                    items: row.member_ids,
                    is_locked: row.is_locked,
                },
            );
        }
        Ok(store)
    }

    /// Returns the container currently holding `item_id`.
    pub fn container_of(&self, item_id: &str) -> Option<&str> {
        self.index.get(item_id).map(String::as_str)
    }

    /// Returns `(container, index)` for an assigned item.
    pub fn locate(&self, item_id: &str) -> Option<(&str, usize)> {
        let container_id = self.index.get(item_id)?;
        let position = self.containers.get(container_id)?.position_of(item_id)?;
        Some((container_id.as_str(), position))
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }

    pub fn contains_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    pub fn container_order(&self) -> &[ContainerId] {
        &self.order
    }

    /// Position of a container in display order.
    pub fn container_position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|existing| existing == id)
    }

    /// Iterates containers in display order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.order.iter().filter_map(|id| self.containers.get(id))
    }

    /// Items of one container, or an empty slice for unknown ids.
    pub fn items_of(&self, id: &str) -> &[ItemId] {
        self.containers
            .get(id)
            .map(|container| container.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_assigned(&self, item_id: &str) -> bool {
        self.index.contains_key(item_id)
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.containers
            .get(id)
            .map(|container| container.is_locked)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of assigned items across all containers.
    pub fn item_count(&self) -> usize {
        self.index.len()
    }

    /// Moves one assigned item into `to_container` at `to_index`.
    ///
    /// `to_index` addresses the target list after the item has been removed
    /// from its origin, so `items_of(to).len()` (minus one when moving within
    /// the same container) means append. Returns the final index.
    pub fn move_item(
        &mut self,
        item_id: &str,
        to_container: &str,
        to_index: usize,
    ) -> StoreResult<usize> {
        let (from_container, from_index) = self
            .locate(item_id)
            .map(|(container, index)| (container.to_string(), index))
            .ok_or_else(|| StoreError::ItemNotFound(item_id.to_string()))?;
        let target = self
            .containers
            .get(to_container)
            .ok_or_else(|| StoreError::ContainerNotFound(to_container.to_string()))?;

        let len_after_removal = if from_container == to_container {
            target.len() - 1
        } else {
            target.len()
        };
        if to_index > len_after_removal {
            return Err(StoreError::IndexOutOfBounds {
                container: Some(to_container.to_string()),
                index: to_index,
                len: len_after_removal,
            });
        }

        if let Some(origin) = self.containers.get_mut(&from_container) {
            origin.items.remove(from_index);
        }
        if let Some(target) = self.containers.get_mut(to_container) {
            target.items.insert(to_index, item_id.to_string());
        }
        self.index
            .insert(item_id.to_string(), to_container.to_string());
        Ok(to_index)
    }

    /// Moves the item at `from_index` to `to_index` within one container.
    pub fn reorder_container(
        &mut self,
        container_id: &str,
        from_index: usize,
        to_index: usize,
    ) -> StoreResult<()> {
        let container = self
            .containers
            .get_mut(container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(container_id.to_string()))?;
        array_move(
            &mut container.items,
            from_index,
            to_index,
            Some(container_id),
        )
    }

    /// Moves the container at `from_index` to `to_index` in display order.
    pub fn reorder_containers(&mut self, from_index: usize, to_index: usize) -> StoreResult<()> {
        array_move(&mut self.order, from_index, to_index, None)
    }

    /// Appends an empty, unlocked container.
    pub fn create_container(&mut self, id: &str) -> StoreResult<()> {
        validate_new_container_id(id)?;
        if self.containers.contains_key(id) {
            return Err(StoreError::DuplicateContainer(id.to_string()));
        }
        self.order.push(id.to_string());
        self.containers.insert(id.to_string(), Container::new(id));
        Ok(())
    }

    /// Removes an empty container.
    pub fn delete_container(&mut self, id: &str) -> StoreResult<()> {
        let container = self
            .containers
            .get(id)
            .ok_or_else(|| StoreError::ContainerNotFound(id.to_string()))?;
        if !container.is_empty() {
            return Err(StoreError::ContainerNotEmpty(id.to_string()));
        }
        self.containers.remove(id);
        self.order.retain(|existing| existing != id);
        Ok(())
    }

    /// Removes a container regardless of membership and returns the members it
    /// held; those items become unassigned.
    pub fn dissolve_container(&mut self, id: &str) -> StoreResult<Vec<ItemId>> {
        let container = self
            .containers
            .remove(id)
            .ok_or_else(|| StoreError::ContainerNotFound(id.to_string()))?;
        self.order.retain(|existing| existing != id);
        for member in &container.items {
            self.index.remove(member);
        }
        Ok(container.items)
    }

    /// Unassigns one item. Returns the container and index it was removed from.
    pub fn remove_item(&mut self, item_id: &str) -> StoreResult<(ContainerId, usize)> {
        let (container_id, position) = self
            .locate(item_id)
            .map(|(container, index)| (container.to_string(), index))
            .ok_or_else(|| StoreError::ItemNotFound(item_id.to_string()))?;
        if let Some(container) = self.containers.get_mut(&container_id) {
            container.items.remove(position);
        }
        self.index.remove(item_id);
        Ok((container_id, position))
    }

    /// Inserts an unassigned item into a container.
    pub fn insert_item(
        &mut self,
        item_id: &str,
        container_id: &str,
        index: usize,
    ) -> StoreResult<()> {
        if self.index.contains_key(item_id) {
            return Err(StoreError::DuplicateItem(item_id.to_string()));
        }
        let container = self
            .containers
            .get_mut(container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(container_id.to_string()))?;
        if index > container.items.len() {
            return Err(StoreError::IndexOutOfBounds {
                container: Some(container_id.to_string()),
                index,
                len: container.items.len(),
            });
        }
        container.items.insert(index, item_id.to_string());
        self.index
            .insert(item_id.to_string(), container_id.to_string());
        Ok(())
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> StoreResult<()> {
        let container = self
            .containers
            .get_mut(id)
            .ok_or_else(|| StoreError::ContainerNotFound(id.to_string()))?;
        container.is_locked = locked;
        Ok(())
    }

    pub fn set_all_locked(&mut self, locked: bool) {
        for container in self.containers.values_mut() {
            container.is_locked = locked;
        }
    }

    /// Full mapping in display order, shaped for the persistence layer.
    pub fn assignments(&self) -> Vec<ContainerAssignment> {
        self.containers()
            .map(|container| ContainerAssignment {
                container_id: container.id.clone(),
                member_ids: container.items.clone(),
            })
            .collect()
    }

    /// Checks that forward map, reverse index and order agree.
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.containers.len() {
            return false;
        }
        let unique_order: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        if unique_order.len() != self.order.len()
            || !self.order.iter().all(|id| self.containers.contains_key(id))
        {
            return false;
        }

        let mut seen = HashSet::new();
        for container in self.containers.values() {
            for item in &container.items {
                if !seen.insert(item.as_str()) {
                    return false;
                }
                if self.index.get(item) != Some(&container.id) {
                    return false;
                }
            }
        }
        seen.len() == self.index.len()
    }
}

fn validate_new_container_id(id: &str) -> StoreResult<()> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidContainerId(id.to_string()));
    }
    if is_reserved_id(id) {
        return Err(StoreError::ReservedContainerId(id.to_string()));
    }
    Ok(())
}

fn array_move<T>(
    values: &mut Vec<T>,
    from_index: usize,
    to_index: usize,
    container: Option<&str>,
) -> StoreResult<()> {
    let len = values.len();
    for index in [from_index, to_index] {
        if index >= len {
            return Err(StoreError::IndexOutOfBounds {
                container: container.map(str::to_string),
                index,
                len,
            });
        }
    }
    if from_index != to_index {
        let value = values.remove(from_index);
        values.insert(to_index, value);
    }
    Ok(())
}
