//! Container lifecycle use-case service.
//!
//! # Responsibility
//! - Create, delete and name containers.
//! - Enforce lock flags for every membership change.
//!
//! # Invariants
//! - New container ids are derived deterministically from `container_order`.
//! - A locked container accepts no incoming item and releases no member.
//! - Deleting a non-empty container is governed by `ContainerDeleteMode`.

use crate::config::BoardConfig;
use crate::model::container::{is_reserved_id, ContainerId};
use crate::model::item::ItemId;
use crate::service::transfer_service::{TransferError, TransferResult};
use crate::store::container_store::ContainerStore;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TRAILING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>.*?)(?P<number>\d+)$").expect("valid trailing number regex")
});

/// Container delete mode for non-empty containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerDeleteMode {
    /// Refuse with `ContainerNotEmpty` while members remain.
    #[default]
    Reject,
    /// Delete anyway; members become unassigned.
    Unassign,
}

/// Creation/removal/lock enforcement for containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLifecycleManager {
    delete_mode: ContainerDeleteMode,
    first_container_id: ContainerId,
}

impl Default for ContainerLifecycleManager {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

impl ContainerLifecycleManager {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            delete_mode: config.delete_mode,
            first_container_id: config.first_container_id.trim().to_string(),
        }
    }

    pub fn delete_mode(&self) -> ContainerDeleteMode {
        self.delete_mode
    }

    /// Appends an empty container named `id`.
    pub fn create_container(&self, store: &mut ContainerStore, id: &str) -> TransferResult<()> {
        store.create_container(id)?;
        info!(
            "event=container_created module=lifecycle status=ok container={} containers={}",
            id,
            store.len()
        );
        Ok(())
    }

    /// Appends an empty container with the next derived id.
    pub fn create_next_container(&self, store: &mut ContainerStore) -> TransferResult<ContainerId> {
        let id = self.next_container_id(store);
        self.create_container(store, &id)?;
        Ok(id)
    }

    /// Derives the id for the next container.
    ///
    /// The last id in display order is incremented: a trailing number keeps its
    /// zero-padded width (`Tent 09` -> `Tent 10`), otherwise the leading
    /// character advances (`A` -> `B`). Ids already taken are skipped.
    pub fn next_container_id(&self, store: &ContainerStore) -> ContainerId {
        let mut candidate = match store.container_order().last() {
            Some(last) => increment_id(last),
            None => self.first_container_id.clone(),
        };
        while store.contains_container(&candidate) || is_reserved_id(&candidate) {
            candidate = increment_id(&candidate);
        }
        candidate
    }

    /// Deletes one container according to the configured delete mode.
    ///
    /// Returns the members released into the unassigned pool (always empty in
    /// `Reject` mode).
    pub fn delete_container(
        &self,
        store: &mut ContainerStore,
        id: &str,
    ) -> TransferResult<Vec<ItemId>> {
        self.ensure_unlocked(store, id)?;
        let released = match self.delete_mode {
            ContainerDeleteMode::Reject => {
                store.delete_container(id)?;
                Vec::new()
            }
            ContainerDeleteMode::Unassign => store.dissolve_container(id)?,
        };
        info!(
            "event=container_deleted module=lifecycle status=ok container={} released={}",
            id,
            released.len()
        );
        Ok(released)
    }

    /// Fails with `InvalidTransfer` when `id` is locked.
    pub fn ensure_unlocked(&self, store: &ContainerStore, id: &str) -> TransferResult<()> {
        if store.is_locked(id) {
            warn!(
                "event=transfer_rejected module=lifecycle status=rejected reason=locked container={}",
                id
            );
            return Err(TransferError::InvalidTransfer {
                container: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_locked(
        &self,
        store: &mut ContainerStore,
        id: &str,
        locked: bool,
    ) -> TransferResult<()> {
        store.set_locked(id, locked)?;
        info!(
            "event=container_lock_changed module=lifecycle status=ok container={} locked={}",
            id, locked
        );
        Ok(())
    }

    pub fn set_all_locked(&self, store: &mut ContainerStore, locked: bool) {
        store.set_all_locked(locked);
        info!(
            "event=container_lock_changed module=lifecycle status=ok container=* locked={} containers={}",
            locked,
            store.len()
        );
    }
}

fn increment_id(id: &str) -> ContainerId {
    if let Some(captures) = TRAILING_NUMBER_RE.captures(id) {
        let prefix = &captures["prefix"];
        let digits = &captures["number"];
        if let Ok(number) = digits.parse::<u64>() {
            if let Some(next) = number.checked_add(1) {
                return format!("{prefix}{next:0width$}", width = digits.len());
            }
        }
    }

    let mut chars = id.chars();
    let next_leading = chars.next().and_then(|leading| {
        (leading as u32 + 1..=char::MAX as u32).find_map(char::from_u32)
    });
    match next_leading {
        Some(leading) => std::iter::once(leading).chain(chars).collect(),
        None => format!("{id}-1"),
    }
}
