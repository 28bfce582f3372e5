//! Drag/drop transfer use-case service.
//!
//! # Responsibility
//! - Apply provisional moves while an item hovers over another container.
//! - Finalize drops: container reorder, trash, placeholder, local reorder.
//! - Roll a cancelled gesture back to its snapshot.
//!
//! # Invariants
//! - Preconditions (session, subject, locks, indices) are checked before the
//!   first store write; an error means the store and the session are
//!   unchanged.
//! - Replaying the same hover intent is a no-op after the first application.
//! - Multi-step drops are applied to a scratch copy and swapped in whole.

use crate::collision::CollisionResolver;
use crate::drag::session::{DragMachine, DragSession, DragSessionError, HoverIntent, Placement};
use crate::model::container::{ContainerId, DragId, DropTarget};
use crate::service::lifecycle_service::ContainerLifecycleManager;
use crate::store::container_store::{ContainerStore, StoreError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by transfer and lifecycle operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Errors from transfer and lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Source or destination container is locked.
    InvalidTransfer { container: ContainerId },
    /// Container delete refused while members remain.
    ContainerNotEmpty(ContainerId),
    /// A drag started while another one is unresolved.
    DragSessionConflict { active: DragId },
    /// Hover/drop/cancel requested with no drag in progress.
    NoActiveDrag,
    /// Drag subject is not an assigned item or a stored container.
    UnknownDragSubject(DragId),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransfer { container } => {
                write!(f, "container is locked: {container}")
            }
            Self::ContainerNotEmpty(id) => write!(f, "container is not empty: {id}"),
            Self::DragSessionConflict { active } => {
                write!(f, "drag already in progress for {active}")
            }
            Self::NoActiveDrag => write!(f, "no drag in progress"),
            Self::UnknownDragSubject(id) => write!(f, "unknown drag subject: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for TransferError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ContainerNotEmpty(id) => Self::ContainerNotEmpty(id),
            other => Self::Store(other),
        }
    }
}

impl From<DragSessionError> for TransferError {
    fn from(value: DragSessionError) -> Self {
        match value {
            DragSessionError::Conflict { active } => Self::DragSessionConflict { active },
            DragSessionError::NoActiveDrag => Self::NoActiveDrag,
        }
    }
}

/// Result of one hover step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverOutcome {
    /// Nothing to move (same container, sentinel, container drag, no target).
    Unchanged,
    /// The active item was moved into another container.
    Moved { container: ContainerId, index: usize },
}

/// Result of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Unchanged,
    ContainersReordered { from: usize, to: usize },
    Reordered {
        container: ContainerId,
        from: usize,
        to: usize,
    },
    /// Item landed in another container at drop time (no prior hover move).
    Transferred { container: ContainerId, index: usize },
    Trashed { container: ContainerId },
    ContainerCreated { container: ContainerId },
}

/// Executes provisional and final moves for drag gestures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferEngine {
    lifecycle: ContainerLifecycleManager,
}

impl TransferEngine {
    pub fn new(lifecycle: ContainerLifecycleManager) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &ContainerLifecycleManager {
        &self.lifecycle
    }

    /// Starts a gesture for `active`: validates the subject, snapshots the
    /// store and resets the resolver cache.
    pub fn begin(
        &self,
        machine: &mut DragMachine,
        resolver: &mut CollisionResolver,
        store: &ContainerStore,
        active: DragId,
    ) -> TransferResult<Uuid> {
        let known = match &active {
            DragId::Item(id) => store.is_assigned(id),
            DragId::Container(id) => store.contains_container(id),
        };
        if !known {
            return Err(TransferError::UnknownDragSubject(active));
        }

        let session = machine.start(active, store)?;
        resolver.reset();
        debug!(
            "event=drag_start module=transfer status=ok session={} active={} origin={}",
            session.id(),
            session.active(),
            session.origin().unwrap_or("-")
        );
        Ok(session.id())
    }

    /// Applies one hover step.
    ///
    /// A move happens only when an item hovers over a different container:
    /// a container target appends, an item target inserts before it, or after
    /// it for `Placement::After`. A rejected move keeps the previous hover
    /// target on the session.
    pub fn hover(
        &self,
        store: &mut ContainerStore,
        session: &mut DragSession,
        resolver: &mut CollisionResolver,
        intent: Option<HoverIntent>,
    ) -> TransferResult<HoverOutcome> {
        let Some(intent) = intent else {
            session.set_over(None);
            return Ok(HoverOutcome::Unchanged);
        };
        let DragId::Item(item_id) = session.active().clone() else {
            session.set_over(Some(intent));
            return Ok(HoverOutcome::Unchanged);
        };

        let Some(from_container) = store.container_of(&item_id).map(str::to_string) else {
            return Err(TransferError::UnknownDragSubject(DragId::Item(item_id)));
        };
        let to_container = match target_container(store, &intent.target) {
            Some(to_container) if to_container != from_container => to_container,
            _ => {
                session.set_over(Some(intent));
                return Ok(HoverOutcome::Unchanged);
            }
        };

        let index = self.transfer(store, &item_id, &from_container, &to_container, &intent)?;
        resolver.mark_recently_moved();
        session.set_over(Some(intent.clone()));
        session.record_provisional_move(intent);
        debug!(
            "event=provisional_move module=transfer status=ok session={} item={} from={} to={} index={}",
            session.id(),
            item_id,
            from_container,
            to_container,
            index
        );
        Ok(HoverOutcome::Moved {
            container: to_container,
            index,
        })
    }

    /// Finalizes a drop onto `intent`. The session stays owned by the caller,
    /// which ends it after a successful drop.
    pub fn finalize(
        &self,
        store: &mut ContainerStore,
        session: &DragSession,
        intent: Option<&HoverIntent>,
    ) -> TransferResult<DropOutcome> {
        let Some(intent) = intent else {
            return Ok(DropOutcome::Unchanged);
        };

        let outcome = match session.active() {
            DragId::Container(container_id) => {
                self.finalize_container_drag(store, container_id, &intent.target)?
            }
            DragId::Item(item_id) => {
                self.finalize_item_drag(store, item_id, intent, session.landed_by())?
            }
        };
        info!(
            "event=drop_finalized module=transfer status=ok session={} active={} target={} outcome={:?}",
            session.id(),
            session.active(),
            intent.target,
            outcome
        );
        Ok(outcome)
    }

    /// Restores the store to the session snapshot.
    pub fn rollback(&self, store: &mut ContainerStore, session: DragSession) {
        let session_id = session.id();
        let moves = session.provisional_moves();
        *store = session.into_snapshot();
        debug!(
            "event=drag_cancel module=transfer status=ok session={} reverted_moves={}",
            session_id, moves
        );
    }

    fn finalize_container_drag(
        &self,
        store: &mut ContainerStore,
        container_id: &str,
        target: &DropTarget,
    ) -> TransferResult<DropOutcome> {
        let DropTarget::Container(over_id) = target else {
            return Ok(DropOutcome::Unchanged);
        };
        let from = store
            .container_position(container_id)
            .ok_or_else(|| StoreError::ContainerNotFound(container_id.to_string()))?;
        let to = store
            .container_position(over_id)
            .ok_or_else(|| StoreError::ContainerNotFound(over_id.to_string()))?;
        if from == to {
            return Ok(DropOutcome::Unchanged);
        }
        store.reorder_containers(from, to)?;
        Ok(DropOutcome::ContainersReordered { from, to })
    }

    fn finalize_item_drag(
        &self,
        store: &mut ContainerStore,
        item_id: &str,
        intent: &HoverIntent,
        landed_by: Option<&HoverIntent>,
    ) -> TransferResult<DropOutcome> {
        let (active_container, active_index) = store
            .locate(item_id)
            .map(|(container, index)| (container.to_string(), index))
            .ok_or_else(|| TransferError::UnknownDragSubject(DragId::Item(item_id.to_string())))?;

        match &intent.target {
            DropTarget::Trash => {
                self.lifecycle.ensure_unlocked(store, &active_container)?;
                store.remove_item(item_id)?;
                Ok(DropOutcome::Trashed {
                    container: active_container,
                })
            }
            DropTarget::Placeholder => {
                self.lifecycle.ensure_unlocked(store, &active_container)?;
                let new_id = self.lifecycle.next_container_id(store);
                let mut scratch = store.clone();
                scratch.create_container(&new_id)?;
                scratch.move_item(item_id, &new_id, 0)?;
                *store = scratch;
                info!(
                    "event=container_created module=transfer status=ok container={} containers={}",
                    new_id,
                    store.len()
                );
                Ok(DropOutcome::ContainerCreated { container: new_id })
            }
            target => {
                let Some(over_container) = target_container(store, target) else {
                    return Ok(DropOutcome::Unchanged);
                };
                if over_container != active_container {
                    let index =
                        self.transfer(store, item_id, &active_container, &over_container, intent)?;
                    return Ok(DropOutcome::Transferred {
                        container: over_container,
                        index,
                    });
                }

                // The hover that migrated the item already chose its index.
                if landed_by == Some(intent) {
                    return Ok(DropOutcome::Unchanged);
                }

                let last = store.items_of(&over_container).len() - 1;
                let over_index = match target {
                    DropTarget::Item(over_id) => store
                        .locate(over_id)
                        .map(|(_, index)| index)
                        .unwrap_or(active_index),
                    _ => last,
                };
                if over_index == active_index {
                    return Ok(DropOutcome::Unchanged);
                }
                self.lifecycle.ensure_unlocked(store, &over_container)?;
                store.reorder_container(&over_container, active_index, over_index)?;
                Ok(DropOutcome::Reordered {
                    container: over_container,
                    from: active_index,
                    to: over_index,
                })
            }
        }
    }

    /// Cross-container move shared by hover and drop.
    fn transfer(
        &self,
        store: &mut ContainerStore,
        item_id: &str,
        from_container: &str,
        to_container: &str,
        intent: &HoverIntent,
    ) -> TransferResult<usize> {
        self.lifecycle.ensure_unlocked(store, from_container)?;
        self.lifecycle.ensure_unlocked(store, to_container)?;
        let index = insertion_index(store, to_container, intent);
        Ok(store.move_item(item_id, to_container, index)?)
    }
}

/// Container addressed by a hover target, if it is a stored container or an
/// assigned item.
fn target_container(store: &ContainerStore, target: &DropTarget) -> Option<ContainerId> {
    match target {
        DropTarget::Container(id) if store.contains_container(id) => Some(id.clone()),
        DropTarget::Item(id) => store.container_of(id).map(str::to_string),
        _ => None,
    }
}

/// Insertion index in `to_container` for an item arriving from elsewhere.
fn insertion_index(store: &ContainerStore, to_container: &str, intent: &HoverIntent) -> usize {
    let len = store.items_of(to_container).len();
    match &intent.target {
        DropTarget::Item(over_id) => match store.locate(over_id) {
            Some((_, index)) if intent.placement == Placement::After => index + 1,
            Some((_, index)) => index,
            None => len,
        },
        _ => len,
    }
}

#[cfg(test)]
mod tests {
    use super::{insertion_index, TransferEngine, TransferError};
    use crate::collision::CollisionResolver;
    use crate::drag::session::{DragMachine, HoverIntent};
    use crate::model::container::{ContainerListing, DragId, DropTarget};
    use crate::store::container_store::{ContainerStore, StoreError};

    #[test]
    fn insertion_index_respects_placement() {
        let store = ContainerStore::from_listing(vec![ContainerListing {
            container_id: "B".to_string(),
            member_ids: vec!["3".to_string(), "4".to_string()],
            is_locked: false,
        }])
        .expect("listing should load");
        let over = DropTarget::Item("3".to_string());

        assert_eq!(
            insertion_index(&store, "B", &HoverIntent::before(over.clone())),
            0
        );
        assert_eq!(insertion_index(&store, "B", &HoverIntent::after(over)), 1);
        assert_eq!(
            insertion_index(
                &store,
                "B",
                &HoverIntent::before(DropTarget::Container("B".to_string()))
            ),
            2
        );
    }

    #[test]
    fn store_not_empty_error_lifts_to_service_kind() {
        let err = TransferError::from(StoreError::ContainerNotEmpty("A".to_string()));
        assert_eq!(err, TransferError::ContainerNotEmpty("A".to_string()));

        let err = TransferError::from(StoreError::ContainerNotFound("Z".to_string()));
        assert!(matches!(err, TransferError::Store(_)));
    }

    #[test]
    fn rejected_hover_keeps_previous_target() {
        let mut store = ContainerStore::from_listing(vec![
            ContainerListing {
                container_id: "A".to_string(),
                member_ids: vec!["1".to_string(), "2".to_string()],
                is_locked: false,
            },
            ContainerListing {
                container_id: "B".to_string(),
                member_ids: vec!["3".to_string()],
                is_locked: true,
            },
        ])
        .expect("listing should load");
        let before = store.clone();
        let engine = TransferEngine::default();
        let mut machine = DragMachine::new();
        let mut resolver = CollisionResolver::new();
        engine
            .begin(&mut machine, &mut resolver, &store, DragId::Item("1".to_string()))
            .expect("drag should start");
        let session = machine.session_mut().expect("drag is active");

        engine
            .hover(
                &mut store,
                session,
                &mut resolver,
                Some(HoverIntent::before(DropTarget::Item("2".to_string()))),
            )
            .expect("same-container hover");
        let err = engine
            .hover(
                &mut store,
                session,
                &mut resolver,
                Some(HoverIntent::after(DropTarget::Item("3".to_string()))),
            )
            .expect_err("locked target must be rejected");

        assert_eq!(
            err,
            TransferError::InvalidTransfer {
                container: "B".to_string()
            }
        );
        assert_eq!(session.over(), Some(&DropTarget::Item("2".to_string())));
        assert_eq!(session.provisional_moves(), 0);
        assert!(!resolver.recently_moved());
        assert_eq!(store, before);
    }
}
