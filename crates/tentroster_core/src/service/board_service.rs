//! Roster board facade.
//!
//! # Responsibility
//! - Wire store, resolver, drag machine and transfer engine into the
//!   pointer/keyboard drag flow used by the presentation layer.
//! - Emit hover and commit notifications to registered observers.
//!
//! # Invariants
//! - The store is only mutated through the transfer engine and the lifecycle
//!   manager.
//! - Lifecycle and lock mutations are rejected while a drag is unresolved, so
//!   a rollback never discards them.
//! - A rejected hover leaves the store, the session and the resolver cache as
//!   they were.
//! - A failed drop is treated as a cancellation: the snapshot is restored and
//!   the error is returned.

use crate::collision::{CollisionResolver, DragGeometry, RegionSet};
use crate::config::BoardConfig;
use crate::drag::session::{DragMachine, DragSession, HoverIntent, Placement};
use crate::keyboard::{self, ArrowKey};
use crate::model::container::{ContainerId, ContainerListing, DragId, DropTarget, RosterCommit};
use crate::model::item::{Item, ItemId, ItemRegistry};
use crate::service::lifecycle_service::ContainerLifecycleManager;
use crate::service::transfer_service::{
    DropOutcome, HoverOutcome, TransferEngine, TransferError, TransferResult,
};
use crate::store::container_store::ContainerStore;
use log::{debug, info, warn};
use uuid::Uuid;

/// Geometry source owned by the presentation layer.
pub trait DragSurface {
    /// Current pointer position and dragged-element bounds.
    fn geometry(&self) -> DragGeometry;
    /// Currently measured droppable regions.
    fn regions(&self) -> &RegionSet;
}

/// Notification sink for drag progress and commits.
pub trait BoardObserver {
    /// Called when the resolved hover target changes.
    fn on_hover_change(&mut self, _session_id: Uuid, _over: Option<&DropTarget>) {}
    /// Called after every successful drop with the full updated mapping.
    fn on_drop(&mut self, _commit: &RosterCommit) {}
}

/// Drag/drop roster board for one event.
pub struct RosterBoard {
    store: ContainerStore,
    registry: ItemRegistry,
    resolver: CollisionResolver,
    machine: DragMachine,
    engine: TransferEngine,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl RosterBoard {
    pub fn new(store: ContainerStore, registry: ItemRegistry, config: &BoardConfig) -> Self {
        Self {
            store,
            registry,
            resolver: CollisionResolver::new(),
            machine: DragMachine::new(),
            engine: TransferEngine::new(ContainerLifecycleManager::new(config)),
            observers: Vec::new(),
        }
    }

    /// Builds a board from listing rows and item metadata.
    pub fn from_listing<L, I>(listing: L, items: I, config: &BoardConfig) -> TransferResult<Self>
    where
        L: IntoIterator<Item = ContainerListing>,
        I: IntoIterator<Item = Item>,
    {
        let store = ContainerStore::from_listing(listing)?;
        let registry: ItemRegistry = items.into_iter().collect();
        let unknown = store
            .containers()
            .flat_map(|container| container.items.iter())
            .filter(|id| !registry.contains(id))
            .count();
        if unknown > 0 {
            warn!(
                "event=roster_loaded module=board status=degraded reason=unregistered_members count={}",
                unknown
            );
        }
        info!(
            "event=roster_loaded module=board status=ok containers={} assigned={} registered={}",
            store.len(),
            store.item_count(),
            registry.len()
        );
        Ok(Self::new(store, registry, config))
    }

    pub fn store(&self) -> &ContainerStore {
        &self.store
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.machine.session()
    }

    pub fn is_dragging(&self) -> bool {
        self.machine.is_dragging()
    }

    pub fn add_observer(&mut self, observer: Box<dyn BoardObserver>) {
        self.observers.push(observer);
    }

    /// Registry items that sit in no container.
    pub fn unassigned_items(&self) -> Vec<&Item> {
        self.registry
            .iter()
            .filter(|item| !self.store.is_assigned(&item.id))
            .collect()
    }

    /// Current mapping shaped for the persistence layer.
    pub fn commit_payload(&self, session_id: Uuid) -> RosterCommit {
        RosterCommit {
            session_id,
            assignments: self.store.assignments(),
        }
    }

    /// `Idle -> Dragging` for an item or container.
    pub fn drag_start(&mut self, active: DragId) -> TransferResult<Uuid> {
        self.engine
            .begin(&mut self.machine, &mut self.resolver, &self.store, active)
    }

    /// Pointer hover: samples the surface, resolves the target and applies a
    /// provisional move when the item crossed into another container.
    pub fn drag_over(&mut self, surface: &impl DragSurface) -> TransferResult<HoverOutcome> {
        let geometry = surface.geometry();
        let regions = surface.regions();
        let session = self.machine.session_mut()?;
        let cached = self.resolver.clone();

        let target = self
            .resolver
            .resolve(session.active(), &geometry, regions, &self.store);
        let intent = target.map(|target| {
            let placement = match &target {
                DropTarget::Item(_) => {
                    Placement::from_rects(geometry.active_rect, regions.rect_of(&target))
                }
                _ => Placement::Before,
            };
            HoverIntent::new(target, placement)
        });

        let outcome = self.apply_hover(intent);
        if outcome.is_err() {
            // Never fall back to a target whose hover was rejected.
            self.resolver = cached;
        }
        outcome
    }

    /// Keyboard hover: moves the synthetic focus one step and applies it
    /// through the same transfer path as pointer input.
    pub fn drag_key(&mut self, key: ArrowKey) -> TransferResult<HoverOutcome> {
        let session = self.machine.session_mut()?;
        let Some(intent) = keyboard::next_intent(&self.store, session.active(), session.over(), key)
        else {
            return Ok(HoverOutcome::Unchanged);
        };
        let outcome = self.apply_hover(Some(intent))?;

        // After a cross-container move the active item is the new focus.
        if let HoverOutcome::Moved { .. } = outcome {
            let session = self.machine.session_mut()?;
            if let DragId::Item(item_id) = session.active().clone() {
                session.set_over(Some(HoverIntent::before(DropTarget::Item(item_id))));
            }
        }
        Ok(outcome)
    }

    /// Pointer drop: resolves the final target from the surface, then drops.
    pub fn drop_on(&mut self, surface: &impl DragSurface) -> TransferResult<RosterCommit> {
        if let Err(err) = self.drag_over(surface) {
            self.rollback_after_failure(&err);
            return Err(err);
        }
        self.drop()
    }

    /// `Dragging -> Idle` committing onto the last hover target.
    ///
    /// On failure the gesture is cancelled (snapshot restored) and the error
    /// is returned.
    pub fn drop(&mut self) -> TransferResult<RosterCommit> {
        let session = self.machine.session().ok_or(TransferError::NoActiveDrag)?;
        let intent = session.intent().cloned();

        match self
            .engine
            .finalize(&mut self.store, session, intent.as_ref())
        {
            Ok(outcome) => {
                let session = self.machine.end()?;
                self.resolver.reset();
                let commit = self.commit_payload(session.id());
                log_drop(&session, &outcome, &commit);
                for observer in &mut self.observers {
                    observer.on_drop(&commit);
                }
                Ok(commit)
            }
            Err(err) => {
                self.rollback_after_failure(&err);
                Err(err)
            }
        }
    }

    /// `Dragging -> Idle` restoring the pre-drag snapshot.
    pub fn cancel(&mut self) -> TransferResult<()> {
        let session = self.machine.end()?;
        self.engine.rollback(&mut self.store, session);
        self.resolver.reset();
        Ok(())
    }

    pub fn create_container(&mut self, id: &str) -> TransferResult<()> {
        self.ensure_idle()?;
        self.engine.lifecycle().create_container(&mut self.store, id)
    }

    pub fn create_next_container(&mut self) -> TransferResult<ContainerId> {
        self.ensure_idle()?;
        self.engine.lifecycle().create_next_container(&mut self.store)
    }

    /// Deletes a container per the configured delete mode; returns members
    /// released to the unassigned pool.
    pub fn delete_container(&mut self, id: &str) -> TransferResult<Vec<ItemId>> {
        self.ensure_idle()?;
        self.engine.lifecycle().delete_container(&mut self.store, id)
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> TransferResult<()> {
        self.ensure_idle()?;
        self.engine
            .lifecycle()
            .set_locked(&mut self.store, id, locked)
    }

    pub fn set_all_locked(&mut self, locked: bool) -> TransferResult<()> {
        self.ensure_idle()?;
        self.engine.lifecycle().set_all_locked(&mut self.store, locked);
        Ok(())
    }

    fn apply_hover(&mut self, intent: Option<HoverIntent>) -> TransferResult<HoverOutcome> {
        let session = self.machine.session_mut()?;
        let previous = session.over().cloned();
        let outcome = self
            .engine
            .hover(&mut self.store, session, &mut self.resolver, intent)?;

        if session.over() != previous.as_ref() {
            let session_id = session.id();
            let over = session.over().cloned();
            debug!(
                "event=drag_over module=board status=ok session={} over={}",
                session_id,
                over.as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "none".to_string())
            );
            for observer in &mut self.observers {
                observer.on_hover_change(session_id, over.as_ref());
            }
        }
        Ok(outcome)
    }

    fn rollback_after_failure(&mut self, err: &TransferError) {
        if let Ok(session) = self.machine.end() {
            warn!(
                "event=drag_cancel module=board status=rejected session={} reason={}",
                session.id(),
                err
            );
            self.engine.rollback(&mut self.store, session);
        }
        self.resolver.reset();
    }

    fn ensure_idle(&self) -> TransferResult<()> {
        match self.machine.session() {
            Some(session) => Err(TransferError::DragSessionConflict {
                active: session.active().clone(),
            }),
            None => Ok(()),
        }
    }
}

fn log_drop(session: &DragSession, outcome: &DropOutcome, commit: &RosterCommit) {
    info!(
        "event=drop_commit module=board status=ok session={} active={} provisional_moves={} outcome={:?} containers={}",
        session.id(),
        session.active(),
        session.provisional_moves(),
        outcome,
        commit.assignments.len()
    );
}
