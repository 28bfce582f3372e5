//! Geometry-to-target resolution for drag gestures.
//!
//! # Responsibility
//! - Keep the droppable regions measured by the presentation layer.
//! - Map the current drag geometry to one logical `DropTarget`.
//!
//! # Invariants
//! - Ties between equal matches resolve to the earlier-registered region.
//! - Container drags only ever resolve to stored containers.
//! - `DropTarget::Trash` is returned verbatim, never refined.
//! - The last resolved target and the recently-moved flag live on the
//!   resolver and are reset at drag start and drag end.

use crate::geometry::{Point, Rect};
use crate::model::container::{DragId, DropTarget};
use crate::store::container_store::ContainerStore;
use log::trace;

/// One droppable rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub target: DropTarget,
    pub rect: Rect,
}

/// Droppable regions in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region, or updates its rect in place when already known.
    pub fn register(&mut self, target: DropTarget, rect: Rect) {
        match self.regions.iter_mut().find(|region| region.target == target) {
            Some(region) => region.rect = rect,
            None => self.regions.push(Region { target, rect }),
        }
    }

    pub fn unregister(&mut self, target: &DropTarget) -> Option<Rect> {
        let position = self
            .regions
            .iter()
            .position(|region| &region.target == target)?;
        Some(self.regions.remove(position).rect)
    }

    pub fn rect_of(&self, target: &DropTarget) -> Option<Rect> {
        self.regions
            .iter()
            .find(|region| &region.target == target)
            .map(|region| region.rect)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

/// Geometry sampled for one resolution cycle.
///
/// Pointer input carries both fields; keyboard-driven drags carry neither and
/// bypass the resolver entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragGeometry {
    /// Pointer position, absent for rect-only sources.
    pub pointer: Option<Point>,
    /// Projected bounding box of the dragged element.
    pub active_rect: Option<Rect>,
}

impl DragGeometry {
    pub fn new(pointer: Point, active_rect: Rect) -> Self {
        Self {
            pointer: Some(pointer),
            active_rect: Some(active_rect),
        }
    }

    pub fn rect_only(active_rect: Rect) -> Self {
        Self {
            pointer: None,
            active_rect: Some(active_rect),
        }
    }

    /// Reference point for nearest-center matching.
    fn anchor(&self) -> Option<Point> {
        self.active_rect
            .map(|rect| rect.center())
            .or(self.pointer)
    }
}

/// Stateful collision resolver for one board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResolver {
    last_resolved: Option<DropTarget>,
    recently_moved: bool,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the cache and the recently-moved flag.
    pub fn reset(&mut self) {
        self.last_resolved = None;
        self.recently_moved = false;
    }

    /// Flags that a cross-container move just happened; consumed by the next
    /// call to [`CollisionResolver::resolve`].
    pub fn mark_recently_moved(&mut self) {
        self.recently_moved = true;
    }

    pub fn recently_moved(&self) -> bool {
        self.recently_moved
    }

    pub fn last_resolved(&self) -> Option<&DropTarget> {
        self.last_resolved.as_ref()
    }

    /// Resolves the drop target for `active` under `geometry`.
    pub fn resolve(
        &mut self,
        active: &DragId,
        geometry: &DragGeometry,
        regions: &RegionSet,
        store: &ContainerStore,
    ) -> Option<DropTarget> {
        let matched = match active {
            DragId::Container(_) => closest_center(
                geometry,
                regions.iter().filter(|region| {
                    matches!(&region.target, DropTarget::Container(id) if store.contains_container(id))
                }),
            ),
            DragId::Item(_) => resolve_item_level(geometry, regions, store),
        };

        let resolved = match matched {
            Some(target) => {
                self.last_resolved = Some(target.clone());
                Some(target)
            }
            None => {
                if self.recently_moved {
                    self.last_resolved = Some(active.clone().into());
                }
                self.last_resolved.clone()
            }
        };
        self.recently_moved = false;

        trace!(
            "event=collision_resolved module=collision active={} target={}",
            active,
            resolved
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string())
        );
        resolved
    }
}

fn resolve_item_level(
    geometry: &DragGeometry,
    regions: &RegionSet,
    store: &ContainerStore,
) -> Option<DropTarget> {
    let live: Vec<&Region> = regions
        .iter()
        .filter(|region| is_live_target(&region.target, store))
        .collect();
    let winner = pointer_within(geometry, live.iter().copied())
        .or_else(|| rect_intersection(geometry, live.iter().copied()))?;

    match winner {
        DropTarget::Container(container_id) if !store.items_of(&container_id).is_empty() => {
            let members: Vec<&Region> = regions
                .iter()
                .filter(|region| {
                    matches!(&region.target, DropTarget::Item(id) if store.container_of(id) == Some(container_id.as_str()))
                })
                .collect();
            let refined = pointer_within(geometry, members.iter().copied())
                .or_else(|| rect_intersection(geometry, members.iter().copied()))
                .or_else(|| closest_center(geometry, members.iter().copied()));
            Some(refined.unwrap_or(DropTarget::Container(container_id)))
        }
        other => Some(other),
    }
}

/// Drops regions left behind by stale layout (unassigned items, removed
/// containers).
fn is_live_target(target: &DropTarget, store: &ContainerStore) -> bool {
    match target {
        DropTarget::Item(id) => store.is_assigned(id),
        DropTarget::Container(id) => store.contains_container(id),
        DropTarget::Placeholder | DropTarget::Trash => true,
    }
}

/// First region, in registration order, containing the pointer.
fn pointer_within<'a>(
    geometry: &DragGeometry,
    mut candidates: impl Iterator<Item = &'a Region>,
) -> Option<DropTarget> {
    let pointer = geometry.pointer?;
    candidates
        .find(|region| region.rect.contains(pointer))
        .map(|region| region.target.clone())
}

/// Region with the largest overlap with the dragged rect.
fn rect_intersection<'a>(
    geometry: &DragGeometry,
    candidates: impl Iterator<Item = &'a Region>,
) -> Option<DropTarget> {
    let active_rect = geometry.active_rect?;
    let mut best: Option<(&Region, f64)> = None;
    for region in candidates {
        let overlap = active_rect.overlap_area(&region.rect);
        if overlap <= 0.0 {
            continue;
        }
        // Strict comparison keeps the earlier-registered region on ties.
        if best.map_or(true, |(_, best_overlap)| overlap > best_overlap) {
            best = Some((region, overlap));
        }
    }
    best.map(|(region, _)| region.target.clone())
}

/// Region whose center is nearest to the drag anchor.
fn closest_center<'a>(
    geometry: &DragGeometry,
    candidates: impl Iterator<Item = &'a Region>,
) -> Option<DropTarget> {
    let anchor = geometry.anchor()?;
    let mut best: Option<(&Region, f64)> = None;
    for region in candidates {
        let distance = anchor.distance_to(region.rect.center());
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((region, distance));
        }
    }
    best.map(|(region, _)| region.target.clone())
}
