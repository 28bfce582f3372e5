//! Keyboard coordinate translator.
//!
//! Turns arrow-key focus movement into a synthetic hover intent so keyboard
//! drags flow through the same transfer engine as pointer drags.
//!
//! # Invariants
//! - No geometry is consulted; targets derive from store order alone.
//! - Item drags never step into a locked neighbor container.
//! - Moving right past the last container lands on the placeholder sentinel.

use crate::drag::session::HoverIntent;
use crate::model::container::{DragId, DropTarget};
use crate::store::container_store::ContainerStore;

/// Arrow keys understood by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

/// Computes the next hover intent for `key`.
///
/// `current` is the last hover target; `None` starts from the active subject.
/// Returns `None` when focus cannot move in that direction.
pub fn next_intent(
    store: &ContainerStore,
    active: &DragId,
    current: Option<&DropTarget>,
    key: ArrowKey,
) -> Option<HoverIntent> {
    match active {
        DragId::Container(container_id) => {
            let cursor = match current {
                Some(DropTarget::Container(id)) if store.contains_container(id) => id.as_str(),
                _ => container_id.as_str(),
            };
            next_container_intent(store, cursor, key)
        }
        DragId::Item(item_id) => next_item_intent(store, item_id, current, key),
    }
}

fn next_container_intent(store: &ContainerStore, cursor: &str, key: ArrowKey) -> Option<HoverIntent> {
    let order = store.container_order();
    let position = store.container_position(cursor)?;
    let next = match key {
        ArrowKey::Left | ArrowKey::Up => position.checked_sub(1)?,
        ArrowKey::Right | ArrowKey::Down => position + 1,
    };
    order
        .get(next)
        .map(|id| HoverIntent::before(DropTarget::Container(id.clone())))
}

fn next_item_intent(
    store: &ContainerStore,
    item_id: &str,
    current: Option<&DropTarget>,
    key: ArrowKey,
) -> Option<HoverIntent> {
    // Cursor as (container position in order, slot index within container).
    let cursor = match current {
        Some(DropTarget::Placeholder) => None,
        Some(DropTarget::Item(id)) if store.is_assigned(id) => locate_slot(store, id),
        Some(DropTarget::Container(id)) if store.contains_container(id) => store
            .container_position(id)
            .map(|position| (position, store.items_of(id).len())),
        _ => locate_slot(store, item_id),
    };

    let Some((position, slot)) = cursor else {
        // On the placeholder: only stepping back is possible.
        return match key {
            ArrowKey::Left => last_unlocked_before(store, store.len())
                .map(|position| slot_intent(store, position, 0)),
            _ => None,
        };
    };
    let container_id = store.container_order().get(position)?;
    let items = store.items_of(container_id);

    match key {
        ArrowKey::Up => {
            let previous = slot.min(items.len()).checked_sub(1)?;
            Some(HoverIntent::before(DropTarget::Item(items[previous].clone())))
        }
        ArrowKey::Down => {
            let next = slot + 1;
            items
                .get(next)
                .map(|id| HoverIntent::after(DropTarget::Item(id.clone())))
        }
        ArrowKey::Right => {
            let next = (position + 1..store.len())
                .find(|candidate| !is_locked_at(store, *candidate));
            match next {
                Some(next) => Some(slot_intent(store, next, slot)),
                None => Some(HoverIntent::before(DropTarget::Placeholder)),
            }
        }
        ArrowKey::Left => {
            last_unlocked_before(store, position).map(|previous| slot_intent(store, previous, slot))
        }
    }
}

fn locate_slot(store: &ContainerStore, item_id: &str) -> Option<(usize, usize)> {
    let (container_id, index) = store.locate(item_id)?;
    Some((store.container_position(container_id)?, index))
}

fn is_locked_at(store: &ContainerStore, position: usize) -> bool {
    store
        .container_order()
        .get(position)
        .map(|id| store.is_locked(id))
        .unwrap_or(true)
}

fn last_unlocked_before(store: &ContainerStore, position: usize) -> Option<usize> {
    (0..position)
        .rev()
        .find(|candidate| !is_locked_at(store, *candidate))
}

/// Targets `slot` in the container at `position`: the item currently there,
/// or the container itself (append) when the slot is past its end.
fn slot_intent(store: &ContainerStore, position: usize, slot: usize) -> HoverIntent {
    let container_id = &store.container_order()[position];
    match store.items_of(container_id).get(slot) {
        Some(item_id) => HoverIntent::before(DropTarget::Item(item_id.clone())),
        None => HoverIntent::before(DropTarget::Container(container_id.clone())),
    }
}
