//! Drag session state machine.
//!
//! `Idle --start--> Dragging --hover*--> Dragging --drop|cancel--> Idle`
//!
//! # Invariants
//! - The snapshot is a deep copy of the store taken at `start` and is never
//!   mutated afterwards.
//! - Starting a drag while another is unresolved is rejected without touching
//!   the active session.

use crate::geometry::Rect;
use crate::model::container::{ContainerId, DragId, DropTarget};
use crate::store::container_store::ContainerStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from drag state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSessionError {
    /// A drag was started while another one is unresolved.
    Conflict { active: DragId },
    /// Drop/cancel/hover was requested with no active drag.
    NoActiveDrag,
}

impl Display for DragSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { active } => {
                write!(f, "drag already in progress for {active}")
            }
            Self::NoActiveDrag => write!(f, "no drag in progress"),
        }
    }
}

impl Error for DragSessionError {}

/// Insertion side relative to a hovered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Before,
    After,
}

impl Placement {
    /// `After` when the dragged box's top edge lies below the hovered item's
    /// vertical midpoint. Missing geometry means `Before`.
    pub fn from_rects(active_rect: Option<Rect>, over_rect: Option<Rect>) -> Self {
        match (active_rect, over_rect) {
            (Some(active), Some(over)) if active.top() > over.mid_y() => Self::After,
            _ => Self::Before,
        }
    }
}

/// Hover target plus insertion side, from either pointer or keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverIntent {
    pub target: DropTarget,
    pub placement: Placement,
}

impl HoverIntent {
    pub fn new(target: DropTarget, placement: Placement) -> Self {
        Self { target, placement }
    }

    pub fn before(target: DropTarget) -> Self {
        Self::new(target, Placement::Before)
    }

    pub fn after(target: DropTarget) -> Self {
        Self::new(target, Placement::After)
    }
}

/// Ephemeral state of one drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    id: Uuid,
    active: DragId,
    origin: Option<ContainerId>,
    snapshot: ContainerStore,
    over: Option<HoverIntent>,
    provisional_moves: usize,
    landed_by: Option<HoverIntent>,
}

impl DragSession {
    fn new(active: DragId, store: &ContainerStore) -> Self {
        let origin = match &active {
            DragId::Item(item_id) => store.container_of(item_id).map(str::to_string),
            DragId::Container(_) => None,
        };
        Self {
            id: Uuid::new_v4(),
            active,
            origin,
            snapshot: store.clone(),
            over: None,
            provisional_moves: 0,
            landed_by: None,
        }
    }

    /// Correlation id carried by logs and the commit payload.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn active(&self) -> &DragId {
        &self.active
    }

    /// Container the active item lived in when the drag started.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Store state captured at drag start.
    pub fn snapshot(&self) -> &ContainerStore {
        &self.snapshot
    }

    /// Most recent hover target.
    pub fn over(&self) -> Option<&DropTarget> {
        self.over.as_ref().map(|intent| &intent.target)
    }

    /// Most recent hover target with its insertion side.
    pub fn intent(&self) -> Option<&HoverIntent> {
        self.over.as_ref()
    }

    /// Records a new hover intent. Returns whether the target changed.
    pub fn set_over(&mut self, over: Option<HoverIntent>) -> bool {
        let changed = self.over() != over.as_ref().map(|intent| &intent.target);
        self.over = over;
        changed
    }

    pub fn provisional_moves(&self) -> usize {
        self.provisional_moves
    }

    /// Intent that triggered the most recent provisional move.
    pub fn landed_by(&self) -> Option<&HoverIntent> {
        self.landed_by.as_ref()
    }

    pub(crate) fn record_provisional_move(&mut self, intent: HoverIntent) {
        self.provisional_moves += 1;
        self.landed_by = Some(intent);
    }

    /// Releases the snapshot for rollback.
    pub fn into_snapshot(self) -> ContainerStore {
        self.snapshot
    }
}

/// Drag lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Owner of the single drag state for one board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn session_mut(&mut self) -> Result<&mut DragSession, DragSessionError> {
        match &mut self.state {
            DragState::Dragging(session) => Ok(session),
            DragState::Idle => Err(DragSessionError::NoActiveDrag),
        }
    }

    /// `Idle -> Dragging`, snapshotting `store`.
    pub fn start(
        &mut self,
        active: DragId,
        store: &ContainerStore,
    ) -> Result<&DragSession, DragSessionError> {
        if let DragState::Dragging(session) = &self.state {
            return Err(DragSessionError::Conflict {
                active: session.active.clone(),
            });
        }
        self.state = DragState::Dragging(DragSession::new(active, store));
        self.session().ok_or(DragSessionError::NoActiveDrag)
    }

    /// `Dragging -> Idle`, handing the finished session back to the caller.
    pub fn end(&mut self) -> Result<DragSession, DragSessionError> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => Ok(session),
            DragState::Idle => Err(DragSessionError::NoActiveDrag),
        }
    }
}
