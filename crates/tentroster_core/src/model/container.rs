//! Container records, drag/drop identifiers and the persistence wire shapes.
//!
//! # Responsibility
//! - Define `Container` and the ids that flow through a drag gesture.
//! - Define the listing (input) and commit (output) contracts.
//!
//! # Invariants
//! - `DropTarget::Placeholder` and `DropTarget::Trash` are resolvable targets but
//!   never name a stored container.
//! - `ContainerAssignment` is the stable contract with the persistence layer;
//!   its serialized field names must not change.

use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one container (e.g. a tent).
pub type ContainerId = String;

/// Synthetic target id meaning "materialize a new container here".
pub const PLACEHOLDER_ID: &str = "placeholder";
/// Synthetic target id meaning "remove the active item from all containers".
pub const TRASH_ID: &str = "trash";

/// Returns whether `id` collides with a sentinel target id.
pub fn is_reserved_id(id: &str) -> bool {
    id == PLACEHOLDER_ID || id == TRASH_ID
}

/// One ordered bucket of item ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: ContainerId,
    pub items: Vec<ItemId>,
    /// Locked containers reject membership changes.
    pub is_locked: bool,
}

impl Container {
    pub fn new(id: impl Into<ContainerId>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            is_locked: false,
        }
    }

    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|id| id == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Subject of one drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragId {
    /// An item being reassigned or reordered.
    Item(ItemId),
    /// A whole container being reordered.
    Container(ContainerId),
}

impl DragId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Item(id) | Self::Container(id) => id.as_str(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}

impl Display for DragId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(id) => write!(f, "item:{id}"),
            Self::Container(id) => write!(f, "container:{id}"),
        }
    }
}

/// Logical drop target produced by collision resolution or keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Item(ItemId),
    Container(ContainerId),
    Placeholder,
    Trash,
}

impl DropTarget {
    /// Returns the id used for region registration and logging.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Item(id) | Self::Container(id) => id.as_str(),
            Self::Placeholder => PLACEHOLDER_ID,
            Self::Trash => TRASH_ID,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Placeholder | Self::Trash)
    }
}

impl From<DragId> for DropTarget {
    fn from(value: DragId) -> Self {
        match value {
            DragId::Item(id) => Self::Item(id),
            DragId::Container(id) => Self::Container(id),
        }
    }
}

impl Display for DropTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(id) => write!(f, "item:{id}"),
            Self::Container(id) => write!(f, "container:{id}"),
            Self::Placeholder => write!(f, "{PLACEHOLDER_ID}"),
            Self::Trash => write!(f, "{TRASH_ID}"),
        }
    }
}

/// One row of the listing endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerListing {
    pub container_id: ContainerId,
    #[serde(default)]
    pub member_ids: Vec<ItemId>,
    #[serde(default)]
    pub is_locked: bool,
}

/// One row of the commit payload handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAssignment {
    pub container_id: ContainerId,
    pub member_ids: Vec<ItemId>,
}

/// Full roster mapping emitted after every successful drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterCommit {
    /// Drag session that produced this commit.
    pub session_id: Uuid,
    /// Assignments in container display order.
    pub assignments: Vec<ContainerAssignment>,
}

impl RosterCommit {
    /// Serializes the payload for an external save request.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
