//! Core roster logic for TentRoster.
//! This crate is the single source of truth for container membership
//! invariants and the drag/drop reassignment flow.

pub mod collision;
pub mod config;
pub mod drag;
pub mod geometry;
pub mod keyboard;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use collision::{CollisionResolver, DragGeometry, Region, RegionSet};
pub use config::{BoardConfig, ConfigError};
pub use drag::session::{
    DragMachine, DragSession, DragSessionError, DragState, HoverIntent, Placement,
};
pub use geometry::{Point, Rect};
pub use keyboard::ArrowKey;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::container::{
    Container, ContainerAssignment, ContainerId, ContainerListing, DragId, DropTarget,
    RosterCommit, PLACEHOLDER_ID, TRASH_ID,
};
pub use model::item::{Item, ItemId, ItemRegistry};
pub use service::board_service::{BoardObserver, DragSurface, RosterBoard};
pub use service::lifecycle_service::{ContainerDeleteMode, ContainerLifecycleManager};
pub use service::transfer_service::{
    DropOutcome, HoverOutcome, TransferEngine, TransferError, TransferResult,
};
pub use store::container_store::{ContainerStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
