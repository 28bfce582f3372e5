//! Roster domain model shared by the store, resolver and services.
//!
//! # Responsibility
//! - Define item metadata, container records and drag/drop identifiers.
//! - Define the listing/commit shapes exchanged with the persistence layer.
//!
//! # Invariants
//! - Items and containers are identified by stable string ids.
//! - Sentinel ids (`PLACEHOLDER_ID`, `TRASH_ID`) never name a real container.

pub mod container;
pub mod item;
