//! In-memory roster storage.
//!
//! # Responsibility
//! - Own container membership and display order for one roster.
//! - Keep every mutation atomic: validate first, then apply.
//!
//! # Invariants
//! - Every item id appears in at most one container.
//! - `container_order` lists each stored container exactly once.
//! - The reverse index (item -> container) always mirrors the forward map.

pub mod container_store;
