//! Drag gesture state.
//!
//! # Responsibility
//! - Track the single in-flight drag gesture and its rollback snapshot.
//!
//! # Invariants
//! - At most one gesture is active; `Dragging` exits only via drop or cancel.

pub mod session;
