//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store mutations into drag/drop and lifecycle use cases.
//! - Keep presentation callers decoupled from store internals.

pub mod board_service;
pub mod lifecycle_service;
pub mod transfer_service;
