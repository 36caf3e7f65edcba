//! Book domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep field validation next to the data it guards.
//!
//! # Invariants
//! - Every book is identified by a stable `BookId`.
//! - Deletion is permanent; there are no tombstones.

pub mod book;
