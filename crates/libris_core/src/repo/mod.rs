//! Repository layer abstractions and storage implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate store details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs do not validate input; that belongs to the service.
//! - Absence on reads is `Ok(None)`, never an error.

pub mod book_repo;
