//! Unit-of-work capability over the book repository.
//!
//! # Responsibility
//! - Group repository access with begin/save/commit/rollback calls.
//! - Let a transactional backend replace the in-memory one without touching
//!   service logic.
//!
//! # Invariants
//! - Callers drive `begin -> mutation -> save -> commit`, and call
//!   `rollback` when any of the mutation, save or commit steps fail.
//! - The in-memory implementation provides no atomicity or durability.

use crate::repo::book_repo::{BookRepository, InMemoryBookRepository, RepoResult};
use log::debug;

/// Transaction facade consumed by the service layer.
pub trait UnitOfWork {
    type Books: BookRepository;

    /// Repository bound to this unit of work.
    fn books(&self) -> &Self::Books;
    fn begin_transaction(&self) -> RepoResult<()>;
    /// Flushes staged writes and returns how many were written.
    fn save_changes(&self) -> RepoResult<usize>;
    fn commit(&self) -> RepoResult<()>;
    fn rollback(&self) -> RepoResult<()>;
}

/// No-op unit of work over a repository that applies writes immediately.
#[derive(Debug, Default)]
pub struct InMemoryUnitOfWork<R = InMemoryBookRepository> {
    books: R,
}

impl<R: BookRepository> InMemoryUnitOfWork<R> {
    pub fn new(books: R) -> Self {
        Self { books }
    }
}

impl<R: BookRepository> UnitOfWork for InMemoryUnitOfWork<R> {
    type Books = R;

    fn books(&self) -> &R {
        &self.books
    }

    fn begin_transaction(&self) -> RepoResult<()> {
        debug!("event=tx_begin module=uow status=ok backend=memory");
        Ok(())
    }

    fn save_changes(&self) -> RepoResult<usize> {
        // Writes already landed in the store; nothing is staged.
        debug!("event=tx_save module=uow status=ok backend=memory pending=0");
        Ok(0)
    }

    fn commit(&self) -> RepoResult<()> {
        debug!("event=tx_commit module=uow status=ok backend=memory");
        Ok(())
    }

    fn rollback(&self) -> RepoResult<()> {
        debug!("event=tx_rollback module=uow status=ok backend=memory");
        Ok(())
    }
}
