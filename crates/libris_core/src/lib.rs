//! Core domain logic for Libris, a small book catalog.
//! This crate is the single source of truth for business invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod uow;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{
    format_timestamp, normalize_isbn, validate_isbn, Book, BookId, BookInput, BookValidationError,
    BookView, FieldViolation,
};
pub use repo::book_repo::{BookRepository, InMemoryBookRepository, RepoError, RepoResult};
pub use service::book_service::{BookService, BookServiceError, BookServiceResult, ErrorKind};
pub use uow::{InMemoryUnitOfWork, UnitOfWork};

/// Service wired to the in-memory store.
pub type InMemoryBookService = BookService<InMemoryUnitOfWork<InMemoryBookRepository>>;

/// Builds a service over a fresh, empty in-memory store.
pub fn in_memory_service() -> InMemoryBookService {
    BookService::new(InMemoryUnitOfWork::new(InMemoryBookRepository::new()))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
