//! Book use-case service.
//!
//! # Responsibility
//! - Validate input and enforce ISBN uniqueness above the repository.
//! - Map stored `Book` records to `BookView` projections.
//! - Run every mutation inside the unit-of-work call sequence.
//!
//! # Invariants
//! - Every write is preceded by `BookInput::validate()`.
//! - Mutations follow `begin -> write -> save -> commit`; any failure rolls
//!   back and returns the original error unchanged.
//! - Identifier and `created_at` never change after creation.

use crate::model::book::{validate_isbn, Book, BookId, BookInput, BookValidationError, BookView};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use crate::uow::UnitOfWork;
use chrono::Utc;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BookServiceResult<T> = Result<T, BookServiceError>;

/// Coarse classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Duplicate,
    Validation,
    Storage,
}

/// Service error for book use-cases.
#[derive(Debug)]
pub enum BookServiceError {
    /// No record with this identifier.
    BookNotFound(BookId),
    /// No record with this ISBN.
    IsbnNotFound(String),
    /// Create/update would violate ISBN uniqueness.
    DuplicateIsbn(String),
    /// Input failed shape/range/format rules.
    Validation(BookValidationError),
    /// Repository or unit-of-work failure.
    Repo(RepoError),
}

impl BookServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BookNotFound(_) | Self::IsbnNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateIsbn(_) => ErrorKind::Duplicate,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for BookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BookNotFound(id) => write!(f, "book with id {id} not found"),
            Self::IsbnNotFound(isbn) => write!(f, "book with isbn {isbn} not found"),
            Self::DuplicateIsbn(isbn) => write!(f, "book with isbn {isbn} already exists"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for BookServiceError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for BookServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::IsbnTaken { isbn, .. } => Self::DuplicateIsbn(isbn),
            other => Self::Repo(other),
        }
    }
}

/// Book service facade over a unit of work.
pub struct BookService<U: UnitOfWork> {
    uow: U,
}

impl<U: UnitOfWork> BookService<U> {
    /// Creates a service using the provided unit of work.
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    pub fn unit_of_work(&self) -> &U {
        &self.uow
    }

    /// Lists every stored book, unordered.
    pub fn get_all(&self) -> BookServiceResult<Vec<BookView>> {
        let books = self.uow.books().get_all()?;
        Ok(books.into_iter().map(BookView::from).collect())
    }

    pub fn get_by_id(&self, id: BookId) -> BookServiceResult<BookView> {
        self.uow
            .books()
            .get_by_id(id)?
            .map(BookView::from)
            .ok_or(BookServiceError::BookNotFound(id))
    }

    /// Looks up one book by ISBN after validating its shape.
    pub fn get_by_isbn(&self, isbn: &str) -> BookServiceResult<BookView> {
        validate_isbn(isbn)?;
        let isbn = isbn.trim();
        self.uow
            .books()
            .get_by_isbn(isbn)?
            .map(BookView::from)
            .ok_or_else(|| BookServiceError::IsbnNotFound(isbn.to_string()))
    }

    /// Searches title, author and ISBN. A blank term lists everything.
    pub fn search(&self, term: &str) -> BookServiceResult<Vec<BookView>> {
        let term = term.trim();
        if term.is_empty() {
            return self.get_all();
        }

        let books = self.uow.books().search(term)?;
        Ok(books.into_iter().map(BookView::from).collect())
    }

    /// Creates one book.
    ///
    /// # Errors
    /// - `Validation` listing every violated rule.
    /// - `DuplicateIsbn` when the ISBN is already held, including when a
    ///   concurrent add claims it first.
    pub fn add(&self, input: &BookInput) -> BookServiceResult<BookView> {
        input.validate()?;

        let isbn = input.isbn.trim();
        if self.uow.books().exists(isbn)? {
            warn!("event=book_add module=service status=rejected reason=duplicate_isbn");
            return Err(BookServiceError::DuplicateIsbn(isbn.to_string()));
        }

        let book = Book::new(input, Utc::now());
        let stored = self.in_transaction("book_add", |books| books.add_unique(&book))?;
        info!(
            "event=book_add module=service status=ok book_id={}",
            stored.id
        );
        Ok(stored.into())
    }

    /// Replaces every mutable field of an existing book.
    ///
    /// # Errors
    /// - `Validation` listing every violated rule.
    /// - `BookNotFound` when `id` has no record.
    /// - `DuplicateIsbn` when a different record holds the ISBN.
    pub fn update(&self, id: BookId, input: &BookInput) -> BookServiceResult<BookView> {
        input.validate()?;

        let mut book = self
            .uow
            .books()
            .get_by_id(id)?
            .ok_or(BookServiceError::BookNotFound(id))?;

        let isbn = input.isbn.trim();
        if let Some(holder) = self.uow.books().get_by_isbn(isbn)? {
            if holder.id != id {
                warn!(
                    "event=book_update module=service status=rejected reason=duplicate_isbn book_id={id}"
                );
                return Err(BookServiceError::DuplicateIsbn(isbn.to_string()));
            }
        }

        book.apply(input, Utc::now());
        let stored = self.in_transaction("book_update", |books| books.update_unique(&book))?;
        info!("event=book_update module=service status=ok book_id={id}");
        Ok(stored.into())
    }

    /// Permanently removes one book.
    ///
    /// Returns whether a record was actually removed.
    pub fn delete(&self, id: BookId) -> BookServiceResult<bool> {
        if self.uow.books().get_by_id(id)?.is_none() {
            return Err(BookServiceError::BookNotFound(id));
        }

        let removed = self.in_transaction("book_delete", |books| books.delete(id))?;
        info!("event=book_delete module=service status=ok book_id={id} removed={removed}");
        Ok(removed)
    }

    fn in_transaction<T>(
        &self,
        event: &'static str,
        mutation: impl FnOnce(&U::Books) -> RepoResult<T>,
    ) -> BookServiceResult<T> {
        let outcome = self.uow.begin_transaction().and_then(|()| {
            let value = mutation(self.uow.books())?;
            self.uow.save_changes()?;
            self.uow.commit()?;
            Ok(value)
        });

        outcome.map_err(|err| {
            if let Err(rollback_err) = self.uow.rollback() {
                error!(
                    "event={event} module=service status=error stage=rollback error={rollback_err}"
                );
            }
            warn!("event={event} module=service status=rolled_back error={err}");
            BookServiceError::from(err)
        })
    }
}
