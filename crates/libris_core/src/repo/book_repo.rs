//! Book repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Provide CRUD, search and existence APIs over the book store.
//! - Offer atomic ISBN-unique write paths for callers that need them.
//!
//! # Invariants
//! - The store exclusively owns records; every read returns clones.
//! - `add`/`update` are plain last-write-wins writes. They reject nothing and
//!   only claim an ISBN that no other record holds.
//! - `add_unique`/`update_unique` claim the normalized ISBN before the record
//!   becomes visible, so concurrent writers cannot both hold one ISBN.

use crate::model::book::{normalize_isbn, Book, BookId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// Another record already holds the normalized ISBN.
    IsbnTaken { isbn: String, holder: BookId },
    /// Backend failure. Never produced by the in-memory store.
    Storage(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IsbnTaken { isbn, holder } => {
                write!(f, "isbn `{isbn}` is already held by book {holder}")
            }
            Self::Storage(message) => write!(f, "book storage failure: {message}"),
        }
    }
}

impl Error for RepoError {}

/// Repository interface for book CRUD operations.
pub trait BookRepository {
    /// Unordered snapshot of all current records.
    fn get_all(&self) -> RepoResult<Vec<Book>>;
    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Exact match on the stored ISBN.
    fn get_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>>;
    /// Case-insensitive substring match over title, author and ISBN.
    fn search(&self, term: &str) -> RepoResult<Vec<Book>>;
    /// Inserts under `book.id`; an existing record with that id is replaced.
    fn add(&self, book: &Book) -> RepoResult<Book>;
    /// Overwrites the record at `book.id`, inserting it when absent.
    fn update(&self, book: &Book) -> RepoResult<Book>;
    /// Returns whether a record existed and was removed.
    fn delete(&self, id: BookId) -> RepoResult<bool>;
    /// Exact match on the stored ISBN.
    fn exists(&self, isbn: &str) -> RepoResult<bool>;
    /// Inserts only if no record holds the normalized ISBN.
    fn add_unique(&self, book: &Book) -> RepoResult<Book>;
    /// Overwrites `book.id` only if no other record holds the normalized ISBN.
    fn update_unique(&self, book: &Book) -> RepoResult<Book>;
}

/// Concurrent in-memory book store.
///
/// Records live in a sharded map keyed by id. A second map indexes
/// normalized ISBN to the id of the record that claimed it.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: DashMap<BookId, Book>,
    isbn_index: DashMap<String, BookId>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn store(&self, book: &Book, key: &str) {
        let previous = self.books.insert(book.id, book.clone());
        if let Some(previous) = previous {
            let previous_key = previous.isbn_key();
            if previous_key != key {
                self.isbn_index
                    .remove_if(&previous_key, |_, holder| *holder == book.id);
            }
        }
    }

    fn claim_isbn(&self, key: String, book: &Book) -> RepoResult<()> {
        // The entry guard must be released before touching the index again.
        match self.isbn_index.entry(key) {
            Entry::Occupied(entry) => {
                let holder = *entry.get();
                if holder != book.id {
                    return Err(RepoError::IsbnTaken {
                        isbn: book.isbn.clone(),
                        holder,
                    });
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(book.id);
            }
        }
        Ok(())
    }
}

impl BookRepository for InMemoryBookRepository {
    fn get_all(&self) -> RepoResult<Vec<Book>> {
        Ok(self.books.iter().map(|entry| entry.value().clone()).collect())
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        Ok(self.books.get(&id).map(|entry| entry.value().clone()))
    }

    fn get_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        Ok(self
            .books
            .iter()
            .find(|entry| entry.value().isbn == isbn)
            .map(|entry| entry.value().clone()))
    }

    fn search(&self, term: &str) -> RepoResult<Vec<Book>> {
        let needle = term.to_lowercase();
        Ok(self
            .books
            .iter()
            .filter(|entry| matches_term(entry.value(), needle.as_str()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn add(&self, book: &Book) -> RepoResult<Book> {
        let key = book.isbn_key();
        // Plain writes never take over another record's claim.
        self.isbn_index.entry(key.clone()).or_insert(book.id);
        self.store(book, key.as_str());
        Ok(book.clone())
    }

    fn update(&self, book: &Book) -> RepoResult<Book> {
        self.add(book)
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        let Some((_, removed)) = self.books.remove(&id) else {
            return Ok(false);
        };
        self.isbn_index
            .remove_if(&removed.isbn_key(), |_, holder| *holder == id);
        Ok(true)
    }

    fn exists(&self, isbn: &str) -> RepoResult<bool> {
        Ok(self.books.iter().any(|entry| entry.value().isbn == isbn))
    }

    fn add_unique(&self, book: &Book) -> RepoResult<Book> {
        self.update_unique(book)
    }

    fn update_unique(&self, book: &Book) -> RepoResult<Book> {
        let key = normalize_isbn(&book.isbn);
        self.claim_isbn(key.clone(), book)?;
        self.store(book, key.as_str());
        Ok(book.clone())
    }
}

fn matches_term(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle)
        || book.author.to_lowercase().contains(needle)
        || book.isbn.to_lowercase().contains(needle)
}
