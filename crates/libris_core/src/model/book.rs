//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical `Book` record and its read/write projections.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - `id` is stable and never reused for another book.
//! - `created_at` is set once; `updated_at >= created_at` always.
//! - Stored text fields are trimmed.
//! - ISBN uniqueness is keyed on [`normalize_isbn`] output.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a stored book.
pub type BookId = Uuid;

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;
pub const PUBLICATION_YEAR_MIN: i32 = 1800;
pub const PUBLICATION_YEAR_MAX: i32 = 2100;

/// Display format used for timestamps crossing the service boundary.
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static ISBN_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[- ]").expect("valid isbn separator regex"));

/// Canonical bibliographic record owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Trimmed ISBN as entered; separators are kept.
    pub isbn: String,
    pub publication_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Creates a new book with a generated stable ID from validated input.
    ///
    /// # Invariants
    /// - Text fields are trimmed.
    /// - `created_at == updated_at == now`.
    pub fn new(input: &BookInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            author: input.author.trim().to_string(),
            isbn: input.isbn.trim().to_string(),
            publication_year: input.publication_year,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field from `input`.
    ///
    /// `id` and `created_at` are untouched. `updated_at` never moves
    /// backwards, even if the wall clock does.
    pub fn apply(&mut self, input: &BookInput, now: DateTime<Utc>) {
        self.title = input.title.trim().to_string();
        self.author = input.author.trim().to_string();
        self.isbn = input.isbn.trim().to_string();
        self.publication_year = input.publication_year;
        self.updated_at = now.max(self.updated_at);
    }

    /// Uniqueness key for this book's ISBN.
    pub fn isbn_key(&self) -> String {
        normalize_isbn(&self.isbn)
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} by {} ({}) - ISBN: {}",
            self.title, self.author, self.publication_year, self.isbn
        )
    }
}

/// Create/update payload accepted by the service layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
}

impl BookInput {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        publication_year: i32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            publication_year,
        }
    }

    /// Validates every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        let mut violations = Vec::new();

        let title_chars = self.title.trim().chars().count();
        if title_chars == 0 {
            violations.push(FieldViolation::TitleEmpty);
        } else if title_chars > TITLE_MAX_CHARS {
            violations.push(FieldViolation::TitleTooLong(title_chars));
        }

        let author_chars = self.author.trim().chars().count();
        if author_chars == 0 {
            violations.push(FieldViolation::AuthorEmpty);
        } else if author_chars > AUTHOR_MAX_CHARS {
            violations.push(FieldViolation::AuthorTooLong(author_chars));
        }

        collect_isbn_violations(&self.isbn, &mut violations);

        if !(PUBLICATION_YEAR_MIN..=PUBLICATION_YEAR_MAX).contains(&self.publication_year) {
            violations.push(FieldViolation::YearOutOfRange(self.publication_year));
        }

        BookValidationError::from_violations(violations)
    }
}

/// Read-facing projection of [`Book`] exposed across the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookView {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookView {
    /// `created_at` rendered as `yyyy-MM-dd HH:mm:ss` (UTC).
    pub fn created_at_display(&self) -> String {
        format_timestamp(self.created_at)
    }

    /// `updated_at` rendered as `yyyy-MM-dd HH:mm:ss` (UTC).
    pub fn updated_at_display(&self) -> String {
        format_timestamp(self.updated_at)
    }
}

impl From<Book> for BookView {
    fn from(value: Book) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author: value.author,
            isbn: value.isbn,
            publication_year: value.publication_year,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Formats a UTC timestamp for display.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_DISPLAY_FORMAT).to_string()
}

/// One violated field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    TitleEmpty,
    /// Carries the observed character count.
    TitleTooLong(usize),
    AuthorEmpty,
    AuthorTooLong(usize),
    IsbnEmpty,
    /// Carries the length after separators were stripped.
    IsbnLength(usize),
    IsbnNotDigits,
    YearOutOfRange(i32),
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleEmpty => write!(f, "title must not be empty"),
            Self::TitleTooLong(chars) => write!(
                f,
                "title must be at most {TITLE_MAX_CHARS} characters, got {chars}"
            ),
            Self::AuthorEmpty => write!(f, "author must not be empty"),
            Self::AuthorTooLong(chars) => write!(
                f,
                "author must be at most {AUTHOR_MAX_CHARS} characters, got {chars}"
            ),
            Self::IsbnEmpty => write!(f, "isbn must not be empty"),
            Self::IsbnLength(len) => {
                write!(f, "isbn must be 10 or 13 characters long, got {len}")
            }
            Self::IsbnNotDigits => write!(f, "isbn must contain only digits"),
            Self::YearOutOfRange(year) => write!(
                f,
                "publication year must be between {PUBLICATION_YEAR_MIN} and {PUBLICATION_YEAR_MAX}, got {year}"
            ),
        }
    }
}

/// Validation failure listing every violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookValidationError {
    violations: Vec<FieldViolation>,
}

impl BookValidationError {
    fn from_violations(violations: Vec<FieldViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    /// Violated rules in field order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn contains(&self, violation: &FieldViolation) -> bool {
        self.violations.contains(violation)
    }
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: ")?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Error for BookValidationError {}

/// Strips surrounding whitespace plus inner hyphens and spaces.
///
/// Does not check shape; pair with [`validate_isbn`].
pub fn normalize_isbn(isbn: &str) -> String {
    ISBN_SEPARATOR_RE.replace_all(isbn.trim(), "").into_owned()
}

/// Validates ISBN format only (length 10 or 13, digits). No checksum.
pub fn validate_isbn(isbn: &str) -> Result<(), BookValidationError> {
    let mut violations = Vec::new();
    collect_isbn_violations(isbn, &mut violations);
    BookValidationError::from_violations(violations)
}

fn collect_isbn_violations(isbn: &str, violations: &mut Vec<FieldViolation>) {
    if isbn.trim().is_empty() {
        violations.push(FieldViolation::IsbnEmpty);
        return;
    }

    let normalized = normalize_isbn(isbn);
    let len = normalized.chars().count();
    if len != 10 && len != 13 {
        violations.push(FieldViolation::IsbnLength(len));
    }
    if !normalized.chars().all(|ch| ch.is_ascii_digit()) {
        violations.push(FieldViolation::IsbnNotDigits);
    }
}
