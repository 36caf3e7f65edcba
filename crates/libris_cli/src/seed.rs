//! Sample catalog loaded at startup.

use libris_core::{BookInput, BookService, ErrorKind, UnitOfWork};
use log::{info, warn};

/// Title, author, ISBN, publication year.
const SAMPLE_BOOKS: &[(&str, &str, &str, i32)] = &[
    ("Clean Code", "Robert C. Martin", "9780132350884", 2008),
    ("Design Patterns", "Gang of Four", "9780201633612", 1994),
    ("Clean Architecture", "Robert C. Martin", "9780134494166", 2017),
];

/// Adds the sample books and returns how many were inserted.
///
/// Duplicates are skipped silently; any other failure is logged and skipped.
pub fn seed_sample_data<U: UnitOfWork>(service: &BookService<U>) -> usize {
    let mut added = 0;
    for (title, author, isbn, year) in SAMPLE_BOOKS {
        match service.add(&BookInput::new(*title, *author, *isbn, *year)) {
            Ok(_) => added += 1,
            Err(err) if err.kind() == ErrorKind::Duplicate => {}
            Err(err) => warn!("event=seed_book module=cli status=error error={err}"),
        }
    }
    info!("event=seed module=cli status=ok added={added}");
    added
}
