use chrono::Utc;
use libris_core::{Book, BookInput, BookRepository, InMemoryBookRepository, RepoError};
use std::collections::HashSet;
use uuid::Uuid;

fn book(title: &str, author: &str, isbn: &str) -> Book {
    Book::new(&BookInput::new(title, author, isbn, 2000), Utc::now())
}

#[test]
fn add_and_get_roundtrip() {
    let repo = InMemoryBookRepository::new();
    let original = book("Clean Code", "Robert C. Martin", "9780132350884");
    repo.add(&original).unwrap();

    let loaded = repo.get_by_id(original.id).unwrap().unwrap();
    assert_eq!(loaded, original);
    assert_eq!(repo.len(), 1);
}

#[test]
fn get_missing_returns_none() {
    let repo = InMemoryBookRepository::new();
    assert!(repo.get_by_id(Uuid::new_v4()).unwrap().is_none());
    assert!(repo.get_by_isbn("9780132350884").unwrap().is_none());
}

#[test]
fn get_all_returns_every_record() {
    let repo = InMemoryBookRepository::new();
    let a = book("A", "X", "1111111111");
    let b = book("B", "Y", "2222222222");
    repo.add(&a).unwrap();
    repo.add(&b).unwrap();

    let ids: HashSet<_> = repo.get_all().unwrap().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, HashSet::from([a.id, b.id]));
}

#[test]
fn add_with_existing_id_is_last_write_wins() {
    let repo = InMemoryBookRepository::new();
    let mut original = book("First", "X", "1111111111");
    repo.add(&original).unwrap();

    original.title = "Second".to_string();
    repo.add(&original).unwrap();

    assert_eq!(repo.len(), 1);
    assert_eq!(repo.get_by_id(original.id).unwrap().unwrap().title, "Second");
}

#[test]
fn get_by_isbn_and_exists_use_exact_match() {
    let repo = InMemoryBookRepository::new();
    let stored = book("A", "X", "978-0132350884");
    repo.add(&stored).unwrap();

    assert_eq!(
        repo.get_by_isbn("978-0132350884").unwrap().map(|b| b.id),
        Some(stored.id)
    );
    assert!(repo.exists("978-0132350884").unwrap());
    assert!(!repo.exists("9780132350884").unwrap());
    assert!(repo.get_by_isbn("978").unwrap().is_none());
}

#[test]
fn search_matches_title_author_and_isbn_case_insensitively() {
    let repo = InMemoryBookRepository::new();
    let clean_code = book("Clean Code", "Robert C. Martin", "9780132350884");
    let patterns = book("Design Patterns", "Gang of Four", "9780201633612");
    let architecture = book("Architecture", "Someone Clean", "9780134494166");
    repo.add(&clean_code).unwrap();
    repo.add(&patterns).unwrap();
    repo.add(&architecture).unwrap();

    let ids: HashSet<_> = repo
        .search("CLEAN")
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids, HashSet::from([clean_code.id, architecture.id]));

    let by_isbn = repo.search("0201").unwrap();
    assert_eq!(by_isbn.len(), 1);
    assert_eq!(by_isbn[0].id, patterns.id);

    assert!(repo.search("nothing like this").unwrap().is_empty());
}

#[test]
fn update_overwrites_existing_record() {
    let repo = InMemoryBookRepository::new();
    let mut stored = book("Draft", "X", "1111111111");
    repo.add(&stored).unwrap();

    stored.title = "Final".to_string();
    stored.isbn = "2222222222".to_string();
    repo.update(&stored).unwrap();

    let loaded = repo.get_by_id(stored.id).unwrap().unwrap();
    assert_eq!(loaded.title, "Final");
    assert!(!repo.exists("1111111111").unwrap());
    assert!(repo.exists("2222222222").unwrap());
}

#[test]
fn update_of_absent_id_inserts() {
    let repo = InMemoryBookRepository::new();
    let missing = book("Missing", "X", "1111111111");

    repo.update(&missing).unwrap();
    assert_eq!(repo.get_by_id(missing.id).unwrap(), Some(missing));
}

#[test]
fn delete_reports_whether_record_existed() {
    let repo = InMemoryBookRepository::new();
    let stored = book("A", "X", "1111111111");
    repo.add(&stored).unwrap();

    assert!(repo.delete(stored.id).unwrap());
    assert!(!repo.delete(stored.id).unwrap());
    assert!(repo.get_by_id(stored.id).unwrap().is_none());
    assert!(repo.is_empty());
}

#[test]
fn add_unique_rejects_normalized_isbn_collision() {
    let repo = InMemoryBookRepository::new();
    let first = book("A", "X", "9780132350884");
    let second = book("B", "Y", "978-0-13-235088-4");
    repo.add_unique(&first).unwrap();

    let err = repo.add_unique(&second).unwrap_err();
    assert_eq!(
        err,
        RepoError::IsbnTaken {
            isbn: "978-0-13-235088-4".to_string(),
            holder: first.id,
        }
    );
    assert_eq!(repo.len(), 1);
}

#[test]
fn update_unique_allows_same_holder_and_rejects_others() {
    let repo = InMemoryBookRepository::new();
    let mut first = book("A", "X", "1111111111");
    let second = book("B", "Y", "2222222222");
    repo.add_unique(&first).unwrap();
    repo.add_unique(&second).unwrap();

    first.title = "A2".to_string();
    repo.update_unique(&first).unwrap();

    first.isbn = "2222222222".to_string();
    let err = repo.update_unique(&first).unwrap_err();
    assert!(matches!(err, RepoError::IsbnTaken { holder, .. } if holder == second.id));
    assert_eq!(
        repo.get_by_id(first.id).unwrap().unwrap().isbn,
        "1111111111"
    );
}

#[test]
fn deleted_isbn_can_be_claimed_again() {
    let repo = InMemoryBookRepository::new();
    let first = book("A", "X", "1111111111");
    repo.add_unique(&first).unwrap();
    repo.delete(first.id).unwrap();

    let second = book("B", "Y", "1111111111");
    repo.add_unique(&second).unwrap();
    assert_eq!(repo.len(), 1);
}

#[test]
fn plain_add_does_not_steal_an_existing_isbn_claim() {
    let repo = InMemoryBookRepository::new();
    let holder = book("A", "X", "1234567890");
    repo.add_unique(&holder).unwrap();

    let intruder = book("B", "Y", "1234567890");
    repo.add(&intruder).unwrap();
    repo.delete(intruder.id).unwrap();

    let late = book("C", "Z", "1234567890");
    let err = repo.add_unique(&late).unwrap_err();
    assert!(matches!(err, RepoError::IsbnTaken { holder: id, .. } if id == holder.id));

    let holders = repo
        .get_all()
        .unwrap()
        .into_iter()
        .filter(|b| b.isbn == "1234567890")
        .count();
    assert_eq!(holders, 1);
}
