use libris_core::{
    Book, BookId, BookInput, BookRepository, BookService, BookServiceError, ErrorKind,
    InMemoryBookRepository, InMemoryUnitOfWork, RepoError, RepoResult, UnitOfWork,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Repository double whose writes can be forced to fail.
#[derive(Default)]
struct FlakyRepository {
    inner: InMemoryBookRepository,
    fail_writes: AtomicBool,
}

impl FlakyRepository {
    fn check(&self) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Storage("disk on fire".to_string()));
        }
        Ok(())
    }
}

impl BookRepository for FlakyRepository {
    fn get_all(&self) -> RepoResult<Vec<Book>> {
        self.inner.get_all()
    }
    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.inner.get_by_id(id)
    }
    fn get_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        self.inner.get_by_isbn(isbn)
    }
    fn search(&self, term: &str) -> RepoResult<Vec<Book>> {
        self.inner.search(term)
    }
    fn add(&self, book: &Book) -> RepoResult<Book> {
        self.check()?;
        self.inner.add(book)
    }
    fn update(&self, book: &Book) -> RepoResult<Book> {
        self.check()?;
        self.inner.update(book)
    }
    fn delete(&self, id: BookId) -> RepoResult<bool> {
        self.check()?;
        self.inner.delete(id)
    }
    fn exists(&self, isbn: &str) -> RepoResult<bool> {
        self.inner.exists(isbn)
    }
    fn add_unique(&self, book: &Book) -> RepoResult<Book> {
        self.check()?;
        self.inner.add_unique(book)
    }
    fn update_unique(&self, book: &Book) -> RepoResult<Book> {
        self.check()?;
        self.inner.update_unique(book)
    }
}

/// Unit of work double that records the call sequence.
#[derive(Default)]
struct RecordingUnitOfWork {
    books: FlakyRepository,
    calls: Mutex<Vec<&'static str>>,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
}

impl RecordingUnitOfWork {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_calls(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl UnitOfWork for RecordingUnitOfWork {
    type Books = FlakyRepository;

    fn books(&self) -> &FlakyRepository {
        &self.books
    }

    fn begin_transaction(&self) -> RepoResult<()> {
        self.record("begin");
        Ok(())
    }

    fn save_changes(&self) -> RepoResult<usize> {
        self.record("save");
        Ok(1)
    }

    fn commit(&self) -> RepoResult<()> {
        self.record("commit");
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(RepoError::Storage("commit refused".to_string()));
        }
        Ok(())
    }

    fn rollback(&self) -> RepoResult<()> {
        self.record("rollback");
        if self.fail_rollback.load(Ordering::SeqCst) {
            return Err(RepoError::Storage("rollback refused".to_string()));
        }
        Ok(())
    }
}

fn input(isbn: &str) -> BookInput {
    BookInput::new("Title", "Author", isbn, 2000)
}

#[test]
fn successful_mutations_run_begin_save_commit() {
    let service = BookService::new(RecordingUnitOfWork::default());

    let created = service.add(&input("1234567890")).unwrap();
    assert_eq!(
        service.unit_of_work().take_calls(),
        vec!["begin", "save", "commit"]
    );

    service.update(created.id, &input("1234567890")).unwrap();
    assert_eq!(
        service.unit_of_work().take_calls(),
        vec!["begin", "save", "commit"]
    );

    service.delete(created.id).unwrap();
    assert_eq!(
        service.unit_of_work().take_calls(),
        vec!["begin", "save", "commit"]
    );
}

#[test]
fn reads_and_rejected_inputs_do_not_open_transactions() {
    let service = BookService::new(RecordingUnitOfWork::default());
    service.add(&input("1234567890")).unwrap();
    service.unit_of_work().take_calls();

    service.get_all().unwrap();
    service.search("title").unwrap();
    service.get_by_isbn("1234567890").unwrap();
    assert_eq!(
        service.add(&input("1234567890")).unwrap_err().kind(),
        ErrorKind::Duplicate
    );
    assert_eq!(
        service.add(&input("bad")).unwrap_err().kind(),
        ErrorKind::Validation
    );

    assert!(service.unit_of_work().take_calls().is_empty());
}

#[test]
fn failed_write_rolls_back_and_returns_original_error() {
    let service = BookService::new(RecordingUnitOfWork::default());
    service
        .unit_of_work()
        .books()
        .fail_writes
        .store(true, Ordering::SeqCst);

    let err = service.add(&input("1234567890")).unwrap_err();
    assert!(matches!(
        err,
        BookServiceError::Repo(RepoError::Storage(ref message)) if message == "disk on fire"
    ));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(
        service.unit_of_work().take_calls(),
        vec!["begin", "rollback"]
    );
}

#[test]
fn failed_commit_rolls_back() {
    let service = BookService::new(RecordingUnitOfWork::default());
    service
        .unit_of_work()
        .fail_commit
        .store(true, Ordering::SeqCst);

    let err = service.add(&input("1234567890")).unwrap_err();
    assert!(err.to_string().contains("commit refused"));
    assert_eq!(
        service.unit_of_work().take_calls(),
        vec!["begin", "save", "commit", "rollback"]
    );
}

#[test]
fn rollback_failure_does_not_mask_original_error() {
    let service = BookService::new(RecordingUnitOfWork::default());
    let created = service.add(&input("1234567890")).unwrap();
    service.unit_of_work().take_calls();

    let uow = service.unit_of_work();
    uow.books().fail_writes.store(true, Ordering::SeqCst);
    uow.fail_rollback.store(true, Ordering::SeqCst);

    let err = service.delete(created.id).unwrap_err();
    assert!(err.to_string().contains("disk on fire"));
    assert_eq!(uow.take_calls(), vec!["begin", "rollback"]);
}

#[test]
fn in_memory_unit_of_work_is_a_no_op_facade() {
    let uow = InMemoryUnitOfWork::new(InMemoryBookRepository::new());
    uow.begin_transaction().unwrap();
    assert_eq!(uow.save_changes().unwrap(), 0);
    uow.commit().unwrap();
    uow.rollback().unwrap();

    let service = BookService::new(uow);
    service.add(&input("1234567890")).unwrap();
    let repo = service.unit_of_work().books();
    assert_eq!(repo.len(), 1);
}
