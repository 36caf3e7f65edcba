//! Interactive menu loop over the book service.
//!
//! # Responsibility
//! - Read sanitized lines, dispatch menu commands, render records.
//! - Act as the only recovery point for business errors.
//!
//! # Invariants
//! - Service errors are printed and the loop continues.
//! - Only terminal I/O failures end the loop early.
//! - End of input behaves like choosing exit.

use libris_core::{BookId, BookInput, BookService, BookServiceError, BookView, UnitOfWork};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use uuid::Uuid;

static CONTROL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1F\x7F]").expect("valid control char regex"));

const RECORD_SEPARATOR_WIDTH: usize = 50;
const TITLE: &str = "=== Library Management System ===";

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    DisplayAll,
    Search,
    Add,
    Update,
    Delete,
    GetById,
    GetByIsbn,
    Exit,
}

impl MenuChoice {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::DisplayAll),
            "2" => Some(Self::Search),
            "3" => Some(Self::Add),
            "4" => Some(Self::Update),
            "5" => Some(Self::Delete),
            "6" => Some(Self::GetById),
            "7" => Some(Self::GetByIsbn),
            "0" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Failure of a single console command.
#[derive(Debug)]
pub enum ConsoleError {
    Io(io::Error),
    Service(BookServiceError),
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "console i/o failed: {err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConsoleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConsoleError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<BookServiceError> for ConsoleError {
    fn from(value: BookServiceError) -> Self {
        Self::Service(value)
    }
}

type CommandResult = Result<(), ConsoleError>;

/// Trims input and strips ASCII control characters.
pub fn sanitize_input(value: &str) -> String {
    CONTROL_CHARS_RE.replace_all(value.trim(), "").into_owned()
}

/// Parses a console year answer. Range rules beyond `0 < year < 3000`
/// belong to the service.
pub fn parse_year(value: &str) -> Option<i32> {
    value
        .parse::<i32>()
        .ok()
        .filter(|year| *year > 0 && *year < 3000)
}

/// Menu-driven front-end bound to one service instance.
pub struct Console<'svc, U: UnitOfWork, R, W> {
    service: &'svc BookService<U>,
    input: R,
    output: W,
}

impl<'svc, U, R, W> Console<'svc, U, R, W>
where
    U: UnitOfWork,
    R: BufRead,
    W: Write,
{
    pub fn new(service: &'svc BookService<U>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs the menu loop until exit or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{TITLE}")?;
        writeln!(self.output)?;

        loop {
            self.show_menu()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output, "Goodbye!")?;
                return Ok(());
            };

            let outcome = match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                Some(choice) => self.dispatch(choice),
                None => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    Ok(())
                }
            };

            match outcome {
                Ok(()) => {}
                Err(ConsoleError::Service(err)) => {
                    debug!(
                        "event=command_failed module=cli status=error kind={:?}",
                        err.kind()
                    );
                    writeln!(self.output, "Error: {err}")?;
                }
                Err(ConsoleError::Io(err)) => return Err(err),
            }

            writeln!(self.output, "\nPress Enter to continue...")?;
            self.output.flush()?;
            if self.read_line()?.is_none() {
                writeln!(self.output, "Goodbye!")?;
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, choice: MenuChoice) -> CommandResult {
        match choice {
            MenuChoice::DisplayAll => self.display_all(),
            MenuChoice::Search => self.search(),
            MenuChoice::Add => self.add(),
            MenuChoice::Update => self.update(),
            MenuChoice::Delete => self.delete(),
            MenuChoice::GetById => self.get_by_id(),
            MenuChoice::GetByIsbn => self.get_by_isbn(),
            MenuChoice::Exit => Ok(()),
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "{TITLE}")?;
        writeln!(self.output, "1. Display All Books")?;
        writeln!(self.output, "2. Search Books")?;
        writeln!(self.output, "3. Add Book")?;
        writeln!(self.output, "4. Update Book")?;
        writeln!(self.output, "5. Delete Book")?;
        writeln!(self.output, "6. Get Book by ID")?;
        writeln!(self.output, "7. Get Book by ISBN")?;
        writeln!(self.output, "0. Exit")?;
        write!(self.output, "\nEnter your choice: ")?;
        self.output.flush()
    }

    fn display_all(&mut self) -> CommandResult {
        writeln!(self.output, "=== All Books ===")?;
        let books = self.service.get_all()?;
        if books.is_empty() {
            writeln!(self.output, "No books found.")?;
            return Ok(());
        }
        for book in &books {
            self.display_book(book)?;
        }
        Ok(())
    }

    fn search(&mut self) -> CommandResult {
        writeln!(self.output, "=== Search Books ===")?;
        let term = self.prompt("Enter search term (title, author, or ISBN): ")?;

        let books = self.service.search(&term)?;
        if books.is_empty() {
            writeln!(self.output, "No books found matching your search.")?;
            return Ok(());
        }

        writeln!(self.output, "\nFound {} book(s):", books.len())?;
        for book in &books {
            self.display_book(book)?;
        }
        Ok(())
    }

    fn add(&mut self) -> CommandResult {
        writeln!(self.output, "=== Add New Book ===")?;
        let title = self.prompt("Title: ")?;
        let author = self.prompt("Author: ")?;
        let isbn = self.prompt("ISBN: ")?;
        let year_text = self.prompt("Publication Year: ")?;
        let Some(year) = parse_year(&year_text) else {
            writeln!(self.output, "Invalid publication year. Book not added.")?;
            return Ok(());
        };

        let added = self
            .service
            .add(&BookInput::new(title, author, isbn, year))?;
        writeln!(self.output, "\nBook added successfully:")?;
        self.display_book(&added)
    }

    fn update(&mut self) -> CommandResult {
        writeln!(self.output, "=== Update Book ===")?;
        let Some(id) = self.prompt_id("Enter book ID to update: ")? else {
            return Ok(());
        };

        let existing = self.service.get_by_id(id)?;
        writeln!(self.output, "\nCurrent book details:")?;
        self.display_book(&existing)?;

        let title = self.prompt_or(&format!("Title ({}): ", existing.title), &existing.title)?;
        let author = self.prompt_or(&format!("Author ({}): ", existing.author), &existing.author)?;
        let isbn = self.prompt_or(&format!("ISBN ({}): ", existing.isbn), &existing.isbn)?;
        let year_text = self.prompt(&format!(
            "Publication Year ({}): ",
            existing.publication_year
        ))?;
        let year = if year_text.is_empty() {
            existing.publication_year
        } else if let Some(year) = parse_year(&year_text) {
            year
        } else {
            writeln!(self.output, "Invalid publication year. Book not updated.")?;
            return Ok(());
        };

        let updated = self
            .service
            .update(id, &BookInput::new(title, author, isbn, year))?;
        writeln!(self.output, "\nBook updated successfully:")?;
        self.display_book(&updated)
    }

    fn delete(&mut self) -> CommandResult {
        writeln!(self.output, "=== Delete Book ===")?;
        let Some(id) = self.prompt_id("Enter book ID to delete: ")? else {
            return Ok(());
        };

        let book = self.service.get_by_id(id)?;
        writeln!(self.output, "\nBook to delete:")?;
        self.display_book(&book)?;

        let confirmation =
            self.prompt("\nAre you sure you want to delete this book? (y/N): ")?;
        if confirmation.eq_ignore_ascii_case("y") {
            if self.service.delete(id)? {
                writeln!(self.output, "Book deleted successfully.")?;
            } else {
                writeln!(self.output, "Book was already removed.")?;
            }
        } else {
            writeln!(self.output, "Delete cancelled.")?;
        }
        Ok(())
    }

    fn get_by_id(&mut self) -> CommandResult {
        writeln!(self.output, "=== Get Book by ID ===")?;
        let Some(id) = self.prompt_id("Enter book ID: ")? else {
            return Ok(());
        };
        let book = self.service.get_by_id(id)?;
        self.display_book(&book)
    }

    fn get_by_isbn(&mut self) -> CommandResult {
        writeln!(self.output, "=== Get Book by ISBN ===")?;
        let isbn = self.prompt("Enter ISBN: ")?;
        let book = self.service.get_by_isbn(&isbn)?;
        self.display_book(&book)
    }

    fn display_book(&mut self, book: &BookView) -> CommandResult {
        writeln!(self.output, "ID: {}", book.id)?;
        writeln!(self.output, "Title: {}", book.title)?;
        writeln!(self.output, "Author: {}", book.author)?;
        writeln!(self.output, "ISBN: {}", book.isbn)?;
        writeln!(self.output, "Publication Year: {}", book.publication_year)?;
        writeln!(self.output, "Created: {}", book.created_at_display())?;
        writeln!(self.output, "Updated: {}", book.updated_at_display())?;
        writeln!(self.output, "{}", "-".repeat(RECORD_SEPARATOR_WIDTH))?;
        Ok(())
    }

    fn prompt_id(&mut self, label: &str) -> io::Result<Option<BookId>> {
        let text = self.prompt(label)?;
        match Uuid::parse_str(&text) {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.output, "Invalid ID format.")?;
                Ok(None)
            }
        }
    }

    fn prompt_or(&mut self, label: &str, current: &str) -> io::Result<String> {
        let value = self.prompt(label)?;
        if value.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(value)
        }
    }

    /// Prints `label` and reads one sanitized answer; end of input reads as "".
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(sanitize_input(&line)))
    }
}
