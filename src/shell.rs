//! Menu-driven front end over a [`Library`].
//!
//! One selection per line; each selection prompts for its fields on the
//! following lines, runs exactly one catalog operation and prints either the
//! result or `Error: <message>`. Bad commands never end the loop; only the
//! exit selection or end of input does.

use std::{
    fmt,
    io::{self, BufRead, Write},
    str::FromStr,
};

use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use crate::{book::Book, catalog::Library, error::CatalogError, user::User};

/// A menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Print every book
    ListBooks,
    /// Print books on the shelf
    ListAvailable,
    /// Print books lent out
    ListBorrowed,
    /// Search titles by substring
    SearchTitle,
    /// Look up one book by ISBN
    FindBook,
    /// Add a new book
    AddBook,
    /// Change a book's title and author
    UpdateBook,
    /// Remove an available book
    RemoveBook,
    /// Register a new user
    RegisterUser,
    /// Change a user's name
    RenameUser,
    /// Remove a user holding nothing
    RemoveUser,
    /// Print every user
    ListUsers,
    /// Print the books one user holds
    UserLoans,
    /// Lend a book to a user
    Borrow,
    /// Take a book back from its holder
    Return,
    /// Print the loan history
    History,
    /// Leave the shell
    Exit,
}

impl MenuChoice {
    /// Menu entries in display order, with their selection keys
    pub const ALL: [(&'static str, Self); 17] = [
        ("1", Self::ListBooks),
        ("2", Self::ListAvailable),
        ("3", Self::ListBorrowed),
        ("4", Self::SearchTitle),
        ("5", Self::FindBook),
        ("6", Self::AddBook),
        ("7", Self::UpdateBook),
        ("8", Self::RemoveBook),
        ("9", Self::RegisterUser),
        ("10", Self::RenameUser),
        ("11", Self::RemoveUser),
        ("12", Self::ListUsers),
        ("13", Self::UserLoans),
        ("14", Self::Borrow),
        ("15", Self::Return),
        ("16", Self::History),
        ("0", Self::Exit),
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ListBooks => "List all books",
            Self::ListAvailable => "List available books",
            Self::ListBorrowed => "List borrowed books",
            Self::SearchTitle => "Search book by title",
            Self::FindBook => "Find book by ISBN",
            Self::AddBook => "Add book",
            Self::UpdateBook => "Update book",
            Self::RemoveBook => "Remove book",
            Self::RegisterUser => "Register user",
            Self::RenameUser => "Rename user",
            Self::RemoveUser => "Remove user",
            Self::ListUsers => "List users",
            Self::UserLoans => "Show user loans",
            Self::Borrow => "Borrow book",
            Self::Return => "Return book",
            Self::History => "Show loan history",
            Self::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// The input line matched no menu entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid choice")]
pub struct InvalidChoice;

impl FromStr for MenuChoice {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("exit") || s.eq_ignore_ascii_case("quit") {
            return Ok(Self::Exit);
        }
        Self::ALL.iter().find(|(key, _)| *key == s).map(|(_, choice)| *choice).ok_or(InvalidChoice)
    }
}

/// Why a single command did not complete
#[derive(Debug, Error)]
enum CommandError {
    /// The catalog rejected the operation
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A required field was left blank
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Input ran out in the middle of a prompt
    #[error("end of input")]
    EndOfInput,

    /// Reading or writing the terminal failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Interactive shell owning the catalog it drives
#[derive(Debug)]
pub struct Shell<R, W> {
    /// The catalog every command operates on
    library: Library,
    /// Source of selections and field values
    input: R,
    /// Destination of menus, prompts and results
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Wrap a catalog with the given input and output
    #[must_use]
    pub fn new(library: Library, input: R, output: W) -> Self {
        Self { library, input, output }
    }

    /// Take the catalog and the output back
    pub fn into_parts(self) -> (Library, W) {
        (self.library, self.output)
    }

    /// Run the menu loop until the user exits or input ends
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(MenuChoice::Exit) => break,
                Ok(choice) => choice,
                Err(e) => {
                    writeln!(self.output, "{}", e.to_string().yellow())?;
                    continue;
                }
            };

            debug!(%choice, "menu selection");
            match self.dispatch(choice) {
                Ok(()) => {}
                Err(CommandError::EndOfInput) => {
                    writeln!(self.output)?;
                    break;
                }
                Err(CommandError::Io(e)) => return Err(e),
                Err(e) => writeln!(self.output, "{}", format!("Error: {e}").red())?,
            }
        }
        writeln!(self.output, "{}", "Bye!".green())?;
        self.output.flush()
    }

    /// Run one catalog operation for a selection
    fn dispatch(&mut self, choice: MenuChoice) -> Result<(), CommandError> {
        match choice {
            MenuChoice::ListBooks => {
                let books = self.library.list_all();
                self.print_books(&books, "No books in library")
            }
            MenuChoice::ListAvailable => {
                let books = self.library.list_available();
                self.print_books(&books, "No available books")
            }
            MenuChoice::ListBorrowed => {
                let books = self.library.list_borrowed();
                self.print_books(&books, "No borrowed books")
            }
            MenuChoice::SearchTitle => {
                let query = self.prompt_raw("Enter title query")?;
                let books = self.library.search_by_title(&query);
                self.print_books(&books, "No matches found")
            }
            MenuChoice::FindBook => {
                let isbn = self.required("ISBN")?;
                match self.library.find_by_isbn(&isbn) {
                    Some(book) => {
                        let line = format!("{book}\n{}", book.state().get_description());
                        self.say(&line)
                    }
                    None => self.say(&format!("No book with ISBN {isbn}")),
                }
            }
            MenuChoice::AddBook => {
                let isbn = self.required("ISBN")?;
                let title = self.required("Title")?;
                let author = self.prompt("Author")?;
                self.library.add_book(Book::new(isbn, title, author))?;
                self.confirm("Book added.")
            }
            MenuChoice::UpdateBook => {
                let isbn = self.required("ISBN")?;
                let title = self.required("Title")?;
                let author = self.prompt("Author")?;
                self.library.update_book(&isbn, &title, &author)?;
                self.confirm("Book updated.")
            }
            MenuChoice::RemoveBook => {
                let isbn = self.required("ISBN")?;
                if self.library.remove_book(&isbn)? {
                    self.confirm("Book removed.")
                } else {
                    self.say(&format!("No book with ISBN {isbn}"))
                }
            }
            MenuChoice::RegisterUser => {
                let user_id = self.required("User ID")?;
                let name = self.prompt("Name")?;
                self.library.register_user(User::new(user_id, name))?;
                self.confirm("User registered.")
            }
            MenuChoice::RenameUser => {
                let user_id = self.required("User ID")?;
                let name = self.prompt("Name")?;
                self.library.rename_user(&user_id, &name)?;
                self.confirm("User renamed.")
            }
            MenuChoice::RemoveUser => {
                let user_id = self.required("User ID")?;
                if self.library.remove_user(&user_id)? {
                    self.confirm("User removed.")
                } else {
                    self.say(&format!("No user with ID {user_id}"))
                }
            }
            MenuChoice::ListUsers => {
                let users = self.library.list_all_users();
                if users.is_empty() {
                    return self.say("No users");
                }
                for user in &users {
                    writeln!(self.output, "{user}")?;
                }
                Ok(())
            }
            MenuChoice::UserLoans => {
                let user_id = self.required("User ID")?;
                let books = self.library.books_held_by(&user_id)?;
                self.print_books(&books, &format!("{user_id} holds no books"))
            }
            MenuChoice::Borrow => {
                let user_id = self.required("User ID")?;
                let isbn = self.required("Book ISBN")?;
                self.library.borrow(&user_id, &isbn)?;
                self.confirm("Book borrowed.")
            }
            MenuChoice::Return => {
                let user_id = self.required("User ID")?;
                let isbn = self.required("Book ISBN")?;
                self.library.return_book(&user_id, &isbn)?;
                self.confirm("Book returned.")
            }
            MenuChoice::History => {
                let records = self.library.loan_history().to_vec();
                if records.is_empty() {
                    return self.say("No loans recorded");
                }
                for record in &records {
                    writeln!(self.output, "{record}")?;
                }
                Ok(())
            }
            // Handled by the loop before dispatch
            MenuChoice::Exit => Ok(()),
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", "--- Mini Library Management ---".green().bold())?;
        for (key, choice) in MenuChoice::ALL {
            writeln!(self.output, "{key}. {choice}")?;
        }
        write!(self.output, "Choose: ")?;
        self.output.flush()
    }

    fn print_books(&mut self, books: &[Book], when_empty: &str) -> Result<(), CommandError> {
        if books.is_empty() {
            return self.say(when_empty);
        }
        for book in books {
            writeln!(self.output, "{book}")?;
        }
        Ok(())
    }

    fn say(&mut self, line: &str) -> Result<(), CommandError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    fn confirm(&mut self, line: &str) -> Result<(), CommandError> {
        writeln!(self.output, "{}", line.green())?;
        Ok(())
    }

    /// Next input line without its line ending, or `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask for a field and return the answer as typed
    fn prompt_raw(&mut self, label: &str) -> Result<String, CommandError> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        self.read_line()?.ok_or(CommandError::EndOfInput)
    }

    /// Ask for a field and return the trimmed answer
    fn prompt(&mut self, label: &str) -> Result<String, CommandError> {
        Ok(self.prompt_raw(label)?.trim().to_string())
    }

    /// Like [`Self::prompt`], but a blank answer is rejected
    fn required(&mut self, label: &'static str) -> Result<String, CommandError> {
        let value = self.prompt(label)?;
        if value.is_empty() {
            return Err(CommandError::EmptyField(label));
        }
        Ok(value)
    }
}
