use std::fmt;

use tracing::{debug, warn};

use crate::{
    book::{Book, BookState},
    error::{CatalogError, Entity, StateViolation},
    events::LoanEvent,
    history::{DEFAULT_HISTORY_SIZE, LoanHistory, LoanRecord, TimeStamp},
    observers::LoanObserver,
    user::User,
};

/// In-memory library catalog: books, users and the loans between them.
///
/// Every borrowed book is held by exactly one user, and every isbn in a
/// user's borrowed set names a book borrowed by that user. Each mutating
/// call checks all of its preconditions before touching either side of that
/// relation, so a failed call leaves the catalog unchanged.
pub struct Library {
    /// Books in insertion order
    books: Vec<Book>,
    /// Users in registration order
    users: Vec<User>,
    /// Successful borrow/return transitions
    history: LoanHistory,
    /// Registered loan observers
    observers: Vec<Box<dyn LoanObserver>>,
}

// Manual implementation of Debug for Library
impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("books", &self.books)
            .field("users", &self.users)
            .field("history", &self.history)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// Create an empty catalog with the default history bound
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_size(DEFAULT_HISTORY_SIZE)
    }

    /// Create an empty catalog keeping at most `max_history_size` loan records
    #[must_use]
    pub fn with_history_size(max_history_size: usize) -> Self {
        Self {
            books: Vec::new(),
            users: Vec::new(),
            history: LoanHistory::new(max_history_size),
            observers: Vec::new(),
        }
    }

    /// Register an observer to be notified of applied loans
    pub fn register_observer(&mut self, observer: Box<dyn LoanObserver>) {
        self.observers.push(observer);
    }

    // Book operations

    /// Add an available book to the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateKey` if a book with the same isbn exists,
    /// or `CatalogError::InvalidState` if the book is marked borrowed, since no
    /// user here holds it.
    pub fn add_book(&mut self, book: Book) -> Result<(), CatalogError> {
        if self.find_by_isbn(book.isbn()).is_some() {
            return Err(CatalogError::DuplicateKey {
                entity: Entity::Book,
                key: book.isbn().to_string(),
            });
        }
        if book.is_borrowed() {
            return Err(StateViolation::NewBookBorrowed { isbn: book.isbn().to_string() }.into());
        }
        debug!(isbn = book.isbn(), title = book.title(), "book added");
        self.books.push(book);
        Ok(())
    }

    /// Remove an available book. Returns `Ok(false)` if the isbn is unknown.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidState` if the book is currently borrowed.
    pub fn remove_book(&mut self, isbn: &str) -> Result<bool, CatalogError> {
        let Some(pos) = self.books.iter().position(|b| b.isbn() == isbn) else {
            return Ok(false);
        };
        if self.books.get(pos).is_some_and(Book::is_borrowed) {
            return Err(StateViolation::BookBorrowed { isbn: isbn.to_string() }.into());
        }
        self.books.remove(pos);
        debug!(isbn, "book removed");
        Ok(true)
    }

    /// Replace the title and author of a book
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the isbn is unknown.
    pub fn update_book(
        &mut self,
        isbn: &str,
        title: &str,
        author: &str,
    ) -> Result<(), CatalogError> {
        let book = self.book_mut(isbn)?;
        book.set_title(title);
        book.set_author(author);
        debug!(isbn, title, author, "book updated");
        Ok(())
    }

    /// Look up a book by ISBN
    #[must_use]
    pub fn find_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.isbn() == isbn)
    }

    /// Case-insensitive substring search on titles, in insertion order
    #[must_use]
    pub fn search_by_title(&self, query: &str) -> Vec<Book> {
        let query = query.to_lowercase();
        self.books.iter().filter(|b| b.title().to_lowercase().contains(&query)).cloned().collect()
    }

    /// Every book, in insertion order
    #[must_use]
    pub fn list_all(&self) -> Vec<Book> {
        self.books.clone()
    }

    /// Books on the shelf, in insertion order
    #[must_use]
    pub fn list_available(&self) -> Vec<Book> {
        self.books.iter().filter(|b| !b.is_borrowed()).cloned().collect()
    }

    /// Books lent out, in insertion order
    #[must_use]
    pub fn list_borrowed(&self) -> Vec<Book> {
        self.books.iter().filter(|b| b.is_borrowed()).cloned().collect()
    }

    // User operations

    /// Register a new user holding no books
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateKey` if the user id is taken, or
    /// `CatalogError::InvalidState` if the user already holds books.
    pub fn register_user(&mut self, user: User) -> Result<(), CatalogError> {
        if self.find_by_id(user.user_id()).is_some() {
            return Err(CatalogError::DuplicateKey {
                entity: Entity::User,
                key: user.user_id().to_string(),
            });
        }
        if user.has_loans() {
            return Err(StateViolation::NewUserHasLoans { user_id: user.user_id().to_string() }
                .into());
        }
        debug!(user_id = user.user_id(), name = user.name(), "user registered");
        self.users.push(user);
        Ok(())
    }

    /// Remove a user holding no books. Returns `Ok(false)` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidState` if the user still holds books.
    pub fn remove_user(&mut self, user_id: &str) -> Result<bool, CatalogError> {
        let Some(pos) = self.users.iter().position(|u| u.user_id() == user_id) else {
            return Ok(false);
        };
        if self.users.get(pos).is_some_and(User::has_loans) {
            return Err(StateViolation::OutstandingLoans { user_id: user_id.to_string() }.into());
        }
        self.users.remove(pos);
        debug!(user_id, "user removed");
        Ok(true)
    }

    /// Change a user's display name
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the user id is unknown.
    pub fn rename_user(&mut self, user_id: &str, name: &str) -> Result<(), CatalogError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.user_id() == user_id)
            .ok_or_else(|| CatalogError::user_not_found(user_id))?;
        user.set_name(name);
        debug!(user_id, name, "user renamed");
        Ok(())
    }

    /// Look up a user by id
    #[must_use]
    pub fn find_by_id(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_id() == user_id)
    }

    /// Every user, in registration order
    #[must_use]
    pub fn list_all_users(&self) -> Vec<User> {
        self.users.clone()
    }

    /// Books a user currently holds, in the order they were borrowed
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the user id is unknown.
    pub fn books_held_by(&self, user_id: &str) -> Result<Vec<Book>, CatalogError> {
        let user = self.find_by_id(user_id).ok_or_else(|| CatalogError::user_not_found(user_id))?;
        Ok(user
            .borrowed_isbns()
            .iter()
            .filter_map(|isbn| self.find_by_isbn(isbn))
            .cloned()
            .collect())
    }

    // Borrow/return

    /// Lend an available book to a user
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the user or the book is unknown
    /// (user checked first), or `CatalogError::AlreadyBorrowed` if the book
    /// is already lent out.
    pub fn borrow(&mut self, user_id: &str, isbn: &str) -> Result<(), CatalogError> {
        self.apply_borrow(user_id, isbn)
            .inspect_err(|error| warn!(%error, user_id, isbn, "borrow rejected"))
    }

    /// Take a borrowed book back from the user holding it
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the user or the book is unknown, or
    /// `CatalogError::InvalidState` if the book is not borrowed or is held by
    /// somebody else.
    pub fn return_book(&mut self, user_id: &str, isbn: &str) -> Result<(), CatalogError> {
        self.apply_return(user_id, isbn)
            .inspect_err(|error| warn!(%error, user_id, isbn, "return rejected"))
    }

    /// Applied loan records, oldest first
    #[must_use]
    pub fn loan_history(&self) -> &[LoanRecord] {
        self.history.records()
    }

    fn apply_borrow(&mut self, user_id: &str, isbn: &str) -> Result<(), CatalogError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.user_id() == user_id)
            .ok_or_else(|| CatalogError::user_not_found(user_id))?;
        let book = self
            .books
            .iter_mut()
            .find(|b| b.isbn() == isbn)
            .ok_or_else(|| CatalogError::book_not_found(isbn))?;
        if book.is_borrowed() {
            return Err(CatalogError::AlreadyBorrowed { isbn: isbn.to_string() });
        }

        book.set_state(BookState::Borrowed { by: user_id.to_string() });
        user.take(isbn);

        self.record(LoanEvent::Borrow, user_id, isbn);
        Ok(())
    }

    fn apply_return(&mut self, user_id: &str, isbn: &str) -> Result<(), CatalogError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.user_id() == user_id)
            .ok_or_else(|| CatalogError::user_not_found(user_id))?;
        let book = self
            .books
            .iter_mut()
            .find(|b| b.isbn() == isbn)
            .ok_or_else(|| CatalogError::book_not_found(isbn))?;
        if !book.is_borrowed() {
            return Err(StateViolation::NotBorrowed { isbn: isbn.to_string() }.into());
        }
        if !user.holds(isbn) {
            return Err(StateViolation::NotBorrowedByUser {
                user_id: user_id.to_string(),
                isbn: isbn.to_string(),
            }
            .into());
        }

        user.give_back(isbn);
        book.set_state(BookState::Available);

        self.record(LoanEvent::Return, user_id, isbn);
        Ok(())
    }

    /// Append to the history and notify observers
    fn record(&mut self, event: LoanEvent, user_id: &str, isbn: &str) {
        let record = LoanRecord {
            event,
            isbn: isbn.to_string(),
            user_id: user_id.to_string(),
            at: TimeStamp::now(),
        };
        for observer in &self.observers {
            observer.on_loan(&record);
        }
        self.history.push(record);
    }

    fn book_mut(&mut self, isbn: &str) -> Result<&mut Book, CatalogError> {
        self.books
            .iter_mut()
            .find(|b| b.isbn() == isbn)
            .ok_or_else(|| CatalogError::book_not_found(isbn))
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let borrowed = self.books.iter().filter(|b| b.is_borrowed()).count();
        write!(
            f,
            "{} books ({borrowed} borrowed), {} users",
            self.books.len(),
            self.users.len()
        )
    }
}

// Include tests module
#[cfg(test)]
mod tests;
