//! Error types returned by the catalog and by seed loading.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A catalog book, keyed by ISBN
    Book,
    /// A registered user, keyed by user id
    User,
}

impl Entity {
    /// Subject of the duplicate key message
    fn duplicate_subject(self) -> &'static str {
        match self {
            Self::Book => "A book with same ISBN",
            Self::User => "User",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book => f.write_str("Book"),
            Self::User => f.write_str("User"),
        }
    }
}

/// Operations rejected by the borrow/return state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateViolation {
    /// A borrowed book cannot leave the catalog
    #[error("Cannot remove a borrowed book: {isbn}")]
    BookBorrowed {
        /// ISBN of the borrowed book
        isbn: String,
    },

    /// A user still holding books cannot be removed
    #[error("User has borrowed books: {user_id}")]
    OutstandingLoans {
        /// Id of the user
        user_id: String,
    },

    /// Adding a book that is already lent out elsewhere
    #[error("A new book must be available: {isbn}")]
    NewBookBorrowed {
        /// ISBN of the book
        isbn: String,
    },

    /// Registering a user that already holds books
    #[error("A new user must not hold borrowed books: {user_id}")]
    NewUserHasLoans {
        /// Id of the user
        user_id: String,
    },

    /// Returning a book that is on the shelf
    #[error("Book is not borrowed: {isbn}")]
    NotBorrowed {
        /// ISBN of the book
        isbn: String,
    },

    /// Returning a book that somebody else holds
    #[error("This user didn't borrow that book (not borrowed by this user): {isbn}")]
    NotBorrowedByUser {
        /// Id of the user attempting the return
        user_id: String,
        /// ISBN of the book
        isbn: String,
    },
}

/// Failures signalled by [`crate::Library`] operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A record with the same identity key already exists
    #[error("{} already exists: {key}", .entity.duplicate_subject())]
    DuplicateKey {
        /// Kind of record
        entity: Entity,
        /// The clashing key
        key: String,
    },

    /// Reference to an unknown ISBN or user id
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record
        entity: Entity,
        /// The missing key
        key: String,
    },

    /// Borrowing a book that is already lent out
    #[error("Book already borrowed: {isbn}")]
    AlreadyBorrowed {
        /// ISBN of the book
        isbn: String,
    },

    /// The operation is not allowed in the current loan state
    #[error(transparent)]
    InvalidState(#[from] StateViolation),
}

impl CatalogError {
    pub(crate) fn book_not_found(isbn: &str) -> Self {
        Self::NotFound { entity: Entity::Book, key: isbn.to_string() }
    }

    pub(crate) fn user_not_found(user_id: &str) -> Self {
        Self::NotFound { entity: Entity::User, key: user_id.to_string() }
    }
}

/// Errors raised while loading seed data at start-up
#[derive(Debug, Error)]
pub enum SeedError {
    /// The fixture file could not be read
    #[error("failed to read seed file at '{}': {source}", .path.display())]
    Io {
        /// Path to the fixture
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The fixture is not valid JSON or is missing fields
    #[error("invalid seed JSON in '{}': {source}", .path.display())]
    Parse {
        /// Path to the fixture
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// A seeded record was rejected by the catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
