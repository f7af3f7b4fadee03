//! Records loaded into a fresh catalog at start-up.
//!
//! The fixture format is a JSON object with `books` and `users` arrays.
//! Seeded books start available and seeded users hold nothing; the file is
//! only ever read.

use std::{fs, path::Path};

use serde::Deserialize;
use tracing::info;

use crate::{book::Book, catalog::Library, error::SeedError, user::User};

/// A book entry in a seed fixture
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookSeed {
    /// Identity key
    pub isbn: String,
    /// Display title
    pub title: String,
    /// Author name
    pub author: String,
}

/// A user entry in a seed fixture
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserSeed {
    /// Identity key
    pub user_id: String,
    /// Display name
    pub name: String,
}

/// Books and users to load into a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedData {
    /// Books to add, all available
    #[serde(default)]
    pub books: Vec<BookSeed>,
    /// Users to register, holding nothing
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

impl SeedData {
    /// The sample catalog the shell starts with when no fixture is given
    #[must_use]
    pub fn sample() -> Self {
        let book = |isbn: &str, title: &str, author: &str| BookSeed {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
        };
        let user = |user_id: &str, name: &str| UserSeed {
            user_id: user_id.to_string(),
            name: name.to_string(),
        };
        Self {
            books: vec![
                book("978-0134685991", "Effective Java", "Joshua Bloch"),
                book("978-0596009205", "Head First Java", "Kathy Sierra"),
                book("978-1617291999", "Java 8 in Action", "Raoul-Gabriel Urma"),
            ],
            users: vec![user("u1001", "Alice"), user("u1002", "Bob")],
        }
    }

    /// Read a JSON fixture
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` if the file cannot be read, or
    /// `SeedError::Parse` if it is not a valid fixture.
    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| SeedError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&contents)
            .map_err(|source| SeedError::Parse { path: path.to_path_buf(), source })
    }

    /// Add every book and register every user, stopping at the first clash
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Catalog` if a key is already present in `library`
    /// or repeated in the fixture.
    pub fn apply(self, library: &mut Library) -> Result<(), SeedError> {
        let (books, users) = (self.books.len(), self.users.len());
        for seed in self.books {
            library.add_book(Book::new(seed.isbn, seed.title, seed.author))?;
        }
        for seed in self.users {
            library.register_user(User::new(seed.user_id, seed.name))?;
        }
        info!(books, users, "seed data loaded");
        Ok(())
    }
}
