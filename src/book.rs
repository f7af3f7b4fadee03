use std::fmt;

/// Loan status of a single book
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum BookState {
    /// Book is on the shelf and can be borrowed
    #[default]
    Available,
    /// Book is held by the user with the given id
    Borrowed {
        /// Id of the user holding the book
        by: String,
    },
}

impl BookState {
    /// Get a human-readable description of the current state
    #[must_use]
    pub fn get_description(&self) -> String {
        match self {
            Self::Available => "Book is available for borrowing".to_string(),
            Self::Borrowed { by } => format!("Book is borrowed by {by}"),
        }
    }
}

/// A catalog entry, keyed by its ISBN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Identity key, never changes after creation
    isbn: String,
    /// Display title
    title: String,
    /// Author name
    author: String,
    /// Current loan status
    state: BookState,
}

impl Book {
    /// Create an available book
    #[must_use]
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            state: BookState::Available,
        }
    }

    /// Identity key
    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// Display title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Author name
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Replace the author
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    /// Current loan status
    #[must_use]
    pub fn state(&self) -> &BookState {
        &self.state
    }

    /// Whether the book is currently lent out
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.state, BookState::Borrowed { .. })
    }

    /// Id of the user holding this book, if any
    #[must_use]
    pub fn borrowed_by(&self) -> Option<&str> {
        match &self.state {
            BookState::Available => None,
            BookState::Borrowed { by } => Some(by),
        }
    }

    /// Only the catalog moves a book between states, since the holder's
    /// borrowed set has to change in the same call.
    pub(crate) fn set_state(&mut self, state: BookState) {
        self.state = state;
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_borrowed() { "(borrowed)" } else { "(available)" };
        write!(f, "[{}] {} by {} {status}", self.isbn, self.title, self.author)
    }
}
