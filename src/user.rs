use std::fmt;

/// A registered library user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identity key, never changes after registration
    user_id: String,
    /// Display name
    name: String,
    /// ISBNs currently held, in borrow order
    borrowed_isbns: Vec<String>,
}

impl User {
    /// Create a user holding no books
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), name: name.into(), borrowed_isbns: Vec::new() }
    }

    /// Identity key
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// ISBNs currently held, in borrow order
    #[must_use]
    pub fn borrowed_isbns(&self) -> &[String] {
        &self.borrowed_isbns
    }

    /// Whether this user currently holds the given book
    #[must_use]
    pub fn holds(&self, isbn: &str) -> bool {
        self.borrowed_isbns.iter().any(|held| held == isbn)
    }

    /// Whether this user holds any book
    #[must_use]
    pub fn has_loans(&self) -> bool {
        !self.borrowed_isbns.is_empty()
    }

    /// Record a loan. Does nothing if the isbn is already held.
    pub(crate) fn take(&mut self, isbn: &str) {
        if !self.holds(isbn) {
            self.borrowed_isbns.push(isbn.to_string());
        }
    }

    /// Drop a loan, returning whether the isbn was held
    pub(crate) fn give_back(&mut self, isbn: &str) -> bool {
        let before = self.borrowed_isbns.len();
        self.borrowed_isbns.retain(|held| held != isbn);
        self.borrowed_isbns.len() != before
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - borrowed: {}", self.name, self.user_id, self.borrowed_isbns.len())
    }
}
