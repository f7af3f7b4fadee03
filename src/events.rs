use std::fmt;

/// Events that move a book between available and borrowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanEvent {
    /// A user takes an available book
    Borrow,
    /// The holder brings a borrowed book back
    Return,
}

impl fmt::Display for LoanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrow => f.write_str("borrow"),
            Self::Return => f.write_str("return"),
        }
    }
}
