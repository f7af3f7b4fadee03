//! Library catalog with a borrow/return state machine.
//!
//! This crate keeps books and registered users in memory, tracks which user
//! holds which book, and provides a menu-driven shell over the catalog.

pub mod book;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod events;
pub mod history;
pub mod observers;
pub mod seed;
pub mod shell;
pub mod user;

pub use book::{Book, BookState};
pub use catalog::Library;
pub use error::{CatalogError, Entity, SeedError, StateViolation};
pub use events::LoanEvent;
pub use history::{LoanRecord, TimeStamp};
pub use observers::{LoanLogger, LoanObserver};
pub use seed::SeedData;
pub use shell::Shell;
pub use user::User;
