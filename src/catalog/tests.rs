#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{cell::RefCell, rc::Rc};

use crate::{
    book::{Book, BookState},
    catalog::Library,
    error::{CatalogError, Entity, StateViolation},
    events::LoanEvent,
    history::LoanRecord,
    observers::LoanObserver,
    user::User,
};

/// Helper function to set up a small catalog
fn setup_test_library() -> Library {
    let mut library = Library::new();
    library.add_book(Book::new("978-1", "Title A", "Author A")).unwrap();
    library.add_book(Book::new("978-2", "Rust in Action", "Tim McNamara")).unwrap();
    library.add_book(Book::new("978-3", "Programming RUST", "Jim Blandy")).unwrap();
    library.register_user(User::new("u1", "Alice")).unwrap();
    library.register_user(User::new("u2", "Bob")).unwrap();
    library
}

/// Asserts the borrow relation is a bijection between borrowed books and
/// (user, isbn) pairs
fn assert_loans_consistent(library: &Library) {
    for book in library.list_all() {
        let holders: Vec<User> = library
            .list_all_users()
            .into_iter()
            .filter(|u| u.holds(book.isbn()))
            .collect();
        match book.borrowed_by() {
            Some(by) => {
                assert_eq!(holders.len(), 1, "{} should have one holder", book.isbn());
                assert_eq!(holders.first().map(User::user_id), Some(by));
            }
            None => assert!(holders.is_empty(), "{} is available but held", book.isbn()),
        }
    }
    for user in library.list_all_users() {
        for isbn in user.borrowed_isbns() {
            let book = library.find_by_isbn(isbn).expect("held isbn should exist");
            assert_eq!(book.borrowed_by(), Some(user.user_id()));
        }
    }
}

/// Observer that keeps every record it is shown
#[derive(Debug, Default, Clone)]
struct RecordingObserver {
    seen: Rc<RefCell<Vec<LoanRecord>>>,
}

impl LoanObserver for RecordingObserver {
    fn on_loan(&self, record: &LoanRecord) {
        self.seen.borrow_mut().push(record.clone());
    }
}

#[test]
fn test_added_book_is_found() {
    let library = setup_test_library();
    let book = library.find_by_isbn("978-1").expect("book should exist");
    assert_eq!(book.title(), "Title A");
    assert_eq!(book.author(), "Author A");
    assert!(!book.is_borrowed());
}

#[test]
fn test_duplicate_isbn_rejected_and_catalog_unchanged() {
    let mut library = setup_test_library();
    let before = library.list_all();

    let result = library.add_book(Book::new("978-1", "Other", "Someone"));
    assert_eq!(
        result,
        Err(CatalogError::DuplicateKey { entity: Entity::Book, key: "978-1".to_string() })
    );
    assert_eq!(library.list_all(), before);
    assert_eq!(library.find_by_isbn("978-1").map(Book::title), Some("Title A"));
}

#[test]
fn test_duplicate_user_rejected() {
    let mut library = setup_test_library();
    let result = library.register_user(User::new("u1", "Impostor"));
    assert!(matches!(result, Err(CatalogError::DuplicateKey { entity: Entity::User, .. })));
    assert_eq!(library.list_all_users().len(), 2);
    assert_eq!(library.find_by_id("u1").map(User::name), Some("Alice"));
}

#[test]
fn test_user_snapshot_with_loans_cannot_be_registered() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();
    let snapshot = library.find_by_id("u1").unwrap().clone();
    library.return_book("u1", "978-1").unwrap();
    assert_eq!(library.remove_user("u1"), Ok(true));

    let result = library.register_user(snapshot);
    assert_eq!(
        result,
        Err(CatalogError::InvalidState(StateViolation::NewUserHasLoans {
            user_id: "u1".to_string()
        }))
    );
    assert!(library.find_by_id("u1").is_none());
    assert_loans_consistent(&library);

    // A fresh user under the same id is fine
    library.register_user(User::new("u1", "Alice")).unwrap();
    library.borrow("u1", "978-1").unwrap();
    assert_loans_consistent(&library);
}

#[test]
fn test_borrowed_book_from_elsewhere_cannot_be_added() {
    let mut other = setup_test_library();
    other.borrow("u1", "978-1").unwrap();
    let borrowed = other.list_borrowed();

    let mut library = Library::new();
    for book in borrowed {
        let result = library.add_book(book);
        assert_eq!(
            result,
            Err(CatalogError::InvalidState(StateViolation::NewBookBorrowed {
                isbn: "978-1".to_string()
            }))
        );
    }
    assert!(library.list_all().is_empty());
    assert_loans_consistent(&library);

    // Copies of available books are accepted
    for book in other.list_available() {
        library.add_book(book).unwrap();
    }
    assert_eq!(library.list_available().len(), 2);
    assert_loans_consistent(&library);
}

#[test]
fn test_search_by_title_is_case_insensitive_and_ordered() {
    let library = setup_test_library();
    let found: Vec<String> =
        library.search_by_title("rust").iter().map(|b| b.isbn().to_string()).collect();
    assert_eq!(found, ["978-2", "978-3"]);

    assert!(library.search_by_title("cobol").is_empty());
    assert_eq!(library.search_by_title("").len(), 3);
}

#[test]
fn test_snapshots_are_independent_copies() {
    let library = setup_test_library();
    let mut books = library.list_all();
    books.clear();
    let mut users = library.list_all_users();
    users.push(User::new("u9", "Mallory"));

    assert_eq!(library.list_all().len(), 3);
    assert_eq!(library.list_all_users().len(), 2);
    assert!(library.find_by_id("u9").is_none());
}

#[test]
fn test_borrow_and_return_scenario() {
    let mut library = setup_test_library();

    library.borrow("u1", "978-1").unwrap();
    assert!(library.find_by_isbn("978-1").unwrap().is_borrowed());
    assert!(library.find_by_id("u1").unwrap().holds("978-1"));
    assert!(!library.list_available().iter().any(|b| b.isbn() == "978-1"));
    assert!(library.list_borrowed().iter().any(|b| b.isbn() == "978-1"));
    assert_loans_consistent(&library);

    library.return_book("u1", "978-1").unwrap();
    assert!(!library.find_by_isbn("978-1").unwrap().is_borrowed());
    assert!(!library.find_by_id("u1").unwrap().holds("978-1"));
    assert!(library.list_available().iter().any(|b| b.isbn() == "978-1"));
    assert!(library.list_borrowed().is_empty());
    assert_loans_consistent(&library);
}

#[test]
fn test_borrow_records_holder_in_book_state() {
    let mut library = setup_test_library();
    library.borrow("u2", "978-2").unwrap();
    assert_eq!(
        *library.find_by_isbn("978-2").unwrap().state(),
        BookState::Borrowed { by: "u2".to_string() }
    );
}

#[test]
fn test_borrow_unknown_user_or_book() {
    let mut library = setup_test_library();

    let result = library.borrow("ghost-user", "978-1");
    assert_eq!(
        result,
        Err(CatalogError::NotFound { entity: Entity::User, key: "ghost-user".to_string() })
    );

    let result = library.borrow("u1", "000-0");
    assert_eq!(
        result,
        Err(CatalogError::NotFound { entity: Entity::Book, key: "000-0".to_string() })
    );

    // User is checked before the book
    let result = library.borrow("ghost-user", "000-0");
    assert!(matches!(result, Err(CatalogError::NotFound { entity: Entity::User, .. })));

    assert!(library.list_borrowed().is_empty());
    assert!(library.loan_history().is_empty());
}

#[test]
fn test_double_borrow_fails() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();

    let same_user = library.borrow("u1", "978-1");
    assert_eq!(same_user, Err(CatalogError::AlreadyBorrowed { isbn: "978-1".to_string() }));

    let other_user = library.borrow("u2", "978-1");
    assert_eq!(other_user, Err(CatalogError::AlreadyBorrowed { isbn: "978-1".to_string() }));

    assert_eq!(library.find_by_id("u1").unwrap().borrowed_isbns(), ["978-1"]);
    assert!(!library.find_by_id("u2").unwrap().has_loans());
    assert_loans_consistent(&library);
}

#[test]
fn test_return_never_borrowed_book() {
    let mut library = setup_test_library();
    let result = library.return_book("u1", "978-1");
    assert_eq!(
        result,
        Err(CatalogError::InvalidState(StateViolation::NotBorrowed { isbn: "978-1".to_string() }))
    );
}

#[test]
fn test_return_unknown_user_or_book() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();

    assert!(matches!(
        library.return_book("ghost", "978-1"),
        Err(CatalogError::NotFound { entity: Entity::User, .. })
    ));
    assert!(matches!(
        library.return_book("u1", "000-0"),
        Err(CatalogError::NotFound { entity: Entity::Book, .. })
    ));
    assert!(library.find_by_isbn("978-1").unwrap().is_borrowed());
}

#[test]
fn test_return_by_wrong_user_fails() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();

    let result = library.return_book("u2", "978-1");
    assert_eq!(
        result,
        Err(CatalogError::InvalidState(StateViolation::NotBorrowedByUser {
            user_id: "u2".to_string(),
            isbn: "978-1".to_string(),
        }))
    );
    assert!(result.unwrap_err().to_string().contains("not borrowed by this user"));

    // Nothing moved
    assert!(library.find_by_isbn("978-1").unwrap().is_borrowed());
    assert!(library.find_by_id("u1").unwrap().holds("978-1"));
    assert_loans_consistent(&library);
}

#[test]
fn test_remove_book() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();

    let result = library.remove_book("978-1");
    assert_eq!(
        result,
        Err(CatalogError::InvalidState(StateViolation::BookBorrowed {
            isbn: "978-1".to_string()
        }))
    );
    assert!(library.find_by_isbn("978-1").is_some());

    assert_eq!(library.remove_book("978-2"), Ok(true));
    assert!(library.find_by_isbn("978-2").is_none());

    // Unknown isbn is a not-found signal, not an error
    assert_eq!(library.remove_book("978-2"), Ok(false));
    assert_eq!(library.remove_book("nope"), Ok(false));
}

#[test]
fn test_remove_user() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();

    let result = library.remove_user("u1");
    assert_eq!(
        result,
        Err(CatalogError::InvalidState(StateViolation::OutstandingLoans {
            user_id: "u1".to_string()
        }))
    );
    assert!(library.find_by_id("u1").is_some());

    assert_eq!(library.remove_user("u2"), Ok(true));
    assert!(library.find_by_id("u2").is_none());
    assert_eq!(library.remove_user("u2"), Ok(false));

    library.return_book("u1", "978-1").unwrap();
    assert_eq!(library.remove_user("u1"), Ok(true));
}

#[test]
fn test_update_book_keeps_identity_and_state() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();

    library.update_book("978-1", "Title B", "Author B").unwrap();
    let book = library.find_by_isbn("978-1").unwrap();
    assert_eq!(book.title(), "Title B");
    assert_eq!(book.author(), "Author B");
    assert!(book.is_borrowed());

    assert!(matches!(
        library.update_book("nope", "x", "y"),
        Err(CatalogError::NotFound { entity: Entity::Book, .. })
    ));
}

#[test]
fn test_rename_user() {
    let mut library = setup_test_library();
    library.rename_user("u2", "Robert").unwrap();
    assert_eq!(library.find_by_id("u2").map(User::name), Some("Robert"));
    assert!(matches!(
        library.rename_user("ghost", "x"),
        Err(CatalogError::NotFound { entity: Entity::User, .. })
    ));
}

#[test]
fn test_books_held_by_in_borrow_order() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-3").unwrap();
    library.borrow("u1", "978-1").unwrap();

    let held: Vec<String> =
        library.books_held_by("u1").unwrap().iter().map(|b| b.isbn().to_string()).collect();
    assert_eq!(held, ["978-3", "978-1"]);
    assert!(library.books_held_by("u2").unwrap().is_empty());
    assert!(library.books_held_by("ghost").is_err());
}

#[test]
#[allow(clippy::indexing_slicing)]
fn test_history_and_observers() {
    let mut library = setup_test_library();
    let observer = RecordingObserver::default();
    library.register_observer(Box::new(observer.clone()));

    library.borrow("u1", "978-1").unwrap();
    drop(library.borrow("u2", "978-1"));
    drop(library.return_book("u2", "978-1"));
    library.return_book("u1", "978-1").unwrap();

    // Failed calls leave no trace
    let history = library.loan_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event, LoanEvent::Borrow);
    assert_eq!(history[1].event, LoanEvent::Return);
    assert_eq!(history[1].user_id, "u1");
    assert_eq!(history[1].isbn, "978-1");

    assert_eq!(*observer.seen.borrow(), history);
}

#[test]
fn test_history_is_bounded() {
    let mut library = Library::with_history_size(3);
    library.add_book(Book::new("978-1", "Title A", "Author A")).unwrap();
    library.register_user(User::new("u1", "Alice")).unwrap();

    for _ in 0..5 {
        library.borrow("u1", "978-1").unwrap();
        library.return_book("u1", "978-1").unwrap();
    }

    let events: Vec<LoanEvent> = library.loan_history().iter().map(|r| r.event).collect();
    assert_eq!(events, [LoanEvent::Return, LoanEvent::Borrow, LoanEvent::Return]);
}

#[test]
fn test_display_summary() {
    let mut library = setup_test_library();
    library.borrow("u1", "978-1").unwrap();
    assert_eq!(library.to_string(), "3 books (1 borrowed), 2 users");
}
