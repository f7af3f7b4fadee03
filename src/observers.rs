use tracing::info;

use crate::history::LoanRecord;

/// Trait for loan observation
pub trait LoanObserver {
    /// Called after a borrow or return has been applied
    fn on_loan(&self, record: &LoanRecord);
}

/// Logs every applied loan event
#[derive(Debug, Default)]
pub struct LoanLogger;

impl LoanObserver for LoanLogger {
    fn on_loan(&self, record: &LoanRecord) {
        info!(
            event = %record.event,
            isbn = %record.isbn,
            user_id = %record.user_id,
            "loan transition applied"
        );
    }
}
