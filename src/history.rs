use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::events::LoanEvent;

/// Default number of loan records kept by a catalog
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Wall-clock time of a loan event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeStamp {
    /// Seconds since Unix epoch
    pub seconds: u64,
    /// Nanoseconds part
    pub nanos: u32,
}

impl TimeStamp {
    /// Current system time. A clock set before the epoch reads as zero.
    #[must_use]
    pub fn now() -> Self {
        let duration = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Self { seconds: duration.as_secs(), nanos: duration.subsec_nanos() }
    }
}

/// One successful borrow or return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    /// What happened
    pub event: LoanEvent,
    /// Book involved
    pub isbn: String,
    /// User involved
    pub user_id: String,
    /// When it happened
    pub at: TimeStamp,
}

impl fmt::Display for LoanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --({})--> {} @ {}s", self.user_id, self.event, self.isbn, self.at.seconds)
    }
}

/// Bounded log of loan records, oldest first
#[derive(Debug, Clone)]
pub(crate) struct LoanHistory {
    /// Records in insertion order
    records: Vec<LoanRecord>,
    /// Maximum number of records to keep
    max_size: usize,
}

impl LoanHistory {
    /// A zero bound is raised to one so the latest record is always kept.
    pub(crate) fn new(max_size: usize) -> Self {
        Self { records: Vec::new(), max_size: max_size.max(1) }
    }

    pub(crate) fn push(&mut self, record: LoanRecord) {
        self.records.push(record);
        if self.records.len() > self.max_size {
            self.records.remove(0);
        }
    }

    pub(crate) fn records(&self) -> &[LoanRecord] {
        &self.records
    }
}
