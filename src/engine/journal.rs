//! Log header journal: an append-only queue of `LogPageHeader`,
//! confirmed-transaction set, and highest observed logical page ID.

use crate::engine::page_position::LogPageHeader;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Confirmed-transaction set and `lastPageID`, guarded by one mutex held
/// only for the tiny critical section in `append`.
struct SharedState {
    confirmed_transactions: HashSet<u64>,
    last_page_id: i64,
}

/// The header queue never needs to be read under the same lock as the
/// confirmed set (only appended to and, at checkpoint, drained wholesale),
/// so it gets its own `Mutex` rather than sharing one with `SharedState`.
pub struct LogHeaderJournal {
    headers: Mutex<VecDeque<LogPageHeader>>,
    shared: Mutex<SharedState>,
}

impl LogHeaderJournal {
    pub fn new(last_page_id: i64) -> Self {
        Self {
            headers: Mutex::new(VecDeque::new()),
            shared: Mutex::new(SharedState {
                confirmed_transactions: HashSet::new(),
                last_page_id,
            }),
        }
    }

    /// Updates the confirmed set / `lastPageID`
    /// first, under the mutex, then enqueues — so any observer of the queue
    /// also observes a consistent `lastPageID`.
    pub fn append(&self, header: LogPageHeader) {
        {
            let mut shared = self.shared.lock().unwrap();
            if header.is_confirmed() {
                shared.confirmed_transactions.insert(header.transaction_id());
            }
            if header.page_id() > shared.last_page_id {
                shared.last_page_id = header.page_id();
            }
        }
        self.headers.lock().unwrap().push_back(header);
    }

    pub fn last_page_id(&self) -> i64 {
        self.shared.lock().unwrap().last_page_id
    }

    pub fn is_confirmed(&self, transaction_id: u64) -> bool {
        self.shared
            .lock()
            .unwrap()
            .confirmed_transactions
            .contains(&transaction_id)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.lock().unwrap().is_empty()
    }

    /// Snapshot of the current headers, in append order.
    pub fn headers_snapshot(&self) -> Vec<LogPageHeader> {
        self.headers.lock().unwrap().iter().copied().collect()
    }

    pub fn confirmed_snapshot(&self) -> HashSet<u64> {
        self.shared.lock().unwrap().confirmed_transactions.clone()
    }

    /// Drains the journal and confirmed set at checkpoint end — the journal
    /// is append-only between checkpoints and empty again right after one.
    /// `new_last_page_id` replaces `lastPageID` for the next epoch.
    pub fn reset(&self, new_last_page_id: i64) {
        self.headers.lock().unwrap().clear();
        let mut shared = self.shared.lock().unwrap();
        shared.confirmed_transactions.clear();
        shared.last_page_id = new_last_page_id;
    }
}
