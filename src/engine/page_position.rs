/// `LogPageHeader`: the small, append-only record the journal keeps for
/// every page written to the log, independent of the page buffer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPageHeader {
    position_id: i64,
    page_id: i64,
    transaction_id: u64,
    is_confirmed: bool,
}

impl LogPageHeader {
    pub fn new(position_id: i64, page_id: i64, transaction_id: u64, is_confirmed: bool) -> Self {
        Self {
            position_id,
            page_id,
            transaction_id,
            is_confirmed,
        }
    }

    pub fn from_page(page: &super::page::Page) -> Self {
        Self {
            position_id: page.position_id(),
            page_id: page.page_id(),
            transaction_id: page.transaction_id(),
            is_confirmed: page.is_confirmed(),
        }
    }

    pub fn position_id(&self) -> i64 {
        self.position_id
    }

    pub fn page_id(&self) -> i64 {
        self.page_id
    }

    pub fn transaction_id(&self) -> u64 {
        self.transaction_id
    }

    pub fn is_confirmed(&self) -> bool {
        self.is_confirmed
    }
}
