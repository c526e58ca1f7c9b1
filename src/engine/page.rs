use crate::engine::constants::PAGE_SIZE;

/// The kind of content a page holds. The log/checkpoint core only ever
/// inspects whether a page is [`PageType::Empty`] (written by
/// [`crate::engine::writer::Writer::write_empty_log_pages_async`]); every
/// other kind is opaque payload owned by the embedding engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Empty,
    Other(u8),
}

/// A fixed-size page buffer with the header fields the log/checkpoint core
/// reads and rewrites. The remainder of the buffer is
/// opaque payload belonging to the embedding engine.
pub struct Page {
    page_id: i64,
    position_id: i64,
    recovery_position_id: i64,
    transaction_id: u64,
    is_confirmed: bool,
    is_dirty: bool,
    page_type: PageType,
    buffer: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    pub fn new(page_id: i64) -> Self {
        Page {
            page_id,
            position_id: page_id,
            recovery_position_id: page_id,
            transaction_id: 0,
            is_confirmed: false,
            is_dirty: false,
            page_type: PageType::Other(1),
            buffer: Box::new([0; PAGE_SIZE]),
        }
    }

    pub fn page_id(&self) -> i64 {
        self.page_id
    }

    pub fn set_page_id(&mut self, page_id: i64) {
        self.page_id = page_id;
    }

    pub fn position_id(&self) -> i64 {
        self.position_id
    }

    pub fn set_position_id(&mut self, position_id: i64) {
        self.position_id = position_id;
    }

    pub fn recovery_position_id(&self) -> i64 {
        self.recovery_position_id
    }

    pub fn set_recovery_position_id(&mut self, recovery_position_id: i64) {
        self.recovery_position_id = recovery_position_id;
    }

    pub fn transaction_id(&self) -> u64 {
        self.transaction_id
    }

    pub fn set_transaction_id(&mut self, transaction_id: u64) {
        self.transaction_id = transaction_id;
    }

    pub fn is_confirmed(&self) -> bool {
        self.is_confirmed
    }

    pub fn set_confirmed(&mut self, is_confirmed: bool) {
        self.is_confirmed = is_confirmed;
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_dirty(&mut self, is_dirty: bool) {
        self.is_dirty = is_dirty;
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn set_page_type(&mut self, page_type: PageType) {
        self.page_type = page_type;
    }

    pub fn buffer(&self) -> &[u8; PAGE_SIZE] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.buffer
    }

    /// Resets this page to the shape a logical deletion writes to the log:
    /// type Empty, dirty, not (yet) confirmed.
    pub fn reset_as_empty(&mut self, page_id: i64, position_id: i64, transaction_id: u64) {
        self.page_id = page_id;
        self.position_id = position_id;
        self.recovery_position_id = position_id;
        self.transaction_id = transaction_id;
        self.page_type = PageType::Empty;
        self.is_confirmed = false;
        self.is_dirty = true;
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("page_id", &self.page_id)
            .field("position_id", &self.position_id)
            .field("recovery_position_id", &self.recovery_position_id)
            .field("transaction_id", &self.transaction_id)
            .field("is_confirmed", &self.is_confirmed)
            .field("is_dirty", &self.is_dirty)
            .field("page_type", &self.page_type)
            .finish_non_exhaustive()
    }
}
