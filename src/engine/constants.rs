/// The size of each page in disk - use 8192 as all major databases
pub const PAGE_SIZE: usize = 8192;
/// header size of each page
pub const PAGE_HEADER_SIZE: usize = 32;

/// Number of slots between two allocation-map pages, including the AM page
/// itself. Must divide evenly into `am_extend_size * am_extend_count + 1`.
pub const AM_PAGE_STEP: i64 = 8192;
/// Number of slots in one extend.
pub const AM_EXTEND_SIZE: i64 = 1024;
/// Number of extends per allocation-map group.
pub const AM_EXTEND_COUNT: i64 = 7;

/// Runtime geometry, so tests can exercise small AM steps without touching
/// the production constants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogCoreConfig {
    pub am_page_step: i64,
    pub am_extend_size: i64,
    pub am_extend_count: i64,
}

impl LogCoreConfig {
    pub fn new(am_page_step: i64, am_extend_size: i64, am_extend_count: i64) -> Self {
        assert_eq!(
            am_extend_size * am_extend_count + 1,
            am_page_step,
            "am_extend_size * am_extend_count + 1 must equal am_page_step"
        );
        Self {
            am_page_step,
            am_extend_size,
            am_extend_count,
        }
    }
}

impl Default for LogCoreConfig {
    fn default() -> Self {
        Self {
            am_page_step: AM_PAGE_STEP,
            am_extend_size: AM_EXTEND_SIZE,
            am_extend_count: AM_EXTEND_COUNT,
        }
    }
}
