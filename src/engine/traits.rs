//! External collaborators: the disk service, memory factory, page
//! cache, and WAL index. Every method that does I/O is modeled as an
//! object-safe async method returning `Pin<Box<dyn Future<...> + '_>>`, so the
//! core can be generic over these capabilities and an embedding engine can
//! pass trait objects across an await point.

use crate::Result;
use crate::engine::page::Page;
use std::future::Future;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Read/write/truncate primitives against fixed-size page slots. The actual
/// file I/O implementation lives with the embedding engine, not here.
pub trait DiskService: Send + Sync {
    /// Highest slot in the data region at open time.
    fn get_last_file_position_id(&self) -> BoxFuture<'_, Result<i64>>;
    /// Grow (or shrink) the file to cover the given slot.
    fn set_length(&self, position_id: i64) -> BoxFuture<'_, Result<()>>;
    /// Read the page at `position_id` into `page`'s buffer.
    fn read_page_async<'a>(&'a self, page: &'a mut Page, position_id: i64) -> BoxFuture<'a, Result<()>>;
    /// Write `page` at its current `position_id`.
    fn write_page_async<'a>(&'a self, page: &'a Page) -> BoxFuture<'a, Result<()>>;
    /// Zero one slot.
    fn write_empty_page_async(&self, position_id: i64) -> BoxFuture<'_, Result<()>>;
    /// Zero an inclusive range of slots.
    fn write_empty_pages_async(&self, from: i64, to: i64) -> BoxFuture<'_, Result<()>>;
}

/// Allocates and releases page buffers.
pub trait MemoryFactory: Send + Sync {
    fn allocate_new_page(&self, page_id: i64) -> Box<Page>;
    fn deallocate_page(&self, page: Box<Page>);
}

/// Maps position ID to page buffer, bounded, with the ability to drop log
/// pages on demand.
pub trait PageCache: Send + Sync {
    /// Atomically take the page at `position_id` out of the cache, if present.
    fn try_remove(&self, position_id: i64) -> Option<Box<Page>>;
    /// Offer `page` to the cache. Returns the page back if full or refused,
    /// so the caller retains ownership and can deallocate it; `None` means
    /// the cache accepted it.
    fn add_page_in_cache(&self, page: Box<Page>) -> Option<Box<Page>>;
    /// Drop every cached entry whose position lies in the log region, i.e.
    /// strictly past `last_page_id`.
    fn clear_log_pages(&self, last_page_id: i64);
}

/// Maps logical page ID to current log position.
pub trait WalIndex: Send + Sync {
    fn clear(&self);
}
