//! Writer: appends pages (and empty pages) to the log, updating the
//! journal as it goes.

use crate::Result;
use crate::engine::allocator::LogPositionAllocator;
use crate::engine::journal::LogHeaderJournal;
use crate::engine::page::Page;
use crate::engine::page_position::LogPageHeader;
use crate::engine::traits::{DiskService, MemoryFactory};
use std::collections::HashMap;
use tracing::instrument;

/// Appends committed/dirty pages to the log region, generic over the
/// injected disk and memory capabilities.
pub struct Writer<'a, D: DiskService, M: MemoryFactory> {
    disk: &'a D,
    memory: &'a M,
    allocator: &'a LogPositionAllocator,
    journal: &'a LogHeaderJournal,
}

impl<'a, D: DiskService, M: MemoryFactory> Writer<'a, D, M> {
    pub fn new(
        disk: &'a D,
        memory: &'a M,
        allocator: &'a LogPositionAllocator,
        journal: &'a LogHeaderJournal,
    ) -> Self {
        Self {
            disk,
            memory,
            allocator,
            journal,
        }
    }

    /// Position assignment, writes, and journal appends all preserve the
    /// order of `pages`.
    #[instrument(level = "debug", skip_all, fields(count = pages.len()))]
    pub async fn write_log_pages_async(&self, pages: &mut [Box<Page>]) -> Result<()> {
        if pages.is_empty() {
            return Ok(());
        }

        let mut last_position = 0;
        for page in pages.iter_mut() {
            let position = self.allocator.next();
            page.set_position_id(position);
            page.set_recovery_position_id(position);
            last_position = position;
        }

        self.disk.set_length(last_position).await?;

        for page in pages.iter() {
            self.disk.write_page_async(page).await?;
            self.journal.append(LogPageHeader::from_page(page));
        }

        tracing::debug!(last_position, "wrote log pages");
        Ok(())
    }

    /// `wal_dirty_pages` must be empty on
    /// entry; it is filled with `pageID -> position` so the caller can mark
    /// the wal index and, later, the last page of the batch as confirmed.
    #[instrument(level = "debug", skip_all, fields(count = page_ids.len(), transaction_id))]
    pub async fn write_empty_log_pages_async(
        &self,
        page_ids: &[i64],
        transaction_id: u64,
        wal_dirty_pages: &mut HashMap<i64, i64>,
    ) -> Result<()> {
        assert!(
            wal_dirty_pages.is_empty(),
            "wal_dirty_pages must be empty on entry"
        );
        if page_ids.is_empty() {
            return Ok(());
        }

        let mut last_position = 0;
        for &page_id in page_ids {
            let position = self.allocator.next();
            wal_dirty_pages.insert(page_id, position);
            last_position = position;
        }

        self.disk.set_length(last_position).await?;

        let mut page = self.memory.allocate_new_page(0);
        for (&page_id, &position) in wal_dirty_pages.iter() {
            page.reset_as_empty(page_id, position, transaction_id);
            self.disk.write_page_async(&page).await?;
            self.journal.append(LogPageHeader::from_page(&page));
        }
        self.memory.deallocate_page(page);

        Ok(())
    }
}
