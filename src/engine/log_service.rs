//! `LogService`: the facade tying the allocator, journal, writer, planner,
//! and executor together into the operations an embedding engine calls.

use crate::Result;
use crate::engine::allocator::LogPositionAllocator;
use crate::engine::constants::LogCoreConfig;
use crate::engine::executor::CheckpointExecutor;
use crate::engine::journal::LogHeaderJournal;
use crate::engine::page::Page;
use crate::engine::planner::CheckpointPlanner;
use crate::engine::traits::{DiskService, MemoryFactory, PageCache, WalIndex};
use crate::engine::writer::Writer;
use std::collections::HashMap;
use tracing::instrument;

pub struct LogService<D: DiskService, M: MemoryFactory, C: PageCache, W: WalIndex> {
    disk: D,
    memory: M,
    cache: C,
    wal_index: W,
    allocator: LogPositionAllocator,
    journal: LogHeaderJournal,
}

impl<D: DiskService, M: MemoryFactory, C: PageCache, W: WalIndex> LogService<D, M, C, W> {
    /// Reads the current end of the data region from the disk service and
    /// sizes the allocator and journal around it.
    #[instrument(level = "info", skip_all)]
    pub async fn initialize(
        disk: D,
        memory: M,
        cache: C,
        wal_index: W,
        config: LogCoreConfig,
    ) -> Result<Self> {
        let last_page_id = disk.get_last_file_position_id().await?;
        let allocator = LogPositionAllocator::new(config, last_page_id);
        let journal = LogHeaderJournal::new(last_page_id);

        tracing::info!(last_page_id, "log service initialized");
        Ok(Self {
            disk,
            memory,
            cache,
            wal_index,
            allocator,
            journal,
        })
    }

    pub async fn write_log_pages_async(&self, pages: &mut [Box<Page>]) -> Result<()> {
        Writer::new(&self.disk, &self.memory, &self.allocator, &self.journal)
            .write_log_pages_async(pages)
            .await
    }

    pub async fn write_empty_log_pages_async(
        &self,
        page_ids: &[i64],
        transaction_id: u64,
        wal_dirty_pages: &mut HashMap<i64, i64>,
    ) -> Result<()> {
        Writer::new(&self.disk, &self.memory, &self.allocator, &self.journal)
            .write_empty_log_pages_async(page_ids, transaction_id, wal_dirty_pages)
            .await
    }

    /// Drains the log into the data region, optionally relocating
    /// conflicting pages through a temp region, and resets all in-memory
    /// state for the next epoch. Returns the number of pages actually landed
    /// in the data region. The caller must ensure no writer is active
    /// concurrently.
    #[instrument(level = "info", skip(self), fields(crop, add_to_cache))]
    pub async fn checkpoint_async(&self, crop: bool, add_to_cache: bool) -> Result<i64> {
        if self.journal.is_empty() && !crop {
            return Ok(0);
        }

        let last_page_id = self.journal.last_page_id();
        let log_position_id = self.allocator.current();
        let start_temp_position_id = last_page_id.max(log_position_id) + 1;

        let headers = self.journal.headers_snapshot();
        let confirmed = self.journal.confirmed_snapshot();
        let mut temp_pages = HashMap::new();
        let actions = CheckpointPlanner::plan(
            &headers,
            &confirmed,
            last_page_id,
            start_temp_position_id,
            &mut temp_pages,
        );

        // Additive, not multiplicative: the last slot touched by this
        // checkpoint is the start of the temp region plus however many temp
        // relocations it actually used.
        let last_used_position_id = start_temp_position_id + temp_pages.len() as i64 - 1;

        let executor = CheckpointExecutor::new(
            &self.disk,
            &self.memory,
            &self.cache,
            &self.wal_index,
            &self.allocator,
            &self.journal,
        );
        let written = executor
            .execute(&actions, last_page_id, last_used_position_id, crop, add_to_cache)
            .await?;

        tracing::info!(written, last_page_id, "checkpoint complete");
        Ok(written)
    }

    /// The core holds no resources beyond what the embedding engine already
    /// owns (disk, memory, cache, WAL index); this exists for API symmetry
    /// with those lifecycles and to give future cleanup a home.
    pub fn dispose(&self) {}
}
