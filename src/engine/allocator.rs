//! Log position allocator: hands out the next log slot, skipping
//! allocation-map slots.

use crate::engine::constants::LogCoreConfig;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::trace;

/// Lock-free, wait-free slot allocator. Never returns a position that
/// is a multiple of `config.am_page_step`.
pub struct LogPositionAllocator {
    config: LogCoreConfig,
    log_position_id: AtomicI64,
}

impl LogPositionAllocator {
    pub fn new(config: LogCoreConfig, last_page_id: i64) -> Self {
        let initial = Self::calc_init_log_position_id(&config, last_page_id);
        Self {
            config,
            log_position_id: AtomicI64::new(initial),
        }
    }

    /// Skips two extends ahead of
    /// `last_page_id`'s extend, reserving room for in-flight growth of the
    /// data region, and returns one slot below the first slot of the chosen
    /// extend (so the first `next()` call yields that slot).
    pub fn calc_init_log_position_id(config: &LogCoreConfig, last_page_id: i64) -> i64 {
        let step = config.am_page_step;
        let extend_size = config.am_extend_size;
        let extend_count = config.am_extend_count;

        let group = last_page_id / step;
        let extend = (last_page_id - 1 - group * step) / extend_size;

        let (group, extend) = if extend + 2 >= extend_count {
            (group + 1, (extend + 2) % extend_count)
        } else {
            (group, extend + 2)
        };

        group * step + extend * extend_size + 1 - 1
    }

    /// Resets the counter as if the allocator had just been constructed with
    /// this `last_page_id`, used after a checkpoint.
    pub fn reset(&self, last_page_id: i64) {
        let initial = Self::calc_init_log_position_id(&self.config, last_page_id);
        self.log_position_id.store(initial, Ordering::SeqCst);
    }

    pub fn current(&self) -> i64 {
        self.log_position_id.load(Ordering::SeqCst)
    }

    /// Atomically pre-increment; if the result lands on an
    /// AM slot, pre-increment again. Two atomic increments worst case.
    pub fn next(&self) -> i64 {
        let step = self.config.am_page_step;
        let mut value = self.log_position_id.fetch_add(1, Ordering::SeqCst) + 1;
        if value % step == 0 {
            trace!(slot = value, "allocator landed on an allocation-map slot, skipping");
            value = self.log_position_id.fetch_add(1, Ordering::SeqCst) + 1;
        }
        value
    }
}
