/*!
 *! # litecore-log
 *!
 *! The log/checkpoint core of a single-file embedded document database
 *! engine: a write-ahead log colocated with the data region, and a
 *! checkpoint process that migrates confirmed pages back to their home
 *! positions, relocating conflicting pages through a temp region when
 *! needed.
 *!
 *! This crate owns the log position allocator, the header journal, the
 *! writer, the checkpoint planner, and the checkpoint executor. Disk I/O,
 *! page buffer allocation, page caching, and WAL-index lookup are supplied
 *! by an embedding engine through the traits in [`engine::traits`].
 */

#![allow(clippy::too_many_arguments)]

pub mod engine;

pub type Result<T> = std::result::Result<T, LogError>;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("disk I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("invariant violation: {detail}")]
    Invariant { detail: String },

    #[error("memory allocation failure: {0}")]
    Allocation(String),
}

impl LogError {
    pub fn invariant(detail: impl Into<String>) -> Self {
        LogError::Invariant {
            detail: detail.into(),
        }
    }

    pub fn allocation(detail: impl Into<String>) -> Self {
        LogError::Allocation(detail.into())
    }
}
