//! Batch accumulation.
//!
//! Records are buffered in a [`BatchWriter`] and handed to a bulk loader in
//! groups of `batch_size`. Each writer owns its buffer; nothing is shared
//! between writers.

mod types;
mod writer;

pub use types::{BatchConfig, BatchStats, FlushResult};
pub use writer::BatchWriter;
