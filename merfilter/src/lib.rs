//! Merfilter -- k-mer frequency filtering of sequence records.
//!
//! A reference corpus of scored k-mers is aggregated into a
//! [FreqTable](FreqTable); query records are then kept or discarded based
//! on the distribution of their per-window scores. Both phases run over
//! contiguous shards on a fixed-size worker pool.

pub mod aggregate;
pub mod classify;
mod error;
mod table;

pub use error::FilterError;
pub use table::FreqTable;

#[macro_use]
extern crate log;
