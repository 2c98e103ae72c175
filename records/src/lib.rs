//! Records -- sequence records and their packed representation.
//!
//! This crate carries the data types shared by the filtering pipeline:
//! the 2-bit packed DNA sequence ([PackedSequence](PackedSequence)), the
//! flat-file record type, and the lazy corpus reader. Algorithms live in
//! the `merfilter` crate; this one is interface only.

mod error;
pub mod fasta;
mod read;

pub use error::SequenceError;
pub use fasta::{write_record, Fasta, FastaRecord};
pub use read::{Base, PackedSequence};
