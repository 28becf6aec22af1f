//! Joined sequence index
//!
//! A [`JoinedIndex`] bundles the three things the reconstructor needs:
//!
//! - the ordered [`Record`] collection (labels and declared lengths)
//! - the joined sequence, 2-bit packed ([`PackedSequence`])
//! - the mapping oracle, a validated fragment table ([`FragmentMap`])
//!
//! Indexes are loaded from disk with [`JoinedIndex::load`], written with
//! [`IndexWriter`], and built from FASTA with [`IndexBuilder`].
//!
//! # Example
//!
//! ```
//! use refinspect::index::IndexBuilder;
//!
//! # fn main() -> refinspect::Result<()> {
//! let mut builder = IndexBuilder::new();
//! builder.add_record("chr1", b"ACGTNNNNACGT")?;
//! builder.add_record("chrM", b"GATTACA")?;
//! let index = builder.build()?;
//!
//! let records: Vec<_> = index.reconstruct().collect();
//! assert_eq!(records[0].sequence, b"ACGTNNNNACGT");
//! assert_eq!(records[1].record.name, "chrM");
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod format;
mod fragments;
mod packed;
mod reader;
mod writer;

pub use builder::IndexBuilder;
pub use format::Endianness;
pub use fragments::{Fragment, FragmentMap};
pub use packed::PackedSequence;
pub use writer::IndexWriter;

use crate::oracle::JoinedSequence;
use crate::reconstruct::Reconstructor;
use crate::types::Record;

/// A loaded or freshly built index
#[derive(Debug)]
pub struct JoinedIndex {
    records: Vec<Record>,
    oracle: FragmentMap,
    joined: PackedSequence,
    endianness: Option<Endianness>,
}

impl JoinedIndex {
    /// Records in index order; a record's identity is its position here
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The mapping oracle
    pub fn oracle(&self) -> &FragmentMap {
        &self.oracle
    }

    /// The joined sequence
    pub fn joined(&self) -> &PackedSequence {
        &self.joined
    }

    /// Byte order of the metadata file this index was loaded from
    ///
    /// `None` for an index built in memory.
    pub fn endianness(&self) -> Option<Endianness> {
        self.endianness
    }

    /// Number of positions in the joined sequence
    pub fn joined_len(&self) -> u64 {
        self.joined.len()
    }

    /// Start reconstructing the records of this index
    pub fn reconstruct(&self) -> Reconstructor<'_, PackedSequence, FragmentMap> {
        Reconstructor::new(&self.joined, &self.oracle, &self.records)
    }
}
