//! In-memory index construction from reference sequences
//!
//! Each record contributes its unambiguous bases (A/C/G/T, any case) to the
//! joined sequence. Everything else (N runs, IUPAC codes, gaps) is left out
//! of the joined sequence and only counted towards the record's declared
//! length, so it reappears as `N` when the record is reconstructed.

use super::fragments::{Fragment, FragmentMap};
use super::packed::Packer;
use super::JoinedIndex;
use crate::error::{InspectError, Result};
use crate::io::fasta::FastaStream;
use crate::types::{FastaRecord, Record};
use std::path::Path;
use tracing::debug;

/// Incremental builder for a [`JoinedIndex`]
///
/// # Example
///
/// ```no_run
/// use refinspect::index::{IndexBuilder, IndexWriter};
///
/// # fn main() -> refinspect::Result<()> {
/// let index = IndexBuilder::from_fasta("genome.fa.gz")?.build()?;
/// IndexWriter::new().write(&index, "indexes/genome")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct IndexBuilder {
    records: Vec<Record>,
    fragments: Vec<Fragment>,
    packer: Packer,
}

impl IndexBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from every record of a FASTA file (plain or gzip)
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut builder = Self::new();
        builder.add_fasta_records(FastaStream::from_path(path)?)?;
        Ok(builder)
    }

    /// Add every record of a FASTA stream, in order
    pub fn add_fasta_records<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<FastaRecord>>,
    {
        for record in records {
            let record = record?;
            self.add_record(&record.id, &record.sequence)?;
        }
        Ok(())
    }

    /// Add one record
    pub fn add_record(&mut self, name: &str, sequence: &[u8]) -> Result<()> {
        let record_id = u32::try_from(self.records.len()).map_err(|_| InspectError::InvalidInput {
            msg: "too many records for a single index".to_string(),
        })?;

        let mut open: Option<Fragment> = None;
        for (offset, &base) in sequence.iter().enumerate() {
            let joined_pos = self.packer.len();
            if !self.packer.push(base) {
                if let Some(fragment) = open.take() {
                    self.fragments.push(fragment);
                }
                continue;
            }
            match open.as_mut() {
                Some(fragment) => fragment.len += 1,
                None => {
                    open = Some(Fragment {
                        joined_start: joined_pos,
                        record_id,
                        record_offset: offset as u64,
                        len: 1,
                    })
                }
            }
        }
        if let Some(fragment) = open {
            self.fragments.push(fragment);
        }

        self.records.push(Record::new(name, sequence.len() as u64));
        Ok(())
    }

    /// Number of records added so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records have been added
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish the index
    pub fn build(self) -> Result<JoinedIndex> {
        let joined = self.packer.finish();
        let joined_len = crate::oracle::JoinedSequence::len(&joined);
        let lengths = self.records.iter().map(|r| r.length).collect();
        let oracle = FragmentMap::new(self.fragments, lengths, joined_len)?;

        debug!(
            records = self.records.len(),
            fragments = oracle.fragments().len(),
            joined_len,
            "built index"
        );

        Ok(JoinedIndex {
            records: self.records,
            oracle,
            joined,
            endianness: None,
        })
    }
}
