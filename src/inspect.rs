//! Record emitters and the top-level inspection driver
//!
//! Two output modes:
//!
//! - [`InspectMode::Sequences`]: every reconstructed record as a FASTA block
//! - [`InspectMode::Names`]: record labels only, one per line, without
//!   scanning the joined sequence

use crate::error::Result;
use crate::index::JoinedIndex;
use crate::io::fasta::{FastaWriter, LineWidth};
use crate::oracle::{JoinedSequence, MappingOracle};
use crate::reconstruct::reconstruct;
use crate::types::Record;
use std::io::Write;
use tracing::debug;

/// What an inspection writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectMode {
    /// Full FASTA records wrapped at the given width
    Sequences(LineWidth),
    /// Record labels only
    Names,
}

impl Default for InspectMode {
    fn default() -> Self {
        InspectMode::Sequences(LineWidth::default())
    }
}

/// Write every reconstructed record as FASTA
///
/// Returns the number of records written. Records are written as soon as
/// they are complete, so output for early records is available before the
/// scan finishes.
pub fn write_sequences<S, O, W>(
    joined: &S,
    oracle: &O,
    records: &[Record],
    width: LineWidth,
    out: W,
) -> Result<usize>
where
    S: JoinedSequence + ?Sized,
    O: MappingOracle + ?Sized,
    W: Write,
{
    let mut writer = FastaWriter::with_width(out, width);
    for assembled in reconstruct(joined, oracle, records) {
        writer.write(&assembled.record.name, &assembled.sequence)?;
    }
    let written = writer.records_written();
    writer.finish()?;

    debug!(
        records = written,
        total = records.len(),
        "wrote reconstructed records"
    );
    Ok(written)
}

/// Write each record label on its own line, in index order
///
/// Returns the number of labels written.
pub fn write_names<W: Write>(records: &[Record], mut out: W) -> Result<usize> {
    for record in records {
        out.write_all(record.name.as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(records.len())
}

/// Run an inspection of a loaded index
///
/// # Example
///
/// ```no_run
/// use refinspect::{inspect, InspectMode, JoinedIndex};
///
/// let index = JoinedIndex::load("indexes/lambda_virus")?;
/// inspect(&index, InspectMode::Names, std::io::stdout().lock())?;
/// # Ok::<(), refinspect::InspectError>(())
/// ```
pub fn inspect<W: Write>(index: &JoinedIndex, mode: InspectMode, out: W) -> Result<usize> {
    match mode {
        InspectMode::Sequences(width) => {
            write_sequences(index.joined(), index.oracle(), index.records(), width, out)
        }
        InspectMode::Names => write_names(index.records(), out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Mapping;

    fn render_sequences(
        joined: &[u8],
        oracle: impl Fn(u64) -> Mapping,
        records: &[Record],
        width: usize,
    ) -> String {
        let mut out = Vec::new();
        let width = LineWidth::new(width).unwrap();
        write_sequences(joined, &oracle, records, width, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_sequences_wraps_each_record() {
        let records = [Record::new("a", 5), Record::new("b", 2)];
        let oracle = |pos: u64| match pos {
            0..=4 => Mapping::owned(0, pos, 5),
            _ => Mapping::owned(1, pos - 5, 2),
        };
        let text = render_sequences(b"ACGTAGT", oracle, &records, 2);
        assert_eq!(text, ">a\nAC\nGT\nA\n>b\nGT\n");
    }

    #[test]
    fn test_write_sequences_skips_unseen_records() {
        let records = [
            Record::new("empty", 0),
            Record::new("seen", 1),
            Record::new("unseen", 4),
        ];
        let oracle = |_: u64| Mapping::owned(1, 0, 1);
        let text = render_sequences(b"T", oracle, &records, 60);
        assert_eq!(text, ">seen\nT\n");
    }

    #[test]
    fn test_write_names_in_index_order() {
        let records = [
            Record::new("chr2", 10),
            Record::new("chr1", 0),
            Record::new("chrM", 16569),
        ];
        let mut out = Vec::new();
        assert_eq!(write_names(&records, &mut out).unwrap(), 3);
        assert_eq!(out, b"chr2\nchr1\nchrM\n");
    }

    #[test]
    fn test_write_names_empty() {
        let mut out = Vec::new();
        assert_eq!(write_names(&[], &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(
            InspectMode::default(),
            InspectMode::Sequences(LineWidth::default())
        );
    }
}
