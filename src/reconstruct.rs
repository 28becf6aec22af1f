//! Record reconstruction from a joined sequence
//!
//! A single forward scan over the joined sequence asks the oracle who owns
//! each position and reassembles the records one at a time:
//!
//! ```text
//! position:  0 1 2 3 4 5 6
//! mapping:   a0 a1 a2 a3 a4 b0 b2      (record, offset); a.len = 5, b.len = 3
//! symbol:    G  A  T  T  A  C  G
//!
//! a -> GATTA
//! b -> CNG     (offset 1 was never owned: gap)
//! ```
//!
//! A record is yielded once the scan moves to a different record or ends,
//! padded with [`GAP_SYMBOL`] up to its declared length. Records that are
//! never owned by any position (including zero-length records) are not
//! yielded at all.
//!
//! The per-record cursor is an explicit [`ScanState`]; [`Reconstructor`]
//! only drives it.

use crate::oracle::{JoinedSequence, Mapping, MappingOracle};
use crate::types::{FastaRecord, Record};
use std::iter::FusedIterator;
use tracing::{trace, warn};

/// Placeholder for record positions absent from the joined sequence
pub const GAP_SYMBOL: u8 = b'N';

/// Upper bound on the buffer reserved when a record opens
///
/// Declared lengths come from the index; the buffer still grows to the full
/// length as symbols and padding are appended.
const MAX_PREALLOC: usize = 1 << 20;

/// A completed record and its reassembled sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRecord<'a> {
    /// Identity of the record in the record collection
    pub record_id: u32,
    /// The record's label and declared length
    pub record: &'a Record,
    /// Reassembled sequence; always exactly `record.length` long
    pub sequence: Vec<u8>,
}

impl AssembledRecord<'_> {
    /// Convert to an owned FASTA record
    pub fn into_fasta(self) -> FastaRecord {
        FastaRecord::new(self.record.name.clone(), self.sequence)
    }
}

/// The record currently being accumulated
#[derive(Debug)]
struct OpenRecord {
    record_id: u32,
    sequence: Vec<u8>,
    /// Offset the next owned position is expected at; anything beyond it
    /// is preceded by gap symbols
    next_offset: u64,
}

/// Mutable cursor carried across a scan
///
/// Feed it one position at a time with [`ScanState::advance`] and call
/// [`ScanState::finish`] after the last position.
///
/// # Example
///
/// ```
/// use refinspect::{Mapping, Record, ScanState};
///
/// let records = [Record::new("r0", 3)];
/// let mut state = ScanState::new();
///
/// let completed = state.advance(Mapping::owned(0, 0, 3), b'A', &records);
/// assert!(completed.is_none());
/// let completed = state.advance(Mapping::owned(0, 2, 3), b'C', &records);
/// assert!(completed.is_none());
///
/// let done = state.finish(&records).unwrap();
/// assert_eq!(done.sequence, b"ANC");
/// ```
#[derive(Debug, Default)]
pub struct ScanState {
    open: Option<OpenRecord>,
    /// Indexed by record id; set once a record has been yielded
    closed: Vec<bool>,
    /// Owned positions dropped for breaking the oracle contract
    skipped: u64,
}

impl ScanState {
    /// Fresh state with no current record
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the record being accumulated, if any
    pub fn current_record(&self) -> Option<u32> {
        self.open.as_ref().map(|open| open.record_id)
    }

    /// Number of owned positions skipped because they broke the oracle
    /// contract (unknown record, offset past the declared length, offset
    /// going backwards, or a record that was already closed)
    pub fn skipped_positions(&self) -> u64 {
        self.skipped
    }

    fn is_closed(&self, record_id: u32) -> bool {
        self.closed.get(record_id as usize).copied().unwrap_or(false)
    }

    fn skip(&mut self, position_detail: std::fmt::Arguments<'_>) {
        self.skipped += 1;
        trace!("skipping owned position: {}", position_detail);
    }

    /// Consume one joined position
    ///
    /// Returns the previous record, completed, when this position starts a
    /// different record.
    pub fn advance<'a>(
        &mut self,
        mapping: Mapping,
        symbol: u8,
        records: &'a [Record],
    ) -> Option<AssembledRecord<'a>> {
        // Unowned, or owned with offset >= length: contributes nothing
        let (record_id, offset, _) = mapping.in_bounds()?;

        let Some(record) = records.get(record_id as usize) else {
            self.skip(format_args!("record {} is not in the index", record_id));
            return None;
        };
        if offset >= record.length {
            self.skip(format_args!(
                "offset {} is past the declared length {} of {}",
                offset, record.length, record.name
            ));
            return None;
        }
        if self.is_closed(record_id) {
            self.skip(format_args!("{} was already emitted", record.name));
            return None;
        }

        let mut completed = None;
        if self.current_record() != Some(record_id) {
            completed = self.close(records);
            self.open = Some(OpenRecord {
                record_id,
                sequence: Vec::with_capacity(prealloc_len(record.length)),
                next_offset: 0,
            });
        }

        let open = self.open.as_mut()?;
        if offset < open.next_offset {
            let expected = open.next_offset;
            self.skip(format_args!(
                "offset {} of {} is behind the expected offset {}",
                offset, record.name, expected
            ));
            return completed;
        }

        let gap = (offset - open.next_offset) as usize;
        open.sequence.resize(open.sequence.len() + gap, GAP_SYMBOL);
        open.sequence.push(symbol);
        open.next_offset = offset + 1;

        completed
    }

    /// Close the open record after the last position, if there is one
    pub fn finish<'a>(&mut self, records: &'a [Record]) -> Option<AssembledRecord<'a>> {
        let completed = self.close(records);
        if self.skipped > 0 {
            warn!(
                skipped = self.skipped,
                "ignored owned positions that broke the mapping contract"
            );
        }
        completed
    }

    /// Pad the open record to its declared length and hand it out
    fn close<'a>(&mut self, records: &'a [Record]) -> Option<AssembledRecord<'a>> {
        let OpenRecord {
            record_id,
            mut sequence,
            ..
        } = self.open.take()?;
        let record = records.get(record_id as usize)?;

        sequence.resize(record.length as usize, GAP_SYMBOL);

        let idx = record_id as usize;
        if self.closed.len() <= idx {
            self.closed.resize(idx + 1, false);
        }
        self.closed[idx] = true;

        trace!(record = %record.name, length = record.length, "record complete");
        Some(AssembledRecord {
            record_id,
            record,
            sequence,
        })
    }
}

fn prealloc_len(length: u64) -> usize {
    usize::try_from(length).map_or(MAX_PREALLOC, |len| len.min(MAX_PREALLOC))
}

/// Lazy iterator over the records of a joined sequence
///
/// Yields records in the order their first owned position appears. The
/// iterator is single pass; dropping it early abandons the scan between
/// records without exposing a partial one.
pub struct Reconstructor<'a, S: ?Sized, O: ?Sized> {
    joined: &'a S,
    oracle: &'a O,
    records: &'a [Record],
    position: u64,
    state: ScanState,
    done: bool,
}

impl<'a, S, O> Reconstructor<'a, S, O>
where
    S: JoinedSequence + ?Sized,
    O: MappingOracle + ?Sized,
{
    /// Start a scan at position 0
    pub fn new(joined: &'a S, oracle: &'a O, records: &'a [Record]) -> Self {
        Self {
            joined,
            oracle,
            records,
            position: 0,
            state: ScanState::new(),
            done: false,
        }
    }

    /// Scan state so far
    pub fn state(&self) -> &ScanState {
        &self.state
    }
}

impl<'a, S, O> Iterator for Reconstructor<'a, S, O>
where
    S: JoinedSequence + ?Sized,
    O: MappingOracle + ?Sized,
{
    type Item = AssembledRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let len = self.joined.len();
        while self.position < len {
            let position = self.position;
            self.position += 1;

            let mapping = self.oracle.map(position);
            if mapping.in_bounds().is_none() {
                continue;
            }
            let symbol = self.joined.symbol(position);
            if let Some(record) = self.state.advance(mapping, symbol, self.records) {
                return Some(record);
            }
        }

        self.done = true;
        self.state.finish(self.records)
    }
}

impl<S, O> FusedIterator for Reconstructor<'_, S, O>
where
    S: JoinedSequence + ?Sized,
    O: MappingOracle + ?Sized,
{
}

/// Reconstruct every record reachable through `oracle`
///
/// # Example
///
/// ```
/// use refinspect::{reconstruct, Mapping, Record};
///
/// let records = [Record::new("a", 2), Record::new("b", 3)];
/// let joined: &[u8] = b"ACGT";
/// let oracle = |pos: u64| match pos {
///     0 | 1 => Mapping::owned(0, pos, 2),
///     2 => Mapping::owned(1, 0, 3),
///     _ => Mapping::owned(1, 2, 3),
/// };
///
/// let seqs: Vec<_> = reconstruct(joined, &oracle, &records)
///     .map(|r| r.sequence)
///     .collect();
/// assert_eq!(seqs, [b"AC".to_vec(), b"GNT".to_vec()]);
/// ```
pub fn reconstruct<'a, S, O>(
    joined: &'a S,
    oracle: &'a O,
    records: &'a [Record],
) -> Reconstructor<'a, S, O>
where
    S: JoinedSequence + ?Sized,
    O: MappingOracle + ?Sized,
{
    Reconstructor::new(joined, oracle, records)
}
