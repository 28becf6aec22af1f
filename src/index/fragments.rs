//! Fragment table: the mapping oracle of a [`JoinedIndex`]
//!
//! A fragment is a maximal run of joined positions that map to consecutive
//! offsets of a single record. Masked stretches of a record (runs of `N`,
//! IUPAC codes, ...) are not stored in the joined sequence, so one record
//! usually contributes several fragments:
//!
//! ```text
//! record chr1:  ACGTNNNNGGA      (length 11)
//! joined:       ACGTGGA...
//! fragments:    joined 0..4 -> chr1 offset 0
//!               joined 4..7 -> chr1 offset 8
//! ```
//!
//! Resolving a position is a binary search over fragment start positions.
//!
//! [`JoinedIndex`]: super::JoinedIndex

use crate::error::{InspectError, Result};
use crate::oracle::{Mapping, MappingOracle};

/// One contiguous run of owned joined positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// First joined position covered by this fragment
    pub joined_start: u64,
    /// Owning record
    pub record_id: u32,
    /// Offset within the record of the first covered position
    pub record_offset: u64,
    /// Number of positions covered
    pub len: u64,
}

impl Fragment {
    /// One past the last joined position covered
    pub fn joined_end(&self) -> u64 {
        self.joined_start + self.len
    }
}

/// Validated fragment table plus the declared record lengths
#[derive(Debug, Clone, Default)]
pub struct FragmentMap {
    fragments: Vec<Fragment>,
    record_lengths: Vec<u64>,
}

impl FragmentMap {
    /// Build a fragment map, checking that it is a well-formed oracle
    ///
    /// Checks that fragments are non-empty, sorted by `joined_start`,
    /// non-overlapping, inside `joined_len`, name an existing record, and fit
    /// within that record's declared length.
    pub fn new(
        fragments: Vec<Fragment>,
        record_lengths: Vec<u64>,
        joined_len: u64,
    ) -> Result<Self> {
        let mut previous_end = 0u64;
        for (i, fragment) in fragments.iter().enumerate() {
            let invalid =
                |msg: String| InspectError::invalid_index(format!("fragment {}: {}", i, msg));

            if fragment.len == 0 {
                return Err(invalid("empty fragment".to_string()));
            }
            if fragment.joined_start < previous_end {
                return Err(invalid(format!(
                    "starts at joined position {} before the previous fragment ends ({})",
                    fragment.joined_start, previous_end
                )));
            }
            let joined_end = fragment
                .joined_start
                .checked_add(fragment.len)
                .filter(|&end| end <= joined_len)
                .ok_or_else(|| {
                    invalid(format!(
                        "covers joined positions past the joined length {}",
                        joined_len
                    ))
                })?;
            let record_length = record_lengths
                .get(fragment.record_id as usize)
                .copied()
                .ok_or_else(|| {
                    invalid(format!(
                        "names record {} but the index has {} records",
                        fragment.record_id,
                        record_lengths.len()
                    ))
                })?;
            let fits = fragment
                .record_offset
                .checked_add(fragment.len)
                .map_or(false, |end| end <= record_length);
            if !fits {
                return Err(invalid(format!(
                    "offsets {}..+{} exceed record {} length {}",
                    fragment.record_offset, fragment.len, fragment.record_id, record_length
                )));
            }
            previous_end = joined_end;
        }

        Ok(Self {
            fragments,
            record_lengths,
        })
    }

    /// All fragments in joined order
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Declared lengths, indexed by record id
    pub fn record_lengths(&self) -> &[u64] {
        &self.record_lengths
    }

    /// Fragment covering `position`, if any
    pub fn fragment_at(&self, position: u64) -> Option<&Fragment> {
        let idx = self
            .fragments
            .partition_point(|f| f.joined_start <= position)
            .checked_sub(1)?;
        let fragment = &self.fragments[idx];
        (position < fragment.joined_end()).then_some(fragment)
    }
}

impl MappingOracle for FragmentMap {
    fn map(&self, position: u64) -> Mapping {
        match self.fragment_at(position) {
            Some(fragment) => Mapping::owned(
                fragment.record_id,
                fragment.record_offset + (position - fragment.joined_start),
                self.record_lengths[fragment.record_id as usize],
            ),
            None => Mapping::Unowned,
        }
    }
}
