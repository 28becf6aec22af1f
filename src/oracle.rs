//! Capabilities the reconstructor depends on
//!
//! The reconstructor never looks inside an index. It needs two things:
//!
//! - a [`JoinedSequence`]: the concatenated symbols, addressable by position
//! - a [`MappingOracle`]: which record (and where in it) a position belongs to
//!
//! Both are traits so the core can be driven by a real [`JoinedIndex`] or by
//! a few lines of synthetic test data.
//!
//! [`JoinedIndex`]: crate::index::JoinedIndex

/// Result of resolving one joined-sequence position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// The position holds a real symbol of a record
    Owned {
        /// Identity of the owning record (index into the record collection)
        record_id: u32,
        /// Offset of the symbol within the record
        offset: u64,
        /// Declared total length of the owning record
        length: u64,
    },
    /// Structural filler that belongs to no record
    Unowned,
}

impl Mapping {
    /// Construct an owned mapping
    pub fn owned(record_id: u32, offset: u64, length: u64) -> Self {
        Mapping::Owned {
            record_id,
            offset,
            length,
        }
    }

    /// `(record_id, offset, length)` if the position is owned and the
    /// offset lies within the record
    ///
    /// An "owned" answer whose offset is not below its length breaks the
    /// oracle contract and is reported as `None`, same as [`Mapping::Unowned`].
    ///
    /// ```
    /// use refinspect::Mapping;
    ///
    /// assert_eq!(Mapping::owned(0, 4, 5).in_bounds(), Some((0, 4, 5)));
    /// assert_eq!(Mapping::owned(0, 5, 5).in_bounds(), None);
    /// assert_eq!(Mapping::Unowned.in_bounds(), None);
    /// ```
    pub fn in_bounds(self) -> Option<(u32, u64, u64)> {
        match self {
            Mapping::Owned {
                record_id,
                offset,
                length,
            } if offset < length => Some((record_id, offset, length)),
            _ => None,
        }
    }
}

/// Maps joined-sequence positions to records
///
/// Implementations must satisfy: for every owned answer,
/// `offset < length`, and within one record's span owned offsets never go
/// backwards as the position increases. The reconstructor tolerates
/// violations by skipping the offending positions.
pub trait MappingOracle {
    /// Resolve a joined-sequence position
    fn map(&self, position: u64) -> Mapping;
}

impl<F> MappingOracle for F
where
    F: Fn(u64) -> Mapping,
{
    fn map(&self, position: u64) -> Mapping {
        self(position)
    }
}

/// A fully resident, position-addressable symbol sequence
pub trait JoinedSequence {
    /// Number of positions
    fn len(&self) -> u64;

    /// Symbol at `position` (must be `< len()`)
    fn symbol(&self, position: u64) -> u8;

    /// Whether the sequence has no positions
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JoinedSequence for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn symbol(&self, position: u64) -> u8 {
        self[position as usize]
    }
}

impl JoinedSequence for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn symbol(&self, position: u64) -> u8 {
        self[position as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_an_oracle() {
        let oracle = |pos: u64| {
            if pos < 3 {
                Mapping::owned(0, pos, 3)
            } else {
                Mapping::Unowned
            }
        };
        assert_eq!(oracle.map(1), Mapping::owned(0, 1, 3));
        assert_eq!(oracle.map(3), Mapping::Unowned);
    }

    #[test]
    fn test_slice_joined_sequence() {
        let joined: &[u8] = b"ACGT";
        assert_eq!(JoinedSequence::len(joined), 4);
        assert_eq!(joined.symbol(2), b'G');
        assert!(!JoinedSequence::is_empty(joined));

        let empty: Vec<u8> = Vec::new();
        assert!(JoinedSequence::is_empty(&empty));
    }
}
