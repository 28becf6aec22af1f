//! Common types used throughout refinspect

/// A reference record known to the index
///
/// The record's identity is its position in the index's record collection.
/// `length` counts every position the record logically occupies, including
/// masked stretches that never made it into the joined sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Display label (FASTA header without '>')
    pub name: String,
    /// Declared total length in bases
    pub length: u64,
}

impl Record {
    /// Create a new record
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }

    /// Check if the record has a declared length of zero
    ///
    /// # Examples
    ///
    /// ```
    /// use refinspect::Record;
    ///
    /// assert!(Record::new("empty", 0).is_empty());
    /// assert!(!Record::new("chr1", 248_956_422).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// A FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Sequence identifier (without '>' prefix)
    pub id: String,
    /// DNA sequence
    pub sequence: Vec<u8>,
}

impl FastaRecord {
    /// Create a new FASTA record
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self { id, sequence }
    }
}
