//! FASTA streaming parser
//!
//! # Format
//!
//! FASTA format consists of:
//! - Header line starting with '>' followed by sequence identifier
//! - Zero or more sequence lines (can be wrapped)
//!
//! Example:
//! ```text
//! >sequence1 description
//! GATTACAGATTACA
//! TGCATGCA
//! >sequence2
//! ACGTACGT
//! ```
//!
//! Reference FASTA may legitimately contain records with no sequence lines;
//! those parse as records with an empty sequence.

use crate::error::{InspectError, Result};
use crate::io::compression::open_reader;
use crate::types::FastaRecord;
use std::io::BufRead;
use std::path::Path;

/// FASTA streaming parser
///
/// Records are parsed one at a time; only the current record is held in
/// memory.
///
/// # Example
///
/// ```no_run
/// use refinspect::io::fasta::FastaStream;
///
/// let stream = FastaStream::from_path("genome.fa.gz")?;
/// for record in stream {
///     let record = record?;
///     println!("{}: {} bp", record.id, record.sequence.len());
/// }
/// # Ok::<(), refinspect::InspectError>(())
/// ```
pub struct FastaStream<R: BufRead> {
    reader: R,
    line_buffer: String,
    line_number: usize,
    finished: bool,
    /// Peek buffer for look-ahead (to detect next record start)
    next_line: Option<String>,
}

impl FastaStream<Box<dyn BufRead + Send>> {
    /// Create a FASTA stream from a local file path (plain or gzip)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_reader(open_reader(path)?))
    }
}

impl<R: BufRead> FastaStream<R> {
    /// Create a FASTA stream from any buffered reader
    ///
    /// This is useful for testing or reading from in-memory sources.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_buffer: String::with_capacity(256),
            line_number: 0,
            finished: false,
            next_line: None,
        }
    }

    /// Read the next non-empty line, or `None` at EOF
    fn next_nonempty_line(&mut self) -> Result<Option<String>> {
        loop {
            self.line_buffer.clear();
            if self.reader.read_line(&mut self.line_buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = self.line_buffer.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    /// Read a single FASTA record
    fn read_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.finished {
            return Ok(None);
        }

        let header = match self.next_line.take() {
            Some(peeked) => peeked,
            None => match self.next_nonempty_line()? {
                Some(line) => line,
                None => {
                    self.finished = true;
                    return Ok(None);
                }
            },
        };

        let Some(rest) = header.strip_prefix('>') else {
            self.finished = true;
            return Err(InspectError::InvalidFastaFormat {
                line: self.line_number,
                msg: format!("Expected '>' at start of header, got: {}", header),
            });
        };

        // ID is everything after '>' up to the first whitespace
        let id = rest.split_whitespace().next().unwrap_or("").to_string();

        let mut sequence = Vec::new();
        loop {
            match self.next_nonempty_line()? {
                None => {
                    self.finished = true;
                    break;
                }
                Some(line) if line.starts_with('>') => {
                    self.next_line = Some(line);
                    break;
                }
                Some(line) => sequence.extend_from_slice(line.as_bytes()),
            }
        }

        Ok(Some(FastaRecord::new(id, sequence)))
    }
}

impl<R: BufRead> Iterator for FastaStream<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn parse(fasta: &[u8]) -> Result<Vec<FastaRecord>> {
        FastaStream::from_reader(BufReader::new(Cursor::new(fasta))).collect()
    }

    #[test]
    fn test_parse_single_record() {
        let records = parse(b">seq1\nGATTACA\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].sequence, b"GATTACA");
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let records = parse(b">seq1\nGATT\nACA\n>seq2\nACGT\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, b"GATTACA");
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].sequence, b"ACGT");
    }

    #[test]
    fn test_parse_with_description() {
        let records = parse(b">chr1 Homo sapiens chromosome 1\nNNACGT\n").unwrap();
        assert_eq!(records[0].id, "chr1");
        assert_eq!(records[0].sequence, b"NNACGT");
    }

    #[test]
    fn test_parse_with_empty_lines() {
        let records = parse(b">seq1\n\nGATTACA\n\n>seq2\nACGT\n\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, b"GATTACA");
    }

    #[test]
    fn test_parse_crlf() {
        let records = parse(b">seq1\r\nACGT\r\nTT\r\n").unwrap();
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].sequence, b"ACGTTT");
    }

    #[test]
    fn test_empty_sequence_is_a_record() {
        let records = parse(b">seq1\n>seq2\nACGT\n>seq3\n").unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].sequence.is_empty());
        assert_eq!(records[1].sequence, b"ACGT");
        assert!(records[2].sequence.is_empty());
    }

    #[test]
    fn test_invalid_no_header() {
        let mut stream = FastaStream::from_reader(BufReader::new(Cursor::new(b"GATTACA\n")));
        let result = stream.next().unwrap();
        assert!(matches!(
            result.unwrap_err(),
            InspectError::InvalidFastaFormat { line: 1, .. }
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_empty_file() {
        assert!(parse(b"").unwrap().is_empty());
        assert!(parse(b"\n\n").unwrap().is_empty());
    }

    use proptest::prelude::*;

    proptest! {
        /// Wrapped sequence lines are joined back into one sequence
        #[test]
        fn test_fasta_multiline(
            id in "[A-Za-z0-9_]{1,50}",
            seq in "[ACGTN]{1,500}",
            width in 1..100usize,
        ) {
            let mut fasta = format!(">{}\n", id);
            for chunk in seq.as_bytes().chunks(width) {
                fasta.push_str(std::str::from_utf8(chunk).unwrap());
                fasta.push('\n');
            }

            let records = parse(fasta.as_bytes()).unwrap();
            prop_assert_eq!(records.len(), 1);
            prop_assert_eq!(&records[0].id, &id);
            prop_assert_eq!(&records[0].sequence, seq.as_bytes());
        }
    }
}
