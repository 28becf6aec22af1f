//! FASTA writer with fixed-width line wrapping
//!
//! # Format
//!
//! Each record is written as a header line followed by the sequence split
//! into lines of exactly `width` symbols; only the final line may be shorter.
//!
//! ```text
//! >chr1
//! ACGTACGTAC
//! GTNNNNACGT
//! ACG
//! ```
//!
//! # Example
//!
//! ```
//! use refinspect::io::fasta::{FastaWriter, LineWidth};
//!
//! # fn main() -> refinspect::Result<()> {
//! let mut writer = FastaWriter::with_width(Vec::new(), LineWidth::new(4)?);
//! writer.write("chr1", b"ACGTACGTAC")?;
//! let out = writer.finish()?;
//! assert_eq!(out, b">chr1\nACGT\nACGT\nAC\n");
//! # Ok(())
//! # }
//! ```

use crate::error::{InspectError, Result};
use crate::types::FastaRecord;
use std::fmt;
use std::io::Write;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Default number of sequence symbols per FASTA line
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// Number of sequence symbols per FASTA line (at least 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineWidth(NonZeroUsize);

impl LineWidth {
    /// Create a line width, rejecting zero
    pub fn new(width: usize) -> Result<Self> {
        NonZeroUsize::new(width)
            .map(LineWidth)
            .ok_or(InspectError::InvalidLineWidth(width))
    }

    /// Width in symbols
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for LineWidth {
    fn default() -> Self {
        // DEFAULT_LINE_WIDTH is non-zero
        LineWidth(NonZeroUsize::new(DEFAULT_LINE_WIDTH).unwrap_or(NonZeroUsize::MIN))
    }
}

impl fmt::Display for LineWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LineWidth {
    type Err = InspectError;

    /// Parse a width; zero and negative values are rejected
    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s.trim().parse().map_err(|_| InspectError::InvalidInput {
            msg: format!("'{}' is not an integer", s),
        })?;
        if value < 1 {
            return Err(InspectError::InvalidLineWidth(value.max(0) as usize));
        }
        let width = usize::try_from(value).map_err(|_| InspectError::InvalidInput {
            msg: format!("line width {} is too large", value),
        })?;
        LineWidth::new(width)
    }
}

/// Split a sequence into lines of `width` symbols
///
/// Every line except possibly the last has exactly `width` symbols. An empty
/// sequence yields no lines.
pub fn wrap_sequence(sequence: &[u8], width: LineWidth) -> impl Iterator<Item = &[u8]> {
    sequence.chunks(width.get())
}

/// FASTA writer over any [`Write`] sink
///
/// The writer does not validate sequence content; any byte (including gap
/// placeholders) is written verbatim.
pub struct FastaWriter<W: Write> {
    writer: W,
    width: LineWidth,
    records_written: usize,
}

impl<W: Write> FastaWriter<W> {
    /// Create a writer using [`DEFAULT_LINE_WIDTH`]
    pub fn new(writer: W) -> Self {
        Self::with_width(writer, LineWidth::default())
    }

    /// Create a writer with an explicit line width
    pub fn with_width(writer: W, width: LineWidth) -> Self {
        Self {
            writer,
            width,
            records_written: 0,
        }
    }

    /// Line width in use
    pub fn width(&self) -> LineWidth {
        self.width
    }

    /// Write one record from its label and sequence
    pub fn write(&mut self, label: &str, sequence: &[u8]) -> Result<()> {
        self.writer.write_all(b">")?;
        self.writer.write_all(label.as_bytes())?;
        self.writer.write_all(b"\n")?;

        for line in wrap_sequence(sequence, self.width) {
            self.writer.write_all(line)?;
            self.writer.write_all(b"\n")?;
        }

        self.records_written += 1;
        Ok(())
    }

    /// Write a [`FastaRecord`]
    pub fn write_record(&mut self, record: &FastaRecord) -> Result<()> {
        self.write(&record.id, &record.sequence)
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(label: &str, sequence: &[u8], width: usize) -> String {
        let mut writer = FastaWriter::with_width(Vec::new(), LineWidth::new(width).unwrap());
        writer.write(label, sequence).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_line_width_rejects_zero() {
        assert!(matches!(
            LineWidth::new(0),
            Err(InspectError::InvalidLineWidth(0))
        ));
        assert_eq!(LineWidth::new(1).unwrap().get(), 1);
        assert_eq!(LineWidth::default().get(), DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn test_line_width_from_str() {
        assert_eq!("80".parse::<LineWidth>().unwrap().get(), 80);
        assert!(matches!(
            "0".parse::<LineWidth>(),
            Err(InspectError::InvalidLineWidth(0))
        ));
        assert!(matches!(
            "-5".parse::<LineWidth>(),
            Err(InspectError::InvalidLineWidth(0))
        ));
        assert!(matches!(
            "sixty".parse::<LineWidth>(),
            Err(InspectError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_exact_multiple_of_width() {
        assert_eq!(render("r", b"ACGTACGT", 4), ">r\nACGT\nACGT\n");
    }

    #[test]
    fn test_short_final_line() {
        assert_eq!(render("r", b"ACGTACGTA", 4), ">r\nACGT\nACGT\nA\n");
    }

    #[test]
    fn test_sequence_shorter_than_width() {
        assert_eq!(render("chr2", b"ACG", 60), ">chr2\nACG\n");
    }

    #[test]
    fn test_empty_sequence_writes_header_only() {
        assert_eq!(render("empty", b"", 60), ">empty\n");
    }

    #[test]
    fn test_gap_symbols_pass_through() {
        assert_eq!(render("r", b"ANNNNC", 3), ">r\nANN\nNNC\n");
    }

    #[test]
    fn test_records_written() {
        let mut writer = FastaWriter::new(Vec::new());
        writer.write_record(&FastaRecord::new("a".into(), b"AC".to_vec())).unwrap();
        writer.write_record(&FastaRecord::new("b".into(), b"GT".to_vec())).unwrap();
        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.finish().unwrap(), b">a\nAC\n>b\nGT\n");
    }

    proptest! {
        /// Stripping the header and newlines gives back the sequence, and
        /// every line but the last is exactly `width` long
        #[test]
        fn test_wrap_reassembles(seq in "[ACGTN]{0,400}", width in 1..120usize) {
            let text = render("rec", seq.as_bytes(), width);
            let mut lines: Vec<&str> = text.lines().collect();
            prop_assert_eq!(lines.remove(0), ">rec");

            prop_assert_eq!(lines.concat(), seq.clone());
            if let Some((last, full)) = lines.split_last() {
                prop_assert!(full.iter().all(|line| line.len() == width));
                prop_assert!(!last.is_empty() && last.len() <= width);
            }
        }
    }
}
