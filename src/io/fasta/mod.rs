//! FASTA format support: streaming parser and line-wrapping writer
//!
//! # Reading
//!
//! ```no_run
//! use refinspect::io::fasta::FastaStream;
//!
//! let stream = FastaStream::from_path("genome.fa.gz")?;
//! for record in stream {
//!     let record = record?;
//!     println!("{}: {} bp", record.id, record.sequence.len());
//! }
//! # Ok::<(), refinspect::InspectError>(())
//! ```
//!
//! # Writing
//!
//! ```
//! use refinspect::io::fasta::FastaWriter;
//!
//! # fn main() -> refinspect::Result<()> {
//! let mut writer = FastaWriter::new(std::io::stdout().lock());
//! writer.write("chr1", b"ACGTNNNNACGT")?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

mod parser;
mod writer;

pub use parser::FastaStream;
pub use writer::{wrap_sequence, FastaWriter, LineWidth, DEFAULT_LINE_WIDTH};
