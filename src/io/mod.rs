//! I/O module: compression-aware file access and FASTA reading/writing

pub mod compression;
pub mod fasta;

pub use compression::{open_reader, read_bytes, FileBytes, MMAP_THRESHOLD};
pub use fasta::{FastaStream, FastaWriter, LineWidth};
