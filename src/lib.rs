//! refinspect: reconstruct reference sequences from a joined sequence index
//!
//! # Overview
//!
//! Sequence indexes commonly store every reference record concatenated into
//! one packed "joined" sequence, with masked stretches (runs of `N`, IUPAC
//! codes) left out. refinspect walks that joined sequence once, asks a
//! mapping oracle which record and offset each position belongs to, and
//! reassembles the original records with gaps restored as `N`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use refinspect::{inspect, InspectMode, JoinedIndex, LineWidth};
//!
//! # fn main() -> refinspect::Result<()> {
//! let index = JoinedIndex::load("indexes/lambda_virus")?;
//! let width = LineWidth::new(80)?;
//! inspect(&index, InspectMode::Sequences(width), std::io::stdout().lock())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Synthetic Oracles
//!
//! The reconstructor only depends on the [`MappingOracle`] and
//! [`JoinedSequence`] traits, so it can be driven without an index:
//!
//! ```
//! use refinspect::{reconstruct, Mapping, Record};
//!
//! let records = [Record::new("r0", 4)];
//! let joined: &[u8] = b"AG";
//! let oracle = |pos: u64| Mapping::owned(0, pos * 2, 4);
//!
//! let rec = reconstruct(joined, &oracle, &records).next().unwrap();
//! assert_eq!(rec.sequence, b"ANGN");
//! ```
//!
//! ## Module Organization
//!
//! - [`oracle`]: the mapping and joined-sequence capabilities
//! - [`reconstruct`](mod@reconstruct): the single-pass record reconstructor
//! - [`inspect`](mod@inspect): FASTA and name-only emitters
//! - [`index`]: on-disk joined index (load, write, build)
//! - [`io`]: compression-aware file access and FASTA reading/writing

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod index;
pub mod inspect;
pub mod io;
pub mod oracle;
pub mod reconstruct;
pub mod types;

// Re-export commonly used types
pub use error::{InspectError, Result};
pub use index::JoinedIndex;
pub use inspect::{inspect, write_names, write_sequences, InspectMode};
pub use io::fasta::{FastaWriter, LineWidth, DEFAULT_LINE_WIDTH};
pub use oracle::{JoinedSequence, Mapping, MappingOracle};
pub use reconstruct::{reconstruct, AssembledRecord, Reconstructor, ScanState, GAP_SYMBOL};
pub use types::{FastaRecord, Record};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
