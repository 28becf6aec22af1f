//! Index serialization
//!
//! Writes the two index files described in [`super::format`]. Byte order
//! defaults to the host's; gzip compression is optional and transparent to
//! [`JoinedIndex::load`].

use super::format::{meta_path, seq_path, write_u32, write_u64, Endianness, META_MAGIC, SEQ_MAGIC};
use super::JoinedIndex;
use crate::error::{InspectError, Result};
use crate::oracle::JoinedSequence;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writer for `<base>.1.jdx` / `<base>.2.jdx`
#[derive(Debug, Clone, Copy)]
pub struct IndexWriter {
    endianness: Endianness,
    compress: bool,
}

impl Default for IndexWriter {
    fn default() -> Self {
        Self {
            endianness: Endianness::native(),
            compress: false,
        }
    }
}

impl IndexWriter {
    /// Writer using host byte order, uncompressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Write integers in the given byte order
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Gzip-compress both files
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Write `index` next to `base`
    pub fn write<P: AsRef<Path>>(&self, index: &JoinedIndex, base: P) -> Result<()> {
        let base = base.as_ref();

        let path = meta_path(base);
        self.write_file(&path, |w| self.write_metadata(index, w))?;
        debug!(path = %path.display(), byte_order = %self.endianness, "wrote index metadata");

        let path = seq_path(base);
        self.write_file(&path, |w| self.write_sequence(index, w))?;
        debug!(path = %path.display(), bases = index.joined_len(), "wrote joined sequence");

        Ok(())
    }

    fn write_file<F>(&self, path: &Path, body: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let file = File::create(path).map_err(|e| {
            io::Error::new(e.kind(), format!("Failed to create {:?}: {}", path, e))
        })?;
        let mut out = BufWriter::new(file);

        if self.compress {
            let mut encoder = GzEncoder::new(&mut out, Compression::default());
            body(&mut encoder)?;
            encoder.finish()?;
        } else {
            body(&mut out)?;
        }

        out.flush()?;
        Ok(())
    }

    /// Serialize the metadata file to any writer
    pub fn write_metadata(&self, index: &JoinedIndex, w: &mut dyn Write) -> Result<()> {
        let order = self.endianness;
        let fragments = index.oracle().fragments();

        w.write_all(META_MAGIC)?;
        write_u32(w, order, 1)?;
        write_u32(w, order, count_u32(index.records().len(), "records")?)?;
        write_u32(w, order, count_u32(fragments.len(), "fragments")?)?;
        write_u64(w, order, index.joined_len())?;

        for record in index.records() {
            write_u64(w, order, record.length)?;
        }
        for fragment in fragments {
            write_u64(w, order, fragment.joined_start)?;
            write_u32(w, order, fragment.record_id)?;
            write_u64(w, order, fragment.record_offset)?;
            write_u64(w, order, fragment.len)?;
        }

        let mut names = Vec::new();
        for record in index.records() {
            if record.name.as_bytes().contains(&0) {
                return Err(InspectError::InvalidInput {
                    msg: format!("record name {:?} contains a NUL byte", record.name),
                });
            }
            names.extend_from_slice(record.name.as_bytes());
            names.push(0);
        }
        write_u32(w, order, count_u32(names.len(), "name table bytes")?)?;
        w.write_all(&names)?;
        Ok(())
    }

    /// Serialize the sequence file to any writer
    pub fn write_sequence(&self, index: &JoinedIndex, w: &mut dyn Write) -> Result<()> {
        let order = self.endianness;
        w.write_all(SEQ_MAGIC)?;
        write_u32(w, order, 1)?;
        write_u64(w, order, index.joined().len())?;
        w.write_all(index.joined().as_packed())?;
        Ok(())
    }
}

fn count_u32(count: usize, what: &str) -> Result<u32> {
    u32::try_from(count).map_err(|_| InspectError::InvalidInput {
        msg: format!("{} {} do not fit the index format", count, what),
    })
}
