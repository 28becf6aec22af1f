//! Compression-aware file access
//!
//! Index and FASTA inputs may be plain or gzip-compressed (including bgzip,
//! which is a series of gzip members). Compression is sniffed from the file
//! magic rather than the extension, so `genome.fa` holding gzip data still
//! opens correctly.
//!
//! Large uncompressed files are memory-mapped instead of copied onto the heap.

use crate::error::Result;
use flate2::bufread::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::ops::Deref;
use std::path::Path;
use tracing::debug;

/// Memory-mapped file threshold (50 MB)
///
/// Below this size a plain read is cheaper than setting up the mapping.
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path` with the offending path attached to the error
fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to open {:?}: {}", path, e)).into()
    })
}

/// Check whether a buffered reader starts with the gzip magic
fn is_gzip<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    let head = reader.fill_buf()?;
    Ok(head.len() >= 2 && head[..2] == GZIP_MAGIC)
}

/// Open a file for streaming reads, transparently decompressing gzip
///
/// # Example
///
/// ```no_run
/// use refinspect::io::compression::open_reader;
/// use std::io::BufRead;
///
/// let reader = open_reader("genome.fa.gz")?;
/// for line in reader.lines() {
///     let _line = line?;
/// }
/// # Ok::<(), refinspect::InspectError>(())
/// ```
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(open_file(path)?);

    if is_gzip(&mut reader)? {
        debug!(path = %path.display(), "opening gzip-compressed input");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Fully resident contents of a file
///
/// Either an owned heap buffer or a read-only memory map. Both dereference
/// to the file's (decompressed) bytes and release their storage on drop.
#[derive(Debug)]
pub enum FileBytes {
    /// Bytes read (and decompressed if needed) onto the heap
    Heap(Vec<u8>),
    /// Read-only memory map of an uncompressed file
    Mapped(Mmap),
}

impl FileBytes {
    /// Whether the bytes are backed by a memory map
    pub fn is_mapped(&self) -> bool {
        matches!(self, FileBytes::Mapped(_))
    }
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Heap(bytes) => bytes,
            FileBytes::Mapped(map) => map,
        }
    }
}

/// Load a whole file into memory
///
/// - gzip files are decompressed onto the heap
/// - uncompressed files of at least [`MMAP_THRESHOLD`] bytes are memory-mapped
/// - smaller uncompressed files are read onto the heap
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<FileBytes> {
    read_bytes_with_threshold(path.as_ref(), MMAP_THRESHOLD)
}

pub(crate) fn read_bytes_with_threshold(path: &Path, mmap_threshold: u64) -> Result<FileBytes> {
    let file = open_file(path)?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    if is_gzip(&mut reader)? {
        let mut bytes = Vec::with_capacity(file_size as usize);
        MultiGzDecoder::new(reader).read_to_end(&mut bytes)?;
        debug!(
            path = %path.display(),
            compressed = file_size,
            decompressed = bytes.len(),
            "decompressed gzip input onto the heap"
        );
        return Ok(FileBytes::Heap(bytes));
    }

    if file_size > 0 && file_size >= mmap_threshold {
        let file = reader.into_inner();
        // SAFETY: the map is read-only and the index files are not expected
        // to be modified while an inspection is running.
        let map = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), bytes = file_size, "memory-mapped input");
        return Ok(FileBytes::Mapped(map));
    }

    let mut bytes = Vec::with_capacity(file_size as usize);
    reader.read_to_end(&mut bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read input onto the heap");
    Ok(FileBytes::Heap(bytes))
}
