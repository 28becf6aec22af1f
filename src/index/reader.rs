//! Index loading with byte-order normalization

use super::format::{
    meta_path, parse_names, read_endianness, read_magic, read_u32, read_u64, seq_path,
    Endianness, MAX_RECORD_LENGTH, META_MAGIC, SEQ_HEADER_LEN, SEQ_MAGIC,
};
use super::{Fragment, FragmentMap, JoinedIndex, PackedSequence};
use crate::error::{InspectError, Result};
use crate::io::compression::{open_reader, read_bytes};
use crate::types::Record;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Upper bound on up-front allocation driven by header counts
///
/// Counts come from the file and may be garbage; vectors still grow past
/// this as entries are actually read.
const MAX_PREALLOC: usize = 1 << 16;

/// Decoded contents of a metadata file
#[derive(Debug)]
pub(crate) struct Metadata {
    pub(crate) endianness: Endianness,
    pub(crate) records: Vec<Record>,
    pub(crate) fragments: Vec<Fragment>,
    pub(crate) joined_len: u64,
}

/// Parse a metadata stream
pub(crate) fn parse_metadata<R: Read>(reader: &mut R) -> Result<Metadata> {
    read_magic(reader, META_MAGIC, "metadata")?;
    let order = read_endianness(reader)?;

    let n_records = read_u32(reader, order, "n_records")? as usize;
    let n_fragments = read_u32(reader, order, "n_fragments")? as usize;
    let joined_len = read_u64(reader, order, "joined_len")?;

    let mut lengths = Vec::with_capacity(n_records.min(MAX_PREALLOC));
    for i in 0..n_records {
        let length = read_u64(reader, order, "record length")?;
        if length > MAX_RECORD_LENGTH || usize::try_from(length).is_err() {
            return Err(InspectError::invalid_index(format!(
                "record {} declares length {}, above the supported maximum of {}",
                i, length, MAX_RECORD_LENGTH
            )));
        }
        lengths.push(length);
    }

    let mut fragments = Vec::with_capacity(n_fragments.min(MAX_PREALLOC));
    for _ in 0..n_fragments {
        fragments.push(Fragment {
            joined_start: read_u64(reader, order, "fragment joined_start")?,
            record_id: read_u32(reader, order, "fragment record_id")?,
            record_offset: read_u64(reader, order, "fragment record_offset")?,
            len: read_u64(reader, order, "fragment len")?,
        });
    }

    let l_nm = read_u32(reader, order, "l_nm")? as u64;
    let mut names_buf = Vec::new();
    let read = Read::take(&mut *reader, l_nm).read_to_end(&mut names_buf)?;
    if read as u64 != l_nm {
        return Err(InspectError::invalid_index(format!(
            "name table truncated: expected {} bytes, found {}",
            l_nm, read
        )));
    }
    let names = parse_names(&names_buf, n_records)?;

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(InspectError::invalid_index(
            "unexpected trailing bytes after the name table",
        ));
    }

    let records = names
        .into_iter()
        .zip(lengths)
        .map(|(name, length)| Record::new(name, length))
        .collect();

    Ok(Metadata {
        endianness: order,
        records,
        fragments,
        joined_len,
    })
}

/// Parse the sequence file header, returning its byte order and base count
pub(crate) fn parse_sequence_header(bytes: &[u8]) -> Result<(Endianness, u64)> {
    if bytes.len() < SEQ_HEADER_LEN {
        return Err(InspectError::invalid_index(format!(
            "sequence file is {} bytes, shorter than its {}-byte header",
            bytes.len(),
            SEQ_HEADER_LEN
        )));
    }
    let mut header = Cursor::new(&bytes[..SEQ_HEADER_LEN]);
    read_magic(&mut header, SEQ_MAGIC, "sequence")?;
    let order = read_endianness(&mut header)?;
    let n_bases = read_u64(&mut header, order, "n_bases")?;
    Ok((order, n_bases))
}

impl JoinedIndex {
    /// Load an index from `<base>.1.jdx` and `<base>.2.jdx`
    ///
    /// Both files are validated; any structural problem is reported as
    /// [`InspectError::InvalidIndex`]. The joined sequence stays fully
    /// resident (heap or memory map) until the index is dropped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use refinspect::JoinedIndex;
    ///
    /// let index = JoinedIndex::load("indexes/lambda_virus")?;
    /// for record in index.records() {
    ///     println!("{}\t{}", record.name, record.length);
    /// }
    /// # Ok::<(), refinspect::InspectError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref();

        let meta_file = meta_path(base);
        let metadata =
            parse_metadata(&mut open_reader(&meta_file)?).map_err(|e| in_file(e, &meta_file))?;
        debug!(
            path = %meta_file.display(),
            byte_order = %metadata.endianness,
            records = metadata.records.len(),
            fragments = metadata.fragments.len(),
            joined_len = metadata.joined_len,
            "loaded index metadata"
        );

        let seq_file = seq_path(base);
        let bytes = read_bytes(&seq_file)?;
        let (seq_order, n_bases) =
            parse_sequence_header(&bytes).map_err(|e| in_file(e, &seq_file))?;
        if n_bases != metadata.joined_len {
            return Err(in_file(
                InspectError::invalid_index(format!(
                    "holds {} bases but the metadata declares a joined length of {}",
                    n_bases, metadata.joined_len
                )),
                &seq_file,
            ));
        }
        let joined = PackedSequence::from_file(bytes, SEQ_HEADER_LEN, n_bases)
            .map_err(|e| in_file(e, &seq_file))?;
        debug!(
            path = %seq_file.display(),
            byte_order = %seq_order,
            bases = n_bases,
            mapped = joined.is_mapped(),
            "loaded joined sequence"
        );

        let lengths = metadata.records.iter().map(|r| r.length).collect();
        let oracle = FragmentMap::new(metadata.fragments, lengths, metadata.joined_len)
            .map_err(|e| in_file(e, &meta_file))?;

        Ok(JoinedIndex {
            records: metadata.records,
            oracle,
            joined,
            endianness: Some(metadata.endianness),
        })
    }
}

/// Prefix an index validation error with the file it came from
fn in_file(err: InspectError, path: &Path) -> InspectError {
    match err {
        InspectError::InvalidIndex { msg } => {
            InspectError::invalid_index(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}
