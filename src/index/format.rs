//! On-disk layout shared by the index reader and writer
//!
//! An index named `<base>` is stored in two files:
//!
//! ## `<base>.1.jdx` (metadata)
//! - Magic: `"JDX\1"` (4 bytes)
//! - Endian word: `1` (u32, in the file's byte order)
//! - n_records (u32), n_fragments (u32), joined_len (u64)
//! - Record lengths: n_records × u64
//! - Fragments: n_fragments × (joined_start u64, record_id u32, record_offset u64, len u64)
//! - l_nm (u32) followed by l_nm bytes of NUL-terminated record names
//!
//! ## `<base>.2.jdx` (joined sequence)
//! - Magic: `"JDX\2"` (4 bytes)
//! - Endian word: `1` (u32)
//! - n_bases (u64)
//! - Packed bases: ceil(n_bases / 4) bytes, see [`super::packed`]
//!
//! Either file may be gzip-compressed. The endian word lets an index written
//! on a big-endian host be read on a little-endian one and vice versa.

use crate::error::{InspectError, Result};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Metadata file magic
pub const META_MAGIC: &[u8; 4] = b"JDX\x01";

/// Sequence file magic
pub const SEQ_MAGIC: &[u8; 4] = b"JDX\x02";

/// Metadata file suffix appended to the index base
pub const META_SUFFIX: &str = ".1.jdx";

/// Sequence file suffix appended to the index base
pub const SEQ_SUFFIX: &str = ".2.jdx";

/// Byte length of the sequence file header (magic + endian word + n_bases)
pub const SEQ_HEADER_LEN: usize = 4 + 4 + 8;

/// Largest declared record length an index may carry (16 Gbp)
///
/// Every reconstructed record is held in memory at its declared length, so
/// anything larger is treated as a corrupt length field.
pub const MAX_RECORD_LENGTH: u64 = 1 << 34;

/// Path of the metadata file for `base`
pub fn meta_path(base: &Path) -> PathBuf {
    with_suffix(base, META_SUFFIX)
}

/// Path of the sequence file for `base`
pub fn seq_path(base: &Path) -> PathBuf {
    with_suffix(base, SEQ_SUFFIX)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Byte order of an index file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl Endianness {
    /// Byte order of the running host
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    /// Detect the byte order from the raw bytes of the endian word
    pub fn detect(word: [u8; 4]) -> Result<Self> {
        match u32::from_le_bytes(word) {
            1 => Ok(Endianness::Little),
            0x0100_0000 => Ok(Endianness::Big),
            other => Err(InspectError::invalid_index(format!(
                "bad endian word {:#010x}; expected 1 in either byte order",
                other
            ))),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little"),
            Endianness::Big => write!(f, "big"),
        }
    }
}

/// Read and check a 4-byte magic string
pub(crate) fn read_magic<R: Read + ?Sized>(
    reader: &mut R,
    expected: &[u8; 4],
    what: &str,
) -> Result<()> {
    let mut magic = [0u8; 4];
    read_exact(reader, &mut magic, "magic")?;
    if &magic != expected {
        return Err(InspectError::invalid_index(format!(
            "invalid {} magic: expected {:?}, got {:?}",
            what, expected, magic
        )));
    }
    Ok(())
}

/// Read the endian word and detect the byte order
pub(crate) fn read_endianness<R: Read + ?Sized>(reader: &mut R) -> Result<Endianness> {
    let mut word = [0u8; 4];
    read_exact(reader, &mut word, "endian word")?;
    Endianness::detect(word)
}

/// `read_exact` that reports truncation as a corrupt index
pub(crate) fn read_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    field: &str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            InspectError::invalid_index(format!("file truncated while reading {}", field))
        } else {
            InspectError::Io(e)
        }
    })
}

pub(crate) fn read_u32<R: Read + ?Sized>(
    reader: &mut R,
    order: Endianness,
    field: &str,
) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, field)?;
    Ok(match order {
        Endianness::Little => u32::from_le_bytes(buf),
        Endianness::Big => u32::from_be_bytes(buf),
    })
}

pub(crate) fn read_u64<R: Read + ?Sized>(
    reader: &mut R,
    order: Endianness,
    field: &str,
) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf, field)?;
    Ok(match order {
        Endianness::Little => u64::from_le_bytes(buf),
        Endianness::Big => u64::from_be_bytes(buf),
    })
}

pub(crate) fn write_u32<W: Write + ?Sized>(
    writer: &mut W,
    order: Endianness,
    value: u32,
) -> io::Result<()> {
    match order {
        Endianness::Little => writer.write_all(&value.to_le_bytes()),
        Endianness::Big => writer.write_all(&value.to_be_bytes()),
    }
}

pub(crate) fn write_u64<W: Write + ?Sized>(
    writer: &mut W,
    order: Endianness,
    value: u64,
) -> io::Result<()> {
    match order {
        Endianness::Little => writer.write_all(&value.to_le_bytes()),
        Endianness::Big => writer.write_all(&value.to_be_bytes()),
    }
}

/// Parse exactly `expected` NUL-terminated names from `buf`
///
/// Empty names are kept; a record may legitimately have an empty label.
pub(crate) fn parse_names(buf: &[u8], expected: usize) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(expected);
    let mut start = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if byte == 0 {
            let name = std::str::from_utf8(&buf[start..i]).map_err(|e| {
                InspectError::invalid_index(format!("invalid UTF-8 in record name: {}", e))
            })?;
            names.push(name.to_string());
            start = i + 1;
        }
    }

    if start != buf.len() {
        return Err(InspectError::invalid_index(
            "record name table is missing its final NUL terminator",
        ));
    }
    if names.len() != expected {
        return Err(InspectError::invalid_index(format!(
            "header claims {} records but the name table has {} names",
            expected,
            names.len()
        )));
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_paths() {
        let base = Path::new("/data/hg38");
        assert_eq!(meta_path(base), PathBuf::from("/data/hg38.1.jdx"));
        assert_eq!(seq_path(base), PathBuf::from("/data/hg38.2.jdx"));

        // Dots in the base name are kept
        assert_eq!(
            seq_path(Path::new("lambda.v2")),
            PathBuf::from("lambda.v2.2.jdx")
        );
    }

    #[test]
    fn test_detect_endianness() {
        let little = Endianness::detect(1u32.to_le_bytes()).unwrap();
        let big = Endianness::detect(1u32.to_be_bytes()).unwrap();
        assert_eq!(little, Endianness::Little);
        assert_eq!(big, Endianness::Big);
        assert!(Endianness::detect([0, 0, 0, 0]).is_err());
        assert!(Endianness::detect([2, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_native_matches_target() {
        let native = Endianness::native();
        assert_eq!(native == Endianness::Big, cfg!(target_endian = "big"));
        assert_eq!(Endianness::Little.to_string(), "little");
        assert_eq!(Endianness::Big.to_string(), "big");
    }

    #[test]
    fn test_integers_in_both_orders() {
        for order in [Endianness::Little, Endianness::Big] {
            let mut buf = Vec::new();
            write_u32(&mut buf, order, 0xDEAD_BEEF).unwrap();
            write_u64(&mut buf, order, 0x0123_4567_89AB_CDEF).unwrap();

            let mut cursor = Cursor::new(buf);
            assert_eq!(read_u32(&mut cursor, order, "a").unwrap(), 0xDEAD_BEEF);
            let value = read_u64(&mut cursor, order, "b").unwrap();
            assert_eq!(value, 0x0123_4567_89AB_CDEF);
        }
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = Vec::new();
        write_u32(&mut buf, Endianness::Big, 1).unwrap();
        assert_eq!(buf, [0, 0, 0, 1]);
    }

    #[test]
    fn test_truncation_is_invalid_index() {
        let mut cursor = Cursor::new(vec![1u8, 2]);
        let err = read_u32(&mut cursor, Endianness::Little, "n_records").unwrap_err();
        assert!(matches!(err, InspectError::InvalidIndex { .. }));
        assert!(err.to_string().contains("n_records"));
    }

    #[test]
    fn test_read_magic() {
        let good = read_magic(&mut Cursor::new(b"JDX\x01"), META_MAGIC, "metadata");
        assert!(good.is_ok());
        let bad = read_magic(&mut Cursor::new(b"JDX\x02"), META_MAGIC, "metadata");
        assert!(bad.is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            parse_names(b"chr1\0chr2\0chrM\0", 3).unwrap(),
            vec!["chr1", "chr2", "chrM"]
        );
        assert_eq!(parse_names(b"\0chr2\0", 2).unwrap(), vec!["", "chr2"]);
        assert!(parse_names(b"", 0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_names_errors() {
        // count mismatch
        assert!(parse_names(b"chr1\0chr2\0", 3).is_err());
        // missing terminator
        assert!(parse_names(b"chr1\0chr2", 2).is_err());
        // invalid UTF-8
        assert!(parse_names(b"\xff\xfe\0", 1).is_err());
    }
}
