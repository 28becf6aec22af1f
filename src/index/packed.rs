//! 2-bit packed DNA storage for the joined sequence
//!
//! # Format
//!
//! - 4 bases per byte, first base in the high bits
//! - `A=0`, `C=1`, `G=2`, `T=3`
//! - Example: byte `0x1B` (`00 01 10 11`) -> `ACGT`
//!
//! Only unambiguous bases are ever packed; everything else is excluded from
//! the joined sequence when an index is built and comes back as a gap.

use crate::error::{InspectError, Result};
use crate::io::compression::FileBytes;
use crate::oracle::JoinedSequence;

/// 2-bit code to ASCII base lookup table
const BASE_LOOKUP: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Number of packed bytes needed for `n_bases`
pub fn packed_len(n_bases: u64) -> u64 {
    n_bases.div_ceil(4)
}

/// 2-bit code for an unambiguous base (case-insensitive)
pub fn base_code(base: u8) -> Option<u8> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Backing bytes of a packed sequence
#[derive(Debug)]
enum Storage {
    /// Packed bytes owned on the heap
    Heap(Vec<u8>),
    /// Packed bytes inside a loaded file, starting at `start`
    File { bytes: FileBytes, start: usize },
}

impl Storage {
    fn bytes(&self) -> &[u8] {
        match self {
            Storage::Heap(bytes) => bytes,
            Storage::File { bytes, start } => &bytes[*start..],
        }
    }
}

/// A joined sequence stored at 2 bits per base
///
/// # Example
///
/// ```
/// use refinspect::index::PackedSequence;
/// use refinspect::JoinedSequence;
///
/// # fn main() -> refinspect::Result<()> {
/// let packed = PackedSequence::pack(b"GATTACA")?;
/// assert_eq!(packed.len(), 7);
/// assert_eq!(packed.symbol(1), b'A');
/// assert_eq!(packed.unpack(), b"GATTACA");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PackedSequence {
    storage: Storage,
    len: u64,
}

impl PackedSequence {
    /// Pack ASCII bases; anything other than A/C/G/T (any case) is rejected
    pub fn pack(bases: &[u8]) -> Result<Self> {
        let mut packer = Packer::with_capacity(bases.len());
        for (i, &base) in bases.iter().enumerate() {
            if !packer.push(base) {
                return Err(InspectError::InvalidInput {
                    msg: format!("Cannot pack base {:?} at position {}", base as char, i),
                });
            }
        }
        Ok(packer.finish())
    }

    /// Wrap already-packed bytes holding `len` bases
    pub fn from_packed(bytes: Vec<u8>, len: u64) -> Result<Self> {
        check_packed_len(bytes.len(), len)?;
        Ok(Self {
            storage: Storage::Heap(bytes),
            len,
        })
    }

    /// Wrap the packed region of a loaded file, starting at byte `start`
    pub(crate) fn from_file(bytes: FileBytes, start: usize, len: u64) -> Result<Self> {
        let available = bytes.len().checked_sub(start).ok_or_else(|| {
            InspectError::invalid_index(format!(
                "packed data starts at byte {} but the file has {} bytes",
                start,
                bytes.len()
            ))
        })?;
        check_packed_len(available, len)?;
        Ok(Self {
            storage: Storage::File { bytes, start },
            len,
        })
    }

    /// Raw packed bytes
    pub fn as_packed(&self) -> &[u8] {
        let bytes = self.storage.bytes();
        &bytes[..packed_len(self.len) as usize]
    }

    /// Whether the packed bytes are memory-mapped
    pub fn is_mapped(&self) -> bool {
        matches!(&self.storage, Storage::File { bytes, .. } if bytes.is_mapped())
    }

    /// Decode the whole sequence to ASCII
    pub fn unpack(&self) -> Vec<u8> {
        (0..self.len).map(|i| self.symbol(i)).collect()
    }
}

fn check_packed_len(available: usize, len: u64) -> Result<()> {
    let required = packed_len(len);
    if (available as u64) != required {
        return Err(InspectError::invalid_index(format!(
            "{} bases need {} packed bytes, found {}",
            len, required, available
        )));
    }
    Ok(())
}

impl JoinedSequence for PackedSequence {
    fn len(&self) -> u64 {
        self.len
    }

    fn symbol(&self, position: u64) -> u8 {
        let byte = self.storage.bytes()[(position / 4) as usize];
        let shift = 6 - 2 * (position % 4);
        BASE_LOOKUP[((byte >> shift) & 0b11) as usize]
    }
}

/// Incremental 2-bit packer
#[derive(Debug, Default)]
pub(crate) struct Packer {
    bytes: Vec<u8>,
    len: u64,
}

impl Packer {
    pub(crate) fn with_capacity(n_bases: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(n_bases.div_ceil(4)),
            len: 0,
        }
    }

    /// Append a base; returns `false` (and appends nothing) for
    /// anything that is not A/C/G/T
    pub(crate) fn push(&mut self, base: u8) -> bool {
        let Some(code) = base_code(base) else {
            return false;
        };
        let slot = self.len % 4;
        if slot == 0 {
            self.bytes.push(0);
        }
        if let Some(last) = self.bytes.last_mut() {
            *last |= code << (6 - 2 * slot);
        }
        self.len += 1;
        true
    }

    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    pub(crate) fn finish(self) -> PackedSequence {
        PackedSequence {
            storage: Storage::Heap(self.bytes),
            len: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_acgt_single_byte() {
        let packed = PackedSequence::pack(b"ACGT").unwrap();
        assert_eq!(packed.as_packed(), &[0x1B]);
    }

    #[test]
    fn test_pack_partial_byte() {
        // T in the high bits, remaining slots zero
        let packed = PackedSequence::pack(b"ACGTT").unwrap();
        assert_eq!(packed.as_packed(), &[0x1B, 0xC0]);
        assert_eq!(packed.len(), 5);
        assert_eq!(packed.unpack(), b"ACGTT");
    }

    #[test]
    fn test_pack_lowercase_uppercases() {
        let packed = PackedSequence::pack(b"acgt").unwrap();
        assert_eq!(packed.unpack(), b"ACGT");
    }

    #[test]
    fn test_pack_rejects_ambiguous() {
        let err = PackedSequence::pack(b"ACNT").unwrap_err();
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn test_empty() {
        let packed = PackedSequence::pack(b"").unwrap();
        assert!(packed.is_empty());
        assert!(packed.as_packed().is_empty());
    }

    #[test]
    fn test_from_packed_checks_length() {
        assert!(PackedSequence::from_packed(vec![0x1B], 4).is_ok());
        assert!(PackedSequence::from_packed(vec![0x1B], 5).is_err());
        assert!(PackedSequence::from_packed(vec![0x1B, 0x00], 4).is_err());
    }

    #[test]
    fn test_from_file_offset() {
        let bytes = FileBytes::Heap(vec![0xAA, 0xBB, 0x1B]);
        let packed = PackedSequence::from_file(bytes, 2, 4).unwrap();
        assert_eq!(packed.unpack(), b"ACGT");
        assert!(!packed.is_mapped());

        let bytes = FileBytes::Heap(vec![0x1B]);
        assert!(PackedSequence::from_file(bytes, 2, 0).is_err());
    }

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(0), 0);
        assert_eq!(packed_len(1), 1);
        assert_eq!(packed_len(4), 1);
        assert_eq!(packed_len(5), 2);
    }

    proptest! {
        #[test]
        fn test_pack_unpack(seq in "[ACGT]{0,300}") {
            let packed = PackedSequence::pack(seq.as_bytes()).unwrap();
            prop_assert_eq!(packed.len(), seq.len() as u64);
            prop_assert_eq!(packed.unpack(), seq.as_bytes());
        }
    }
}
