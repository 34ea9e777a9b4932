//! Decoder for the `.stack_sizes` section emitted by `-fstack-size-section`.
//!
//! The section is an array of (function address, stack size) pairs. The
//! address is pointer sized and little-endian; the stack size is an
//! unsigned LEB128 and only covers space allocated in the prologue.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::StackEntry;
use crate::{StatsError, StatsResult};

/// Functions with a smaller frame than this are dropped from the output.
pub const MIN_STACK_SIZE: u64 = 32;

/// A 64-bit value never needs more than this many LEB128 bytes.
const MAX_LEB128_BYTES: usize = 10;

const FILE_FORMAT_PATTERN: &str = r"(?m)file format (.*)$";

fn file_format_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(FILE_FORMAT_PATTERN).expect("file format pattern is valid"))
}

/// Width of the addresses stored in the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Four,
    Eight,
}

impl PointerWidth {
    /// Select the width from an ELF format descriptor such as `elf64-x86-64`.
    pub fn from_descriptor(descriptor: &str) -> StatsResult<Self> {
        if descriptor.starts_with("elf64-little") || descriptor == "elf64-x86-64" {
            Ok(PointerWidth::Eight)
        } else if descriptor.starts_with("elf32-little") || descriptor == "elf32-i386" {
            Ok(PointerWidth::Four)
        } else {
            Err(StatsError::UnknownBinaryFormat { descriptor: descriptor.to_string() })
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            PointerWidth::Four => 4,
            PointerWidth::Eight => 8,
        }
    }
}

/// Extract the `file format <descriptor>` value from `objdump -a` output.
pub fn file_format_descriptor(objdump_output: &str) -> StatsResult<&str> {
    file_format_pattern()
        .captures(objdump_output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| StatsError::UnknownBinaryFormat {
            descriptor: objdump_output.trim().to_string(),
        })
}

/// Decode every entry of a `.stack_sizes` section, keeping only those with
/// a stack size of at least [`MIN_STACK_SIZE`], in section order.
pub fn decode_stack_sizes(section: &[u8], width: PointerWidth) -> StatsResult<Vec<StackEntry>> {
    let pointer = width.bytes();
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < section.len() {
        let available = section.len() - offset;
        if available < pointer {
            return Err(StatsError::TruncatedStackSection { offset, needed: pointer, available });
        }
        let address = read_le(&section[offset..offset + pointer]);
        offset += pointer;

        let (stack_size, consumed) = read_uleb128(&section[offset..], offset)?;
        offset += consumed;

        if stack_size >= MIN_STACK_SIZE {
            entries.push(StackEntry { address, stack_size });
        }
    }

    Ok(entries)
}

fn read_le(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Read one unsigned LEB128 from the start of `bytes`, which begins at
/// `offset` within the section. Returns the value and the bytes consumed.
fn read_uleb128(bytes: &[u8], offset: usize) -> StatsResult<(u64, usize)> {
    let mut value = 0u64;
    for (index, &byte) in bytes.iter().take(MAX_LEB128_BYTES).enumerate() {
        let payload = u64::from(byte & 0x7f);
        let shift = 7 * index as u32;
        // Only the lowest payload bit of the tenth byte still fits in 64 bits.
        if shift == 63 && payload > 1 {
            return Err(StatsError::StackSizeOverflow { offset });
        }
        value |= payload << shift;
        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }

    if bytes.len() < MAX_LEB128_BYTES {
        Err(StatsError::TruncatedStackSection {
            offset: offset + bytes.len(),
            needed: 1,
            available: 0,
        })
    } else {
        Err(StatsError::StackSizeOverflow { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_format_pattern_is_compiled_once() {
        let first = file_format_pattern() as *const Regex;
        let output = "a.o:     file format elf32-littlearm\n";
        assert_eq!(file_format_descriptor(output).unwrap(), "elf32-littlearm");
        assert!(std::ptr::eq(first, file_format_pattern()));
    }

    #[test]
    fn read_le_is_little_endian() {
        assert_eq!(read_le(&[0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(read_le(&[1, 0, 0, 0, 0, 0, 0, 0x80]), 0x8000_0000_0000_0001);
    }

    #[test]
    fn read_uleb128_handles_multi_byte_values() {
        assert_eq!(read_uleb128(&[0xe5, 0x8e, 0x26], 0).unwrap(), (624_485, 3));
        assert_eq!(read_uleb128(&[0x00, 0xff], 0).unwrap(), (0, 1));
    }

    #[test]
    fn read_uleb128_accepts_u64_max() {
        let mut bytes = vec![0xff; 9];
        bytes.push(0x01);
        assert_eq!(read_uleb128(&bytes, 0).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn read_uleb128_rejects_bits_beyond_64() {
        let mut bytes = vec![0x80; 9];
        bytes.push(0x02);
        assert!(matches!(read_uleb128(&bytes, 7), Err(StatsError::StackSizeOverflow { offset: 7 })));
    }
}
