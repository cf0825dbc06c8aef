use std::fmt;
use std::ops::Deref;

use itertools::Itertools;

/// Size of the CHIP-8 address space.
pub const MEMORY_SIZE: usize = 0x1000;
/// Programs are loaded at this address by every engine we hand off to.
pub const PROGRAM_START: usize = 0x200;

/// A program image exactly as it came off disk.
///
/// The bytes are never reordered or decoded; the length is fixed at
/// construction. A `Rom` is moved into the engine on handoff.
#[derive(Clone, PartialEq, Eq)]
pub struct Rom {
    bytes: Box<[u8]>,
}

impl Rom {
    /// Largest image that fits between `PROGRAM_START` and the end of memory.
    pub const MAX_PROGRAM_LEN: usize = MEMORY_SIZE - PROGRAM_START;

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Box<[u8]> {
        self.bytes
    }

    pub fn fits_in_memory(&self) -> bool {
        self.len() <= Self::MAX_PROGRAM_LEN
    }

    /// Hex listing of the first `limit` bytes, eight per line, each line
    /// prefixed with the address the byte will load at.
    pub fn hexdump(&self, limit: usize) -> String {
        self.bytes
            .iter()
            .take(limit)
            .chunks(8)
            .into_iter()
            .enumerate()
            .map(|(line, chunk)| {
                format!(
                    "0x{:03x}: {}",
                    PROGRAM_START + line * 8,
                    chunk.map(|b| format!("{:02x}", b)).join(" ")
                )
            })
            .join("\n")
    }
}

impl From<Vec<u8>> for Rom {
    fn from(value: Vec<u8>) -> Self {
        Self {
            bytes: value.into_boxed_slice(),
        }
    }
}

impl From<&[u8]> for Rom {
    fn from(value: &[u8]) -> Self {
        Self { bytes: value.into() }
    }
}

impl Deref for Rom {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Rom {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Rom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rom").field("len", &self.len()).finish()
    }
}

#[test]
fn test_rom_keeps_bytes() {
    let rom = Rom::from(vec![0x00, 0xe0, 0x12, 0x00]);
    assert_eq!(rom.len(), 4);
    assert_eq!(rom.as_bytes(), &[0x00, 0xe0, 0x12, 0x00]);
    assert_eq!(&*rom.into_bytes(), &[0x00, 0xe0, 0x12, 0x00]);
}

#[test]
fn test_fits_in_memory() {
    assert_eq!(Rom::MAX_PROGRAM_LEN, 3584);
    assert!(Rom::from(vec![0; 3584]).fits_in_memory());
    assert!(!Rom::from(vec![0; 3585]).fits_in_memory());
    assert!(Rom::from(Vec::new()).fits_in_memory());
}

#[test]
fn test_hexdump() {
    let rom = Rom::from((0u8..10).collect::<Vec<_>>());
    assert_eq!(
        rom.hexdump(16),
        "0x200: 00 01 02 03 04 05 06 07\n0x208: 08 09"
    );
    assert_eq!(rom.hexdump(3), "0x200: 00 01 02");
    assert_eq!(Rom::from(Vec::new()).hexdump(16), "");
}

#[test]
fn test_debug_hides_contents() {
    let rom = Rom::from(vec![0xff; 3]);
    assert_eq!(format!("{:?}", rom), "Rom { len: 3 }");
}
