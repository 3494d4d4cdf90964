//! Fortune index (`.dat`) decoding
//!
//! Index files use the big-endian `strfile` layout:
//! - 24-byte header: version, string count, longest, shortest, flags, delimiter
//! - (count + 1) u32 offsets into the quotation file, the last one marking its end
//!
//! Any decode failure is permanent for the file; callers never retry.

use byteorder::{BigEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Cursor};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{FortuneError, Result};

pub mod writer;

pub use writer::{build_data_table, write_data_table, write_index_for};

/// The only index version this crate understands
pub const DEFAULT_VERSION: u32 = 2;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 24;

/// Extension appended to a quotation file path to find its index
pub const INDEX_EXTENSION: &str = ".dat";

/// Delimiter used when none is given
pub const DEFAULT_DELIMITER: u8 = b'%';

/// Header flags
pub const STR_RANDOM: u32 = 0x1;
pub const STR_ORDERED: u32 = 0x2;
pub const STR_ROTATED: u32 = 0x4;

/// Version word read from the start of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTableVersion {
    pub version: u32,
}

/// Decoded index for one quotation file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub version: u32,
    pub number_of_strings: u32,
    pub longest_length: u32,
    pub shortest_length: u32,
    pub flags: u32,
    pub delimiter: u8,
    /// Start offset of every quotation plus the end-of-file offset
    #[serde(skip)]
    pub offsets: Vec<u32>,
}

impl DataTable {
    /// Parse a complete index from raw bytes. `path` is only used in error messages.
    pub fn parse(data: &[u8], path: &Path) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(FortuneError::malformed(
                path,
                format!("header needs {} bytes, found {}", HEADER_SIZE, data.len()),
            ));
        }

        let mut cursor = Cursor::new(data);

        let version = cursor.read_u32::<BigEndian>()?;
        if version != DEFAULT_VERSION {
            return Err(FortuneError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: version,
                expected: DEFAULT_VERSION,
            });
        }

        let number_of_strings = cursor.read_u32::<BigEndian>()?;
        let longest_length = cursor.read_u32::<BigEndian>()?;
        let shortest_length = cursor.read_u32::<BigEndian>()?;
        let flags = cursor.read_u32::<BigEndian>()?;
        let delimiter = cursor.read_u8()?;

        // 3 bytes of padding after the delimiter
        cursor.set_position(HEADER_SIZE as u64);

        let offset_count = number_of_strings as usize + 1;
        let needed = offset_count
            .checked_mul(4)
            .and_then(|bytes| bytes.checked_add(HEADER_SIZE))
            .ok_or_else(|| FortuneError::malformed(path, "string count overflows"))?;
        if data.len() < needed {
            return Err(FortuneError::malformed(
                path,
                format!(
                    "offset table truncated: {} strings need {} bytes, found {}",
                    number_of_strings,
                    needed,
                    data.len()
                ),
            ));
        }

        let mut offsets = Vec::with_capacity(offset_count);
        for _ in 0..offset_count {
            offsets.push(cursor.read_u32::<BigEndian>()?);
        }

        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(FortuneError::malformed(path, "offsets are not ascending"));
        }

        if number_of_strings > 0 && shortest_length > longest_length {
            return Err(FortuneError::malformed(
                path,
                format!(
                    "shortest length {} exceeds longest length {}",
                    shortest_length, longest_length
                ),
            ));
        }

        Ok(DataTable {
            version,
            number_of_strings,
            longest_length,
            shortest_length,
            flags,
            delimiter,
            offsets,
        })
    }

    /// Number of quotations described by this index
    pub fn num_entries(&self) -> u64 {
        self.number_of_strings as u64
    }

    /// Byte range of quotation `index` in the quotation file, delimiter line included
    pub fn entry_span(&self, index: usize) -> Option<Range<u64>> {
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        Some(start as u64..end as u64)
    }

    pub fn is_random(&self) -> bool {
        self.flags & STR_RANDOM != 0
    }

    pub fn is_ordered(&self) -> bool {
        self.flags & STR_ORDERED != 0
    }

    pub fn is_rotated(&self) -> bool {
        self.flags & STR_ROTATED != 0
    }
}

/// Path of the index that belongs to a quotation file: `<path>.dat`
pub fn index_path_for(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(INDEX_EXTENSION);
    PathBuf::from(raw)
}

/// Read only the version word of an index
pub fn load_data_table_version_from_path(path: &Path) -> Result<DataTableVersion> {
    let mut file = File::open(path)?;
    match file.read_u32::<BigEndian>() {
        Ok(version) => Ok(DataTableVersion { version }),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(FortuneError::malformed(path, "file too short for a version"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Decode a complete index from disk
pub fn load_data_table_from_path(path: &Path) -> Result<DataTable> {
    let data = std::fs::read(path)?;
    DataTable::parse(&data, path)
}
