//! Validation gates for a single quotation file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FortuneError, Result};
use crate::index::{
    index_path_for, load_data_table_from_path, load_data_table_version_from_path, DataTable,
    DEFAULT_VERSION,
};

/// Length bounds a quotation file has to honor.
///
/// A file is dropped when `longest_length < longer_than` or
/// `shortest_length > shorter_than`. Callers already depend on this exact
/// pairing of names and comparisons, so it is kept as is. A bound of 0 turns
/// its side of the check off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthFilter {
    pub shorter_than: u32,
    pub longer_than: u32,
}

impl LengthFilter {
    pub fn new(shorter_than: u32, longer_than: u32) -> Self {
        Self {
            shorter_than,
            longer_than,
        }
    }

    pub fn accepts(&self, table: &DataTable) -> bool {
        let below = table.longest_length < self.longer_than;
        let above = self.shorter_than != 0 && table.shortest_length > self.shorter_than;
        !(below || above)
    }
}

/// A quotation file that passed every gate
#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub path: PathBuf,
    pub index_path: PathBuf,
    pub table: DataTable,
}

/// Run the existence, index version, decode and length gates in order.
/// The first failing gate decides the error.
pub fn validate_fortune_file(path: &Path, filter: &LengthFilter) -> Result<ValidatedFile> {
    if !is_fortune_file(path) {
        return Err(FortuneError::NotAFortuneFile(path.to_path_buf()));
    }

    let index_path = index_path_for(path);
    check_index_version(&index_path)?;

    let table = load_data_table_from_path(&index_path)?;

    if !filter.accepts(&table) {
        return Err(FortuneError::LengthFilter {
            path: path.to_path_buf(),
            shortest: table.shortest_length,
            longest: table.longest_length,
        });
    }

    Ok(ValidatedFile {
        path: path.to_path_buf(),
        index_path,
        table,
    })
}

fn is_fortune_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}

fn check_index_version(index_path: &Path) -> Result<()> {
    if !index_path.is_file() {
        return Err(FortuneError::MissingIndex(index_path.to_path_buf()));
    }

    let version = load_data_table_version_from_path(index_path)?;
    if version.version != DEFAULT_VERSION {
        return Err(FortuneError::UnsupportedVersion {
            path: index_path.to_path_buf(),
            found: version.version,
            expected: DEFAULT_VERSION,
        });
    }
    Ok(())
}
