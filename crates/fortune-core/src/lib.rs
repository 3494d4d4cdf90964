//! Fortune corpus loading
//!
//! Builds a weighted tree of quotation files and their `.dat` indexes so a
//! selector can later pick a quotation according to the requested shares.

pub mod error;
pub mod index;
pub mod loader;
pub mod tree;

pub use error::{FortuneError, Result};
pub use index::{
    build_data_table, index_path_for, load_data_table_from_path,
    load_data_table_version_from_path, write_data_table, write_index_for, DataTable,
    DataTableVersion, DEFAULT_DELIMITER, DEFAULT_VERSION,
};
pub use loader::{
    load_paths, load_paths_with_options, parse_probability_args, validate_fortune_file,
    LengthFilter, LoadOptions, ProbabilityPath, ValidatedFile,
};
pub use tree::{FileSystemNodeDescriptor, FileSystemTree, NodeId, NodeKind};
