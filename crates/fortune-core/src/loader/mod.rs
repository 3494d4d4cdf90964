//! Corpus loading
//!
//! Resolves requested paths, validates every candidate quotation file and
//! builds the weighted `FileSystemTree` in one pass:
//! - directories are scanned one level deep, sub-directories are ignored
//! - a bad file inside a directory is skipped, never fatal
//! - a missing top-level path aborts the load

mod args;
mod validate;

pub use args::parse_probability_args;
pub use validate::{validate_fortune_file, LengthFilter, ValidatedFile};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tree::{FileSystemTree, NodeId};

/// A requested file or directory with its caller-assigned share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPath {
    pub path: PathBuf,
    pub percentage: f32,
}

impl ProbabilityPath {
    pub fn new(path: impl Into<PathBuf>, percentage: f32) -> Self {
        Self {
            path: path.into(),
            percentage,
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub filter: LengthFilter,
    /// Validate directory entries on the rayon pool. Linking and counting
    /// still happen on the calling thread, in directory order.
    pub parallel_validation: bool,
}

/// Load `paths` into a fresh tree, keeping only files that honor the length
/// bounds.
pub fn load_paths(
    paths: &[ProbabilityPath],
    shorter_than: u32,
    longer_than: u32,
) -> Result<FileSystemTree> {
    let options = LoadOptions {
        filter: LengthFilter::new(shorter_than, longer_than),
        ..Default::default()
    };
    load_paths_with_options(paths, &options)
}

/// Load `paths` with explicit options
pub fn load_paths_with_options(
    paths: &[ProbabilityPath],
    options: &LoadOptions,
) -> Result<FileSystemTree> {
    let mut tree = FileSystemTree::new();

    for request in paths {
        load_path(&mut tree, request, options)?;
    }

    tracing::info!(
        "Loaded {} fortune files ({} quotations) from {} paths",
        tree.root().num_files,
        tree.root().num_entries,
        paths.len()
    );

    Ok(tree)
}

fn load_path(
    tree: &mut FileSystemTree,
    request: &ProbabilityPath,
    options: &LoadOptions,
) -> Result<NodeId> {
    let metadata = fs::metadata(&request.path)?;

    if metadata.is_dir() {
        load_dir_path(tree, request, options)
    } else {
        load_file_path(tree, request, options)
    }
}

fn load_dir_path(
    tree: &mut FileSystemTree,
    request: &ProbabilityPath,
    options: &LoadOptions,
) -> Result<NodeId> {
    let candidates = list_candidate_files(&request.path)?;

    let filter = options.filter;
    let results: Vec<Result<ValidatedFile>> = if options.parallel_validation {
        candidates
            .par_iter()
            .map(|path| validate_fortune_file(path, &filter))
            .collect()
    } else {
        candidates
            .iter()
            .map(|path| validate_fortune_file(path, &filter))
            .collect()
    };

    let dir = tree.add_directory(
        FileSystemTree::ROOT,
        request.path.clone(),
        request.percentage,
    );

    let mut skipped = 0usize;
    for result in results {
        match result {
            Ok(file) => {
                tree.add_file(dir, file.path, 0.0, file.index_path, file.table);
            }
            Err(e) => {
                skipped += 1;
                tracing::debug!("Skipping {}", e);
            }
        }
    }

    if let Some(node) = tree.get(dir) {
        tracing::debug!(
            "📂 {}: {} fortune files kept, {} skipped",
            request.path.display(),
            node.num_files,
            skipped
        );
    }

    Ok(dir)
}

fn load_file_path(
    tree: &mut FileSystemTree,
    request: &ProbabilityPath,
    options: &LoadOptions,
) -> Result<NodeId> {
    let file = validate_fortune_file(&request.path, &options.filter)?;
    Ok(tree.add_file(
        FileSystemTree::ROOT,
        file.path,
        request.percentage,
        file.index_path,
        file.table,
    ))
}

/// First-level non-directory entries of `dir`, sorted by file name.
/// Sub-directories are never descended into.
fn list_candidate_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {}
            Ok(_) => files.push(entry.path()),
            Err(e) => {
                tracing::warn!("Cannot stat {}: {}", entry.path().display(), e);
            }
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
