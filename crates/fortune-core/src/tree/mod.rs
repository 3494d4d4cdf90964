//! Weighted descriptor tree for a fortune corpus
//!
//! Nodes live in a flat arena and refer to each other by `NodeId`. Parent
//! links are plain indexes used to walk upward while counting; ownership
//! stays with the arena.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::index::DataTable;

/// Index of a node inside its `FileSystemTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Directory,
    File,
}

/// One entry of the tree: the synthetic root, a directory or a quotation file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystemNodeDescriptor {
    pub kind: NodeKind,
    /// Empty for the root
    pub path: PathBuf,
    /// Requested share; 100 for the root, 0 for files found inside a directory
    pub percent: f32,
    /// Reserved for the selector's percentage reconciliation, always 0 here
    pub undefined_children_percent: f32,
    /// Reserved for the selector's percentage reconciliation, always 0 here
    pub undefined_num_entries: u64,
    pub num_entries: u64,
    pub num_files: u64,
    /// Set on file nodes only
    pub index_path: Option<PathBuf>,
    /// Set on file nodes only
    pub table: Option<DataTable>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl FileSystemNodeDescriptor {
    fn new(kind: NodeKind, path: PathBuf, percent: f32, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            path,
            percent,
            undefined_children_percent: 0.0,
            undefined_num_entries: 0,
            num_entries: 0,
            num_files: 0,
            index_path: None,
            table: None,
            children: Vec::new(),
            parent,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// Rooted tree of descriptors; node 0 is always the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystemTree {
    nodes: Vec<FileSystemNodeDescriptor>,
}

impl Default for FileSystemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Fresh tree holding only the root at 100%
    pub fn new() -> Self {
        Self {
            nodes: vec![FileSystemNodeDescriptor::new(
                NodeKind::Root,
                PathBuf::new(),
                100.0,
                None,
            )],
        }
    }

    pub fn root(&self) -> &FileSystemNodeDescriptor {
        &self.nodes[Self::ROOT.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&FileSystemNodeDescriptor> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Child descriptors of `id`, in insertion order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &FileSystemNodeDescriptor> + '_ {
        self.get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |child| self.get(*child))
    }

    /// All nodes with their ids, root first
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FileSystemNodeDescriptor)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    /// Find a node by its path
    pub fn find(&self, path: &Path) -> Option<(NodeId, &FileSystemNodeDescriptor)> {
        self.iter().find(|(_, node)| node.path == path)
    }

    /// Add a directory node under `parent`. Directories are linked right away,
    /// even if none of their files survive validation.
    pub(crate) fn add_directory(&mut self, parent: NodeId, path: PathBuf, percent: f32) -> NodeId {
        let id = self.push(FileSystemNodeDescriptor::new(
            NodeKind::Directory,
            path,
            percent,
            Some(parent),
        ));
        tracing::debug!("📂 Linked directory {:?} as node {}", self.nodes[id.0].path, id.0);
        id
    }

    /// Add a validated quotation file under `parent` and count it into every
    /// ancestor.
    pub(crate) fn add_file(
        &mut self,
        parent: NodeId,
        path: PathBuf,
        percent: f32,
        index_path: PathBuf,
        table: DataTable,
    ) -> NodeId {
        let entries = table.num_entries();
        let mut node = FileSystemNodeDescriptor::new(NodeKind::File, path, percent, Some(parent));
        node.index_path = Some(index_path);
        node.table = Some(table);

        let id = self.push(node);
        self.populate_file_amounts(id, entries);
        id
    }

    fn push(&mut self, node: FileSystemNodeDescriptor) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = node.parent;
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Add one file's entries to `id` and each of its ancestors, root included
    fn populate_file_amounts(&mut self, id: NodeId, entries: u64) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id.0];
            node.num_entries += entries;
            node.num_files += 1;
            current = node.parent;
        }
    }

    /// Check that every node's counts match its children (or its table for a
    /// file) and that parent and child links agree. Returns the first
    /// violation found.
    pub fn verify_counts(&self) -> std::result::Result<(), String> {
        for (id, node) in self.iter() {
            match node.kind {
                NodeKind::File => {
                    let entries = node.table.as_ref().map(|t| t.num_entries()).unwrap_or(0);
                    if node.num_entries != entries || node.num_files != 1 {
                        return Err(format!(
                            "file {:?} has {} entries / {} files, table says {}",
                            node.path, node.num_entries, node.num_files, entries
                        ));
                    }
                }
                NodeKind::Root | NodeKind::Directory => {
                    let (entries, files) = self
                        .children(id)
                        .fold((0, 0), |(e, f), c| (e + c.num_entries, f + c.num_files));
                    if node.num_entries != entries || node.num_files != files {
                        return Err(format!(
                            "node {:?} has {} entries / {} files, children sum to {} / {}",
                            node.path, node.num_entries, node.num_files, entries, files
                        ));
                    }
                }
            }
            for child in &node.children {
                let linked = self.get(*child).and_then(|c| c.parent);
                if linked != Some(id) {
                    return Err(format!("node {} is not linked back to {}", child.0, id.0));
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
