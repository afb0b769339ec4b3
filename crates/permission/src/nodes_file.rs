//! The `permissioned-nodes.json` and `disallowed-nodes.json` files of a node.

use crate::enode;
use parking_lot::Mutex;
use std::{
    io,
    path::{Path, PathBuf},
};

pub const PERMISSIONED_NODES: &str = "permissioned-nodes.json";
pub const DISALLOWED_NODES: &str = "disallowed-nodes.json";

/// Serializes every read-modify-write of the node files in this process.
static FILE_LOCK: Mutex<()> = Mutex::new(());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeOperation {
    Add,
    Delete,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeFileError {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid node list in {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}

/// The node files of a data directory.
#[derive(Clone, Debug)]
pub struct NodeFiles {
    data_dir: PathBuf,
}

impl NodeFiles {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn permissioned_path(&self) -> PathBuf {
        self.data_dir.join(PERMISSIONED_NODES)
    }

    pub fn disallowed_path(&self) -> PathBuf {
        self.data_dir.join(DISALLOWED_NODES)
    }

    /// Adds or deletes `url` in the permissioned nodes. The file must exist.
    ///
    /// Returns `false` if the file already was in the requested state.
    pub fn update_permissioned(
        &self,
        url: &str,
        op: NodeOperation,
    ) -> Result<bool, NodeFileError> {
        let path = self.permissioned_path();
        if !path.exists() {
            return Err(NodeFileError::Missing(path));
        }
        update_file(&path, url, op)
    }

    /// Adds or deletes `url` in the disallowed nodes, creating the file on demand.
    pub fn update_disallowed(&self, url: &str, op: NodeOperation) -> Result<bool, NodeFileError> {
        update_file(&self.disallowed_path(), url, op)
    }

    pub fn permissioned_nodes(&self) -> Result<Vec<String>, NodeFileError> {
        read_nodes(&self.permissioned_path())
    }

    /// The disallowed nodes, empty if the file does not exist.
    pub fn disallowed_nodes(&self) -> Result<Vec<String>, NodeFileError> {
        let path = self.disallowed_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_nodes(&path)
    }

    /// Returns `true` if `node_id` is listed as permissioned and is not blacklisted.
    pub fn is_node_permissioned(&self, node_id: &str) -> bool {
        let node_id = node_id.to_lowercase();
        let permissioned = match self.permissioned_nodes() {
            Ok(nodes) => nodes,
            Err(err) => {
                error!(%err, "failed to read permissioned nodes");
                return false;
            }
        };
        if !permissioned.iter().any(|url| same_node(url, &node_id)) {
            return false;
        }

        match self.disallowed_nodes() {
            Ok(nodes) => !nodes.iter().any(|url| same_node(url, &node_id)),
            // An unreadable blacklist blocks everyone.
            Err(err) => {
                debug!(%err, "failed to read disallowed nodes");
                false
            }
        }
    }
}

fn same_node(url: &str, node_id: &str) -> bool {
    enode::node_id(url).is_some_and(|id| id == node_id)
}

/// Entries match on the node id, falling back to the raw URL for entries that do not parse.
fn same_entry(entry: &str, url: &str) -> bool {
    match (enode::node_id(entry), enode::node_id(url)) {
        (Some(a), Some(b)) => a == b,
        _ => entry == url,
    }
}

fn read_nodes(path: &Path) -> Result<Vec<String>, NodeFileError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| NodeFileError::Io { path: path.to_path_buf(), source })?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content)
        .map_err(|source| NodeFileError::Json { path: path.to_path_buf(), source })
}

fn update_file(path: &Path, url: &str, op: NodeOperation) -> Result<bool, NodeFileError> {
    let _guard = FILE_LOCK.lock();

    let mut nodes = if path.exists() { read_nodes(path)? } else { Vec::new() };
    let existing = nodes.iter().position(|entry| same_entry(entry, url));
    match (op, existing) {
        (NodeOperation::Add, Some(_)) | (NodeOperation::Delete, None) => return Ok(false),
        (NodeOperation::Add, None) => nodes.push(url.to_string()),
        (NodeOperation::Delete, Some(idx)) => {
            nodes.remove(idx);
        }
    }

    let json = serde_json::to_string_pretty(&nodes)
        .map_err(|source| NodeFileError::Json { path: path.to_path_buf(), source })?;
    std::fs::write(path, json)
        .map_err(|source| NodeFileError::Io { path: path.to_path_buf(), source })?;
    debug!(path = %path.display(), %url, ?op, "updated node file");
    Ok(true)
}
