//! Fixtures shared by the permission tests.

#![warn(unused_crate_dependencies, unreachable_pub)]
#![allow(clippy::disallowed_macros)]

#[macro_use]
extern crate tracing;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const NODE_ID_1: &str = "ac6b1096ca56b9f6d004b779ae3728bf83f8e22453404cc3cef16a3d9b96608bc67c4b30db88e0a5a6c6390213f7acbe1153ff6d23ce57380104288ae19373ef";
pub const NODE_ID_2: &str = "0ba6b9f606a43a95edc6247cdb1c1e105145817be7bcafd6b2c0ba15d58145f0dc1a194f70ba73cd6f4cdd6864edc7687f311254c7555cc32e4d45aeb1b80416";
pub const NODE_ID_3: &str = "579f786d4e2830bbcc02815a27e8a9bacccc9605df4dc6f20bcc1a6eb391e7225fff7cb83e5b4ecd1f3a94d8b733803f2f66b7e871961e7b029e22c155c3a778";

/// The `permission-config.json` of a v1 network with a single network admin account.
pub const PERMISSION_CONFIG: &str = r#"{
    "permissionModel": "v1",
    "upgrdableAddress": "0x1932c48b2bf8102ba33b4a6b545c32236e342f34",
    "interfaceAddress": "0x4d3bfd7821e237ffe84209d8e638f9f309865b87",
    "implAddress": "0xfe0602d820f42800e3ef3f89e1c39cd15f78d283",
    "nodeMgrAddress": "0x8a5e2a6343108babed07899510fb42297938d41f",
    "accountMgrAddress": "0x9d13c6d3afe1721beef56b55d303b09e021e27ab",
    "roleMgrAddress": "0x1349f3e1b8d71effb47b840594ff27da7e603d17",
    "voterMgrAddress": "0xd9d64b7dc034fafdba5dc2902875a67b5d586420",
    "orgMgrAddress": "0x938781b9796aea6376e40ca158f67fa89d5d8a18",
    "nwAdminOrg": "ADMINORG",
    "nwAdminRole": "ADMIN",
    "orgAdminRole": "ORGADMIN",
    "accounts": ["0xed9d02e382b34818e88b88a309c7fe71e65f419d"],
    "subOrgBreadth": 3,
    "subOrgDepth": 4
}"#;

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Node URL of `id` listening on localhost.
pub fn enode_url(id: &str, port: u16) -> String {
    format!("enode://{id}@127.0.0.1:{port}?discport=0")
}

/// A temporary node data directory.
#[derive(Debug)]
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    /// Creates an empty data directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        trace!(path = %dir.path().display(), "created data dir");
        Self { dir }
    }

    /// Creates a data directory whose `permissioned-nodes.json` lists `urls`.
    pub fn with_permissioned_nodes<S: AsRef<str>>(urls: &[S]) -> Self {
        let dir = Self::new();
        dir.write_nodes("permissioned-nodes.json", urls);
        dir
    }

    /// Creates a data directory holding [`PERMISSION_CONFIG`].
    pub fn with_config() -> Self {
        let dir = Self::new();
        dir.write("permission-config.json", PERMISSION_CONFIG);
        dir
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.join(name), contents).expect("failed to write fixture");
    }

    pub fn write_nodes<S: AsRef<str>>(&self, name: &str, urls: &[S]) {
        let urls: Vec<_> = urls.iter().map(AsRef::as_ref).collect();
        self.write(name, &serde_json::to_string_pretty(&urls).expect("failed to encode nodes"));
    }

    /// Reads a nodes file back, `None` if it does not exist.
    pub fn read_nodes(&self, name: &str) -> Option<Vec<String>> {
        let content = std::fs::read_to_string(self.join(name)).ok()?;
        Some(serde_json::from_str(&content).expect("invalid nodes file"))
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new()
    }
}
