//! `permctl.toml` configuration.

use eyre::Result;
use figment::{
    Figment, Provider,
    providers::{Env, Format, Serialized, Toml},
};
use permission::CacheSizes;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// File name of the tool configuration.
pub const CONFIG_FILE: &str = "permctl.toml";

/// Prefix of the environment variables overriding the configuration.
pub const ENV_PREFIX: &str = "PERMCTL_";

/// Settings shared by all commands.
///
/// Layered from defaults, `permctl.toml`, `PERMCTL_*` environment variables and command line
/// flags, later layers winning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermctlConfig {
    /// JSON-RPC endpoint of the node.
    pub rpc_url: String,
    /// Key signing the permission transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Node data directory holding `permission-config.json` and the node files.
    pub data_dir: PathBuf,
    /// Directory of the contract artifacts.
    pub artifacts: PathBuf,
    /// Root of the bindings crate.
    pub bindings: PathBuf,
    pub org_cache_size: usize,
    pub role_cache_size: usize,
    pub node_cache_size: usize,
    pub account_cache_size: usize,
    /// Milliseconds between network boot status polls.
    pub boot_poll_interval: u64,
}

impl Default for PermctlConfig {
    fn default() -> Self {
        let caches = CacheSizes::default();
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            private_key: None,
            data_dir: PathBuf::from("."),
            artifacts: PathBuf::from("crates/bindings/artifacts"),
            bindings: PathBuf::from("crates/bindings"),
            org_cache_size: caches.orgs,
            role_cache_size: caches.roles,
            node_cache_size: caches.nodes,
            account_cache_size: caches.accounts,
            boot_poll_interval: 1000,
        }
    }
}

impl PermctlConfig {
    /// The configuration layers rooted at `root`, without command line flags.
    pub fn figment_with_root(root: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(root.as_ref().join(CONFIG_FILE)))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads the configuration from the current directory.
    pub fn load() -> Result<Self> {
        Self::from_provider(Self::figment_with_root("."))
    }

    /// Extracts the configuration from `provider`.
    pub fn from_provider(provider: impl Provider) -> Result<Self> {
        Ok(Figment::from(provider).extract()?)
    }

    pub fn cache_sizes(&self) -> CacheSizes {
        CacheSizes {
            orgs: self.org_cache_size,
            roles: self.role_cache_size,
            nodes: self.node_cache_size,
            accounts: self.account_cache_size,
        }
    }

    pub fn boot_poll_interval(&self) -> Duration {
        Duration::from_millis(self.boot_poll_interval)
    }
}
