//! The `permission-config.json` boot configuration.

use crate::PermissionModel;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
};

/// File name of the permission config inside the data directory.
pub const PERMISSION_CONFIG: &str = "permission-config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {PERMISSION_CONFIG}: {0}")]
    Json(#[from] serde_json::Error),
    #[error("permissions model type not passed in {PERMISSION_CONFIG}. Network cannot boot up")]
    MissingModel,
    #[error("invalid permissions model type passed in {PERMISSION_CONFIG}. Network cannot boot up")]
    InvalidModel(String),
    #[error("no accounts given in {PERMISSION_CONFIG}. Network cannot boot up")]
    NoAccounts,
    #[error("sub org breadth depth not passed in {PERMISSION_CONFIG}. Network cannot boot up")]
    NoBreadthDepth,
    #[error("missing contract addresses in {PERMISSION_CONFIG}")]
    MissingAddresses,
}

/// Addresses of the deployed contracts plus the network admin setup used at boot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionConfig {
    pub permission_model: PermissionModel,
    #[serde(rename = "upgrdableAddress")]
    pub upgradable_address: Address,
    pub interface_address: Address,
    pub impl_address: Address,
    #[serde(rename = "nodeMgrAddress")]
    pub node_address: Address,
    #[serde(rename = "accountMgrAddress")]
    pub account_address: Address,
    #[serde(rename = "roleMgrAddress")]
    pub role_address: Address,
    #[serde(rename = "voterMgrAddress")]
    pub voter_address: Address,
    #[serde(rename = "orgMgrAddress")]
    pub org_address: Address,
    pub nw_admin_org: String,
    pub nw_admin_role: String,
    pub org_admin_role: String,
    /// Accounts granted network admin access at boot.
    pub accounts: Vec<Address>,
    pub sub_org_depth: u64,
    pub sub_org_breadth: u64,
}

/// The config as written on disk, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawConfig {
    permission_model: String,
    #[serde(rename = "upgrdableAddress")]
    upgradable_address: Address,
    interface_address: Address,
    impl_address: Address,
    #[serde(rename = "nodeMgrAddress")]
    node_address: Address,
    #[serde(rename = "accountMgrAddress")]
    account_address: Address,
    #[serde(rename = "roleMgrAddress")]
    role_address: Address,
    #[serde(rename = "voterMgrAddress")]
    voter_address: Address,
    #[serde(rename = "orgMgrAddress")]
    org_address: Address,
    nw_admin_org: String,
    nw_admin_role: String,
    org_admin_role: String,
    accounts: Vec<Address>,
    sub_org_depth: u64,
    sub_org_breadth: u64,
}

impl PermissionConfig {
    /// Reads and validates `permission-config.json` from `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(PERMISSION_CONFIG);
        let content =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
        Self::from_json(&content)
    }

    /// Parses and validates the config.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(s)?;

        let permission_model = match raw.permission_model.to_lowercase().as_str() {
            "" => return Err(ConfigError::MissingModel),
            "v1" => PermissionModel::V1,
            "v2" => PermissionModel::V2,
            _ => return Err(ConfigError::InvalidModel(raw.permission_model)),
        };
        if raw.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        if raw.sub_org_depth == 0 || raw.sub_org_breadth == 0 {
            return Err(ConfigError::NoBreadthDepth);
        }
        if raw.interface_address.is_zero() {
            return Err(ConfigError::MissingAddresses);
        }

        Ok(Self {
            permission_model,
            upgradable_address: raw.upgradable_address,
            interface_address: raw.interface_address,
            impl_address: raw.impl_address,
            node_address: raw.node_address,
            account_address: raw.account_address,
            role_address: raw.role_address,
            voter_address: raw.voter_address,
            org_address: raw.org_address,
            nw_admin_org: raw.nw_admin_org,
            nw_admin_role: raw.nw_admin_role,
            org_admin_role: raw.org_admin_role,
            accounts: raw.accounts,
            sub_org_depth: raw.sub_org_depth,
            sub_org_breadth: raw.sub_org_breadth,
        })
    }

    /// Returns `true` if `role` is the network or org admin role.
    pub fn is_admin_role(&self, role: &str) -> bool {
        role == self.nw_admin_role || role == self.org_admin_role
    }

    pub fn depth(&self) -> U256 {
        U256::from(self.sub_org_depth)
    }

    pub fn breadth(&self) -> U256 {
        U256::from(self.sub_org_breadth)
    }
}
