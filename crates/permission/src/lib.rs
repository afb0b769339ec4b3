//! Client side of the network permissioning contracts.
//!
//! Mirrors the on-chain model of orgs, nodes, roles and accounts in LRU caches, keeps it in
//! sync through contract events, derives access decisions from it and validates permission
//! actions before submitting them through the interface contract.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

mod access;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod contracts;
pub mod controls;
pub mod enode;
pub mod error;
pub mod monitor;
pub mod nodes_file;
pub mod provider;
pub mod service;
pub mod types;

pub use access::{AccessResolver, AccountView};
pub use bootstrap::{BootOutcome, init_permissions};
pub use cache::{CacheSizes, PermissionCache};
pub use config::{ConfigError, PERMISSION_CONFIG, PermissionConfig};
pub use contracts::{InterfaceCall, PermissionChain, PermissionContracts};
pub use controls::{PermAction, Validator};
pub use enode::{Enode, EnodeError};
pub use error::{PermissionError, Result};
pub use monitor::Monitors;
pub use nodes_file::{NodeFileError, NodeFiles, NodeOperation};
pub use provider::ProviderBuilder;
pub use service::PermissionService;
pub use types::*;
