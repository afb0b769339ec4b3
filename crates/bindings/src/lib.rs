//! Code generated by permission-bindgen - DO NOT EDIT.
//!
//! `sol!` bindings for the network permissioning contracts.

#![allow(clippy::all, rustdoc::all)]

pub mod account_manager;
pub mod node_manager;
pub mod org_manager;
pub mod permissions_implementation;
pub mod permissions_interface;
pub mod permissions_upgradable;
pub mod role_manager;
pub mod voter_manager;

pub use account_manager::AccountManager;
pub use node_manager::NodeManager;
pub use org_manager::OrgManager;
pub use permissions_implementation::PermissionsImplementation;
pub use permissions_interface::PermissionsInterface;
pub use permissions_upgradable::PermissionsUpgradable;
pub use role_manager::RoleManager;
pub use voter_manager::VoterManager;

/// Names of the bound contracts.
pub const CONTRACTS: &[&str] = &[
    "AccountManager",
    "NodeManager",
    "OrgManager",
    "PermissionsImplementation",
    "PermissionsInterface",
    "PermissionsUpgradable",
    "RoleManager",
    "VoterManager",
];
