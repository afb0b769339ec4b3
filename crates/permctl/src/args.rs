use crate::{
    cmd::{
        action::{AccountSubcommand, NodeSubcommand, OrgSubcommand, RoleSubcommand},
        bind::BindArgs,
        check_tx::CheckTxArgs,
        deploy::DeployArgs,
        query::ListKind,
        watch::WatchArgs,
    },
    opts::NodeOpts,
};
use clap::{Parser, Subcommand};

/// Manage the permissioning contracts of a network from the command line.
#[derive(Debug, Parser)]
#[command(name = "permctl", version, next_display_order = None)]
pub struct Permctl {
    #[command(flatten)]
    pub node: NodeOpts,

    #[command(subcommand)]
    pub cmd: PermctlSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum PermctlSubcommand {
    /// Generate, check or expand the contract bindings.
    Bind(BindArgs),

    /// Deploy the permission contracts.
    Deploy(DeployArgs),

    /// Boot the network from `permission-config.json`, or load an already booted one.
    Boot,

    /// List the orgs, nodes, roles or accounts of the network.
    #[command(visible_alias = "ls")]
    List {
        #[arg(value_enum)]
        kind: ListKind,
    },

    /// Show the nodes, roles, accounts and sub orgs of an org.
    OrgDetails { org_id: String },

    /// Org actions.
    #[command(subcommand)]
    Org(OrgSubcommand),

    /// Node actions.
    #[command(subcommand)]
    Node(NodeSubcommand),

    /// Role actions.
    #[command(subcommand)]
    Role(RoleSubcommand),

    /// Account actions.
    #[command(subcommand)]
    Account(AccountSubcommand),

    /// Follow the permission events, updating the node files.
    Watch(WatchArgs),

    /// Check whether an account may send a transaction.
    CheckTx(CheckTxArgs),
}
