//! `permctl list` and `permctl org-details`.

use super::{Session, print_json};
use crate::opts::NodeOpts;
use clap::ValueEnum;
use eyre::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Orgs,
    Nodes,
    Roles,
    Accounts,
}

/// Prints the orgs, nodes, roles or accounts of the network as JSON.
pub async fn list(node: &NodeOpts, kind: ListKind) -> Result<()> {
    let session = Session::connect(node)?;
    session.load().await?;
    let service = &session.service;
    match kind {
        ListKind::Orgs => print_json(&service.org_list()),
        ListKind::Nodes => print_json(&service.node_list()),
        ListKind::Roles => print_json(&service.role_list()),
        ListKind::Accounts => print_json(&service.acct_list()),
    }
}

/// Prints the nodes, roles, accounts and sub orgs of `org_id` as JSON.
pub async fn org_details(node: &NodeOpts, org_id: &str) -> Result<()> {
    let session = Session::connect(node)?;
    session.load().await?;
    print_json(&session.service.org_details(org_id).await?)
}
