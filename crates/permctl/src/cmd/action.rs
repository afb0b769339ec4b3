//! `permctl org|node|role|account`: permission actions.

use super::Session;
use crate::opts::NodeOpts;
use alloy_primitives::Address;
use clap::{Subcommand, ValueEnum};
use eyre::Result;
use permission::{AccessType, PermAction, controls};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrgStatusAction {
    Suspend,
    RevokeSuspension,
}

impl OrgStatusAction {
    fn code(self) -> u8 {
        match self {
            Self::Suspend => controls::SUSPEND_ORG,
            Self::RevokeSuspension => controls::REVOKE_ORG_SUSPENSION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NodeStatusAction {
    Deactivate,
    Activate,
    Blacklist,
}

impl NodeStatusAction {
    fn code(self) -> u8 {
        match self {
            Self::Deactivate => controls::DEACTIVATE_NODE,
            Self::Activate => controls::ACTIVATE_NODE,
            Self::Blacklist => controls::BLACKLIST_NODE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AccountStatusAction {
    Suspend,
    RevokeSuspension,
    Blacklist,
}

impl AccountStatusAction {
    fn code(self) -> u8 {
        match self {
            Self::Suspend => controls::SUSPEND_ACCOUNT,
            Self::RevokeSuspension => controls::REVOKE_ACCOUNT_SUSPENSION,
            Self::Blacklist => controls::BLACKLIST_ACCOUNT,
        }
    }
}

/// Org actions.
#[derive(Clone, Debug, Subcommand)]
pub enum OrgSubcommand {
    /// Proposes a new master org with its first node and admin account.
    Add { org_id: String, enode: String, account: Address },
    /// Approves a proposed org.
    Approve { org_id: String, enode: String, account: Address },
    /// Adds a sub org below `parent`.
    AddSub {
        parent: String,
        org_id: String,
        /// First node of the sub org.
        #[arg(default_value = "")]
        enode: String,
    },
    /// Proposes suspending a master org or revoking its suspension.
    UpdateStatus { org_id: String, action: OrgStatusAction },
    /// Approves a proposed org status change.
    ApproveStatus { org_id: String, action: OrgStatusAction },
}

/// Node actions.
#[derive(Clone, Debug, Subcommand)]
pub enum NodeSubcommand {
    /// Adds a node to an org.
    Add { org_id: String, enode: String },
    /// Deactivates, activates or blacklists a node.
    UpdateStatus { org_id: String, enode: String, action: NodeStatusAction },
    /// Starts the recovery of a blacklisted node.
    StartRecovery { org_id: String, enode: String },
    /// Approves the recovery of a blacklisted node.
    ApproveRecovery { org_id: String, enode: String },
}

/// Role actions.
#[derive(Clone, Debug, Subcommand)]
pub enum RoleSubcommand {
    /// Creates a role in an org.
    Add {
        org_id: String,
        role_id: String,
        /// Access type code, 0 (read only) to 7.
        #[arg(value_parser = parse_access)]
        access: AccessType,
        /// Members of the role may vote.
        #[arg(long)]
        voter: bool,
        /// The role is an admin role of the org.
        #[arg(long)]
        admin: bool,
    },
    /// Removes a role that no account holds.
    Remove { org_id: String, role_id: String },
}

/// Account actions.
#[derive(Clone, Debug, Subcommand)]
pub enum AccountSubcommand {
    /// Proposes an account as admin of an org.
    AssignAdmin { org_id: String, account: Address, role_id: String },
    /// Approves a proposed org admin.
    ApproveAdmin { org_id: String, account: Address },
    /// Assigns a non admin role to an account.
    AssignRole { org_id: String, account: Address, role_id: String },
    /// Suspends, reactivates or blacklists an account.
    UpdateStatus { org_id: String, account: Address, action: AccountStatusAction },
    /// Starts the recovery of a blacklisted account.
    StartRecovery { org_id: String, account: Address },
    /// Approves the recovery of a blacklisted account.
    ApproveRecovery { org_id: String, account: Address },
}

impl From<OrgSubcommand> for PermAction {
    fn from(cmd: OrgSubcommand) -> Self {
        match cmd {
            OrgSubcommand::Add { org_id, enode, account } => {
                Self::AddOrg { org_id, url: enode, account }
            }
            OrgSubcommand::Approve { org_id, enode, account } => {
                Self::ApproveOrg { org_id, url: enode, account }
            }
            OrgSubcommand::AddSub { parent, org_id, enode } => {
                Self::AddSubOrg { parent_org_id: parent, org_id, url: enode }
            }
            OrgSubcommand::UpdateStatus { org_id, action } => {
                Self::UpdateOrgStatus { org_id, action: action.code() }
            }
            OrgSubcommand::ApproveStatus { org_id, action } => {
                Self::ApproveOrgStatus { org_id, action: action.code() }
            }
        }
    }
}

impl From<NodeSubcommand> for PermAction {
    fn from(cmd: NodeSubcommand) -> Self {
        match cmd {
            NodeSubcommand::Add { org_id, enode } => Self::AddNode { org_id, url: enode },
            NodeSubcommand::UpdateStatus { org_id, enode, action } => {
                Self::UpdateNodeStatus { org_id, url: enode, action: action.code() }
            }
            NodeSubcommand::StartRecovery { org_id, enode } => {
                Self::StartBlacklistedNodeRecovery { org_id, url: enode }
            }
            NodeSubcommand::ApproveRecovery { org_id, enode } => {
                Self::ApproveBlacklistedNodeRecovery { org_id, url: enode }
            }
        }
    }
}

impl From<RoleSubcommand> for PermAction {
    fn from(cmd: RoleSubcommand) -> Self {
        match cmd {
            RoleSubcommand::Add { org_id, role_id, access, voter, admin } => {
                Self::AddNewRole { org_id, role_id, access, is_voter: voter, is_admin: admin }
            }
            RoleSubcommand::Remove { org_id, role_id } => Self::RemoveRole { org_id, role_id },
        }
    }
}

impl From<AccountSubcommand> for PermAction {
    fn from(cmd: AccountSubcommand) -> Self {
        match cmd {
            AccountSubcommand::AssignAdmin { org_id, account, role_id } => {
                Self::AssignAdminRole { org_id, account, role_id }
            }
            AccountSubcommand::ApproveAdmin { org_id, account } => {
                Self::ApproveAdminRole { org_id, account }
            }
            AccountSubcommand::AssignRole { org_id, account, role_id } => {
                Self::AssignAccountRole { org_id, account, role_id }
            }
            AccountSubcommand::UpdateStatus { org_id, account, action } => {
                Self::UpdateAccountStatus { org_id, account, action: action.code() }
            }
            AccountSubcommand::StartRecovery { org_id, account } => {
                Self::StartBlacklistedAccountRecovery { org_id, account }
            }
            AccountSubcommand::ApproveRecovery { org_id, account } => {
                Self::ApproveBlacklistedAccountRecovery { org_id, account }
            }
        }
    }
}

/// Validates and submits `action`, printing the outcome.
pub async fn execute(node: &NodeOpts, action: PermAction) -> Result<()> {
    let session = Session::connect(node)?;
    let status = session.execute(action).await?;
    println!("{}", status.msg);
    Ok(())
}

fn parse_access(s: &str) -> Result<AccessType, String> {
    let code: u8 = s.parse().map_err(|_| format!("invalid access type {s:?}"))?;
    AccessType::try_from(code).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_actions() {
        let action: PermAction = OrgSubcommand::UpdateStatus {
            org_id: "ORG1".to_string(),
            action: OrgStatusAction::Suspend,
        }
        .into();
        assert_eq!(action, PermAction::UpdateOrgStatus { org_id: "ORG1".to_string(), action: 3 });

        assert_eq!(NodeStatusAction::Blacklist.code(), 5);
        assert_eq!(AccountStatusAction::RevokeSuspension.code(), 2);
    }

    #[test]
    fn parses_access_types() {
        assert_eq!(parse_access("1"), Ok(AccessType::Transact));
        assert_eq!(parse_access("7"), Ok(AccessType::ContractCallAndDeploy));
        assert!(parse_access("8").is_err());
        assert!(parse_access("full").is_err());
    }
}
