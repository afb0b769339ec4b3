//! Permission errors.

use alloy_primitives::U256;
use eyre::Chain;
use std::error::Error;

/// Failures of permission checks and actions.
///
/// The messages of the validation variants are the ones reported to callers in
/// [`ExecStatus`](crate::ExecStatus).
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("Invalid input")]
    InvalidInput,
    #[error("Invalid role")]
    InvalidRole,
    #[error("Operation can be performed by network admin only. Account not a network admin.")]
    NotNetworkAdmin,
    #[error("Operation can be performed by org admin only. Account not a org admin.")]
    NotOrgAdmin,
    #[error("EnodeId already part of network.")]
    NodePresent,
    #[error("Invalid enode id")]
    InvalidNode,
    #[error("Invalid account id")]
    InvalidAccount,
    #[error("Org already exist")]
    OrgExists,
    #[error("Pending approvals for the organization. Approve first")]
    PendingApprovals,
    #[error("Nothing to approve")]
    NothingToApprove,
    #[error("Operation not allowed")]
    OpNotAllowed,
    #[error("Enode id passed does not belong to the organization.")]
    NodeOrgMismatch,
    #[error("Blacklisted node. Operation not allowed")]
    BlacklistedNode,
    #[error("Blacklisted account. Operation not allowed")]
    BlacklistedAccount,
    #[error("Account already org admin for the org")]
    AccountOrgAdmin,
    #[error("Org admin exist for the org")]
    OrgAdminExists,
    #[error("Account already in use in another organization")]
    AccountInUse,
    #[error("Role exist for the org")]
    RoleExists,
    #[error("Accounts linked to the role. Cannot be removed")]
    RoleActive,
    #[error("Admin role cannot be removed")]
    AdminRoles,
    #[error("Org id cannot contain special characters")]
    InvalidOrgName,
    #[error("Invalid parent org id")]
    InvalidParentOrg,
    #[error("Account does not exist")]
    AccountNotThere,
    #[error("Account does not belong to this org")]
    OrgNotOwner,
    #[error("Max depth for sub orgs reached")]
    MaxDepth,
    #[error("Max breadth for sub orgs reached")]
    MaxBreadth,
    #[error("Node does not exist")]
    NodeDoesNotExist,
    #[error("Org does not exist")]
    OrgDoesNotExist,
    #[error("Role is already inactive")]
    InactiveRole,
    #[error("Org is not a master org")]
    NotMasterOrg,
    #[error("Hostname not supported in the network")]
    HostNameNotSupported,
    #[error("account does not have permission for the transaction")]
    NoPermissionForTxn,
    #[error("invalid access type {0} for the permission model")]
    InvalidAccessType(u8),
    #[error("unknown {kind} value {value}")]
    UnknownValue { kind: &'static str, value: U256 },
    #[error(transparent)]
    Contract(#[from] alloy_contract::Error),
    #[error(transparent)]
    PendingTransaction(#[from] alloy_provider::PendingTransactionError),
    #[error("transaction {0} reverted")]
    Reverted(alloy_primitives::TxHash),
    #[error(transparent)]
    NodeFile(#[from] crate::NodeFileError),
}

impl PermissionError {
    /// Returns `true` for errors raised by local validation, before anything reached the
    /// chain.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::Contract(_)
                | Self::PendingTransaction(_)
                | Self::Reverted(_)
                | Self::UnknownValue { .. }
                | Self::NodeFile(_)
        )
    }
}

pub type Result<T, E = PermissionError> = std::result::Result<T, E>;

mod private {
    use super::*;

    pub trait ErrorChain {
        fn chain(&self) -> Chain<'_>;
    }

    impl ErrorChain for dyn Error + 'static {
        fn chain(&self) -> Chain<'_> {
            Chain::new(self)
        }
    }

    impl ErrorChain for eyre::Report {
        fn chain(&self) -> Chain<'_> {
            self.chain()
        }
    }
}

/// Displays a chain of errors in a single line.
pub fn display_chain<E: private::ErrorChain + ?Sized>(error: &E) -> String {
    dedup_chain(error).join("; ")
}

/// Deduplicates a chain of errors.
pub fn dedup_chain<E: private::ErrorChain + ?Sized>(error: &E) -> Vec<String> {
    let mut causes = all_sources(error);
    // Deduplicate the common pattern `msg1: msg2; msg2` -> `msg1: msg2`.
    causes.dedup_by(|b, a| a.contains(b.as_str()));
    causes
}

fn all_sources<E: private::ErrorChain + ?Sized>(err: &E) -> Vec<String> {
    err.chain().map(|cause| cause.to_string().trim().to_string()).collect()
}
