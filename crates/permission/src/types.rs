//! The permission model mirrored from the contracts.

use crate::error::PermissionError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Declares a `u8` backed enum that converts from the `uint256` values the contracts emit.
macro_rules! contract_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
        )]
        #[serde(into = "u8", try_from = "u8")]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as Self
            }
        }

        impl From<$name> for U256 {
            fn from(value: $name) -> Self {
                Self::from(u8::from(value))
            }
        }

        impl TryFrom<u8> for $name {
            type Error = PermissionError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(PermissionError::UnknownValue {
                        kind: stringify!($name),
                        value: U256::from(value),
                    }),
                }
            }
        }

        impl TryFrom<U256> for $name {
            type Error = PermissionError;

            fn try_from(value: U256) -> Result<Self, Self::Error> {
                u8::try_from(value)
                    .map_err(|_| PermissionError::UnknownValue { kind: stringify!($name), value })
                    .and_then(Self::try_from)
            }
        }
    };
}

contract_enum! {
    /// Access granted to an account through its role.
    ///
    /// The first four types are shared by both permission models, the rest only exist in
    /// the v2 model.
    pub enum AccessType {
        ReadOnly = 0,
        Transact = 1,
        ContractDeploy = 2,
        FullAccess = 3,
        ContractCall = 4,
        TransactAndContractCall = 5,
        TransactAndContractDeploy = 6,
        ContractCallAndDeploy = 7,
    }
}

impl AccessType {
    /// Whether the access type exists in the given permission model.
    pub fn is_valid_for(self, model: PermissionModel) -> bool {
        model == PermissionModel::V2 || u8::from(self) <= u8::from(Self::FullAccess)
    }
}

contract_enum! {
    pub enum OrgStatus {
        PendingApproval = 1,
        Approved = 2,
        PendingSuspension = 3,
        Suspended = 4,
    }
}

contract_enum! {
    pub enum NodeStatus {
        PendingApproval = 1,
        Approved = 2,
        Deactivated = 3,
        Blacklisted = 4,
        RecoveryInitiated = 5,
    }
}

contract_enum! {
    pub enum AccountStatus {
        PendingApproval = 1,
        Active = 2,
        Inactive = 3,
        Suspended = 4,
        Blacklisted = 5,
        AdminRevoked = 6,
        RecoveryInitiated = 7,
        RecoveryCompleted = 8,
    }
}

contract_enum! {
    /// Kind of the operation an org is waiting on.
    pub enum PendingOpType {
        None = 0,
        OrgAdd = 1,
        OrgSuspension = 2,
        OrgRevokeSuspension = 3,
        AdminAssignment = 4,
        NodeRecovery = 5,
        AccountRecovery = 6,
    }
}

/// Shape of a transaction, as far as permissions care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransactionType {
    ValueTransfer,
    ContractCall,
    ContractDeploy,
}

impl TransactionType {
    /// Derives the type from the recipient and the payload of a transaction.
    pub fn of(to: Option<Address>, data: Option<&[u8]>) -> Self {
        match (to, data) {
            (None, _) => Self::ContractDeploy,
            (Some(_), Some(_)) => Self::ContractCall,
            (Some(_), None) => Self::ValueTransfer,
        }
    }
}

/// Generation of the permission contracts.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionModel {
    #[default]
    #[display("v1")]
    V1,
    #[display("v2")]
    V2,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgInfo {
    pub org_id: String,
    pub full_org_id: String,
    pub parent_org_id: String,
    pub ultimate_parent: String,
    pub level: U256,
    pub sub_org_list: Vec<String>,
    pub status: OrgStatus,
}

impl OrgInfo {
    /// Master orgs sit at the top of an org tree.
    pub fn is_master(&self) -> bool {
        self.level == U256::from(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub org_id: String,
    pub url: String,
    pub status: NodeStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    pub org_id: String,
    pub role_id: String,
    pub is_voter: bool,
    pub is_admin: bool,
    pub access: AccessType,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub org_id: String,
    pub role_id: String,
    pub acct_id: Address,
    pub is_org_admin: bool,
    pub status: AccountStatus,
}

/// Everything attached to one org.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgDetailInfo {
    pub node_list: Vec<NodeInfo>,
    pub role_list: Vec<RoleInfo>,
    pub acct_list: Vec<AccountInfo>,
    pub sub_org_list: Vec<String>,
}

/// The operation an org is waiting on, as reported by `getPendingOp`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingOp {
    pub org_id: String,
    pub enode_id: String,
    pub account: Address,
    pub op_type: PendingOpType,
}

impl PendingOp {
    /// No operation pending.
    pub fn none() -> Self {
        Self {
            org_id: String::new(),
            enode_id: String::new(),
            account: Address::ZERO,
            op_type: PendingOpType::None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.op_type != PendingOpType::None
    }

    /// Returns `true` if this is exactly the given operation.
    pub fn matches(&self, op_type: PendingOpType, org_id: &str, enode_id: &str, account: Address) -> bool {
        self.op_type == op_type
            && self.org_id == org_id
            && self.enode_id == enode_id
            && self.account == account
    }
}

/// Outcome of a permission action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStatus {
    pub status: bool,
    pub msg: String,
}

impl ExecStatus {
    pub fn success() -> Self {
        Self { status: true, msg: "Action completed successfully".to_string() }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self { status: false, msg: msg.into() }
    }
}

impl From<&PermissionError> for ExecStatus {
    fn from(err: &PermissionError) -> Self {
        if err.is_validation() {
            Self::failure(err.to_string())
        } else {
            Self::failure(format!("failed to execute permissions action: {err}"))
        }
    }
}

impl<T> From<Result<T, PermissionError>> for ExecStatus {
    fn from(res: Result<T, PermissionError>) -> Self {
        match res {
            Ok(_) => Self::success(),
            Err(err) => Self::from(&err),
        }
    }
}
