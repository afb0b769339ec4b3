//! Permission actions and the checks they go through before reaching the chain.

use crate::{
    AccessType, AccountStatus, NodeStatus, OrgStatus, PendingOp, PendingOpType, PermissionCache,
    PermissionConfig, PermissionError, enode, error::Result,
};
use alloy_primitives::{Address, U256};
use regex::Regex;
use std::sync::LazyLock;

static ORG_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").unwrap());

/// Org status actions.
pub const SUSPEND_ORG: u8 = 3;
pub const REVOKE_ORG_SUSPENSION: u8 = 5;

/// Node status actions.
pub const DEACTIVATE_NODE: u8 = 3;
pub const ACTIVATE_NODE: u8 = 4;
pub const BLACKLIST_NODE: u8 = 5;

/// Account status actions.
pub const SUSPEND_ACCOUNT: u8 = 1;
pub const REVOKE_ACCOUNT_SUSPENSION: u8 = 2;
pub const BLACKLIST_ACCOUNT: u8 = 3;

/// An action submitted through the permissions interface contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PermAction {
    AddOrg { org_id: String, url: String, account: Address },
    ApproveOrg { org_id: String, url: String, account: Address },
    AddSubOrg { parent_org_id: String, org_id: String, url: String },
    UpdateOrgStatus { org_id: String, action: u8 },
    ApproveOrgStatus { org_id: String, action: u8 },
    AddNode { org_id: String, url: String },
    UpdateNodeStatus { org_id: String, url: String, action: u8 },
    StartBlacklistedNodeRecovery { org_id: String, url: String },
    ApproveBlacklistedNodeRecovery { org_id: String, url: String },
    AssignAdminRole { org_id: String, account: Address, role_id: String },
    ApproveAdminRole { org_id: String, account: Address },
    AddNewRole { org_id: String, role_id: String, access: AccessType, is_voter: bool, is_admin: bool },
    RemoveRole { org_id: String, role_id: String },
    AssignAccountRole { org_id: String, account: Address, role_id: String },
    UpdateAccountStatus { org_id: String, account: Address, action: u8 },
    StartBlacklistedAccountRecovery { org_id: String, account: Address },
    ApproveBlacklistedAccountRecovery { org_id: String, account: Address },
}

impl PermAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddOrg { .. } => "addOrg",
            Self::ApproveOrg { .. } => "approveOrg",
            Self::AddSubOrg { .. } => "addSubOrg",
            Self::UpdateOrgStatus { .. } => "updateOrgStatus",
            Self::ApproveOrgStatus { .. } => "approveOrgStatus",
            Self::AddNode { .. } => "addNode",
            Self::UpdateNodeStatus { .. } => "updateNodeStatus",
            Self::StartBlacklistedNodeRecovery { .. } => "startBlacklistedNodeRecovery",
            Self::ApproveBlacklistedNodeRecovery { .. } => "approveBlacklistedNodeRecovery",
            Self::AssignAdminRole { .. } => "assignAdminRole",
            Self::ApproveAdminRole { .. } => "approveAdminRole",
            Self::AddNewRole { .. } => "addNewRole",
            Self::RemoveRole { .. } => "removeRole",
            Self::AssignAccountRole { .. } => "assignAccountRole",
            Self::UpdateAccountStatus { .. } => "updateAccountStatus",
            Self::StartBlacklistedAccountRecovery { .. } => "startBlacklistedAccountRecovery",
            Self::ApproveBlacklistedAccountRecovery { .. } => "approveBlacklistedAccountRecovery",
        }
    }

    /// Whether the action needs the pending operation of the network admin org to validate.
    pub fn needs_pending_op(&self) -> bool {
        matches!(
            self,
            Self::AddOrg { .. }
                | Self::ApproveOrg { .. }
                | Self::ApproveOrgStatus { .. }
                | Self::StartBlacklistedNodeRecovery { .. }
                | Self::ApproveBlacklistedNodeRecovery { .. }
                | Self::ApproveAdminRole { .. }
                | Self::StartBlacklistedAccountRecovery { .. }
                | Self::ApproveBlacklistedAccountRecovery { .. }
        )
    }
}

/// Validates actions against the cached permission model.
#[derive(Clone, Copy, Debug)]
pub struct Validator<'a> {
    cache: &'a PermissionCache,
    config: &'a PermissionConfig,
}

impl<'a> Validator<'a> {
    pub fn new(cache: &'a PermissionCache, config: &'a PermissionConfig) -> Self {
        Self { cache, config }
    }

    /// Checks whether `from` may submit `action`.
    ///
    /// `pending` is the operation the network admin org is waiting on.
    pub fn validate(&self, from: Address, action: &PermAction, pending: &PendingOp) -> Result<()> {
        use PermAction::*;
        match action {
            AddOrg { org_id, url, account } => {
                if org_id.is_empty() || url.is_empty() || account.is_zero() {
                    return Err(PermissionError::InvalidInput);
                }
                valid_org_name(org_id)?;
                self.network_admin(from)?;
                if pending.is_pending() {
                    return Err(PermissionError::PendingApprovals);
                }
                self.org_absent(org_id, "")?;
                self.node_details(url)?;
                self.org_admin_available(org_id, "", *account)
            }
            ApproveOrg { org_id, url, account } => {
                self.network_admin(from)?;
                expect_pending(pending, PendingOpType::OrgAdd, org_id, url, *account)
            }
            AddSubOrg { parent_org_id, org_id, url } => {
                if org_id.is_empty() {
                    return Err(PermissionError::InvalidInput);
                }
                valid_org_name(org_id)?;
                self.org_admin(from, parent_org_id)?;
                self.org_absent(org_id, parent_org_id)?;
                self.sub_org_limits(parent_org_id)?;
                self.node_details(url)
            }
            UpdateOrgStatus { org_id, action } => {
                self.network_admin(from)?;
                if *action != SUSPEND_ORG && *action != REVOKE_ORG_SUSPENSION {
                    return Err(PermissionError::OpNotAllowed);
                }
                self.org_status_change(org_id, *action)
            }
            ApproveOrgStatus { org_id, action } => {
                self.network_admin(from)?;
                let op = match *action {
                    SUSPEND_ORG => PendingOpType::OrgSuspension,
                    REVOKE_ORG_SUSPENSION => PendingOpType::OrgRevokeSuspension,
                    _ => return Err(PermissionError::OpNotAllowed),
                };
                expect_pending(pending, op, org_id, "", Address::ZERO)
            }
            AddNode { org_id, url } => {
                if url.is_empty() {
                    return Err(PermissionError::InvalidInput);
                }
                self.org_admin(from, org_id)?;
                self.node_details(url)
            }
            UpdateNodeStatus { org_id, url, action } => {
                self.org_admin(from, org_id)?;
                self.node_status_change(org_id, url, *action)
            }
            StartBlacklistedNodeRecovery { org_id, url } => {
                self.network_admin(from)?;
                if pending.is_pending() {
                    return Err(PermissionError::PendingApprovals);
                }
                let node = self.node_of_org(org_id, url)?;
                if node.status != NodeStatus::Blacklisted {
                    return Err(PermissionError::OpNotAllowed);
                }
                Ok(())
            }
            ApproveBlacklistedNodeRecovery { org_id, url } => {
                self.network_admin(from)?;
                expect_pending(pending, PendingOpType::NodeRecovery, org_id, url, Address::ZERO)
            }
            AssignAdminRole { org_id, account, role_id } => {
                if account.is_zero() {
                    return Err(PermissionError::InvalidInput);
                }
                if !self.config.is_admin_role(role_id) {
                    return Err(PermissionError::OpNotAllowed);
                }
                self.network_admin(from)?;
                self.org_admin_available(org_id, role_id, *account)
            }
            ApproveAdminRole { account, .. } => {
                self.network_admin(from)?;
                let acct = self.cache.get_account(*account).ok_or(PermissionError::InvalidAccount)?;
                expect_pending(pending, PendingOpType::AdminAssignment, &acct.org_id, "", *account)
            }
            AddNewRole { org_id, role_id, access, .. } => {
                if role_id.is_empty() {
                    return Err(PermissionError::InvalidInput);
                }
                self.org_admin(from, org_id)?;
                if self.cache.get_role(org_id, role_id).is_some() {
                    return Err(PermissionError::RoleExists);
                }
                if !access.is_valid_for(self.config.permission_model) {
                    return Err(PermissionError::InvalidAccessType(u8::from(*access)));
                }
                Ok(())
            }
            RemoveRole { org_id, role_id } => {
                self.org_admin(from, org_id)?;
                if self.config.is_admin_role(role_id) {
                    return Err(PermissionError::AdminRoles);
                }
                let role = self.cache.get_role(org_id, role_id).ok_or(PermissionError::InvalidRole)?;
                if !role.active {
                    return Err(PermissionError::InactiveRole);
                }
                if !self.cache.accounts_for_role(org_id, role_id).is_empty() {
                    return Err(PermissionError::RoleActive);
                }
                Ok(())
            }
            AssignAccountRole { org_id, account, role_id } => {
                if account.is_zero() {
                    return Err(PermissionError::InvalidInput);
                }
                if self.config.is_admin_role(role_id) {
                    return Err(PermissionError::InvalidRole);
                }
                self.org_admin(from, org_id)?;
                if !self.role_active(org_id, role_id) {
                    return Err(PermissionError::InvalidRole);
                }
                match self.cache.get_account(*account) {
                    Some(acct) if acct.org_id != *org_id => Err(PermissionError::AccountInUse),
                    _ => Ok(()),
                }
            }
            UpdateAccountStatus { org_id, account, action } => {
                self.org_admin(from, org_id)?;
                self.account_status_change(org_id, *account, *action)
            }
            StartBlacklistedAccountRecovery { org_id, account } => {
                self.network_admin(from)?;
                if pending.is_pending() {
                    return Err(PermissionError::PendingApprovals);
                }
                let acct = self.cache.get_account(*account).ok_or(PermissionError::AccountNotThere)?;
                if acct.org_id != *org_id {
                    return Err(PermissionError::OrgNotOwner);
                }
                if acct.status != AccountStatus::Blacklisted {
                    return Err(PermissionError::OpNotAllowed);
                }
                Ok(())
            }
            ApproveBlacklistedAccountRecovery { org_id, account } => {
                self.network_admin(from)?;
                expect_pending(pending, PendingOpType::AccountRecovery, org_id, "", *account)
            }
        }
    }

    fn network_admin(&self, account: Address) -> Result<()> {
        let is_admin = self.cache.get_account(account).is_some_and(|acct| {
            acct.role_id == self.config.nw_admin_role && acct.status == AccountStatus::Active
        });
        if is_admin { Ok(()) } else { Err(PermissionError::NotNetworkAdmin) }
    }

    /// `account` must be org admin of `org_id` or of its ultimate parent.
    fn org_admin(&self, account: Address, org_id: &str) -> Result<()> {
        let org = self.cache.get_org(org_id).ok_or(PermissionError::OrgDoesNotExist)?;
        let acct = self.cache.get_account(account).ok_or(PermissionError::NotOrgAdmin)?;
        if acct.is_org_admin && (acct.org_id == org_id || acct.org_id == org.ultimate_parent) {
            Ok(())
        } else {
            Err(PermissionError::NotOrgAdmin)
        }
    }

    fn org_absent(&self, org_id: &str, parent_org_id: &str) -> Result<()> {
        if parent_org_id.is_empty() {
            if self.cache.get_org(org_id).is_some() {
                return Err(PermissionError::OrgExists);
            }
            return Ok(());
        }
        if self.cache.get_org(parent_org_id).is_none() {
            return Err(PermissionError::InvalidParentOrg);
        }
        if self.cache.get_org(&format!("{parent_org_id}.{org_id}")).is_some() {
            return Err(PermissionError::OrgExists);
        }
        Ok(())
    }

    fn sub_org_limits(&self, parent_org_id: &str) -> Result<()> {
        let parent = self.cache.get_org(parent_org_id).ok_or(PermissionError::InvalidParentOrg)?;
        if self.config.depth() == parent.level {
            return Err(PermissionError::MaxDepth);
        }
        if self.config.breadth() == U256::from(parent.sub_org_list.len()) {
            return Err(PermissionError::MaxBreadth);
        }
        Ok(())
    }

    /// A non-empty `url` must be a valid enode that is not part of the network yet.
    fn node_details(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Ok(());
        }
        let node_id = enode::node_id(url).ok_or(PermissionError::InvalidNode)?;
        if self.node_exists(url, &node_id) {
            return Err(PermissionError::NodePresent);
        }
        Ok(())
    }

    /// Same URL, or the same node id on other ports.
    fn node_exists(&self, url: &str, node_id: &str) -> bool {
        self.cache.get_node_by_url(url).is_some()
            || self
                .cache
                .node_list()
                .iter()
                .any(|node| enode::node_id(&node.url).is_some_and(|id| id == node_id))
    }

    /// The account is either unknown or already part of `org_id`, and does not hold the org
    /// admin role there yet.
    fn org_admin_available(&self, org_id: &str, role_id: &str, account: Address) -> Result<()> {
        let Some(acct) = self.cache.get_account(account) else { return Ok(()) };
        if acct.org_id != org_id {
            return Err(PermissionError::AccountInUse);
        }
        if !role_id.is_empty() && role_id == self.config.org_admin_role && acct.is_org_admin {
            return Err(PermissionError::AccountOrgAdmin);
        }
        Ok(())
    }

    fn org_status_change(&self, org_id: &str, action: u8) -> Result<()> {
        let org = self.cache.get_org(org_id).ok_or(PermissionError::OrgDoesNotExist)?;
        if !org.is_master() {
            return Err(PermissionError::NotMasterOrg);
        }
        let allowed = (action == SUSPEND_ORG && org.status == OrgStatus::Approved)
            || (action == REVOKE_ORG_SUSPENSION && org.status == OrgStatus::Suspended);
        if allowed { Ok(()) } else { Err(PermissionError::OpNotAllowed) }
    }

    fn node_of_org(&self, org_id: &str, url: &str) -> Result<crate::NodeInfo> {
        if url.is_empty() || enode::node_id(url).is_none() {
            return Err(PermissionError::InvalidNode);
        }
        let node = self.cache.get_node_by_url(url).ok_or(PermissionError::NodeDoesNotExist)?;
        if node.org_id != org_id {
            return Err(PermissionError::NodeOrgMismatch);
        }
        Ok(node)
    }

    fn node_status_change(&self, org_id: &str, url: &str, action: u8) -> Result<()> {
        let node = self.node_of_org(org_id, url)?;
        if node.status == NodeStatus::Blacklisted {
            return Err(PermissionError::BlacklistedNode);
        }
        match action {
            DEACTIVATE_NODE if node.status != NodeStatus::Approved => Err(PermissionError::OpNotAllowed),
            ACTIVATE_NODE if node.status != NodeStatus::Deactivated => Err(PermissionError::OpNotAllowed),
            DEACTIVATE_NODE | ACTIVATE_NODE | BLACKLIST_NODE => Ok(()),
            _ => Err(PermissionError::OpNotAllowed),
        }
    }

    /// The role must be active in the org or in its ultimate parent.
    fn role_active(&self, org_id: &str, role_id: &str) -> bool {
        let role = self.cache.get_role(org_id, role_id).or_else(|| {
            let org = self.cache.get_org(org_id)?;
            self.cache.get_role(&org.ultimate_parent, role_id)
        });
        role.is_some_and(|role| role.active)
    }

    fn account_status_change(&self, org_id: &str, account: Address, action: u8) -> Result<()> {
        let acct = self.cache.get_account(account).ok_or(PermissionError::AccountNotThere)?;
        if acct.is_org_admin
            && self.config.is_admin_role(&acct.role_id)
            && (action == SUSPEND_ACCOUNT || action == BLACKLIST_ACCOUNT)
        {
            return Err(PermissionError::OpNotAllowed);
        }
        if acct.org_id != org_id {
            return Err(PermissionError::OrgNotOwner);
        }
        if acct.status == AccountStatus::Blacklisted {
            return Err(PermissionError::BlacklistedAccount);
        }
        match action {
            SUSPEND_ACCOUNT if acct.status != AccountStatus::Active => Err(PermissionError::OpNotAllowed),
            REVOKE_ACCOUNT_SUSPENSION if acct.status != AccountStatus::Suspended => {
                Err(PermissionError::OpNotAllowed)
            }
            SUSPEND_ACCOUNT | REVOKE_ACCOUNT_SUSPENSION | BLACKLIST_ACCOUNT => Ok(()),
            _ => Err(PermissionError::OpNotAllowed),
        }
    }
}

fn valid_org_name(org_id: &str) -> Result<()> {
    if ORG_ID_RE.is_match(org_id) { Ok(()) } else { Err(PermissionError::InvalidOrgName) }
}

fn expect_pending(
    pending: &PendingOp,
    op_type: PendingOpType,
    org_id: &str,
    url: &str,
    account: Address,
) -> Result<()> {
    if pending.matches(op_type, org_id, url, account) {
        Ok(())
    } else {
        Err(PermissionError::NothingToApprove)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountInfo, PermissionModel, RoleInfo};
    use permission_test_utils::{NODE_ID_1, NODE_ID_2, NODE_ID_3, PERMISSION_CONFIG, enode_url};

    const NW_ADMIN: Address = Address::repeat_byte(0xaa);
    const ORG_ADMIN: Address = Address::repeat_byte(0xbb);
    const USER: Address = Address::repeat_byte(0x01);
    const NEW: Address = Address::repeat_byte(0x42);

    struct Fixture {
        cache: PermissionCache,
        config: PermissionConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = PermissionConfig::from_json(PERMISSION_CONFIG).unwrap();
            let cache = PermissionCache::default();
            cache.set_defaults("ADMIN", "ORGADMIN", PermissionModel::V1);

            cache.upsert_org("ADMINORG", "", "ADMINORG", U256::from(1), OrgStatus::Approved);
            cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Approved);
            cache.upsert_org("SUB1", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
            cache.upsert_node("ADMINORG", &enode_url(NODE_ID_1, 21000), NodeStatus::Approved);
            cache.upsert_node("ORG1", &enode_url(NODE_ID_2, 21001), NodeStatus::Approved);
            cache.upsert_role(role("ORG1", "TXN", true));
            cache.upsert_account(account(NW_ADMIN, "ADMINORG", "ADMIN", true, AccountStatus::Active));
            cache.upsert_account(account(ORG_ADMIN, "ORG1", "ORGADMIN", true, AccountStatus::Active));
            cache.upsert_account(account(USER, "ORG1", "TXN", false, AccountStatus::Active));
            Self { cache, config }
        }

        fn check(&self, from: Address, action: PermAction) -> Result<()> {
            self.check_pending(from, action, &PendingOp::none())
        }

        fn check_pending(&self, from: Address, action: PermAction, pending: &PendingOp) -> Result<()> {
            Validator::new(&self.cache, &self.config).validate(from, &action, pending)
        }
    }

    fn role(org: &str, role: &str, active: bool) -> RoleInfo {
        RoleInfo {
            org_id: org.to_string(),
            role_id: role.to_string(),
            is_voter: false,
            is_admin: false,
            access: AccessType::Transact,
            active,
        }
    }

    fn account(
        acct_id: Address,
        org: &str,
        role: &str,
        is_org_admin: bool,
        status: AccountStatus,
    ) -> AccountInfo {
        AccountInfo { org_id: org.to_string(), role_id: role.to_string(), acct_id, is_org_admin, status }
    }

    fn pending(op_type: PendingOpType, org_id: &str, url: &str, account: Address) -> PendingOp {
        PendingOp { org_id: org_id.to_string(), enode_id: url.to_string(), account, op_type }
    }

    fn add_org(org_id: &str, url: &str, account: Address) -> PermAction {
        PermAction::AddOrg { org_id: org_id.to_string(), url: url.to_string(), account }
    }

    macro_rules! assert_err {
        ($res:expr, $err:pat) => {{
            let res = $res;
            assert!(matches!(res, Err($err)), "unexpected result {res:?}");
        }};
    }

    #[test]
    fn adds_org() {
        let f = Fixture::new();
        let url = enode_url(NODE_ID_3, 21002);
        assert!(f.check(NW_ADMIN, add_org("ORG2", &url, NEW)).is_ok());

        assert_err!(f.check(NW_ADMIN, add_org("", &url, NEW)), PermissionError::InvalidInput);
        assert_err!(f.check(NW_ADMIN, add_org("ORG2", "", NEW)), PermissionError::InvalidInput);
        assert_err!(
            f.check(NW_ADMIN, add_org("ORG2", &url, Address::ZERO)),
            PermissionError::InvalidInput
        );
        assert_err!(f.check(NW_ADMIN, add_org("OR.G2", &url, NEW)), PermissionError::InvalidOrgName);
        assert_err!(f.check(ORG_ADMIN, add_org("ORG2", &url, NEW)), PermissionError::NotNetworkAdmin);
        assert_err!(
            f.check_pending(
                NW_ADMIN,
                add_org("ORG2", &url, NEW),
                &pending(PendingOpType::OrgAdd, "ORG3", "", NEW)
            ),
            PermissionError::PendingApprovals
        );
        assert_err!(f.check(NW_ADMIN, add_org("ORG1", &url, NEW)), PermissionError::OrgExists);
        assert_err!(f.check(NW_ADMIN, add_org("ORG2", "enode://bad", NEW)), PermissionError::InvalidNode);
        // same node id on another port
        assert_err!(
            f.check(NW_ADMIN, add_org("ORG2", &enode_url(NODE_ID_2, 30303), NEW)),
            PermissionError::NodePresent
        );
        assert_err!(f.check(NW_ADMIN, add_org("ORG2", &url, USER)), PermissionError::AccountInUse);
    }

    #[test]
    fn network_admin_must_be_active() {
        let f = Fixture::new();
        f.cache.upsert_account(account(NW_ADMIN, "ADMINORG", "ADMIN", true, AccountStatus::Suspended));
        let url = enode_url(NODE_ID_3, 21002);
        assert_err!(f.check(NW_ADMIN, add_org("ORG2", &url, NEW)), PermissionError::NotNetworkAdmin);
    }

    #[test]
    fn approvals_match_pending_op() {
        let f = Fixture::new();
        let url = enode_url(NODE_ID_3, 21002);
        let approve = PermAction::ApproveOrg { org_id: "ORG2".to_string(), url: url.clone(), account: NEW };
        let op = pending(PendingOpType::OrgAdd, "ORG2", &url, NEW);
        assert!(f.check_pending(NW_ADMIN, approve.clone(), &op).is_ok());
        assert_err!(f.check(NW_ADMIN, approve.clone()), PermissionError::NothingToApprove);
        assert_err!(
            f.check_pending(NW_ADMIN, approve.clone(), &pending(PendingOpType::OrgAdd, "ORG2", &url, USER)),
            PermissionError::NothingToApprove
        );
        assert_err!(f.check_pending(ORG_ADMIN, approve, &op), PermissionError::NotNetworkAdmin);

        let suspend = PermAction::ApproveOrgStatus { org_id: "ORG1".to_string(), action: SUSPEND_ORG };
        let op = pending(PendingOpType::OrgSuspension, "ORG1", "", Address::ZERO);
        assert!(f.check_pending(NW_ADMIN, suspend, &op).is_ok());
        let revoke =
            PermAction::ApproveOrgStatus { org_id: "ORG1".to_string(), action: REVOKE_ORG_SUSPENSION };
        assert_err!(f.check_pending(NW_ADMIN, revoke.clone(), &op), PermissionError::NothingToApprove);
        let op = pending(PendingOpType::OrgRevokeSuspension, "ORG1", "", Address::ZERO);
        assert!(f.check_pending(NW_ADMIN, revoke, &op).is_ok());
        assert_err!(
            f.check(NW_ADMIN, PermAction::ApproveOrgStatus { org_id: "ORG1".to_string(), action: 4 }),
            PermissionError::OpNotAllowed
        );

        // admin approval is matched against the org of the account
        f.cache.upsert_account(account(NEW, "ORG1", "ORGADMIN", false, AccountStatus::PendingApproval));
        let approve = PermAction::ApproveAdminRole { org_id: "ORG1".to_string(), account: NEW };
        let op = pending(PendingOpType::AdminAssignment, "ORG1", "", NEW);
        assert!(f.check_pending(NW_ADMIN, approve, &op).is_ok());
        assert_err!(
            f.check(
                NW_ADMIN,
                PermAction::ApproveAdminRole { org_id: "ORG1".to_string(), account: Address::repeat_byte(0x77) }
            ),
            PermissionError::InvalidAccount
        );
    }

    #[test]
    fn add_sub_org() {
        let f = Fixture::new();
        let sub = |parent: &str, org: &str| PermAction::AddSubOrg {
            parent_org_id: parent.to_string(),
            org_id: org.to_string(),
            url: String::new(),
        };
        assert!(f.check(ORG_ADMIN, sub("ORG1", "SUB2")).is_ok());
        assert!(f.check(ORG_ADMIN, sub("ORG1.SUB1", "SUB2")).is_ok());
        assert_err!(f.check(ORG_ADMIN, sub("ORG1", "")), PermissionError::InvalidInput);
        assert_err!(f.check(ORG_ADMIN, sub("ORG1", "SUB 2")), PermissionError::InvalidOrgName);
        assert_err!(f.check(USER, sub("ORG1", "SUB2")), PermissionError::NotOrgAdmin);
        assert_err!(f.check(ORG_ADMIN, sub("NOPE", "SUB2")), PermissionError::OrgDoesNotExist);
        assert_err!(f.check(NW_ADMIN, sub("ORG1", "SUB2")), PermissionError::NotOrgAdmin);
        assert_err!(f.check(ORG_ADMIN, sub("ORG1", "SUB1")), PermissionError::OrgExists);

        f.cache.upsert_org("SUB2", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
        f.cache.upsert_org("SUB3", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
        assert_err!(f.check(ORG_ADMIN, sub("ORG1", "SUB4")), PermissionError::MaxBreadth);

        f.cache.upsert_org("L3", "ORG1.SUB1", "ORG1", U256::from(3), OrgStatus::Approved);
        f.cache.upsert_org("L4", "ORG1.SUB1.L3", "ORG1", U256::from(4), OrgStatus::Approved);
        assert_err!(f.check(ORG_ADMIN, sub("ORG1.SUB1.L3.L4", "L5")), PermissionError::MaxDepth);
    }

    #[test]
    fn update_org_status() {
        let f = Fixture::new();
        let update = |org: &str, action| PermAction::UpdateOrgStatus { org_id: org.to_string(), action };
        assert!(f.check(NW_ADMIN, update("ORG1", SUSPEND_ORG)).is_ok());
        assert_err!(f.check(NW_ADMIN, update("ORG1", REVOKE_ORG_SUSPENSION)), PermissionError::OpNotAllowed);
        assert_err!(f.check(NW_ADMIN, update("ORG1", 1)), PermissionError::OpNotAllowed);
        assert_err!(f.check(NW_ADMIN, update("ORG1.SUB1", SUSPEND_ORG)), PermissionError::NotMasterOrg);
        assert_err!(f.check(NW_ADMIN, update("NOPE", SUSPEND_ORG)), PermissionError::OrgDoesNotExist);
        assert_err!(f.check(ORG_ADMIN, update("ORG1", SUSPEND_ORG)), PermissionError::NotNetworkAdmin);

        f.cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Suspended);
        assert!(f.check(NW_ADMIN, update("ORG1", REVOKE_ORG_SUSPENSION)).is_ok());
    }

    #[test]
    fn nodes() {
        let f = Fixture::new();
        let add = |url: String| PermAction::AddNode { org_id: "ORG1".to_string(), url };
        assert!(f.check(ORG_ADMIN, add(enode_url(NODE_ID_3, 21002))).is_ok());
        assert_err!(f.check(ORG_ADMIN, add(String::new())), PermissionError::InvalidInput);
        assert_err!(f.check(ORG_ADMIN, add(enode_url(NODE_ID_1, 21000))), PermissionError::NodePresent);

        let url = enode_url(NODE_ID_2, 21001);
        let update = |url: &str, action| PermAction::UpdateNodeStatus {
            org_id: "ORG1".to_string(),
            url: url.to_string(),
            action,
        };
        assert!(f.check(ORG_ADMIN, update(&url, DEACTIVATE_NODE)).is_ok());
        assert!(f.check(ORG_ADMIN, update(&url, BLACKLIST_NODE)).is_ok());
        assert_err!(f.check(ORG_ADMIN, update(&url, ACTIVATE_NODE)), PermissionError::OpNotAllowed);
        assert_err!(f.check(ORG_ADMIN, update(&url, 1)), PermissionError::OpNotAllowed);
        assert_err!(f.check(ORG_ADMIN, update("", DEACTIVATE_NODE)), PermissionError::InvalidNode);
        assert_err!(
            f.check(ORG_ADMIN, update(&enode_url(NODE_ID_3, 1), DEACTIVATE_NODE)),
            PermissionError::NodeDoesNotExist
        );
        assert_err!(
            f.check(ORG_ADMIN, update(&enode_url(NODE_ID_1, 21000), DEACTIVATE_NODE)),
            PermissionError::NodeOrgMismatch
        );

        f.cache.upsert_node("ORG1", &url, NodeStatus::Deactivated);
        assert!(f.check(ORG_ADMIN, update(&url, ACTIVATE_NODE)).is_ok());
        f.cache.upsert_node("ORG1", &url, NodeStatus::Blacklisted);
        assert_err!(f.check(ORG_ADMIN, update(&url, ACTIVATE_NODE)), PermissionError::BlacklistedNode);
    }

    #[test]
    fn node_recovery() {
        let f = Fixture::new();
        let url = enode_url(NODE_ID_2, 21001);
        let start = PermAction::StartBlacklistedNodeRecovery { org_id: "ORG1".to_string(), url: url.clone() };
        assert_err!(f.check(NW_ADMIN, start.clone()), PermissionError::OpNotAllowed);

        f.cache.upsert_node("ORG1", &url, NodeStatus::Blacklisted);
        assert!(f.check(NW_ADMIN, start.clone()).is_ok());
        assert_err!(f.check(ORG_ADMIN, start.clone()), PermissionError::NotNetworkAdmin);
        let op = pending(PendingOpType::NodeRecovery, "ORG1", &url, Address::ZERO);
        assert_err!(f.check_pending(NW_ADMIN, start, &op), PermissionError::PendingApprovals);

        let approve = PermAction::ApproveBlacklistedNodeRecovery { org_id: "ORG1".to_string(), url };
        assert!(f.check_pending(NW_ADMIN, approve.clone(), &op).is_ok());
        assert_err!(f.check(NW_ADMIN, approve), PermissionError::NothingToApprove);
    }

    #[test]
    fn assign_admin_role() {
        let f = Fixture::new();
        let assign = |account, role: &str| PermAction::AssignAdminRole {
            org_id: "ORG1".to_string(),
            account,
            role_id: role.to_string(),
        };
        assert!(f.check(NW_ADMIN, assign(NEW, "ORGADMIN")).is_ok());
        assert!(f.check(NW_ADMIN, assign(USER, "ORGADMIN")).is_ok());
        assert_err!(f.check(NW_ADMIN, assign(Address::ZERO, "ORGADMIN")), PermissionError::InvalidInput);
        assert_err!(f.check(NW_ADMIN, assign(NEW, "TXN")), PermissionError::OpNotAllowed);
        assert_err!(f.check(ORG_ADMIN, assign(NEW, "ORGADMIN")), PermissionError::NotNetworkAdmin);
        assert_err!(f.check(NW_ADMIN, assign(NW_ADMIN, "ORGADMIN")), PermissionError::AccountInUse);
        assert_err!(f.check(NW_ADMIN, assign(ORG_ADMIN, "ORGADMIN")), PermissionError::AccountOrgAdmin);
    }

    #[test]
    fn roles() {
        let f = Fixture::new();
        let add = |role: &str, access| PermAction::AddNewRole {
            org_id: "ORG1".to_string(),
            role_id: role.to_string(),
            access,
            is_voter: false,
            is_admin: false,
        };
        assert!(f.check(ORG_ADMIN, add("OPS", AccessType::ContractDeploy)).is_ok());
        assert_err!(f.check(ORG_ADMIN, add("", AccessType::Transact)), PermissionError::InvalidInput);
        assert_err!(f.check(USER, add("OPS", AccessType::Transact)), PermissionError::NotOrgAdmin);
        assert_err!(f.check(ORG_ADMIN, add("TXN", AccessType::Transact)), PermissionError::RoleExists);
        assert_err!(
            f.check(ORG_ADMIN, add("OPS", AccessType::ContractCall)),
            PermissionError::InvalidAccessType(4)
        );

        let remove = |role: &str| PermAction::RemoveRole { org_id: "ORG1".to_string(), role_id: role.to_string() };
        assert_err!(f.check(ORG_ADMIN, remove("ORGADMIN")), PermissionError::AdminRoles);
        assert_err!(f.check(ORG_ADMIN, remove("OPS")), PermissionError::InvalidRole);
        assert_err!(f.check(ORG_ADMIN, remove("TXN")), PermissionError::RoleActive);

        f.cache.upsert_account(account(USER, "ORG1", "OPS", false, AccountStatus::Active));
        assert!(f.check(ORG_ADMIN, remove("TXN")).is_ok());
        f.cache.upsert_role(role("ORG1", "TXN", false));
        assert_err!(f.check(ORG_ADMIN, remove("TXN")), PermissionError::InactiveRole);
    }

    #[test]
    fn assign_account_role() {
        let f = Fixture::new();
        let assign = |org: &str, account, role: &str| PermAction::AssignAccountRole {
            org_id: org.to_string(),
            account,
            role_id: role.to_string(),
        };
        assert!(f.check(ORG_ADMIN, assign("ORG1", NEW, "TXN")).is_ok());
        // role of the ultimate parent
        assert!(f.check(ORG_ADMIN, assign("ORG1.SUB1", NEW, "TXN")).is_ok());
        assert_err!(f.check(ORG_ADMIN, assign("ORG1", Address::ZERO, "TXN")), PermissionError::InvalidInput);
        assert_err!(f.check(ORG_ADMIN, assign("ORG1", NEW, "ADMIN")), PermissionError::InvalidRole);
        assert_err!(f.check(ORG_ADMIN, assign("ORG1", NEW, "NOPE")), PermissionError::InvalidRole);
        assert_err!(f.check(USER, assign("ORG1", NEW, "TXN")), PermissionError::NotOrgAdmin);
        assert_err!(f.check(ORG_ADMIN, assign("ORG1", NW_ADMIN, "TXN")), PermissionError::AccountInUse);
    }

    #[test]
    fn update_account_status() {
        let f = Fixture::new();
        let update = |account, action| PermAction::UpdateAccountStatus {
            org_id: "ORG1".to_string(),
            account,
            action,
        };
        assert!(f.check(ORG_ADMIN, update(USER, SUSPEND_ACCOUNT)).is_ok());
        assert!(f.check(ORG_ADMIN, update(USER, BLACKLIST_ACCOUNT)).is_ok());
        assert_err!(f.check(ORG_ADMIN, update(USER, REVOKE_ACCOUNT_SUSPENSION)), PermissionError::OpNotAllowed);
        assert_err!(f.check(ORG_ADMIN, update(USER, 7)), PermissionError::OpNotAllowed);
        assert_err!(f.check(ORG_ADMIN, update(NEW, SUSPEND_ACCOUNT)), PermissionError::AccountNotThere);
        assert_err!(f.check(ORG_ADMIN, update(ORG_ADMIN, SUSPEND_ACCOUNT)), PermissionError::OpNotAllowed);
        assert_err!(f.check(USER, update(USER, SUSPEND_ACCOUNT)), PermissionError::NotOrgAdmin);

        f.cache.upsert_account(account(NEW, "ORG1.SUB1", "TXN", false, AccountStatus::Active));
        assert_err!(f.check(ORG_ADMIN, update(NEW, SUSPEND_ACCOUNT)), PermissionError::OrgNotOwner);

        f.cache.upsert_account(account(USER, "ORG1", "TXN", false, AccountStatus::Suspended));
        assert!(f.check(ORG_ADMIN, update(USER, REVOKE_ACCOUNT_SUSPENSION)).is_ok());
        f.cache.upsert_account(account(USER, "ORG1", "TXN", false, AccountStatus::Blacklisted));
        assert_err!(f.check(ORG_ADMIN, update(USER, SUSPEND_ACCOUNT)), PermissionError::BlacklistedAccount);
    }

    #[test]
    fn account_recovery() {
        let f = Fixture::new();
        let start =
            PermAction::StartBlacklistedAccountRecovery { org_id: "ORG1".to_string(), account: USER };
        assert_err!(f.check(NW_ADMIN, start.clone()), PermissionError::OpNotAllowed);

        f.cache.upsert_account(account(USER, "ORG1", "TXN", false, AccountStatus::Blacklisted));
        assert!(f.check(NW_ADMIN, start).is_ok());
        assert_err!(
            f.check(
                NW_ADMIN,
                PermAction::StartBlacklistedAccountRecovery { org_id: "ORG1".to_string(), account: NEW }
            ),
            PermissionError::AccountNotThere
        );

        let approve =
            PermAction::ApproveBlacklistedAccountRecovery { org_id: "ORG1".to_string(), account: USER };
        let op = pending(PendingOpType::AccountRecovery, "ORG1", "", USER);
        assert!(f.check_pending(NW_ADMIN, approve.clone(), &op).is_ok());
        assert_err!(f.check(NW_ADMIN, approve), PermissionError::NothingToApprove);
    }

    #[test]
    fn action_names() {
        let action = PermAction::RemoveRole { org_id: "ORG1".to_string(), role_id: "TXN".to_string() };
        assert_eq!(action.name(), "removeRole");
        assert!(!action.needs_pending_op());
        assert!(add_org("ORG2", "", NEW).needs_pending_op());
    }
}
