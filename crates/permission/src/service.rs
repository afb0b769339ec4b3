//! Executes permission actions and answers queries over the cached model.

use crate::{
    AccountInfo, ExecStatus, InterfaceCall, NodeInfo, OrgDetailInfo, OrgInfo, PendingOp,
    PermAction, PermissionCache, PermissionChain, PermissionConfig, PermissionContracts,
    PermissionError, RoleInfo, controls::Validator, error::Result,
};
use alloy_primitives::{Address, TxHash, U256};
use permission_bindings::PermissionsInterface::{
    addNewRoleCall, addNodeCall, addOrgCall, addSubOrgCall, approveAdminRoleCall,
    approveBlacklistedAccountRecoveryCall, approveBlacklistedNodeRecoveryCall,
    approveOrgCall, approveOrgStatusCall, assignAccountRoleCall, assignAdminRoleCall,
    removeRoleCall, startBlacklistedAccountRecoveryCall, startBlacklistedNodeRecoveryCall,
    updateAccountStatusCall, updateNodeStatusCall, updateOrgStatusCall,
};
use std::sync::Arc;

/// The permission control API of a node.
#[derive(Clone, Debug)]
pub struct PermissionService<C = PermissionContracts> {
    config: Arc<PermissionConfig>,
    cache: Arc<PermissionCache>,
    contracts: C,
}

impl<C: PermissionChain> PermissionService<C> {
    pub fn new(config: Arc<PermissionConfig>, cache: Arc<PermissionCache>, contracts: C) -> Self {
        Self { config, cache, contracts }
    }

    pub fn config(&self) -> &PermissionConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }

    pub fn contracts(&self) -> &C {
        &self.contracts
    }

    /// Validates and submits `action` on behalf of `from`.
    pub async fn execute(&self, from: Address, action: PermAction) -> ExecStatus {
        let res = self.try_execute(from, &action).await;
        if let Err(err) = &res {
            if err.is_validation() {
                debug!(action = action.name(), %from, %err, "permission action rejected");
            } else {
                error!(action = action.name(), %from, %err, "failed to execute permission action");
            }
        }
        res.into()
    }

    /// Like [`execute`](Self::execute), returning the transaction hash.
    pub async fn try_execute(&self, from: Address, action: &PermAction) -> Result<TxHash> {
        self.refresh(from, action).await?;

        let pending = if action.needs_pending_op() {
            self.contracts.pending_op(&self.config.nw_admin_org).await?
        } else {
            PendingOp::none()
        };
        Validator::new(&self.cache, &self.config).validate(from, action, &pending)?;

        let hash = self.contracts.submit(Some(from), interface_call(action)).await?;
        info!(action = action.name(), %from, tx = %hash, "executed permission action");
        Ok(hash)
    }

    /// Reloads the records `action` is validated against if the caches evicted entries.
    async fn refresh(&self, from: Address, action: &PermAction) -> Result<()> {
        use PermAction::*;
        let (contracts, cache) = (&self.contracts, &*self.cache);

        contracts.account(cache, from).await?;
        let (org_id, url, account, role_id) = match action {
            AddOrg { org_id, url, account } | ApproveOrg { org_id, url, account } => {
                (org_id, Some(url), Some(*account), None)
            }
            AddSubOrg { parent_org_id, org_id, url } => {
                contracts.org(cache, &format!("{parent_org_id}.{org_id}")).await?;
                (parent_org_id, Some(url), None, None)
            }
            UpdateOrgStatus { org_id, .. } | ApproveOrgStatus { org_id, .. } => {
                (org_id, None, None, None)
            }
            AddNode { org_id, url }
            | UpdateNodeStatus { org_id, url, .. }
            | StartBlacklistedNodeRecovery { org_id, url }
            | ApproveBlacklistedNodeRecovery { org_id, url } => (org_id, Some(url), None, None),
            AssignAdminRole { org_id, account, .. }
            | ApproveAdminRole { org_id, account }
            | UpdateAccountStatus { org_id, account, .. }
            | StartBlacklistedAccountRecovery { org_id, account }
            | ApproveBlacklistedAccountRecovery { org_id, account } => {
                (org_id, None, Some(*account), None)
            }
            AddNewRole { org_id, role_id, .. } | RemoveRole { org_id, role_id } => {
                (org_id, None, None, Some(role_id))
            }
            AssignAccountRole { org_id, account, role_id } => {
                (org_id, None, Some(*account), Some(role_id))
            }
        };

        if let Some(org) = contracts.org(cache, org_id).await?
            && org.ultimate_parent != org.full_org_id
        {
            contracts.org(cache, &org.ultimate_parent).await?;
        }
        if let Some(url) = url.filter(|url| !url.is_empty()) {
            contracts.node_by_url(cache, url).await?;
        }
        if let Some(account) = account {
            contracts.account(cache, account).await?;
        }
        if let Some(role_id) = role_id {
            contracts.role(cache, org_id, role_id).await?;
        }
        Ok(())
    }

    // === queries ===

    pub fn org_list(&self) -> Vec<OrgInfo> {
        self.cache.org_list()
    }

    pub fn node_list(&self) -> Vec<NodeInfo> {
        self.cache.node_list()
    }

    pub fn role_list(&self) -> Vec<RoleInfo> {
        self.cache.role_list()
    }

    pub fn acct_list(&self) -> Vec<AccountInfo> {
        self.cache.account_list()
    }

    /// Nodes, roles, accounts and sub orgs of `org_id`.
    pub async fn org_details(&self, org_id: &str) -> Result<OrgDetailInfo> {
        let org = self
            .contracts
            .org(&self.cache, org_id)
            .await?
            .ok_or(PermissionError::OrgDoesNotExist)?;
        Ok(org_details(&self.cache, &org))
    }
}

/// The interface contract call submitting `action`.
pub fn interface_call(action: &PermAction) -> InterfaceCall {
    use PermAction::*;
    match action.clone() {
        AddOrg { org_id, url, account } => {
            InterfaceCall::new(&addOrgCall { _orgId: org_id, _enodeId: url, _account: account })
        }
        ApproveOrg { org_id, url, account } => InterfaceCall::new(&approveOrgCall {
            _orgId: org_id,
            _enodeId: url,
            _account: account,
        }),
        AddSubOrg { parent_org_id, org_id, url } => InterfaceCall::new(&addSubOrgCall {
            _pOrgId: parent_org_id,
            _orgId: org_id,
            _enodeId: url,
        }),
        UpdateOrgStatus { org_id, action } => InterfaceCall::new(&updateOrgStatusCall {
            _orgId: org_id,
            _action: U256::from(action),
        }),
        ApproveOrgStatus { org_id, action } => InterfaceCall::new(&approveOrgStatusCall {
            _orgId: org_id,
            _action: U256::from(action),
        }),
        AddNode { org_id, url } => InterfaceCall::new(&addNodeCall { _orgId: org_id, _enodeId: url }),
        UpdateNodeStatus { org_id, url, action } => InterfaceCall::new(&updateNodeStatusCall {
            _orgId: org_id,
            _enodeId: url,
            _action: U256::from(action),
        }),
        StartBlacklistedNodeRecovery { org_id, url } => {
            InterfaceCall::new(&startBlacklistedNodeRecoveryCall { _orgId: org_id, _enodeId: url })
        }
        ApproveBlacklistedNodeRecovery { org_id, url } => {
            InterfaceCall::new(&approveBlacklistedNodeRecoveryCall { _orgId: org_id, _enodeId: url })
        }
        AssignAdminRole { org_id, account, role_id } => InterfaceCall::new(&assignAdminRoleCall {
            _orgId: org_id,
            _account: account,
            _roleId: role_id,
        }),
        ApproveAdminRole { org_id, account } => {
            InterfaceCall::new(&approveAdminRoleCall { _orgId: org_id, _account: account })
        }
        AddNewRole { org_id, role_id, access, is_voter, is_admin } => {
            InterfaceCall::new(&addNewRoleCall {
                _roleId: role_id,
                _orgId: org_id,
                _access: U256::from(u8::from(access)),
                _voter: is_voter,
                _admin: is_admin,
            })
        }
        RemoveRole { org_id, role_id } => {
            InterfaceCall::new(&removeRoleCall { _roleId: role_id, _orgId: org_id })
        }
        AssignAccountRole { org_id, account, role_id } => {
            InterfaceCall::new(&assignAccountRoleCall {
                _account: account,
                _orgId: org_id,
                _roleId: role_id,
            })
        }
        UpdateAccountStatus { org_id, account, action } => {
            InterfaceCall::new(&updateAccountStatusCall {
                _orgId: org_id,
                _account: account,
                _action: U256::from(action),
            })
        }
        StartBlacklistedAccountRecovery { org_id, account } => {
            InterfaceCall::new(&startBlacklistedAccountRecoveryCall {
                _orgId: org_id,
                _account: account,
            })
        }
        ApproveBlacklistedAccountRecovery { org_id, account } => {
            InterfaceCall::new(&approveBlacklistedAccountRecoveryCall {
                _orgId: org_id,
                _account: account,
            })
        }
    }
}

/// Collects what the cache holds about `org`.
pub fn org_details(cache: &PermissionCache, org: &OrgInfo) -> OrgDetailInfo {
    OrgDetailInfo {
        node_list: cache.nodes_for_org(&org.full_org_id),
        role_list: cache.roles_for_org(&org.full_org_id),
        acct_list: cache.accounts_for_org(&org.full_org_id),
        sub_org_list: org.sub_org_list.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AccessType, AccountStatus, CacheSizes, NodeStatus, OrgStatus, PendingOpType,
        PermissionModel,
        testing::{ChainState, MemoryChain},
    };
    use permission_test_utils::{NODE_ID_1, NODE_ID_2, PERMISSION_CONFIG, enode_url};

    const NEW: Address = Address::repeat_byte(0x42);

    fn admin_account(acct_id: Address) -> AccountInfo {
        AccountInfo {
            org_id: "ADMINORG".to_string(),
            role_id: "ADMIN".to_string(),
            acct_id,
            is_org_admin: true,
            status: AccountStatus::Active,
        }
    }

    /// A booted network with the configured admin in `ADMINORG`.
    fn service(sizes: CacheSizes, chain: MemoryChain) -> (PermissionService<MemoryChain>, Address) {
        let config = PermissionConfig::from_json(PERMISSION_CONFIG).unwrap();
        let admin = config.accounts[0];
        let cache = PermissionCache::new(sizes);
        cache.set_defaults(&config.nw_admin_role, &config.org_admin_role, PermissionModel::V1);
        cache.set_qip714_reached();
        cache.set_network_boot_completed();
        cache.upsert_org("ADMINORG", "", "ADMINORG", U256::from(1), OrgStatus::Approved);
        cache.upsert_node("ADMINORG", &enode_url(NODE_ID_1, 21000), NodeStatus::Approved);
        cache.upsert_account(admin_account(admin));
        (PermissionService::new(Arc::new(config), Arc::new(cache), chain), admin)
    }

    fn add_org(org_id: &str) -> PermAction {
        PermAction::AddOrg { org_id: org_id.to_string(), url: enode_url(NODE_ID_2, 21001), account: NEW }
    }

    #[test]
    fn collects_org_details() {
        let cache = PermissionCache::default();
        cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Approved);
        cache.upsert_org("SUB1", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
        cache.upsert_node("ORG1", &enode_url(NODE_ID_1, 21000), NodeStatus::Approved);
        cache.upsert_node("ORG1.SUB1", &enode_url(NODE_ID_2, 21001), NodeStatus::Approved);
        cache.upsert_role(RoleInfo {
            org_id: "ORG1".to_string(),
            role_id: "TXN".to_string(),
            is_voter: false,
            is_admin: false,
            access: AccessType::Transact,
            active: true,
        });
        cache.upsert_account(AccountInfo {
            org_id: "ORG1.SUB1".to_string(),
            role_id: "TXN".to_string(),
            acct_id: Address::repeat_byte(1),
            is_org_admin: false,
            status: AccountStatus::Active,
        });

        let org = cache.get_org("ORG1").unwrap();
        let details = org_details(&cache, &org);
        assert_eq!(details.node_list.len(), 1);
        assert_eq!(details.role_list[0].role_id, "TXN");
        assert!(details.acct_list.is_empty());
        assert_eq!(details.sub_org_list, ["ORG1.SUB1"]);

        let sub = cache.get_org("ORG1.SUB1").unwrap();
        let details = org_details(&cache, &sub);
        assert_eq!(details.node_list[0].url, enode_url(NODE_ID_2, 21001));
        assert_eq!(details.acct_list.len(), 1);
        assert!(details.sub_org_list.is_empty());
    }

    #[tokio::test]
    async fn submits_valid_actions_from_sender() {
        let (service, admin) = service(CacheSizes::default(), MemoryChain::default());

        let status = service.execute(admin, add_org("ORG1")).await;
        assert_eq!(status, ExecStatus::success());

        let sent = service.contracts().state().sent.clone();
        assert_eq!(sent.len(), 1);
        let (from, call) = &sent[0];
        assert_eq!(*from, Some(admin));
        assert_eq!(call.signature, "addOrg(string,string,address)");
        assert_eq!(*call, interface_call(&add_org("ORG1")));
    }

    #[tokio::test]
    async fn rejected_actions_are_not_submitted() {
        let (service, admin) = service(CacheSizes::default(), MemoryChain::default());

        let status = service.execute(admin, add_org("ORG 1")).await;
        assert!(!status.status);
        assert_eq!(status.msg, PermissionError::InvalidOrgName.to_string());

        let status = service.execute(NEW, add_org("ORG1")).await;
        assert_eq!(status, ExecStatus::failure(PermissionError::NotNetworkAdmin.to_string()));

        assert!(service.contracts().sent().is_empty());
    }

    #[tokio::test]
    async fn pending_op_blocks_new_orgs() {
        let chain = MemoryChain::new(ChainState {
            pending: Some(PendingOp {
                org_id: "ORG9".to_string(),
                enode_id: String::new(),
                account: Address::repeat_byte(9),
                op_type: PendingOpType::OrgAdd,
            }),
            ..Default::default()
        });
        let (service, admin) = service(CacheSizes::default(), chain);

        let err = service.try_execute(admin, &add_org("ORG1")).await.unwrap_err();
        assert!(matches!(err, PermissionError::PendingApprovals), "{err:?}");
        assert!(service.contracts().sent().is_empty());
    }

    #[tokio::test]
    async fn evicted_sender_is_reloaded_before_validation() {
        let config = PermissionConfig::from_json(PERMISSION_CONFIG).unwrap();
        let admin = config.accounts[0];
        let chain = MemoryChain::new(ChainState {
            booted: true,
            accounts: vec![admin_account(admin)],
            ..Default::default()
        });
        let sizes = CacheSizes { accounts: 1, ..Default::default() };
        let (service, _) = service(sizes, chain);

        // pushes the admin out of the account cache
        let mut other = admin_account(Address::repeat_byte(7));
        other.role_id = "TXN".to_string();
        service.cache().upsert_account(other);
        assert!(service.cache().get_account(admin).is_none());

        service.try_execute(admin, &add_org("ORG1")).await.unwrap();

        assert!(service.contracts().lookups().contains(&format!("account {admin}")));
        assert_eq!(service.contracts().sent(), ["addOrg(string,string,address)"]);
        assert!(service.cache().get_account(admin).is_some());
    }
}
