//! Reads the permission model off the contracts and submits transactions to them.

use crate::{
    AccessType, AccountInfo, AccountStatus, NodeInfo, NodeStatus, OrgInfo, OrgStatus,
    PendingOp, PendingOpType, PermissionCache, PermissionConfig, PermissionError, RoleInfo,
    cache::full_org_id, error::Result,
};
use alloy_contract::RawCallBuilder;
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::DynProvider;
use alloy_sol_types::SolCall;
use permission_bindings::{
    AccountManager::{self, AccountManagerInstance},
    NodeManager::{self, NodeManagerInstance},
    OrgManager::{self, OrgManagerInstance},
    PermissionsInterface::{self, PermissionsInterfaceInstance},
    RoleManager::{self, RoleManagerInstance},
};
use std::future::Future;

/// An ABI encoded call to the permissions interface contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceCall {
    pub signature: &'static str,
    pub input: Bytes,
}

impl InterfaceCall {
    pub fn new<C: SolCall>(call: &C) -> Self {
        Self { signature: C::SIGNATURE, input: call.abi_encode().into() }
    }
}

/// Access to the permission contracts of a network.
///
/// The provided methods read through a [`PermissionCache`] and only reach for the chain when
/// the cache has evicted entries, re-inserting what they fetch.
pub trait PermissionChain: Send + Sync {
    fn network_boot_status(&self) -> impl Future<Output = Result<bool>> + Send;

    /// The operation `org_id` is waiting on.
    fn pending_op(&self, org_id: &str) -> impl Future<Output = Result<PendingOp>> + Send;

    fn org_count(&self) -> impl Future<Output = Result<u64>> + Send;

    fn node_count(&self) -> impl Future<Output = Result<u64>> + Send;

    fn role_count(&self) -> impl Future<Output = Result<u64>> + Send;

    fn account_count(&self) -> impl Future<Output = Result<u64>> + Send;

    /// The org at `index`, without its sub orgs.
    fn org_at(&self, index: u64) -> impl Future<Output = Result<OrgInfo>> + Send;

    fn node_at(&self, index: u64) -> impl Future<Output = Result<NodeInfo>> + Send;

    fn role_at(&self, index: u64) -> impl Future<Output = Result<RoleInfo>> + Send;

    fn account_at(&self, index: u64) -> impl Future<Output = Result<AccountInfo>> + Send;

    fn node_details(&self, url: &str) -> impl Future<Output = Result<Option<NodeInfo>>> + Send;

    fn role_details(
        &self,
        org_id: &str,
        role_id: &str,
    ) -> impl Future<Output = Result<Option<RoleInfo>>> + Send;

    fn account_details(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<Option<AccountInfo>>> + Send;

    /// Sends `call` to the interface contract, from `from` or the provider's default account,
    /// and waits for a successful receipt.
    fn submit(
        &self,
        from: Option<Address>,
        call: InterfaceCall,
    ) -> impl Future<Output = Result<TxHash>> + Send;

    /// Fetches an org by its full id, sub orgs included.
    ///
    /// The org manager has no lookup by id, so this walks every org.
    fn org_details(&self, org_id: &str) -> impl Future<Output = Result<Option<OrgInfo>>> + Send {
        async move {
            let mut found = None;
            let mut sub_orgs = Vec::new();
            for index in 0..self.org_count().await? {
                let org = self.org_at(index).await?;
                if org.full_org_id == org_id {
                    found = Some(org);
                } else if org.parent_org_id == org_id {
                    sub_orgs.push(org.full_org_id);
                }
            }
            Ok(found.map(|org| OrgInfo { sub_org_list: sub_orgs, ..org }))
        }
    }

    /// Loads every org, node, role and account into `cache`.
    fn populate(&self, cache: &PermissionCache) -> impl Future<Output = Result<()>> + Send {
        async move {
            let orgs = self.org_count().await?;
            for index in 0..orgs {
                let org = self.org_at(index).await?;
                cache.upsert_org(
                    &org.org_id,
                    &org.parent_org_id,
                    &org.ultimate_parent,
                    org.level,
                    org.status,
                );
            }

            let nodes = self.node_count().await?;
            for index in 0..nodes {
                let node = self.node_at(index).await?;
                cache.upsert_node(&node.org_id, &node.url, node.status);
            }

            let roles = self.role_count().await?;
            for index in 0..roles {
                cache.upsert_role(self.role_at(index).await?);
            }

            let accounts = self.account_count().await?;
            for index in 0..accounts {
                cache.upsert_account(self.account_at(index).await?);
            }

            debug!(orgs, nodes, roles, accounts, "populated permission cache from contracts");
            Ok(())
        }
    }

    /// Looks up an org in `cache`, fetching it from the contracts on a miss after eviction.
    fn org(
        &self,
        cache: &PermissionCache,
        org_id: &str,
    ) -> impl Future<Output = Result<Option<OrgInfo>>> + Send {
        async move {
            if let Some(org) = cache.get_org(org_id) {
                return Ok(Some(org));
            }
            if !cache.orgs_evicted() {
                return Ok(None);
            }
            trace!(%org_id, "org evicted, fetching from contract");
            let org = self.org_details(org_id).await?;
            if let Some(org) = &org {
                cache.upsert_org_with_sub_orgs(org.clone());
            }
            Ok(org)
        }
    }

    fn node_by_url(
        &self,
        cache: &PermissionCache,
        url: &str,
    ) -> impl Future<Output = Result<Option<NodeInfo>>> + Send {
        async move {
            if let Some(node) = cache.get_node_by_url(url) {
                return Ok(Some(node));
            }
            if !cache.nodes_evicted() {
                return Ok(None);
            }
            let node = self.node_details(url).await?;
            if let Some(node) = &node {
                cache.upsert_node(&node.org_id, &node.url, node.status);
            }
            Ok(node)
        }
    }

    /// Nodes known to `cache`, or every node of the contracts once the cache evicted some.
    fn nodes(&self, cache: &PermissionCache) -> impl Future<Output = Result<Vec<NodeInfo>>> + Send {
        async move {
            if !cache.nodes_evicted() {
                return Ok(cache.node_list());
            }
            let mut nodes = Vec::new();
            for index in 0..self.node_count().await? {
                nodes.push(self.node_at(index).await?);
            }
            Ok(nodes)
        }
    }

    fn role(
        &self,
        cache: &PermissionCache,
        org_id: &str,
        role_id: &str,
    ) -> impl Future<Output = Result<Option<RoleInfo>>> + Send {
        async move {
            if let Some(role) = cache.get_role(org_id, role_id) {
                return Ok(Some(role));
            }
            if !cache.roles_evicted() {
                return Ok(None);
            }
            let role = self.role_details(org_id, role_id).await?;
            if let Some(role) = &role {
                cache.upsert_role(role.clone());
            }
            Ok(role)
        }
    }

    fn account(
        &self,
        cache: &PermissionCache,
        account: Address,
    ) -> impl Future<Output = Result<Option<AccountInfo>>> + Send {
        async move {
            if let Some(acct) = cache.get_account(account) {
                return Ok(Some(acct));
            }
            if !cache.accounts_evicted() {
                return Ok(None);
            }
            trace!(%account, "account evicted, fetching from contract");
            let acct = self.account_details(account).await?;
            if let Some(acct) = &acct {
                cache.upsert_account(acct.clone());
            }
            Ok(acct)
        }
    }
}

/// The permission contracts bound on one provider.
#[derive(Clone, Debug)]
pub struct PermissionContracts {
    pub interface: PermissionsInterfaceInstance<DynProvider>,
    pub org: OrgManagerInstance<DynProvider>,
    pub node: NodeManagerInstance<DynProvider>,
    pub role: RoleManagerInstance<DynProvider>,
    pub account: AccountManagerInstance<DynProvider>,
}

impl PermissionContracts {
    /// Binds the contracts at the addresses of `config`.
    pub fn new(config: &PermissionConfig, provider: DynProvider) -> Self {
        Self {
            interface: PermissionsInterface::new(config.interface_address, provider.clone()),
            org: OrgManager::new(config.org_address, provider.clone()),
            node: NodeManager::new(config.node_address, provider.clone()),
            role: RoleManager::new(config.role_address, provider.clone()),
            account: AccountManager::new(config.account_address, provider),
        }
    }

    pub fn provider(&self) -> &DynProvider {
        self.interface.provider()
    }
}

impl PermissionChain for PermissionContracts {
    async fn network_boot_status(&self) -> Result<bool> {
        Ok(self.interface.getNetworkBootStatus().call().await?)
    }

    async fn pending_op(&self, org_id: &str) -> Result<PendingOp> {
        let op = self.interface.getPendingOp(org_id.to_string()).call().await?;
        Ok(PendingOp {
            org_id: op._0,
            enode_id: op._1,
            account: op._2,
            op_type: PendingOpType::try_from(op._3)?,
        })
    }

    async fn org_count(&self) -> Result<u64> {
        count(self.org.getNumberOfOrgs().call().await?)
    }

    async fn node_count(&self) -> Result<u64> {
        count(self.node.getNumberOfNodes().call().await?)
    }

    async fn role_count(&self) -> Result<u64> {
        count(self.role.getNumberOfRoles().call().await?)
    }

    async fn account_count(&self) -> Result<u64> {
        count(self.account.getNumberOfAccounts().call().await?)
    }

    async fn org_at(&self, index: u64) -> Result<OrgInfo> {
        let org = self.org.getOrgInfo(U256::from(index)).call().await?;
        org_info(org._0, org._1, org._2, org._3, org._4)
    }

    async fn node_at(&self, index: u64) -> Result<NodeInfo> {
        let node = self.node.getNodeDetailsFromIndex(U256::from(index)).call().await?;
        Ok(NodeInfo {
            org_id: node._orgId,
            url: node._enodeId,
            status: NodeStatus::try_from(node._nodeStatus)?,
        })
    }

    async fn role_at(&self, index: u64) -> Result<RoleInfo> {
        let role = self.role.getRoleDetailsFromIndex(U256::from(index)).call().await?;
        Ok(RoleInfo {
            org_id: role.orgId,
            role_id: role.roleId,
            is_voter: role.voter,
            is_admin: role.admin,
            access: AccessType::try_from(role.accessType)?,
            active: role.active,
        })
    }

    async fn account_at(&self, index: u64) -> Result<AccountInfo> {
        let acct = self.account.getAccountDetailsFromIndex(U256::from(index)).call().await?;
        Ok(AccountInfo {
            acct_id: acct._0,
            org_id: acct._1,
            role_id: acct._2,
            status: AccountStatus::try_from(acct._3)?,
            is_org_admin: acct._4,
        })
    }

    async fn node_details(&self, url: &str) -> Result<Option<NodeInfo>> {
        let node = self.node.getNodeDetails(url.to_string()).call().await?;
        if node._nodeStatus.is_zero() {
            return Ok(None);
        }
        Ok(Some(NodeInfo {
            org_id: node._orgId,
            url: node._enodeId,
            status: NodeStatus::try_from(node._nodeStatus)?,
        }))
    }

    async fn role_details(&self, org_id: &str, role_id: &str) -> Result<Option<RoleInfo>> {
        let role =
            self.role.getRoleDetails(role_id.to_string(), org_id.to_string()).call().await?;
        if role.orgId.is_empty() {
            return Ok(None);
        }
        Ok(Some(RoleInfo {
            org_id: role.orgId,
            role_id: role.roleId,
            is_voter: role.voter,
            is_admin: role.admin,
            access: AccessType::try_from(role.accessType)?,
            active: role.active,
        }))
    }

    async fn account_details(&self, account: Address) -> Result<Option<AccountInfo>> {
        let acct = self.account.getAccountDetails(account).call().await?;
        if acct._3.is_zero() {
            return Ok(None);
        }
        Ok(Some(AccountInfo {
            acct_id: acct._0,
            org_id: acct._1,
            role_id: acct._2,
            status: AccountStatus::try_from(acct._3)?,
            is_org_admin: acct._4,
        }))
    }

    async fn submit(&self, from: Option<Address>, call: InterfaceCall) -> Result<TxHash> {
        let provider = self.provider().clone();
        let mut builder =
            RawCallBuilder::<_, Ethereum>::new_raw(provider, call.input).to(*self.interface.address());
        if let Some(from) = from {
            builder = builder.from(from);
        }
        let receipt = builder.send().await?.get_receipt().await?;
        let hash = receipt.transaction_hash();
        if !receipt.status() {
            return Err(PermissionError::Reverted(hash));
        }
        debug!(tx = %hash, call = call.signature, "transaction mined");
        Ok(hash)
    }
}

fn count(n: U256) -> Result<u64> {
    u64::try_from(n).map_err(|_| PermissionError::UnknownValue { kind: "count", value: n })
}

/// Builds an org record from the `getOrgInfo` outputs, keyed by its full id.
fn org_info(
    org_id: String,
    parent_org_id: String,
    ultimate_parent: String,
    level: U256,
    status: U256,
) -> Result<OrgInfo> {
    Ok(OrgInfo {
        full_org_id: full_org_id(&org_id, &parent_org_id),
        org_id,
        parent_org_id,
        ultimate_parent,
        level,
        sub_org_list: Vec::new(),
        status: OrgStatus::try_from(status)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_org_info() {
        let org = org_info(
            "SUB1".to_string(),
            "ORG1".to_string(),
            "ORG1".to_string(),
            U256::from(2),
            U256::from(1),
        )
        .unwrap();
        assert_eq!(org.full_org_id, "ORG1.SUB1");
        assert_eq!(org.status, OrgStatus::PendingApproval);
        assert!(!org.is_master());

        let err = org_info(String::new(), String::new(), String::new(), U256::ZERO, U256::from(7))
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown OrgStatus value 7");
    }

    #[test]
    fn counts_fit_u64() {
        assert_eq!(count(U256::from(12)).unwrap(), 12);
        assert!(count(U256::MAX).is_err());
    }
}
