//! Access decisions derived from the cached permission model.

use crate::{
    AccessType, AccountInfo, AccountStatus, NodeInfo, NodeStatus, OrgInfo, OrgStatus,
    PermissionCache, PermissionChain, PermissionError, PermissionModel, RoleInfo,
    TransactionType, enode, error::Result,
};
use alloy_primitives::Address;

impl AccessType {
    /// Returns `true` if this access lets an account send a transaction of type `tx`.
    ///
    /// Access types of the v2 model grant nothing under v1.
    pub fn allows(self, tx: TransactionType, model: PermissionModel) -> bool {
        use TransactionType::*;
        if !self.is_valid_for(model) {
            return false;
        }
        match self {
            Self::ReadOnly => false,
            Self::Transact => match model {
                PermissionModel::V1 => tx != ContractDeploy,
                PermissionModel::V2 => tx == ValueTransfer,
            },
            Self::ContractDeploy | Self::FullAccess => true,
            Self::ContractCall => tx == ContractCall,
            Self::TransactAndContractCall => tx != ContractDeploy,
            Self::TransactAndContractDeploy => tx != ContractCall,
            Self::ContractCallAndDeploy => tx != ValueTransfer,
        }
    }
}

/// The records the access of one account is decided on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountView {
    pub account: Option<AccountInfo>,
    pub org: Option<OrgInfo>,
    /// The ultimate parent of `org`.
    pub parent: Option<OrgInfo>,
    /// The active role of the account, in its org or else in the ultimate parent.
    pub role: Option<RoleInfo>,
}

impl AccountView {
    /// The account is active in an org that is not suspended, nor is its ultimate parent.
    fn is_active(&self) -> bool {
        let Some(acct) = &self.account else { return false };
        let Some(org) = &self.org else { return false };
        acct.status == AccountStatus::Active
            && org.status != OrgStatus::Suspended
            && self.parent.as_ref().is_none_or(|parent| parent.status != OrgStatus::Suspended)
    }
}

impl PermissionCache {
    /// An org is active unless it or its ultimate parent is suspended.
    pub fn is_org_active(&self, org_id: &str) -> bool {
        let Some(org) = self.get_org(org_id) else { return false };
        if org.status == OrgStatus::Suspended {
            return false;
        }
        self.get_org(&org.ultimate_parent).is_none_or(|parent| parent.status != OrgStatus::Suspended)
    }

    /// Gathers what the cache holds about `account`.
    pub fn account_view(&self, account: Address) -> AccountView {
        let Some(acct) = self.get_account(account) else { return AccountView::default() };
        let org = self.get_org(&acct.org_id);
        let parent = org.as_ref().and_then(|org| self.get_org(&org.ultimate_parent));
        let role = self.get_role(&acct.org_id, &acct.role_id).filter(|r| r.active).or_else(|| {
            let org = org.as_ref()?;
            self.get_role(&org.ultimate_parent, &acct.role_id).filter(|r| r.active)
        });
        AccountView { account: Some(acct), org, parent, role }
    }

    /// Access level granted by `view`.
    pub fn access_of(&self, view: &AccountView) -> AccessType {
        if !view.is_active() {
            return self.default_access();
        }
        if view.account.as_ref().is_some_and(|acct| self.is_admin_role(&acct.role_id)) {
            return AccessType::FullAccess;
        }
        view.role.as_ref().map(|role| role.access).unwrap_or_else(|| self.default_access())
    }

    /// Whether `view` is the one of an admin. Everyone is admin until permissions are
    /// enabled.
    pub fn is_admin_of(&self, view: &AccountView) -> bool {
        if !self.permissions_enabled() {
            return true;
        }
        if !view.is_active() {
            return false;
        }
        view.account.as_ref().is_some_and(|acct| self.is_admin_role(&acct.role_id))
            || view.role.as_ref().is_some_and(|role| role.is_admin)
    }

    /// Access level of `account`.
    pub fn account_access(&self, account: Address) -> AccessType {
        self.access_of(&self.account_view(account))
    }

    /// Returns `true` if `account` holds an admin role. Everyone is admin until permissions are
    /// enabled.
    pub fn is_admin_account(&self, account: Address) -> bool {
        self.is_admin_of(&self.account_view(account))
    }

    /// Checks that the node `node_id` may carry transactions of `from`: it must be an approved
    /// node of the same ultimate parent org.
    ///
    /// `None` stands for the local node and is always allowed.
    pub fn validate_node_for_txn(&self, node_id: Option<&str>, from: Address) -> bool {
        let Some(node_id) = node_id else { return true };
        if !self.permissions_enabled() {
            return true;
        }
        let Some(acct) = self.get_account(from) else { return true };
        let Some(acct_org) = self.get_org(&acct.org_id) else { return false };

        let node_id = node_id.to_lowercase();
        self.node_list().into_iter().any(|node| {
            carries(&node, &node_id)
                && self
                    .get_org(&node.org_id)
                    .is_some_and(|org| org.ultimate_parent == acct_org.ultimate_parent)
        })
    }

    /// Whether access level `access` lets `from` send a transaction of type `tx`.
    fn decide(&self, from: Address, access: AccessType, tx: TransactionType) -> Result<()> {
        if access.allows(tx, self.model()) {
            Ok(())
        } else {
            trace!(%from, %access, %tx, "transaction denied");
            Err(PermissionError::NoPermissionForTxn)
        }
    }

    /// Checks whether `from` may send a transaction of type `tx`.
    pub fn transaction_allowed(&self, from: Address, tx: TransactionType) -> Result<()> {
        if !self.permissions_enabled() {
            return Ok(());
        }
        self.decide(from, self.account_access(from), tx)
    }

    /// [`transaction_allowed`](Self::transaction_allowed) for a raw transaction.
    pub fn check_account_permission(
        &self,
        from: Address,
        to: Option<Address>,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.transaction_allowed(from, TransactionType::of(to, data))
    }

    /// Returns `true` if `url` belongs to an approved node.
    pub fn connection_allowed(&self, url: &str) -> bool {
        let Some(node_id) = enode::node_id(url) else {
            debug!(%url, "connection denied, invalid enode");
            return false;
        };
        self.node_list().iter().any(|node| carries(node, &node_id))
    }
}

/// `node` is approved and has the id `node_id`.
fn carries(node: &NodeInfo, node_id: &str) -> bool {
    node.status == NodeStatus::Approved && enode::node_id(&node.url).is_some_and(|id| id == node_id)
}

/// Access decisions that fetch the records a cache has evicted from the chain before
/// deciding.
///
/// Decides the same way as the [`PermissionCache`] methods of the same names.
#[derive(Debug)]
pub struct AccessResolver<'a, C> {
    cache: &'a PermissionCache,
    chain: &'a C,
}

impl<'a, C: PermissionChain> AccessResolver<'a, C> {
    pub fn new(cache: &'a PermissionCache, chain: &'a C) -> Self {
        Self { cache, chain }
    }

    /// Like [`PermissionCache::account_view`], falling back to the chain.
    pub async fn account_view(&self, account: Address) -> Result<AccountView> {
        let (cache, chain) = (self.cache, self.chain);
        let Some(acct) = chain.account(cache, account).await? else {
            return Ok(AccountView::default());
        };
        let org = chain.org(cache, &acct.org_id).await?;
        let parent = match &org {
            Some(org) if org.ultimate_parent != org.full_org_id => {
                chain.org(cache, &org.ultimate_parent).await?
            }
            _ => org.clone(),
        };
        let mut role = chain.role(cache, &acct.org_id, &acct.role_id).await?.filter(|r| r.active);
        if role.is_none()
            && let Some(org) = &org
        {
            role = chain.role(cache, &org.ultimate_parent, &acct.role_id).await?.filter(|r| r.active);
        }
        Ok(AccountView { account: Some(acct), org, parent, role })
    }

    pub async fn account_access(&self, account: Address) -> Result<AccessType> {
        Ok(self.cache.access_of(&self.account_view(account).await?))
    }

    pub async fn is_admin_account(&self, account: Address) -> Result<bool> {
        if !self.cache.permissions_enabled() {
            return Ok(true);
        }
        Ok(self.cache.is_admin_of(&self.account_view(account).await?))
    }

    pub async fn validate_node_for_txn(&self, node_id: Option<&str>, from: Address) -> Result<bool> {
        let Some(node_id) = node_id else { return Ok(true) };
        if !self.cache.permissions_enabled() {
            return Ok(true);
        }
        let (cache, chain) = (self.cache, self.chain);
        let Some(acct) = chain.account(cache, from).await? else { return Ok(true) };
        let Some(acct_org) = chain.org(cache, &acct.org_id).await? else { return Ok(false) };

        let node_id = node_id.to_lowercase();
        for node in chain.nodes(cache).await? {
            if !carries(&node, &node_id) {
                continue;
            }
            let org = chain.org(cache, &node.org_id).await?;
            if org.is_some_and(|org| org.ultimate_parent == acct_org.ultimate_parent) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub async fn transaction_allowed(&self, from: Address, tx: TransactionType) -> Result<()> {
        if !self.cache.permissions_enabled() {
            return Ok(());
        }
        let access = self.account_access(from).await?;
        self.cache.decide(from, access, tx)
    }

    pub async fn check_account_permission(
        &self,
        from: Address,
        to: Option<Address>,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.transaction_allowed(from, TransactionType::of(to, data)).await
    }

    pub async fn connection_allowed(&self, url: &str) -> Result<bool> {
        let Some(node_id) = enode::node_id(url) else {
            debug!(%url, "connection denied, invalid enode");
            return Ok(false);
        };
        Ok(self.chain.nodes(self.cache).await?.iter().any(|node| carries(node, &node_id)))
    }
}
