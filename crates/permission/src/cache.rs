//! LRU caches of the permission model.

use crate::{
    AccessType, AccountInfo, NodeInfo, NodeStatus, OrgInfo, OrgStatus, PermissionModel, RoleInfo,
};
use alloy_primitives::{Address, U256};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use std::{hash::Hash, num::NonZeroUsize};

pub const DEFAULT_ORG_CACHE_SIZE: usize = 4000;
pub const DEFAULT_ROLE_CACHE_SIZE: usize = 2500;
pub const DEFAULT_NODE_CACHE_SIZE: usize = 1000;
pub const DEFAULT_ACCOUNT_CACHE_SIZE: usize = 6000;

/// Capacities of the four caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheSizes {
    pub orgs: usize,
    pub roles: usize,
    pub nodes: usize,
    pub accounts: usize,
}

impl Default for CacheSizes {
    fn default() -> Self {
        Self {
            orgs: DEFAULT_ORG_CACHE_SIZE,
            roles: DEFAULT_ROLE_CACHE_SIZE,
            nodes: DEFAULT_NODE_CACHE_SIZE,
            accounts: DEFAULT_ACCOUNT_CACHE_SIZE,
        }
    }
}

/// An LRU map that remembers whether it ever dropped an entry.
struct Entries<K: Hash + Eq, V> {
    lru: LruCache<K, V>,
    evicted: bool,
}

impl<K: Hash + Eq + Clone, V: Clone> Entries<K, V> {
    fn new(cap: usize) -> Self {
        let cap = NonZeroUsize::new(cap).unwrap_or(NonZeroUsize::MIN);
        Self { lru: LruCache::new(cap), evicted: false }
    }

    fn put(&mut self, key: K, value: V) {
        if let Some((old, _)) = self.lru.push(key.clone(), value) {
            if old != key {
                self.evicted = true;
            }
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.lru.get(key).cloned()
    }

    /// Values from the least to the most recently used.
    fn values(&self) -> impl Iterator<Item = &V> {
        self.lru.iter().rev().map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct NodeKey {
    org_id: String,
    url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RoleKey {
    org_id: String,
    role_id: String,
}

/// Switches that decide the default access.
#[derive(Clone, Debug, Default)]
struct AccessState {
    model: PermissionModel,
    network_admin_role: String,
    org_admin_role: String,
    qip714_reached: bool,
    network_boot_completed: bool,
}

impl AccessState {
    fn permissions_enabled(&self) -> bool {
        match self.model {
            PermissionModel::V2 => self.qip714_reached,
            PermissionModel::V1 => self.qip714_reached && self.network_boot_completed,
        }
    }
}

/// The cached permission model: orgs, nodes, roles and accounts.
pub struct PermissionCache {
    orgs: Mutex<Entries<String, OrgInfo>>,
    nodes: Mutex<Entries<NodeKey, NodeInfo>>,
    roles: Mutex<Entries<RoleKey, RoleInfo>>,
    accounts: Mutex<Entries<Address, AccountInfo>>,
    state: RwLock<AccessState>,
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new(CacheSizes::default())
    }
}

impl std::fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCache")
            .field("orgs", &self.orgs.lock().lru.len())
            .field("nodes", &self.nodes.lock().lru.len())
            .field("roles", &self.roles.lock().lru.len())
            .field("accounts", &self.accounts.lock().lru.len())
            .field("state", &*self.state.read())
            .finish()
    }
}

impl PermissionCache {
    pub fn new(sizes: CacheSizes) -> Self {
        Self {
            orgs: Mutex::new(Entries::new(sizes.orgs)),
            nodes: Mutex::new(Entries::new(sizes.nodes)),
            roles: Mutex::new(Entries::new(sizes.roles)),
            accounts: Mutex::new(Entries::new(sizes.accounts)),
            state: Default::default(),
        }
    }

    // === access state ===

    pub fn set_defaults(
        &self,
        network_admin_role: impl Into<String>,
        org_admin_role: impl Into<String>,
        model: PermissionModel,
    ) {
        let mut state = self.state.write();
        state.network_admin_role = network_admin_role.into();
        state.org_admin_role = org_admin_role.into();
        state.model = model;
    }

    pub fn set_qip714_reached(&self) {
        self.state.write().qip714_reached = true;
    }

    pub fn set_network_boot_completed(&self) {
        self.state.write().network_boot_completed = true;
    }

    pub fn network_boot_completed(&self) -> bool {
        self.state.read().network_boot_completed
    }

    /// Permissions are enforced once QIP714 is reached and, for v1, the network has booted.
    pub fn permissions_enabled(&self) -> bool {
        self.state.read().permissions_enabled()
    }

    /// Access of accounts without an active role.
    pub fn default_access(&self) -> AccessType {
        if self.permissions_enabled() { AccessType::ReadOnly } else { AccessType::FullAccess }
    }

    pub fn model(&self) -> PermissionModel {
        self.state.read().model
    }

    pub fn network_admin_role(&self) -> String {
        self.state.read().network_admin_role.clone()
    }

    pub fn org_admin_role(&self) -> String {
        self.state.read().org_admin_role.clone()
    }

    /// Returns `true` if `role` is the network or org admin role.
    pub fn is_admin_role(&self, role: &str) -> bool {
        let state = self.state.read();
        role == state.network_admin_role || role == state.org_admin_role
    }

    // === orgs ===

    /// Inserts an org, keyed `<parent>.<org>` for sub orgs, and links it to its parent.
    pub fn upsert_org(
        &self,
        org_id: &str,
        parent_org_id: &str,
        ultimate_parent: &str,
        level: U256,
        status: OrgStatus,
    ) {
        let full_org_id = full_org_id(org_id, parent_org_id);
        let mut orgs = self.orgs.lock();

        if !parent_org_id.is_empty() {
            if let Some(parent) = orgs.lru.get_mut(parent_org_id) {
                if !parent.sub_org_list.contains(&full_org_id) {
                    parent.sub_org_list.push(full_org_id.clone());
                }
            }
        }

        // Status updates keep the sub orgs already linked to the org.
        let sub_org_list =
            orgs.lru.peek(&full_org_id).map(|org| org.sub_org_list.clone()).unwrap_or_default();

        let org = OrgInfo {
            org_id: org_id.to_string(),
            full_org_id: full_org_id.clone(),
            parent_org_id: parent_org_id.to_string(),
            ultimate_parent: ultimate_parent.to_string(),
            level,
            sub_org_list,
            status,
        };
        orgs.put(full_org_id, org);
    }

    /// Inserts a complete org record as is, sub org list included.
    pub fn upsert_org_with_sub_orgs(&self, mut org: OrgInfo) {
        org.full_org_id = full_org_id(&org.org_id, &org.parent_org_id);
        self.orgs.lock().put(org.full_org_id.clone(), org);
    }

    /// Looks up an org by its full id.
    pub fn get_org(&self, full_org_id: &str) -> Option<OrgInfo> {
        self.orgs.lock().get(&full_org_id.to_string())
    }

    pub fn org_list(&self) -> Vec<OrgInfo> {
        self.orgs.lock().values().cloned().collect()
    }

    pub fn orgs_evicted(&self) -> bool {
        self.orgs.lock().evicted
    }

    // === nodes ===

    pub fn upsert_node(&self, org_id: &str, url: &str, status: NodeStatus) {
        let key = NodeKey { org_id: org_id.to_string(), url: url.to_string() };
        let node = NodeInfo { org_id: org_id.to_string(), url: url.to_string(), status };
        self.nodes.lock().put(key, node);
    }

    pub fn get_node_by_url(&self, url: &str) -> Option<NodeInfo> {
        self.nodes.lock().values().find(|node| node.url == url).cloned()
    }

    pub fn node_list(&self) -> Vec<NodeInfo> {
        self.nodes.lock().values().cloned().collect()
    }

    pub fn nodes_for_org(&self, org_id: &str) -> Vec<NodeInfo> {
        self.nodes.lock().values().filter(|node| node.org_id == org_id).cloned().collect()
    }

    pub fn nodes_evicted(&self) -> bool {
        self.nodes.lock().evicted
    }

    // === roles ===

    pub fn upsert_role(&self, role: RoleInfo) {
        let key = RoleKey { org_id: role.org_id.clone(), role_id: role.role_id.clone() };
        self.roles.lock().put(key, role);
    }

    pub fn get_role(&self, org_id: &str, role_id: &str) -> Option<RoleInfo> {
        let key = RoleKey { org_id: org_id.to_string(), role_id: role_id.to_string() };
        self.roles.lock().get(&key)
    }

    pub fn role_list(&self) -> Vec<RoleInfo> {
        self.roles.lock().values().cloned().collect()
    }

    pub fn roles_for_org(&self, org_id: &str) -> Vec<RoleInfo> {
        self.roles.lock().values().filter(|role| role.org_id == org_id).cloned().collect()
    }

    pub fn roles_evicted(&self) -> bool {
        self.roles.lock().evicted
    }

    // === accounts ===

    pub fn upsert_account(&self, account: AccountInfo) {
        self.accounts.lock().put(account.acct_id, account);
    }

    pub fn get_account(&self, account: Address) -> Option<AccountInfo> {
        self.accounts.lock().get(&account)
    }

    pub fn account_list(&self) -> Vec<AccountInfo> {
        self.accounts.lock().values().cloned().collect()
    }

    pub fn accounts_for_org(&self, org_id: &str) -> Vec<AccountInfo> {
        self.accounts.lock().values().filter(|acct| acct.org_id == org_id).cloned().collect()
    }

    /// Accounts holding `role_id` in `org_id` or in any org whose ultimate parent is `org_id`.
    pub fn accounts_for_role(&self, org_id: &str, role_id: &str) -> Vec<AccountInfo> {
        let holders: Vec<_> = self
            .accounts
            .lock()
            .values()
            .filter(|acct| acct.role_id == role_id)
            .cloned()
            .collect();

        holders
            .into_iter()
            .filter(|acct| {
                acct.org_id == org_id
                    || self.get_org(&acct.org_id).is_some_and(|org| org.ultimate_parent == org_id)
            })
            .collect()
    }

    pub fn accounts_evicted(&self) -> bool {
        self.accounts.lock().evicted
    }
}

/// Cache key of an org: the org id for master orgs, `<parent>.<org>` otherwise.
pub fn full_org_id(org_id: &str, parent_org_id: &str) -> String {
    if parent_org_id.is_empty() {
        org_id.to_string()
    } else {
        format!("{parent_org_id}.{org_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountStatus;

    fn account(byte: u8, org: &str, role: &str) -> AccountInfo {
        AccountInfo {
            org_id: org.to_string(),
            role_id: role.to_string(),
            acct_id: Address::repeat_byte(byte),
            is_org_admin: false,
            status: AccountStatus::Active,
        }
    }

    #[test]
    fn keys_sub_orgs_by_full_id() {
        let cache = PermissionCache::default();
        cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Approved);
        cache.upsert_org("SUB1", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
        cache.upsert_org("SUB1", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
        cache.upsert_org("SUB2", "ORG1.SUB1", "ORG1", U256::from(3), OrgStatus::PendingApproval);

        assert!(cache.get_org("SUB1").is_none());
        let sub = cache.get_org("ORG1.SUB1").unwrap();
        assert_eq!(sub.org_id, "SUB1");
        assert_eq!(sub.parent_org_id, "ORG1");
        assert_eq!(sub.sub_org_list, ["ORG1.SUB1.SUB2"]);

        let org = cache.get_org("ORG1").unwrap();
        assert_eq!(org.sub_org_list, ["ORG1.SUB1"]);
        assert!(org.is_master());

        // a status change keeps the linked sub orgs
        cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Suspended);
        let org = cache.get_org("ORG1").unwrap();
        assert_eq!(org.status, OrgStatus::Suspended);
        assert_eq!(org.sub_org_list, ["ORG1.SUB1"]);
    }

    #[test]
    fn upserts_full_org_record() {
        let cache = PermissionCache::default();
        cache.upsert_org_with_sub_orgs(OrgInfo {
            org_id: "SUB1".to_string(),
            full_org_id: String::new(),
            parent_org_id: "ORG1".to_string(),
            ultimate_parent: "ORG1".to_string(),
            level: U256::from(2),
            sub_org_list: vec!["ORG1.SUB1.SUB2".to_string()],
            status: OrgStatus::Approved,
        });
        let org = cache.get_org("ORG1.SUB1").unwrap();
        assert_eq!(org.full_org_id, "ORG1.SUB1");
        assert_eq!(org.sub_org_list.len(), 1);
    }

    #[test]
    fn flags_eviction() {
        let cache =
            PermissionCache::new(CacheSizes { orgs: 2, roles: 2, nodes: 2, accounts: 2 });
        cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Approved);
        cache.upsert_org("ORG2", "", "ORG2", U256::from(1), OrgStatus::Approved);
        cache.upsert_org("ORG2", "", "ORG2", U256::from(1), OrgStatus::Suspended);
        assert!(!cache.orgs_evicted());

        cache.upsert_org("ORG3", "", "ORG3", U256::from(1), OrgStatus::Approved);
        assert!(cache.orgs_evicted());
        assert!(cache.get_org("ORG1").is_none());
        assert_eq!(cache.org_list().len(), 2);

        for i in 1..=3 {
            cache.upsert_account(account(i, "ORG1", "TXN"));
        }
        assert!(cache.accounts_evicted());
        assert!(!cache.nodes_evicted());
        assert!(!cache.roles_evicted());
    }

    #[test]
    fn looks_up_nodes_and_roles() {
        let cache = PermissionCache::default();
        cache.upsert_node("ORG1", "enode://a@127.0.0.1:21000", NodeStatus::PendingApproval);
        cache.upsert_node("ORG2", "enode://b@127.0.0.1:21001", NodeStatus::Approved);
        cache.upsert_node("ORG1", "enode://a@127.0.0.1:21000", NodeStatus::Approved);

        assert_eq!(cache.node_list().len(), 2);
        assert_eq!(
            cache.get_node_by_url("enode://a@127.0.0.1:21000").unwrap().status,
            NodeStatus::Approved
        );
        assert!(cache.get_node_by_url("enode://c@127.0.0.1:21002").is_none());
        assert_eq!(cache.nodes_for_org("ORG2").len(), 1);

        cache.upsert_role(RoleInfo {
            org_id: "ORG1".to_string(),
            role_id: "TXN".to_string(),
            is_voter: false,
            is_admin: false,
            access: AccessType::Transact,
            active: true,
        });
        assert_eq!(cache.get_role("ORG1", "TXN").unwrap().access, AccessType::Transact);
        assert!(cache.get_role("ORG2", "TXN").is_none());
        assert_eq!(cache.roles_for_org("ORG1").len(), 1);
        assert_eq!(cache.role_list().len(), 1);
    }

    #[test]
    fn accounts_for_role_include_sub_orgs() {
        let cache = PermissionCache::default();
        cache.upsert_org("ORG1", "", "ORG1", U256::from(1), OrgStatus::Approved);
        cache.upsert_org("SUB1", "ORG1", "ORG1", U256::from(2), OrgStatus::Approved);
        cache.upsert_org("ORG2", "", "ORG2", U256::from(1), OrgStatus::Approved);

        cache.upsert_account(account(1, "ORG1", "TXN"));
        cache.upsert_account(account(2, "ORG1.SUB1", "TXN"));
        cache.upsert_account(account(3, "ORG2", "TXN"));
        cache.upsert_account(account(4, "ORG1", "READ"));

        let holders = cache.accounts_for_role("ORG1", "TXN");
        let mut addrs: Vec<_> = holders.iter().map(|a| a.acct_id).collect();
        addrs.sort();
        assert_eq!(addrs, [Address::repeat_byte(1), Address::repeat_byte(2)]);

        assert_eq!(cache.accounts_for_role("ORG1.SUB1", "TXN").len(), 1);
        assert_eq!(cache.accounts_for_org("ORG1").len(), 2);
        assert_eq!(cache.account_list().len(), 4);
    }

    #[test]
    fn default_access_follows_permission_state() {
        let cache = PermissionCache::default();
        cache.set_defaults("ADMIN", "ORGADMIN", PermissionModel::V1);
        assert_eq!(cache.default_access(), AccessType::FullAccess);

        cache.set_qip714_reached();
        assert!(!cache.permissions_enabled());
        cache.set_network_boot_completed();
        assert!(cache.permissions_enabled());
        assert_eq!(cache.default_access(), AccessType::ReadOnly);

        let v2 = PermissionCache::default();
        v2.set_defaults("ADMIN", "ORGADMIN", PermissionModel::V2);
        v2.set_qip714_reached();
        assert!(v2.permissions_enabled());
        assert!(v2.is_admin_role("ADMIN"));
        assert_eq!(v2.org_admin_role(), "ORGADMIN");
    }
}
