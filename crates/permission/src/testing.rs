//! An in-memory [`PermissionChain`] that records what is read and sent.

use crate::{
    AccountInfo, InterfaceCall, NodeInfo, OrgInfo, PendingOp, PermissionChain, PermissionError,
    RoleInfo, error::Result,
};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use parking_lot::{Mutex, MutexGuard};
use permission_bindings::PermissionsInterface;

/// Contents of a [`MemoryChain`].
#[derive(Clone, Debug, Default)]
pub struct ChainState {
    pub booted: bool,
    /// Reported for any org.
    pub pending: Option<PendingOp>,
    pub orgs: Vec<OrgInfo>,
    pub nodes: Vec<NodeInfo>,
    pub roles: Vec<RoleInfo>,
    pub accounts: Vec<AccountInfo>,
    /// Records looked up by key, e.g. `account 0x..` or `node enode://..`.
    pub lookups: Vec<String>,
    /// Transactions sent, with their sender.
    pub sent: Vec<(Option<Address>, InterfaceCall)>,
}

/// Contracts held in memory.
///
/// Sending `updateNetworkBootStatus()` marks the network as booted, other calls are only
/// recorded.
#[derive(Debug, Default)]
pub struct MemoryChain {
    state: Mutex<ChainState>,
}

impl MemoryChain {
    pub fn new(state: ChainState) -> Self {
        Self { state: Mutex::new(state) }
    }

    pub fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock()
    }

    /// Signatures of the calls sent so far.
    pub fn sent(&self) -> Vec<&'static str> {
        self.state.lock().sent.iter().map(|(_, call)| call.signature).collect()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.state.lock().lookups.clone()
    }

    fn at<T: Clone>(items: &[T], kind: &'static str, index: u64) -> Result<T> {
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or(PermissionError::UnknownValue { kind, value: U256::from(index) })
    }
}

impl PermissionChain for MemoryChain {
    async fn network_boot_status(&self) -> Result<bool> {
        Ok(self.state.lock().booted)
    }

    async fn pending_op(&self, _org_id: &str) -> Result<PendingOp> {
        Ok(self.state.lock().pending.clone().unwrap_or_else(PendingOp::none))
    }

    async fn org_count(&self) -> Result<u64> {
        let mut state = self.state.lock();
        state.lookups.push("orgs".to_string());
        Ok(state.orgs.len() as u64)
    }

    async fn node_count(&self) -> Result<u64> {
        Ok(self.state.lock().nodes.len() as u64)
    }

    async fn role_count(&self) -> Result<u64> {
        Ok(self.state.lock().roles.len() as u64)
    }

    async fn account_count(&self) -> Result<u64> {
        Ok(self.state.lock().accounts.len() as u64)
    }

    async fn org_at(&self, index: u64) -> Result<OrgInfo> {
        let org = Self::at(&self.state.lock().orgs, "org index", index)?;
        Ok(OrgInfo { sub_org_list: Vec::new(), ..org })
    }

    async fn node_at(&self, index: u64) -> Result<NodeInfo> {
        Self::at(&self.state.lock().nodes, "node index", index)
    }

    async fn role_at(&self, index: u64) -> Result<RoleInfo> {
        Self::at(&self.state.lock().roles, "role index", index)
    }

    async fn account_at(&self, index: u64) -> Result<AccountInfo> {
        Self::at(&self.state.lock().accounts, "account index", index)
    }

    async fn node_details(&self, url: &str) -> Result<Option<NodeInfo>> {
        let mut state = self.state.lock();
        state.lookups.push(format!("node {url}"));
        Ok(state.nodes.iter().find(|node| node.url == url).cloned())
    }

    async fn role_details(&self, org_id: &str, role_id: &str) -> Result<Option<RoleInfo>> {
        let mut state = self.state.lock();
        state.lookups.push(format!("role {org_id}/{role_id}"));
        Ok(state.roles.iter().find(|r| r.org_id == org_id && r.role_id == role_id).cloned())
    }

    async fn account_details(&self, account: Address) -> Result<Option<AccountInfo>> {
        let mut state = self.state.lock();
        state.lookups.push(format!("account {account}"));
        Ok(state.accounts.iter().find(|acct| acct.acct_id == account).cloned())
    }

    async fn submit(&self, from: Option<Address>, call: InterfaceCall) -> Result<TxHash> {
        let mut state = self.state.lock();
        if call.signature == PermissionsInterface::updateNetworkBootStatusCall::SIGNATURE {
            state.booted = true;
        }
        state.sent.push((from, call));
        Ok(TxHash::with_last_byte(state.sent.len() as u8))
    }
}
