//! Keeps the cached model and the node files in sync with the contract events.

use crate::{
    AccessType, AccountInfo, AccountStatus, NodeFiles, NodeOperation, NodeStatus, OrgStatus,
    PermissionCache, PermissionChain, PermissionContracts, RoleInfo, error::Result,
};
use alloy_contract::Event;
use alloy_provider::DynProvider;
use alloy_sol_types::SolEvent;
use futures::stream::{self, BoxStream, StreamExt};
use permission_bindings::{AccountManager, NodeManager, OrgManager, RoleManager};
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};

/// How often the network boot status is polled by default.
pub const DEFAULT_BOOT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
pub enum AccountEvent {
    AccessModified(AccountManager::AccountAccessModified),
    AccessRevoked(AccountManager::AccountAccessRevoked),
    StatusChanged(AccountManager::AccountStatusChanged),
}

#[derive(Clone, Debug)]
pub enum RoleEvent {
    Created(RoleManager::RoleCreated),
    Revoked(RoleManager::RoleRevoked),
}

#[derive(Clone, Debug)]
pub enum OrgEvent {
    PendingApproval(OrgManager::OrgPendingApproval),
    Approved(OrgManager::OrgApproved),
    Suspended(OrgManager::OrgSuspended),
    SuspensionRevoked(OrgManager::OrgSuspensionRevoked),
}

#[derive(Clone, Debug)]
pub enum NodeEvent {
    Proposed(NodeManager::NodeProposed),
    Approved(NodeManager::NodeApproved),
    Deactivated(NodeManager::NodeDeactivated),
    Activated(NodeManager::NodeActivated),
    Blacklisted(NodeManager::NodeBlacklisted),
    RecoveryInitiated(NodeManager::NodeRecoveryInitiated),
    RecoveryCompleted(NodeManager::NodeRecoveryCompleted),
}

impl NodeEvent {
    /// The org, the node URL and the status the node ends up in.
    fn parts(&self) -> (&str, &str, NodeStatus) {
        let (org_id, url, status) = match self {
            Self::Proposed(e) => (&e._orgId, &e._enodeId, NodeStatus::PendingApproval),
            Self::Approved(e) => (&e._orgId, &e._enodeId, NodeStatus::Approved),
            Self::Deactivated(e) => (&e._orgId, &e._enodeId, NodeStatus::Deactivated),
            Self::Activated(e) => (&e._orgId, &e._enodeId, NodeStatus::Approved),
            Self::Blacklisted(e) => (&e._orgId, &e._enodeId, NodeStatus::Blacklisted),
            Self::RecoveryInitiated(e) => (&e._orgId, &e._enodeId, NodeStatus::RecoveryInitiated),
            Self::RecoveryCompleted(e) => (&e._orgId, &e._enodeId, NodeStatus::Approved),
        };
        (org_id.as_str(), url.as_str(), status)
    }

    /// Changes to `permissioned-nodes.json` and `disallowed-nodes.json`.
    fn file_updates(&self) -> (Option<NodeOperation>, Option<NodeOperation>) {
        match self {
            Self::Approved(_) | Self::Activated(_) => (Some(NodeOperation::Add), None),
            Self::Deactivated(_) => (Some(NodeOperation::Delete), None),
            Self::Blacklisted(_) => (Some(NodeOperation::Delete), Some(NodeOperation::Add)),
            Self::RecoveryCompleted(_) => (Some(NodeOperation::Add), Some(NodeOperation::Delete)),
            Self::Proposed(_) | Self::RecoveryInitiated(_) => (None, None),
        }
    }
}

pub fn apply_account_event(cache: &PermissionCache, event: AccountEvent) -> Result<()> {
    match event {
        AccountEvent::AccessModified(e) => cache.upsert_account(AccountInfo {
            org_id: e._orgId,
            role_id: e._roleId,
            acct_id: e._address,
            is_org_admin: e._orgAdmin,
            status: AccountStatus::try_from(e._status)?,
        }),
        AccountEvent::AccessRevoked(e) => cache.upsert_account(AccountInfo {
            org_id: e._orgId,
            role_id: e._roleId,
            acct_id: e._address,
            is_org_admin: e._orgAdmin,
            status: AccountStatus::Active,
        }),
        AccountEvent::StatusChanged(e) => {
            let Some(acct) = cache.get_account(e._address) else {
                debug!(account = %e._address, "status change for unknown account");
                return Ok(());
            };
            cache.upsert_account(AccountInfo {
                org_id: e._orgId,
                status: AccountStatus::try_from(e._status)?,
                ..acct
            });
        }
    }
    Ok(())
}

pub fn apply_role_event(cache: &PermissionCache, event: RoleEvent) -> Result<()> {
    match event {
        RoleEvent::Created(e) => cache.upsert_role(RoleInfo {
            org_id: e._orgId,
            role_id: e._roleId,
            is_voter: e._isVoter,
            is_admin: e._isAdmin,
            access: AccessType::try_from(e._baseAccess)?,
            active: true,
        }),
        RoleEvent::Revoked(e) => match cache.get_role(&e._orgId, &e._roleId) {
            Some(role) => cache.upsert_role(RoleInfo { active: false, ..role }),
            None => debug!(org = %e._orgId, role = %e._roleId, "revoked role not in cache"),
        },
    }
    Ok(())
}

pub fn apply_org_event(cache: &PermissionCache, event: OrgEvent) -> Result<()> {
    match event {
        OrgEvent::PendingApproval(e) => cache.upsert_org(
            &e._orgId,
            &e._porgId,
            &e._ultParent,
            e._level,
            OrgStatus::try_from(e._status)?,
        ),
        OrgEvent::Approved(e) => {
            cache.upsert_org(&e._orgId, &e._porgId, &e._ultParent, e._level, OrgStatus::Approved)
        }
        OrgEvent::Suspended(e) => {
            cache.upsert_org(&e._orgId, &e._porgId, &e._ultParent, e._level, OrgStatus::Suspended)
        }
        OrgEvent::SuspensionRevoked(e) => {
            cache.upsert_org(&e._orgId, &e._porgId, &e._ultParent, e._level, OrgStatus::Approved)
        }
    }
    Ok(())
}

/// Applies a node event to the cache and, if given, the node files.
pub fn apply_node_event(cache: &PermissionCache, files: Option<&NodeFiles>, event: NodeEvent) {
    let (org_id, url, status) = event.parts();
    cache.upsert_node(org_id, url, status);

    let Some(files) = files else { return };
    let (permissioned, disallowed) = event.file_updates();
    if let Some(op) = permissioned {
        if let Err(err) = files.update_permissioned(url, op) {
            error!(%err, %url, "error updating permissioned-nodes.json");
        }
    }
    if let Some(op) = disallowed {
        if let Err(err) = files.update_disallowed(url, op) {
            error!(%err, %url, "error updating disallowed-nodes.json");
        }
    }
}

/// The running event monitors.
#[derive(Debug)]
pub struct Monitors {
    stop: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Monitors {
    /// Spawns one watcher per manager contract plus the network boot monitor.
    pub fn spawn(
        contracts: PermissionContracts,
        cache: Arc<PermissionCache>,
        files: Option<NodeFiles>,
        boot_poll_interval: Duration,
    ) -> Self {
        let (stop, _) = watch::channel(false);
        let stop_boot = stop.subscribe();
        let tasks = vec![
            tokio::spawn(report(
                "account",
                watch_accounts(contracts.clone(), cache.clone(), stop.subscribe()),
            )),
            tokio::spawn(report(
                "role",
                watch_roles(contracts.clone(), cache.clone(), stop.subscribe()),
            )),
            tokio::spawn(report(
                "org",
                watch_orgs(contracts.clone(), cache.clone(), stop.subscribe()),
            )),
            tokio::spawn(report(
                "node",
                watch_nodes(contracts.clone(), cache.clone(), files, stop.subscribe()),
            )),
            tokio::spawn(report("network boot", async move {
                watch_network_boot(contracts, cache, boot_poll_interval, stop_boot).await.map(drop)
            })),
        ];
        Self { stop, tasks }
    }

    /// A receiver that observes the stop signal.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stop.subscribe()
    }

    /// Signals every monitor to stop and waits for them.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        for task in self.tasks {
            if let Err(err) = task.await {
                error!(%err, "monitor task panicked");
            }
        }
    }
}

async fn report(name: &'static str, fut: impl Future<Output = Result<()>>) {
    match fut.await {
        Ok(()) => debug!(monitor = name, "monitor stopped"),
        Err(err) => error!(monitor = name, %err, "monitor failed"),
    }
}

/// Watches `filter` from block 1, mapping each decoded event with `wrap`.
async fn event_stream<E, T>(
    filter: Event<&DynProvider, E>,
    wrap: fn(E) -> T,
) -> Result<BoxStream<'static, alloy_sol_types::Result<T>>>
where
    E: SolEvent + Send + 'static,
    T: Send + 'static,
{
    let poller = filter.from_block(1u64).watch().await.map_err(alloy_contract::Error::from)?;
    trace!(event = E::SIGNATURE, "watching");
    Ok(poller.into_stream().map(move |res| res.map(|(event, _)| wrap(event))).boxed())
}

/// Feeds events into `apply` until the stream ends or `stop` fires.
async fn forward<T>(
    mut events: BoxStream<'static, alloy_sol_types::Result<T>>,
    mut stop: watch::Receiver<bool>,
    mut apply: impl FnMut(T) -> Result<()>,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = stop.changed() => return Ok(()),
            event = events.next() => match event {
                Some(Ok(event)) => {
                    if let Err(err) = apply(event) {
                        warn!(%err, "failed to apply event");
                    }
                }
                Some(Err(err)) => warn!(%err, "failed to decode event"),
                None => return Ok(()),
            },
        }
    }
}

async fn watch_accounts(
    contracts: PermissionContracts,
    cache: Arc<PermissionCache>,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let c = &contracts.account;
    let events = stream::select_all([
        event_stream(c.AccountAccessModified_filter(), AccountEvent::AccessModified).await?,
        event_stream(c.AccountAccessRevoked_filter(), AccountEvent::AccessRevoked).await?,
        event_stream(c.AccountStatusChanged_filter(), AccountEvent::StatusChanged).await?,
    ])
    .boxed();
    forward(events, stop, |event| apply_account_event(&cache, event)).await
}

async fn watch_roles(
    contracts: PermissionContracts,
    cache: Arc<PermissionCache>,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let c = &contracts.role;
    let events = stream::select_all([
        event_stream(c.RoleCreated_filter(), RoleEvent::Created).await?,
        event_stream(c.RoleRevoked_filter(), RoleEvent::Revoked).await?,
    ])
    .boxed();
    forward(events, stop, |event| apply_role_event(&cache, event)).await
}

async fn watch_orgs(
    contracts: PermissionContracts,
    cache: Arc<PermissionCache>,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let c = &contracts.org;
    let events = stream::select_all([
        event_stream(c.OrgPendingApproval_filter(), OrgEvent::PendingApproval).await?,
        event_stream(c.OrgApproved_filter(), OrgEvent::Approved).await?,
        event_stream(c.OrgSuspended_filter(), OrgEvent::Suspended).await?,
        event_stream(c.OrgSuspensionRevoked_filter(), OrgEvent::SuspensionRevoked).await?,
    ])
    .boxed();
    forward(events, stop, |event| apply_org_event(&cache, event)).await
}

async fn watch_nodes(
    contracts: PermissionContracts,
    cache: Arc<PermissionCache>,
    files: Option<NodeFiles>,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let c = &contracts.node;
    let events = stream::select_all([
        event_stream(c.NodeProposed_filter(), NodeEvent::Proposed).await?,
        event_stream(c.NodeApproved_filter(), NodeEvent::Approved).await?,
        event_stream(c.NodeDeactivated_filter(), NodeEvent::Deactivated).await?,
        event_stream(c.NodeActivated_filter(), NodeEvent::Activated).await?,
        event_stream(c.NodeBlacklisted_filter(), NodeEvent::Blacklisted).await?,
        event_stream(c.NodeRecoveryInitiated_filter(), NodeEvent::RecoveryInitiated).await?,
        event_stream(c.NodeRecoveryCompleted_filter(), NodeEvent::RecoveryCompleted).await?,
    ])
    .boxed();
    forward(events, stop, |event| {
        apply_node_event(&cache, files.as_ref(), event);
        Ok(())
    })
    .await
}

/// Polls the network boot status until it is set, then marks the boot completed in `cache`.
///
/// Returns `false` if stopped first.
pub async fn watch_network_boot<C: PermissionChain>(
    contracts: C,
    cache: Arc<PermissionCache>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> Result<bool> {
    loop {
        if contracts.network_boot_status().await? {
            cache.set_network_boot_completed();
            info!("network boot completed");
            return Ok(true);
        }
        tokio::select! {
            _ = stop.changed() => return Ok(false),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
