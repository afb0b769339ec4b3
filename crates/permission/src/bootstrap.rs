//! Network boot-up: seeds the contracts on a fresh network, or loads the model of a running one.

use crate::{
    AccessType, AccountInfo, AccountStatus, InterfaceCall, NodeFiles, NodeStatus, OrgStatus,
    PermissionCache, PermissionChain, PermissionConfig, RoleInfo, error::Result,
};
use alloy_primitives::{Address, U256};
use permission_bindings::PermissionsInterface::{
    addAdminAccountCall, addAdminNodeCall, initCall, setPolicyCall, updateNetworkBootStatusCall,
};

/// What [`init_permissions`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootOutcome {
    /// The network was not booted yet and has been set up from the config.
    Booted,
    /// The network was already booted and the model was loaded from the contracts.
    Populated,
}

/// Brings `cache` in line with the contracts, booting the network first if needed.
///
/// Boot transactions are sent from the signer of the contracts' provider.
pub async fn init_permissions<C: PermissionChain>(
    config: &PermissionConfig,
    contracts: &C,
    cache: &PermissionCache,
    files: &NodeFiles,
) -> Result<BootOutcome> {
    cache.set_defaults(&config.nw_admin_role, &config.org_admin_role, config.permission_model);

    if contracts.network_boot_status().await? {
        contracts.populate(cache).await?;
        cache.set_network_boot_completed();
        return Ok(BootOutcome::Populated);
    }

    let nodes = files.permissioned_nodes()?;
    boot_network(config, contracts, cache, &nodes).await?;
    Ok(BootOutcome::Booted)
}

/// Sets the policy, registers `nodes` and the configured accounts as network admins and
/// marks the network as booted.
pub async fn boot_network<C: PermissionChain>(
    config: &PermissionConfig,
    contracts: &C,
    cache: &PermissionCache,
    nodes: &[String],
) -> Result<()> {
    info!(org = %config.nw_admin_org, nodes = nodes.len(), accounts = config.accounts.len(), "booting network");

    let policy = setPolicyCall {
        _nwAdminOrg: config.nw_admin_org.clone(),
        _nwAdminRole: config.nw_admin_role.clone(),
        _oAdminRole: config.org_admin_role.clone(),
    };
    contracts.submit(None, InterfaceCall::new(&policy)).await?;
    let init = initCall { _breadth: config.breadth(), _depth: config.depth() };
    contracts.submit(None, InterfaceCall::new(&init)).await?;
    cache_admin_org(cache, config);

    for url in nodes {
        let call = addAdminNodeCall { _enodeId: url.clone() };
        contracts.submit(None, InterfaceCall::new(&call)).await?;
        cache_admin_node(cache, config, url);
    }

    for &account in &config.accounts {
        contracts.submit(None, InterfaceCall::new(&addAdminAccountCall { _acct: account })).await?;
        cache_admin_account(cache, config, account);
    }

    contracts.submit(None, InterfaceCall::new(&updateNetworkBootStatusCall {})).await?;
    cache.set_network_boot_completed();
    info!("network boot completed");
    Ok(())
}

/// The network admin org and its admin role.
fn cache_admin_org(cache: &PermissionCache, config: &PermissionConfig) {
    cache.upsert_org(
        &config.nw_admin_org,
        "",
        &config.nw_admin_org,
        U256::from(1),
        OrgStatus::Approved,
    );
    cache.upsert_role(RoleInfo {
        org_id: config.nw_admin_org.clone(),
        role_id: config.nw_admin_role.clone(),
        is_voter: true,
        is_admin: true,
        access: AccessType::FullAccess,
        active: true,
    });
}

fn cache_admin_node(cache: &PermissionCache, config: &PermissionConfig, url: &str) {
    cache.upsert_node(&config.nw_admin_org, url, NodeStatus::Approved);
}

fn cache_admin_account(cache: &PermissionCache, config: &PermissionConfig, account: Address) {
    cache.upsert_account(AccountInfo {
        org_id: config.nw_admin_org.clone(),
        role_id: config.nw_admin_role.clone(),
        acct_id: account,
        is_org_admin: true,
        status: AccountStatus::Active,
    });
}
