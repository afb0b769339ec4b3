//! Subcommands.

use crate::{config::PermctlConfig, opts::NodeOpts};
use alloy_primitives::Address;
use eyre::{OptionExt, Result, WrapErr};
use permission::{
    ExecStatus, NodeFiles, PermAction, PermissionCache, PermissionChain, PermissionConfig,
    PermissionContracts, PermissionService,
    provider::{ProviderBuilder, parse_private_key},
};
use serde::Serialize;
use std::sync::Arc;

pub mod action;
pub mod bind;
pub mod boot;
pub mod check_tx;
pub mod deploy;
pub mod query;
pub mod watch;

/// A connection to the permission contracts of a node.
pub struct Session {
    pub config: PermctlConfig,
    pub sender: Option<Address>,
    pub files: NodeFiles,
    pub service: PermissionService,
}

impl Session {
    /// Binds the contracts named by the node's `permission-config.json`.
    ///
    /// The cache starts empty, see [`Session::load`].
    pub fn connect(opts: &NodeOpts) -> Result<Self> {
        let config = opts.load_config()?;
        let permissions = PermissionConfig::load(&config.data_dir)
            .wrap_err_with(|| format!("failed to load {}", config.data_dir.display()))?;

        let signer = config.private_key.as_deref().map(parse_private_key).transpose()?;
        let builder = ProviderBuilder::new(&config.rpc_url).maybe_signer(signer);
        let sender = builder.sender();
        let contracts = PermissionContracts::new(&permissions, builder.build()?);

        let cache = PermissionCache::new(config.cache_sizes());
        cache.set_defaults(
            &permissions.nw_admin_role,
            &permissions.org_admin_role,
            permissions.permission_model,
        );
        let files = NodeFiles::new(&config.data_dir);
        let service = PermissionService::new(Arc::new(permissions), Arc::new(cache), contracts);
        Ok(Self { config, sender, files, service })
    }

    pub fn cache(&self) -> &Arc<PermissionCache> {
        self.service.cache()
    }

    pub fn contracts(&self) -> &PermissionContracts {
        self.service.contracts()
    }

    /// Loads the permission model from the contracts, enforcing it from now on.
    ///
    /// Fails if the network has not been booted yet.
    pub async fn load(&self) -> Result<()> {
        eyre::ensure!(
            self.contracts().network_boot_status().await?,
            "network is not booted yet, run `permctl boot` first"
        );
        self.contracts().populate(self.cache()).await?;
        self.cache().set_network_boot_completed();
        self.cache().set_qip714_reached();
        debug!(
            orgs = self.cache().org_list().len(),
            nodes = self.cache().node_list().len(),
            "loaded permission model"
        );
        Ok(())
    }

    /// The account signing the transactions.
    pub fn sender(&self) -> Result<Address> {
        self.sender.ok_or_eyre("no private key configured, pass --private-key")
    }

    /// Validates and submits `action`, failing if it was not executed.
    pub async fn execute(&self, action: PermAction) -> Result<ExecStatus> {
        let from = self.sender()?;
        self.load().await?;
        let status = self.service.execute(from, action).await;
        eyre::ensure!(status.status, "{}", status.msg);
        Ok(status)
    }
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
