use super::Session;
use crate::opts::NodeOpts;
use clap::Parser;
use eyre::Result;
use permission::{Monitors, PermissionChain};

/// CLI arguments for `permctl watch`.
#[derive(Clone, Debug, Parser)]
pub struct WatchArgs {
    /// Do not update the node files of the data directory.
    #[arg(long)]
    pub no_files: bool,
}

impl WatchArgs {
    /// Mirrors the permission events into the cache and node files until interrupted.
    pub async fn run(self, node: &NodeOpts) -> Result<()> {
        let session = Session::connect(node)?;
        let contracts = session.contracts();
        if contracts.network_boot_status().await? {
            session.load().await?;
        } else {
            info!("network not booted yet, waiting for the boot to complete");
        }

        let files = (!self.no_files).then(|| session.files.clone());
        let monitors = Monitors::spawn(
            contracts.clone(),
            session.cache().clone(),
            files,
            session.config.boot_poll_interval(),
        );
        println!("Watching permission events, press Ctrl-C to stop");

        tokio::signal::ctrl_c().await?;
        monitors.stop().await;

        let cache = session.cache();
        println!(
            "{} org(s), {} node(s), {} role(s), {} account(s)",
            cache.org_list().len(),
            cache.node_list().len(),
            cache.role_list().len(),
            cache.account_list().len()
        );
        Ok(())
    }
}
