use super::Session;
use crate::opts::NodeOpts;
use eyre::Result;
use permission::{BootOutcome, init_permissions};

/// `permctl boot`: boots the network from the node's config, or loads a booted one.
pub async fn run(node: &NodeOpts) -> Result<()> {
    let session = Session::connect(node)?;
    if session.sender.is_none() {
        warn!("no private key configured, boot transactions can only be sent by an unlocked node account");
    }

    let outcome = init_permissions(
        session.service.config(),
        session.contracts(),
        session.cache(),
        &session.files,
    )
    .await?;

    let cache = session.cache();
    match outcome {
        BootOutcome::Booted => println!(
            "Network booted with {} admin node(s) and {} admin account(s)",
            cache.node_list().len(),
            cache.account_list().len()
        ),
        BootOutcome::Populated => println!(
            "Network already booted: {} org(s), {} node(s), {} role(s), {} account(s)",
            cache.org_list().len(),
            cache.node_list().len(),
            cache.role_list().len(),
            cache.account_list().len()
        ),
    }
    Ok(())
}
