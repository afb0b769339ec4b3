use super::{Session, print_json};
use crate::opts::NodeOpts;
use alloy_primitives::{Address, Bytes};
use clap::Parser;
use eyre::Result;
use permission::{
    AccessResolver, AccessType, PermissionCache, PermissionChain, PermissionError,
    TransactionType, enode,
};
use serde::Serialize;

/// CLI arguments for `permctl check-tx`.
#[derive(Clone, Debug, Parser)]
pub struct CheckTxArgs {
    /// The sender of the transaction.
    pub from: Address,

    /// The recipient, omitted for contract deployments.
    #[arg(long)]
    pub to: Option<Address>,

    /// The transaction payload.
    #[arg(long)]
    pub data: Option<Bytes>,

    /// Enode URL or id of the node the transaction is submitted to.
    #[arg(long)]
    pub node: Option<String>,
}

/// Permission decision for a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxCheck {
    pub tx_type: String,
    pub access: AccessType,
    pub allowed: bool,
    pub node_allowed: bool,
}

impl TxCheck {
    /// Decides on the transaction, fetching records `cache` has evicted from `chain`.
    async fn new(
        cache: &PermissionCache,
        chain: &impl PermissionChain,
        args: &CheckTxArgs,
    ) -> Result<Self, PermissionError> {
        let resolver = AccessResolver::new(cache, chain);
        let tx_type = TransactionType::of(args.to, args.data.as_ref().map(|data| &data[..]));
        let node_id = args
            .node
            .as_deref()
            .map(|node| enode::node_id(node).unwrap_or_else(|| node.to_lowercase()));
        let allowed = match resolver.transaction_allowed(args.from, tx_type).await {
            Ok(()) => true,
            Err(PermissionError::NoPermissionForTxn) => false,
            Err(err) => return Err(err),
        };
        Ok(Self {
            tx_type: tx_type.to_string(),
            access: resolver.account_access(args.from).await?,
            allowed,
            node_allowed: resolver.validate_node_for_txn(node_id.as_deref(), args.from).await?,
        })
    }
}

impl CheckTxArgs {
    /// Prints the decision, failing if the transaction would be rejected.
    pub async fn run(self, node: &NodeOpts) -> Result<()> {
        let session = Session::connect(node)?;
        session.load().await?;

        let check = TxCheck::new(session.cache(), session.contracts(), &self).await?;
        print_json(&check)?;
        eyre::ensure!(check.allowed, "{}", PermissionError::NoPermissionForTxn);
        eyre::ensure!(check.node_allowed, "transaction not allowed through node");
        Ok(())
    }
}
