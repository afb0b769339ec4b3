use crate::{config::PermctlConfig, opts::NodeOpts};
use alloy_network::{ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolValue;
use clap::Parser;
use eyre::{OptionExt, Result, WrapErr};
use permission::{
    PERMISSION_CONFIG,
    provider::{ProviderBuilder, parse_private_key},
};
use permission_bindgen::ContractArtifact;
use permission_bindings::PermissionsUpgradable;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Contracts taking the upgradable contract as their only constructor argument, in deployment
/// order, with the config key of their address.
const MANAGERS: &[(&str, &str)] = &[
    ("OrgManager", "orgMgrAddress"),
    ("RoleManager", "roleMgrAddress"),
    ("AccountManager", "accountMgrAddress"),
    ("VoterManager", "voterMgrAddress"),
    ("NodeManager", "nodeMgrAddress"),
    ("PermissionsImplementation", "implAddress"),
    ("PermissionsInterface", "interfaceAddress"),
];

/// CLI arguments for `permctl deploy`.
#[derive(Clone, Debug, Parser)]
pub struct DeployArgs {
    /// Directory of the compiled contract artifacts.
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// The guardian of the upgradable contract, defaults to the deployer.
    #[arg(long)]
    pub guardian: Option<Address>,

    /// Write the addresses into `permission-config.json` of the data directory.
    #[arg(long)]
    pub write_config: bool,
}

/// Addresses of a deployed contract set, keyed like `permission-config.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deployment(pub Vec<(&'static str, Address)>);

impl Deployment {
    /// Sets the addresses in the JSON object `config`.
    pub fn apply(&self, config: &mut Map<String, Value>) {
        for (key, address) in &self.0 {
            config.insert(key.to_string(), Value::String(address.to_string()));
        }
    }

    fn address(&self, key: &str) -> Option<Address> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, address)| *address)
    }
}

impl DeployArgs {
    pub async fn run(self, node: &NodeOpts) -> Result<()> {
        let config = node.load_config()?;
        let key = config.private_key.as_deref().ok_or_eyre("deploying requires --private-key")?;
        let builder = ProviderBuilder::new(&config.rpc_url).signer(parse_private_key(key)?);
        let deployer = builder.sender().ok_or_eyre("no deployer account")?;
        let provider = builder.build()?;

        let artifacts = self.artifacts.as_deref().unwrap_or(config.artifacts.as_path());
        let guardian = self.guardian.unwrap_or(deployer);
        let deployment = deploy_all(&provider, artifacts, guardian).await?;

        let mut json = Map::new();
        deployment.apply(&mut json);
        println!("{}", serde_json::to_string_pretty(&json)?);

        if self.write_config {
            write_config(&config, &deployment)?;
        }
        Ok(())
    }
}

/// Deploys the upgradable contract, the managers, the implementation and the interface, then
/// links the implementation and interface through the upgradable contract.
async fn deploy_all(provider: &DynProvider, artifacts: &Path, guardian: Address) -> Result<Deployment> {
    let upgradable =
        deploy(provider, artifacts, "PermissionsUpgradable", guardian.abi_encode().into()).await?;
    let mut deployment = Deployment(vec![("upgrdableAddress", upgradable)]);

    for &(name, key) in MANAGERS {
        let address = deploy(provider, artifacts, name, upgradable.abi_encode().into()).await?;
        deployment.0.push((key, address));
    }

    let interface = deployment.address("interfaceAddress").ok_or_eyre("interface not deployed")?;
    let implementation =
        deployment.address("implAddress").ok_or_eyre("implementation not deployed")?;
    let receipt = PermissionsUpgradable::new(upgradable, provider)
        .init(interface, implementation)
        .send()
        .await?
        .get_receipt()
        .await?;
    eyre::ensure!(receipt.status(), "init of the upgradable contract reverted");
    info!(%upgradable, %interface, %implementation, "linked permission contracts");

    Ok(deployment)
}

/// Deploys the artifact `name` with the ABI encoded constructor `args`.
async fn deploy(provider: &DynProvider, artifacts: &Path, name: &str, args: Bytes) -> Result<Address> {
    let artifact = ContractArtifact::from_path(artifacts.join(format!("{name}.json")))?;
    let (_, bytecode) = artifact.validate()?;
    let bytecode = bytecode.ok_or_eyre(format!("artifact {name} has no bytecode"))?;

    let code = [&bytecode[..], &args[..]].concat();
    let tx = TransactionRequest::default().with_deploy_code(code);
    let receipt = provider
        .send_transaction(tx)
        .await
        .wrap_err_with(|| format!("failed to deploy {name}"))?
        .get_receipt()
        .await?;
    eyre::ensure!(receipt.status(), "deployment of {name} reverted");

    let address = receipt.contract_address().ok_or_eyre(format!("no address for {name}"))?;
    debug!(name, %address, tx = %receipt.transaction_hash(), "deployed contract");
    Ok(address)
}

/// Merges the deployed addresses into `permission-config.json`, creating it if needed.
fn write_config(config: &PermctlConfig, deployment: &Deployment) -> Result<()> {
    let path = config.data_dir.join(PERMISSION_CONFIG);
    let mut json = match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str(&content)? {
            Value::Object(map) => map,
            _ => eyre::bail!("{} is not a JSON object", path.display()),
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
        Err(err) => return Err(err).wrap_err_with(|| format!("failed to read {}", path.display())),
    };
    deployment.apply(&mut json);
    std::fs::write(&path, serde_json::to_string_pretty(&json)?)?;
    println!("Updated {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_addresses_into_config() {
        let mut json: Map<String, Value> =
            serde_json::from_str(permission_test_utils::PERMISSION_CONFIG).unwrap();
        let deployment = Deployment(vec![
            ("upgrdableAddress", Address::repeat_byte(1)),
            ("interfaceAddress", Address::repeat_byte(2)),
        ]);
        deployment.apply(&mut json);

        assert_eq!(json["interfaceAddress"], Address::repeat_byte(2).to_string());
        assert_eq!(json["nwAdminOrg"], "ADMINORG");
        assert_eq!(deployment.address("upgrdableAddress"), Some(Address::repeat_byte(1)));
        assert_eq!(deployment.address("orgMgrAddress"), None);

        let config = permission::PermissionConfig::from_json(&Value::Object(json).to_string())
            .unwrap();
        assert_eq!(config.interface_address, Address::repeat_byte(2));
        assert_eq!(config.upgradable_address, Address::repeat_byte(1));
    }
}
