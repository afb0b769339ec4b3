use crate::config::PermctlConfig;
use clap::{Parser, ValueHint};
use eyre::Result;
use figment::{
    Metadata, Profile, Provider,
    providers::Serialized,
    value::{Dict, Map},
};
use serde::Serialize;
use std::path::PathBuf;

/// Connection and data directory flags shared by the commands.
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(next_help_heading = "Node options")]
pub struct NodeOpts {
    /// The JSON-RPC endpoint of the node.
    #[arg(short, long = "rpc-url", visible_alias = "url", value_name = "URL", global = true)]
    #[serde(rename = "rpc_url", skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// The private key signing the permission transactions.
    #[arg(long, value_name = "RAW_PRIVATE_KEY", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    /// The node data directory.
    #[arg(short, long, value_name = "PATH", value_hint = ValueHint::DirPath, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Provider for NodeOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("command line flags")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

impl NodeOpts {
    /// Loads the configuration with these flags layered on top.
    pub fn load_config(&self) -> Result<PermctlConfig> {
        PermctlConfig::from_provider(PermctlConfig::figment_with_root(".").merge(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn flags_override_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                crate::config::CONFIG_FILE,
                r#"
                rpc_url = "http://node1:22000"
                data_dir = "qdata/dd1"
            "#,
            )?;

            let opts = NodeOpts::default();
            let config = opts.load_config().unwrap();
            assert_eq!(config.rpc_url, "http://node1:22000");

            let opts = NodeOpts {
                rpc_url: Some("http://localhost:22002".to_string()),
                ..Default::default()
            };
            let config = opts.load_config().unwrap();
            assert_eq!(config.rpc_url, "http://localhost:22002");
            assert_eq!(config.data_dir, PathBuf::from("qdata/dd1"));
            assert_eq!(config.private_key, None);
            Ok(())
        });
    }
}
