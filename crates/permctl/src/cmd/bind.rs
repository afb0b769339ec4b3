//! `permctl bind`: binding generation.

use crate::config::PermctlConfig;
use clap::{Parser, Subcommand, ValueHint};
use eyre::Result;
use permission_bindgen::{ARTIFACTS_DIR, MultiSolMacroGen};
use std::path::PathBuf;

/// CLI arguments for `permctl bind`.
#[derive(Clone, Debug, Parser)]
pub struct BindArgs {
    #[command(subcommand)]
    pub cmd: BindSubcommand,

    /// Directory of the contract artifacts.
    #[arg(long, value_hint = ValueHint::DirPath, global = true)]
    pub artifacts: Option<PathBuf>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum BindSubcommand {
    /// Writes the bindings crate, or a bindings module with `--module`.
    Generate {
        /// Write a module directory instead of the crate sources.
        #[arg(long, value_hint = ValueHint::DirPath)]
        module: Option<PathBuf>,

        /// Artifacts location relative to the manifest of the crate including the module.
        #[arg(long, requires = "module", default_value = ARTIFACTS_DIR)]
        module_artifacts: String,
    },
    /// Fails if the bindings crate is out of date with the artifacts.
    Check,
    /// Prints the fully expanded bindings of a contract, or writes all of them to `--out`.
    Expand {
        contract: Option<String>,

        #[arg(long, short, value_hint = ValueHint::DirPath, required_unless_present = "contract")]
        out: Option<PathBuf>,
    },
}

impl BindArgs {
    pub fn run(self, config: &PermctlConfig) -> Result<()> {
        let artifacts = self.artifacts.as_deref().unwrap_or(config.artifacts.as_path());
        let mut bindings = MultiSolMacroGen::from_artifacts(artifacts)?;
        eyre::ensure!(
            !bindings.instances.is_empty(),
            "no artifacts found in {}",
            artifacts.display()
        );

        match self.cmd {
            BindSubcommand::Generate { module: Some(module), module_artifacts } => {
                bindings.write_to_module(&module, &module_artifacts)?;
                println!("Generated bindings module at {}", module.display());
            }
            BindSubcommand::Generate { module: None, .. } => {
                bindings.write_to_crate(&config.bindings)?;
                println!("Generated bindings crate at {}", config.bindings.display());
            }
            BindSubcommand::Check => {
                bindings.check_consistency(&config.bindings)?;
                println!("OK.");
            }
            BindSubcommand::Expand { contract: Some(name), out } => {
                let instance = bindings.instance_mut(&name)?;
                let source = instance.expanded_source()?;
                match out {
                    Some(out) => {
                        std::fs::create_dir_all(&out)?;
                        let path = out.join(format!("{}.rs", instance.artifact.module_name()));
                        std::fs::write(&path, source)?;
                        println!("{}", path.display());
                    }
                    None => print!("{source}"),
                }
            }
            BindSubcommand::Expand { contract: None, out } => {
                let out = out.unwrap_or_else(|| PathBuf::from("."));
                for path in bindings.write_expanded(&out)? {
                    println!("{}", path.display());
                }
            }
        }
        Ok(())
    }
}
