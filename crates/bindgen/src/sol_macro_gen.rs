//! SolMacroGen and MultiSolMacroGen
//!
//! [`SolMacroGen`] renders the `sol!` invocation that binds one contract artifact, and can
//! expand it into the full Rust token stream using `alloy_sol_macro_expander`.
//!
//! [`MultiSolMacroGen`] drives a whole artifacts directory: it writes the binding modules and
//! the crate root, and checks that committed bindings are up to date with the artifacts.

use crate::artifact::{ContractArtifact, json_artifacts};
use alloy_sol_macro_expander::expand::expand;
use alloy_sol_macro_input::{SolInput, SolInputKind, tokens_for_sol};
use eyre::{OptionExt, Result, WrapErr};
use proc_macro2::{Ident, Span, TokenStream};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Marker placed at the top of every generated file.
pub const GENERATED_HEADER: &str = "//! Code generated by permission-bindgen - DO NOT EDIT.";

/// Directory of the artifacts, relative to the bindings crate root.
pub const ARTIFACTS_DIR: &str = "artifacts";

pub struct SolMacroGen {
    pub artifact: ContractArtifact,
    pub expansion: Option<TokenStream>,
}

impl SolMacroGen {
    pub fn new(artifact: ContractArtifact) -> Self {
        Self { artifact, expansion: None }
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    /// Renders the module binding this contract, referring to the artifact at
    /// `<artifacts_dir>/<Name>.json`.
    pub fn render_module(&self, artifacts_dir: &str) -> String {
        let name = self.name();
        let artifact = format!("{artifacts_dir}/{}", self.artifact.file_name());
        format!(
            r#"{GENERATED_HEADER}
//!
//! Bindings for the `{name}` contract, expanded by `sol!` from `{artifact}`.

alloy_sol_types::sol!(
    #[derive(Debug)]
    #[sol(rpc, abi)]
    {name},
    "{artifact}"
);
"#
        )
    }

    /// Expands the `sol!` input of this contract into Rust tokens.
    pub fn expand(&mut self) -> Result<&TokenStream> {
        let (mut json_abi, maybe_bytecode) = self.artifact.read()?;

        json_abi.dedup();
        let sol_str = json_abi.to_sol(self.name(), None);

        let ident_name = Ident::new(self.name(), Span::call_site());

        let tokens = tokens_for_sol(&ident_name, &sol_str)
            .map_err(|e| eyre::eyre!("Failed to get sol tokens: {e}"))?;

        let tokens = if let Some(bytecode) = maybe_bytecode {
            let bytecode = proc_macro2::Literal::string(&bytecode);
            quote::quote! {
                #[derive(Debug)]
                #[sol(rpc, abi, bytecode = #bytecode)]
                #tokens
            }
        } else {
            quote::quote! {
                #[derive(Debug)]
                #[sol(rpc, abi)]
                #tokens
            }
        };

        let input: SolInput =
            syn::parse2(tokens).map_err(|e| eyre::eyre!("Failed to parse SolInput: {e}"))?;

        let SolInput { attrs: _attrs, path: _path, kind } = input;

        let tokens = match kind {
            SolInputKind::Sol(file) => {
                expand(file).map_err(|e| eyre::eyre!("Failed to expand SolInput: {e}"))?
            }
            _ => eyre::bail!("unexpected sol! input kind for {}", self.name()),
        };

        Ok(&*self.expansion.insert(tokens))
    }

    /// Returns the pretty printed expansion, expanding first if needed.
    pub fn expanded_source(&mut self) -> Result<String> {
        let tokens = match self.expansion.take() {
            Some(tokens) => tokens,
            None => self.expand()?.clone(),
        };
        let file = syn::parse2::<syn::File>(tokens.clone())
            .wrap_err_with(|| format!("Failed to parse expansion of {}", self.name()))?;
        self.expansion = Some(tokens);
        Ok(format!("{GENERATED_HEADER}\n\n{}", prettyplease::unparse(&file)))
    }
}

pub struct MultiSolMacroGen {
    pub artifacts_path: PathBuf,
    pub instances: Vec<SolMacroGen>,
}

impl MultiSolMacroGen {
    pub fn new(artifacts_path: &Path, instances: Vec<SolMacroGen>) -> Self {
        Self { artifacts_path: artifacts_path.to_path_buf(), instances }
    }

    /// Collects every artifact found in `artifacts_path`.
    pub fn from_artifacts(artifacts_path: &Path) -> Result<Self> {
        let instances = json_artifacts(artifacts_path)?.into_iter().map(SolMacroGen::new).collect();
        Ok(Self::new(artifacts_path, instances))
    }

    /// Parses every artifact, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        for instance in &self.instances {
            let (abi, bytecode) = instance.artifact.validate()?;
            trace!(
                name = instance.name(),
                functions = abi.functions.len(),
                events = abi.events.len(),
                has_bytecode = bytecode.is_some(),
                "validated artifact"
            );
        }
        Ok(())
    }

    /// Renders the crate root (or `mod.rs`) declaring every binding module.
    pub fn render_root(&self) -> String {
        let mut contents = format!(
            "{GENERATED_HEADER}
//!
//! `sol!` bindings for the network permissioning contracts.

#![allow(clippy::all, rustdoc::all)]

"
        );
        for instance in &self.instances {
            contents += &format!("pub mod {};\n", instance.artifact.module_name());
        }
        contents.push('\n');
        for instance in &self.instances {
            contents +=
                &format!("pub use {}::{};\n", instance.artifact.module_name(), instance.name());
        }
        contents += "\n/// Names of the bound contracts.\npub const CONTRACTS: &[&str] = &[\n";
        for instance in &self.instances {
            contents += &format!("    \"{}\",\n", instance.name());
        }
        contents += "];\n";
        contents
    }

    /// All files of a bindings crate: `(relative path, contents)`.
    fn crate_files(&self) -> Vec<(PathBuf, String)> {
        let mut files = vec![(PathBuf::from("src/lib.rs"), self.render_root())];
        for instance in &self.instances {
            files.push((
                PathBuf::from(format!("src/{}.rs", instance.artifact.module_name())),
                instance.render_module(ARTIFACTS_DIR),
            ));
        }
        files
    }

    /// Writes the bindings into the crate at `crate_path`.
    ///
    /// Artifacts are copied into `<crate>/artifacts` unless they already live there.
    pub fn write_to_crate(&self, crate_path: &Path) -> Result<()> {
        self.validate()?;

        let artifacts = crate_path.join(ARTIFACTS_DIR);
        fs::create_dir_all(crate_path.join("src"))?;
        fs::create_dir_all(&artifacts)?;

        if !same_dir(&artifacts, &self.artifacts_path) {
            for instance in &self.instances {
                let dest = artifacts.join(instance.artifact.file_name());
                fs::copy(&instance.artifact.path, &dest).wrap_err_with(|| {
                    format!("Failed to copy {}", instance.artifact.path.display())
                })?;
            }
        }

        for (path, contents) in self.crate_files() {
            let path = crate_path.join(path);
            fs::write(&path, contents)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            debug!(path = %path.display(), "wrote binding");
        }
        Ok(())
    }

    /// Writes the bindings as a module directory with a `mod.rs`.
    ///
    /// `artifacts_dir` is the artifacts location relative to the manifest of the crate
    /// that will include the module.
    pub fn write_to_module(&self, module_path: &Path, artifacts_dir: &str) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(module_path)?;

        for instance in &self.instances {
            let path = module_path.join(format!("{}.rs", instance.artifact.module_name()));
            fs::write(&path, instance.render_module(artifacts_dir))
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        }
        let mod_path = module_path.join("mod.rs");
        fs::write(&mod_path, self.render_root())
            .wrap_err_with(|| format!("Failed to write {}", mod_path.display()))?;
        Ok(())
    }

    /// Writes the fully expanded bindings, one file per contract, into `out`.
    pub fn write_expanded(&mut self, out: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out)?;
        let mut written = Vec::with_capacity(self.instances.len());
        for instance in &mut self.instances {
            let path = out.join(format!("{}.rs", instance.artifact.module_name()));
            fs::write(&path, instance.expanded_source()?)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Checks that the bindings crate at `crate_path` is up to date with the artifacts.
    ///
    /// Returns `Ok(())` if the generated bindings are up to date, otherwise it returns
    /// `Err(_)` naming the first stale file.
    pub fn check_consistency(&self, crate_path: &Path) -> Result<()> {
        eyre::ensure!(crate_path.is_dir(), "Crate path must be a directory");

        for instance in &self.instances {
            let artifact = crate_path.join(ARTIFACTS_DIR).join(instance.artifact.file_name());
            eyre::ensure!(
                artifact.is_file(),
                "artifact {} is missing from the bindings crate",
                instance.artifact.file_name()
            );
        }

        for (path, expected) in self.crate_files() {
            check_file_contents(&crate_path.join(path), &expected)?;
        }
        Ok(())
    }

    pub fn instance(&self, name: &str) -> Option<&SolMacroGen> {
        self.instances.iter().find(|instance| instance.name() == name)
    }

    pub fn instance_mut(&mut self, name: &str) -> Result<&mut SolMacroGen> {
        self.instances
            .iter_mut()
            .find(|instance| instance.name() == name)
            .ok_or_eyre(format!("no artifact named {name}"))
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn check_file_contents(file_path: &Path, expected_contents: &str) -> Result<()> {
    eyre::ensure!(file_path.is_file(), "{} is not a file", file_path.display());
    let file_contents = fs::read_to_string(file_path)
        .map_err(|e| eyre::eyre!("Failed to read file: {e}"))?;
    eyre::ensure!(
        file_contents == expected_contents,
        "File contents do not match expected contents for {}; regenerate the bindings",
        file_path.display()
    );
    Ok(())
}
