//! Contract artifacts: the ABI JSON plus the optional compiled bytecode.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, hex};
use eyre::{OptionExt, Result, WrapErr};
use heck::ToSnakeCase;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A single `<Name>.json` artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractArtifact {
    pub path: PathBuf,
    pub name: String,
}

impl ContractArtifact {
    pub fn new(path: PathBuf, name: String) -> Self {
        Self { path, name }
    }

    /// Creates an artifact named after the file stem of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_eyre(format!("invalid artifact file name: {}", path.display()))?;

        // Best effort identifier cleanup.
        let name = stem.replace(char::is_whitespace, "").replace('-', "_");
        Ok(Self::new(path, name))
    }

    /// Name of the rust module holding the binding, e.g. `node_manager`.
    pub fn module_name(&self) -> String {
        self.name.to_snake_case()
    }

    /// File name of the artifact, e.g. `NodeManager.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// Reads the ABI and the bytecode, if any.
    ///
    /// The bytecode is either a plain hex string or the `object` of a solc style bytecode map.
    /// A missing `bytecode` key or an empty `0x` both mean the artifact ships no bytecode.
    pub fn read(&self) -> Result<(JsonAbi, Option<String>)> {
        let json = std::fs::read(&self.path)
            .wrap_err_with(|| format!("failed to read {}", self.path.display()))?;

        // Need to do this to get the abi in the next step.
        let json: Value = serde_json::from_slice(&json)
            .wrap_err_with(|| format!("failed to parse {}", self.path.display()))?;

        let abi_val = json.get("abi").ok_or_eyre(format!("no ABI found in {}", self.path.display()))?;
        let json_abi = serde_json::from_value(abi_val.clone())
            .wrap_err_with(|| format!("invalid ABI in {}", self.path.display()))?;

        let bytecode = json
            .get("bytecode")
            .and_then(|b| b.as_str().or_else(|| b.get("object").and_then(Value::as_str)))
            .filter(|code| !code.trim_start_matches("0x").is_empty())
            .map(str::to_string);

        Ok((json_abi, bytecode))
    }

    /// Reads the artifact and decodes its bytecode, failing on malformed hex.
    pub fn validate(&self) -> Result<(JsonAbi, Option<Bytes>)> {
        let (abi, bytecode) = self.read()?;
        let bytecode = bytecode
            .map(|code| hex::decode(&code).map(Bytes::from))
            .transpose()
            .wrap_err_with(|| format!("invalid bytecode in {}", self.path.display()))?;
        Ok((abi, bytecode))
    }
}

/// Returns all `*.json` artifacts in `dir`, sorted by name.
pub fn json_artifacts(dir: &Path) -> Result<Vec<ContractArtifact>> {
    let entries = std::fs::read_dir(dir)
        .wrap_err_with(|| format!("failed to read artifacts dir {}", dir.display()))?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        // We don't want `.metadata.json` files.
        if path.file_stem().and_then(|s| s.to_str()).is_some_and(|s| s.ends_with(".metadata")) {
            continue;
        }
        artifacts.push(ContractArtifact::from_path(path)?);
    }
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}
