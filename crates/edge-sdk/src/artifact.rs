//! Hardhat compilation artifacts
//!
//! An artifact is the JSON file Hardhat writes for each compiled contract
//! under `artifacts/contracts/<File>.sol/<Name>.json`. [`ArtifactStore`]
//! resolves fully-qualified names such as `contracts/Errors.sol:Errors`
//! against that layout.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use edge_primitives::{Address, H256};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::abi::{encode_params, Abi, Token};
use crate::contract::Contract;
use crate::SdkError;

/// A compiled contract
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Contract name
    pub contract_name: String,
    /// Source path relative to the project root
    pub source_name: String,
    /// Parsed ABI
    pub abi: Arc<Abi>,
    /// Creation bytecode
    pub bytecode: Vec<u8>,
    /// Runtime bytecode
    pub deployed_bytecode: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: String,
    #[serde(default)]
    source_name: String,
    abi: serde_json::Value,
    #[serde(default)]
    bytecode: String,
    #[serde(default)]
    deployed_bytecode: String,
}

impl Artifact {
    /// Read an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| SdkError::Artifact(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
            .map_err(|e| SdkError::Artifact(format!("{}: {}", path.display(), e)))
    }

    /// Parse artifact JSON
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let raw: RawArtifact = serde_json::from_str(json)?;
        Ok(Self {
            abi: Arc::new(Abi::from_value(raw.abi)?),
            bytecode: decode_bytecode(&raw.bytecode)?,
            deployed_bytecode: decode_bytecode(&raw.deployed_bytecode)?,
            contract_name: raw.contract_name,
            source_name: raw.source_name,
        })
    }

    /// `sourceName:contractName`
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Creation payload: bytecode followed by the encoded constructor
    /// arguments
    pub fn deploy_data(&self, args: &[Token]) -> Result<Vec<u8>, SdkError> {
        if self.bytecode.is_empty() {
            return Err(SdkError::Artifact(format!(
                "{} has no bytecode (abstract contract or interface)",
                self.contract_name
            )));
        }
        let mut data = self.bytecode.clone();
        data.extend(encode_params(&self.abi.constructor_types(), args)?);
        Ok(data)
    }

    /// keccak256 of the creation bytecode plus encoded constructor arguments,
    /// as used for CREATE2 address prediction
    pub fn init_code_hash(&self, args: &[Token]) -> Result<H256, SdkError> {
        Ok(edge_crypto::keccak256(&self.deploy_data(args)?))
    }

    /// Bind the ABI to a deployed address
    pub fn at(&self, address: Address) -> Contract {
        Contract::new(address, Arc::clone(&self.abi))
    }
}

fn decode_bytecode(s: &str) -> Result<Vec<u8>, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    // Unlinked library placeholders look like `__$<hash>$__`.
    if s.contains("__") {
        return Err(SdkError::Artifact(
            "bytecode contains unlinked library references".to_string(),
        ));
    }
    Ok(hex::decode(s)?)
}

/// Artifacts under a Hardhat `artifacts/` directory, loaded on demand
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    cache: Mutex<HashMap<String, Arc<Artifact>>>,
}

impl ArtifactStore {
    /// Use `root` as the artifacts directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Artifacts directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `contracts/File.sol:Name`, or a bare `Name` when exactly one
    /// artifact carries it
    pub fn get(&self, name: &str) -> Result<Arc<Artifact>, SdkError> {
        if let Some(artifact) = self.cache.lock().get(name) {
            return Ok(Arc::clone(artifact));
        }

        let path = match name.rsplit_once(':') {
            Some((source, contract)) => self.root.join(source).join(format!("{}.json", contract)),
            None => self.find(name)?,
        };
        if !path.is_file() {
            return Err(SdkError::Artifact(format!(
                "artifact {} not found at {}",
                name,
                path.display()
            )));
        }

        let artifact = Arc::new(Artifact::load(&path)?);
        tracing::debug!(name, path = %path.display(), "loaded artifact");
        self.cache.lock().insert(name.to_string(), Arc::clone(&artifact));
        Ok(artifact)
    }

    fn find(&self, contract: &str) -> Result<PathBuf, SdkError> {
        let file_name = format!("{}.json", contract);
        let mut found = Vec::new();
        collect(&self.root, &file_name, &mut found)
            .map_err(|e| SdkError::Artifact(format!("{}: {}", self.root.display(), e)))?;

        match found.len() {
            0 => Err(SdkError::Artifact(format!(
                "no artifact named {} under {}",
                contract,
                self.root.display()
            ))),
            1 => Ok(found.remove(0)),
            n => Err(SdkError::Artifact(format!(
                "{} artifacts named {}; use a fully-qualified name",
                n, contract
            ))),
        }
    }
}

fn collect(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            // build-info holds compiler input/output, not artifacts
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            found.push(path);
        }
    }
    Ok(())
}
