use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::JsonAbi;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    abi: JsonAbi,
    bytecode: String,
    #[serde(default)]
    factory_deps: BTreeMap<String, String>,
}

/// A compiled zksolc contract: interface, bytecode and the bytecodes it may deploy.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Vec<u8>,
    pub factory_deps: Vec<Vec<u8>>,
}

impl Artifact {
    /// ABI-encodes string constructor arguments against the constructor's declared types.
    pub fn encode_constructor_args(&self, args: &[String]) -> Result<Vec<u8>> {
        let Some(constructor) = self.abi.constructor() else {
            if args.is_empty() {
                return Ok(Vec::new());
            }
            return Err(Error::Artifact(format!(
                "{} has no constructor but {} arguments were given",
                self.name,
                args.len()
            )));
        };

        if constructor.inputs.len() != args.len() {
            return Err(Error::Artifact(format!(
                "{} constructor takes {} arguments, got {}",
                self.name,
                constructor.inputs.len(),
                args.len()
            )));
        }

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty: DynSolType = param.resolve().map_err(|e| {
                    Error::Artifact(format!("Unsupported constructor type {}: {e}", param.ty))
                })?;
                ty.coerce_str(arg).map_err(|e| {
                    Error::Artifact(format!(
                        "Invalid value '{arg}' for constructor argument {} ({}): {e}",
                        param.name, param.ty
                    ))
                })
            })
            .collect::<Result<Vec<DynSolValue>>>()?;

        constructor
            .abi_encode_input(&values)
            .map_err(|e| Error::Artifact(format!("Failed to encode constructor arguments: {e}")))
    }
}

/// Reads hardhat-zksync artifacts from `<root>/contracts/<Name>.sol/<Name>.json`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root
            .join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }

    /// Loads an artifact together with its factory dependencies, resolved recursively.
    pub fn load(&self, name: &str) -> Result<Artifact> {
        let file = self.read(&self.path_for(name))?;
        let bytecode = decode_bytecode(name, &file.bytecode)?;

        let mut factory_deps = Vec::new();
        let mut visited = BTreeSet::from([format!("contracts/{name}.sol:{name}")]);
        self.collect_deps(&file.factory_deps, &mut visited, &mut factory_deps)?;

        Ok(Artifact {
            name: name.to_string(),
            abi: file.abi,
            bytecode,
            factory_deps,
        })
    }

    fn read(&self, path: &Path) -> Result<ArtifactFile> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Artifact(format!(
                "Cannot read artifact {}: {e}. Compile the contracts first",
                path.display()
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Artifact(format!("Malformed artifact {}: {e}", path.display())))
    }

    fn collect_deps(
        &self,
        deps: &BTreeMap<String, String>,
        visited: &mut BTreeSet<String>,
        out: &mut Vec<Vec<u8>>,
    ) -> Result<()> {
        for reference in deps.values() {
            if !visited.insert(reference.clone()) {
                continue;
            }
            // "contracts/Foo.sol:Foo"
            let (source, contract) = reference.rsplit_once(':').ok_or_else(|| {
                Error::Artifact(format!("Malformed factory dependency '{reference}'"))
            })?;
            let path = self.root.join(source).join(format!("{contract}.json"));
            let file = self.read(&path)?;
            out.push(decode_bytecode(contract, &file.bytecode)?);
            self.collect_deps(&file.factory_deps, visited, out)?;
        }
        Ok(())
    }
}

fn decode_bytecode(name: &str, raw: &str) -> Result<Vec<u8>> {
    let bytecode = hex::decode(raw.trim().trim_start_matches("0x"))
        .map_err(|e| Error::Artifact(format!("Invalid bytecode for {name}: {e}")))?;
    if bytecode.is_empty() {
        return Err(Error::Artifact(format!(
            "{name} has empty bytecode (abstract contract or interface?)"
        )));
    }
    Ok(bytecode)
}
