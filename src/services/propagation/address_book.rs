use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::{AddressMap, ContractName, DeploymentRecord};

/// Structured address table shared by every script.
///
/// `contracts` is the single source the scripts read at startup. `deployments` keeps the
/// metadata of the most recent deployment of each contract and is only written by the
/// deploy pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default)]
    pub contracts: BTreeMap<ContractName, Address>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployments: BTreeMap<ContractName, DeploymentRecord>,
}

impl AddressBook {
    /// Loads the table. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }

    pub fn address(&self, name: ContractName) -> Option<Address> {
        self.contracts.get(&name).copied()
    }

    pub fn set_addresses(&mut self, addresses: &AddressMap) {
        for (name, address) in addresses {
            self.contracts.insert(*name, *address);
        }
    }

    /// Records deployment metadata and the deployed address together.
    pub fn record_deployment(&mut self, record: DeploymentRecord) {
        self.contracts.insert(record.contract_name, record.address);
        self.deployments.insert(record.contract_name, record);
    }
}
