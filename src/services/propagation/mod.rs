//! Address propagation
//!
//! Keeps every materialization of a logical contract's address in agreement:
//! - AddressBook: the structured `deployments/addresses.json` table scripts read at startup
//! - EnvFile: `KEY=value` entries in the persisted environment configuration
//! - SourceConstants: `const NAME = "0x..."` declarations embedded in dependent scripts
//!
//! Targets are written one by one. There is no multi-file transaction: when a write fails the
//! report names which targets were updated and which were not.

pub mod address_book;
pub mod constants;
pub mod env_file;

pub use address_book::AddressBook;
pub use constants::rewrite_constant;
pub use env_file::EnvFile;

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logger::Channel;
use crate::models::{AddressMap, ContractName, validate_addresses};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationTarget {
    AddressBook(PathBuf),
    EnvFile(PathBuf),
    SourceConstants(PathBuf),
}

impl PropagationTarget {
    pub fn path(&self) -> &Path {
        match self {
            Self::AddressBook(path) | Self::EnvFile(path) | Self::SourceConstants(path) => path,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::AddressBook(_) => "address book",
            Self::EnvFile(_) => "env file",
            Self::SourceConstants(_) => "script constants",
        }
    }

    /// Reads, modifies and writes back this one target.
    pub fn apply(&self, addresses: &AddressMap) -> Result<()> {
        match self {
            Self::AddressBook(path) => {
                let mut book = AddressBook::load(path)?;
                let before = book.clone();
                book.set_addresses(addresses);
                if book != before || !path.exists() {
                    book.save(path)?;
                }
                Ok(())
            }
            Self::EnvFile(path) => {
                let entries: Vec<(&str, String)> = addresses
                    .iter()
                    .map(|(name, address)| (name.env_key(), address.to_string()))
                    .collect();
                EnvFile::new(path).upsert(&entries)
            }
            Self::SourceConstants(path) => {
                let original = fs::read_to_string(path)?;
                let mut content = original.clone();
                let mut rewritten = 0;
                for (name, address) in addresses {
                    for constant in name.constant_names() {
                        let (next, count) =
                            rewrite_constant(&content, constant, &address.to_string());
                        content = next;
                        rewritten += count;
                    }
                }
                if rewritten == 0 {
                    return Err(Error::NotFound(format!(
                        "no address constants found in {}",
                        path.display()
                    )));
                }
                if content != original {
                    fs::write(path, content)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for PropagationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.path().display())
    }
}

/// Which targets were updated by one propagation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub succeeded: Vec<PropagationTarget>,
    pub failed: Vec<(PropagationTarget, String)>,
}

impl PropagationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for PropagationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let updated: Vec<String> = self.succeeded.iter().map(|t| t.to_string()).collect();
        let failed: Vec<String> = self
            .failed
            .iter()
            .map(|(t, reason)| format!("{t} ({reason})"))
            .collect();
        write!(
            f,
            "updated [{}]; failed [{}]",
            updated.join(", "),
            failed.join(", ")
        )
    }
}

pub struct AddressPropagator<'a> {
    targets: Vec<PropagationTarget>,
    log: Channel<'a>,
}

impl<'a> AddressPropagator<'a> {
    pub fn new(targets: Vec<PropagationTarget>, log: Channel<'a>) -> Self {
        Self { targets, log }
    }

    pub fn targets(&self) -> &[PropagationTarget] {
        &self.targets
    }

    /// Validates every address, then rewrites every target.
    ///
    /// Nothing is written when any address is malformed.
    pub fn update_contract_addresses(
        &self,
        raw: &BTreeMap<ContractName, String>,
    ) -> Result<PropagationReport> {
        let addresses = match validate_addresses(raw) {
            Ok(addresses) => addresses,
            Err(e) => {
                self.log.log(format!("Refusing to propagate: {e}"))?;
                return Err(e);
            }
        };
        self.propagate(&addresses)
    }

    pub fn propagate(&self, addresses: &AddressMap) -> Result<PropagationReport> {
        let mut report = PropagationReport::default();

        for target in &self.targets {
            match target.apply(addresses) {
                Ok(()) => {
                    self.log.log(format!("Updated {target}"))?;
                    report.succeeded.push(target.clone());
                }
                Err(e) => {
                    tracing::error!("Failed to update {}: {}", target, e);
                    self.log.log(format!("Failed to update {target}: {e}"))?;
                    report.failed.push((target.clone(), e.to_string()));
                }
            }
        }

        if !report.is_complete() {
            self.log.log(format!(
                "Address propagation incomplete, targets are out of sync: {report}"
            ))?;
            sentry::capture_message(
                &format!("Address propagation incomplete: {report}"),
                sentry::Level::Error,
            );
            return Err(Error::Propagation(report));
        }

        let summary: Vec<String> = addresses
            .iter()
            .map(|(name, address)| format!("    - {name}: {address}"))
            .collect();
        self.log
            .log(format!("Updated addresses:\n{}", summary.join("\n")))?;
        Ok(report)
    }
}

/// Pulls `"<Name>: 0x..."` summary lines out of a deploy log. Every contract must be present.
pub fn extract_addresses_from_log(content: &str) -> Result<BTreeMap<ContractName, String>> {
    let mut found = BTreeMap::new();
    for name in ContractName::ALL {
        let pattern = format!(r"{}: (0x[a-fA-F0-9]{{40}})", regex::escape(name.as_str()));
        let re = Regex::new(&pattern).expect("escaped contract pattern is valid");
        // The most recent summary wins when a log holds several runs
        if let Some(caps) = re.captures_iter(content).last() {
            found.insert(name, caps[1].to_string());
        }
    }

    let missing: Vec<&str> = ContractName::ALL
        .iter()
        .filter(|name| !found.contains_key(name))
        .map(|name| name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(Error::NotFound(format!(
            "Could not find contract addresses in deploy log: {}",
            missing.join(", ")
        )));
    }
    Ok(found)
}
