use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{Error, Result};
use crate::logger::Channel;
use crate::services::propagation::EnvFile;

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// A signing key and where it came from.
#[derive(Debug, Clone)]
pub struct WalletCredential {
    signer: PrivateKeySigner,
    generated: bool,
}

impl WalletCredential {
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn into_signer(self) -> PrivateKeySigner {
        self.signer
    }

    /// True when this run created the key.
    pub fn was_generated(&self) -> bool {
        self.generated
    }
}

/// Resolves the deployer key: process configuration first, then the env file, otherwise a fresh
/// key that is appended to the env file. Once a key is persisted it is never replaced.
pub struct WalletProvisioner<'a> {
    configured_key: Option<String>,
    env_file: EnvFile,
    log: Channel<'a>,
}

impl<'a> WalletProvisioner<'a> {
    pub fn new(configured_key: Option<String>, env_file: EnvFile, log: Channel<'a>) -> Self {
        Self {
            configured_key,
            env_file,
            log,
        }
    }

    pub fn get_or_create_wallet(&self) -> Result<WalletCredential> {
        if let Some(key) = self.configured_key.as_deref() {
            let signer = parse_private_key(key)?;
            self.log.log("Using existing wallet from PRIVATE_KEY")?;
            return Ok(WalletCredential {
                signer,
                generated: false,
            });
        }

        if let Some(key) = self.env_file.get(PRIVATE_KEY_VAR)? {
            let signer = parse_private_key(&key)?;
            self.log.log(format!(
                "Using existing wallet from {}",
                self.env_file.path().display()
            ))?;
            return Ok(WalletCredential {
                signer,
                generated: false,
            });
        }

        let signer = PrivateKeySigner::random();
        let encoded = format!("0x{}", hex::encode(signer.to_bytes()));
        self.env_file.append(PRIVATE_KEY_VAR, &encoded)?;

        self.log.log("=== New Wallet Generated ===")?;
        self.log.log(format!("Address: {}", signer.address()))?;
        self.log.log(format!(
            "Private key saved to {}",
            self.env_file.path().display()
        ))?;
        self.log
            .log("WARNING: Make sure to fund this wallet before deployment!")?;
        tracing::warn!(
            "Generated new wallet {}; it must be funded before use",
            signer.address()
        );

        Ok(WalletCredential {
            signer,
            generated: true,
        })
    }
}

/// Parses a hex private key. The signer's own error text is kept as is.
pub fn parse_private_key(raw: &str) -> Result<PrivateKeySigner> {
    raw.trim()
        .parse::<PrivateKeySigner>()
        .map_err(|e| Error::Configuration(e.to_string()))
}
