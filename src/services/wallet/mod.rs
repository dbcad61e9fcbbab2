pub mod provisioner;

pub use provisioner::{WalletCredential, WalletProvisioner, parse_private_key};
