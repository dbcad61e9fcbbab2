pub mod deploy;
pub mod explorer;
pub mod paymaster;
pub mod propagation;
pub mod rpc;
pub mod token;
pub mod transaction;
pub mod wallet;
pub mod zksync;
